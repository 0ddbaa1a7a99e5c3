//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20241101_000001_create_shots_table;
mod m20241101_000002_create_videos_table;
mod m20241101_000003_create_votes_table;
mod m20241101_000004_create_aggregation_functions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241101_000001_create_shots_table::Migration),
            Box::new(m20241101_000002_create_videos_table::Migration),
            Box::new(m20241101_000003_create_votes_table::Migration),
            Box::new(m20241101_000004_create_aggregation_functions::Migration),
        ]
    }
}
