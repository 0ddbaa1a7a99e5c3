//! Create shots table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Shots::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Shots::Title).text().not_null())
                    .col(ColumnDef::new(Shots::ScriptExcerpt).text().not_null())
                    .col(ColumnDef::new(Shots::OrderIndex).integer().not_null())
                    .col(
                        ColumnDef::new(Shots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: order_index (canonical film order)
        manager
            .create_index(
                Index::create()
                    .name("idx_shots_order_index")
                    .table(Shots::Table)
                    .col(Shots::OrderIndex)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Shots {
    Table,
    Id,
    Title,
    ScriptExcerpt,
    OrderIndex,
    CreatedAt,
}
