//! Video entity (a submitted interpretation of a shot).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "videos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub shot_id: i64,

    /// Identity id of the uploader (owner)
    pub user_id: String,

    /// Uploader email, denormalized for display
    #[sea_orm(nullable)]
    pub user_email: Option<String>,

    /// Public URL of the stored blob
    pub video_url: String,

    /// Object-store path of the blob
    pub storage_key: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shot::Entity",
        from = "Column::ShotId",
        to = "super::shot::Column::Id",
        on_delete = "Cascade"
    )]
    Shot,

    #[sea_orm(has_many = "super::vote::Entity")]
    Vote,
}

impl Related<super::shot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shot.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
