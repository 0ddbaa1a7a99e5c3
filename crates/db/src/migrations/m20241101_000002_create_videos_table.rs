//! Create videos table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Videos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Videos::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Videos::ShotId).big_integer().not_null())
                    .col(ColumnDef::new(Videos::UserId).text().not_null())
                    .col(ColumnDef::new(Videos::UserEmail).text())
                    .col(ColumnDef::new(Videos::VideoUrl).text().not_null())
                    .col(ColumnDef::new(Videos::StorageKey).text().not_null())
                    .col(ColumnDef::new(Videos::Description).text())
                    .col(
                        ColumnDef::new(Videos::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_videos_shot")
                            .from(Videos::Table, Videos::ShotId)
                            .to(Shots::Table, Shots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: shot_id (listing submissions for a shot)
        manager
            .create_index(
                Index::create()
                    .name("idx_videos_shot_id")
                    .table(Videos::Table)
                    .col(Videos::ShotId)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (owner-scoped updates and deletes)
        manager
            .create_index(
                Index::create()
                    .name("idx_videos_user_id")
                    .table(Videos::Table)
                    .col(Videos::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Videos::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Videos {
    Table,
    Id,
    ShotId,
    UserId,
    UserEmail,
    VideoUrl,
    StorageKey,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum Shots {
    Table,
    Id,
}
