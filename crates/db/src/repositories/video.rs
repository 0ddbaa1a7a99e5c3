//! Video repository.

use std::sync::Arc;

use crate::entities::{Video, video};
use napoleon_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseBackend, DatabaseConnection, EntityTrait,
    FromQueryResult, QueryFilter, Statement, sea_query::Expr,
};
use serde::Serialize;

/// A submission with its vote count and the viewer's vote flag.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct VideoWithVotes {
    pub id: i64,
    pub shot_id: i64,
    pub user_id: String,
    pub user_email: Option<String>,
    pub video_url: String,
    pub storage_key: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub votes_count: i64,
    pub has_voted: bool,
}

/// Video repository for database operations.
#[derive(Clone)]
pub struct VideoRepository {
    db: Arc<DatabaseConnection>,
}

impl VideoRepository {
    /// Create a new video repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a video by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<video::Model>> {
        Video::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a video by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<video::Model> {
        self.find_by_id(id).await?.ok_or(AppError::VideoNotFound(id))
    }

    /// Create a new video.
    pub async fn create(&self, model: video::ActiveModel) -> AppResult<video::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A shot's submissions with vote counts, via `get_videos_with_votes()`.
    ///
    /// `has_voted` is always false for an anonymous viewer.
    pub async fn with_votes(
        &self,
        shot_id: i64,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<VideoWithVotes>> {
        VideoWithVotes::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT * FROM get_videos_with_votes($1, $2)",
            [shot_id.into(), viewer_id.map(str::to_string).into()],
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load a video and check that `owner_id` owns it.
    async fn get_owned(&self, id: i64, owner_id: &str) -> AppResult<video::Model> {
        let video = self.get_by_id(id).await?;
        if video.user_id != owner_id {
            return Err(AppError::Forbidden(
                "Only the uploader can change this video".to_string(),
            ));
        }
        Ok(video)
    }

    /// Replace a video's description. Scoped to the owner.
    pub async fn update_description(
        &self,
        id: i64,
        owner_id: &str,
        description: Option<String>,
    ) -> AppResult<video::Model> {
        let video = self.get_owned(id, owner_id).await?;

        let result = Video::update_many()
            .col_expr(video::Column::Description, Expr::value(description.clone()))
            .filter(video::Column::Id.eq(id))
            .filter(video::Column::UserId.eq(owner_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::VideoNotFound(id));
        }

        Ok(video::Model {
            description,
            ..video
        })
    }

    /// Delete a video and (through the foreign key) its votes. Scoped to the owner.
    ///
    /// Returns the deleted row so the caller can remove the stored blob.
    pub async fn delete_owned(&self, id: i64, owner_id: &str) -> AppResult<video::Model> {
        let video = self.get_owned(id, owner_id).await?;

        let result = Video::delete_many()
            .filter(video::Column::Id.eq(id))
            .filter(video::Column::UserId.eq(owner_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::VideoNotFound(id));
        }

        Ok(video)
    }
}
