//! Vote repository.

use std::sync::Arc;

use crate::entities::{Vote, vote};
use napoleon_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's vote on a video.
    pub async fn find_by_video_and_user(
        &self,
        video_id: i64,
        user_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::VideoId.eq(video_id))
            .filter(vote::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a vote.
    ///
    /// A second vote by the same user on the same video violates the unique
    /// `(video_id, user_id)` index and is reported as a conflict.
    pub async fn create(&self, video_id: i64, user_id: &str) -> AppResult<vote::Model> {
        let model = vote::ActiveModel {
            video_id: Set(video_id),
            user_id: Set(user_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Vote already recorded".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a vote. Scoped to the voter; returns whether a row was removed.
    pub async fn delete_owned(&self, vote_id: i64, user_id: &str) -> AppResult<bool> {
        let result = Vote::delete_many()
            .filter(vote::Column::Id.eq(vote_id))
            .filter(vote::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_vote(id: i64, video_id: i64, user_id: &str) -> vote::Model {
        vote::Model {
            id,
            video_id,
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_video_and_user() {
        let vote = create_test_vote(1, 10, "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote.clone()]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.find_by_video_and_user(10, "user1").await.unwrap();

        assert_eq!(result, Some(vote));
    }

    #[tokio::test]
    async fn test_find_by_video_and_user_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<vote::Model>::new()])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.find_by_video_and_user(10, "user2").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create() {
        let vote = create_test_vote(5, 10, "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote.clone()]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let created = repo.create(10, "user1").await.unwrap();

        assert_eq!(created.id, 5);
        assert_eq!(created.video_id, 10);
    }

    #[tokio::test]
    async fn test_delete_owned() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);

        assert!(repo.delete_owned(5, "user1").await.unwrap());
        assert!(!repo.delete_owned(5, "someone-else").await.unwrap());
    }
}
