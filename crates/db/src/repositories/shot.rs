//! Shot repository.

use std::sync::Arc;

use crate::entities::{Shot, shot};
use napoleon_common::{AppError, AppResult};
use sea_orm::{
    DatabaseBackend, DatabaseConnection, EntityTrait, FromQueryResult, QueryOrder, Statement,
};
use serde::Serialize;

/// A shot paired with its highest-voted submission.
///
/// The `top_video_*` columns are `None` when the shot has no submissions.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct ShotWithTopVideo {
    pub id: i64,
    pub title: String,
    pub script_excerpt: String,
    pub order_index: i32,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub top_video_id: Option<i64>,
    pub top_video_url: Option<String>,
    pub top_video_user_id: Option<String>,
    pub top_video_user_email: Option<String>,
    pub top_video_votes: Option<i64>,
}

/// Shot repository for database operations.
#[derive(Clone)]
pub struct ShotRepository {
    db: Arc<DatabaseConnection>,
}

impl ShotRepository {
    /// Create a new shot repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a shot by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<shot::Model>> {
        Shot::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a shot by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<shot::Model> {
        self.find_by_id(id).await?.ok_or(AppError::ShotNotFound(id))
    }

    /// List every shot in film order.
    pub async fn find_all_ordered(&self) -> AppResult<Vec<shot::Model>> {
        Shot::find()
            .order_by_asc(shot::Column::OrderIndex)
            .order_by_asc(shot::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every shot with its top video, via `get_shots_with_top_videos()`.
    pub async fn with_top_videos(&self) -> AppResult<Vec<ShotWithTopVideo>> {
        ShotWithTopVideo::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT * FROM get_shots_with_top_videos()",
            [],
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{MockDatabase, Value};
    use std::collections::BTreeMap;

    fn create_test_shot(id: i64, order_index: i32) -> shot::Model {
        shot::Model {
            id,
            title: format!("Shot {id}"),
            script_excerpt: "EXT. TOULON - DAWN".to_string(),
            order_index,
            created_at: Utc::now().into(),
        }
    }

    fn top_row(id: i64, top: Option<(i64, i64)>) -> BTreeMap<&'static str, Value> {
        let created_at: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        BTreeMap::from([
            ("id", id.into()),
            ("title", format!("Shot {id}").into()),
            ("script_excerpt", "INT. TENT - NIGHT".into()),
            ("order_index", (id as i32).into()),
            ("created_at", created_at.into()),
            ("top_video_id", top.map(|(v, _)| v).into()),
            (
                "top_video_url",
                top.map(|(v, _)| format!("https://cdn.example/{v}.mp4")).into(),
            ),
            ("top_video_user_id", top.map(|_| "user1".to_string()).into()),
            ("top_video_user_email", Option::<String>::None.into()),
            ("top_video_votes", top.map(|(_, votes)| votes).into()),
        ])
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let shot = create_test_shot(1, 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[shot.clone()]])
                .into_connection(),
        );

        let repo = ShotRepository::new(db);
        let result = repo.find_by_id(1).await.unwrap();

        assert_eq!(result, Some(shot));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<shot::Model>::new()])
                .into_connection(),
        );

        let repo = ShotRepository::new(db);
        let result = repo.get_by_id(42).await;

        assert!(matches!(result, Err(AppError::ShotNotFound(42))));
    }

    #[tokio::test]
    async fn test_find_all_ordered() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_shot(2, 1), create_test_shot(1, 2)]])
                .into_connection(),
        );

        let repo = ShotRepository::new(db);
        let shots = repo.find_all_ordered().await.unwrap();

        assert_eq!(shots.len(), 2);
        assert_eq!(shots[0].order_index, 1);
        assert_eq!(shots[1].id, 1);
    }

    #[tokio::test]
    async fn test_with_top_videos_keeps_empty_shots() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![top_row(1, Some((10, 4))), top_row(2, None)]])
                .into_connection(),
        );

        let repo = ShotRepository::new(db);
        let rows = repo.with_top_videos().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].top_video_id, Some(10));
        assert_eq!(rows[0].top_video_votes, Some(4));
        assert_eq!(rows[1].top_video_id, None);
        assert_eq!(rows[1].top_video_url, None);
    }
}
