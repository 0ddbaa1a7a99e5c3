//! Shot service: listings and the per-shot aggregations.

use napoleon_common::{AppError, AppResult};
use napoleon_db::{
    entities::shot,
    repositories::{ShotWithTopVideo, VideoWithVotes},
};

use super::identity::Identity;
use super::store::DataStoreService;

/// Shot service for business logic.
#[derive(Clone)]
pub struct ShotService {
    store: DataStoreService,
}

impl ShotService {
    /// Create a new shot service.
    #[must_use]
    pub const fn new(store: DataStoreService) -> Self {
        Self { store }
    }

    /// All shots in film order.
    pub async fn list(&self) -> AppResult<Vec<shot::Model>> {
        self.store.list_shots().await
    }

    /// A single shot.
    pub async fn get(&self, shot_id: i64) -> AppResult<shot::Model> {
        if shot_id <= 0 {
            return Err(AppError::BadRequest("Invalid shot ID".to_string()));
        }
        self.store.get_shot(shot_id).await
    }

    /// A shot's submissions, most-voted first, flagged for `viewer`.
    pub async fn videos(
        &self,
        shot_id: i64,
        viewer: Option<&Identity>,
    ) -> AppResult<Vec<VideoWithVotes>> {
        self.store
            .videos_with_votes(shot_id, viewer.map(|v| v.id.as_str()))
            .await
    }

    /// Every shot with its top-voted submission, in one batched call.
    pub async fn with_top_videos(&self) -> AppResult<Vec<ShotWithTopVideo>> {
        self.store.shots_with_top_videos().await
    }
}
