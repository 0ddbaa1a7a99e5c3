//! Vote service.

use napoleon_common::{AppError, AppResult};
use serde::Serialize;

use super::identity::Identity;
use super::store::DataStoreService;

/// Result of a vote toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub video_id: i64,
    /// Whether the viewer's vote exists after the toggle.
    pub voted: bool,
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    store: DataStoreService,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(store: DataStoreService) -> Self {
        Self { store }
    }

    /// Vote for a video, or withdraw the viewer's existing vote.
    ///
    /// Anonymous viewers are rejected before the store is touched.
    pub async fn toggle(&self, video_id: i64, viewer: Option<&Identity>) -> AppResult<VoteOutcome> {
        let viewer = viewer.ok_or(AppError::Unauthorized)?;

        // Check if video exists
        self.store.get_video(video_id).await?;

        let voted = match self.store.find_vote(video_id, &viewer.id).await? {
            Some(vote) => {
                self.store.delete_vote(vote.id, &viewer.id).await?;
                false
            }
            None => match self.store.insert_vote(video_id, &viewer.id).await {
                Ok(_) => true,
                // Lost a race against the viewer's own concurrent vote
                Err(AppError::Conflict(_)) => {
                    tracing::debug!(video_id, user_id = %viewer.id, "Vote already present");
                    true
                }
                Err(e) => return Err(e),
            },
        };

        tracing::info!(video_id, user_id = %viewer.id, voted, "Vote toggled");
        Ok(VoteOutcome { video_id, voted })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::memory_store::MemoryStore;
    use crate::services::store::{DataStore, NewVideo};
    use crate::testing::CountingStore;

    async fn setup() -> (Arc<MemoryStore>, i64) {
        let store = Arc::new(MemoryStore::new());
        let shot = store.seed_shot("Toulon", "...", 1).await;
        let video = store
            .insert_video(NewVideo {
                shot_id: shot.id,
                user_id: "owner".to_string(),
                user_email: None,
                video_url: "https://cdn.example/v.mp4".to_string(),
                storage_key: "shot-1/owner/1.mp4".to_string(),
                description: None,
            })
            .await
            .unwrap();
        (store, video.id)
    }

    #[tokio::test]
    async fn test_anonymous_rejected_without_store_calls() {
        let (store, video_id) = setup().await;
        let counting = Arc::new(CountingStore::new(store));
        let service = VoteService::new(counting.clone());

        let result = service.toggle(video_id, None).await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
        assert_eq!(counting.calls(), 0);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let (store, video_id) = setup().await;
        let service = VoteService::new(store.clone());
        let viewer = Identity::new("viewer", None);

        let first = service.toggle(video_id, Some(&viewer)).await.unwrap();
        assert!(first.voted);
        assert_eq!(store.vote_rows(video_id).await, 1);

        let second = service.toggle(video_id, Some(&viewer)).await.unwrap();
        assert!(!second.voted);
        assert_eq!(store.vote_rows(video_id).await, 0);
    }

    #[tokio::test]
    async fn test_count_matches_rows_after_toggle_sequence() {
        let (store, video_id) = setup().await;
        let service = VoteService::new(store.clone());
        let voters: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|id| Identity::new(*id, None))
            .collect();

        // a: on, b: on, a: off, c: on, b: off, b: on
        for idx in [0, 1, 0, 2, 1, 1] {
            service.toggle(video_id, Some(&voters[idx])).await.unwrap();
            let listed = store.videos_with_votes(1, None).await.unwrap();
            let count = listed.iter().find(|v| v.id == video_id).unwrap().votes_count;
            assert_eq!(count as usize, store.vote_rows(video_id).await);
        }

        assert_eq!(store.vote_rows(video_id).await, 2);
    }

    #[tokio::test]
    async fn test_missing_video() {
        let (store, _) = setup().await;
        let service = VoteService::new(store);
        let viewer = Identity::new("viewer", None);

        let result = service.toggle(999, Some(&viewer)).await;

        assert!(matches!(result, Err(AppError::VideoNotFound(999))));
    }
}
