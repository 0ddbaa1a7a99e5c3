//! Data-access interface.
//!
//! The managed backend owns the tables and the two aggregation procedures;
//! everything above this module talks to it through [`DataStore`], so tests
//! and local development can swap in [`MemoryStore`](super::MemoryStore).

use std::sync::Arc;

use async_trait::async_trait;
use napoleon_common::AppResult;
use napoleon_db::{
    entities::{shot, video, vote},
    repositories::{
        ShotRepository, ShotWithTopVideo, VideoRepository, VideoWithVotes, VoteRepository,
    },
};
use sea_orm::{DatabaseConnection, Set};

/// Fields of a video row written after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    pub shot_id: i64,
    pub user_id: String,
    pub user_email: Option<String>,
    pub video_url: String,
    pub storage_key: String,
    pub description: Option<String>,
}

/// Operations the application needs from the structured data store.
///
/// Owner-scoped mutations fail with `Forbidden` for a non-owner and
/// `VideoNotFound` for a missing row, leaving the row untouched in both cases.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// All shots ordered by `order_index`, then id.
    async fn list_shots(&self) -> AppResult<Vec<shot::Model>>;

    /// A single shot; `ShotNotFound` if missing.
    async fn get_shot(&self, id: i64) -> AppResult<shot::Model>;

    /// The viewer's vote on a video, if any.
    async fn find_vote(&self, video_id: i64, user_id: &str) -> AppResult<Option<vote::Model>>;

    /// Record a vote.
    async fn insert_vote(&self, video_id: i64, user_id: &str) -> AppResult<vote::Model>;

    /// Delete a vote, scoped to the voter. Returns whether a row was removed.
    async fn delete_vote(&self, vote_id: i64, user_id: &str) -> AppResult<bool>;

    /// Insert a video row.
    async fn insert_video(&self, input: NewVideo) -> AppResult<video::Model>;

    /// A single video; `VideoNotFound` if missing.
    async fn get_video(&self, id: i64) -> AppResult<video::Model>;

    /// Replace a video's description, scoped to the owner.
    async fn update_video_description(
        &self,
        id: i64,
        owner_id: &str,
        description: Option<String>,
    ) -> AppResult<video::Model>;

    /// Delete a video and its votes, scoped to the owner. Returns the deleted row.
    async fn delete_video(&self, id: i64, owner_id: &str) -> AppResult<video::Model>;

    /// A shot's videos with vote counts and the viewer's vote flag.
    async fn videos_with_votes(
        &self,
        shot_id: i64,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<VideoWithVotes>>;

    /// Every shot paired with its top-voted video.
    async fn shots_with_top_videos(&self) -> AppResult<Vec<ShotWithTopVideo>>;
}

/// Shared handle to the configured data store.
pub type DataStoreService = Arc<dyn DataStore>;

/// [`DataStore`] backed by the `PostgreSQL` repositories.
#[derive(Clone)]
pub struct SeaOrmStore {
    shot_repo: ShotRepository,
    video_repo: VideoRepository,
    vote_repo: VoteRepository,
}

impl SeaOrmStore {
    /// Create a store over a database connection.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            shot_repo: ShotRepository::new(db.clone()),
            video_repo: VideoRepository::new(db.clone()),
            vote_repo: VoteRepository::new(db),
        }
    }
}

#[async_trait]
impl DataStore for SeaOrmStore {
    async fn list_shots(&self) -> AppResult<Vec<shot::Model>> {
        self.shot_repo.find_all_ordered().await
    }

    async fn get_shot(&self, id: i64) -> AppResult<shot::Model> {
        self.shot_repo.get_by_id(id).await
    }

    async fn find_vote(&self, video_id: i64, user_id: &str) -> AppResult<Option<vote::Model>> {
        self.vote_repo.find_by_video_and_user(video_id, user_id).await
    }

    async fn insert_vote(&self, video_id: i64, user_id: &str) -> AppResult<vote::Model> {
        self.vote_repo.create(video_id, user_id).await
    }

    async fn delete_vote(&self, vote_id: i64, user_id: &str) -> AppResult<bool> {
        self.vote_repo.delete_owned(vote_id, user_id).await
    }

    async fn insert_video(&self, input: NewVideo) -> AppResult<video::Model> {
        let model = video::ActiveModel {
            shot_id: Set(input.shot_id),
            user_id: Set(input.user_id),
            user_email: Set(input.user_email),
            video_url: Set(input.video_url),
            storage_key: Set(input.storage_key),
            description: Set(input.description),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        self.video_repo.create(model).await
    }

    async fn get_video(&self, id: i64) -> AppResult<video::Model> {
        self.video_repo.get_by_id(id).await
    }

    async fn update_video_description(
        &self,
        id: i64,
        owner_id: &str,
        description: Option<String>,
    ) -> AppResult<video::Model> {
        self.video_repo
            .update_description(id, owner_id, description)
            .await
    }

    async fn delete_video(&self, id: i64, owner_id: &str) -> AppResult<video::Model> {
        self.video_repo.delete_owned(id, owner_id).await
    }

    async fn videos_with_votes(
        &self,
        shot_id: i64,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<VideoWithVotes>> {
        self.video_repo.with_votes(shot_id, viewer_id).await
    }

    async fn shots_with_top_videos(&self) -> AppResult<Vec<ShotWithTopVideo>> {
        self.shot_repo.with_top_videos().await
    }
}
