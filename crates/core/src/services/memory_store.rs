//! In-memory data store.
//!
//! Mirrors the semantics of the backend tables and procedures closely enough
//! for tests and local development without a database.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use napoleon_common::{AppError, AppResult};
use napoleon_db::{
    entities::{shot, video, vote},
    repositories::{ShotWithTopVideo, VideoWithVotes},
};
use tokio::sync::RwLock;

use super::store::{DataStore, NewVideo};

#[derive(Default)]
struct Tables {
    shots: BTreeMap<i64, shot::Model>,
    videos: BTreeMap<i64, video::Model>,
    votes: BTreeMap<i64, vote::Model>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn votes_for(&self, video_id: i64) -> impl Iterator<Item = &vote::Model> {
        self.votes.values().filter(move |v| v.video_id == video_id)
    }

    fn owned_video(&self, id: i64, owner_id: &str) -> AppResult<&video::Model> {
        let video = self.videos.get(&id).ok_or(AppError::VideoNotFound(id))?;
        if video.user_id != owner_id {
            return Err(AppError::Forbidden(
                "Only the uploader can change this video".to_string(),
            ));
        }
        Ok(video)
    }
}

/// [`DataStore`] holding everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a shot.
    pub async fn seed_shot(&self, title: &str, script_excerpt: &str, order_index: i32) -> shot::Model {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let model = shot::Model {
            id,
            title: title.to_string(),
            script_excerpt: script_excerpt.to_string(),
            order_index,
            created_at: Utc::now().into(),
        };
        tables.shots.insert(id, model.clone());
        model
    }

    /// Number of stored vote rows for a video.
    pub async fn vote_rows(&self, video_id: i64) -> usize {
        self.tables.read().await.votes_for(video_id).count()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn list_shots(&self) -> AppResult<Vec<shot::Model>> {
        let tables = self.tables.read().await;
        let mut shots: Vec<_> = tables.shots.values().cloned().collect();
        shots.sort_by_key(|s| (s.order_index, s.id));
        Ok(shots)
    }

    async fn get_shot(&self, id: i64) -> AppResult<shot::Model> {
        self.tables
            .read()
            .await
            .shots
            .get(&id)
            .cloned()
            .ok_or(AppError::ShotNotFound(id))
    }

    async fn find_vote(&self, video_id: i64, user_id: &str) -> AppResult<Option<vote::Model>> {
        Ok(self
            .tables
            .read()
            .await
            .votes_for(video_id)
            .find(|v| v.user_id == user_id)
            .cloned())
    }

    async fn insert_vote(&self, video_id: i64, user_id: &str) -> AppResult<vote::Model> {
        let mut tables = self.tables.write().await;
        if !tables.videos.contains_key(&video_id) {
            return Err(AppError::VideoNotFound(video_id));
        }
        if tables.votes_for(video_id).any(|v| v.user_id == user_id) {
            return Err(AppError::Conflict("Vote already recorded".to_string()));
        }

        let id = tables.next_id();
        let model = vote::Model {
            id,
            video_id,
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
        };
        tables.votes.insert(id, model.clone());
        Ok(model)
    }

    async fn delete_vote(&self, vote_id: i64, user_id: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .votes
            .get(&vote_id)
            .is_some_and(|v| v.user_id == user_id);
        if owned {
            tables.votes.remove(&vote_id);
        }
        Ok(owned)
    }

    async fn insert_video(&self, input: NewVideo) -> AppResult<video::Model> {
        let mut tables = self.tables.write().await;
        if !tables.shots.contains_key(&input.shot_id) {
            return Err(AppError::ShotNotFound(input.shot_id));
        }

        let id = tables.next_id();
        let model = video::Model {
            id,
            shot_id: input.shot_id,
            user_id: input.user_id,
            user_email: input.user_email,
            video_url: input.video_url,
            storage_key: input.storage_key,
            description: input.description,
            created_at: Utc::now().into(),
        };
        tables.videos.insert(id, model.clone());
        Ok(model)
    }

    async fn get_video(&self, id: i64) -> AppResult<video::Model> {
        self.tables
            .read()
            .await
            .videos
            .get(&id)
            .cloned()
            .ok_or(AppError::VideoNotFound(id))
    }

    async fn update_video_description(
        &self,
        id: i64,
        owner_id: &str,
        description: Option<String>,
    ) -> AppResult<video::Model> {
        let mut tables = self.tables.write().await;
        tables.owned_video(id, owner_id)?;

        let video = tables
            .videos
            .get_mut(&id)
            .ok_or(AppError::VideoNotFound(id))?;
        video.description = description;
        Ok(video.clone())
    }

    async fn delete_video(&self, id: i64, owner_id: &str) -> AppResult<video::Model> {
        let mut tables = self.tables.write().await;
        tables.owned_video(id, owner_id)?;

        let removed = tables
            .videos
            .remove(&id)
            .ok_or(AppError::VideoNotFound(id))?;
        tables.votes.retain(|_, v| v.video_id != id);
        Ok(removed)
    }

    async fn videos_with_votes(
        &self,
        shot_id: i64,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<VideoWithVotes>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<VideoWithVotes> = tables
            .videos
            .values()
            .filter(|v| v.shot_id == shot_id)
            .map(|v| {
                let votes: Vec<_> = tables.votes_for(v.id).collect();
                VideoWithVotes {
                    id: v.id,
                    shot_id: v.shot_id,
                    user_id: v.user_id.clone(),
                    user_email: v.user_email.clone(),
                    video_url: v.video_url.clone(),
                    storage_key: v.storage_key.clone(),
                    description: v.description.clone(),
                    created_at: v.created_at,
                    votes_count: votes.len() as i64,
                    has_voted: viewer_id.is_some_and(|viewer| votes.iter().any(|vt| vt.user_id == viewer)),
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.votes_count
                .cmp(&a.votes_count)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(rows)
    }

    async fn shots_with_top_videos(&self) -> AppResult<Vec<ShotWithTopVideo>> {
        let tables = self.tables.read().await;
        let mut shots: Vec<_> = tables.shots.values().collect();
        shots.sort_by_key(|s| (s.order_index, s.id));

        Ok(shots
            .into_iter()
            .map(|s| {
                let top = tables
                    .videos
                    .values()
                    .filter(|v| v.shot_id == s.id)
                    .map(|v| (v, tables.votes_for(v.id).count() as i64))
                    .min_by(|(a, a_votes), (b, b_votes)| {
                        b_votes
                            .cmp(a_votes)
                            .then(a.created_at.cmp(&b.created_at))
                            .then(a.id.cmp(&b.id))
                    });

                ShotWithTopVideo {
                    id: s.id,
                    title: s.title.clone(),
                    script_excerpt: s.script_excerpt.clone(),
                    order_index: s.order_index,
                    created_at: s.created_at,
                    top_video_id: top.map(|(v, _)| v.id),
                    top_video_url: top.map(|(v, _)| v.video_url.clone()),
                    top_video_user_id: top.map(|(v, _)| v.user_id.clone()),
                    top_video_user_email: top.and_then(|(v, _)| v.user_email.clone()),
                    top_video_votes: top.map(|(_, votes)| votes),
                }
            })
            .collect())
    }
}
