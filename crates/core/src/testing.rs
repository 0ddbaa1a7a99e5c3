//! Test doubles shared by the unit tests.

#![allow(clippy::unwrap_used, missing_docs)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use napoleon_common::{AppError, AppResult, StorageBackend, UploadedFile};
use napoleon_db::{
    entities::{shot, video, vote},
    repositories::{ShotWithTopVideo, VideoWithVotes},
};

use crate::services::store::{DataStore, DataStoreService, NewVideo};

type Hook = Box<dyn Fn() + Send + Sync>;

/// Wraps a store, counting calls and failing selected operations on demand.
pub struct CountingStore {
    inner: DataStoreService,
    calls: AtomicUsize,
    fail_vote_writes: AtomicBool,
    fail_listing: AtomicBool,
    fail_video_insert: AtomicBool,
    on_vote_write: Mutex<Option<Hook>>,
}

impl CountingStore {
    pub fn new(inner: DataStoreService) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            fail_vote_writes: AtomicBool::new(false),
            fail_listing: AtomicBool::new(false),
            fail_video_insert: AtomicBool::new(false),
            on_vote_write: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_vote_writes(&self, fail: bool) {
        self.fail_vote_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn fail_video_insert(&self, fail: bool) {
        self.fail_video_insert.store(fail, Ordering::SeqCst);
    }

    /// Run `hook` whenever a vote is about to be written.
    pub fn on_vote_write(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_vote_write.lock().unwrap() = Some(Box::new(hook));
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn vote_write(&self) -> AppResult<()> {
        if let Some(hook) = self.on_vote_write.lock().unwrap().as_ref() {
            hook();
        }
        if self.fail_vote_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for CountingStore {
    async fn list_shots(&self) -> AppResult<Vec<shot::Model>> {
        self.tick();
        self.inner.list_shots().await
    }

    async fn get_shot(&self, id: i64) -> AppResult<shot::Model> {
        self.tick();
        self.inner.get_shot(id).await
    }

    async fn find_vote(&self, video_id: i64, user_id: &str) -> AppResult<Option<vote::Model>> {
        self.tick();
        self.inner.find_vote(video_id, user_id).await
    }

    async fn insert_vote(&self, video_id: i64, user_id: &str) -> AppResult<vote::Model> {
        self.tick();
        self.vote_write()?;
        self.inner.insert_vote(video_id, user_id).await
    }

    async fn delete_vote(&self, vote_id: i64, user_id: &str) -> AppResult<bool> {
        self.tick();
        self.vote_write()?;
        self.inner.delete_vote(vote_id, user_id).await
    }

    async fn insert_video(&self, input: NewVideo) -> AppResult<video::Model> {
        self.tick();
        if self.fail_video_insert.load(Ordering::SeqCst) {
            return Err(AppError::Database("insert failed".to_string()));
        }
        self.inner.insert_video(input).await
    }

    async fn get_video(&self, id: i64) -> AppResult<video::Model> {
        self.tick();
        self.inner.get_video(id).await
    }

    async fn update_video_description(
        &self,
        id: i64,
        owner_id: &str,
        description: Option<String>,
    ) -> AppResult<video::Model> {
        self.tick();
        self.inner
            .update_video_description(id, owner_id, description)
            .await
    }

    async fn delete_video(&self, id: i64, owner_id: &str) -> AppResult<video::Model> {
        self.tick();
        self.inner.delete_video(id, owner_id).await
    }

    async fn videos_with_votes(
        &self,
        shot_id: i64,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<VideoWithVotes>> {
        self.tick();
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(AppError::Database("listing unavailable".to_string()));
        }
        self.inner.videos_with_votes(shot_id, viewer_id).await
    }

    async fn shots_with_top_videos(&self) -> AppResult<Vec<ShotWithTopVideo>> {
        self.tick();
        self.inner.shots_with_top_videos().await
    }
}

/// Object store that records uploads and deletes.
#[derive(Default)]
pub struct RecordingStorage {
    pub uploads: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
    fail_uploads: AtomicBool,
}

impl RecordingStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let storage = Self::default();
        storage.fail_uploads.store(true, Ordering::SeqCst);
        Arc::new(storage)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageBackend for RecordingStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::Storage("bucket unavailable".to_string()));
        }
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.deletes.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.example/{key}")
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.uploads.lock().unwrap().iter().any(|k| k == key))
    }
}
