//! Progress of uploads in flight, per viewer and shot.

use std::collections::HashMap;
use std::sync::Arc;

use napoleon_core::UploadProgress;
use tokio::sync::RwLock;

type UploadKey = (String, i64);

/// Shared registry of upload progress counters.
///
/// A viewer has at most one counter per shot; starting a new upload for the
/// same shot replaces the old one. A finished counter is handed out once by
/// [`UploadTracker::poll`] and then dropped.
#[derive(Clone, Default)]
pub struct UploadTracker {
    inner: Arc<RwLock<HashMap<UploadKey, UploadProgress>>>,
}

impl UploadTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh counter expecting `total` bytes.
    pub async fn start(&self, user_id: &str, shot_id: i64, total: u64) -> UploadProgress {
        let progress = UploadProgress::new(total);
        self.inner
            .write()
            .await
            .insert((user_id.to_string(), shot_id), progress.clone());
        progress
    }

    /// The counter of the viewer's latest upload to a shot.
    ///
    /// Removes the counter once its upload has completed.
    pub async fn poll(&self, user_id: &str, shot_id: i64) -> Option<UploadProgress> {
        let key = (user_id.to_string(), shot_id);
        let mut inner = self.inner.write().await;
        let progress = inner.get(&key).cloned()?;
        if progress.is_complete() {
            inner.remove(&key);
        }
        Some(progress)
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Forget a counter, e.g. after the upload was rejected.
    pub async fn discard(&self, user_id: &str, shot_id: i64) {
        self.inner
            .write()
            .await
            .remove(&(user_id.to_string(), shot_id));
    }
}
