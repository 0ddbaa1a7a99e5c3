//! Upload form state: file selection, local validation and progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use bytes::Bytes;
use napoleon_common::{AppError, AppResult};
use napoleon_db::entities::{shot, video};

use crate::services::{Identity, ShotService, UploadInput, VideoService, validate_video_file};

/// Percentage of `total` covered by `transferred`, rounded and clamped to 0..=100.
#[must_use]
pub fn progress_percent(transferred: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (transferred as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Byte counter for one upload, cheap to clone and share across tasks.
#[derive(Debug, Clone, Default)]
pub struct UploadProgress {
    transferred: Arc<AtomicU64>,
    total: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
}

impl UploadProgress {
    /// A counter expecting `total` bytes.
    #[must_use]
    pub fn new(total: u64) -> Self {
        let progress = Self::default();
        progress.set_total(total);
        progress
    }

    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Record `bytes` more bytes transferred.
    pub fn advance(&self, bytes: u64) {
        self.transferred.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Mark the transfer as finished.
    pub fn complete(&self) {
        let total = self.total.load(Ordering::Relaxed);
        self.transferred.store(total, Ordering::Relaxed);
        self.finished.store(true, Ordering::Release);
    }

    /// Whether the upload went through.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn transferred(&self) -> u64 {
        self.transferred.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        progress_percent(self.transferred(), self.total())
    }
}

/// A file chosen in the form; its bytes arrive on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

/// Where the form is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Uploading,
    Complete { video_id: i64 },
    Failed,
}

/// State of the upload page for one shot.
pub struct UploadForm {
    shot: shot::Model,
    file: Option<SelectedFile>,
    description: String,
    status: UploadStatus,
    error: Option<String>,
    progress: UploadProgress,
}

impl UploadForm {
    /// A blank form for `shot`.
    #[must_use]
    pub fn new(shot: shot::Model) -> Self {
        Self {
            shot,
            file: None,
            description: String::new(),
            status: UploadStatus::Idle,
            error: None,
            progress: UploadProgress::default(),
        }
    }

    /// Fetch the shot and open a blank form for it.
    pub async fn load(shots: &ShotService, shot_id: i64) -> AppResult<Self> {
        Ok(Self::new(shots.get(shot_id).await?))
    }

    #[must_use]
    pub const fn shot(&self) -> &shot::Model {
        &self.shot
    }

    #[must_use]
    pub const fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    #[must_use]
    pub const fn status(&self) -> UploadStatus {
        self.status
    }

    /// The user-visible error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Shared progress counter for the current file.
    #[must_use]
    pub const fn progress(&self) -> &UploadProgress {
        &self.progress
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Report progress through a shared counter instead of a private one.
    #[must_use]
    pub fn with_progress(mut self, progress: UploadProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Choose a file. A rejected file clears the selection and sets the error.
    pub fn select_file(&mut self, name: &str, content_type: &str, size: u64) -> AppResult<()> {
        if let Err(e) = validate_video_file(size, content_type) {
            self.file = None;
            self.error = Some(e.user_message());
            return Err(e);
        }
        self.file = Some(SelectedFile {
            name: name.to_string(),
            content_type: content_type.to_string(),
            size,
        });
        self.error = None;
        self.progress.set_total(size);
        Ok(())
    }

    /// Whether the submit button is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.file.is_some() && self.status != UploadStatus::Uploading
    }

    /// Upload the selected file's bytes.
    pub async fn submit(
        &mut self,
        videos: &VideoService,
        viewer: Option<&Identity>,
        data: Bytes,
    ) -> AppResult<video::Model> {
        let Some(file) = self.file.clone() else {
            let err = AppError::BadRequest("Please select a file".to_string());
            self.error = Some(err.user_message());
            return Err(err);
        };
        if self.status == UploadStatus::Uploading {
            return Err(AppError::Conflict("Upload already in progress".to_string()));
        }

        self.status = UploadStatus::Uploading;
        self.error = None;

        let description = (!self.description.trim().is_empty()).then(|| self.description.clone());
        let input = UploadInput {
            file_name: file.name,
            content_type: file.content_type,
            data,
            description,
        };

        match videos.upload(viewer, self.shot.id, input).await {
            Ok(video) => {
                self.progress.complete();
                self.status = UploadStatus::Complete { video_id: video.id };
                Ok(video)
            }
            Err(e) => {
                self.status = UploadStatus::Failed;
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
