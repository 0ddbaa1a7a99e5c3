//! Video service: submission upload, owner edits and deletion.

use bytes::Bytes;
use napoleon_common::{AppError, AppResult, StorageService, video_storage_key};
use napoleon_db::entities::video;

use super::identity::Identity;
use super::store::{DataStoreService, NewVideo};

/// Maximum video size (100MB)
pub const MAX_VIDEO_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// A file submitted for a shot.
#[derive(Debug, Clone)]
pub struct UploadInput {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
    pub description: Option<String>,
}

/// Whether a declared media type is a video type.
#[must_use]
pub fn is_video_content_type(content_type: &str) -> bool {
    content_type.starts_with("video/")
}

/// Check a file's declared size and media type. Never touches the network.
pub fn validate_video_file(size: u64, content_type: &str) -> AppResult<()> {
    if size == 0 {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }
    if size > MAX_VIDEO_SIZE {
        return Err(AppError::PayloadTooLarge(
            "File size must be less than 100MB".to_string(),
        ));
    }
    if !is_video_content_type(content_type) {
        return Err(AppError::UnsupportedMediaType(
            "File must be a video".to_string(),
        ));
    }
    Ok(())
}

/// Trim a description; blank becomes `None`.
pub fn normalize_description(description: Option<String>) -> AppResult<Option<String>> {
    let Some(text) = description else {
        return Ok(None);
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if text.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(AppError::Validation(format!(
            "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(Some(text.to_string()))
}

/// Video service for business logic.
#[derive(Clone)]
pub struct VideoService {
    store: DataStoreService,
    storage: StorageService,
}

impl VideoService {
    /// Create a new video service.
    #[must_use]
    pub const fn new(store: DataStoreService, storage: StorageService) -> Self {
        Self { store, storage }
    }

    /// Store a submission and record it against the shot.
    ///
    /// All local checks run before the first remote call. The row is only
    /// inserted once the object store has accepted the blob; if the insert
    /// then fails the blob is removed again.
    pub async fn upload(
        &self,
        viewer: Option<&Identity>,
        shot_id: i64,
        input: UploadInput,
    ) -> AppResult<video::Model> {
        let viewer = viewer.ok_or(AppError::Unauthorized)?;
        if shot_id <= 0 {
            return Err(AppError::BadRequest("Invalid shot ID".to_string()));
        }
        validate_video_file(input.data.len() as u64, &input.content_type)?;
        let description = normalize_description(input.description)?;

        // Check if shot exists
        self.store.get_shot(shot_id).await?;

        let key = video_storage_key(shot_id, &viewer.id, &input.file_name);
        let uploaded = self
            .storage
            .upload(&key, &input.data, &input.content_type)
            .await?;

        let row = NewVideo {
            shot_id,
            user_id: viewer.id.clone(),
            user_email: viewer.email.clone(),
            video_url: uploaded.url.clone(),
            storage_key: uploaded.key.clone(),
            description,
        };

        match self.store.insert_video(row).await {
            Ok(video) => {
                tracing::info!(
                    video_id = video.id,
                    shot_id,
                    user_id = %viewer.id,
                    size = uploaded.size,
                    "Video uploaded"
                );
                Ok(video)
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %uploaded.key, "Video insert failed, removing stored blob");
                if let Err(cleanup) = self.storage.delete(&uploaded.key).await {
                    tracing::warn!(error = %cleanup, key = %uploaded.key, "Failed to remove orphaned blob");
                }
                Err(e)
            }
        }
    }

    /// Replace the description of the viewer's own video.
    pub async fn update_description(
        &self,
        viewer: Option<&Identity>,
        video_id: i64,
        description: Option<String>,
    ) -> AppResult<video::Model> {
        let viewer = viewer.ok_or(AppError::Unauthorized)?;
        let description = normalize_description(description)?;

        self.store
            .update_video_description(video_id, &viewer.id, description)
            .await
    }

    /// Delete the viewer's own video, its votes and its stored blob.
    pub async fn delete(&self, viewer: Option<&Identity>, video_id: i64) -> AppResult<()> {
        let viewer = viewer.ok_or(AppError::Unauthorized)?;

        let deleted = self.store.delete_video(video_id, &viewer.id).await?;

        if let Err(e) = self.storage.delete(&deleted.storage_key).await {
            tracing::warn!(error = %e, key = %deleted.storage_key, "Failed to delete video blob");
        }

        tracing::info!(video_id, user_id = %viewer.id, "Video deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::memory_store::MemoryStore;
    use crate::services::store::DataStore;
    use crate::testing::{CountingStore, RecordingStorage};

    fn viewer(id: &str) -> Identity {
        Identity::new(id, Some(format!("{id}@example.com")))
    }

    fn input(size: usize, content_type: &str) -> UploadInput {
        UploadInput {
            file_name: "take.MOV".to_string(),
            content_type: content_type.to_string(),
            data: Bytes::from(vec![0u8; size]),
            description: Some("  my take  ".to_string()),
        }
    }

    async fn setup() -> (Arc<CountingStore>, Arc<RecordingStorage>, VideoService, i64) {
        let memory = Arc::new(MemoryStore::new());
        let shot = memory.seed_shot("Toulon", "...", 1).await;
        let store = Arc::new(CountingStore::new(memory));
        let storage = RecordingStorage::new();
        let service = VideoService::new(store.clone(), storage.clone());
        (store, storage, service, shot.id)
    }

    #[test]
    fn test_validate_video_file() {
        assert!(validate_video_file(1024, "video/mp4").is_ok());
        assert!(validate_video_file(MAX_VIDEO_SIZE, "video/webm").is_ok());
        assert!(matches!(
            validate_video_file(MAX_VIDEO_SIZE + 1, "video/mp4"),
            Err(AppError::PayloadTooLarge(_))
        ));
        assert!(matches!(
            validate_video_file(10, "image/png"),
            Err(AppError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            validate_video_file(0, "video/mp4"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description(None).unwrap(), None);
        assert_eq!(normalize_description(Some("   ".into())).unwrap(), None);
        assert_eq!(
            normalize_description(Some(" hi ".into())).unwrap().as_deref(),
            Some("hi")
        );
        assert!(normalize_description(Some("x".repeat(MAX_DESCRIPTION_LENGTH + 1))).is_err());
    }

    #[tokio::test]
    async fn test_upload_rejects_101mb_without_network() {
        let (store, storage, service, shot_id) = setup().await;

        let result = service
            .upload(
                Some(&viewer("alice")),
                shot_id,
                input(101 * 1024 * 1024, "video/mp4"),
            )
            .await;

        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
        assert_eq!(store.calls(), 0);
        assert_eq!(storage.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_text_plain_without_network() {
        let (store, storage, service, shot_id) = setup().await;

        let result = service
            .upload(Some(&viewer("alice")), shot_id, input(64, "text/plain"))
            .await;

        assert!(matches!(result, Err(AppError::UnsupportedMediaType(_))));
        assert_eq!(store.calls(), 0);
        assert_eq!(storage.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_requires_identity() {
        let (store, storage, service, shot_id) = setup().await;

        let result = service.upload(None, shot_id, input(64, "video/mp4")).await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
        assert_eq!(store.calls(), 0);
        assert_eq!(storage.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_success() {
        let (store, storage, service, shot_id) = setup().await;

        let video = service
            .upload(Some(&viewer("alice")), shot_id, input(64, "video/quicktime"))
            .await
            .unwrap();

        let prefix = format!("shot-{shot_id}/alice/");
        assert!(video.storage_key.starts_with(&prefix));
        assert!(video.storage_key.ends_with(".mov"));
        assert_eq!(video.video_url, format!("https://cdn.example/{}", video.storage_key));
        assert_eq!(video.description.as_deref(), Some("my take"));
        assert_eq!(video.user_email.as_deref(), Some("alice@example.com"));
        assert_eq!(storage.upload_count(), 1);
        assert!(store.get_video(video.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_upload_to_missing_shot_stores_nothing() {
        let (_, storage, service, _) = setup().await;

        let result = service
            .upload(Some(&viewer("alice")), 404, input(64, "video/mp4"))
            .await;

        assert!(matches!(result, Err(AppError::ShotNotFound(404))));
        assert_eq!(storage.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_leaves_no_row() {
        let memory = Arc::new(MemoryStore::new());
        let shot = memory.seed_shot("Toulon", "...", 1).await;
        let service = VideoService::new(memory.clone(), RecordingStorage::failing());

        let result = service
            .upload(Some(&viewer("alice")), shot.id, input(64, "video/mp4"))
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(memory.videos_with_votes(shot.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_removes_blob() {
        let (store, storage, service, shot_id) = setup().await;
        store.fail_video_insert(true);

        let result = service
            .upload(Some(&viewer("alice")), shot_id, input(64, "video/mp4"))
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(storage.upload_count(), 1);
        assert_eq!(storage.deleted(), storage.uploads.lock().unwrap().clone());
    }

    #[tokio::test]
    async fn test_only_owner_can_edit_or_delete() {
        let (store, storage, service, shot_id) = setup().await;
        let owner = viewer("alice");
        let video = service
            .upload(Some(&owner), shot_id, input(64, "video/mp4"))
            .await
            .unwrap();

        let intruder = viewer("mallory");
        let edit = service
            .update_description(Some(&intruder), video.id, Some("defaced".into()))
            .await;
        let delete = service.delete(Some(&intruder), video.id).await;

        assert!(matches!(edit, Err(AppError::Forbidden(_))));
        assert!(matches!(delete, Err(AppError::Forbidden(_))));
        let unchanged = store.get_video(video.id).await.unwrap();
        assert_eq!(unchanged.description.as_deref(), Some("my take"));
        assert!(storage.deleted().is_empty());

        let edited = service
            .update_description(Some(&owner), video.id, Some("director's cut".into()))
            .await
            .unwrap();
        assert_eq!(edited.description.as_deref(), Some("director's cut"));

        service.delete(Some(&owner), video.id).await.unwrap();
        assert!(matches!(
            store.get_video(video.id).await,
            Err(AppError::VideoNotFound(_))
        ));
        assert_eq!(storage.deleted(), vec![video.storage_key]);
    }
}
