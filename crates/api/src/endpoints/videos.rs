//! Video endpoints: voting, upload and owner edits.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::Field},
    http::{HeaderMap, header::CONTENT_LENGTH},
    routing::post,
};
use bytes::{Bytes, BytesMut};
use napoleon_common::{AppError, AppResult};
use napoleon_core::{
    Identity, MAX_VIDEO_SIZE, ShotDetailView, UploadForm, UploadProgress,
    is_video_content_type, validate_video_file,
};
use napoleon_db::entities::video;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::shots::ShotDetailResponse;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Largest accepted request body: a maximal video plus multipart framing.
pub const MAX_REQUEST_BODY: usize = MAX_VIDEO_SIZE as usize + 1024 * 1024;

/// Video response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: i64,
    pub shot_id: i64,
    pub user_id: String,
    pub user_email: Option<String>,
    pub video_url: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<video::Model> for VideoResponse {
    fn from(v: video::Model) -> Self {
        Self {
            id: v.id,
            shot_id: v.shot_id,
            user_id: v.user_id,
            user_email: v.user_email,
            video_url: v.video_url,
            description: v.description,
            created_at: v.created_at.to_rfc3339(),
        }
    }
}

/// Vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub shot_id: i64,
    pub video_id: i64,
}

/// Toggle the viewer's vote and return the reconciled shot page.
///
/// A vote the store refused still answers 200: the page falls back to the
/// authoritative tallies and carries the error banner.
async fn vote(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<VoteRequest>,
) -> AppResult<ApiResponse<ShotDetailResponse>> {
    let mut view = ShotDetailView::load(
        state.shot_service.clone(),
        state.vote_service.clone(),
        req.shot_id,
        viewer,
    )
    .await?;

    let outcome = match view.toggle_vote(req.video_id).await {
        Ok(outcome) => Some(outcome),
        Err(e) if e.is_server_error() => None,
        Err(e) => return Err(e),
    };

    Ok(ApiResponse::ok(ShotDetailResponse::from_view(&view, outcome)))
}

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Invalid multipart data: {e}"))
}

fn content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Buffer a file field, counting bytes as they arrive.
///
/// Stops as soon as the file outgrows the size limit.
async fn read_file(
    field: &mut Field<'_>,
    content_type: &str,
    progress: &UploadProgress,
) -> AppResult<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        validate_video_file((buf.len() + chunk.len()) as u64, content_type)?;
        progress.advance(chunk.len() as u64);
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

/// Read the form fields and submit the upload.
///
/// `shotId` has to come before `file` so that the shot is checked and
/// progress is tracked before the body is consumed.
async fn receive_upload(
    state: &AppState,
    viewer: &Identity,
    declared_size: u64,
    mut multipart: Multipart,
    shot_id: &mut Option<i64>,
) -> AppResult<video::Model> {
    let mut form: Option<UploadForm> = None;
    let mut description: Option<String> = None;
    let mut file: Option<(String, String, Bytes)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "shotId" => {
                let text = field.text().await.map_err(multipart_error)?;
                let id = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::BadRequest("Invalid shot ID".to_string()))?;
                let loaded = UploadForm::load(&state.shot_service, id).await?;
                let progress = state.uploads.start(&viewer.id, id, declared_size).await;
                *shot_id = Some(id);
                form = Some(loaded.with_progress(progress));
            }
            "description" => {
                description = Some(field.text().await.map_err(multipart_error)?);
            }
            "file" => {
                let Some(form) = form.as_ref() else {
                    return Err(AppError::BadRequest(
                        "shotId must be sent before file".to_string(),
                    ));
                };
                let file_name = field.file_name().unwrap_or("video").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                if !is_video_content_type(&content_type) {
                    return Err(AppError::UnsupportedMediaType(
                        "File must be a video".to_string(),
                    ));
                }
                let data = read_file(&mut field, &content_type, form.progress()).await?;
                file = Some((file_name, content_type, data));
            }
            _ => {}
        }
    }

    let mut form = form.ok_or_else(|| AppError::BadRequest("Missing shotId".to_string()))?;
    if let Some(description) = description {
        form.set_description(description);
    }

    let data = match file {
        Some((file_name, content_type, data)) => {
            form.select_file(&file_name, &content_type, data.len() as u64)?;
            data
        }
        None => Bytes::new(),
    };

    form.submit(&state.video_service, Some(viewer), data).await
}

/// Upload a video for a shot via multipart form.
async fn create(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> AppResult<ApiResponse<VideoResponse>> {
    let mut shot_id = None;
    let result = receive_upload(
        &state,
        &viewer,
        content_length(&headers),
        multipart,
        &mut shot_id,
    )
    .await;

    if let (Err(e), Some(shot_id)) = (&result, shot_id) {
        if e.is_validation() {
            tracing::debug!(error = %e, shot_id, user_id = %viewer.id, "Upload rejected");
        } else {
            tracing::warn!(error = %e, shot_id, user_id = %viewer.id, "Upload failed");
        }
        state.uploads.discard(&viewer.id, shot_id).await;
    }

    Ok(ApiResponse::ok(result?.into()))
}

/// Update request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoRequest {
    pub video_id: i64,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Change the description of the viewer's own video.
async fn update(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateVideoRequest>,
) -> AppResult<ApiResponse<VideoResponse>> {
    req.validate()?;

    let video = state
        .video_service
        .update_description(Some(&viewer), req.video_id, req.description)
        .await?;

    Ok(ApiResponse::ok(video.into()))
}

/// Delete request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVideoRequest {
    pub video_id: i64,
}

/// Delete the viewer's own video.
async fn delete(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteVideoRequest>,
) -> AppResult<ApiResponse<()>> {
    state.video_service.delete(Some(&viewer), req.video_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Upload progress request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgressRequest {
    pub shot_id: i64,
}

/// Upload progress response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgressResponse {
    pub active: bool,
    pub transferred: u64,
    pub total: u64,
    pub percent: u8,
}

/// Progress of the viewer's latest upload to a shot.
///
/// A completed upload reports 100% once; later polls see no active upload.
async fn upload_progress(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UploadProgressRequest>,
) -> ApiResponse<UploadProgressResponse> {
    let response = match state.uploads.poll(&viewer.id, req.shot_id).await {
        Some(progress) => UploadProgressResponse {
            active: true,
            transferred: progress.transferred(),
            total: progress.total(),
            percent: progress.percent(),
        },
        None => UploadProgressResponse {
            active: false,
            transferred: 0,
            total: 0,
            percent: 0,
        },
    };
    ApiResponse::ok(response)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vote", post(vote))
        .route(
            "/create",
            post(create).layer(DefaultBodyLimit::max(MAX_REQUEST_BODY)),
        )
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/upload-progress", post(upload_progress))
}
