//! Shot endpoints.

use axum::{Json, Router, extract::State, routing::post};
use napoleon_common::AppResult;
use napoleon_core::{ShotDetailView, ShotListView, ShotSummary, TopVideo, VoteOutcome};
use napoleon_db::{entities::shot, repositories::VideoWithVotes};
use serde::{Deserialize, Serialize};

use crate::{extractors::MaybeAuthUser, middleware::AppState, response::ApiResponse};

/// Shot response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotResponse {
    pub id: i64,
    pub title: String,
    pub script_excerpt: String,
    pub order_index: i32,
    pub created_at: String,
}

impl From<shot::Model> for ShotResponse {
    fn from(s: shot::Model) -> Self {
        Self {
            id: s.id,
            title: s.title,
            script_excerpt: s.script_excerpt,
            order_index: s.order_index,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

/// A submission with its vote tally for the viewer.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedVideoResponse {
    pub id: i64,
    pub shot_id: i64,
    pub user_id: String,
    pub user_email: Option<String>,
    pub video_url: String,
    pub description: Option<String>,
    pub created_at: String,
    pub votes_count: i64,
    pub has_voted: bool,
}

impl From<VideoWithVotes> for RankedVideoResponse {
    fn from(v: VideoWithVotes) -> Self {
        Self {
            id: v.id,
            shot_id: v.shot_id,
            user_id: v.user_id,
            user_email: v.user_email,
            video_url: v.video_url,
            description: v.description,
            created_at: v.created_at.to_rfc3339(),
            votes_count: v.votes_count,
            has_voted: v.has_voted,
        }
    }
}

/// Shot detail page state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotDetailResponse {
    pub shot: ShotResponse,
    pub videos: Vec<RankedVideoResponse>,
    /// Banner to show, e.g. after a vote that could not be recorded.
    pub error: Option<String>,
    /// Outcome of the vote this response answers, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote: Option<VoteOutcome>,
}

impl ShotDetailResponse {
    pub(super) fn from_view(view: &ShotDetailView, vote: Option<VoteOutcome>) -> Self {
        Self {
            shot: view.shot().clone().into(),
            videos: view.videos().iter().cloned().map(Into::into).collect(),
            error: view.error().map(str::to_string),
            vote,
        }
    }
}

/// Top submission of a shot.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopVideoResponse {
    pub id: i64,
    pub url: String,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub votes: i64,
}

impl From<TopVideo> for TopVideoResponse {
    fn from(v: TopVideo) -> Self {
        Self {
            id: v.id,
            url: v.url,
            user_id: v.user_id,
            user_email: v.user_email,
            votes: v.votes,
        }
    }
}

/// A shot list row.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotSummaryResponse {
    pub id: i64,
    pub title: String,
    pub script_excerpt: String,
    pub order_index: i32,
    pub top_video: Option<TopVideoResponse>,
}

impl From<ShotSummary> for ShotSummaryResponse {
    fn from(s: ShotSummary) -> Self {
        Self {
            id: s.id,
            title: s.title,
            script_excerpt: s.script_excerpt,
            order_index: s.order_index,
            top_video: s.top_video.map(Into::into),
        }
    }
}

/// Shots with their top submissions.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopShotsResponse {
    pub shots: Vec<ShotSummaryResponse>,
    pub covered: usize,
}

/// Show shot request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowShotRequest {
    pub shot_id: i64,
}

/// List all shots in film order.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<ShotResponse>>> {
    let shots = state.shot_service.list().await?;
    Ok(ApiResponse::ok(shots.into_iter().map(Into::into).collect()))
}

/// A shot with its submissions, most-voted first.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowShotRequest>,
) -> AppResult<ApiResponse<ShotDetailResponse>> {
    let view = ShotDetailView::load(
        state.shot_service.clone(),
        state.vote_service.clone(),
        req.shot_id,
        viewer,
    )
    .await?;

    Ok(ApiResponse::ok(ShotDetailResponse::from_view(&view, None)))
}

/// Every shot with its top-voted submission.
async fn top(State(state): State<AppState>) -> AppResult<ApiResponse<TopShotsResponse>> {
    let view = ShotListView::load(&state.shot_service).await?;
    let covered = view.covered();

    Ok(ApiResponse::ok(TopShotsResponse {
        shots: view.shots.into_iter().map(Into::into).collect(),
        covered,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/show", post(show))
        .route("/top", post(top))
}
