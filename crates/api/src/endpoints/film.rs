//! Full-film endpoint.

use axum::{Json, Router, extract::State, routing::post};
use napoleon_common::AppResult;
use napoleon_core::FilmPlayer;
use napoleon_db::repositories::ShotWithTopVideo;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Player control applied after positioning.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilmAction {
    Next,
    Previous,
    ToggleAutoplay,
    /// The current video finished playing.
    Ended,
}

/// Film request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilmRequest {
    /// Zero-based shot index; clamped into range.
    pub index: i64,
    pub autoplay: bool,
    pub action: Option<FilmAction>,
}

/// One shot of the film with the take that plays for it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmShotResponse {
    pub id: i64,
    pub title: String,
    pub script_excerpt: String,
    pub order_index: i32,
    pub video_url: Option<String>,
    pub video_id: Option<i64>,
    pub votes: i64,
}

impl From<&ShotWithTopVideo> for FilmShotResponse {
    fn from(s: &ShotWithTopVideo) -> Self {
        Self {
            id: s.id,
            title: s.title.clone(),
            script_excerpt: s.script_excerpt.clone(),
            order_index: s.order_index,
            video_url: s.top_video_url.clone(),
            video_id: s.top_video_id,
            votes: s.top_video_votes.unwrap_or(0),
        }
    }
}

/// Player state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmResponse {
    pub index: usize,
    /// One-based position, absent for an empty film.
    pub position: Option<usize>,
    pub total: usize,
    pub autoplay: bool,
    pub has_previous: bool,
    pub has_next: bool,
    pub current: Option<FilmShotResponse>,
    pub shots: Vec<FilmShotResponse>,
}

impl From<&FilmPlayer> for FilmResponse {
    fn from(player: &FilmPlayer) -> Self {
        Self {
            index: player.index(),
            position: player.position().map(|(position, _)| position),
            total: player.len(),
            autoplay: player.autoplay(),
            has_previous: player.has_previous(),
            has_next: player.has_next(),
            current: player.current().map(Into::into),
            shots: player.shots().iter().map(Into::into).collect(),
        }
    }
}

/// The film as a sequence of top-voted takes.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<FilmRequest>,
) -> AppResult<ApiResponse<FilmResponse>> {
    let mut player = FilmPlayer::load(&state.shot_service).await?;
    player.jump_to(req.index);
    player.set_autoplay(req.autoplay);

    match req.action {
        Some(FilmAction::Next) => player.next(),
        Some(FilmAction::Previous) => player.previous(),
        Some(FilmAction::ToggleAutoplay) => player.toggle_autoplay(),
        Some(FilmAction::Ended) => {
            player.on_playback_ended();
        }
        None => {}
    }

    Ok(ApiResponse::ok(FilmResponse::from(&player)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/show", post(show))
}
