//! Meta endpoints.

use axum::{Router, extract::State, routing::post};
use napoleon_core::{MAX_DESCRIPTION_LENGTH, MAX_VIDEO_SIZE};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Site metadata for the home and about pages.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub name: String,
    pub tagline: String,
    pub version: String,
    pub background_video_url: Option<String>,
    pub sign_in_providers: Vec<String>,
    pub max_upload_size: u64,
    pub max_description_length: usize,
}

/// Get site metadata.
async fn meta(State(state): State<AppState>) -> ApiResponse<MetaResponse> {
    ApiResponse::ok(MetaResponse {
        name: state.site.name.clone(),
        tagline: state.site.tagline.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        background_video_url: state.site.background_video_url.clone(),
        sign_in_providers: state.identity.providers().to_vec(),
        max_upload_size: MAX_VIDEO_SIZE,
        max_description_length: MAX_DESCRIPTION_LENGTH,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(meta))
}
