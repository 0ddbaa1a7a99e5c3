//! API endpoints.

mod auth;
mod film;
mod meta;
mod shots;
mod videos;

use axum::{Router, http::Uri};

pub use videos::MAX_REQUEST_BODY;

use crate::middleware::AppState;
use crate::response::ApiResponse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/meta", meta::router())
        .nest("/auth", auth::router())
        .nest("/shots", shots::router())
        .nest("/videos", videos::router())
        .nest("/film", film::router())
        .fallback(no_such_endpoint)
}

async fn no_such_endpoint(uri: Uri) -> ApiResponse<()> {
    tracing::debug!(path = %uri.path(), "Unknown API endpoint");
    ApiResponse::<()>::err("NO_SUCH_ENDPOINT", "No such endpoint")
}
