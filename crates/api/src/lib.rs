//! HTTP API layer for the Napoleon film site.
//!
//! - **Endpoints**: one JSON surface per page (home, shots, upload, film)
//! - **Extractors**: the viewer's identity and session
//! - **Middleware**: access-token resolution from header or cookie
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod uploads;

pub use endpoints::{MAX_REQUEST_BODY, router};
pub use middleware::{AppState, auth_middleware};
pub use uploads::UploadTracker;
