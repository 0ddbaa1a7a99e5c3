//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use napoleon_common::{Config, StorageService, config::SiteConfig};
use napoleon_core::{
    AuthSession, DataStoreService, IdentityService, ShotService, VideoService, VoteService,
};

use crate::uploads::UploadTracker;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub shot_service: ShotService,
    pub vote_service: VoteService,
    pub video_service: VideoService,
    pub identity: IdentityService,
    pub uploads: UploadTracker,
    pub site: SiteConfig,
    /// Public URL of the site; sign-in redirects must stay on its origin.
    pub site_url: String,
    /// Where the identity provider returns the browser after sign-in.
    pub sign_in_redirect: String,
    /// Cookie carrying the access token for browser sessions.
    pub cookie_name: String,
}

impl AppState {
    /// Wire the services over a data store, an object store and an identity provider.
    #[must_use]
    pub fn new(
        config: &Config,
        store: DataStoreService,
        storage: StorageService,
        identity: IdentityService,
    ) -> Self {
        Self {
            shot_service: ShotService::new(store.clone()),
            vote_service: VoteService::new(store.clone()),
            video_service: VideoService::new(store, storage),
            identity,
            uploads: UploadTracker::new(),
            site: config.site.clone(),
            site_url: config.server.url.clone(),
            sign_in_redirect: config.sign_in_redirect().to_string(),
            cookie_name: config.auth.cookie_name.clone(),
        }
    }
}

/// The access token presented with a request: bearer header first, then cookie.
fn access_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(auth_header) = headers.get(AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Authentication middleware.
///
/// Every request gets an [`AuthSession`]; a valid token additionally puts the
/// viewer's [`Identity`](napoleon_core::Identity) into the extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let session = AuthSession::anonymous(state.identity.clone());

    if let Some(token) = access_token(req.headers(), &state.cookie_name) {
        match session.restore(&token).await {
            Ok(Some(identity)) => {
                tracing::debug!(user_id = %identity.id, "Authenticated request");
                req.extensions_mut().insert(identity);
            }
            Ok(None) => tracing::debug!("Access token rejected"),
            Err(e) => tracing::warn!(error = %e, "Failed to resolve access token"),
        }
    }

    req.extensions_mut().insert(Arc::new(session));
    next.run(req).await
}
