//! Authentication endpoints.
//!
//! Sign-in is delegated to the identity provider; the site only hands out
//! the authorize URL and keeps the returned access token in a cookie.

use axum::{Json, Router, extract::State, routing::post};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use napoleon_common::{AppError, AppResult};
use napoleon_core::Identity;
use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::{extractors::Session, middleware::AppState, response::ApiResponse};

/// Signin request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    #[validate(length(min = 1, max = 32))]
    pub provider: String,
    /// Overrides the configured redirect target. Must be on the site's origin.
    #[validate(url)]
    pub redirect_to: Option<String>,
}

/// Signin response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub url: String,
}

/// Whether `target` shares scheme, host and port with `site`.
fn same_origin(target: &str, site: &str) -> bool {
    match (Url::parse(target), Url::parse(site)) {
        (Ok(target), Ok(site)) => target.origin() == site.origin(),
        _ => false,
    }
}

/// Start the federated sign-in flow.
async fn signin(
    State(state): State<AppState>,
    Session(session): Session,
    Json(req): Json<SigninRequest>,
) -> AppResult<ApiResponse<SigninResponse>> {
    req.validate()?;
    if let Some(target) = &req.redirect_to
        && !same_origin(target, &state.site_url)
    {
        return Err(AppError::BadRequest(
            "redirectTo must point to this site".to_string(),
        ));
    }

    let redirect_to = req.redirect_to.as_deref().unwrap_or(&state.sign_in_redirect);
    let url = session.sign_in_url(&req.provider, redirect_to)?;

    tracing::debug!(provider = %req.provider, "Sign-in started");
    Ok(ApiResponse::ok(SigninResponse { url: url.into() }))
}

/// Callback request carrying the token the provider issued.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRequest {
    #[validate(length(min = 1))]
    pub access_token: String,
}

/// The signed-in identity.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub id: String,
    pub email: Option<String>,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
        }
    }
}

/// Session response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: Option<IdentityResponse>,
}

/// Finish sign-in: verify the token and keep it in the session cookie.
async fn callback(
    State(state): State<AppState>,
    Session(session): Session,
    jar: CookieJar,
    Json(req): Json<CallbackRequest>,
) -> AppResult<(CookieJar, ApiResponse<SessionResponse>)> {
    req.validate()?;

    let identity = session
        .restore(&req.access_token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let cookie = Cookie::build((state.cookie_name.clone(), req.access_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    tracing::info!(user_id = %identity.id, "Signed in");
    Ok((
        jar.add(cookie),
        ApiResponse::ok(SessionResponse {
            user: Some(identity.into()),
        }),
    ))
}

/// Current session.
async fn session(Session(session): Session) -> ApiResponse<SessionResponse> {
    ApiResponse::ok(SessionResponse {
        user: session.current().map(Into::into),
    })
}

/// End the session and drop the cookie.
async fn signout(
    State(state): State<AppState>,
    Session(session): Session,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<()>)> {
    session.sign_out().await?;

    let jar = jar.remove(Cookie::build((state.cookie_name.clone(), "")).path("/"));
    Ok((jar, ApiResponse::ok(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signin", post(signin))
        .route("/callback", post(callback))
        .route("/session", post(session))
        .route("/signout", post(signout))
}
