//! Identity provider adapter.
//!
//! Sign-in is federated: the browser is sent to the managed backend's
//! authorize endpoint for a named OAuth provider and comes back with an access
//! token. Every later request presents that token, which is resolved to an
//! [`Identity`] here.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use napoleon_common::{AppError, AppResult, Config};
use serde::{Deserialize, Serialize};
use url::Url;

/// A signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque identity id; owner key for videos and votes.
    pub id: String,
    /// Email address, shown next to submissions.
    pub email: Option<String>,
}

impl Identity {
    /// Create an identity.
    #[must_use]
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
        }
    }
}

/// Capabilities needed from the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// OAuth providers offered for sign-in.
    fn providers(&self) -> &[String];

    /// URL that starts the federated sign-in flow for `provider`.
    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> AppResult<Url>;

    /// Resolve an access token; `None` if the token is invalid or expired.
    async fn user_for_token(&self, access_token: &str) -> AppResult<Option<Identity>>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;
}

/// Shared handle to the configured identity provider.
pub type IdentityService = Arc<dyn IdentityProvider>;

fn ensure_supported(providers: &[String], provider: &str) -> AppResult<()> {
    if providers.iter().any(|p| p == provider) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Unsupported sign-in provider: {provider}"
        )))
    }
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

/// [`IdentityProvider`] backed by the managed backend's auth API.
pub struct SupabaseAuth {
    client: reqwest::Client,
    base_url: Url,
    anon_key: String,
    providers: Vec<String>,
}

impl SupabaseAuth {
    /// Create an adapter for the backend at `base_url`.
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        anon_key: String,
        providers: Vec<String>,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid backend URL: {e}")))?;
        Ok(Self {
            client,
            base_url,
            anon_key,
            providers,
        })
    }

    /// Create an adapter from the application configuration.
    pub fn from_config(config: &Config, client: reqwest::Client) -> AppResult<Self> {
        Self::new(
            client,
            &config.backend.url,
            config.backend.anon_key.clone(),
            config.auth.providers.clone(),
        )
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Config(format!("Invalid auth endpoint: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    fn providers(&self) -> &[String] {
        &self.providers
    }

    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> AppResult<Url> {
        ensure_supported(&self.providers, provider)?;

        let mut url = self.endpoint("/auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to);
        Ok(url)
    }

    async fn user_for_token(&self, access_token: &str) -> AppResult<Option<Identity>> {
        let response = self
            .client
            .get(self.endpoint("/auth/v1/user")?)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("User lookup failed: {e}")))?;

        match response.status() {
            s if s.is_success() => {
                let user: AuthUser = response
                    .json()
                    .await
                    .map_err(|e| AppError::Identity(format!("Malformed user response: {e}")))?;
                Ok(Some(Identity::new(user.id, user.email)))
            }
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                tracing::debug!("Access token rejected by identity provider");
                Ok(None)
            }
            s => Err(AppError::Identity(format!("User lookup rejected ({s})"))),
        }
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .client
            .post(self.endpoint("/auth/v1/logout")?)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Sign-out failed: {e}")))?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(AppError::Identity(format!("Sign-out rejected ({status})")))
        }
    }
}

/// [`IdentityProvider`] with a fixed token table, for tests and local development.
#[derive(Default)]
pub struct StaticIdentityProvider {
    providers: Vec<String>,
    tokens: HashMap<String, Identity>,
    sign_in_base: Option<Url>,
}

impl StaticIdentityProvider {
    /// Create a provider offering the given sign-in providers.
    #[must_use]
    pub fn new(providers: Vec<String>) -> Self {
        Self {
            providers,
            tokens: HashMap::new(),
            sign_in_base: Url::parse("http://localhost/auth/v1/authorize").ok(),
        }
    }

    /// Accept `token` as a session for `identity`.
    #[must_use]
    pub fn with_user(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    fn providers(&self) -> &[String] {
        &self.providers
    }

    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> AppResult<Url> {
        ensure_supported(&self.providers, provider)?;

        let mut url = self
            .sign_in_base
            .clone()
            .ok_or_else(|| AppError::Internal("Sign-in URL unavailable".to_string()))?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to);
        Ok(url)
    }

    async fn user_for_token(&self, access_token: &str) -> AppResult<Option<Identity>> {
        Ok(self.tokens.get(access_token).cloned())
    }

    async fn sign_out(&self, _access_token: &str) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn supabase() -> SupabaseAuth {
        SupabaseAuth::new(
            reqwest::Client::new(),
            "https://abc.supabase.co",
            "anon".to_string(),
            vec!["google".to_string(), "discord".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_sign_in_url() {
        let url = supabase()
            .sign_in_url("google", "https://napoleon.example/")
            .unwrap();

        assert_eq!(url.path(), "/auth/v1/authorize");
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(query["provider"], "google");
        assert_eq!(query["redirect_to"], "https://napoleon.example/");
    }

    #[test]
    fn test_sign_in_rejects_unknown_provider() {
        let result = supabase().sign_in_url("myspace", "https://napoleon.example/");
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_invalid_backend_url() {
        let result = SupabaseAuth::new(
            reqwest::Client::new(),
            "not a url",
            "anon".to_string(),
            vec![],
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_static_provider_tokens() {
        let provider = StaticIdentityProvider::new(vec!["discord".to_string()]).with_user(
            "token-a",
            Identity::new("user-a", Some("a@example.com".to_string())),
        );

        let found = provider.user_for_token("token-a").await.unwrap();
        assert_eq!(found.map(|i| i.id), Some("user-a".to_string()));
        assert!(provider.user_for_token("nope").await.unwrap().is_none());
        assert!(provider.sign_in_url("discord", "/").is_ok());
    }
}
