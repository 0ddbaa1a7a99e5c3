//! Current-session state.

use tokio::sync::{Mutex, watch};

use napoleon_common::{AppError, AppResult};

use super::identity::{Identity, IdentityService};

/// The session of one client: its access token and the identity behind it.
///
/// Observers can [`subscribe`](Self::subscribe) to be told when the identity
/// changes (sign-in, sign-out, expired token).
pub struct AuthSession {
    provider: IdentityService,
    token: Mutex<Option<String>>,
    identity: watch::Sender<Option<Identity>>,
}

impl AuthSession {
    /// A session with nobody signed in.
    #[must_use]
    pub fn anonymous(provider: IdentityService) -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            provider,
            token: Mutex::new(None),
            identity,
        }
    }

    /// Resolve `access_token` and adopt it if valid.
    ///
    /// An invalid token leaves the session signed out.
    pub async fn restore(&self, access_token: &str) -> AppResult<Option<Identity>> {
        let identity = self.provider.user_for_token(access_token).await?;

        let mut token = self.token.lock().await;
        *token = identity.as_ref().map(|_| access_token.to_string());
        self.identity.send_replace(identity.clone());

        Ok(identity)
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    /// The signed-in identity, or `Unauthorized`.
    pub fn require(&self) -> AppResult<Identity> {
        self.current().ok_or(AppError::Unauthorized)
    }

    /// Watch identity changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    /// URL that starts sign-in with a named provider.
    pub fn sign_in_url(&self, provider: &str, redirect_to: &str) -> AppResult<url::Url> {
        self.provider.sign_in_url(provider, redirect_to)
    }

    /// Providers offered for sign-in.
    #[must_use]
    pub fn providers(&self) -> Vec<String> {
        self.provider.providers().to_vec()
    }

    /// End the session. Signing out while signed out is a no-op.
    pub async fn sign_out(&self) -> AppResult<()> {
        let token = self.token.lock().await.take();
        if let Some(token) = token {
            self.provider.sign_out(&token).await?;
            tracing::debug!("Session signed out");
        }
        self.identity.send_replace(None);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::identity::StaticIdentityProvider;

    fn session() -> AuthSession {
        let provider = StaticIdentityProvider::new(vec!["google".to_string()])
            .with_user("good", Identity::new("u1", Some("u1@example.com".to_string())));
        AuthSession::anonymous(Arc::new(provider))
    }

    #[tokio::test]
    async fn test_restore_valid_token() {
        let session = session();
        let identity = session.restore("good").await.unwrap();

        assert_eq!(identity.map(|i| i.id), Some("u1".to_string()));
        assert_eq!(session.require().unwrap().id, "u1");
    }

    #[tokio::test]
    async fn test_restore_invalid_token_stays_anonymous() {
        let session = session();

        assert!(session.restore("forged").await.unwrap().is_none());
        assert!(matches!(session.require(), Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_subscribers_see_sign_in_and_sign_out() {
        let session = session();
        let mut rx = session.subscribe();

        session.restore("good").await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_some());

        session.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
        assert!(session.current().is_none());
    }
}
