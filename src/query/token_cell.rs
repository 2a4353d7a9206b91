//! Expiry-aware holder for the current token and the transport bound to it.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::{AccessToken, AuthError, TokenProvider};
use crate::clients::graphql::GraphqlClient;
use crate::config::{ClientConfig, TokenRefresh};

#[derive(Debug)]
struct Bound {
    token: AccessToken,
    transport: Arc<GraphqlClient>,
}

/// Holds an [`AccessToken`] and the [`GraphqlClient`] that sends it.
///
/// Under [`TokenRefresh::OnExpiry`], a token that expires within the
/// configured leeway is replaced before the transport is handed out. The
/// lock is held across the exchange, so concurrent callers share a single
/// refresh and all observe the new token.
#[derive(Debug)]
pub struct TokenCell {
    config: ClientConfig,
    provider: TokenProvider,
    current: Mutex<Bound>,
}

// Verify TokenCell is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TokenCell>();
};

impl TokenCell {
    /// Binds `token` to a new transport for `config.endpoint()`.
    #[must_use]
    pub fn new(config: &ClientConfig, token: AccessToken) -> Self {
        let transport = Arc::new(GraphqlClient::new(
            config.endpoint().clone(),
            &token,
            Some(config),
        ));
        Self {
            provider: TokenProvider::new(config),
            config: config.clone(),
            current: Mutex::new(Bound { token, transport }),
        }
    }

    /// Returns a copy of the current token without refreshing it.
    pub async fn token(&self) -> AccessToken {
        self.current.lock().await.token.clone()
    }

    /// Returns the transport for the next request, refreshing the token first
    /// if the refresh policy calls for it.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of a failed refresh. The previous token is
    /// kept, so a later call tries again.
    pub async fn transport(&self) -> Result<Arc<GraphqlClient>, AuthError> {
        let mut current = self.current.lock().await;

        if self.needs_refresh(&current.token) {
            tracing::info!(expires_at = ?current.token.expires_at(), "access token expiring, refreshing");
            self.rebind(&mut current).await?;
        }

        Ok(Arc::clone(&current.transport))
    }

    /// Replaces the token unconditionally.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of the failed exchange.
    pub async fn refresh(&self) -> Result<AccessToken, AuthError> {
        let mut current = self.current.lock().await;
        self.rebind(&mut current).await?;
        Ok(current.token.clone())
    }

    fn needs_refresh(&self, token: &AccessToken) -> bool {
        match self.config.token_refresh() {
            TokenRefresh::Never => false,
            TokenRefresh::OnExpiry => {
                chrono::Duration::from_std(self.config.token_refresh_leeway())
                    .map_or(true, |leeway| token.expires_within(leeway))
            }
        }
    }

    async fn rebind(&self, current: &mut Bound) -> Result<(), AuthError> {
        let token = self
            .provider
            .fetch_token(self.config.credentials())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "access token refresh failed");
                e
            })?;

        current.transport = Arc::new(GraphqlClient::new(
            self.config.endpoint().clone(),
            &token,
            Some(&self.config),
        ));
        current.token = token;
        Ok(())
    }
}
