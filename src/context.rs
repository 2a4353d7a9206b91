//! Process-scoped owner of the shared [`QueryClient`].
//!
//! An [`ApiContext`] bootstraps its client lazily on first use. Concurrent
//! callers that arrive while the token exchange is in flight wait on the same
//! attempt, so the exchange runs once no matter how many tasks ask. The
//! outcome is memoized, including a failure: every later caller gets the same
//! [`AuthError`] without another token request.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strise_api::{ApiContext, queries};
//!
//! let context = Arc::new(ApiContext::from_env()?);
//!
//! let (portfolios, countries) = tokio::join!(
//!     queries::get_portfolios(&context),
//!     queries::get_countries(&context, "norway"),
//! );
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use crate::auth::AuthError;
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::query::QueryClient;

/// Lifecycle of the shared client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientState {
    /// No caller has asked for the client yet.
    Uninitialized,
    /// The token exchange is in flight.
    Bootstrapping,
    /// The client is available.
    Ready,
    /// The token exchange failed. Terminal for this context.
    Failed,
}

/// Owns the configuration and the lazily created shared [`QueryClient`].
///
/// # Thread Safety
///
/// `ApiContext` is `Send + Sync`; share it behind an `Arc` or a reference.
#[derive(Debug)]
pub struct ApiContext {
    config: ClientConfig,
    client: OnceCell<Result<Arc<QueryClient>, AuthError>>,
    bootstrapping: AtomicBool,
}

// Verify ApiContext is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiContext>();
};

/// Clears the in-flight flag when a bootstrap attempt ends or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ApiContext {
    /// Creates a context. No network traffic happens until the client is
    /// first requested.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
            bootstrapping: AtomicBool::new(false),
        }
    }

    /// Creates a context from `STRISE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        ClientConfig::from_env().map(Self::new)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ClientState {
        match self.client.get() {
            Some(Ok(_)) => ClientState::Ready,
            Some(Err(_)) => ClientState::Failed,
            None if self.bootstrapping.load(Ordering::SeqCst) => ClientState::Bootstrapping,
            None => ClientState::Uninitialized,
        }
    }

    /// Returns the shared client, bootstrapping it on first call.
    ///
    /// # Errors
    ///
    /// Returns the memoized [`AuthError`] if the bootstrap failed.
    pub async fn client(&self) -> Result<Arc<QueryClient>, AuthError> {
        self.client
            .get_or_init(|| async {
                let _in_flight = InFlight::start(&self.bootstrapping);
                tracing::info!(endpoint = %self.config.endpoint(), "bootstrapping query client");

                let result = QueryClient::bootstrap(&self.config).await.map(Arc::new);
                if let Err(e) = &result {
                    tracing::error!(error = %e, "query client bootstrap failed");
                }
                result
            })
            .await
            .clone()
    }

    /// Like [`client`](Self::client), but stops waiting when `cancel` is
    /// triggered.
    ///
    /// A cancelled attempt is not memoized; the next caller starts over.
    ///
    /// # Errors
    ///
    /// Returns the memoized [`AuthError`], or [`AuthError::Cancelled`].
    pub async fn client_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<QueryClient>, AuthError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AuthError::Cancelled),
            result = self.client() => result,
        }
    }

    /// Executes `document` through the shared client.
    ///
    /// The outer `Result` is the bootstrap outcome; the inner `Option` is the
    /// query outcome, with failures logged and reported as `None`.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] if no client could be bootstrapped.
    pub async fn execute_query(
        &self,
        document: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<Option<serde_json::Value>, AuthError> {
        let client = self.client().await?;
        Ok(client.execute_query(document, variables).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::config::{ClientId, ClientSecret, Endpoint};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(uri: &str) -> ApiContext {
        ApiContext::new(
            ClientConfig::builder()
                .credentials(Credentials::new(
                    ClientId::new("id").unwrap(),
                    ClientSecret::new("secret").unwrap(),
                ))
                .endpoint(Endpoint::new(uri).unwrap())
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_state_moves_to_ready() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("generateClientAccessToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"generateClientAccessToken": {"token": "abc123"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let context = context(&server.uri());
        assert_eq!(context.state(), ClientState::Uninitialized);

        context.client().await.unwrap();
        context.client().await.unwrap();

        assert_eq!(context.state(), ClientState::Ready);
    }

    #[tokio::test]
    async fn test_failed_bootstrap_is_memoized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})))
            .expect(1)
            .mount(&server)
            .await;

        let context = context(&server.uri());

        let first = context.client().await.unwrap_err();
        let second = context.client().await.unwrap_err();

        assert_eq!(first, second);
        assert_eq!(context.state(), ClientState::Failed);
    }

    #[tokio::test]
    async fn test_cancelled_bootstrap_is_not_memoized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"generateClientAccessToken": {"token": "abc123"}}
            })))
            .mount(&server)
            .await;

        let context = context(&server.uri());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = context.client_with_cancel(&cancel).await;

        assert!(matches!(result, Err(AuthError::Cancelled)));
        assert_eq!(context.state(), ClientState::Uninitialized);

        assert!(context.client().await.is_ok());
        assert_eq!(context.state(), ClientState::Ready);
    }
}
