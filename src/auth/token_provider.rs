//! Credential exchange against the `generateClientAccessToken` mutation.
//!
//! A [`TokenProvider`] posts the client ID and secret to the token endpoint
//! and turns the `data.generateClientAccessToken` payload into an
//! [`AccessToken`]. Nothing is cached or persisted here; memoization happens
//! in [`ApiContext`](crate::ApiContext) and refresh in the query client's
//! token cell.
//!
//! # Example
//!
//! ```rust,ignore
//! use strise_api::{ClientConfig, TokenProvider};
//!
//! let config = ClientConfig::from_env()?;
//! let provider = TokenProvider::new(&config);
//! let token = provider.fetch_token(config.credentials()).await?;
//! println!("token expires at {:?}", token.expires_at());
//! ```

use tokio_util::sync::CancellationToken;

use crate::auth::{AccessToken, AccessTokenResponse, AuthError, Credentials};
use crate::clients::graphql::{GraphqlClient, GraphqlError};
use crate::clients::HttpError;
use crate::config::{ClientConfig, Endpoint};

/// The mutation exchanging client credentials for a bearer token.
pub const TOKEN_MUTATION: &str = "
mutation getAccessToken($clientId: String! $clientSecret: String!) {
  generateClientAccessToken(clientId: $clientId clientSecret: $clientSecret) {
    token
    expires
  }
}";

/// Exchanges [`Credentials`] for [`AccessToken`]s.
///
/// Each call to [`fetch_token`](Self::fetch_token) performs exactly one POST
/// request without an `Authorization` header.
#[derive(Debug)]
pub struct TokenProvider {
    client: GraphqlClient,
}

// Verify TokenProvider is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TokenProvider>();
};

impl TokenProvider {
    /// Creates a provider for the configured token endpoint.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: GraphqlClient::unauthenticated(config.token_endpoint().clone(), Some(config)),
        }
    }

    /// Returns the endpoint tokens are requested from.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        self.client.http_client().endpoint()
    }

    /// Requests a new access token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenRequestFailed`] on network failure (status `0`) or
    ///   a non-2xx response
    /// - [`AuthError::TokenRejected`] when the response carries GraphQL errors
    /// - [`AuthError::MalformedTokenResponse`] when the token payload or its
    ///   `token` field is missing
    ///
    /// An `expires` that is not an RFC 3339 string is logged and ignored; the
    /// token then has no known expiry.
    /// - [`AuthError::EmptyToken`] when the returned token is empty
    pub async fn fetch_token(&self, credentials: &Credentials) -> Result<AccessToken, AuthError> {
        tracing::debug!(endpoint = %self.endpoint(), "requesting access token");

        let variables = serde_json::json!({
            "clientId": credentials.client_id().as_ref(),
            "clientSecret": credentials.client_secret().as_ref(),
        });

        let response = self
            .client
            .query(TOKEN_MUTATION, Some(&variables))
            .await
            .map_err(map_graphql_error)?;

        let payload = response
            .body
            .get("data")
            .and_then(|data| data.get("generateClientAccessToken"))
            .filter(|payload| !payload.is_null())
            .ok_or_else(|| AuthError::MalformedTokenResponse {
                reason: "missing data.generateClientAccessToken".to_string(),
            })?;

        let token_response: AccessTokenResponse = serde_json::from_value(payload.clone())
            .map_err(|e| AuthError::MalformedTokenResponse {
                reason: format!("Failed to parse token response: {e}"),
            })?;

        let token = token_response
            .token
            .clone()
            .ok_or_else(|| AuthError::MalformedTokenResponse {
                reason: "token field is missing".to_string(),
            })?;
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }

        let expires_at = token_response.expires_at();
        if let (Some(raw), None) = (&token_response.expires, expires_at) {
            tracing::warn!(expires = %raw, "unrecognized token expiry, treating it as unknown");
        }

        tracing::info!(expires_at = ?expires_at, "obtained access token");

        Ok(AccessToken::new(token, expires_at))
    }

    /// Like [`fetch_token`](Self::fetch_token), but gives up with
    /// [`AuthError::Cancelled`] as soon as `cancel` is triggered.
    ///
    /// # Errors
    ///
    /// Everything [`fetch_token`](Self::fetch_token) returns, plus
    /// [`AuthError::Cancelled`].
    pub async fn fetch_token_with_cancel(
        &self,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<AccessToken, AuthError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AuthError::Cancelled),
            result = self.fetch_token(credentials) => result,
        }
    }
}

fn map_graphql_error(error: GraphqlError) -> AuthError {
    match error {
        GraphqlError::Response { errors, .. } => AuthError::TokenRejected {
            message: serde_json::Value::Array(errors).to_string(),
        },
        GraphqlError::Http(HttpError::Response(e)) => AuthError::TokenRequestFailed {
            status: e.code,
            message: e.message,
        },
        GraphqlError::Http(e) => AuthError::TokenRequestFailed {
            status: 0,
            message: e.to_string(),
        },
    }
}
