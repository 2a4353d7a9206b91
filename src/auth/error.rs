//! Authentication error types.
//!
//! Every failure of the token exchange is a bootstrap failure: without a
//! token no client can be built. `AuthError` is `Clone` so that a failed
//! bootstrap can be memoized and handed to every caller that awaited it.
//!
//! # Example
//!
//! ```rust
//! use strise_api::AuthError;
//!
//! let error = AuthError::TokenRequestFailed {
//!     status: 401,
//!     message: "invalid credentials".to_string(),
//! };
//! assert!(error.to_string().contains("401"));
//! ```

use thiserror::Error;

/// Errors that can occur while obtaining an access token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The token request failed at the transport level or returned a
    /// non-2xx status. Network failures are reported with status `0`.
    #[error("Token request failed with status {status}: {message}")]
    TokenRequestFailed {
        /// The HTTP status code returned, or `0` when no response arrived.
        status: u16,
        /// The error message or response body.
        message: String,
    },

    /// The token endpoint answered with a GraphQL `errors` array.
    #[error("Token request rejected: {message}")]
    TokenRejected {
        /// The serialized `errors` array.
        message: String,
    },

    /// The response body did not contain a usable token payload.
    #[error("Malformed token response: {reason}")]
    MalformedTokenResponse {
        /// What was wrong with the response.
        reason: String,
    },

    /// The token endpoint returned an empty token.
    #[error("Access token is empty")]
    EmptyToken,

    /// The token request was cancelled before it completed.
    #[error("Token request was cancelled")]
    Cancelled,
}

// Verify AuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
};
