//! Authentication types for the Strise API client.
//!
//! The API authenticates requests with short-lived bearer tokens obtained by
//! exchanging long-lived client credentials through a GraphQL mutation.
//!
//! # Overview
//!
//! - [`Credentials`]: Client ID and secret, supplied at startup
//! - [`AccessToken`]: A bearer token with an optional expiry
//! - [`TokenProvider`]: Performs the credential exchange
//! - [`AuthError`]: Why a token could not be obtained
//!
//! # Example
//!
//! ```rust
//! use strise_api::{AccessToken, ClientId, ClientSecret, Credentials};
//!
//! let credentials = Credentials::new(
//!     ClientId::new("client-id").unwrap(),
//!     ClientSecret::new("client-secret").unwrap(),
//! );
//! assert_eq!(credentials.client_id().as_ref(), "client-id");
//!
//! let token = AccessToken::new("abc123", None);
//! assert!(token.is_active());
//! ```

mod access_token;
mod credentials;
mod error;
mod token_provider;

pub use access_token::{AccessToken, AccessTokenResponse};
pub use credentials::Credentials;
pub use error::AuthError;
pub use token_provider::{TokenProvider, TOKEN_MUTATION};
