//! GraphQL-specific error types.
//!
//! - [`GraphqlError::Http`]: Wraps underlying HTTP errors (network errors,
//!   non-2xx responses)
//! - [`GraphqlError::Response`]: The server answered 2xx but the body carried
//!   a non-empty `errors` array. This includes variables that do not match
//!   the document's declared types, which are only validated by the server.

use crate::clients::HttpError;
use thiserror::Error;

/// Error type for GraphQL operations.
///
/// # Example
///
/// ```rust
/// use strise_api::clients::graphql::GraphqlError;
/// use strise_api::clients::{HttpError, HttpResponseError};
///
/// let http_error = HttpError::Response(HttpResponseError {
///     code: 401,
///     message: r#"{"error":"Unauthorized"}"#.to_string(),
///     error_reference: None,
/// });
/// let graphql_error: GraphqlError = http_error.into();
/// assert!(graphql_error.to_string().contains("Unauthorized"));
/// ```
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// An HTTP-level error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The response body contained a GraphQL `errors` array.
    #[error("GraphQL response contained errors: {}", summarize(.errors))]
    Response {
        /// HTTP status of the response (2xx).
        status: u16,
        /// The raw `errors` entries.
        errors: Vec<serde_json::Value>,
    },
}

impl GraphqlError {
    /// Returns the upstream HTTP status code, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status(),
            Self::Response { status, .. } => Some(*status),
        }
    }
}

/// Joins the `message` field of each error, falling back to its JSON form.
fn summarize(errors: &[serde_json::Value]) -> String {
    errors
        .iter()
        .map(|error| {
            error
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| error.to_string(), String::from)
        })
        .collect::<Vec<_>>()
        .join("; ")
}
