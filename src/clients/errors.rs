//! Transport error types.
//!
//! - [`HttpResponseError`]: the server answered with a non-2xx status
//! - [`HttpError`]: either that, or the exchange never completed
//!
//! Requests are attempted exactly once, so there is no retry-exhaustion error.

use thiserror::Error;

/// A non-2xx answer from the API.
///
/// `message` is a JSON object holding whichever of `errors`, `error`,
/// `error_description` and `raw_body` the response carried, plus an
/// `error_reference` line when the server sent an `X-Request-Id`.
///
/// # Example
///
/// ```rust
/// use strise_api::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 503,
///     message: r#"{"error":"Service Unavailable"}"#.to_string(),
///     error_reference: Some("req-7".to_string()),
/// };
///
/// assert_eq!(error.to_string(), r#"{"error":"Service Unavailable"}"#);
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpResponseError {
    /// HTTP status code.
    pub code: u16,
    /// Serialized error payload.
    pub message: String,
    /// The `X-Request-Id` of the failed response, if any.
    pub error_reference: Option<String>,
}

/// Failure of a single POST to the API.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Connecting, sending, timing out or reading the body failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the upstream HTTP status code, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::Network(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_error_is_transparent() {
        let error = HttpError::from(HttpResponseError {
            code: 401,
            message: r#"{"errors":[{"message":"Unauthorized"}]}"#.to_string(),
            error_reference: None,
        });

        assert_eq!(error.to_string(), r#"{"errors":[{"message":"Unauthorized"}]}"#);
        assert_eq!(error.status(), Some(401));
    }
}
