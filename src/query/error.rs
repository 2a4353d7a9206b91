//! Typed query failures.
//!
//! [`QueryError`] is what [`QueryClient::execute`](crate::QueryClient::execute)
//! returns. [`QueryClient::execute_query`](crate::QueryClient::execute_query)
//! logs it as JSON and reports absence instead.

use std::fmt;

use serde::Serialize;

use crate::auth::AuthError;
use crate::clients::graphql::GraphqlError;
use crate::clients::HttpError;

/// Category of a [`QueryError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryErrorKind {
    /// Connection failure, timeout or similar transport error.
    Network,
    /// The server answered with a non-2xx status.
    Status,
    /// The response carried a GraphQL `errors` array.
    Graphql,
    /// The response could not be interpreted.
    Decode,
    /// The access token could not be refreshed.
    Token,
    /// The caller cancelled the query.
    Cancelled,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Status => "status",
            Self::Graphql => "graphql",
            Self::Decode => "decode",
            Self::Token => "token",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A failed query.
///
/// # Example
///
/// ```rust
/// use strise_api::{QueryError, QueryErrorKind};
///
/// let error = QueryError::new(QueryErrorKind::Status, "upstream exploded", Some(500));
/// assert_eq!(error.to_string(), "status error (500): upstream exploded");
/// assert!(error.to_json().contains(r#""kind":"status""#));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryError {
    /// What went wrong.
    pub kind: QueryErrorKind,
    /// Human readable detail, usually the server's error payload.
    pub message: String,
    /// HTTP status of the response, when one was received.
    pub status: Option<u16>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} error ({status}): {}", self.kind, self.message),
            None => write!(f, "{} error: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for QueryError {}

impl QueryError {
    /// Creates a new query error.
    #[must_use]
    pub fn new(kind: QueryErrorKind, message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            kind,
            message: message.into(),
            status,
        }
    }

    /// Serializes this error as a JSON object for diagnostics.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
    }
}

impl From<GraphqlError> for QueryError {
    fn from(error: GraphqlError) -> Self {
        match error {
            GraphqlError::Response { status, errors } => Self::new(
                QueryErrorKind::Graphql,
                serde_json::Value::Array(errors).to_string(),
                Some(status),
            ),
            GraphqlError::Http(HttpError::Response(e)) => {
                Self::new(QueryErrorKind::Status, e.message, Some(e.code))
            }
            GraphqlError::Http(HttpError::Network(e)) => {
                Self::new(QueryErrorKind::Network, e.to_string(), None)
            }
        }
    }
}

impl From<AuthError> for QueryError {
    fn from(error: AuthError) -> Self {
        let status = match &error {
            AuthError::TokenRequestFailed { status, .. } if *status != 0 => Some(*status),
            _ => None,
        };
        let kind = if error == AuthError::Cancelled {
            QueryErrorKind::Cancelled
        } else {
            QueryErrorKind::Token
        };
        Self::new(kind, error.to_string(), status)
    }
}

// Verify QueryError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<QueryError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpResponseError;
    use serde_json::json;

    #[test]
    fn test_status_error_from_http_response() {
        let error: QueryError = GraphqlError::Http(HttpError::Response(HttpResponseError {
            code: 500,
            message: r#"{"raw_body":"boom"}"#.to_string(),
            error_reference: None,
        }))
        .into();

        assert_eq!(error.kind, QueryErrorKind::Status);
        assert_eq!(error.status, Some(500));
        assert!(error.message.contains("boom"));
    }

    #[test]
    fn test_graphql_error_keeps_errors_payload() {
        let error: QueryError = GraphqlError::Response {
            status: 200,
            errors: vec![json!({"message": "Unknown argument \"q\""})],
        }
        .into();

        assert_eq!(error.kind, QueryErrorKind::Graphql);
        assert_eq!(error.status, Some(200));
        assert!(error.message.contains("Unknown argument"));
    }

    #[test]
    fn test_auth_error_maps_to_token_kind() {
        let error: QueryError = AuthError::TokenRequestFailed {
            status: 401,
            message: "nope".to_string(),
        }
        .into();
        assert_eq!(error.kind, QueryErrorKind::Token);
        assert_eq!(error.status, Some(401));

        let error: QueryError = AuthError::TokenRequestFailed {
            status: 0,
            message: "connection refused".to_string(),
        }
        .into();
        assert_eq!(error.status, None);

        let error: QueryError = AuthError::Cancelled.into();
        assert_eq!(error.kind, QueryErrorKind::Cancelled);
    }

    #[test]
    fn test_to_json_shape() {
        let error = QueryError::new(QueryErrorKind::Network, "connection reset", None);
        let value: serde_json::Value = serde_json::from_str(&error.to_json()).unwrap();

        assert_eq!(
            value,
            json!({"kind": "network", "message": "connection reset", "status": null})
        );
    }

    #[test]
    fn test_display_without_status() {
        let error = QueryError::new(QueryErrorKind::Decode, "response has no data", None);
        assert_eq!(error.to_string(), "decode error: response has no data");
    }
}
