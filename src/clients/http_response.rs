//! Parsed API responses.

/// Status, request id and JSON body of one response.
///
/// A body that is empty, or not JSON on a non-5xx status, is stored as `{}`.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub code: u16,
    /// Value of the `X-Request-Id` header.
    pub request_id: Option<String>,
    /// Parsed body.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(code: u16, request_id: Option<String>, body: serde_json::Value) -> Self {
        Self {
            code,
            request_id,
            body,
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.code, 200..=299)
    }

    /// Returns the GraphQL `errors` array when it is present and non-empty.
    ///
    /// Operation failures arrive with HTTP 200, so this is checked on every
    /// successful response.
    #[must_use]
    pub fn graphql_errors(&self) -> Option<&Vec<serde_json::Value>> {
        self.body
            .get("errors")
            .and_then(serde_json::Value::as_array)
            .filter(|errors| !errors.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_ok_bounds() {
        assert!(HttpResponse::new(200, None, json!({})).is_ok());
        assert!(HttpResponse::new(204, None, json!({})).is_ok());
        assert!(!HttpResponse::new(199, None, json!({})).is_ok());
        assert!(!HttpResponse::new(300, None, json!({})).is_ok());
        assert!(!HttpResponse::new(502, None, json!({})).is_ok());
    }

    #[test]
    fn test_graphql_errors_needs_a_non_empty_array() {
        let failed = HttpResponse::new(
            200,
            None,
            json!({"data": null, "errors": [{"message": "Variable $q is required"}]}),
        );
        assert_eq!(failed.graphql_errors().map(Vec::len), Some(1));

        let clean = HttpResponse::new(200, None, json!({"data": {}, "errors": []}));
        assert!(clean.graphql_errors().is_none());

        let odd = HttpResponse::new(200, None, json!({"data": {}, "errors": "nope"}));
        assert!(odd.graphql_errors().is_none());
    }
}
