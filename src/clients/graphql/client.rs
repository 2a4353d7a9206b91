//! GraphQL client implementation.
//!
//! This module provides the [`GraphqlClient`] type for posting GraphQL
//! operations to a single endpoint.

use crate::auth::AccessToken;
use crate::clients::graphql::GraphqlError;
use crate::clients::{HttpClient, HttpResponse};
use crate::config::{ClientConfig, Endpoint};

/// GraphQL transport bound to one endpoint and, optionally, one bearer token.
///
/// Unlike a plain [`HttpClient`], a response that carries a non-empty GraphQL
/// `errors` array is reported as [`GraphqlError::Response`].
///
/// # Thread Safety
///
/// `GraphqlClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use strise_api::{AccessToken, Endpoint};
/// use strise_api::clients::GraphqlClient;
/// use serde_json::json;
///
/// let endpoint = Endpoint::new("https://api.example.com/graphql").unwrap();
/// let client = GraphqlClient::new(endpoint, &AccessToken::new("abc123", None), None);
///
/// let response = client.query(
///     "query companies($q: String!) { companies(q: $q) { edges { node { id name } } } }",
///     Some(&json!({ "q": "Acme" })),
/// ).await?;
/// println!("{}", response.body["data"]);
/// ```
#[derive(Debug)]
pub struct GraphqlClient {
    http_client: HttpClient,
}

// Verify GraphqlClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlClient>();
};

impl GraphqlClient {
    /// Creates a client that sends `Authorization: Bearer <token>` with every
    /// operation.
    #[must_use]
    pub fn new(
        endpoint: Endpoint,
        access_token: &AccessToken,
        config: Option<&ClientConfig>,
    ) -> Self {
        Self {
            http_client: HttpClient::new(endpoint, Some(access_token), config),
        }
    }

    /// Creates a client without credentials, as used for the token exchange.
    #[must_use]
    pub fn unauthenticated(endpoint: Endpoint, config: Option<&ClientConfig>) -> Self {
        Self {
            http_client: HttpClient::new(endpoint, None, config),
        }
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub const fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Executes a GraphQL operation.
    ///
    /// Sends one POST request with body `{"query": document, "variables": variables}`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphqlError::Http`] for network errors and non-2xx
    /// responses, and [`GraphqlError::Response`] when the body carries a
    /// non-empty `errors` array.
    pub async fn query(
        &self,
        document: &str,
        variables: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, GraphqlError> {
        let body = serde_json::json!({
            "query": document,
            "variables": variables.cloned().unwrap_or_else(|| serde_json::json!({})),
        });

        let response = self.http_client.post_json(&body).await?;

        if let Some(errors) = response.graphql_errors() {
            return Err(GraphqlError::Response {
                status: response.code,
                errors: errors.clone(),
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_query_posts_document_and_variables() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer abc123"))
            .and(body_json(json!({
                "query": "query { currentUser { id } }",
                "variables": {"q": "Acme"}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"currentUser": {"id": "u1"}}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = GraphqlClient::new(
            Endpoint::new(server.uri()).unwrap(),
            &AccessToken::new("abc123", None),
            None,
        );

        let response = client
            .query("query { currentUser { id } }", Some(&json!({"q": "Acme"})))
            .await
            .unwrap();

        assert_eq!(response.body["data"]["currentUser"]["id"], json!("u1"));
    }

    #[tokio::test]
    async fn test_missing_variables_are_sent_as_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"query": "{ ok }", "variables": {}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = GraphqlClient::unauthenticated(Endpoint::new(server.uri()).unwrap(), None);

        assert!(client.query("{ ok }", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_errors_array_is_reported_as_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{"message": "Cannot query field \"nope\""}]
            })))
            .mount(&server)
            .await;

        let client = GraphqlClient::unauthenticated(Endpoint::new(server.uri()).unwrap(), None);
        let result = client.query("{ nope }", None).await;

        match result {
            Err(GraphqlError::Response { status, errors }) => {
                assert_eq!(status, 200);
                assert_eq!(errors.len(), 1);
            }
            other => panic!("Expected GraphqlError::Response, got {other:?}"),
        }
    }

    #[test]
    fn test_unauthenticated_client_has_no_authorization_header() {
        let client = GraphqlClient::unauthenticated(
            Endpoint::new("https://api.example.com").unwrap(),
            None,
        );
        assert!(client
            .http_client()
            .default_headers()
            .get("Authorization")
            .is_none());
    }
}
