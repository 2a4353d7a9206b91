//! The query client: token, transport and response cache behind one API.

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::auth::{AccessToken, AuthError, TokenProvider};
use crate::clients::graphql::ResponseCache;
use crate::config::ClientConfig;
use crate::query::{QueryError, QueryErrorKind, QueryRequest, TokenCell};

/// An authenticated GraphQL client with a response cache.
///
/// Every request carries `Authorization: Bearer <token>`. Successful `data`
/// payloads are cached by [`CacheKey`](crate::clients::CacheKey); failures are
/// never cached. Each cache miss performs exactly one network attempt.
///
/// Most applications obtain a shared instance from
/// [`ApiContext`](crate::ApiContext) instead of bootstrapping one directly.
///
/// # Thread Safety
///
/// `QueryClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use strise_api::{ClientConfig, QueryClient};
/// use serde_json::json;
///
/// let config = ClientConfig::from_env()?;
/// let client = QueryClient::bootstrap(&config).await?;
///
/// if let Some(data) = client
///     .execute_query(strise_api::queries::COMPANIES, Some(json!({"searchQuery": "Acme"})))
///     .await
/// {
///     println!("{}", data["companies"]["edges"]);
/// }
/// ```
#[derive(Debug)]
pub struct QueryClient {
    tokens: TokenCell,
    cache: ResponseCache,
}

// Verify QueryClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<QueryClient>();
};

impl QueryClient {
    /// Fetches a token with the configured credentials and builds a client
    /// bound to it.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of the token exchange. No client is created.
    pub async fn bootstrap(config: &ClientConfig) -> Result<Self, AuthError> {
        let token = TokenProvider::new(config)
            .fetch_token(config.credentials())
            .await?;
        Self::build(config, token)
    }

    /// Like [`bootstrap`](Self::bootstrap), but gives up as soon as `cancel`
    /// is triggered.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of the token exchange, or
    /// [`AuthError::Cancelled`].
    pub async fn bootstrap_with_cancel(
        config: &ClientConfig,
        cancel: &CancellationToken,
    ) -> Result<Self, AuthError> {
        let token = TokenProvider::new(config)
            .fetch_token_with_cancel(config.credentials(), cancel)
            .await?;
        Self::build(config, token)
    }

    /// Builds a client around an already obtained token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmptyToken`] if the token is empty.
    pub fn build(config: &ClientConfig, token: AccessToken) -> Result<Self, AuthError> {
        if token.token().is_empty() {
            return Err(AuthError::EmptyToken);
        }

        Ok(Self {
            tokens: TokenCell::new(config, token),
            cache: ResponseCache::new(config.cache_capacity(), config.cache_ttl()),
        })
    }

    /// Returns the token currently in use.
    pub async fn access_token(&self) -> AccessToken {
        self.tokens.token().await
    }

    /// Returns the response cache.
    #[must_use]
    pub const fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Removes the cached payload for `request`. Returns `true` if one was
    /// removed.
    pub fn invalidate(&self, request: &QueryRequest) -> bool {
        self.cache.invalidate(&request.cache_key())
    }

    /// Removes every cached payload.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Executes `request`, returning the response's `data` object.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] for network failures, non-2xx responses,
    /// GraphQL `errors` arrays, responses without `data`, and failed token
    /// refreshes.
    pub async fn execute(&self, request: &QueryRequest) -> Result<serde_json::Value, QueryError> {
        let key = request.cache_key();
        if let Some(data) = self.cache.get(&key) {
            tracing::debug!(key = key.as_str(), "query served from cache");
            return Ok(data);
        }
        tracing::debug!(key = key.as_str(), "query cache miss");

        let transport = self.tokens.transport().await?;
        let response = transport
            .query(&request.document, request.variables.as_ref())
            .await?;

        let data = response
            .body
            .get("data")
            .filter(|data| !data.is_null())
            .cloned()
            .ok_or_else(|| {
                QueryError::new(
                    QueryErrorKind::Decode,
                    "response has no data",
                    Some(response.code),
                )
            })?;

        self.cache.insert(key, data.clone());
        Ok(data)
    }

    /// Like [`execute`](Self::execute), but gives up with
    /// [`QueryErrorKind::Cancelled`] as soon as `cancel` is triggered.
    ///
    /// # Errors
    ///
    /// Everything [`execute`](Self::execute) returns, plus cancellation.
    pub async fn execute_with_cancel(
        &self,
        request: &QueryRequest,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, QueryError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(QueryError::new(
                QueryErrorKind::Cancelled,
                "query was cancelled",
                None,
            )),
            result = self.execute(request) => result,
        }
    }

    /// Executes `request` and deserializes its `data` object into `T`.
    ///
    /// # Errors
    ///
    /// Everything [`execute`](Self::execute) returns, plus
    /// [`QueryErrorKind::Decode`] when `data` does not match `T`.
    pub async fn execute_as<T: DeserializeOwned>(
        &self,
        request: &QueryRequest,
    ) -> Result<T, QueryError> {
        let data = self.execute(request).await?;
        serde_json::from_value(data)
            .map_err(|e| QueryError::new(QueryErrorKind::Decode, e.to_string(), None))
    }

    /// Executes `document` with `variables`, logging any failure.
    ///
    /// Returns `None` on failure; the [`QueryError`] is written to the
    /// `tracing` error log as JSON. Callers must check for absence.
    pub async fn execute_query(
        &self,
        document: &str,
        variables: Option<serde_json::Value>,
    ) -> Option<serde_json::Value> {
        let request = QueryRequest {
            document: document.to_string(),
            variables,
        };

        match self.execute(&request).await {
            Ok(data) => Some(data),
            Err(error) => {
                tracing::error!(error = %error.to_json(), "query failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::config::{ClientId, ClientSecret, Endpoint};
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COMPANIES: &str = "query companies($q: String!) { companies(q: $q) { edges { node { id name } } } }";

    fn config(uri: &str) -> ClientConfig {
        ClientConfig::builder()
            .credentials(Credentials::new(
                ClientId::new("id").unwrap(),
                ClientSecret::new("secret").unwrap(),
            ))
            .endpoint(Endpoint::new(uri).unwrap())
            .build()
            .unwrap()
    }

    fn client(server: &MockServer) -> QueryClient {
        QueryClient::build(&config(&server.uri()), AccessToken::new("abc123", None)).unwrap()
    }

    fn companies_body() -> serde_json::Value {
        json!({"data": {"companies": {"edges": [{"node": {"id": "c1", "name": "Acme"}}]}}})
    }

    #[test]
    fn test_build_rejects_empty_token() {
        let result = QueryClient::build(
            &config("https://api.example.com"),
            AccessToken::new("", None),
        );
        assert!(matches!(result, Err(AuthError::EmptyToken)));
    }

    #[tokio::test]
    async fn test_execute_returns_data_and_caches_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(companies_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let request = QueryRequest::new(COMPANIES).with_variables(json!({"q": "Acme"}));

        let first = client.execute(&request).await.unwrap();
        let second = client.execute(&request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first["companies"]["edges"][0]["node"]["name"], json!("Acme"));
        assert_eq!(client.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_a_new_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(companies_body()))
            .expect(2)
            .mount(&server)
            .await;

        let client = client(&server);
        let request = QueryRequest::new(COMPANIES).with_variables(json!({"q": "Acme"}));

        client.execute(&request).await.unwrap();
        assert!(client.invalidate(&request));
        client.execute(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let client = client(&server);
        let request = QueryRequest::new(COMPANIES);

        let first = client.execute(&request).await.unwrap_err();
        let second = client.execute(&request).await.unwrap_err();

        assert_eq!(first.kind, QueryErrorKind::Status);
        assert_eq!(second.status, Some(500));
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_null_data_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
            .mount(&server)
            .await;

        let error = client(&server)
            .execute(&QueryRequest::new(COMPANIES))
            .await
            .unwrap_err();

        assert_eq!(error.kind, QueryErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_execute_query_reports_absence_on_graphql_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"message": "Variable \"$q\" got invalid value 42"}]
            })))
            .mount(&server)
            .await;

        let result = client(&server)
            .execute_query(COMPANIES, Some(json!({"q": 42})))
            .await;

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_execute_as_decodes_data() {
        #[derive(Deserialize)]
        struct Companies {
            companies: serde_json::Value,
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(companies_body()))
            .mount(&server)
            .await;

        let decoded: Companies = client(&server)
            .execute_as(&QueryRequest::new(COMPANIES))
            .await
            .unwrap();

        assert!(decoded.companies["edges"].is_array());
    }

    #[tokio::test]
    async fn test_execute_as_reports_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Countries {
            #[allow(dead_code)]
            countries: serde_json::Value,
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(companies_body()))
            .mount(&server)
            .await;

        let error = client(&server)
            .execute_as::<Countries>(&QueryRequest::new(COMPANIES))
            .await
            .unwrap_err();

        assert_eq!(error.kind, QueryErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_cancelled_execute() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(companies_body())
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let error = client(&server)
            .execute_with_cancel(&QueryRequest::new(COMPANIES), &cancel)
            .await
            .unwrap_err();

        assert_eq!(error.kind, QueryErrorKind::Cancelled);
    }
}
