//! HTTP client for API communication.
//!
//! This module provides the [`HttpClient`] type. A client is bound to one
//! endpoint and, optionally, one access token for its whole lifetime.

use std::collections::HashMap;

use crate::auth::AccessToken;
use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_response::HttpResponse;
use crate::config::{ClientConfig, Endpoint};

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to the API.
///
/// The client handles:
/// - URL construction from the bound endpoint
/// - Default headers including User-Agent and the bearer token
/// - Response parsing
///
/// Each call to [`post_json`](Self::post_json) performs exactly one network
/// attempt; there is no automatic retry.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust
/// use strise_api::{AccessToken, Endpoint};
/// use strise_api::clients::HttpClient;
///
/// let endpoint = Endpoint::new("https://api.example.com/graphql").unwrap();
/// let token = AccessToken::new("abc123", None);
/// let client = HttpClient::new(endpoint, Some(&token), None);
///
/// assert_eq!(
///     client.default_headers().get("Authorization"),
///     Some(&"Bearer abc123".to_string())
/// );
/// ```
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Endpoint every request is sent to.
    endpoint: Endpoint,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
}

// The Authorization header holds the bearer token; only header names are shown
impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut header_names: Vec<&String> = self.default_headers.keys().collect();
        header_names.sort();
        f.debug_struct("HttpClient")
            .field("endpoint", &self.endpoint)
            .field("default_headers", &header_names)
            .finish_non_exhaustive()
    }
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client bound to `endpoint`.
    ///
    /// When `access_token` is given and non-empty, every request carries
    /// `Authorization: Bearer <token>`.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    #[must_use]
    pub fn new(
        endpoint: Endpoint,
        access_token: Option<&AccessToken>,
        config: Option<&ClientConfig>,
    ) -> Self {
        // Build User-Agent header
        let user_agent_prefix = config
            .and_then(ClientConfig::user_agent_prefix)
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}Strise API Client v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        if let Some(token) = access_token.filter(|t| !t.token().is_empty()) {
            default_headers.insert("Authorization".to_string(), token.bearer());
        }

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.and_then(ClientConfig::request_timeout) {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().expect("Failed to create HTTP client");

        Self {
            client,
            endpoint,
            default_headers,
        }
    }

    /// Returns the endpoint this client is bound to.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Posts `body` as JSON to the bound endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the request cannot be sent, times out
    /// or its body cannot be read, and [`HttpError::Response`] for a non-2xx
    /// status.
    pub async fn post_json(&self, body: &serde_json::Value) -> Result<HttpResponse, HttpError> {
        let mut req_builder = self
            .client
            .post(self.endpoint.as_ref())
            .header("Content-Type", "application/json");
        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }

        let res = req_builder.body(body.to_string()).send().await?;

        let code = res.status().as_u16();
        let request_id = res
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let body_text = res.text().await?;

        let body = if body_text.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&body_text).unwrap_or_else(|_| {
                // For 5xx errors, keep the raw body for diagnostics
                if code >= 500 {
                    serde_json::json!({ "raw_body": body_text })
                } else {
                    serde_json::json!({})
                }
            })
        };

        let response = HttpResponse::new(code, request_id, body);

        if response.is_ok() {
            return Ok(response);
        }

        tracing::debug!(endpoint = %self.endpoint, status = code, "request returned non-success status");

        Err(HttpError::Response(HttpResponseError {
            code,
            message: Self::serialize_error(&response),
            error_reference: response.request_id.clone(),
        }))
    }

    /// Serializes an error response to a JSON message.
    fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        for field in ["errors", "error", "raw_body"] {
            if let Some(value) = response.body.get(field) {
                error_body.insert(field.to_string(), value.clone());
            }
        }
        if response.body.get("error").is_some() {
            if let Some(desc) = response.body.get("error_description") {
                error_body.insert("error_description".to_string(), desc.clone());
            }
        }

        if let Some(request_id) = &response.request_id {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }
}
