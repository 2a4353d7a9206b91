//! Configuration types for the Strise API client.
//!
//! This module provides the configuration used to bootstrap the client:
//! credentials, endpoints, transport settings, cache bounds and the token
//! refresh policy.
//!
//! # Overview
//!
//! - [`ClientConfig`]: The main configuration struct
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`ClientId`]: A validated client ID newtype
//! - [`ClientSecret`]: A validated client secret newtype with masked debug output
//! - [`Endpoint`]: A validated endpoint URL
//! - [`TokenRefresh`]: Whether expired tokens are transparently re-fetched
//!
//! # Example
//!
//! ```rust
//! use strise_api::{ClientConfig, ClientId, ClientSecret, Credentials, Endpoint};
//!
//! let config = ClientConfig::builder()
//!     .credentials(Credentials::new(
//!         ClientId::new("my-client-id").unwrap(),
//!         ClientSecret::new("my-secret").unwrap(),
//!     ))
//!     .endpoint(Endpoint::new("https://api.example.com/graphql").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.token_endpoint(), config.endpoint());
//! ```

mod newtypes;

pub use newtypes::{ClientId, ClientSecret, Endpoint};

use std::time::Duration;

use crate::auth::Credentials;
use crate::error::ConfigError;

/// Environment variable holding the client ID.
pub const ENV_CLIENT_ID: &str = "STRISE_CLIENT_ID";
/// Environment variable holding the client secret.
pub const ENV_CLIENT_SECRET: &str = "STRISE_CLIENT_SECRET";
/// Environment variable holding the GraphQL endpoint URI.
pub const ENV_API_URI: &str = "STRISE_API_URI";
/// Optional environment variable holding a separate token endpoint URI.
pub const ENV_TOKEN_URI: &str = "STRISE_TOKEN_URI";
/// Optional environment variable holding the per-request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "STRISE_REQUEST_TIMEOUT_SECS";
/// Optional environment variable holding the response cache capacity.
pub const ENV_CACHE_CAPACITY: &str = "STRISE_CACHE_CAPACITY";
/// Optional environment variable holding the response cache TTL in seconds.
pub const ENV_CACHE_TTL_SECS: &str = "STRISE_CACHE_TTL_SECS";

/// Default number of responses kept in the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Default margin before `expires` at which a token counts as expired.
pub const DEFAULT_TOKEN_REFRESH_LEEWAY: Duration = Duration::from_secs(30);

/// Policy for tokens whose expiry has passed.
///
/// The token is fetched once per client unless refresh is opted into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenRefresh {
    /// Re-run the token exchange before the next request once the token has
    /// expired (minus the configured leeway).
    OnExpiry,
    /// Hold the bootstrap token for the lifetime of the client. Requests made
    /// after expiry are rejected by the server and surface as query failures.
    #[default]
    Never,
}

/// Configuration for the Strise API client.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    credentials: Credentials,
    endpoint: Endpoint,
    token_endpoint: Option<Endpoint>,
    user_agent_prefix: Option<String>,
    request_timeout: Option<Duration>,
    cache_capacity: usize,
    cache_ttl: Option<Duration>,
    token_refresh: TokenRefresh,
    token_refresh_leeway: Duration,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Builds a configuration from `STRISE_*` environment variables.
    ///
    /// `STRISE_CLIENT_ID`, `STRISE_CLIENT_SECRET` and `STRISE_API_URI` are
    /// required. `STRISE_TOKEN_URI`, `STRISE_REQUEST_TIMEOUT_SECS`,
    /// `STRISE_CACHE_CAPACITY` and `STRISE_CACHE_TTL_SECS` are optional.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or any value
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// This is the implementation behind [`from_env`](Self::from_env).
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingEnvVar { name })
        };
        let optional_u64 = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .map(|value| {
                    value
                        .trim()
                        .parse::<u64>()
                        .map_err(|e| ConfigError::InvalidEnvVar {
                            name,
                            reason: e.to_string(),
                        })
                })
                .transpose()
        };

        let credentials = Credentials::new(
            ClientId::new(required(ENV_CLIENT_ID)?)?,
            ClientSecret::new(required(ENV_CLIENT_SECRET)?)?,
        );

        let mut builder = Self::builder()
            .credentials(credentials)
            .endpoint(Endpoint::new(required(ENV_API_URI)?)?);

        if let Some(token_uri) = lookup(ENV_TOKEN_URI).filter(|value| !value.is_empty()) {
            builder = builder.token_endpoint(Endpoint::new(token_uri)?);
        }
        if let Some(secs) = optional_u64(ENV_REQUEST_TIMEOUT_SECS)? {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(capacity) = optional_u64(ENV_CACHE_CAPACITY)? {
            let capacity = usize::try_from(capacity).map_err(|e| ConfigError::InvalidEnvVar {
                name: ENV_CACHE_CAPACITY,
                reason: e.to_string(),
            })?;
            builder = builder.cache_capacity(capacity);
        }
        if let Some(secs) = optional_u64(ENV_CACHE_TTL_SECS)? {
            builder = builder.cache_ttl(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Returns the credentials exchanged for access tokens.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the GraphQL endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the token endpoint, which defaults to the GraphQL endpoint.
    #[must_use]
    pub fn token_endpoint(&self) -> &Endpoint {
        self.token_endpoint.as_ref().unwrap_or(&self.endpoint)
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the per-request timeout, if configured.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Returns the maximum number of cached responses.
    #[must_use]
    pub const fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    /// Returns the cache entry lifetime, if entries are time-bound.
    #[must_use]
    pub const fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl
    }

    /// Returns the token refresh policy.
    #[must_use]
    pub const fn token_refresh(&self) -> TokenRefresh {
        self.token_refresh
    }

    /// Returns how long before `expires` a token is treated as expired.
    #[must_use]
    pub const fn token_refresh_leeway(&self) -> Duration {
        self.token_refresh_leeway
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// Required fields are `credentials` and `endpoint`.
///
/// # Defaults
///
/// - `token_endpoint`: same as `endpoint`
/// - `request_timeout`: `None` (no deadline)
/// - `cache_capacity`: [`DEFAULT_CACHE_CAPACITY`]
/// - `cache_ttl`: `None` (entries live until evicted or invalidated)
/// - `token_refresh`: [`TokenRefresh::Never`]
/// - `token_refresh_leeway`: [`DEFAULT_TOKEN_REFRESH_LEEWAY`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    credentials: Option<Credentials>,
    endpoint: Option<Endpoint>,
    token_endpoint: Option<Endpoint>,
    user_agent_prefix: Option<String>,
    request_timeout: Option<Duration>,
    cache_capacity: Option<usize>,
    cache_ttl: Option<Duration>,
    token_refresh: Option<TokenRefresh>,
    token_refresh_leeway: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credentials (required).
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the GraphQL endpoint (required).
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets a token endpoint distinct from the GraphQL endpoint.
    #[must_use]
    pub fn token_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.token_endpoint = Some(endpoint);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets a deadline applied to every HTTP request.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the maximum number of cached responses.
    #[must_use]
    pub const fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Sets how long a cached response stays valid.
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Sets the token refresh policy.
    #[must_use]
    pub const fn token_refresh(mut self, policy: TokenRefresh) -> Self {
        self.token_refresh = Some(policy);
        self
    }

    /// Sets how long before `expires` a token is treated as expired.
    #[must_use]
    pub const fn token_refresh_leeway(mut self, leeway: Duration) -> Self {
        self.token_refresh_leeway = Some(leeway);
        self
    }

    /// Builds the [`ClientConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `credentials` or
    /// `endpoint` are not set, [`ConfigError::ZeroCacheCapacity`] if the
    /// cache capacity is zero, and
    /// [`ConfigError::TokenRefreshLeewayOutOfRange`] if the leeway cannot be
    /// added to the current time.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let credentials = self.credentials.ok_or(ConfigError::MissingRequiredField {
            field: "credentials",
        })?;
        let endpoint = self
            .endpoint
            .ok_or(ConfigError::MissingRequiredField { field: "endpoint" })?;

        let cache_capacity = self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY);
        if cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }

        let token_refresh_leeway = self
            .token_refresh_leeway
            .unwrap_or(DEFAULT_TOKEN_REFRESH_LEEWAY);
        let representable = chrono::Duration::from_std(token_refresh_leeway)
            .ok()
            .and_then(|leeway| chrono::Utc::now().checked_add_signed(leeway))
            .is_some();
        if !representable {
            return Err(ConfigError::TokenRefreshLeewayOutOfRange {
                secs: token_refresh_leeway.as_secs(),
            });
        }

        Ok(ClientConfig {
            credentials,
            endpoint,
            token_endpoint: self.token_endpoint,
            user_agent_prefix: self.user_agent_prefix,
            request_timeout: self.request_timeout,
            cache_capacity,
            cache_ttl: self.cache_ttl,
            token_refresh: self.token_refresh.unwrap_or_default(),
            token_refresh_leeway,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_credentials() -> Credentials {
        Credentials::new(
            ClientId::new("client-id").unwrap(),
            ClientSecret::new("client-secret").unwrap(),
        )
    }

    fn test_endpoint() -> Endpoint {
        Endpoint::new("https://api.example.com/graphql").unwrap()
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_builder_requires_credentials() {
        let result = ClientConfigBuilder::new().endpoint(test_endpoint()).build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "credentials"
            })
        ));
    }

    #[test]
    fn test_builder_requires_endpoint() {
        let result = ClientConfigBuilder::new()
            .credentials(test_credentials())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "endpoint" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ClientConfig::builder()
            .credentials(test_credentials())
            .endpoint(test_endpoint())
            .build()
            .unwrap();

        assert_eq!(config.token_endpoint(), config.endpoint());
        assert!(config.user_agent_prefix().is_none());
        assert!(config.request_timeout().is_none());
        assert_eq!(config.cache_capacity(), DEFAULT_CACHE_CAPACITY);
        assert!(config.cache_ttl().is_none());
        assert_eq!(config.token_refresh(), TokenRefresh::Never);
        assert_eq!(config.token_refresh_leeway(), DEFAULT_TOKEN_REFRESH_LEEWAY);
    }

    #[test]
    fn test_builder_rejects_zero_cache_capacity() {
        let result = ClientConfig::builder()
            .credentials(test_credentials())
            .endpoint(test_endpoint())
            .cache_capacity(0)
            .build();

        assert!(matches!(result, Err(ConfigError::ZeroCacheCapacity)));
    }

    #[test]
    fn test_builder_rejects_unrepresentable_leeway() {
        let result = ClientConfig::builder()
            .credentials(test_credentials())
            .endpoint(test_endpoint())
            .token_refresh(TokenRefresh::OnExpiry)
            .token_refresh_leeway(Duration::from_secs(10_u64.pow(13)))
            .build();

        assert_eq!(
            result.unwrap_err(),
            ConfigError::TokenRefreshLeewayOutOfRange {
                secs: 10_u64.pow(13)
            }
        );
    }

    #[test]
    fn test_builder_accepts_long_leeway() {
        let config = ClientConfig::builder()
            .credentials(test_credentials())
            .endpoint(test_endpoint())
            .token_refresh_leeway(Duration::from_secs(365 * 24 * 60 * 60))
            .build()
            .unwrap();

        assert_eq!(
            config.token_refresh_leeway(),
            Duration::from_secs(365 * 24 * 60 * 60)
        );
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let token_endpoint = Endpoint::new("https://auth.example.com/token").unwrap();

        let config = ClientConfig::builder()
            .credentials(test_credentials())
            .endpoint(test_endpoint())
            .token_endpoint(token_endpoint.clone())
            .user_agent_prefix("MyApp/1.0")
            .request_timeout(Duration::from_secs(10))
            .cache_capacity(8)
            .cache_ttl(Duration::from_secs(60))
            .token_refresh(TokenRefresh::Never)
            .token_refresh_leeway(Duration::ZERO)
            .build()
            .unwrap();

        assert_eq!(config.token_endpoint(), &token_endpoint);
        assert_eq!(config.user_agent_prefix(), Some("MyApp/1.0"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.cache_capacity(), 8);
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(60)));
        assert_eq!(config.token_refresh(), TokenRefresh::Never);
        assert_eq!(config.token_refresh_leeway(), Duration::ZERO);
    }

    #[test]
    fn test_from_lookup_reads_required_variables() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_CLIENT_ID, "env-id"),
            (ENV_CLIENT_SECRET, "env-secret"),
            (ENV_API_URI, "https://api.example.com/graphql"),
        ]))
        .unwrap();

        assert_eq!(config.credentials().client_id().as_ref(), "env-id");
        assert_eq!(config.credentials().client_secret().as_ref(), "env-secret");
        assert_eq!(config.endpoint().as_ref(), "https://api.example.com/graphql");
        assert_eq!(config.token_endpoint(), config.endpoint());
    }

    #[test]
    fn test_from_lookup_reads_optional_variables() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_CLIENT_ID, "env-id"),
            (ENV_CLIENT_SECRET, "env-secret"),
            (ENV_API_URI, "https://api.example.com/graphql"),
            (ENV_TOKEN_URI, "https://auth.example.com/graphql"),
            (ENV_REQUEST_TIMEOUT_SECS, "15"),
            (ENV_CACHE_CAPACITY, "32"),
            (ENV_CACHE_TTL_SECS, "120"),
        ]))
        .unwrap();

        assert_eq!(
            config.token_endpoint().as_ref(),
            "https://auth.example.com/graphql"
        );
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.cache_capacity(), 32);
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_from_lookup_reports_missing_variable() {
        let result = ClientConfig::from_lookup(lookup_from(&[
            (ENV_CLIENT_ID, "env-id"),
            (ENV_API_URI, "https://api.example.com/graphql"),
        ]));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingEnvVar {
                name: ENV_CLIENT_SECRET
            }
        );
    }

    #[test]
    fn test_from_lookup_rejects_non_numeric_timeout() {
        let result = ClientConfig::from_lookup(lookup_from(&[
            (ENV_CLIENT_ID, "env-id"),
            (ENV_CLIENT_SECRET, "env-secret"),
            (ENV_API_URI, "https://api.example.com/graphql"),
            (ENV_REQUEST_TIMEOUT_SECS, "soon"),
        ]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar {
                name: ENV_REQUEST_TIMEOUT_SECS,
                ..
            })
        ));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientConfig>();
    }

    #[test]
    fn test_config_debug_does_not_leak_secret() {
        let config = ClientConfig::builder()
            .credentials(test_credentials())
            .endpoint(test_endpoint())
            .build()
            .unwrap();

        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("ClientConfig"));
        assert!(!debug_str.contains("client-secret"));
    }
}
