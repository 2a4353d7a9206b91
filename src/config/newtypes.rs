//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use std::fmt;

/// A validated Strise client ID.
///
/// This newtype ensures the client ID is non-empty and provides type safety
/// to prevent accidental misuse of raw strings.
///
/// # Example
///
/// ```rust
/// use strise_api::ClientId;
///
/// let id = ClientId::new("my-client-id").unwrap();
/// assert_eq!(id.as_ref(), "my-client-id");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new validated client ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientId`] if the ID is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ConfigError::EmptyClientId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Strise client secret.
///
/// This newtype ensures the secret is non-empty and masks its value
/// in debug output to prevent accidental exposure in logs.
///
/// # Example
///
/// ```rust
/// use strise_api::ClientSecret;
///
/// let secret = ClientSecret::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ClientSecret(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Creates a new validated client secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientSecret`] if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptyClientSecret);
        }
        Ok(Self(secret))
    }
}

impl AsRef<str> for ClientSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(*****)")
    }
}

/// A validated API endpoint URL.
///
/// Both the GraphQL endpoint and the token endpoint are absolute `http` or
/// `https` URLs with a non-empty host.
///
/// # Example
///
/// ```rust
/// use strise_api::Endpoint;
///
/// let url = Endpoint::new("https://api.example.com/graphql").unwrap();
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), "api.example.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
}

impl Endpoint {
    /// Creates a new validated endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the URL is invalid.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().to_string();
        let invalid = || ConfigError::InvalidEndpoint { url: url.clone() };

        let scheme_end = url.find("://").ok_or_else(invalid)?;
        let scheme = url[..scheme_end].to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(invalid());
        }

        let host_start = scheme_end + 3;
        if host_start >= url.len() {
            return Err(invalid());
        }

        // Host ends at port, path, query, or end of string
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);

        if host_start == host_end || url[host_start..host_end].contains(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
        })
    }

    /// Returns the URL scheme (`http` or `https`).
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.url[self.host_start..self.host_end]
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
