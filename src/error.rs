//! Error types for the Strise API client.
//!
//! This module contains error types used for configuration and validation
//! errors.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use strise_api::{ClientId, ConfigError};
//!
//! let result = ClientId::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyClientId)));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty. Please provide a valid Strise client ID.")]
    EmptyClientId,

    /// Client secret cannot be empty.
    #[error("Client secret cannot be empty. Please provide a valid Strise client secret.")]
    EmptyClientSecret,

    /// Endpoint URL is invalid.
    #[error("Invalid endpoint URL '{url}'. Please provide an absolute http(s) URL (e.g., 'https://api.example.com/graphql').")]
    InvalidEndpoint {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// A required environment variable is not set.
    #[error("Missing environment variable '{name}'.")]
    MissingEnvVar {
        /// The name of the variable.
        name: &'static str,
    },

    /// An environment variable is set but cannot be used.
    #[error("Invalid value for environment variable '{name}': {reason}")]
    InvalidEnvVar {
        /// The name of the variable.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Cache capacity must hold at least one entry.
    #[error("Cache capacity must be greater than zero.")]
    ZeroCacheCapacity,

    /// The token refresh leeway is too large to add to a timestamp.
    #[error("Token refresh leeway of {secs}s is out of range.")]
    TokenRefreshLeewayOutOfRange {
        /// The rejected leeway in whole seconds.
        secs: u64,
    },
}
