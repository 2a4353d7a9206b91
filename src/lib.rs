//! # Strise API Rust Client
//!
//! An authenticated GraphQL client for the Strise API: it exchanges client
//! credentials for a bearer token, builds a client bound to that token and
//! executes queries through a shared, lazily bootstrapped instance.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Validated newtypes for credentials and endpoints
//! - Credential exchange via [`TokenProvider`]
//! - Opt-in, expiry-aware token refresh, single-flight per client
//! - A bounded, optionally TTL-limited response cache
//! - [`QueryClient`] with a typed error path ([`QueryClient::execute`]) and a
//!   log-and-return-`None` path ([`QueryClient::execute_query`])
//! - [`ApiContext`], owning one shared client per process
//!
//! ## Quick Start
//!
//! ```rust
//! use strise_api::{ClientConfig, ClientId, ClientSecret, Credentials, Endpoint};
//!
//! let config = ClientConfig::builder()
//!     .credentials(Credentials::new(
//!         ClientId::new("your-client-id").unwrap(),
//!         ClientSecret::new("your-client-secret").unwrap(),
//!     ))
//!     .endpoint(Endpoint::new("https://api.example.com/graphql").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.cache_capacity(), strise_api::config::DEFAULT_CACHE_CAPACITY);
//! ```
//!
//! ## Running Queries
//!
//! ```rust,ignore
//! use strise_api::{ApiContext, queries};
//! use serde_json::json;
//!
//! let context = ApiContext::from_env()?;
//!
//! // The first call performs the token exchange; concurrent callers wait on it.
//! match context.execute_query(queries::COUNTRIES, Some(json!({"q": "norway"}))).await? {
//!     Some(data) => println!("{}", data["countries"]["edges"]),
//!     None => println!("query failed, see log"),
//! }
//! ```
//!
//! ## Typed Errors
//!
//! ```rust,ignore
//! use strise_api::{QueryErrorKind, QueryRequest};
//!
//! let client = context.client().await?;
//! match client.execute(&QueryRequest::new(queries::PORTFOLIOS)).await {
//!     Ok(data) => println!("{data}"),
//!     Err(e) if e.kind == QueryErrorKind::Status => println!("HTTP {:?}", e.status),
//!     Err(e) => println!("{e}"),
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: The shared client lives in an explicit [`ApiContext`]
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **One attempt per request**: No automatic retries

pub mod auth;
pub mod clients;
pub mod config;
pub mod context;
pub mod error;
pub mod queries;
pub mod query;

// Re-export public types at crate root for convenience
pub use auth::{AccessToken, AuthError, Credentials, TokenProvider};
pub use config::{ClientConfig, ClientConfigBuilder, ClientId, ClientSecret, Endpoint, TokenRefresh};
pub use context::{ApiContext, ClientState};
pub use error::ConfigError;
pub use query::{QueryClient, QueryError, QueryErrorKind, QueryRequest};

// Re-export HTTP client types
pub use clients::{HttpClient, HttpError, HttpResponse, HttpResponseError};
