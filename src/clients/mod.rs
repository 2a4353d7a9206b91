//! HTTP and GraphQL transport for the Strise API.
//!
//! This module provides the client layer the query client is built on. It
//! handles request/response processing and GraphQL error detection.
//!
//! # Overview
//!
//! - [`HttpClient`]: Posts JSON to one endpoint, optionally with a bearer token
//! - [`HttpResponse`]: Status, request id and parsed body
//! - [`HttpError`]: Non-2xx responses and transport failures
//! - [`graphql::GraphqlClient`]: Posts GraphQL operations
//! - [`graphql::GraphqlError`]: GraphQL-specific error types
//! - [`graphql::ResponseCache`]: Bounded cache of successful payloads
//!
//! # Retry Behavior
//!
//! None. Every request is attempted exactly once and failures are returned
//! to the caller.

mod errors;
pub mod graphql;
mod http_client;
mod http_response;

pub use errors::{HttpError, HttpResponseError};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_response::HttpResponse;

// Re-export GraphQL client types at the clients module level
pub use graphql::{CacheKey, GraphqlClient, GraphqlError, ResponseCache};
