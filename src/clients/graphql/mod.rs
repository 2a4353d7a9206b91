//! GraphQL transport for the Strise API.
//!
//! This module provides a GraphQL client built on top of the
//! [`HttpClient`](crate::clients::HttpClient) plus the response cache the
//! query client attaches to it.
//!
//! # Overview
//!
//! - [`GraphqlClient`]: Posts `{query, variables}` documents
//! - [`GraphqlError`]: HTTP failures and GraphQL `errors` arrays
//! - [`ResponseCache`]: Bounded, optionally TTL-limited payload cache
//! - [`CacheKey`]: Digest of a normalized document and canonical variables
//!
//! # Error Handling
//!
//! GraphQL servers report operation failures (including variables that do
//! not match the document) with HTTP 200 and an `errors` array. The client
//! turns these into [`GraphqlError::Response`] so that callers see one error
//! path for both transport and operation failures.

mod cache;
mod client;
mod errors;

pub use cache::{CacheKey, ResponseCache};
pub use client::GraphqlClient;
pub use errors::GraphqlError;
