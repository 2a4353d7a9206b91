//! Query execution.
//!
//! - [`QueryClient`]: Executes GraphQL documents with bearer auth and caching
//! - [`QueryRequest`]: A document plus optional variables
//! - [`QueryError`]: Typed failure returned by [`QueryClient::execute`]
//! - [`TokenCell`]: Current token and transport, optionally refreshed on expiry
//!
//! # Two error contracts
//!
//! [`QueryClient::execute`] returns `Result<Value, QueryError>`.
//! [`QueryClient::execute_query`] never fails: it logs the error and returns
//! `None`.

mod client;
mod error;
mod token_cell;

pub use client::QueryClient;
pub use error::{QueryError, QueryErrorKind};
pub use token_cell::TokenCell;

use crate::clients::graphql::CacheKey;

/// A GraphQL document and its variables.
///
/// Variables are not validated locally; mismatches against the document are
/// reported by the server as GraphQL errors.
///
/// # Example
///
/// ```rust
/// use strise_api::QueryRequest;
/// use serde_json::json;
///
/// let a = QueryRequest::new("query { countries { edges { node { id } } } }");
/// let b = QueryRequest::new("query {\n  countries { edges { node { id } } }\n}");
/// assert_eq!(a.cache_key(), b.cache_key());
///
/// let c = a.clone().with_variables(json!({"q": "norway"}));
/// assert_ne!(a.cache_key(), c.cache_key());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryRequest {
    /// The GraphQL document.
    pub document: String,
    /// Variables for the document, if any.
    pub variables: Option<serde_json::Value>,
}

impl QueryRequest {
    /// Creates a request without variables.
    #[must_use]
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            variables: None,
        }
    }

    /// Sets the variables.
    #[must_use]
    pub fn with_variables(mut self, variables: serde_json::Value) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Returns the cache key for this request.
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.document, self.variables.as_ref())
    }
}
