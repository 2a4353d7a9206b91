//! Bearer access tokens returned by the token endpoint.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::fmt;

/// A short-lived bearer token.
///
/// Tokens without an expiration time are considered never expired. The token
/// value is masked in `Debug` output.
///
/// # Example
///
/// ```rust
/// use strise_api::AccessToken;
/// use chrono::{Duration, Utc};
///
/// let token = AccessToken::new("abc123", Some(Utc::now() + Duration::hours(1)));
/// assert!(token.is_active());
/// assert_eq!(token.bearer(), "Bearer abc123");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates a new access token.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns when this token expires, if known.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns the `Authorization` header value for this token.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Returns `true` if this token has expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }

    /// Returns `true` if this token expires within `leeway` from now.
    ///
    /// A leeway reaching past the last representable timestamp covers every
    /// expiry.
    #[must_use]
    pub fn expires_within(&self, leeway: Duration) -> bool {
        self.expires_at.is_some_and(|expires| {
            Utc::now()
                .checked_add_signed(leeway)
                .map_or(true, |deadline| deadline >= expires)
        })
    }

    /// Returns `true` if this token is non-empty and not expired.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.token.is_empty() && !self.expired()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"*****")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// The `generateClientAccessToken` payload of a token response.
///
/// Both fields are optional on the wire so that a missing token can be
/// reported as a malformed response instead of a decode failure. `expires`
/// is kept raw; only an RFC 3339 string is understood.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct AccessTokenResponse {
    /// The bearer token.
    pub token: Option<String>,
    /// Expiry as sent by the server.
    pub expires: Option<serde_json::Value>,
}

impl AccessTokenResponse {
    /// Returns the expiry when `expires` is an RFC 3339 string.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|expires| expires.with_timezone(&Utc))
    }
}

// Verify AccessToken is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AccessToken>();
};
