//! Long-lived client credentials.

use crate::config::{ClientId, ClientSecret};

/// The client ID and secret exchanged for short-lived access tokens.
///
/// Credentials are immutable process-wide configuration. The secret is
/// masked in `Debug` output.
///
/// # Example
///
/// ```rust
/// use strise_api::{ClientId, ClientSecret, Credentials};
///
/// let credentials = Credentials::new(
///     ClientId::new("my-client-id").unwrap(),
///     ClientSecret::new("my-secret").unwrap(),
/// );
///
/// assert_eq!(credentials.client_id().as_ref(), "my-client-id");
/// assert!(!format!("{credentials:?}").contains("my-secret"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    client_id: ClientId,
    client_secret: ClientSecret,
}

impl Credentials {
    /// Creates credentials from validated parts.
    #[must_use]
    pub const fn new(client_id: ClientId, client_secret: ClientSecret) -> Self {
        Self {
            client_id,
            client_secret,
        }
    }

    /// Returns the client ID.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the client secret.
    #[must_use]
    pub const fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }
}

// Verify Credentials is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Credentials>();
};
