//! Record types for the token lifecycle.

use chrono::{DateTime, Utc};

/// A statically provisioned OAuth client.
///
/// Clients are supplied through configuration at startup; there is no
/// runtime registration endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URIs matched by exact string comparison, not prefix.
    pub redirect_uris: Vec<String>,
    /// Scopes the client is allowed to request. Informational only: the
    /// authorization step does not enforce a subset check (see DESIGN.md).
    pub scopes: Vec<String>,
}

impl Client {
    /// Check whether a redirect URI is registered for this client.
    #[must_use]
    pub fn has_redirect_uri(&self, redirect_uri: &str) -> bool {
        self.redirect_uris.iter().any(|u| u == redirect_uri)
    }
}

/// A single-use authorization code bound to one client, user, and redirect.
#[derive(Debug, Clone)]
pub struct AuthorizationCode {
    pub client_id: String,
    pub user: String,
    /// Scopes in request order, as parsed from the space-delimited string.
    pub scopes: Vec<String>,
    pub redirect_uri: String,
    pub expires_at: DateTime<Utc>,
}

/// Server-side shadow record for an issued access token.
///
/// The token string itself is a signed JWT carrying the same claims; the
/// shadow record makes validation an O(1) lookup.
#[derive(Debug, Clone)]
pub struct AccessTokenRecord {
    pub user: String,
    pub client_id: String,
    pub scopes: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

/// A reusable refresh token. Without a configured TTL it never expires.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub user: String,
    pub client_id: String,
    pub scopes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthorizationCode {
    /// Check if the code has passed its expiry deadline.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

impl AccessTokenRecord {
    /// Check if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

impl RefreshTokenRecord {
    /// Check if the token has expired. Tokens without a deadline never do.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Utc::now() > deadline)
    }
}
