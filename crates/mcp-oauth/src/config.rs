//! Configuration for the OAuth authorization server.

use std::collections::HashMap;

use chrono::Duration;

use crate::oauth::types::Client;

/// Token lifetime constants.
pub mod lifetimes {
    /// Authorization code lifetime: 10 minutes.
    pub const AUTH_CODE_TTL_SECS: i64 = 600;

    /// Access token lifetime: 1 hour.
    pub const ACCESS_TOKEN_TTL_SECS: i64 = 3600;

    /// Optional refresh token lifetime, when enabled: 30 days.
    ///
    /// Refresh tokens never expire by default; this is the value used when a
    /// deployment opts into bounded refresh lifetimes.
    pub const REFRESH_TOKEN_TTL_SECS: i64 = 30 * 24 * 3600;
}

/// Server configuration.
///
/// Secrets (signing key, client credentials, user credentials) are always
/// supplied externally; there are no baked-in fallback values.
#[derive(Debug, Clone)]
pub struct Config {
    /// Issuer / base URL used in metadata and endpoint announcements.
    pub issuer: String,

    /// Shared symmetric secret for signing access tokens.
    pub signing_key: String,

    /// Resource-owner credential table: username -> password.
    pub users: HashMap<String, String>,

    /// Provisioned OAuth clients, keyed by client_id.
    pub clients: HashMap<String, Client>,

    /// Authorization code lifetime.
    pub auth_code_ttl: Duration,

    /// Access token lifetime.
    pub access_token_ttl: Duration,

    /// Refresh token lifetime. `None` (the default) means refresh tokens
    /// never expire.
    pub refresh_token_ttl: Option<Duration>,
}

impl Config {
    /// Create a configuration with default lifetimes and empty credential
    /// tables.
    #[must_use]
    pub fn new(issuer: impl Into<String>, signing_key: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            signing_key: signing_key.into(),
            users: HashMap::new(),
            clients: HashMap::new(),
            auth_code_ttl: Duration::seconds(lifetimes::AUTH_CODE_TTL_SECS),
            access_token_ttl: Duration::seconds(lifetimes::ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl: None,
        }
    }

    /// Provision a resource owner.
    #[must_use]
    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }

    /// Provision a client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.clients.insert(client.client_id.clone(), client);
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `BASE_URL`, `OAUTH_SIGNING_KEY` (required), `OAUTH_USER` /
    /// `OAUTH_PASS`, and the client provisioning variables
    /// `OAUTH_CLIENT_ID` / `OAUTH_CLIENT_SECRET` / `OAUTH_REDIRECT_URIS`
    /// (comma-separated) / `OAUTH_CLIENT_SCOPES` (space-separated).
    /// `OAUTH_REFRESH_TTL_SECS` opts into bounded refresh token lifetimes.
    ///
    /// # Errors
    ///
    /// Returns an error if the signing key is missing or a provisioning
    /// variable is incomplete.
    pub fn from_env() -> anyhow::Result<Self> {
        let issuer =
            std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        let signing_key = std::env::var("OAUTH_SIGNING_KEY")
            .map_err(|_| anyhow::anyhow!("OAUTH_SIGNING_KEY must be set"))?;

        let mut config = Self::new(issuer, signing_key);

        if let (Ok(user), Ok(pass)) = (std::env::var("OAUTH_USER"), std::env::var("OAUTH_PASS")) {
            config = config.with_user(user, pass);
        }

        if let Ok(client_id) = std::env::var("OAUTH_CLIENT_ID") {
            let client_secret = std::env::var("OAUTH_CLIENT_SECRET").map_err(|_| {
                anyhow::anyhow!("OAUTH_CLIENT_SECRET must be set when OAUTH_CLIENT_ID is")
            })?;
            let redirect_uris = std::env::var("OAUTH_REDIRECT_URIS").map_err(|_| {
                anyhow::anyhow!("OAUTH_REDIRECT_URIS must be set when OAUTH_CLIENT_ID is")
            })?;

            config = config.with_client(Client {
                client_id,
                client_secret,
                redirect_uris: redirect_uris.split(',').map(|s| s.trim().to_owned()).collect(),
                scopes: std::env::var("OAUTH_CLIENT_SCOPES")
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(str::to_owned)
                    .collect(),
            });
        }

        if let Ok(secs) = std::env::var("OAUTH_REFRESH_TTL_SECS") {
            let secs: i64 = secs.parse()?;
            config.refresh_token_ttl = Some(Duration::seconds(secs));
        }

        Ok(config)
    }

    /// Create a test configuration with a known client and resource owner.
    #[must_use]
    pub fn for_testing() -> Self {
        Self::new("https://auth.example", "test-signing-key")
            .with_user("alice", "pw")
            .with_client(Client {
                client_id: "demo_client".into(),
                client_secret: "s3cr3t".into(),
                redirect_uris: vec!["https://app.example/cb".into()],
                scopes: vec!["mcp:read".into(), "mcp:write".into()],
            })
    }

    /// Look up a provisioned client.
    #[must_use]
    pub fn get_client(&self, client_id: &str) -> Option<&Client> {
        self.clients.get(client_id)
    }

    /// Check resource-owner credentials against the table.
    #[must_use]
    pub fn verify_user(&self, username: &str, password: &str) -> bool {
        self.users.get(username).is_some_and(|p| p == password)
    }

    /// Union of all provisioned client scopes, for the metadata document.
    #[must_use]
    pub fn scopes_supported(&self) -> Vec<String> {
        let mut scopes: Vec<String> =
            self.clients.values().flat_map(|c| c.scopes.iter().cloned()).collect();
        scopes.sort();
        scopes.dedup();
        scopes
    }
}
