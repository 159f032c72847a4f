//! The authorization grant state machine.
//!
//! `AuthorizationFlow` implements the three protocol phases on top of the
//! token store: authorize (validate the request, authenticate the resource
//! owner, mint a code), token exchange (code or refresh token to access
//! token), and validation. It has no knowledge of HTTP; handlers adapt it.

use std::sync::Arc;

use serde::Serialize;

use super::store::{TokenStore, generate_token};
use super::token::TokenSigner;
use super::types::{AccessTokenRecord, AuthorizationCode, Client, RefreshTokenRecord};
use crate::config::Config;
use crate::error::{AuthError, AuthResult};

/// Parameters of an authorization request (phase 1).
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub response_type: String,
    /// Space-delimited scope string, parsed at code-minting time.
    pub scope: String,
    /// Opaque CSRF value echoed back to the client, never interpreted.
    pub state: Option<String>,
}

/// Parameters of a resource-owner login submission (phase 1b).
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub state: Option<String>,
    pub username: String,
    pub password: String,
}

/// Parameters of a token exchange (phase 2).
#[derive(Debug, Clone, Default)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub code: Option<String>,
    pub refresh_token: Option<String>,
    pub redirect_uri: Option<String>,
}

/// A successful token grant.
#[derive(Debug, Serialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    /// Present on code exchange, absent on refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Space-joined scope string.
    pub scope: String,
}

/// Split a space-delimited scope string, preserving request order.
fn parse_scopes(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_owned).collect()
}

/// The OAuth2 authorization-code grant controller.
pub struct AuthorizationFlow {
    config: Config,
    signer: TokenSigner,
    store: Arc<dyn TokenStore>,
}

impl AuthorizationFlow {
    /// Create a flow controller over the given store.
    #[must_use]
    pub fn new(config: Config, store: Arc<dyn TokenStore>) -> Self {
        let signer = TokenSigner::new(config.signing_key.as_bytes(), config.access_token_ttl);
        Self { config, signer, store }
    }

    /// Server configuration, for metadata documents.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The access token signer, for offline verification by resource servers.
    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Phase 1: validate an authorization request before showing the login
    /// form. Each check is a distinct failure mode, applied in order.
    pub fn validate_authorize(&self, req: &AuthorizeRequest) -> AuthResult<&Client> {
        let client =
            self.config.get_client(&req.client_id).ok_or(AuthError::UnknownClient)?;

        if !client.has_redirect_uri(&req.redirect_uri) {
            return Err(AuthError::InvalidRedirectUri);
        }

        if req.response_type != "code" {
            return Err(AuthError::UnsupportedResponseType);
        }

        Ok(client)
    }

    /// Phase 1b: authenticate the resource owner and mint an authorization
    /// code bound to the submitted request.
    ///
    /// The form fields are pass-through at this point; a forged client_id
    /// still fails client authentication at the token endpoint.
    pub async fn login(&self, req: &LoginRequest) -> AuthResult<String> {
        if !self.config.verify_user(&req.username, &req.password) {
            return Err(AuthError::InvalidCredentials);
        }

        let code = generate_token();
        let record = AuthorizationCode {
            client_id: req.client_id.clone(),
            user: req.username.clone(),
            scopes: parse_scopes(&req.scope),
            redirect_uri: req.redirect_uri.clone(),
            expires_at: chrono::Utc::now() + self.config.auth_code_ttl,
        };
        self.store.put_code(code.clone(), record).await;

        tracing::info!(client_id = %req.client_id, user = %req.username, "issued authorization code");

        Ok(code)
    }

    /// Phase 2: exchange a grant for tokens.
    ///
    /// Client authentication happens before any grant-specific processing,
    /// for both grant types.
    pub async fn exchange(&self, req: &TokenRequest) -> AuthResult<TokenGrant> {
        let client = self
            .config
            .get_client(&req.client_id)
            .filter(|c| c.client_secret == req.client_secret)
            .ok_or(AuthError::ClientAuthFailed)?;

        match req.grant_type.as_str() {
            "authorization_code" => self.exchange_code(client, req).await,
            "refresh_token" => self.exchange_refresh(client, req).await,
            other => Err(AuthError::UnsupportedGrantType(other.to_owned())),
        }
    }

    async fn exchange_code(&self, client: &Client, req: &TokenRequest) -> AuthResult<TokenGrant> {
        let code = req.code.as_deref().ok_or(AuthError::InvalidGrant)?;

        // Consumption is atomic and terminal: unknown, expired, and (below)
        // mismatched codes all collapse into one error, and a code that
        // reaches this point can never be redeemed again.
        let record = self.store.consume_code(code).await.ok_or(AuthError::InvalidGrant)?;

        if record.client_id != client.client_id
            || req.redirect_uri.as_deref() != Some(record.redirect_uri.as_str())
        {
            return Err(AuthError::InvalidGrant);
        }

        let (access_token, access_record) =
            self.signer.issue(&record.user, &client.client_id, &record.scopes)?;
        let expires_in = self.config.access_token_ttl.num_seconds();
        self.store.put_access(access_token.clone(), access_record).await;

        let refresh_token = generate_token();
        self.store
            .put_refresh(
                refresh_token.clone(),
                RefreshTokenRecord {
                    user: record.user.clone(),
                    client_id: client.client_id.clone(),
                    scopes: record.scopes.clone(),
                    expires_at: self.config.refresh_token_ttl.map(|ttl| chrono::Utc::now() + ttl),
                },
            )
            .await;

        tracing::info!(client_id = %client.client_id, user = %record.user, "exchanged code for token pair");

        Ok(TokenGrant {
            access_token,
            token_type: "Bearer",
            expires_in,
            refresh_token: Some(refresh_token),
            scope: record.scopes.join(" "),
        })
    }

    async fn exchange_refresh(&self, client: &Client, req: &TokenRequest) -> AuthResult<TokenGrant> {
        let refresh_token = req.refresh_token.as_deref().ok_or(AuthError::InvalidGrant)?;

        // Lookup does not consume: refresh tokens are reusable and are not
        // rotated here.
        let record =
            self.store.get_refresh(refresh_token).await.ok_or(AuthError::InvalidGrant)?;

        if record.client_id != client.client_id {
            return Err(AuthError::InvalidGrant);
        }

        let (access_token, access_record) =
            self.signer.issue(&record.user, &client.client_id, &record.scopes)?;
        let expires_in = self.config.access_token_ttl.num_seconds();
        self.store.put_access(access_token.clone(), access_record).await;

        tracing::info!(client_id = %client.client_id, user = %record.user, "refreshed access token");

        Ok(TokenGrant {
            access_token,
            token_type: "Bearer",
            expires_in,
            refresh_token: None,
            scope: record.scopes.join(" "),
        })
    }

    /// Phase 3: validate an access token via the shadow store record.
    pub async fn validate_token(&self, token: &str) -> AuthResult<AccessTokenRecord> {
        self.store.get_access(token).await.ok_or(AuthError::InvalidToken)
    }
}

impl std::fmt::Debug for AuthorizationFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationFlow").field("issuer", &self.config.issuer).finish()
    }
}
