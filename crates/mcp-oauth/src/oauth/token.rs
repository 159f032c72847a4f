//! Signed access tokens.
//!
//! Access tokens are self-describing HS256 JWTs: the string handed to the
//! client is itself a verifiable credential carrying the subject, client,
//! scopes, and expiry. The server additionally keeps a shadow record in the
//! token store so `/validate` stays an O(1) lookup (see DESIGN.md for why
//! both representations are kept).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::types::AccessTokenRecord;

/// Claims embedded in a signed access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the resource owner's username.
    pub sub: String,
    /// Client the token was issued to.
    pub client_id: String,
    /// Granted scopes, exactly as recorded on the source grant.
    pub scopes: Vec<String>,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Token type marker, always `"access"`.
    pub token_type: String,
}

/// Signs and verifies access tokens with a shared symmetric secret.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
}

impl TokenSigner {
    /// Create a signer from the shared secret.
    #[must_use]
    pub fn new(secret: &[u8], access_token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_token_ttl,
        }
    }

    /// Lifetime of issued access tokens.
    #[must_use]
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Issue a signed access token plus its shadow store record.
    ///
    /// # Errors
    ///
    /// Returns an error if JWT serialization fails, which only happens on a
    /// malformed signing key.
    pub fn issue(
        &self,
        user: &str,
        client_id: &str,
        scopes: &[String],
    ) -> Result<(String, AccessTokenRecord), jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expires_at = now + self.access_token_ttl;

        let claims = AccessClaims {
            sub: user.to_owned(),
            client_id: client_id.to_owned(),
            scopes: scopes.to_vec(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            token_type: "access".to_owned(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        let record = AccessTokenRecord {
            user: user.to_owned(),
            client_id: client_id.to_owned(),
            scopes: scopes.to_vec(),
            expires_at,
        };

        Ok((token, record))
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// Exposed for downstream resource servers that prefer offline
    /// verification over calling `/validate`.
    ///
    /// # Errors
    ///
    /// Returns an error for a bad signature, malformed token, or expired
    /// `exp` claim.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").field("access_token_ttl", &self.access_token_ttl).finish()
    }
}
