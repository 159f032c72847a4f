//! Error types for the OAuth authorization server.
//!
//! Uses `thiserror` for the protocol error taxonomy. Every variant is a
//! client-input error surfaced synchronously as a 4xx response; none is fatal
//! to the process and no request failure corrupts store state for others.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Protocol errors surfaced by the authorization flow.
///
/// Unknown, expired, and mismatched grants deliberately collapse into the
/// single `InvalidGrant` variant so responses never reveal whether a
/// presented code or token ever existed.
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// The `client_id` does not reference a provisioned client.
    #[error("unknown client_id")]
    UnknownClient,

    /// Client authentication at the token endpoint failed.
    #[error("invalid client credentials")]
    ClientAuthFailed,

    /// The redirect URI is not registered for the client.
    #[error("redirect_uri is not registered for this client")]
    InvalidRedirectUri,

    /// Only the authorization-code grant is supported.
    #[error("response_type must be 'code'")]
    UnsupportedResponseType,

    /// Resource-owner login failed.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The presented code or refresh token is unknown, expired, or bound to
    /// a different client or redirect URI.
    #[error("grant is invalid or expired")]
    InvalidGrant,

    /// The `grant_type` is not one of the supported values.
    #[error("unsupported grant_type: {0}")]
    UnsupportedGrantType(String),

    /// The access token is unknown or expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Token signing failed. Only reachable with a malformed signing key.
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// The OAuth error code for the JSON response body.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownClient | Self::ClientAuthFailed => "invalid_client",
            Self::InvalidRedirectUri => "invalid_redirect_uri",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidGrant => "invalid_grant",
            Self::UnsupportedGrantType(_) => "unsupported_grant_type",
            Self::InvalidToken => "invalid_token",
            Self::Signing(_) => "server_error",
        }
    }

    /// The HTTP status the error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownClient
            | Self::InvalidRedirectUri
            | Self::UnsupportedResponseType
            | Self::InvalidGrant
            | Self::UnsupportedGrantType(_) => StatusCode::BAD_REQUEST,
            Self::ClientAuthFailed | Self::InvalidCredentials | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "internal error while issuing tokens");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }

        let body = Json(serde_json::json!({
            "error": self.error_code(),
            "error_description": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Result type alias for flow operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::UnknownClient.error_code(), "invalid_client");
        assert_eq!(AuthError::ClientAuthFailed.error_code(), "invalid_client");
        assert_eq!(AuthError::InvalidGrant.error_code(), "invalid_grant");
        assert_eq!(
            AuthError::UnsupportedGrantType("password".into()).error_code(),
            "unsupported_grant_type"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::UnknownClient.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::ClientAuthFailed.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidGrant.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_grant_message_does_not_leak_cause() {
        // Expired and unknown grants must be indistinguishable
        let message = AuthError::InvalidGrant.to_string();
        assert!(!message.contains("unknown"));
        assert!(!message.contains("mismatch"));
    }
}
