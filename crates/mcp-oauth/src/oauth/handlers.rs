//! HTTP endpoint handlers for the authorization server.
//!
//! Thin adapters between axum extractors and the `AuthorizationFlow`; all
//! protocol decisions live in the flow controller.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Query, State},
    http::{HeaderValue, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use serde::Deserialize;

use super::flow::{AuthorizeRequest, LoginRequest, TokenGrant, TokenRequest};
use super::login::render_login_page;
use crate::error::AuthError;
use crate::server::HttpState;

// ─── Service descriptor and metadata ─────────────────────────────────────────

/// `GET /`
///
/// Service descriptor with absolute endpoint URLs.
pub async fn handle_root(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let issuer = &state.flow.config().issuer;
    Json(serde_json::json!({
        "service": "mcp-oauth",
        "version": env!("CARGO_PKG_VERSION"),
        "authorization_endpoint": format!("{issuer}/authorize"),
        "token_endpoint": format!("{issuer}/token"),
        "validation_endpoint": format!("{issuer}/validate"),
    }))
}

/// `GET /.well-known/oauth-authorization-server`
///
/// RFC 8414 authorization server metadata.
pub async fn handle_metadata(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let config = state.flow.config();
    let issuer = &config.issuer;
    Json(serde_json::json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/authorize"),
        "token_endpoint": format!("{issuer}/token"),
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code", "refresh_token"],
        "token_endpoint_auth_methods_supported": ["client_secret_post"],
        "scopes_supported": config.scopes_supported(),
    }))
}

// ─── Authorization endpoint ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub response_type: String,
    #[serde(default)]
    pub scope: String,
    pub state: Option<String>,
}

/// `GET /authorize`
///
/// Validate the authorization request and present the login form.
pub async fn handle_authorize_get(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<AuthorizeQuery>,
) -> Response {
    let request = AuthorizeRequest {
        client_id: query.client_id,
        redirect_uri: query.redirect_uri,
        response_type: query.response_type,
        scope: query.scope,
        state: query.state,
    };

    match state.flow.validate_authorize(&request) {
        Ok(_) => Html(render_login_page(
            &request.client_id,
            &request.redirect_uri,
            &request.scope,
            request.state.as_deref(),
        ))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub scope: String,
    pub state: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /authorize`
///
/// Authenticate the resource owner; on success redirect the user agent back
/// to the client with the authorization code and echoed `state`.
pub async fn handle_authorize_post(
    State(state): State<Arc<HttpState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    // An empty state field from the hidden form input means no state at all.
    let oauth_state = form.state.filter(|s| !s.is_empty());

    let request = LoginRequest {
        client_id: form.client_id,
        redirect_uri: form.redirect_uri,
        scope: form.scope,
        state: oauth_state.clone(),
        username: form.username,
        password: form.password,
    };

    let code = match state.flow.login(&request).await {
        Ok(code) => code,
        Err(err) => return err.into_response(),
    };

    let Ok(mut location) = url::Url::parse(&request.redirect_uri) else {
        return AuthError::InvalidRedirectUri.into_response();
    };
    {
        let mut pairs = location.query_pairs_mut();
        pairs.append_pair("code", &code);
        if let Some(ref s) = oauth_state {
            pairs.append_pair("state", s);
        }
    }

    // 303 so the user agent switches the POST to a GET at the client.
    Redirect::to(location.as_str()).into_response()
}

// ─── Token endpoint ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TokenForm {
    #[serde(default)]
    pub grant_type: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub code: Option<String>,
    pub refresh_token: Option<String>,
    pub redirect_uri: Option<String>,
}

/// `POST /token`
///
/// Exchange an authorization code or refresh token for an access token.
pub async fn handle_token(
    State(state): State<Arc<HttpState>>,
    Form(form): Form<TokenForm>,
) -> Response {
    let request = TokenRequest {
        grant_type: form.grant_type,
        client_id: form.client_id,
        client_secret: form.client_secret,
        code: form.code,
        refresh_token: form.refresh_token,
        redirect_uri: form.redirect_uri,
    };

    match state.flow.exchange(&request).await {
        Ok(grant) => token_success(&grant),
        Err(err) => err.into_response(),
    }
}

/// Build a token response with the required cache headers (RFC 6749 §5.1).
fn token_success(grant: &TokenGrant) -> Response {
    let mut response = Json(grant).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

// ─── Validation endpoint ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    pub token: Option<String>,
}

/// `GET /validate`
///
/// Check an access token on behalf of a downstream resource server. The
/// token is accepted either as a `?token=` query parameter or as a bearer
/// `Authorization` header.
pub async fn handle_validate(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<ValidateQuery>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Response {
    let token = match query.token.or_else(|| bearer.map(|h| h.token().to_owned())) {
        Some(token) => token,
        None => return AuthError::InvalidToken.into_response(),
    };

    match state.flow.validate_token(&token).await {
        Ok(record) => Json(serde_json::json!({
            "valid": true,
            "user": record.user,
            "client_id": record.client_id,
            "scopes": record.scopes,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}
