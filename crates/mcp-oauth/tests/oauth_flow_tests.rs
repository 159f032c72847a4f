//! End-to-end tests for the OAuth 2.0 authorization code flow via HTTP.
//!
//! Drives the real axum `Router`: discovery → authorize → login → token
//! exchange → validation → refresh.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use mcp_oauth::config::Config;
use mcp_oauth::server::create_router;

const ISSUER: &str = "https://auth.example";

fn build_test_router() -> axum::Router {
    create_router(Config::for_testing())
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Run the authorize GET + login POST and return the issued code.
async fn obtain_code(app: &axum::Router, state: Option<&str>) -> (String, Option<String>) {
    let form: Vec<(&str, &str)> = vec![
        ("client_id", "demo_client"),
        ("redirect_uri", "https://app.example/cb"),
        ("scope", "mcp:read"),
        ("state", state.unwrap_or("")),
        ("username", "alice"),
        ("password", "pw"),
    ];
    let body = serde_urlencoded::to_string(form).unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::post("/authorize")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers().get("Location").unwrap().to_str().unwrap();
    assert!(location.starts_with("https://app.example/cb"));

    let url = url::Url::parse(location).unwrap();
    let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
    (pairs["code"].clone(), pairs.get("state").cloned())
}

/// Exchange a code for tokens, returning the raw response.
async fn exchange_code(app: &axum::Router, code: &str) -> axum::response::Response {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", "demo_client"),
        ("client_secret", "s3cr3t"),
        ("redirect_uri", "https://app.example/cb"),
    ];
    let body = serde_urlencoded::to_string(params).unwrap();

    app.clone()
        .oneshot(
            Request::post("/token")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

// ─── Discovery ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_service_descriptor() {
    let app = build_test_router();

    let response =
        app.oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["authorization_endpoint"], format!("{ISSUER}/authorize"));
    assert_eq!(json["token_endpoint"], format!("{ISSUER}/token"));
    assert_eq!(json["validation_endpoint"], format!("{ISSUER}/validate"));
}

#[tokio::test]
async fn test_auth_server_metadata() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::get("/.well-known/oauth-authorization-server").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;

    assert_eq!(json["issuer"], ISSUER);
    assert_eq!(json["response_types_supported"], serde_json::json!(["code"]));
    assert_eq!(
        json["grant_types_supported"],
        serde_json::json!(["authorization_code", "refresh_token"])
    );
    assert_eq!(json["scopes_supported"], serde_json::json!(["mcp:read", "mcp:write"]));
}

// ─── Authorize GET ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_authorize_shows_login_form() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::get(
                "/authorize?client_id=demo_client&redirect_uri=https%3A%2F%2Fapp.example%2Fcb&response_type=code&scope=mcp%3Aread&state=xyz",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("demo_client"));
    assert!(html.contains(r#"name="password""#));
}

#[tokio::test]
async fn test_authorize_rejects_unknown_client() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::get(
                "/authorize?client_id=ghost&redirect_uri=https%3A%2F%2Fapp.example%2Fcb&response_type=code&scope=mcp%3Aread",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid_client");
}

#[tokio::test]
async fn test_authorize_rejects_unregistered_redirect() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::get(
                "/authorize?client_id=demo_client&redirect_uri=https%3A%2F%2Fevil.example%2Fsteal&response_type=code&scope=mcp%3Aread",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid_redirect_uri");
}

#[tokio::test]
async fn test_authorize_rejects_implicit_flow() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::get(
                "/authorize?client_id=demo_client&redirect_uri=https%3A%2F%2Fapp.example%2Fcb&response_type=token&scope=mcp%3Aread",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "unsupported_response_type");
}

// ─── Authorize POST ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_redirects_with_code_and_state() {
    let app = build_test_router();

    let (code, state) = obtain_code(&app, Some("xyz")).await;
    assert!(!code.is_empty());
    assert_eq!(state.as_deref(), Some("xyz"));
}

#[tokio::test]
async fn test_login_omits_absent_state() {
    let app = build_test_router();

    let (code, state) = obtain_code(&app, None).await;
    assert!(!code.is_empty());
    assert!(state.is_none());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = build_test_router();

    let params = [
        ("client_id", "demo_client"),
        ("redirect_uri", "https://app.example/cb"),
        ("scope", "mcp:read"),
        ("username", "alice"),
        ("password", "wrong"),
    ];
    let body = serde_urlencoded::to_string(params).unwrap();

    let response = app
        .oneshot(
            Request::post("/authorize")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "invalid_credentials");
}

// ─── Token exchange ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_code_exchange() {
    let app = build_test_router();

    let (code, _) = obtain_code(&app, Some("xyz")).await;
    let response = exchange_code(&app, &code).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");

    let json = json_body(response).await;
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 3600);
    assert_eq!(json["scope"], "mcp:read");
    assert!(json["access_token"].as_str().is_some());
    assert!(json["refresh_token"].as_str().is_some());
}

#[tokio::test]
async fn test_code_cannot_be_replayed() {
    let app = build_test_router();

    let (code, _) = obtain_code(&app, None).await;
    assert_eq!(exchange_code(&app, &code).await.status(), StatusCode::OK);

    let replay = exchange_code(&app, &code).await;
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(replay).await["error"], "invalid_grant");
}

#[tokio::test]
async fn test_token_rejects_wrong_client_secret() {
    let app = build_test_router();

    let (code, _) = obtain_code(&app, None).await;
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code.as_str()),
        ("client_id", "demo_client"),
        ("client_secret", "nope"),
        ("redirect_uri", "https://app.example/cb"),
    ];
    let body = serde_urlencoded::to_string(params).unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::post("/token")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "invalid_client");
}

#[tokio::test]
async fn test_token_rejects_redirect_mismatch() {
    let app = build_test_router();

    let (code, _) = obtain_code(&app, None).await;
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code.as_str()),
        ("client_id", "demo_client"),
        ("client_secret", "s3cr3t"),
        ("redirect_uri", "https://app.example/elsewhere"),
    ];
    let body = serde_urlencoded::to_string(params).unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::post("/token")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid_grant");
}

#[tokio::test]
async fn test_unsupported_grant_type() {
    let app = build_test_router();

    let params = [
        ("grant_type", "password"),
        ("client_id", "demo_client"),
        ("client_secret", "s3cr3t"),
    ];
    let body = serde_urlencoded::to_string(params).unwrap();

    let response = app
        .oneshot(
            Request::post("/token")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "unsupported_grant_type");
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_validate_fresh_token() {
    let app = build_test_router();

    let (code, _) = obtain_code(&app, None).await;
    let token_json = json_body(exchange_code(&app, &code).await).await;
    let access_token = token_json["access_token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::get(&format!("/validate?token={access_token}")).body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["valid"], true);
    assert_eq!(json["user"], "alice");
    assert_eq!(json["client_id"], "demo_client");
    assert_eq!(json["scopes"], serde_json::json!(["mcp:read"]));
}

#[tokio::test]
async fn test_validate_accepts_bearer_header() {
    let app = build_test_router();

    let (code, _) = obtain_code(&app, None).await;
    let token_json = json_body(exchange_code(&app, &code).await).await;
    let access_token = token_json["access_token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::get("/validate")
                .header("Authorization", format!("Bearer {access_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["valid"], true);
}

#[tokio::test]
async fn test_validate_rejects_unknown_token() {
    let app = build_test_router();

    let response = app
        .oneshot(Request::get("/validate?token=bogus").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "invalid_token");
}

// ─── Refresh ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_grant_reusable() {
    let app = build_test_router();

    let (code, _) = obtain_code(&app, None).await;
    let token_json = json_body(exchange_code(&app, &code).await).await;
    let refresh_token = token_json["refresh_token"].as_str().unwrap().to_string();

    let mut access_tokens = Vec::new();
    for _ in 0..3 {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", "demo_client"),
            ("client_secret", "s3cr3t"),
        ];
        let body = serde_urlencoded::to_string(params).unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::post("/token")
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["scope"], "mcp:read");
        // No rotation: refresh responses carry no new refresh token
        assert!(json.get("refresh_token").is_none());
        access_tokens.push(json["access_token"].as_str().unwrap().to_string());
    }

    // N uses produced N distinct access tokens
    access_tokens.sort();
    access_tokens.dedup();
    assert_eq!(access_tokens.len(), 3);
}

#[tokio::test]
async fn test_refresh_rejects_unknown_token() {
    let app = build_test_router();

    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", "bogus"),
        ("client_id", "demo_client"),
        ("client_secret", "s3cr3t"),
    ];
    let body = serde_urlencoded::to_string(params).unwrap();

    let response = app
        .oneshot(
            Request::post("/token")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid_grant");
}
