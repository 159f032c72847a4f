//! HTTP server wiring: router construction and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::oauth::flow::AuthorizationFlow;
use crate::oauth::handlers;
use crate::oauth::store::MemoryTokenStore;

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub flow: AuthorizationFlow,
}

/// Create the HTTP router for the authorization server.
#[must_use]
pub fn create_router(config: Config) -> Router {
    let store = Arc::new(MemoryTokenStore::new());
    let flow = AuthorizationFlow::new(config, store);

    let state = Arc::new(HttpState { flow });

    Router::new()
        .route("/", get(handlers::handle_root))
        .route("/health", get(health_check))
        .route(
            "/.well-known/oauth-authorization-server",
            get(handlers::handle_metadata),
        )
        .route(
            "/authorize",
            get(handlers::handle_authorize_get).post(handlers::handle_authorize_post),
        )
        .route("/token", post(handlers::handle_token))
        .route("/validate", get(handlers::handle_validate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mcp-oauth",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// The OAuth authorization server.
#[derive(Debug)]
pub struct AuthServer {
    config: Config,
}

impl AuthServer {
    /// Create a new server from configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the HTTP server until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot bind or the server fails.
    pub async fn run(self, host: [u8; 4], port: u16) -> anyhow::Result<()> {
        let clients = self.config.clients.len();
        let users = self.config.users.len();
        tracing::info!(issuer = %self.config.issuer, clients, users, "Starting OAuth server");

        let router = create_router(self.config);
        let addr = SocketAddr::from((host, port));

        tracing::info!("HTTP server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C handler");
    tracing::info!("Received shutdown signal");
}
