//! MCP OAuth Server
//!
//! A minimal OAuth 2.0 Authorization Code Grant server for MCP-capable
//! clients: issues authorization codes, exchanges them for access and
//! refresh tokens, and validates tokens for downstream resource servers.
//!
//! # Features
//!
//! - **Code grant + refresh**: single-use codes, reusable refresh tokens
//! - **Signed access tokens**: self-describing HS256 JWTs with a server-side
//!   shadow record for O(1) validation
//! - **In-memory store**: process-local, lazily expiring, behind a trait so
//!   backends can be swapped without touching grant logic
//!
//! # Example
//!
//! ```no_run
//! use mcp_oauth::{config::Config, server::AuthServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     AuthServer::new(config).run([0, 0, 0, 0], 8000).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod oauth;
pub mod server;

pub use config::Config;
pub use error::{AuthError, AuthResult};
pub use oauth::{AuthorizationFlow, MemoryTokenStore, TokenSigner, TokenStore};
