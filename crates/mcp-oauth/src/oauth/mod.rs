//! OAuth 2.0 authorization code grant implementation.
//!
//! Layered as a token store (pure data, lazy expiry) beneath a flow
//! controller (the grant state machine), with axum handlers on top.
//!
//! ## Supported Standards
//! - RFC 6749: Authorization Code Grant (code + refresh token flows)
//! - RFC 8414: OAuth Authorization Server Metadata

pub mod flow;
pub mod handlers;
pub mod login;
pub mod store;
pub mod token;
pub mod types;

pub use flow::AuthorizationFlow;
pub use store::{MemoryTokenStore, TokenStore};
pub use token::TokenSigner;
