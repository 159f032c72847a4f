//! Token store: the authoritative registry for live codes and tokens.
//!
//! The store is pure data plumbing with no protocol knowledge. Absence is
//! reported as `None` and the caller decides the error semantics. Expiry is
//! enforced lazily at access time; there is no background sweep, so an
//! expired record survives in memory only until the next lookup touches it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::types::{AccessTokenRecord, AuthorizationCode, RefreshTokenRecord};

/// Generate a random token using two UUIDs (256 bits).
#[must_use]
pub fn generate_token() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}

/// Storage abstraction for the three token mappings.
///
/// The flow controller only sees this trait, so the in-memory backend can be
/// swapped for a persistent one without touching any grant logic.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Store an authorization code.
    async fn put_code(&self, code: String, record: AuthorizationCode);

    /// Atomically remove and return an authorization code.
    ///
    /// This subsumes the get/delete pair: the entry is removed under a single
    /// write lock, so two concurrent consumers of the same code observe
    /// exactly one `Some`. Expired entries are evicted and reported absent,
    /// indistinguishable from codes that never existed.
    async fn consume_code(&self, code: &str) -> Option<AuthorizationCode>;

    /// Store an access token shadow record.
    async fn put_access(&self, token: String, record: AccessTokenRecord);

    /// Look up an access token, evicting it if expired.
    async fn get_access(&self, token: &str) -> Option<AccessTokenRecord>;

    /// Remove an access token.
    async fn delete_access(&self, token: &str);

    /// Store a refresh token.
    async fn put_refresh(&self, token: String, record: RefreshTokenRecord);

    /// Look up a refresh token, evicting it if a configured TTL has passed.
    async fn get_refresh(&self, token: &str) -> Option<RefreshTokenRecord>;
}

/// In-memory token store. Contents are lost on restart by design.
#[derive(Clone)]
pub struct MemoryTokenStore {
    codes: Arc<RwLock<HashMap<String, AuthorizationCode>>>,
    access_tokens: Arc<RwLock<HashMap<String, AccessTokenRecord>>>,
    refresh_tokens: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            codes: Arc::new(RwLock::new(HashMap::new())),
            access_tokens: Arc::new(RwLock::new(HashMap::new())),
            refresh_tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put_code(&self, code: String, record: AuthorizationCode) {
        self.codes.write().await.insert(code, record);
    }

    async fn consume_code(&self, code: &str) -> Option<AuthorizationCode> {
        // Remove first: consumption is terminal whether the code turns out
        // to be live or expired.
        let record = self.codes.write().await.remove(code)?;
        if record.is_expired() {
            return None;
        }
        Some(record)
    }

    async fn put_access(&self, token: String, record: AccessTokenRecord) {
        self.access_tokens.write().await.insert(token, record);
    }

    async fn get_access(&self, token: &str) -> Option<AccessTokenRecord> {
        let mut tokens = self.access_tokens.write().await;
        let record = tokens.get(token)?;
        if record.is_expired() {
            tokens.remove(token);
            return None;
        }
        Some(record.clone())
    }

    async fn delete_access(&self, token: &str) {
        self.access_tokens.write().await.remove(token);
    }

    async fn put_refresh(&self, token: String, record: RefreshTokenRecord) {
        self.refresh_tokens.write().await.insert(token, record);
    }

    async fn get_refresh(&self, token: &str) -> Option<RefreshTokenRecord> {
        let mut tokens = self.refresh_tokens.write().await;
        let record = tokens.get(token)?;
        if record.is_expired() {
            tokens.remove(token);
            return None;
        }
        Some(record.clone())
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenStore").finish()
    }
}
