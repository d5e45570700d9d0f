//! In-memory storage for merchant sessions.
//!
//! Sessions are keyed by their ID (`offline_{shop}` for offline sessions)
//! and lost on restart, after which each shop goes through OAuth again.

use std::collections::HashMap;
use std::sync::Arc;

use merchant_app_core::{Session, ShopDomain};
use tokio::sync::RwLock;
use tracing::debug;

/// Shared session map. Cloning shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct SessionStorage {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a session.
    pub async fn store(&self, session: Session) {
        debug!(id = %session.id, shop = %session.shop, "Storing session");
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
    }

    /// Load a session by ID.
    pub async fn load(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Load the offline session of `shop`.
    pub async fn load_offline(&self, shop: &ShopDomain) -> Option<Session> {
        self.load(&Session::offline_id(shop)).await
    }

    /// Delete a session by ID. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Delete every session of `shop`. Returns how many were removed.
    pub async fn delete_shop(&self, shop: &ShopDomain) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| &session.shop != shop);
        let removed = before - sessions.len();
        debug!(shop = %shop, removed, "Deleted shop sessions");
        removed
    }
}
