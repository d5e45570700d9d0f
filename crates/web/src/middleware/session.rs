//! Cookie session layer for the OAuth handshake.
//!
//! The only value kept in the cookie session is the OAuth `state` nonce
//! between `/api/auth` and the callback. Merchant sessions live in
//! [`SessionStorage`](crate::session_storage::SessionStorage).

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "merchant_app_oauth";

/// The grant screen has to be completed within this window.
const SESSION_EXPIRY_SECONDS: i64 = 10 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore> {
    let is_secure = config.app_url.starts_with("https://");

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        // Lax: Shopify redirects back to the callback with a top-level GET
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
