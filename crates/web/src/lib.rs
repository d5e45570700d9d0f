//! Merchant app backend library.
//!
//! Serves an embedded Shopify admin app: OAuth install, webhooks, a small
//! Admin API proxy for the frontend and the frontend itself. Exposed as a
//! library so the router can be exercised in tests without a socket.
//!
//! # Security
//!
//! Offline access tokens grant the app's scopes on every installed shop.
//! They are held in memory only and redacted from `Debug` output.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session_storage;
pub mod shopify;
pub mod state;

pub use config::AppConfig;
pub use routes::router;
pub use state::AppState;
