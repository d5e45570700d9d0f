//! HTTP middleware.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, see `main.rs`)
//! 2. `TraceLayer` (request tracing, see `main.rs`)
//! 3. Session layer (OAuth `state` nonce only)
//! 4. Frame-ancestors CSP (frontend documents)
//! 5. Session token guard (`/api` routes)

pub mod auth;
pub mod csp;
pub mod session;

pub use auth::{CurrentSession, SessionRejection, require_session};
pub use csp::frame_ancestors_middleware;
pub use session::create_session_layer;
