//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # OAuth
//! GET  /api/auth               - Start OAuth (?shop=)
//! GET  /api/auth/callback      - Finish OAuth
//!
//! # Webhooks (HMAC signed)
//! POST /api/webhooks           - Privacy topics and app/uninstalled
//!
//! # Admin API proxy (session token required)
//! GET  /api/products/count     - Product count
//! POST /api/products           - Create sample products
//! POST /api/update-price       - Update one variant's price
//!
//! # Frontend
//! GET  /*                      - Static files, else the app shell
//! ```

use axum::{Router, handler::Handler, middleware, routing::get};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;

use crate::middleware::{create_session_layer, frame_ancestors_middleware};
use crate::state::AppState;

pub mod api;
pub mod auth;
pub mod frontend;
pub mod webhooks;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let frontend = ServiceBuilder::new()
        .layer(middleware::from_fn(frame_ancestors_middleware))
        .service(
            ServeDir::new(&state.config().static_path)
                .append_index_html_on_directories(false)
                .fallback(frontend::app_shell.with_state(state.clone())),
        );

    Router::new()
        .route("/health", get(health))
        .merge(auth::router())
        .merge(webhooks::router())
        .merge(api::router(state.clone()))
        .fallback_service(frontend)
        .layer(create_session_layer(state.config()))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
