//! Admin API proxy routes for the embedded frontend.
//!
//! Every route here sits behind [`require_session`]; handlers read the
//! merchant session with [`CurrentSession`](crate::middleware::CurrentSession).

use axum::{
    Router, middleware,
    routing::{any, get, post},
};

use crate::error::AppError;
use crate::middleware::require_session;
use crate::state::AppState;

pub mod prices;
pub mod products;

/// Build the protected `/api` router.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/products/count", get(products::count))
        .route("/api/products", post(products::create))
        .route("/api/update-price", post(prices::update_price))
        .route("/api/{*path}", any(not_found))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

async fn not_found() -> AppError {
    AppError::NotFound("No such API route".into())
}
