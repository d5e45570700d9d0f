//! Frontend document for the embedded app.
//!
//! Static assets are served by `ServeDir`; every other path falls back to
//! [`app_shell`], which only serves `index.html` to installed shops.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use merchant_app_core::ShopDomain;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::routes::auth::AUTH_PATH;
use crate::state::AppState;

/// Placeholder in `index.html` replaced with the app's API key.
pub const API_KEY_PLACEHOLDER: &str = "%VITE_SHOPIFY_API_KEY%";

#[derive(Debug, Deserialize)]
pub struct ShellParams {
    pub shop: Option<String>,
}

/// Serve `index.html` to a shop with an active session, otherwise start
/// OAuth.
#[instrument(skip(state))]
pub async fn app_shell(
    State(state): State<AppState>,
    Query(params): Query<ShellParams>,
) -> Result<Response, AppError> {
    let shop = params
        .shop
        .as_deref()
        .and_then(|shop| ShopDomain::parse(shop).ok())
        .ok_or_else(|| AppError::BadRequest("No shop provided".into()))?;

    let config = state.config();
    let installed = state
        .sessions()
        .load_offline(&shop)
        .await
        .is_some_and(|session| session.is_active(&config.shopify.scopes, Utc::now()));

    if !installed {
        info!(shop = %shop, "Shop not installed, redirecting to OAuth");
        let target = format!(
            "{AUTH_PATH}?shop={}",
            urlencoding::encode(shop.as_str())
        );
        return Ok(Redirect::to(&target).into_response());
    }

    let path = config.index_html_path();
    let html = tokio::fs::read_to_string(&path).await.map_err(|e| {
        AppError::Internal(format!("Failed to read {}: {e}", path.display()))
    })?;

    Ok(Html(html.replace(API_KEY_PLACEHOLDER, &config.shopify.api_key)).into_response())
}
