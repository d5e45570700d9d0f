//! Shopify OAuth install routes.
//!
//! `GET /api/auth?shop=` starts the grant and `GET /api/auth/callback`
//! completes it, storing the shop's offline session.

use axum::{
    Router,
    extract::{Query, RawQuery, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use merchant_app_core::{AuthScopes, Session as MerchantSession, ShopDomain};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::shopify::oauth::{embedded_app_url, verify_callback_hmac};
use crate::state::AppState;

/// OAuth entry point.
pub const AUTH_PATH: &str = "/api/auth";

/// OAuth redirect target registered with Shopify.
pub const CALLBACK_PATH: &str = "/api/auth/callback";

const OAUTH_STATE_KEY: &str = "shopify_oauth_state";

/// Build the OAuth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(AUTH_PATH, get(begin))
        .route(CALLBACK_PATH, get(callback))
}

#[derive(Debug, Deserialize)]
pub struct BeginParams {
    pub shop: Option<String>,
}

/// GET /api/auth - Redirect the merchant to the shop's grant screen.
#[instrument(skip(state, session))]
async fn begin(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<BeginParams>,
) -> Result<Response, AppError> {
    let shop = params
        .shop
        .as_deref()
        .and_then(|shop| ShopDomain::parse(shop).ok())
        .ok_or_else(|| AppError::BadRequest("Missing or invalid shop parameter".into()))?;

    // Random state parameter for CSRF protection
    let oauth_state = uuid::Uuid::new_v4().to_string();
    session
        .insert(OAUTH_STATE_KEY, &oauth_state)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store OAuth state: {e}")))?;

    let config = state.config();
    let auth_url = state.oauth().authorization_url(
        &shop,
        &config.shopify.scopes,
        &config.oauth_callback_url(),
        &oauth_state,
    );

    info!(shop = %shop, "Redirecting to Shopify OAuth");
    Ok(Redirect::to(&auth_url).into_response())
}

/// GET /api/auth/callback - Verify the callback and exchange the code.
#[instrument(skip(state, session, query))]
async fn callback(
    State(state): State<AppState>,
    session: Session,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let params: Vec<(String, String)> =
        url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
            .into_owned()
            .collect();
    let param = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    // Check for errors from Shopify
    if let Some(error) = param("error") {
        warn!(error, "Shopify OAuth error");
        return Err(AppError::BadRequest("OAuth authorization was denied".into()));
    }

    let config = state.config();
    if !verify_callback_hmac(&params, config.shopify.secret_bytes()) {
        warn!("Invalid HMAC signature in OAuth callback");
        return Err(AppError::BadRequest("Invalid HMAC signature".into()));
    }

    let shop = param("shop")
        .and_then(|shop| ShopDomain::parse(shop).ok())
        .ok_or_else(|| AppError::BadRequest("Missing or invalid shop parameter".into()))?;
    let code = param("code")
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".into()))?;
    let callback_state = param("state")
        .ok_or_else(|| AppError::BadRequest("Missing state parameter".into()))?;

    // Verify state matches what we stored
    let stored_state: Option<String> = session.get(OAUTH_STATE_KEY).await.ok().flatten();
    if stored_state.as_deref() != Some(callback_state) {
        warn!(shop = %shop, "OAuth state mismatch");
        return Err(AppError::BadRequest("Invalid OAuth state".into()));
    }
    let _ = session.remove::<String>(OAUTH_STATE_KEY).await;

    let token = state
        .oauth()
        .exchange_code(&shop, code)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to exchange OAuth code: {e}")))?;

    state
        .sessions()
        .store(MerchantSession::offline(
            shop.clone(),
            callback_state,
            AuthScopes::parse(&token.scope),
            token.access_token,
        ))
        .await;

    info!(shop = %shop, scope = %token.scope, "App installed");
    let target = embedded_app_url(&shop, param("host"), &config.shopify.api_key);
    Ok(Redirect::to(&target).into_response())
}
