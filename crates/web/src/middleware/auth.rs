//! Session token authentication for `/api` routes.
//!
//! Requests from the embedded frontend carry an App Bridge session token.
//! The middleware validates it, loads the shop's offline session and makes
//! it available to handlers through [`CurrentSession`].

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use merchant_app_core::{Session, ShopDomain};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::set_sentry_shop;
use crate::routes::auth::AUTH_PATH;
use crate::shopify::session_token::{SessionTokenClaims, SessionTokenError};
use crate::state::AppState;

/// Tells App Bridge to send the merchant through OAuth again.
pub const REAUTHORIZE_HEADER: &str = "X-Shopify-API-Request-Failure-Reauthorize";

/// Where App Bridge should send the merchant to reauthorize.
pub const REAUTHORIZE_URL_HEADER: &str = "X-Shopify-API-Request-Failure-Reauthorize-Url";

/// Why a request to a protected route was refused.
#[derive(Debug)]
pub enum SessionRejection {
    /// No `Authorization: Bearer` header.
    MissingToken,
    /// The session token failed validation.
    InvalidToken(SessionTokenError),
    /// The shop has no usable session; the merchant must reauthorize.
    Reauthorize {
        /// OAuth entry point for the shop.
        url: String,
    },
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Missing session token" })),
            )
                .into_response(),
            Self::InvalidToken(e) => {
                debug!(error = %e, "Rejected session token");
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Invalid session token" })),
                )
                    .into_response()
            }
            Self::Reauthorize { url } => (
                StatusCode::FORBIDDEN,
                [(REAUTHORIZE_HEADER, "1".to_string()), (REAUTHORIZE_URL_HEADER, url)],
            )
                .into_response(),
        }
    }
}

/// Require a valid session token and an active session for its shop.
///
/// # Errors
///
/// Rejects with 401 for a missing or invalid token and 403 with
/// reauthorization headers when the shop has no active session.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, SessionRejection> {
    let config = state.config();

    let token = bearer_token(request.headers()).ok_or(SessionRejection::MissingToken)?;
    let claims = SessionTokenClaims::decode(
        token,
        &config.shopify.api_key,
        config.shopify.secret_bytes(),
    )
    .map_err(SessionRejection::InvalidToken)?;
    let shop = claims.shop().map_err(SessionRejection::InvalidToken)?;

    let session = state
        .sessions()
        .load_offline(&shop)
        .await
        .filter(|session| session.is_active(&config.shopify.scopes, Utc::now()));

    let Some(session) = session else {
        warn!(shop = %shop, "No active session, requesting reauthorization");
        return Err(SessionRejection::Reauthorize {
            url: reauthorize_url(config, &shop),
        });
    };

    set_sentry_shop(shop.as_str());
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// OAuth entry point that restarts authorization for `shop`.
#[must_use]
pub fn reauthorize_url(config: &AppConfig, shop: &ShopDomain) -> String {
    format!(
        "{}{AUTH_PATH}?shop={}",
        config.app_url,
        urlencoding::encode(shop.as_str())
    )
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor for the session attached by [`require_session`].
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentSession(session): CurrentSession) -> impl IntoResponse {
///     session.shop.to_string()
/// }
/// ```
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or(SessionRejection::MissingToken)
    }
}
