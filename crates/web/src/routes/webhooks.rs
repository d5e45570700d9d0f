//! Shopify webhook receiver.
//!
//! Handles the mandatory privacy topics and `app/uninstalled`. Deliveries
//! are acknowledged with 200 once the signature checks out and the payload
//! decodes.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use merchant_app_core::ShopDomain;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::error::AppError;
use crate::shopify::webhooks::{
    AppUninstalled, CustomersDataRequest, CustomersRedact, HEADER_HMAC, HEADER_SHOP_DOMAIN,
    HEADER_TOPIC, HEADER_WEBHOOK_ID, ShopRedact, UnknownTopic, WebhookTopic, verify_webhook_hmac,
};
use crate::state::AppState;

/// Webhook delivery endpoint.
pub const WEBHOOKS_PATH: &str = "/api/webhooks";

/// Create webhook routes.
pub fn router() -> Router<AppState> {
    Router::new().route(WEBHOOKS_PATH, post(handle_webhook))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Failed to parse payload: {e}")))
}

/// POST /api/webhooks - Verify and dispatch one delivery.
#[instrument(skip(state, headers, body))]
async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let signature = header(&headers, HEADER_HMAC)
        .ok_or_else(|| AppError::Unauthorized("Missing signature header".into()))?;

    if !verify_webhook_hmac(&body, signature, state.config().shopify.secret_bytes()) {
        warn!("Invalid webhook signature");
        return Err(AppError::Unauthorized("Invalid signature".into()));
    }

    debug!("Webhook signature verified");

    let topic = header(&headers, HEADER_TOPIC)
        .ok_or_else(|| AppError::BadRequest("Missing topic header".into()))?;
    let shop = header(&headers, HEADER_SHOP_DOMAIN)
        .and_then(|shop| ShopDomain::parse(shop).ok())
        .ok_or_else(|| AppError::BadRequest("Missing or invalid shop header".into()))?;
    let webhook_id = header(&headers, HEADER_WEBHOOK_ID).unwrap_or_default();

    let topic: WebhookTopic = topic
        .parse()
        .map_err(|e: UnknownTopic| AppError::NotFound(e.to_string()))?;

    match topic {
        WebhookTopic::CustomersDataRequest => {
            let payload: CustomersDataRequest = decode(&body)?;
            info!(
                shop = %shop,
                webhook_id,
                customer_id = payload.customer.id,
                orders = payload.orders_requested.len(),
                "Customer data request received"
            );
        }
        WebhookTopic::CustomersRedact => {
            let payload: CustomersRedact = decode(&body)?;
            info!(
                shop = %shop,
                webhook_id,
                customer_id = payload.customer.id,
                orders = payload.orders_to_redact.len(),
                "Customer redaction requested"
            );
        }
        WebhookTopic::ShopRedact => {
            let payload: ShopRedact = decode(&body)?;
            info!(
                shop = %shop,
                webhook_id,
                shop_id = payload.shop_id,
                "Shop redaction requested"
            );
        }
        WebhookTopic::AppUninstalled => {
            let payload: AppUninstalled = decode(&body)?;
            let removed = state.sessions().delete_shop(&shop).await;
            info!(
                shop = %shop,
                webhook_id,
                shop_id = payload.id,
                removed,
                "App uninstalled, sessions deleted"
            );
        }
    }

    Ok(StatusCode::OK)
}
