//! Webhook signature verification, topics and payloads.
//!
//! Shopify signs each delivery with a base64 HMAC-SHA256 of the raw body,
//! keyed by the app secret.

use core::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Base64 HMAC-SHA256 of the body.
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-Sha256";
/// Topic that triggered the delivery (e.g. `app/uninstalled`).
pub const HEADER_TOPIC: &str = "X-Shopify-Topic";
/// Shop the delivery is about.
pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";
/// Unique delivery ID.
pub const HEADER_WEBHOOK_ID: &str = "X-Shopify-Webhook-Id";
/// API version the payload is rendered in.
pub const HEADER_API_VERSION: &str = "X-Shopify-API-Version";

/// Check `signature` (base64) against the body.
#[must_use]
pub fn verify_webhook_hmac(body: &[u8], signature: &str, secret: &[u8]) -> bool {
    let Ok(provided) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}

/// Topics the app subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookTopic {
    /// A customer asked the shop for their data.
    CustomersDataRequest,
    /// The shop asked for a customer's data to be erased.
    CustomersRedact,
    /// 48 hours after uninstall, erase everything about the shop.
    ShopRedact,
    /// The app was removed from the shop.
    AppUninstalled,
}

impl WebhookTopic {
    /// Topic string as sent in `X-Shopify-Topic`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CustomersDataRequest => "customers/data_request",
            Self::CustomersRedact => "customers/redact",
            Self::ShopRedact => "shop/redact",
            Self::AppUninstalled => "app/uninstalled",
        }
    }
}

impl fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A topic the app does not handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown webhook topic: {0}")]
pub struct UnknownTopic(pub String);

impl FromStr for WebhookTopic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "customers/data_request" => Ok(Self::CustomersDataRequest),
            "customers/redact" => Ok(Self::CustomersRedact),
            "shop/redact" => Ok(Self::ShopRedact),
            "app/uninstalled" => Ok(Self::AppUninstalled),
            other => Err(UnknownTopic(other.to_string())),
        }
    }
}

/// Customer reference in privacy payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookCustomer {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// `customers/data_request` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomersDataRequest {
    pub shop_id: i64,
    pub shop_domain: String,
    #[serde(default)]
    pub orders_requested: Vec<i64>,
    pub customer: WebhookCustomer,
    #[serde(default)]
    pub data_request: Option<DataRequest>,
}

/// Data request reference.
#[derive(Debug, Clone, Deserialize)]
pub struct DataRequest {
    pub id: i64,
}

/// `customers/redact` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomersRedact {
    pub shop_id: i64,
    pub shop_domain: String,
    pub customer: WebhookCustomer,
    #[serde(default)]
    pub orders_to_redact: Vec<i64>,
}

/// `shop/redact` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopRedact {
    pub shop_id: i64,
    pub shop_domain: String,
}

/// `app/uninstalled` payload (the shop resource).
#[derive(Debug, Clone, Deserialize)]
pub struct AppUninstalled {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub myshopify_domain: Option<String>,
}
