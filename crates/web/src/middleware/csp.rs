//! Frame-ancestors policy for documents served to the Shopify admin.
//!
//! The app renders inside an iframe on `admin.shopify.com` and on the shop's
//! own admin. Any other embedder is refused.

use axum::{
    extract::Request,
    http::{HeaderValue, header::CONTENT_SECURITY_POLICY},
    middleware::Next,
    response::Response,
};
use merchant_app_core::ShopDomain;

use crate::shopify::oauth::ADMIN_HOST;

/// Policy when the request names no valid shop.
const DENY_ALL: &str = "frame-ancestors 'none';";

/// Set `Content-Security-Policy: frame-ancestors ...` from the `shop` query
/// parameter.
pub async fn frame_ancestors_middleware(request: Request, next: Next) -> Response {
    let shop = request.uri().query().and_then(shop_from_query);
    let mut response = next.run(request).await;

    let policy = shop.map_or_else(
        || HeaderValue::from_static(DENY_ALL),
        |shop| {
            HeaderValue::from_str(&frame_ancestors(&shop))
                .unwrap_or_else(|_| HeaderValue::from_static(DENY_ALL))
        },
    );
    response.headers_mut().insert(CONTENT_SECURITY_POLICY, policy);

    response
}

/// Policy allowing `shop` and the Shopify admin to embed the app.
#[must_use]
pub fn frame_ancestors(shop: &ShopDomain) -> String {
    format!("frame-ancestors {} https://{ADMIN_HOST};", shop.origin())
}

fn shop_from_query(query: &str) -> Option<ShopDomain> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "shop")
        .and_then(|(_, value)| ShopDomain::parse(&value).ok())
}
