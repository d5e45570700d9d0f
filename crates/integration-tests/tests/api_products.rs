//! Integration tests for the authenticated product endpoints.
//!
//! Run with: cargo test -p merchant-app-integration-tests

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use merchant_app_integration_tests::{
    API_KEY, API_SECRET, APP_URL, SHOP, TestApp, assert_status, header_str, json_body, session_token_with,
};
use merchant_app_web::shopify::AdminShopifyError;
use serde_json::json;

const MISSING_FIELDS: &str = "すべてのフィールドを入力してください。";
const SERVER_ERROR: &str = "サーバーエラーが発生しました。";

fn created_product(n: u32) -> serde_json::Value {
    json!({"data": {"productCreate": {
        "product": {
            "id": format!("gid://shopify/Product/{n}"),
            "title": "Sample",
            "variants": {"edges": [{"node": {
                "id": format!("gid://shopify/ProductVariant/{n}"),
                "price": "0.00"
            }}]}
        },
        "userErrors": []
    }}})
}

fn price_set(n: u32) -> serde_json::Value {
    json!({"data": {"productVariantsBulkUpdate": {
        "product": {"id": format!("gid://shopify/Product/{n}")},
        "userErrors": []
    }}})
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_api_requires_session_token() {
    let app = TestApp::new();
    app.install().await;

    let response = app
        .send(
            Request::get("/api/products/count")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_status(&response, StatusCode::UNAUTHORIZED);
    assert!(app.graphql.requests().is_empty());
}

#[tokio::test]
async fn test_api_rejects_forged_and_expired_tokens() {
    let app = TestApp::new();
    app.install().await;

    for token in [
        session_token_with(SHOP, API_KEY, b"a-different-signing-key-entirely", 60),
        session_token_with(SHOP, "another-app", API_SECRET.as_bytes(), 60),
        session_token_with(SHOP, API_KEY, API_SECRET.as_bytes(), -120),
    ] {
        let response = app
            .send(
                Request::get("/api/products/count")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_status(&response, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_api_asks_uninstalled_shop_to_reauthorize() {
    let app = TestApp::new();

    let response = app.get_api("/api/products/count").await;

    assert_status(&response, StatusCode::FORBIDDEN);
    assert_eq!(
        header_str(&response, "x-shopify-api-request-failure-reauthorize"),
        Some("1")
    );
    assert_eq!(
        header_str(&response, "x-shopify-api-request-failure-reauthorize-url"),
        Some(format!("{APP_URL}/api/auth?shop={SHOP}").as_str())
    );
}

#[tokio::test]
async fn test_unknown_api_path_is_not_found() {
    let app = TestApp::new();
    app.install().await;

    let response = app.get_api("/api/does-not-exist").await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

// ============================================================================
// GET /api/products/count
// ============================================================================

#[tokio::test]
async fn test_products_count() {
    let app = TestApp::new();
    app.install().await;
    app.graphql
        .push(Ok(json!({"data": {"productsCount": {"count": 7}}})));

    let response = app.get_api("/api/products/count").await;

    assert_status(&response, StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"count": 7}));
    assert_eq!(
        app.graphql.requests()[0]["operationName"],
        json!("shopifyProductCount")
    );
}

#[tokio::test]
async fn test_products_count_upstream_failure() {
    let app = TestApp::new();
    app.install().await;
    app.graphql.push(Err(AdminShopifyError::Status {
        status: 502,
        body: "bad gateway".to_string(),
    }));

    let response = app.get_api("/api/products/count").await;
    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// POST /api/products
// ============================================================================

#[tokio::test]
async fn test_create_products_makes_five() {
    let app = TestApp::new();
    app.install().await;
    for n in 1..=5 {
        app.graphql.push(Ok(created_product(n)));
        app.graphql.push(Ok(price_set(n)));
    }

    let response = app.post_api("/api/products", Body::empty()).await;

    assert_status(&response, StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"success": true, "error": null})
    );

    let requests = app.graphql.requests();
    assert_eq!(requests.len(), 10);
    for pair in requests.chunks(2) {
        assert_eq!(pair[0]["operationName"], json!("populateProduct"));
        assert_eq!(pair[1]["operationName"], json!("variantsToBulkUpdate"));
    }
}

#[tokio::test]
async fn test_create_products_reports_failure() {
    let app = TestApp::new();
    app.install().await;
    app.graphql.push(Ok(json!({"data": {"productCreate": {
        "product": null,
        "userErrors": [{"field": ["title"], "message": "Title can't be blank"}]
    }}})));

    let response = app.post_api("/api/products", Body::empty()).await;

    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("Title can't be blank"));
    assert_eq!(app.graphql.requests().len(), 1);
}

// ============================================================================
// POST /api/update-price
// ============================================================================

#[tokio::test]
async fn test_update_price_success() {
    let app = TestApp::new();
    app.install().await;
    app.graphql.push(Ok(price_set(1)));

    let response = app
        .post_api(
            "/api/update-price",
            r#"{"productId":"gid://shopify/Product/1","variantId":"gid://shopify/ProductVariant/2","price":"19.99"}"#,
        )
        .await;

    assert_status(&response, StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"success": true, "product": {"id": "gid://shopify/Product/1"}})
    );

    let request = &app.graphql.requests()[0];
    assert_eq!(request["operationName"], json!("variantsToBulkUpdate"));
    assert_eq!(
        request["variables"],
        json!({
            "productId": "gid://shopify/Product/1",
            "variantsToBulkUpdate": [{"id": "gid://shopify/ProductVariant/2", "price": "19.99"}]
        })
    );
}

#[tokio::test]
async fn test_update_price_missing_fields_never_calls_shopify() {
    let app = TestApp::new();
    app.install().await;

    for body in [
        r#"{"variantId":"gid://2","price":"1.00"}"#,
        r#"{"productId":"gid://1","price":"1.00"}"#,
        r#"{"productId":"gid://1","variantId":"gid://2"}"#,
        r#"{"productId":"gid://1","variantId":"gid://2","price":""}"#,
        "not json",
    ] {
        let response = app.post_api("/api/update-price", body).await;
        assert_status(&response, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": MISSING_FIELDS}));
    }

    assert!(app.graphql.requests().is_empty());
}

#[tokio::test]
async fn test_update_price_upstream_failure() {
    let app = TestApp::new();
    app.install().await;
    app.graphql.push(Err(AdminShopifyError::Status {
        status: 500,
        body: "internal".to_string(),
    }));

    let response = app
        .post_api(
            "/api/update-price",
            r#"{"productId":"gid://1","variantId":"gid://2","price":"5"}"#,
        )
        .await;

    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({"error": SERVER_ERROR}));
}

#[tokio::test]
async fn test_update_price_user_errors_still_succeed() {
    let app = TestApp::new();
    app.install().await;
    app.graphql.push(Ok(json!({"data": {"productVariantsBulkUpdate": {
        "product": {"id": "gid://1"},
        "userErrors": [{"field": ["variants", "0", "price"], "message": "Price must be positive"}]
    }}})));

    let response = app
        .post_api(
            "/api/update-price",
            r#"{"productId":"gid://1","variantId":"gid://2","price":"-3"}"#,
        )
        .await;

    assert_status(&response, StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"success": true, "product": {"id": "gid://1"}})
    );
}
