//! Integration tests for the OAuth install flow.
//!
//! The token exchange is served by a local mock server standing in for the
//! shop's admin.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use merchant_app_core::AuthScopes;
use merchant_app_integration_tests::{
    API_KEY, APP_URL, SHOP, TestApp, assert_status, header_str, session_cookie,
    signed_callback_query, shop,
};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start OAuth and return the state Shopify will echo plus the cookie
/// holding it.
async fn begin(app: &TestApp) -> (String, String) {
    let response = app
        .send(
            Request::get(format!("/api/auth?shop={SHOP}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_status(&response, StatusCode::SEE_OTHER);

    let location = Url::parse(header_str(&response, "location").unwrap()).unwrap();
    let state = location
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    (state, session_cookie(&response).unwrap())
}

async fn callback(app: &TestApp, query: &str, cookie: Option<&str>) -> axum::http::Response<Body> {
    let mut request = Request::get(format!("/api/auth/callback?{query}"));
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.send(request.body(Body::empty()).unwrap()).await
}

async fn token_endpoint() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .and(body_string_contains("code=auth-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "shpat_installed",
            "scope": "write_products"
        })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_begin_redirects_to_grant_screen() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::get(format!("/api/auth?shop={SHOP}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_status(&response, StatusCode::SEE_OTHER);
    assert!(session_cookie(&response).unwrap().starts_with("merchant_app_oauth="));

    let location = Url::parse(header_str(&response, "location").unwrap()).unwrap();
    assert_eq!(location.host_str(), Some(SHOP));
    assert_eq!(location.path(), "/admin/oauth/authorize");

    let query: std::collections::HashMap<_, _> = location.query_pairs().into_owned().collect();
    assert_eq!(query["client_id"], API_KEY);
    assert_eq!(query["scope"], "write_products");
    assert_eq!(query["redirect_uri"], format!("{APP_URL}/api/auth/callback"));
    assert!(!query["state"].is_empty());
}

#[tokio::test]
async fn test_begin_rejects_invalid_shop() {
    let app = TestApp::new();

    for uri in ["/api/auth", "/api/auth?shop=evil.example.com"] {
        let response = app
            .send(Request::get(uri).body(Body::empty()).unwrap())
            .await;
        assert_status(&response, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_callback_installs_shop() {
    let server = token_endpoint().await;
    let app = TestApp::with_oauth_origin(&server.uri());
    let (state, cookie) = begin(&app).await;

    let query = signed_callback_query(&[
        ("code", "auth-code"),
        ("shop", SHOP),
        ("state", &state),
        ("timestamp", "1700000000"),
    ]);
    let response = callback(&app, &query, Some(&cookie)).await;

    assert_status(&response, StatusCode::SEE_OTHER);
    assert_eq!(
        header_str(&response, "location"),
        Some(format!("https://admin.shopify.com/store/test-store/apps/{API_KEY}").as_str())
    );

    let session = app.state.sessions().load_offline(&shop()).await.unwrap();
    assert_eq!(session.access_token.as_deref(), Some("shpat_installed"));
    assert!(session.scope.covers(&AuthScopes::parse("write_products")));
}

#[tokio::test]
async fn test_callback_rejects_tampered_hmac() {
    let server = MockServer::start().await;
    let app = TestApp::with_oauth_origin(&server.uri());
    let (state, cookie) = begin(&app).await;

    let query = signed_callback_query(&[("code", "auth-code"), ("shop", SHOP), ("state", &state)])
        .replace("auth-code", "other-code");
    let response = callback(&app, &query, Some(&cookie)).await;

    assert_status(&response, StatusCode::BAD_REQUEST);
    assert!(app.state.sessions().load_offline(&shop()).await.is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_callback_rejects_unknown_state() {
    let server = MockServer::start().await;
    let app = TestApp::with_oauth_origin(&server.uri());
    let (_, cookie) = begin(&app).await;

    let query = signed_callback_query(&[
        ("code", "auth-code"),
        ("shop", SHOP),
        ("state", "not-the-state"),
    ]);

    assert_status(
        &callback(&app, &query, Some(&cookie)).await,
        StatusCode::BAD_REQUEST,
    );
    assert!(app.state.sessions().load_offline(&shop()).await.is_none());
}

#[tokio::test]
async fn test_callback_without_cookie_is_rejected() {
    let server = MockServer::start().await;
    let app = TestApp::with_oauth_origin(&server.uri());
    let (state, _) = begin(&app).await;

    let query = signed_callback_query(&[("code", "auth-code"), ("shop", SHOP), ("state", &state)]);

    assert_status(&callback(&app, &query, None).await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_denied_by_merchant() {
    let app = TestApp::new();

    let response = callback(&app, "error=access_denied&shop=test-store.myshopify.com", None).await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_failed_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid code"))
        .mount(&server)
        .await;
    let app = TestApp::with_oauth_origin(&server.uri());
    let (state, cookie) = begin(&app).await;

    let query = signed_callback_query(&[("code", "auth-code"), ("shop", SHOP), ("state", &state)]);
    let response = callback(&app, &query, Some(&cookie)).await;

    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.state.sessions().load_offline(&shop()).await.is_none());
}
