//! Integration test harness for the merchant app.
//!
//! Builds the real router around a scripted Admin API transport and drives
//! it in-process with `tower::ServiceExt::oneshot`. No network or running
//! server is needed; OAuth code exchange tests point the OAuth client at a
//! `wiremock` server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p merchant-app-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use merchant_app_core::{AuthScopes, Session, ShopDomain};
use merchant_app_web::session_storage::SessionStorage;
use merchant_app_web::shopify::session_token::SessionTokenClaims;
use merchant_app_web::shopify::{AdminGraphql, AdminShopifyError, OAuthClient};
use merchant_app_web::{AppConfig, AppState, router};
use sha2::Sha256;
use tempfile::TempDir;
use tower::ServiceExt;

type HmacSha256 = Hmac<Sha256>;

pub const API_KEY: &str = "test-api-key";
pub const API_SECRET: &str = "4f9c2a7b1e8d3f6a0c5b9e2d7a1f4c8b";
pub const APP_URL: &str = "https://app.example.test";
pub const SCOPES: &str = "write_products";
pub const SHOP: &str = "test-store.myshopify.com";
pub const INDEX_HTML: &str =
    r#"<html><head><meta name="shopify-api-key" content="%VITE_SHOPIFY_API_KEY%"></head></html>"#;

type Reply = Result<serde_json::Value, AdminShopifyError>;

/// Admin API transport that replies from a script and records requests.
#[derive(Default)]
pub struct StubGraphql {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<serde_json::Value>>,
}

impl StubGraphql {
    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdminGraphql for StubGraphql {
    async fn post(
        &self,
        _session: &Session,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, AdminShopifyError> {
        self.requests.lock().unwrap().push(body);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AdminShopifyError::Status {
                    status: 503,
                    body: "no scripted reply".to_string(),
                })
            })
    }
}

/// The app wired to a [`StubGraphql`] and a temporary frontend directory.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub graphql: Arc<StubGraphql>,
    _frontend: TempDir,
}

impl TestApp {
    /// App whose OAuth client talks to `https://{shop}`.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// App whose OAuth client exchanges codes at `origin`.
    pub fn with_oauth_origin(origin: &str) -> Self {
        Self::build(Some(origin))
    }

    fn build(oauth_origin: Option<&str>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("frontend/assets")).unwrap();
        std::fs::write(dir.path().join("frontend/index.html"), INDEX_HTML).unwrap();
        std::fs::write(dir.path().join("frontend/assets/app.js"), "console.log(1);").unwrap();

        let config = test_config(dir.path());
        let graphql = Arc::new(StubGraphql::default());
        let oauth = OAuthClient::new(&config.shopify);
        let oauth = match oauth_origin {
            Some(origin) => oauth.with_origin(origin),
            None => oauth,
        };

        let state = AppState::from_parts(config, graphql.clone(), oauth, SessionStorage::new());

        Self {
            router: router(state.clone()),
            state,
            graphql,
            _frontend: dir,
        }
    }

    /// Store an active offline session for [`SHOP`].
    pub async fn install(&self) {
        self.state
            .sessions()
            .store(Session::offline(
                shop(),
                "installed",
                AuthScopes::parse(SCOPES),
                "shpat_test",
            ))
            .await;
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Authenticated `GET`.
    pub async fn get_api(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::get(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", session_token(SHOP)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Authenticated `POST` with a raw body.
    pub async fn post_api(&self, uri: &str, body: impl Into<Body>) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", session_token(SHOP)))
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration as the environment of a development machine would give it.
pub fn test_config(cwd: &Path) -> AppConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SHOPIFY_API_KEY", API_KEY),
        ("SHOPIFY_API_SECRET", API_SECRET),
        ("SCOPES", SCOPES),
        ("SHOPIFY_APP_URL", APP_URL),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).map(ToString::to_string), cwd).unwrap()
}

pub fn shop() -> ShopDomain {
    ShopDomain::parse(SHOP).unwrap()
}

/// App Bridge session token for `shop`, valid for one minute.
pub fn session_token(shop: &str) -> String {
    session_token_with(shop, API_KEY, API_SECRET.as_bytes(), 60)
}

/// Session token with explicit audience, key and lifetime.
pub fn session_token_with(shop: &str, audience: &str, secret: &[u8], ttl_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = SessionTokenClaims {
        iss: format!("https://{shop}/admin"),
        dest: format!("https://{shop}"),
        aud: audience.to_string(),
        sub: Some("1".to_string()),
        exp: now + ttl_secs,
        nbf: now - 10,
        iat: now - 10,
        jti: format!("jti-{now}"),
        sid: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

/// Base64 webhook signature of `body`.
pub fn sign_webhook(body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(API_SECRET.as_bytes()).unwrap();
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Query string for an OAuth callback, with a valid `hmac` appended.
pub fn signed_callback_query(params: &[(&str, &str)]) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let message = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut mac = HmacSha256::new_from_slice(API_SECRET.as_bytes()).unwrap();
    mac.update(message.as_bytes());
    let digest = hex::encode(mac.finalize().into_bytes());

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in params {
        serializer.append_pair(k, v);
    }
    serializer.append_pair("hmac", &digest);
    serializer.finish()
}

/// Read a response body as JSON.
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as text.
pub async fn text_body(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Header value as a string, if present.
pub fn header_str<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// `name=value` of the first `Set-Cookie` header, for replaying it.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    header_str(response, "set-cookie")
        .and_then(|cookie| cookie.split(';').next())
        .map(ToString::to_string)
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}
