//! OAuth authorization code grant for offline access tokens.
//!
//! 1. [`OAuthClient::authorization_url`] sends the merchant to the shop's
//!    grant screen.
//! 2. Shopify redirects back with `code`, `shop`, `state`, `timestamp`, `host`
//!    and an `hmac` over the other parameters ([`verify_callback_hmac`]).
//! 3. [`OAuthClient::exchange_code`] trades the code for an access token.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use hmac::{Hmac, Mac};
use merchant_app_core::{AuthScopes, ShopDomain};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use tracing::instrument;

use crate::config::ShopifyAppConfig;

use super::AdminShopifyError;

type HmacSha256 = Hmac<Sha256>;

/// Shopify admin host for embedded apps.
pub const ADMIN_HOST: &str = "admin.shopify.com";

/// `host` parameters are base64 with or without padding.
const HOST_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Access token granted by the code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    /// Offline access token.
    pub access_token: String,
    /// Granted scopes, comma separated.
    pub scope: String,
}

/// OAuth client for the app's credentials.
#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    origin: Option<String>,
}

impl OAuthClient {
    /// Create a client from the app credentials.
    #[must_use]
    pub fn new(config: &ShopifyAppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.api_key.clone(),
            client_secret: config.api_secret.clone(),
            origin: None,
        }
    }

    /// Exchange codes at `origin` instead of `https://{shop}`.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into().trim_end_matches('/').to_string());
        self
    }

    /// URL of the shop's grant screen.
    #[must_use]
    pub fn authorization_url(
        &self,
        shop: &ShopDomain,
        scopes: &AuthScopes,
        redirect_uri: &str,
        state: &str,
    ) -> String {
        format!(
            "{}/admin/oauth/authorize?client_id={}&scope={}&redirect_uri={}&state={}",
            shop.origin(),
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&scopes.to_string()),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for an offline access token.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::OAuth` if Shopify rejects the exchange,
    /// `AdminShopifyError::Http` if the request fails.
    #[instrument(skip(self, code), fields(shop = %shop))]
    pub async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<AccessTokenResponse, AdminShopifyError> {
        let origin = self.origin.clone().unwrap_or_else(|| shop.origin());
        let url = format!("{origin}/admin/oauth/access_token");

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("code", code),
        ];

        let response = self.http.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AdminShopifyError::OAuth(format!(
                "Token exchange failed: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

/// Verify the `hmac` parameter of an OAuth callback.
///
/// The message is every other parameter except `signature`, sorted by key
/// and joined as `key=value` with `&`. The digest is hex and compared in
/// constant time.
#[must_use]
pub fn verify_callback_hmac(params: &[(String, String)], secret: &[u8]) -> bool {
    let Some(provided) = params
        .iter()
        .find(|(key, _)| key == "hmac")
        .map(|(_, value)| value)
    else {
        return false;
    };
    let Ok(provided) = hex::decode(provided) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(callback_message(params).as_bytes());
    mac.verify_slice(&provided).is_ok()
}

fn callback_message(params: &[(String, String)]) -> String {
    let mut pairs: Vec<&(String, String)> = params
        .iter()
        .filter(|(key, _)| key != "hmac" && key != "signature")
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// URL of the app inside the Shopify admin.
///
/// Uses the decoded `host` parameter when it names the shop's admin,
/// otherwise `https://admin.shopify.com/store/{handle}/apps/{api_key}`.
#[must_use]
pub fn embedded_app_url(shop: &ShopDomain, host: Option<&str>, api_key: &str) -> String {
    if let Some(admin) = host.and_then(|host| decode_host(host, shop)) {
        return format!("https://{admin}/apps/{api_key}");
    }
    format!(
        "https://{ADMIN_HOST}/store/{}/apps/{api_key}",
        shop.store_handle()
    )
}

fn decode_host(host: &str, shop: &ShopDomain) -> Option<String> {
    let decoded = HOST_ENGINE.decode(host.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let decoded = decoded.trim_end_matches('/');

    let authority = decoded.split('/').next()?;
    (authority == ADMIN_HOST || authority == shop.as_str()).then(|| decoded.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const SECRET: &[u8] = b"hush";

    fn shop() -> ShopDomain {
        ShopDomain::parse("my-store.myshopify.com").unwrap()
    }

    fn config() -> ShopifyAppConfig {
        ShopifyAppConfig {
            api_key: "api-key".to_string(),
            api_secret: SecretString::from("hush"),
            scopes: AuthScopes::parse("write_products"),
            api_version: "2026-01".to_string(),
        }
    }

    fn sign_callback_params(params: &[(String, String)], secret: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret).unwrap();
        mac.update(callback_message(params).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_authorization_url() {
        let client = OAuthClient::new(&config());
        let url = client.authorization_url(
            &shop(),
            &AuthScopes::parse("write_products"),
            "https://app.test/api/auth/callback",
            "nonce",
        );
        assert_eq!(
            url,
            "https://my-store.myshopify.com/admin/oauth/authorize?client_id=api-key\
             &scope=write_products&redirect_uri=https%3A%2F%2Fapp.test%2Fapi%2Fauth%2Fcallback\
             &state=nonce"
        );
    }

    #[test]
    fn test_verify_callback_hmac() {
        let mut params = pairs(&[
            ("shop", "my-store.myshopify.com"),
            ("code", "abc"),
            ("timestamp", "1700000000"),
            ("state", "nonce"),
        ]);
        let digest = sign_callback_params(&params, SECRET);
        params.push(("hmac".to_string(), digest));

        assert!(verify_callback_hmac(&params, SECRET));
        assert!(!verify_callback_hmac(&params, b"other"));
    }

    #[test]
    fn test_verify_callback_hmac_ignores_signature() {
        let mut params = pairs(&[("shop", "my-store.myshopify.com"), ("code", "abc")]);
        let digest = sign_callback_params(&params, SECRET);
        params.push(("signature".to_string(), "legacy".to_string()));
        params.push(("hmac".to_string(), digest));

        assert!(verify_callback_hmac(&params, SECRET));
    }

    #[test]
    fn test_verify_callback_hmac_tampered() {
        let mut params = pairs(&[("shop", "my-store.myshopify.com"), ("code", "abc")]);
        let digest = sign_callback_params(&params, SECRET);
        params.push(("hmac".to_string(), digest));
        params[1].1 = "xyz".to_string();

        assert!(!verify_callback_hmac(&params, SECRET));
    }

    #[test]
    fn test_verify_callback_hmac_missing_or_malformed() {
        let params = pairs(&[("shop", "my-store.myshopify.com")]);
        assert!(!verify_callback_hmac(&params, SECRET));

        let params = pairs(&[("shop", "my-store.myshopify.com"), ("hmac", "not-hex")]);
        assert!(!verify_callback_hmac(&params, SECRET));
    }

    #[test]
    fn test_embedded_app_url_from_host() {
        let host = base64::engine::general_purpose::STANDARD
            .encode("admin.shopify.com/store/my-store");
        assert_eq!(
            embedded_app_url(&shop(), Some(&host), "api-key"),
            "https://admin.shopify.com/store/my-store/apps/api-key"
        );

        let unpadded = base64::engine::general_purpose::STANDARD_NO_PAD
            .encode("my-store.myshopify.com/admin");
        assert_eq!(
            embedded_app_url(&shop(), Some(&unpadded), "api-key"),
            "https://my-store.myshopify.com/admin/apps/api-key"
        );
    }

    #[test]
    fn test_embedded_app_url_rejects_foreign_host() {
        let host = base64::engine::general_purpose::STANDARD.encode("evil.example/store/x");
        assert_eq!(
            embedded_app_url(&shop(), Some(&host), "api-key"),
            "https://admin.shopify.com/store/my-store/apps/api-key"
        );
        assert_eq!(
            embedded_app_url(&shop(), Some("%%%"), "api-key"),
            "https://admin.shopify.com/store/my-store/apps/api-key"
        );
        assert_eq!(
            embedded_app_url(&shop(), None, "api-key"),
            "https://admin.shopify.com/store/my-store/apps/api-key"
        );
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/oauth/access_token"))
            .and(body_string_contains("code=abc"))
            .and(body_string_contains("client_id=api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "shpat_new",
                "scope": "write_products"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::new(&config()).with_origin(server.uri());
        let token = client.exchange_code(&shop(), "abc").await.unwrap();
        assert_eq!(token.access_token, "shpat_new");
        assert_eq!(token.scope, "write_products");
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid code"))
            .mount(&server)
            .await;

        let client = OAuthClient::new(&config()).with_origin(server.uri());
        let err = client.exchange_code(&shop(), "abc").await.unwrap_err();
        assert_eq!(err.to_string(), "OAuth error: Token exchange failed: invalid code");
    }
}
