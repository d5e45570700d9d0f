//! App Bridge session tokens.
//!
//! The embedded frontend sends a short-lived HS256 JWT signed with the app
//! secret in `Authorization: Bearer <token>`. The `dest` claim names the shop
//! the request is made for.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use merchant_app_core::ShopDomain;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Clock skew tolerated on `exp` and `nbf`, in seconds.
pub const LEEWAY_SECS: u64 = 5;

/// Errors from decoding a session token.
#[derive(Debug, Error)]
pub enum SessionTokenError {
    /// Signature, audience or time claims did not validate.
    #[error("Invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// The `dest` claim is not a shop URL.
    #[error("Session token has an invalid destination: {0}")]
    InvalidDestination(String),
}

/// Claims of a Shopify session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokenClaims {
    /// Shop admin URL that issued the token (`https://{shop}/admin`).
    pub iss: String,
    /// Shop URL (`https://{shop}`).
    pub dest: String,
    /// App API key.
    pub aud: String,
    /// Staff user ID.
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry (Unix seconds).
    pub exp: i64,
    /// Not before (Unix seconds).
    pub nbf: i64,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Token ID.
    pub jti: String,
    /// Shopify session ID.
    #[serde(default)]
    pub sid: Option<String>,
}

impl SessionTokenClaims {
    /// Decode and validate `token` for the app identified by `api_key`.
    ///
    /// # Errors
    ///
    /// Returns `SessionTokenError::Invalid` for a bad signature, a foreign
    /// audience, or an expired or not yet valid token.
    pub fn decode(token: &str, api_key: &str, secret: &[u8]) -> Result<Self, SessionTokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;
        validation.validate_nbf = true;
        validation.set_audience(&[api_key]);

        let data = decode::<Self>(token, &DecodingKey::from_secret(secret), &validation)?;
        Ok(data.claims)
    }

    /// Shop named by the `dest` claim.
    ///
    /// # Errors
    ///
    /// Returns `SessionTokenError::InvalidDestination` if `dest` is not an
    /// `https://{shop}.myshopify.com` URL.
    pub fn shop(&self) -> Result<ShopDomain, SessionTokenError> {
        let invalid = || SessionTokenError::InvalidDestination(self.dest.clone());

        let url = url::Url::parse(&self.dest).map_err(|_| invalid())?;
        if url.scheme() != "https" {
            return Err(invalid());
        }
        let host = url.host_str().ok_or_else(invalid)?;
        ShopDomain::parse(host).map_err(|_| invalid())
    }
}
