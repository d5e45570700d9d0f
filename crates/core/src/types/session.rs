//! Shopify app sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthScopes, ShopDomain};

/// An authenticated Shopify session for one shop.
///
/// Offline sessions are created by the OAuth code exchange and hold a
/// non-expiring, shop-scoped access token. Request handlers receive the
/// session from the authentication middleware and only read it.
///
/// `Debug` is implemented manually to redact the access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier (`offline_{shop}` for offline sessions).
    pub id: String,
    /// Shop the session belongs to.
    pub shop: ShopDomain,
    /// OAuth state nonce the session was created with.
    pub state: String,
    /// `true` for user-scoped (online) sessions.
    pub is_online: bool,
    /// Scopes granted by the merchant.
    pub scope: AuthScopes,
    /// Admin API access token, once the code exchange has completed.
    pub access_token: Option<String>,
    /// Expiry for online sessions. Offline sessions never expire.
    pub expires: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("shop", &self.shop)
            .field("state", &self.state)
            .field("is_online", &self.is_online)
            .field("scope", &self.scope)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires", &self.expires)
            .finish()
    }
}

impl Session {
    /// Identifier of the offline session for `shop`.
    #[must_use]
    pub fn offline_id(shop: &ShopDomain) -> String {
        format!("offline_{shop}")
    }

    /// Build an offline session from a completed code exchange.
    #[must_use]
    pub fn offline(
        shop: ShopDomain,
        state: impl Into<String>,
        scope: AuthScopes,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            id: Self::offline_id(&shop),
            shop,
            state: state.into(),
            is_online: false,
            scope,
            access_token: Some(access_token.into()),
            expires: None,
        }
    }

    /// Whether the session can be used for Admin API calls that need
    /// `required` scopes at time `now`.
    #[must_use]
    pub fn is_active(&self, required: &AuthScopes, now: DateTime<Utc>) -> bool {
        let has_token = self
            .access_token
            .as_deref()
            .is_some_and(|token| !token.is_empty());
        let not_expired = self.expires.is_none_or(|expires| expires > now);

        has_token && not_expired && self.scope.covers(required)
    }
}
