//! Access scope sets.

use core::fmt;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A set of Admin API access scopes, e.g. `read_products,write_products`.
///
/// Shopify treats a `write_*` scope as also granting the matching `read_*`
/// scope, so a session granted `write_products` satisfies a configuration
/// asking for `read_products`. [`AuthScopes::covers`] applies that rule.
///
/// ```
/// use merchant_app_core::AuthScopes;
///
/// let granted = AuthScopes::parse("write_products, read_orders");
/// assert!(granted.covers(&AuthScopes::parse("read_products")));
/// assert!(!granted.covers(&AuthScopes::parse("write_orders")));
/// assert_eq!(granted.to_string(), "read_orders,write_products");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AuthScopes(BTreeSet<String>);

impl AuthScopes {
    /// Parse a comma separated scope list. Blank entries are ignored.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self(
            s.split(',')
                .map(str::trim)
                .filter(|scope| !scope.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Returns `true` if no scopes are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the scopes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns `true` if every scope in `required` is granted by `self`.
    #[must_use]
    pub fn covers(&self, required: &Self) -> bool {
        let granted = self.expanded();
        required.0.iter().all(|scope| granted.contains(scope))
    }

    /// The granted scopes plus the `read_*` scopes implied by `write_*` ones.
    fn expanded(&self) -> BTreeSet<String> {
        let mut set = self.0.clone();
        for scope in &self.0 {
            if let Some(rest) = scope.strip_prefix("write_") {
                set.insert(format!("read_{rest}"));
            } else if let Some(rest) = scope.strip_prefix("unauthenticated_write_") {
                set.insert(format!("unauthenticated_read_{rest}"));
            }
        }
        set
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.0.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

impl From<String> for AuthScopes {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<AuthScopes> for String {
    fn from(scopes: AuthScopes) -> Self {
        scopes.to_string()
    }
}
