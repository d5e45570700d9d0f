//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("shop domain must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The domain does not end with `.myshopify.com`.
    #[error("shop domain must end with {suffix}")]
    WrongSuffix {
        /// Required suffix.
        suffix: &'static str,
    },
    /// The store handle contains characters other than `a-z`, `0-9` and `-`.
    #[error("shop domain contains an invalid store handle")]
    InvalidHandle,
}

/// A `*.myshopify.com` shop domain.
///
/// Shopify passes the shop as a query parameter on install links, OAuth
/// callbacks and app loads, and as the `dest` claim of session tokens. All of
/// those are untrusted input, so every shop reaches the rest of the app
/// through this type.
///
/// ## Constraints
///
/// - Lowercased before validation
/// - Must end with `.myshopify.com`
/// - Store handle: non-empty, ASCII letters, digits and hyphens, no leading hyphen
///
/// ## Examples
///
/// ```
/// use merchant_app_core::ShopDomain;
///
/// let shop = ShopDomain::parse("Cool-Store.myshopify.com").unwrap();
/// assert_eq!(shop.as_str(), "cool-store.myshopify.com");
/// assert_eq!(shop.store_handle(), "cool-store");
///
/// assert!(ShopDomain::parse("").is_err());
/// assert!(ShopDomain::parse("evil.example.com").is_err());
/// assert!(ShopDomain::parse("a/b.myshopify.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Required domain suffix.
    pub const SUFFIX: &'static str = ".myshopify.com";

    /// Maximum length of a DNS name.
    pub const MAX_LENGTH: usize = 253;

    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, not a
    /// `.myshopify.com` domain, or has an invalid store handle.
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(ShopDomainError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let lower = s.to_ascii_lowercase();
        let handle = lower
            .strip_suffix(Self::SUFFIX)
            .ok_or(ShopDomainError::WrongSuffix {
                suffix: Self::SUFFIX,
            })?;

        let valid_handle = !handle.is_empty()
            && !handle.starts_with('-')
            && handle
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_handle {
            return Err(ShopDomainError::InvalidHandle);
        }

        Ok(Self(lower))
    }

    /// Returns the shop domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the store handle (the part before `.myshopify.com`).
    #[must_use]
    pub fn store_handle(&self) -> &str {
        self.0.strip_suffix(Self::SUFFIX).unwrap_or(&self.0)
    }

    /// Returns the shop's admin origin, e.g. `https://cool-store.myshopify.com`.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("https://{}", self.0)
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShopDomain> for String {
    fn from(shop: ShopDomain) -> Self {
        shop.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
