//! Decimal prices as the Admin API expects them.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A money amount in the shop's currency with two decimal places.
///
/// The Admin API takes prices as decimal strings (`"9.99"`), so `Display`
/// and serialization both produce that form.
///
/// ```
/// use merchant_app_core::Price;
///
/// assert_eq!(Price::from_cents(999).to_string(), "9.99");
/// assert_eq!(Price::from_cents(500).to_string(), "5.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount, rounded to two places.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        let mut amount = amount.round_dp(2);
        amount.rescale(2);
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
