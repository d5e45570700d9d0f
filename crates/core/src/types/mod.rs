//! Core types for the merchant app.
//!
//! This module provides type-safe wrappers for the values that cross the
//! boundary between Shopify and the app.

pub mod price;
pub mod scopes;
pub mod session;
pub mod shop;

pub use price::Price;
pub use scopes::AuthScopes;
pub use session::Session;
pub use shop::{ShopDomain, ShopDomainError};
