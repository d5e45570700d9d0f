//! Shopify integration: Admin API GraphQL adapter, OAuth, session tokens
//! and webhooks.
//!
//! # Architecture
//!
//! - [`AdminGraphql`] is the transport seam. Production uses
//!   [`HttpAdminGraphql`]; tests substitute a stub.
//! - [`AdminApi`] binds the transport to one merchant [`Session`] and runs
//!   typed operations from [`queries`], decoding every response into explicit
//!   structs.
//! - No retries, no rate-limit handling and no timeouts: a failed call is
//!   reported once to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use merchant_app_web::shopify::{AdminApi, HttpAdminGraphql};
//!
//! let transport = HttpAdminGraphql::new(&config.shopify);
//! let api = AdminApi::new(&transport, &session);
//!
//! let count = api.products_count().await?;
//! ```
//!
//! [`Session`]: merchant_app_core::Session

pub mod client;
pub mod oauth;
pub mod product_creator;
pub mod products;
pub mod queries;
pub mod session_token;
pub mod webhooks;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing;

pub use client::{AdminApi, AdminGraphql, HttpAdminGraphql};
pub use oauth::OAuthClient;
pub use queries::{MutationResult, ProductRef, UserError, UserErrorField};

use thiserror::Error;

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success status.
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response decoded but a field the operation needs was null.
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User errors from a mutation (e.g., invalid input).
    #[error("User errors: {}", format_user_errors(.0))]
    UserErrors(Vec<UserError>),

    /// The session carries no access token.
    #[error("Session has no access token")]
    NoAccessToken,

    /// OAuth code exchange failed.
    #[error("OAuth error: {0}")]
    OAuth(String),
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(UserError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
