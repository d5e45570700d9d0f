//! Unified error handling for HTTP handlers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::shopify::AdminShopifyError;

/// Shown when a required field of a request body is missing.
pub const MISSING_FIELDS_MESSAGE: &str = "すべてのフィールドを入力してください。";

/// Shown when an Admin API call fails.
pub const SERVER_ERROR_MESSAGE: &str = "サーバーエラーが発生しました。";

/// Application-level error type.
///
/// Responses carry `{"error": ...}` bodies except for
/// [`AppError::Unhandled`], which answers with a bare status.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request input failed validation. The message is shown to the user.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Shopify API operation failed; the client gets a generic message.
    #[error("Upstream error: {0}")]
    Upstream(#[from] AdminShopifyError),

    /// Shopify API operation failed with no response body for the client.
    #[error("Unhandled error: {0}")]
    Unhandled(#[source] AdminShopifyError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Upstream(_) | Self::Unhandled(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Upstream(_) | Self::Unhandled(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Unhandled(_) => return status.into_response(),
            Self::Validation(message) => message.clone(),
            Self::Upstream(_) => SERVER_ERROR_MESSAGE.to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Tag Sentry events with the shop a request is made for.
pub fn set_sentry_shop(shop: &str) {
    sentry::configure_scope(|scope| {
        scope.set_tag("shop", shop);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, Vec<u8>) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("webhook topic".to_string());
        assert_eq!(err.to_string(), "Not found: webhook topic");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Upstream(AdminShopifyError::NoAccessToken)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_is_message() {
        let (status, body) = body_of(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({"error": MISSING_FIELDS_MESSAGE}));
    }

    #[tokio::test]
    async fn test_shopify_error_hides_details() {
        let (status, body) = body_of(AppError::Upstream(AdminShopifyError::Status {
            status: 502,
            body: "upstream secret detail".to_string(),
        }))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({"error": SERVER_ERROR_MESSAGE}));
    }

    #[tokio::test]
    async fn test_unhandled_error_has_empty_body() {
        let (status, body) = body_of(AppError::Unhandled(AdminShopifyError::NoAccessToken)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
    }
}
