//! Product count and sample product creation.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::error::AppError;
use crate::middleware::CurrentSession;
use crate::shopify::AdminApi;
use crate::shopify::product_creator::{DEFAULT_PRODUCTS_COUNT, create_products};
use crate::state::AppState;

/// Body of `GET /api/products/count`.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

/// Body of `POST /api/products`.
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub success: bool,
    pub error: Option<String>,
}

/// GET /api/products/count - Number of products in the shop.
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn count(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<CountResponse>, AppError> {
    let count = AdminApi::new(state.graphql(), &session)
        .products_count()
        .await
        .map_err(AppError::Unhandled)?;

    Ok(Json(CountResponse { count }))
}

/// POST /api/products - Create sample products.
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn create(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Response {
    let api = AdminApi::new(state.graphql(), &session);

    match create_products(&api, DEFAULT_PRODUCTS_COUNT).await {
        Ok(created) => {
            info!(created, "Sample products created");
            Json(CreateResponse {
                success: true,
                error: None,
            })
            .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create products");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CreateResponse {
                    success: false,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}
