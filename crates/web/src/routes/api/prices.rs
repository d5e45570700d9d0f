//! Variant price updates.

use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{AppError, MISSING_FIELDS_MESSAGE};
use crate::middleware::CurrentSession;
use crate::shopify::products::VariantPrice;
use crate::shopify::{AdminApi, ProductRef};
use crate::state::AppState;

/// Body of `POST /api/update-price`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePriceRequest {
    #[serde(default)]
    pub product_id: Option<FieldValue>,
    #[serde(default)]
    pub variant_id: Option<FieldValue>,
    #[serde(default)]
    pub price: Option<FieldValue>,
}

/// A request field as the frontend sends it.
///
/// IDs and prices arrive as strings or numbers. Empty strings, zero and
/// values of any other JSON type count as missing.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

impl FieldValue {
    fn into_present(self) -> Option<String> {
        match self {
            Self::Text(text) if !text.is_empty() => Some(text),
            Self::Number(number) if !is_zero(&number) => Some(number.to_string()),
            _ => None,
        }
    }
}

fn is_zero(number: &serde_json::Number) -> bool {
    number.as_f64().is_some_and(|n| n == 0.0)
}

/// A validated price update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    pub product_id: String,
    pub variant_id: String,
    pub price: String,
}

impl UpdatePriceRequest {
    /// Parse a raw body. Anything that is not a JSON object has no fields.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Require all three fields.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if any field is missing.
    pub fn validate(self) -> Result<PriceUpdate, AppError> {
        let missing = || AppError::Validation(MISSING_FIELDS_MESSAGE.to_string());

        Ok(PriceUpdate {
            product_id: self
                .product_id
                .and_then(FieldValue::into_present)
                .ok_or_else(missing)?,
            variant_id: self
                .variant_id
                .and_then(FieldValue::into_present)
                .ok_or_else(missing)?,
            price: self
                .price
                .and_then(FieldValue::into_present)
                .ok_or_else(missing)?,
        })
    }
}

/// Body of a successful update.
#[derive(Debug, Serialize)]
pub struct UpdatePriceResponse {
    pub success: bool,
    pub product: Option<ProductRef>,
}

/// POST /api/update-price - Set the price of one variant.
///
/// `userErrors` from Shopify do not fail the request; they are logged and
/// the mutation's product is returned.
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn update_price(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    body: Bytes,
) -> Result<Json<UpdatePriceResponse>, AppError> {
    let update = UpdatePriceRequest::from_body(&body).validate()?;
    debug!(
        product_id = %update.product_id,
        variant_id = %update.variant_id,
        price = %update.price,
        "Updating variant price"
    );

    let result = AdminApi::new(state.graphql(), &session)
        .update_variant_prices(
            &update.product_id,
            vec![VariantPrice {
                variant_id: update.variant_id,
                price: update.price,
            }],
        )
        .await?;
    debug!(?result, "productVariantsBulkUpdate response");

    if !result.user_errors.is_empty() {
        warn!(user_errors = ?result.user_errors, "Price update returned user errors");
    }

    Ok(Json(UpdatePriceResponse {
        success: true,
        product: result.product,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn validate(body: &str) -> Result<PriceUpdate, AppError> {
        UpdatePriceRequest::from_body(body.as_bytes()).validate()
    }

    #[test]
    fn test_validate_accepts_complete_body() {
        let update =
            validate(r#"{"productId":"gid://1","variantId":"gid://2","price":"9.99"}"#).unwrap();
        assert_eq!(
            update,
            PriceUpdate {
                product_id: "gid://1".to_string(),
                variant_id: "gid://2".to_string(),
                price: "9.99".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_stringifies_numeric_price() {
        let update = validate(r#"{"productId":"gid://1","variantId":"gid://2","price":12.5}"#)
            .unwrap();
        assert_eq!(update.price, "12.5");
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        for body in [
            r#"{"variantId":"gid://2","price":"9.99"}"#,
            r#"{"productId":"gid://1","price":"9.99"}"#,
            r#"{"productId":"gid://1","variantId":"gid://2"}"#,
            r#"{"productId":"","variantId":"gid://2","price":"9.99"}"#,
            r#"{"productId":"gid://1","variantId":null,"price":"9.99"}"#,
            r#"{"productId":"gid://1","variantId":"gid://2","price":0}"#,
            r#"{"productId":false,"variantId":"gid://2","price":"9.99"}"#,
            "{}",
        ] {
            let err = validate(body).unwrap_err();
            assert!(
                matches!(&err, AppError::Validation(m) if m == MISSING_FIELDS_MESSAGE),
                "{body}"
            );
        }
    }

    #[test]
    fn test_validate_non_object_body() {
        assert!(validate("not json").is_err());
        assert!(validate("[1,2,3]").is_err());
        assert!(validate("").is_err());
    }
}
