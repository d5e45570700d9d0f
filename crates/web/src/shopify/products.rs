//! Product operations for the Admin API.

use merchant_app_core::Price;
use tracing::instrument;

use super::{
    AdminApi, AdminShopifyError, MutationResult,
    queries::{
        ProductCreate, ProductVariantsBulkUpdate, ProductsCount, product_create,
        product_variants_bulk_update, products_count,
    },
};

/// A product returned by `productCreate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedProduct {
    /// Product GID.
    pub id: String,
    /// Product title.
    pub title: String,
    /// GID of the default variant, if Shopify returned one.
    pub first_variant_id: Option<String>,
}

/// A single variant price change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPrice {
    /// Variant GID.
    pub variant_id: String,
    /// New price, as a decimal string.
    pub price: String,
}

impl AdminApi<'_> {
    /// Number of products in the shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or `productsCount` is null.
    #[instrument(skip(self), fields(shop = %self.session().shop))]
    pub async fn products_count(&self) -> Result<i64, AdminShopifyError> {
        let response = self
            .execute::<ProductsCount>(products_count::Variables::default())
            .await?;

        response
            .products_count
            .map(|count| count.count)
            .ok_or(AdminShopifyError::MissingField("productsCount"))
    }

    /// Create a product with the given title.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::UserErrors` if Shopify rejects the input,
    /// or an error if the request fails.
    #[instrument(skip(self), fields(shop = %self.session().shop))]
    pub async fn create_product(&self, title: &str) -> Result<CreatedProduct, AdminShopifyError> {
        let variables = product_create::Variables {
            product: product_create::ProductCreateInput {
                title: title.to_string(),
            },
        };

        let payload = self
            .execute::<ProductCreate>(variables)
            .await?
            .product_create
            .ok_or(AdminShopifyError::MissingField("productCreate"))?;

        if !payload.user_errors.is_empty() {
            return Err(AdminShopifyError::UserErrors(payload.user_errors));
        }

        let product = payload
            .product
            .ok_or(AdminShopifyError::MissingField("productCreate.product"))?;

        Ok(CreatedProduct {
            first_variant_id: product
                .variants
                .edges
                .into_iter()
                .next()
                .map(|edge| edge.node.id),
            id: product.id,
            title: product.title,
        })
    }

    /// Run `productVariantsBulkUpdate` for one product.
    ///
    /// The mutation result is returned as-is; `userErrors` are not turned
    /// into an error so callers can pass them through.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, GraphQL errors are reported or
    /// the payload is null.
    #[instrument(skip(self, variants), fields(shop = %self.session().shop, variants = variants.len()))]
    pub async fn update_variant_prices(
        &self,
        product_id: &str,
        variants: Vec<VariantPrice>,
    ) -> Result<MutationResult, AdminShopifyError> {
        let variables = product_variants_bulk_update::Variables {
            product_id: product_id.to_string(),
            variants_to_bulk_update: variants
                .into_iter()
                .map(|v| product_variants_bulk_update::ProductVariantsBulkInput {
                    id: v.variant_id,
                    price: v.price,
                })
                .collect(),
        };

        self.execute::<ProductVariantsBulkUpdate>(variables)
            .await?
            .product_variants_bulk_update
            .ok_or(AdminShopifyError::MissingField("productVariantsBulkUpdate"))
    }

    /// Set the price of one variant, failing on user errors.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::UserErrors` if Shopify rejects the price,
    /// or any error from [`AdminApi::update_variant_prices`].
    pub async fn set_variant_price(
        &self,
        product_id: &str,
        variant_id: &str,
        price: Price,
    ) -> Result<MutationResult, AdminShopifyError> {
        let result = self
            .update_variant_prices(
                product_id,
                vec![VariantPrice {
                    variant_id: variant_id.to_string(),
                    price: price.to_string(),
                }],
            )
            .await?;

        if result.user_errors.is_empty() {
            Ok(result)
        } else {
            Err(AdminShopifyError::UserErrors(result.user_errors))
        }
    }
}
