//! GraphQL operation definitions for Shopify Admin API.
//!
//! Each operation implements `graphql_client::GraphQLQuery` by hand with an
//! explicit `Variables` and `ResponseData` type, laid out the way the
//! `graphql_client` derive lays out generated modules. Every field the app
//! reads is typed; a response that does not fit fails to decode instead of
//! propagating nulls.

use core::fmt;

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

// =============================================================================
// Shared response types
// =============================================================================

/// A user error from a mutation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Path to the offending input field.
    pub field: Option<UserErrorField>,
    /// Human readable message.
    pub message: String,
}

/// The `field` of a user error.
///
/// The Admin API returns a path (`["variants", "0", "price"]`); a bare string
/// is accepted too and passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserErrorField {
    /// Path segments.
    Path(Vec<String>),
    /// Single field name.
    Name(String),
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(UserErrorField::Path(path)) if !path.is_empty() => {
                write!(f, "{}: {}", path.join("."), self.message)
            }
            Some(UserErrorField::Name(name)) if !name.is_empty() => {
                write!(f, "{name}: {}", self.message)
            }
            _ => f.write_str(&self.message),
        }
    }
}

/// Product reference returned by mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product GID.
    pub id: String,
}

/// Result of `productVariantsBulkUpdate`, passed through to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    /// Input errors reported by Shopify.
    pub user_errors: Vec<UserError>,
    /// The updated product, if any.
    pub product: Option<ProductRef>,
}

// =============================================================================
// Product queries
// =============================================================================

/// `query shopifyProductCount` - number of products in the shop.
pub struct ProductsCount;

pub mod products_count {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "shopifyProductCount";
    pub const QUERY: &str = r"query shopifyProductCount {
  productsCount {
    count
  }
}";

    #[derive(Debug, Clone, Default, Serialize)]
    pub struct Variables {}

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub products_count: Option<Count>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Count {
        pub count: i64,
    }
}

impl GraphQLQuery for ProductsCount {
    type Variables = products_count::Variables;
    type ResponseData = products_count::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: products_count::QUERY,
            operation_name: products_count::OPERATION_NAME,
        }
    }
}

// =============================================================================
// Product mutations
// =============================================================================

/// `mutation populateProduct` - create a product with a title.
pub struct ProductCreate;

pub mod product_create {
    use serde::{Deserialize, Serialize};

    use super::UserError;

    pub const OPERATION_NAME: &str = "populateProduct";
    pub const QUERY: &str = r"mutation populateProduct($product: ProductCreateInput!) {
  productCreate(product: $product) {
    product {
      id
      title
      variants(first: 1) {
        edges {
          node {
            id
            price
          }
        }
      }
    }
    userErrors {
      field
      message
    }
  }
}";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub product: ProductCreateInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct ProductCreateInput {
        pub title: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_create: Option<ProductCreatePayload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductCreatePayload {
        pub product: Option<CreatedProduct>,
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CreatedProduct {
        pub id: String,
        pub title: String,
        pub variants: VariantConnection,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct VariantConnection {
        pub edges: Vec<VariantEdge>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct VariantEdge {
        pub node: Variant,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Variant {
        pub id: String,
        pub price: String,
    }
}

impl GraphQLQuery for ProductCreate {
    type Variables = product_create::Variables;
    type ResponseData = product_create::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: product_create::QUERY,
            operation_name: product_create::OPERATION_NAME,
        }
    }
}

/// `mutation variantsToBulkUpdate` - update variant prices of one product.
pub struct ProductVariantsBulkUpdate;

pub mod product_variants_bulk_update {
    use serde::{Deserialize, Serialize};

    use super::MutationResult;

    pub const OPERATION_NAME: &str = "variantsToBulkUpdate";
    pub const QUERY: &str = r"mutation variantsToBulkUpdate($productId: ID!, $variantsToBulkUpdate: [ProductVariantsBulkInput!]!) {
  productVariantsBulkUpdate(
    productId: $productId
    variants: $variantsToBulkUpdate
  ) {
    userErrors {
      field
      message
    }
    product {
      id
    }
  }
}";

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub product_id: String,
        pub variants_to_bulk_update: Vec<ProductVariantsBulkInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct ProductVariantsBulkInput {
        pub id: String,
        pub price: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_variants_bulk_update: Option<MutationResult>,
    }
}

impl GraphQLQuery for ProductVariantsBulkUpdate {
    type Variables = product_variants_bulk_update::Variables;
    type ResponseData = product_variants_bulk_update::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: product_variants_bulk_update::QUERY,
            operation_name: product_variants_bulk_update::OPERATION_NAME,
        }
    }
}
