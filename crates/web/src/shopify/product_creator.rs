//! Populate a development store with sample products.
//!
//! Each product gets a random two-word title and its default variant a random
//! price between 0.00 and 10.00.

use merchant_app_core::Price;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{info, instrument};

use super::{AdminApi, AdminShopifyError};

/// Products created per request when the caller does not say otherwise.
pub const DEFAULT_PRODUCTS_COUNT: usize = 5;

const ADJECTIVES: &[&str] = &[
    "autumn", "hidden", "bitter", "misty", "silent", "empty", "dry", "dark", "summer", "icy",
    "delicate", "quiet", "white", "cool", "spring", "winter", "patient", "twilight", "dawn",
    "crimson", "wispy", "weathered", "blue", "billowing", "broken", "cold", "damp", "falling",
    "frosty", "green", "long",
];

const NOUNS: &[&str] = &[
    "waterfall", "river", "breeze", "moon", "rain", "wind", "sea", "morning", "snow", "lake",
    "sunset", "pine", "shadow", "leaf", "dawn", "glitter", "forest", "hill", "cloud", "meadow",
    "sun", "glade", "bird", "brook", "butterfly", "bush", "dew", "dust", "field", "fire",
    "flower",
];

/// Upper bound of generated prices, in cents.
const MAX_PRICE_CENTS: i64 = 1000;

/// Create `count` sample products with random titles and prices.
///
/// Stops at the first failure; products created before it are kept.
///
/// # Errors
///
/// Returns the first Admin API error, including user errors reported by
/// either mutation.
#[instrument(skip(api), fields(shop = %api.session().shop))]
pub async fn create_products(api: &AdminApi<'_>, count: usize) -> Result<usize, AdminShopifyError> {
    for _ in 0..count {
        let (title, price) = {
            let mut rng = rand::rng();
            (random_title(&mut rng), random_price(&mut rng))
        };

        let product = api.create_product(&title).await?;
        let variant_id = product
            .first_variant_id
            .as_deref()
            .ok_or(AdminShopifyError::MissingField("product.variants"))?;
        api.set_variant_price(&product.id, variant_id, price).await?;
    }

    info!(count, "Created sample products");
    Ok(count)
}

fn random_title<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("plain");
    let noun = NOUNS.choose(rng).copied().unwrap_or("product");
    format!("{adjective} {noun}")
}

fn random_price<R: Rng + ?Sized>(rng: &mut R) -> Price {
    Price::from_cents(rng.random_range(0..=MAX_PRICE_CENTS))
}
