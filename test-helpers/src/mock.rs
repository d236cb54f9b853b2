//! Sample product data for the mock source
//!
//! Shaped like the public product API (`products`, `total`, `skip`,
//! `limit`) so the alias handling in `payloads` is exercised, and used by:
//! - Development server (dev-server)
//! - Loader integration tests

use payloads::ProductPage;
use serde_json::{Value, json};

/// A small catalog across a few categories.
pub fn sample_products() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "title": "Essence Mascara Lash Princess",
            "category": "beauty",
            "price": 9.99,
            "rating": 4.94,
            "stock": 5,
            "brand": "Essence"
        }),
        json!({
            "id": 2,
            "title": "Eyeshadow Palette with Mirror",
            "category": "beauty",
            "price": 19.99,
            "rating": 3.28,
            "stock": 44,
            "brand": "Glamour Beauty"
        }),
        json!({
            "id": 6,
            "title": "Calvin Klein CK One",
            "category": "fragrances",
            "price": 49.99,
            "rating": 4.85,
            "stock": 17,
            "brand": "Calvin Klein"
        }),
        json!({
            "id": 11,
            "title": "Annibale Colombo Bed",
            "category": "furniture",
            "price": 1899.99,
            "rating": 4.14,
            "stock": 47,
            "brand": "Annibale Colombo"
        }),
        json!({
            "id": 16,
            "title": "Apple",
            "category": "groceries",
            "price": 1.99,
            "rating": 2.96,
            "stock": 9
        }),
    ]
}

/// Response body for the first `count` sample products, reporting
/// `total` as the size of the whole catalog.
pub fn catalog_body(count: usize, total: u64) -> String {
    let products: Vec<Value> =
        sample_products().into_iter().take(count).collect();
    let limit = products.len();
    json!({
        "products": products,
        "total": total,
        "skip": 0,
        "limit": limit
    })
    .to_string()
}

/// The whole sample catalog as the source would serve it.
pub fn full_catalog_body() -> String {
    let count = sample_products().len();
    catalog_body(count, count as u64)
}

/// The sample catalog as a decoded page, e.g. for substitute data.
pub fn sample_page() -> ProductPage {
    serde_json::from_str(&full_catalog_body())
        .expect("sample catalog is a valid page")
}

/// Log what the mock source serves.
pub fn print_summary() {
    tracing::info!("📋 Sample catalog:");
    for product in sample_products() {
        tracing::info!(
            "   - #{} {} ({}) ${}",
            product["id"],
            product["title"].as_str().unwrap_or_default(),
            product["category"].as_str().unwrap_or_default(),
            product["price"]
        );
    }
}
