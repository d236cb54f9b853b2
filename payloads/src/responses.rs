use serde::{Deserialize, Serialize};

/// A single record from the remote source. Consumers pass it through
/// without looking at its fields.
pub type Item = serde_json::Map<String, serde_json::Value>;

/// One bulk response from a collection endpoint.
///
/// The public product API names the array `products`, while other sources
/// use `items`; both land in `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage<T = Item> {
    #[serde(alias = "products")]
    pub items: Vec<T>,
    /// Number of records the source holds, which may exceed `items.len()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl<T> ProductPage<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            total: Some(total),
            skip: None,
            limit: None,
        }
    }

    /// The reported total, or the number of items when the source omits it.
    pub fn total(&self) -> u64 {
        self.total.unwrap_or(self.items.len() as u64)
    }
}
