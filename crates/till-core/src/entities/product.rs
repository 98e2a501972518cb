use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A sellable product as returned by the backend catalog.
///
/// Stock adjustments consume a `Product` snapshot; they never own it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub stock: u64,
    /// Stock level at or below which the product needs reordering.
    #[serde(default)]
    pub reorder_level: u64,
    #[serde(default)]
    pub price: f64,
    pub category: Option<String>,
}

impl Product {
    /// Whether stock has reached the reorder threshold.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock <= self.reorder_level
    }

    /// Copy of this product with `stock` replaced.
    #[must_use]
    pub fn with_stock(&self, stock: u64) -> Self {
        Self {
            stock,
            ..self.clone()
        }
    }
}
