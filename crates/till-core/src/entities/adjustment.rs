use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AdjustmentKind, AdjustmentReason};
use crate::identity::Actor;

/// An append-only audit record of one stock mutation.
///
/// Product name and SKU are captured at adjustment time and never updated,
/// even if the product is later renamed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_sku: String,
    pub kind: AdjustmentKind,
    /// Requested quantity; always positive.
    pub quantity: u64,
    pub previous_stock: u64,
    pub new_stock: u64,
    pub reason: AdjustmentReason,
    pub notes: Option<String>,
    pub adjusted_by: Actor,
    pub created_at: DateTime<Utc>,
}

impl StockAdjustment {
    /// Signed stock change this record applied.
    #[must_use]
    pub fn delta(&self) -> i128 {
        i128::from(self.new_stock) - i128::from(self.previous_stock)
    }
}
