//! Adjustment requests as submitted by a caller, and their validation.

use serde::{Deserialize, Serialize};
use till_core::enums::{AdjustmentKind, AdjustmentReason};

use crate::error::InventoryError;

/// A stock change as entered on the adjustment form.
///
/// `kind` and `quantity` are kept raw so that validation, not parsing,
/// decides what is acceptable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequest {
    pub kind: String,
    pub quantity: i64,
    pub reason: AdjustmentReason,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidAdjustment {
    pub kind: AdjustmentKind,
    pub quantity: u64,
}

impl AdjustmentRequest {
    #[must_use]
    pub fn new(kind: impl Into<String>, quantity: i64, reason: AdjustmentReason) -> Self {
        Self {
            kind: kind.into(),
            quantity,
            reason,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Check the request. The first failing rule wins:
    /// 1. `quantity` must be greater than zero, for every kind
    /// 2. `kind` must be `increase`, `decrease`, or `set`
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::InvalidAdjustmentRequest` with a message
    /// suitable for showing next to the form.
    pub fn validate(&self) -> Result<ValidAdjustment, InventoryError> {
        let quantity = u64::try_from(self.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                InventoryError::InvalidAdjustmentRequest(format!(
                    "quantity must be greater than 0 (got {})",
                    self.quantity
                ))
            })?;

        let kind = self.kind.parse::<AdjustmentKind>().map_err(|_| {
            InventoryError::InvalidAdjustmentRequest(format!(
                "unknown adjustment kind '{}' (expected increase, decrease, or set)",
                self.kind
            ))
        })?;

        Ok(ValidAdjustment { kind, quantity })
    }
}
