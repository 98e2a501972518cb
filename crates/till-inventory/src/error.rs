//! Error types for till-inventory.

use thiserror::Error;
use till_core::errors::CoreError;

/// Errors from stock adjustment and its storage.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The request was rejected before any mutation. Caller-correctable.
    #[error("invalid adjustment: {0}")]
    InvalidAdjustmentRequest(String),

    /// No product with this ID in the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// The ledger or catalog could not be read or written.
    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl InventoryError {
    /// Whether the caller can fix the input and try again.
    #[must_use]
    pub const fn is_invalid_request(&self) -> bool {
        matches!(self, Self::InvalidAdjustmentRequest(_))
    }

    pub(crate) fn persistence(context: &str, error: impl std::fmt::Display) -> Self {
        Self::Persistence(format!("{context}: {error}"))
    }
}
