//! # till-inventory
//!
//! Stock adjustments for Till.
//!
//! [`StockEngine`] validates an [`AdjustmentRequest`], computes the new stock
//! (`increase`, `decrease` clamped at zero, or `set`), and appends an
//! immutable [`StockAdjustment`](till_core::entities::StockAdjustment) to an
//! [`AdjustmentLedger`]. Adjustments to the same product are serialized.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod request;

use std::sync::Arc;

use till_config::InventoryConfig;

pub use catalog::{JsonCatalog, MemoryCatalog, ProductCatalog};
pub use engine::{AdjustmentOutcome, StockEngine, compute_new_stock};
pub use error::InventoryError;
pub use ledger::{AdjustmentLedger, JsonlLedger, MemoryLedger};
pub use request::{AdjustmentRequest, ValidAdjustment};

/// Engine over the JSONL ledger and the JSON catalog named in config.
///
/// # Errors
///
/// Returns `InventoryError::Persistence` if the ledger directory cannot be
/// created.
pub fn open_local(config: &InventoryConfig) -> Result<(StockEngine, JsonCatalog), InventoryError> {
    let ledger = JsonlLedger::new(config.ledger_path())?;
    Ok((
        StockEngine::new(Arc::new(ledger)),
        JsonCatalog::new(config.catalog_path()),
    ))
}
