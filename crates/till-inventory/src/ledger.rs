//! Append-only adjustment ledgers.
//!
//! A ledger only ever gains records. Reads return newest first.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use till_core::entities::StockAdjustment;

use crate::error::InventoryError;

/// Storage for [`StockAdjustment`] records.
pub trait AdjustmentLedger: Send + Sync {
    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Persistence` if the record cannot be stored.
    fn record(&self, adjustment: &StockAdjustment) -> Result<(), InventoryError>;

    /// Every record, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Persistence` if the ledger cannot be read.
    fn all(&self) -> Result<Vec<StockAdjustment>, InventoryError>;

    /// Records for one product, most recent first. Empty when there are none.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Persistence` if the ledger cannot be read.
    fn history(&self, product_id: &str) -> Result<Vec<StockAdjustment>, InventoryError> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|adjustment| adjustment.product_id == product_id)
            .collect())
    }
}

// --- In-memory ledger ---

/// Process-local ledger. Records are prepended so iteration order is
/// already newest first.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: RwLock<VecDeque<StockAdjustment>>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AdjustmentLedger for MemoryLedger {
    fn record(&self, adjustment: &StockAdjustment) -> Result<(), InventoryError> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push_front(adjustment.clone());
        Ok(())
    }

    fn all(&self) -> Result<Vec<StockAdjustment>, InventoryError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect())
    }
}

// --- JSONL ledger ---

/// One JSON record per line, appended in chronological order.
///
/// The file is the audit trail: lines are never rewritten. Reads reverse the
/// file order.
#[derive(Debug)]
pub struct JsonlLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlLedger {
    /// Open (or prepare) a ledger at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Persistence` if the directory cannot be created.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, InventoryError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| InventoryError::persistence(&parent.display().to_string(), e))?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AdjustmentLedger for JsonlLedger {
    fn record(&self, adjustment: &StockAdjustment) -> Result<(), InventoryError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        serde_jsonlines::append_json_lines(&self.path, [adjustment])
            .map_err(|e| InventoryError::persistence(&self.path.display().to_string(), e))
    }

    fn all(&self) -> Result<Vec<StockAdjustment>, InventoryError> {
        let lines = match serde_jsonlines::json_lines(&self.path) {
            Ok(lines) => lines,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(InventoryError::persistence(
                    &self.path.display().to_string(),
                    e,
                ));
            }
        };
        let mut records = lines
            .collect::<Result<Vec<StockAdjustment>, _>>()
            .map_err(|e| InventoryError::persistence(&self.path.display().to_string(), e))?;
        records.reverse();
        Ok(records)
    }
}
