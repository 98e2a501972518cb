//! Local inventory storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_ledger_path() -> String {
    ".till/adjustments.jsonl".to_string()
}

fn default_catalog_path() -> String {
    ".till/products.json".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InventoryConfig {
    /// Append-only JSONL file holding stock adjustment records.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,

    /// JSON product catalog used by `till stock adjust`.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            catalog_path: default_catalog_path(),
        }
    }
}

impl InventoryConfig {
    #[must_use]
    pub fn ledger_path(&self) -> PathBuf {
        PathBuf::from(&self.ledger_path)
    }

    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        PathBuf::from(&self.catalog_path)
    }
}
