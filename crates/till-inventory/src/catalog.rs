//! Product catalogs the engine reads stock from and writes it back to.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use till_core::entities::Product;

use crate::error::InventoryError;

/// Source of truth for current stock levels.
pub trait ProductCatalog: Send + Sync {
    /// Look up one product.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::ProductNotFound` for an unknown ID and
    /// `InventoryError::Persistence` if the catalog cannot be read.
    fn get(&self, product_id: &str) -> Result<Product, InventoryError>;

    /// All products, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Persistence` if the catalog cannot be read.
    fn list(&self) -> Result<Vec<Product>, InventoryError>;

    /// Replace a product's stock and return the updated product.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::ProductNotFound` for an unknown ID and
    /// `InventoryError::Persistence` if the change cannot be written.
    fn set_stock(&self, product_id: &str, stock: u64) -> Result<Product, InventoryError>;
}

// --- In-memory catalog ---

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: RwLock<BTreeMap<String, Product>>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: RwLock::new(
                products
                    .into_iter()
                    .map(|product| (product.id.clone(), product))
                    .collect(),
            ),
        }
    }
}

impl ProductCatalog for MemoryCatalog {
    fn get(&self, product_id: &str) -> Result<Product, InventoryError> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(product_id)
            .cloned()
            .ok_or_else(|| InventoryError::ProductNotFound(product_id.to_string()))
    }

    fn list(&self) -> Result<Vec<Product>, InventoryError> {
        Ok(self
            .products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect())
    }

    fn set_stock(&self, product_id: &str, stock: u64) -> Result<Product, InventoryError> {
        let mut products = self.products.write().unwrap_or_else(PoisonError::into_inner);
        let product = products
            .get_mut(product_id)
            .ok_or_else(|| InventoryError::ProductNotFound(product_id.to_string()))?;
        product.stock = stock;
        Ok(product.clone())
    }
}

// --- JSON file catalog ---

/// Products stored as a JSON array in one file.
///
/// Writes go to a sibling temp file that is then renamed over the original,
/// so a reader never sees a half-written catalog. A missing file is an empty
/// catalog.
#[derive(Debug)]
pub struct JsonCatalog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonCatalog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Product>, InventoryError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.error(e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| self.error(e))
    }

    fn write(&self, products: &[Product]) -> Result<(), InventoryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }
        let json = serde_json::to_string_pretty(products).map_err(|e| self.error(e))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.error(e))
    }

    fn error(&self, error: impl std::fmt::Display) -> InventoryError {
        InventoryError::persistence(&self.path.display().to_string(), error)
    }
}

impl ProductCatalog for JsonCatalog {
    fn get(&self, product_id: &str) -> Result<Product, InventoryError> {
        self.read()?
            .into_iter()
            .find(|product| product.id == product_id)
            .ok_or_else(|| InventoryError::ProductNotFound(product_id.to_string()))
    }

    fn list(&self) -> Result<Vec<Product>, InventoryError> {
        let mut products = self.read()?;
        products.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(products)
    }

    fn set_stock(&self, product_id: &str, stock: u64) -> Result<Product, InventoryError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut products = self.read()?;
        let product = products
            .iter_mut()
            .find(|product| product.id == product_id)
            .ok_or_else(|| InventoryError::ProductNotFound(product_id.to_string()))?;
        product.stock = stock;
        let updated = product.clone();
        self.write(&products)?;
        Ok(updated)
    }
}
