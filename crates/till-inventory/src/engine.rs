//! The stock adjustment engine.
//!
//! Every adjustment follows this protocol:
//! 1. Validate the request (no lock, no side effects on failure)
//! 2. Take the per-product lock
//! 3. Compute the new stock from the product's current stock
//! 4. Persist, then return the audit record

use std::sync::Arc;

use chrono::Utc;
use till_core::entities::{Product, StockAdjustment};
use till_core::enums::AdjustmentKind;
use till_core::identity::Actor;
use till_core::ids::{PREFIX_ADJUSTMENT, generate_id};

use crate::catalog::ProductCatalog;
use crate::error::InventoryError;
use crate::ledger::AdjustmentLedger;
use crate::locks::KeyedLocks;
use crate::request::{AdjustmentRequest, ValidAdjustment};

/// Stock after applying `kind` with `quantity` to `stock`.
///
/// `decrease` clamps at zero.
///
/// # Errors
///
/// Returns `InventoryError::InvalidAdjustmentRequest` if an increase would
/// overflow.
pub fn compute_new_stock(
    kind: AdjustmentKind,
    stock: u64,
    quantity: u64,
) -> Result<u64, InventoryError> {
    match kind {
        AdjustmentKind::Increase => stock.checked_add(quantity).ok_or_else(|| {
            InventoryError::InvalidAdjustmentRequest(format!(
                "increasing stock {stock} by {quantity} overflows"
            ))
        }),
        AdjustmentKind::Decrease => Ok(stock.saturating_sub(quantity)),
        AdjustmentKind::Set => Ok(quantity),
    }
}

/// Result of a successful adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentOutcome {
    /// The audit record that was persisted.
    pub adjustment: StockAdjustment,
    /// The product with its new stock.
    pub product: Product,
    /// Stock was above the reorder level before and is at or below it now.
    pub became_low_stock: bool,
}

/// Applies adjustments and owns their audit history.
pub struct StockEngine {
    ledger: Arc<dyn AdjustmentLedger>,
    locks: KeyedLocks,
}

impl std::fmt::Debug for StockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockEngine")
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

impl StockEngine {
    #[must_use]
    pub fn new(ledger: Arc<dyn AdjustmentLedger>) -> Self {
        Self {
            ledger,
            locks: KeyedLocks::new(),
        }
    }

    /// Adjust a product snapshot and record the change.
    ///
    /// The caller owns `product`; the engine does not write it back. The
    /// per-product lock only orders the records: `product` was read before
    /// the lock, so two calls with the same snapshot both compute from it.
    /// Callers that need read-modify-write serialization use
    /// [`StockEngine::apply`], which reads stock through a catalog under the
    /// lock.
    ///
    /// # Errors
    ///
    /// - `InventoryError::InvalidAdjustmentRequest` for a non-positive
    ///   quantity or unknown kind; nothing is recorded.
    /// - `InventoryError::Persistence` if the record cannot be stored.
    pub async fn adjust_stock(
        &self,
        request: &AdjustmentRequest,
        product: &Product,
        actor: &Actor,
    ) -> Result<AdjustmentOutcome, InventoryError> {
        let valid = request.validate()?;
        let _guard = self.locks.lock(&product.id).await;
        let outcome = prepare(valid, request, product, actor)?;
        self.ledger.record(&outcome.adjustment)?;
        log_outcome(&outcome);
        Ok(outcome)
    }

    /// Load `product_id` from `catalog`, adjust it, and write the new stock
    /// back, all under the product's lock.
    ///
    /// The stock change is rolled back if the record cannot be stored.
    ///
    /// # Errors
    ///
    /// - `InventoryError::InvalidAdjustmentRequest` as for
    ///   [`StockEngine::adjust_stock`].
    /// - `InventoryError::ProductNotFound` for an unknown product.
    /// - `InventoryError::Persistence` if the catalog or ledger write fails.
    pub async fn apply(
        &self,
        catalog: &dyn ProductCatalog,
        product_id: &str,
        request: &AdjustmentRequest,
        actor: &Actor,
    ) -> Result<AdjustmentOutcome, InventoryError> {
        let valid = request.validate()?;
        let _guard = self.locks.lock(product_id).await;

        let product = catalog.get(product_id)?;
        let outcome = prepare(valid, request, &product, actor)?;
        catalog.set_stock(product_id, outcome.adjustment.new_stock)?;

        if let Err(error) = self.ledger.record(&outcome.adjustment) {
            if let Err(rollback) = catalog.set_stock(product_id, product.stock) {
                tracing::error!(
                    product_id,
                    %rollback,
                    "stock changed but neither the record nor the rollback was stored"
                );
            }
            return Err(error);
        }

        log_outcome(&outcome);
        Ok(outcome)
    }

    /// Recorded adjustments for `product_id`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Persistence` if the ledger cannot be read.
    pub fn adjustment_history(
        &self,
        product_id: &str,
    ) -> Result<Vec<StockAdjustment>, InventoryError> {
        self.ledger.history(product_id)
    }
}

fn prepare(
    valid: ValidAdjustment,
    request: &AdjustmentRequest,
    product: &Product,
    actor: &Actor,
) -> Result<AdjustmentOutcome, InventoryError> {
    let new_stock = compute_new_stock(valid.kind, product.stock, valid.quantity)?;
    let updated = product.with_stock(new_stock);

    let adjustment = StockAdjustment {
        id: generate_id(PREFIX_ADJUSTMENT)?,
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        product_sku: product.sku.clone(),
        kind: valid.kind,
        quantity: valid.quantity,
        previous_stock: product.stock,
        new_stock,
        reason: request.reason,
        notes: request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(String::from),
        adjusted_by: actor.clone(),
        created_at: Utc::now(),
    };

    Ok(AdjustmentOutcome {
        became_low_stock: !product.is_low_stock() && updated.is_low_stock(),
        product: updated,
        adjustment,
    })
}

fn log_outcome(outcome: &AdjustmentOutcome) {
    let adjustment = &outcome.adjustment;
    tracing::info!(
        id = %adjustment.id,
        product_id = %adjustment.product_id,
        kind = %adjustment.kind,
        quantity = adjustment.quantity,
        previous_stock = adjustment.previous_stock,
        new_stock = adjustment.new_stock,
        actor = %adjustment.adjusted_by.user_id,
        "stock adjusted"
    );
    if outcome.became_low_stock {
        tracing::warn!(
            product_id = %adjustment.product_id,
            stock = adjustment.new_stock,
            reorder_level = outcome.product.reorder_level,
            "product is now at or below its reorder level"
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::increase(AdjustmentKind::Increase, 10, 5, 15)]
    #[case::increase_from_zero(AdjustmentKind::Increase, 0, 1, 1)]
    #[case::decrease(AdjustmentKind::Decrease, 10, 4, 6)]
    #[case::decrease_to_zero(AdjustmentKind::Decrease, 10, 10, 0)]
    #[case::decrease_clamps(AdjustmentKind::Decrease, 3, 50, 0)]
    #[case::decrease_from_zero(AdjustmentKind::Decrease, 0, 1, 0)]
    #[case::set_up(AdjustmentKind::Set, 2, 40, 40)]
    #[case::set_down(AdjustmentKind::Set, 40, 2, 2)]
    fn computes_new_stock(
        #[case] kind: AdjustmentKind,
        #[case] stock: u64,
        #[case] quantity: u64,
        #[case] expected: u64,
    ) {
        assert_eq!(compute_new_stock(kind, stock, quantity).unwrap(), expected);
    }

    #[test]
    fn increase_overflow_is_rejected() {
        let err = compute_new_stock(AdjustmentKind::Increase, u64::MAX, 1).unwrap_err();
        assert!(err.is_invalid_request());
    }

    #[test]
    fn decrease_never_goes_negative() {
        for stock in [0, 1, 7, 100] {
            for quantity in [1, 7, 100, u64::MAX] {
                let new_stock =
                    compute_new_stock(AdjustmentKind::Decrease, stock, quantity).unwrap();
                assert_eq!(new_stock, stock.saturating_sub(quantity));
            }
        }
    }
}
