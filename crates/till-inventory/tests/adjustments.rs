//! Engine behavior across ledgers and catalogs.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use till_config::InventoryConfig;
use till_core::entities::Product;
use till_core::enums::{AdjustmentKind, AdjustmentReason};
use till_core::identity::Actor;
use till_inventory::{
    AdjustmentLedger, AdjustmentRequest, InventoryError, JsonlLedger, MemoryCatalog, MemoryLedger,
    ProductCatalog, StockEngine,
};

fn product(id: &str, stock: u64) -> Product {
    Product {
        id: id.into(),
        name: "Espresso Beans 1kg".into(),
        sku: "ESP-1KG".into(),
        stock,
        reorder_level: 5,
        price: 18.5,
        category: Some("coffee".into()),
    }
}

fn cashier() -> Actor {
    Actor {
        user_id: "usr_7".into(),
        display_name: Some("Sam".into()),
        role: Some("cashier".into()),
    }
}

fn engine() -> (StockEngine, Arc<MemoryLedger>) {
    let ledger = Arc::new(MemoryLedger::new());
    (StockEngine::new(ledger.clone()), ledger)
}

// ---------------------------------------------------------------------------
// adjust_stock
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_adjustment_records_one_entry() {
    let (engine, ledger) = engine();
    let request =
        AdjustmentRequest::new("decrease", 3, AdjustmentReason::Damage).with_notes("bag split");

    let outcome = engine
        .adjust_stock(&request, &product("prd_1", 42), &cashier())
        .await
        .unwrap();

    let adjustment = &outcome.adjustment;
    assert_eq!(adjustment.kind, AdjustmentKind::Decrease);
    assert_eq!(adjustment.quantity, 3);
    assert_eq!(adjustment.previous_stock, 42);
    assert_eq!(adjustment.new_stock, 39);
    assert_eq!(adjustment.product_name, "Espresso Beans 1kg");
    assert_eq!(adjustment.product_sku, "ESP-1KG");
    assert_eq!(adjustment.reason, AdjustmentReason::Damage);
    assert_eq!(adjustment.notes.as_deref(), Some("bag split"));
    assert_eq!(adjustment.adjusted_by, cashier());
    assert!(adjustment.id.starts_with("adj-"));
    assert_eq!(outcome.product.stock, 39);
    assert!(!outcome.became_low_stock);

    assert_eq!(ledger.all().unwrap(), vec![adjustment.clone()]);
}

#[rstest]
#[case::increase("increase")]
#[case::decrease("decrease")]
#[case::set("set")]
#[tokio::test]
async fn non_positive_quantity_is_rejected_for_every_kind(
    #[case] kind: &str,
    #[values(0, -1, -250)] quantity: i64,
) {
    let (engine, ledger) = engine();
    let request = AdjustmentRequest::new(kind, quantity, AdjustmentReason::Correction);

    let err = engine
        .adjust_stock(&request, &product("prd_1", 10), &cashier())
        .await
        .unwrap_err();

    assert!(matches!(err, InventoryError::InvalidAdjustmentRequest(_)));
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn unknown_kind_is_rejected_without_a_record() {
    let (engine, ledger) = engine();
    let request = AdjustmentRequest::new("transfer", 2, AdjustmentReason::Other);

    let err = engine
        .adjust_stock(&request, &product("prd_1", 10), &cashier())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("unknown adjustment kind"));
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn decrease_past_zero_clamps_and_is_still_recorded() {
    let (engine, ledger) = engine();
    let request = AdjustmentRequest::new("decrease", 500, AdjustmentReason::Theft);

    let outcome = engine
        .adjust_stock(&request, &product("prd_1", 8), &cashier())
        .await
        .unwrap();

    assert_eq!(outcome.adjustment.previous_stock, 8);
    assert_eq!(outcome.adjustment.new_stock, 0);
    assert!(outcome.became_low_stock);
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn blank_notes_are_dropped() {
    let (engine, _) = engine();
    let request = AdjustmentRequest::new("increase", 1, AdjustmentReason::Restock).with_notes("  ");
    let outcome = engine
        .adjust_stock(&request, &product("prd_1", 0), &cashier())
        .await
        .unwrap();
    assert!(outcome.adjustment.notes.is_none());
}

// ---------------------------------------------------------------------------
// adjustment_history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_is_per_product_and_newest_first() {
    let (engine, _) = engine();
    let actor = cashier();
    let tea = product("prd_tea", 10);
    let milk = product("prd_milk", 4);

    let first = engine
        .adjust_stock(
            &AdjustmentRequest::new("increase", 5, AdjustmentReason::Restock),
            &tea,
            &actor,
        )
        .await
        .unwrap();
    engine
        .adjust_stock(
            &AdjustmentRequest::new("set", 12, AdjustmentReason::Correction),
            &milk,
            &actor,
        )
        .await
        .unwrap();
    let third = engine
        .adjust_stock(
            &AdjustmentRequest::new("decrease", 2, AdjustmentReason::Sale),
            &first.product,
            &actor,
        )
        .await
        .unwrap();

    let history = engine.adjustment_history("prd_tea").unwrap();
    assert_eq!(history, vec![third.adjustment.clone(), first.adjustment.clone()]);
    assert_eq!(history[0].previous_stock, 15);
    assert_eq!(history[0].new_stock, 13);

    assert_eq!(engine.adjustment_history("prd_milk").unwrap().len(), 1);
    assert!(engine.adjustment_history("prd_none").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// apply (catalog-backed)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn apply_writes_stock_back_to_catalog() {
    let (engine, _) = engine();
    let catalog = MemoryCatalog::new([product("prd_1", 10)]);

    let outcome = engine
        .apply(
            &catalog,
            "prd_1",
            &AdjustmentRequest::new("set", 3, AdjustmentReason::Correction),
            &cashier(),
        )
        .await
        .unwrap();

    assert!(outcome.became_low_stock);
    assert_eq!(catalog.get("prd_1").unwrap().stock, 3);
    assert_eq!(engine.adjustment_history("prd_1").unwrap().len(), 1);
}

#[tokio::test]
async fn apply_unknown_product() {
    let (engine, ledger) = engine();
    let catalog = MemoryCatalog::default();

    let err = engine
        .apply(
            &catalog,
            "prd_x",
            &AdjustmentRequest::new("increase", 1, AdjustmentReason::Restock),
            &cashier(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, InventoryError::ProductNotFound(_)));
    assert!(ledger.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_applies_do_not_lose_updates() {
    let ledger = Arc::new(MemoryLedger::new());
    let engine = Arc::new(StockEngine::new(ledger.clone()));
    let catalog = Arc::new(MemoryCatalog::new([product("prd_1", 0)]));

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let catalog = Arc::clone(&catalog);
            tokio::spawn(async move {
                engine
                    .apply(
                        catalog.as_ref(),
                        "prd_1",
                        &AdjustmentRequest::new("increase", 1, AdjustmentReason::Restock),
                        &cashier(),
                    )
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(catalog.get("prd_1").unwrap().stock, 20);
    let history = engine.adjustment_history("prd_1").unwrap();
    assert_eq!(history.len(), 20);
    // Each record starts where the previous one ended.
    for pair in history.windows(2) {
        assert_eq!(pair[0].previous_stock, pair[1].new_stock);
    }
}

#[tokio::test]
async fn adjust_stock_computes_from_the_given_snapshot() {
    let (engine, ledger) = engine();
    let snapshot = product("prd_1", 10);
    let request = AdjustmentRequest::new("decrease", 3, AdjustmentReason::Sale);

    let (actor_a, actor_b) = (cashier(), cashier());
    let (first, second) = tokio::join!(
        engine.adjust_stock(&request, &snapshot, &actor_a),
        engine.adjust_stock(&request, &snapshot, &actor_b),
    );

    for outcome in [first.unwrap(), second.unwrap()] {
        assert_eq!(outcome.adjustment.previous_stock, 10);
        assert_eq!(outcome.adjustment.new_stock, 7);
    }
    assert_eq!(ledger.len(), 2);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn jsonl_history_survives_reopen() {
    let tmp = tempfile::TempDir::new().expect("tmp dir");
    let path = tmp.path().join("adjustments.jsonl");

    {
        let engine = StockEngine::new(Arc::new(JsonlLedger::new(&path).unwrap()));
        let outcome = engine
            .adjust_stock(
                &AdjustmentRequest::new("increase", 4, AdjustmentReason::Return),
                &product("prd_1", 1),
                &cashier(),
            )
            .await
            .unwrap();
        engine
            .adjust_stock(
                &AdjustmentRequest::new("decrease", 2, AdjustmentReason::Expired),
                &outcome.product,
                &cashier(),
            )
            .await
            .unwrap();
    }

    let engine = StockEngine::new(Arc::new(JsonlLedger::new(&path).unwrap()));
    let history = engine.adjustment_history("prd_1").unwrap();
    let kinds: Vec<AdjustmentKind> = history.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AdjustmentKind::Decrease, AdjustmentKind::Increase]);
    assert_eq!(history[0].new_stock, 3);
}

#[tokio::test]
async fn open_local_uses_configured_paths() {
    let tmp = tempfile::TempDir::new().expect("tmp dir");
    let config = InventoryConfig {
        ledger_path: tmp
            .path()
            .join("data")
            .join("adjustments.jsonl")
            .display()
            .to_string(),
        catalog_path: tmp.path().join("products.json").display().to_string(),
    };
    std::fs::write(
        config.catalog_path(),
        serde_json::to_string(&[product("prd_1", 9)]).unwrap(),
    )
    .expect("seed catalog");

    let (engine, catalog) = till_inventory::open_local(&config).unwrap();
    engine
        .apply(
            &catalog,
            "prd_1",
            &AdjustmentRequest::new("decrease", 1, AdjustmentReason::Sale),
            &cashier(),
        )
        .await
        .unwrap();

    assert_eq!(catalog.get("prd_1").unwrap().stock, 8);
    assert!(config.ledger_path().exists());
}
