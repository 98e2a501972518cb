use serde::Serialize;
use till_core::entities::StockAdjustment;
use till_core::identity::Actor;
use till_inventory::{AdjustmentRequest, JsonCatalog, StockEngine};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::StockAdjustArgs;
use crate::output::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StockAdjustResponse {
    #[serde(flatten)]
    adjustment: StockAdjustment,
    low_stock: bool,
}

pub async fn handle(
    args: &StockAdjustArgs,
    engine: &StockEngine,
    catalog: &JsonCatalog,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let request = AdjustmentRequest {
        kind: args.kind.clone(),
        quantity: args.quantity,
        reason: args.reason,
        notes: args.notes.clone(),
    };
    let actor = Actor {
        user_id: args.actor.clone(),
        display_name: args.actor_name.clone(),
        role: None,
    };

    let outcome = engine.apply(catalog, &args.product, &request, &actor).await?;

    if outcome.became_low_stock && !flags.quiet {
        eprintln!(
            "note: {} is at {} (reorder level {})",
            outcome.product.sku, outcome.product.stock, outcome.product.reorder_level
        );
    }

    output(
        &StockAdjustResponse {
            low_stock: outcome.product.is_low_stock(),
            adjustment: outcome.adjustment,
        },
        flags.format,
    )
}
