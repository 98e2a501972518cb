use serde::Serialize;
use till_config::TillConfig;
use till_core::entities::Product;
use till_inventory::{JsonCatalog, ProductCatalog};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProductCommands;
use crate::output::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductRow {
    #[serde(flatten)]
    product: Product,
    low_stock: bool,
}

/// Handle `till product <subcommand>`.
pub fn handle(
    action: &ProductCommands,
    config: &TillConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProductCommands::List => {
            let catalog = JsonCatalog::new(config.inventory.catalog_path());
            let rows = catalog
                .list()?
                .into_iter()
                .map(|product| ProductRow {
                    low_stock: product.is_low_stock(),
                    product,
                })
                .collect::<Vec<_>>();
            output(&rows, flags.format)
        }
    }
}
