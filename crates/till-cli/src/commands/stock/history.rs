use till_inventory::StockEngine;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::StockHistoryArgs;
use crate::output::output;

pub fn handle(
    args: &StockHistoryArgs,
    engine: &StockEngine,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut history = engine.adjustment_history(&args.product)?;
    if let Some(limit) = args.limit {
        history.truncate(limit);
    }
    output(&history, flags.format)
}
