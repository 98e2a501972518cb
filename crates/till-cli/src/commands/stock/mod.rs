mod adjust;
mod history;

use till_config::TillConfig;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::StockCommands;

/// Handle `till stock <subcommand>`.
pub async fn handle(
    action: &StockCommands,
    config: &TillConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let (engine, catalog) = till_inventory::open_local(&config.inventory)?;
    match action {
        StockCommands::Adjust(args) => adjust::handle(args, &engine, &catalog, flags).await,
        StockCommands::History(args) => history::handle(args, &engine, flags),
    }
}
