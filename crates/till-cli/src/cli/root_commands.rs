use clap::Subcommand;

use crate::cli::subcommands::{AuthCommands, ProductCommands, StockCommands};

/// Top-level commands.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Session tokens: login, refresh, status, logout.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Stock adjustments and their history.
    Stock {
        #[command(subcommand)]
        action: StockCommands,
    },
    /// Local product catalog.
    Product {
        #[command(subcommand)]
        action: ProductCommands,
    },
}
