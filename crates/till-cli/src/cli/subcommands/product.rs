use clap::Subcommand;

/// Product catalog commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProductCommands {
    /// List products with their stock levels.
    List,
}
