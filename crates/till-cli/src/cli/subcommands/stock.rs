use clap::{Args, Subcommand};
use till_core::enums::AdjustmentReason;

/// Stock commands.
#[derive(Clone, Debug, Subcommand)]
pub enum StockCommands {
    /// Adjust a product's stock and record the change.
    Adjust(StockAdjustArgs),
    /// List recorded adjustments for a product, newest first.
    History(StockHistoryArgs),
}

#[derive(Clone, Debug, Args)]
pub struct StockAdjustArgs {
    /// Product ID.
    #[arg(long)]
    pub product: String,
    /// Adjustment kind: increase, decrease, set
    #[arg(long)]
    pub kind: String,
    /// Quantity (must be greater than 0).
    #[arg(long, allow_negative_numbers = true)]
    pub quantity: i64,
    /// Reason code: restock, sale, damage, theft, return, correction, expired, other
    #[arg(long)]
    pub reason: AdjustmentReason,
    /// Free-text notes.
    #[arg(long)]
    pub notes: Option<String>,
    /// User ID of the staff member making the change.
    #[arg(long)]
    pub actor: String,
    /// Display name of the staff member.
    #[arg(long)]
    pub actor_name: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct StockHistoryArgs {
    /// Product ID.
    #[arg(long)]
    pub product: String,
    /// Max records to show.
    #[arg(short, long)]
    pub limit: Option<usize>,
}
