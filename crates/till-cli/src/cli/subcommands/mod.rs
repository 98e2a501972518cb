mod auth;
mod product;
mod stock;

pub use auth::{AuthCommands, AuthLoginArgs, AuthSetTokensArgs};
pub use product::ProductCommands;
pub use stock::{StockAdjustArgs, StockCommands, StockHistoryArgs};
