//! Entity structs for Till domain objects.
//!
//! Field names serialize as `camelCase` to match the REST backend's JSON.
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema`.

mod adjustment;
mod product;

pub use adjustment::StockAdjustment;
pub use product::Product;
