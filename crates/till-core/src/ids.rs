//! Prefixed ID generation.
//!
//! IDs look like `adj-1760860800123-a3f8b2c1`: a type prefix, the creation
//! time in Unix milliseconds, and 4 random bytes as hex. The timestamp keeps
//! IDs roughly time-ordered; the suffix keeps IDs minted in the same
//! millisecond distinct.

use chrono::Utc;

use crate::errors::CoreError;

/// Prefix for stock adjustment records.
pub const PREFIX_ADJUSTMENT: &str = "adj";

/// Generate a new prefixed ID.
///
/// # Errors
///
/// Returns `CoreError::Other` if the OS random source is unavailable.
pub fn generate_id(prefix: &str) -> Result<String, CoreError> {
    let mut suffix = [0u8; 4];
    getrandom::fill(&mut suffix)
        .map_err(|e| anyhow::anyhow!("failed to generate ID suffix: {e}"))?;
    let hex: String = suffix.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("{prefix}-{}-{hex}", Utc::now().timestamp_millis()))
}
