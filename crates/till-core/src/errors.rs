//! Cross-cutting error types for Till.
//!
//! Domain-specific errors (`AuthError`, `InventoryError`) live in their
//! respective crates. The CLI converges everything through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any Till crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (format, constraints, unknown variants).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
