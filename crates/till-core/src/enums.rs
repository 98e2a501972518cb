//! Adjustment kinds, reason codes, and session states for Till.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Parsing from user input goes through `FromStr`, which rejects unknown
//! variants with `CoreError::Validation`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// AdjustmentKind
// ---------------------------------------------------------------------------

/// Policy used to compute new stock from a requested quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// `stock + quantity`
    Increase,
    /// `max(0, stock - quantity)`
    Decrease,
    /// `quantity`
    Set,
}

impl AdjustmentKind {
    pub const ALL: [Self; 3] = [Self::Increase, Self::Decrease, Self::Set];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Set => "set",
        }
    }
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown adjustment kind '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// AdjustmentReason
// ---------------------------------------------------------------------------

/// Reason code recorded with every stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    Restock,
    Sale,
    Damage,
    Theft,
    Return,
    Correction,
    Expired,
    Other,
}

impl AdjustmentReason {
    pub const ALL: [Self; 8] = [
        Self::Restock,
        Self::Sale,
        Self::Damage,
        Self::Theft,
        Self::Return,
        Self::Correction,
        Self::Expired,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Restock => "restock",
            Self::Sale => "sale",
            Self::Damage => "damage",
            Self::Theft => "theft",
            Self::Return => "return",
            Self::Correction => "correction",
            Self::Expired => "expired",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AdjustmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentReason {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown adjustment reason '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Lifecycle of the credential pair backing authenticated calls.
///
/// ```text
/// anonymous → authenticated → refreshing → authenticated
///                           ↓            → anonymous (refresh failed)
///                           → anonymous (logout)
/// ```
///
/// `authenticated → authenticated` covers a fresh login over a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Refreshing,
}

impl SessionState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Anonymous => &[Self::Authenticated],
            Self::Authenticated => &[Self::Authenticated, Self::Refreshing, Self::Anonymous],
            Self::Refreshing => &[Self::Authenticated, Self::Anonymous],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Authenticated => "authenticated",
            Self::Refreshing => "refreshing",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
