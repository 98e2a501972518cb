use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The staff member performing an action.
///
/// Passed explicitly into every mutating operation and captured verbatim in
/// audit records. Never inferred from ambient session state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Backend user ID.
    pub user_id: String,
    /// Human-readable name shown in the adjustment history.
    pub display_name: Option<String>,
    /// Staff role (e.g. `"admin"`, `"manager"`, `"cashier"`).
    pub role: Option<String>,
}

impl Actor {
    /// Actor with only a user ID.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            role: None,
        }
    }

    /// Name to display: the display name when known, otherwise the user ID.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_id)
    }
}
