//! Uniform error envelope returned to callers for failed API calls.
//!
//! Whatever shape the backend (or the transport) produced, callers see
//! `{statusCode, message, errorMessages: [{path, message}]}`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Message used when the server supplied nothing better.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong!";

/// Status code used when the server supplied none.
pub const DEFAULT_STATUS_CODE: u16 = 500;

/// One field-level error.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ErrorMessage {
    #[serde(default)]
    pub path: String,
    pub message: String,
}

/// Normalized error shape.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub message: String,
    pub error_messages: Vec<ErrorMessage>,
}

impl ErrorEnvelope {
    /// Envelope with a single error entry carrying `message`.
    #[must_use]
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status_code,
            error_messages: vec![ErrorMessage {
                path: String::new(),
                message: message.clone(),
            }],
            message,
        }
    }

    /// The all-defaults envelope: 500, generic message, one generic entry.
    #[must_use]
    pub fn generic() -> Self {
        Self::new(DEFAULT_STATUS_CODE, GENERIC_ERROR_MESSAGE)
    }

    /// Normalize a raw response body.
    ///
    /// Reads `statusCode`, `message`, and `errorMessages` when present and
    /// well-formed; each missing piece falls back to its default. A body that
    /// is not JSON yields [`ErrorEnvelope::generic`].
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
            return Self::generic();
        };

        let status_code = value
            .get("statusCode")
            .and_then(serde_json::Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(DEFAULT_STATUS_CODE);

        let message = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(GENERIC_ERROR_MESSAGE)
            .to_string();

        let error_messages = value
            .get("errorMessages")
            .cloned()
            .and_then(|v| serde_json::from_value::<Vec<ErrorMessage>>(v).ok())
            .filter(|entries| !entries.is_empty());

        match error_messages {
            Some(error_messages) => Self {
                status_code,
                message,
                error_messages,
            },
            None => Self::new(status_code, message),
        }
    }
}

impl std::fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status_code)
    }
}
