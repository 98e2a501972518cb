//! REST backend configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_base_url() -> String {
    "http://localhost:5000/api/v1".to_string()
}

/// Upper bound on every outbound call.
const fn default_timeout_secs() -> u64 {
    60
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_refresh_path() -> String {
    "/auth/refresh-token".to_string()
}

fn default_refresh_cookie() -> String {
    "refreshToken".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Backend base URL, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Path of the credential exchange endpoint.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Path of the token refresh endpoint.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Cookie name the refresh token is sent under.
    #[serde(default = "default_refresh_cookie")]
    pub refresh_cookie: String,

    /// Optional scheme prepended to the access token in `Authorization`
    /// (e.g. `"Bearer"`). Empty sends the raw token.
    #[serde(default)]
    pub auth_scheme: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            refresh_cookie: default_refresh_cookie(),
            auth_scheme: String::new(),
        }
    }
}

impl ApiConfig {
    /// Check if a backend URL is set.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join `path` onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Reject values that would make every request fail.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a non-HTTP base URL or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".into(),
                reason: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
