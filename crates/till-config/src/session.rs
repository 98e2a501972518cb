//! Token persistence configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const CREDENTIALS_FILE_NAME: &str = "credentials.json";

const fn default_access_ttl_hours() -> u64 {
    24
}

const fn default_refresh_ttl_days() -> u64 {
    7
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// How long a stored access token is kept, in hours.
    #[serde(default = "default_access_ttl_hours")]
    pub access_ttl_hours: u64,

    /// How long a stored refresh token is kept, in days.
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: u64,

    /// Credentials file. Empty means `~/.till/credentials.json`.
    #[serde(default)]
    pub credentials_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_ttl_hours: default_access_ttl_hours(),
            refresh_ttl_days: default_refresh_ttl_days(),
            credentials_path: String::new(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub const fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_hours * 60 * 60)
    }

    #[must_use]
    pub const fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_days * 24 * 60 * 60)
    }

    /// Resolve the credentials file, falling back to the home directory.
    ///
    /// Returns `None` only when no path is configured and no home directory exists.
    #[must_use]
    pub fn resolved_credentials_path(&self) -> Option<PathBuf> {
        if !self.credentials_path.trim().is_empty() {
            return Some(PathBuf::from(&self.credentials_path));
        }
        dirs::home_dir().map(|home| home.join(".till").join(CREDENTIALS_FILE_NAME))
    }
}
