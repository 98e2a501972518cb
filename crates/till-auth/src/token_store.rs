use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// A persisted token together with the moment the store stops returning it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The access/refresh pair as held by a [`SessionStore`].
///
/// Each token carries its own expiry; either may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub access: Option<StoredToken>,
    pub refresh: Option<StoredToken>,
}

impl Credentials {
    /// Drop entries whose expiry has passed.
    #[must_use]
    pub fn without_expired(self, now: DateTime<Utc>) -> Self {
        Self {
            access: self.access.filter(|t| !t.is_expired(now)),
            refresh: self.refresh.filter(|t| !t.is_expired(now)),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// Persistence for the credential pair.
///
/// Only `SessionManager` writes through this trait. `load` never returns
/// expired entries.
pub trait SessionStore: Send + Sync {
    /// Read the live (non-expired) credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the backing storage cannot be read.
    fn load(&self) -> Result<Credentials, AuthError>;

    /// Replace the stored credentials in one write.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the backing storage cannot be written.
    fn save(&self, credentials: &Credentials) -> Result<(), AuthError>;

    /// Remove both tokens. Succeeds when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if existing storage cannot be removed.
    fn clear(&self) -> Result<(), AuthError>;
}

// --- In-memory store ---

/// Process-local store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    credentials: RwLock<Credentials>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Credentials, AuthError> {
        let guard = self
            .credentials
            .read()
            .map_err(|_| AuthError::TokenStoreError("credential lock poisoned".into()))?;
        Ok(guard.clone().without_expired(Utc::now()))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let mut guard = self
            .credentials
            .write()
            .map_err(|_| AuthError::TokenStoreError("credential lock poisoned".into()))?;
        guard.clone_from(credentials);
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        self.save(&Credentials::default())
    }
}

// --- File store ---

/// JSON credentials file, `0600` on unix inside a `0700` directory.
///
/// An unreadable or corrupt file is treated as "no session" with a warning.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Credentials, AuthError> {
        if !self.path.exists() {
            return Ok(Credentials::default());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            AuthError::TokenStoreError(format!("read {}: {e}", self.path.display()))
        })?;
        if raw.trim().is_empty() {
            return Ok(Credentials::default());
        }
        match serde_json::from_str::<Credentials>(&raw) {
            Ok(credentials) => Ok(credentials.without_expired(Utc::now())),
            Err(error) => {
                tracing::warn!(%error, path = %self.path.display(), "ignoring corrupt credentials file");
                Ok(Credentials::default())
            }
        }
    }

    fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::TokenStoreError(format!("mkdir {}: {e}", parent.display()))
            })?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                    tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
                }
            }
        }

        let json = serde_json::to_string_pretty(credentials)
            .map_err(|e| AuthError::TokenStoreError(format!("serialize credentials: {e}")))?;
        fs::write(&self.path, json).map_err(|e| {
            AuthError::TokenStoreError(format!("write {}: {e}", self.path.display()))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                AuthError::TokenStoreError(format!("chmod {}: {e}", self.path.display()))
            })?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                AuthError::TokenStoreError(format!("failed to delete {}: {e}", self.path.display()))
            })?;
        }
        Ok(())
    }
}
