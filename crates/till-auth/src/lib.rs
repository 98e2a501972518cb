//! # till-auth
//!
//! Session tokens and the authenticated API client for Till.
//!
//! [`SessionManager`] owns the access/refresh pair and performs single-flight
//! refresh. [`ApiClient`] attaches the access token to every call, recovers
//! one `401` per request by refreshing, and normalizes failures into an
//! [`ErrorEnvelope`](till_core::envelope::ErrorEnvelope).

pub mod client;
pub mod error;
pub mod refresh;
pub mod session;
pub mod token_store;

use std::sync::Arc;

use till_config::{ApiConfig, SessionConfig};

pub use client::{ApiClient, ApiRequest, ApiResponse, LoginRequest, RequestContext};
pub use error::{ApiError, AuthError};
pub use session::{SessionManager, SessionScoped, SessionStatus, TokenPolicy};
pub use token_store::{FileSessionStore, MemorySessionStore, SessionStore};

/// Session manager backed by the credentials file and the HTTP refresh
/// endpoint from config.
///
/// # Errors
///
/// Returns `AuthError::TokenStoreError` if no credentials path can be
/// resolved, `AuthError::RefreshFailed` if the refresh HTTP client cannot be
/// built.
pub fn session_from_config(
    api: &ApiConfig,
    session: &SessionConfig,
) -> Result<SessionManager, AuthError> {
    let path = session.resolved_credentials_path().ok_or_else(|| {
        AuthError::TokenStoreError(
            "no home directory; set session.credentials_path".into(),
        )
    })?;
    let store = FileSessionStore::new(path);
    let refresher = refresh::HttpRefresher::new(api)?;
    Ok(
        SessionManager::builder(Arc::new(store), Arc::new(refresher))
            .policy(TokenPolicy::from(session))
            .build(),
    )
}
