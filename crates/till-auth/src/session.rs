//! Token lifecycle: persist, read, refresh once, log out.
//!
//! `SessionManager` is the only writer of the credential pair. Readers go
//! through [`SessionManager::access_token`] on every call instead of caching
//! the token, since a concurrent refresh may replace it at any await point.
//!
//! Refresh is single-flight: the first caller publishes a shared pending
//! refresh and every concurrent caller awaits that same result.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use futures::FutureExt as _;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use till_config::SessionConfig;
use till_core::enums::SessionState;
use tokio::sync::watch;

use crate::error::AuthError;
use crate::refresh::{TokenRefresher, decode_expiry};
use crate::token_store::{Credentials, SessionStore, StoredToken};

type PendingRefresh = Shared<BoxFuture<'static, Result<String, AuthError>>>;

#[derive(Clone, Copy)]
enum Trigger<'a> {
    Explicit,
    Rejected(Option<&'a str>),
}

/// How long the store keeps each token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub access_ttl: TimeDelta,
    pub refresh_ttl: TimeDelta,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            access_ttl: TimeDelta::days(1),
            refresh_ttl: TimeDelta::days(7),
        }
    }
}

impl From<&SessionConfig> for TokenPolicy {
    fn from(config: &SessionConfig) -> Self {
        let defaults = Self::default();
        Self {
            access_ttl: TimeDelta::from_std(config.access_ttl()).unwrap_or(defaults.access_ttl),
            refresh_ttl: TimeDelta::from_std(config.refresh_ttl()).unwrap_or(defaults.refresh_ttl),
        }
    }
}

/// State that lives only as long as the session, cleared on logout.
pub trait SessionScoped: Send + Sync {
    fn clear_session(&self);
}

/// Snapshot for `till auth status`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub has_access_token: bool,
    pub has_refresh_token: bool,
    pub access_stored_until: Option<DateTime<Utc>>,
    pub refresh_stored_until: Option<DateTime<Utc>>,
    /// `exp` claim of the access token, when it is a JWT.
    pub access_token_expires_at: Option<DateTime<Utc>>,
}

struct Inner {
    store: Arc<dyn SessionStore>,
    refresher: Arc<dyn TokenRefresher>,
    policy: TokenPolicy,
    state: watch::Sender<SessionState>,
    scoped: Vec<Arc<dyn SessionScoped>>,
    pending: Mutex<Option<PendingRefresh>>,
    /// Bumped by every logout. A refresh stores its result only if no
    /// logout happened while it was in flight.
    epoch: Mutex<u64>,
}

/// Owns the credential pair backing authenticated calls.
///
/// Cheap to clone; clones share the same store, state, and in-flight refresh.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.inner.state.borrow())
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SessionManager`].
pub struct SessionManagerBuilder {
    store: Arc<dyn SessionStore>,
    refresher: Arc<dyn TokenRefresher>,
    policy: TokenPolicy,
    scoped: Vec<Arc<dyn SessionScoped>>,
}

impl SessionManagerBuilder {
    #[must_use]
    pub const fn policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register session-scoped state to be cleared on logout.
    #[must_use]
    pub fn scoped(mut self, scoped: Arc<dyn SessionScoped>) -> Self {
        self.scoped.push(scoped);
        self
    }

    #[must_use]
    pub fn build(self) -> SessionManager {
        let initial = match self.store.load() {
            Ok(credentials) if credentials.access.is_some() || credentials.refresh.is_some() => {
                SessionState::Authenticated
            }
            Ok(_) => SessionState::Anonymous,
            Err(error) => {
                tracing::warn!(%error, "could not read stored credentials; starting anonymous");
                SessionState::Anonymous
            }
        };
        let (state, _) = watch::channel(initial);
        SessionManager {
            inner: Arc::new(Inner {
                store: self.store,
                refresher: self.refresher,
                policy: self.policy,
                state,
                scoped: self.scoped,
                pending: Mutex::new(None),
                epoch: Mutex::new(0),
            }),
        }
    }
}

impl SessionManager {
    #[must_use]
    pub fn builder(
        store: Arc<dyn SessionStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> SessionManagerBuilder {
        SessionManagerBuilder {
            store,
            refresher,
            policy: TokenPolicy::default(),
            scoped: Vec::new(),
        }
    }

    /// Persist a new access token and, when given, a new refresh token.
    ///
    /// Without `refresh`, any stored refresh token is kept.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for an empty token and
    /// `AuthError::TokenStoreError` if persisting fails.
    pub fn set_tokens(&self, access: &str, refresh: Option<&str>) -> Result<(), AuthError> {
        self.inner.persist(access, refresh)?;
        self.inner.transition(SessionState::Authenticated);
        tracing::info!(refresh_replaced = refresh.is_some(), "session tokens stored");
        Ok(())
    }

    /// The current access token, if one is stored and not expired.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        match self.inner.store.load() {
            Ok(credentials) => credentials.access.map(|t| t.value),
            Err(error) => {
                tracing::warn!(%error, "could not read access token");
                None
            }
        }
    }

    /// Remove both tokens and clear session-scoped state.
    ///
    /// Safe to call without a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if stored tokens cannot be removed.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.inner.logout()
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Concurrent callers share one in-flight exchange. Any failure logs the
    /// session out before the error is returned; the caller must treat it as
    /// "session over", never as retryable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingRefreshToken` when no refresh token is
    /// stored, `AuthError::RefreshFailed` for every other failure.
    pub async fn refresh_access_token(&self) -> Result<String, AuthError> {
        self.shared_refresh(Trigger::Explicit).await
    }

    /// Token to resend with after `rejected` was answered with `401`.
    ///
    /// If the stored token already differs from `rejected`, another caller
    /// has refreshed since and that token is returned without a new exchange.
    /// Otherwise behaves like [`SessionManager::refresh_access_token`].
    ///
    /// # Errors
    ///
    /// Same as [`SessionManager::refresh_access_token`].
    pub async fn renew_rejected(&self, rejected: Option<&str>) -> Result<String, AuthError> {
        self.shared_refresh(Trigger::Rejected(rejected)).await
    }

    async fn shared_refresh(&self, trigger: Trigger<'_>) -> Result<String, AuthError> {
        let pending = {
            let mut slot = self
                .inner
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(pending) = slot.as_ref() {
                tracing::debug!("joining in-flight token refresh");
                pending.clone()
            } else {
                // A finished refresh persists before it frees the slot, so an
                // empty slot means the store already holds its result.
                if let Trigger::Rejected(rejected) = trigger
                    && let Some(current) = self.access_token()
                    && rejected != Some(current.as_str())
                {
                    tracing::debug!("access token already replaced; reusing it");
                    return Ok(current);
                }
                let inner = Arc::clone(&self.inner);
                let pending = async move {
                    let outcome = inner.run_refresh().await;
                    inner
                        .pending
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .take();
                    outcome
                }
                .boxed()
                .shared();
                *slot = Some(pending.clone());
                pending
            }
        };
        pending.await
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    /// Watch lifecycle transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Describe the stored session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the store cannot be read.
    pub fn status(&self) -> Result<SessionStatus, AuthError> {
        let credentials = self.inner.store.load()?;
        Ok(SessionStatus {
            state: self.state(),
            has_access_token: credentials.access.is_some(),
            has_refresh_token: credentials.refresh.is_some(),
            access_stored_until: credentials.access.as_ref().map(|t| t.expires_at),
            refresh_stored_until: credentials.refresh.as_ref().map(|t| t.expires_at),
            access_token_expires_at: credentials
                .access
                .as_ref()
                .and_then(|t| decode_expiry(&t.value).ok()),
        })
    }
}

impl Inner {
    fn persist(&self, access: &str, refresh: Option<&str>) -> Result<(), AuthError> {
        if access.is_empty() {
            return Err(AuthError::InvalidToken("access token must not be empty".into()));
        }
        if refresh.is_some_and(str::is_empty) {
            return Err(AuthError::InvalidToken("refresh token must not be empty".into()));
        }

        let now = Utc::now();
        let current = self.store.load()?;
        let credentials = Credentials {
            access: Some(StoredToken {
                value: access.to_string(),
                expires_at: now + self.policy.access_ttl,
            }),
            refresh: match refresh {
                Some(value) => Some(StoredToken {
                    value: value.to_string(),
                    expires_at: now + self.policy.refresh_ttl,
                }),
                None => current.refresh,
            },
        };
        self.store.save(&credentials)
    }

    fn current_epoch(&self) -> u64 {
        *self.epoch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn logout(&self) -> Result<(), AuthError> {
        {
            let mut epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
            *epoch += 1;
            self.store.clear()?;
        }
        for scoped in &self.scoped {
            scoped.clear_session();
        }
        if self.transition(SessionState::Anonymous) {
            tracing::info!("logged out");
        }
        Ok(())
    }

    /// Log out after a failed refresh. A store error here is only logged:
    /// the refresh failure is what the caller needs to see.
    fn force_logout(&self, reason: &str) {
        tracing::warn!(reason, "session ended; forcing logout");
        if let Err(error) = self.logout() {
            tracing::warn!(%error, "forced logout could not clear stored tokens");
        }
    }

    async fn run_refresh(&self) -> Result<String, AuthError> {
        let started = self.current_epoch();
        let refresh = match self.store.load() {
            Ok(credentials) => credentials.refresh,
            Err(error) => {
                self.force_logout("credential store unreadable");
                return Err(AuthError::RefreshFailed(error.to_string()));
            }
        };
        let Some(refresh) = refresh else {
            self.force_logout("no refresh token");
            return Err(AuthError::MissingRefreshToken);
        };

        self.transition(SessionState::Refreshing);
        tracing::debug!("refreshing access token");

        let pair = match self.refresher.refresh(&refresh.value).await {
            Ok(pair) => pair,
            Err(error) => {
                self.force_logout("token refresh rejected");
                return Err(match error {
                    AuthError::RefreshFailed(reason) => AuthError::RefreshFailed(reason),
                    other => AuthError::RefreshFailed(other.to_string()),
                });
            }
        };

        let epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        if *epoch != started {
            drop(epoch);
            self.transition(SessionState::Anonymous);
            tracing::info!("logged out during refresh; discarding new tokens");
            return Err(AuthError::RefreshFailed("session ended during refresh".into()));
        }
        let stored = self.persist(&pair.access_token, pair.refresh_token.as_deref());
        drop(epoch);
        if let Err(error) = stored {
            self.force_logout("refreshed tokens could not be stored");
            return Err(AuthError::RefreshFailed(error.to_string()));
        }

        self.transition(SessionState::Authenticated);
        tracing::info!("access token refreshed");
        Ok(pair.access_token)
    }

    /// Move to `next`; returns whether the state changed.
    fn transition(&self, next: SessionState) -> bool {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            if !current.can_transition_to(next) {
                tracing::debug!(from = %current, to = %next, "unexpected session transition");
            }
            *current = next;
            true
        })
    }
}
