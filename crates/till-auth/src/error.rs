use thiserror::Error;
use till_core::envelope::ErrorEnvelope;

/// Session-level failures.
///
/// `Clone` so a single in-flight refresh can hand the same outcome to every
/// waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("session expired: token refresh failed ({0})")]
    RefreshFailed(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token store error: {0}")]
    TokenStoreError(String),

    #[error("login failed: {0}")]
    LoginFailed(String),
}

impl AuthError {
    /// Whether the session is over and the user has to log in again.
    #[must_use]
    pub const fn is_session_terminal(&self) -> bool {
        matches!(self, Self::MissingRefreshToken | Self::RefreshFailed(_))
    }
}

/// Failures of an intercepted API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The call exceeded the configured per-request timeout.
    #[error("request timed out")]
    Timeout,

    /// Non-2xx response or transport failure, normalized.
    #[error("{0}")]
    Server(ErrorEnvelope),

    /// The session could not be renewed; tokens have been cleared.
    #[error(transparent)]
    Session(#[from] AuthError),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl ApiError {
    /// Map a transport-level `reqwest` failure.
    ///
    /// Timeouts stay distinct; everything else becomes the generic envelope.
    pub(crate) fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout;
        }
        tracing::warn!(%error, "request failed before a response was received");
        Self::Server(ErrorEnvelope::generic())
    }

    /// The normalized envelope, when this is a server/network error.
    #[must_use]
    pub const fn envelope(&self) -> Option<&ErrorEnvelope> {
        match self {
            Self::Server(envelope) => Some(envelope),
            _ => None,
        }
    }
}
