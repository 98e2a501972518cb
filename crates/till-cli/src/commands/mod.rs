mod auth;
mod product;
mod stock;

use till_auth::{ApiError, AuthError};
use till_config::TillConfig;

use crate::cli::{Commands, GlobalFlags};

/// Route a parsed command to its handler.
pub async fn dispatch(
    command: Commands,
    config: &TillConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Auth { action } => auth::handle(&action, config, flags).await,
        Commands::Stock { action } => stock::handle(&action, config, flags).await,
        Commands::Product { action } => product::handle(&action, config, flags),
    }
}

/// Follow-up advice for errors the user can act on.
pub fn error_hint(error: &anyhow::Error) -> Option<String> {
    for cause in error.chain() {
        if let Some(api) = cause.downcast_ref::<ApiError>() {
            return match api {
                ApiError::Session(auth) => session_hint(auth),
                ApiError::Timeout => {
                    Some("the backend did not answer in time; see api.timeout_secs".into())
                }
                ApiError::Server(envelope) if !envelope.error_messages.is_empty() => Some(
                    envelope
                        .error_messages
                        .iter()
                        .map(|m| {
                            if m.path.is_empty() {
                                m.message.clone()
                            } else {
                                format!("{}: {}", m.path, m.message)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("; "),
                ),
                _ => None,
            };
        }
        if let Some(auth) = cause.downcast_ref::<AuthError>() {
            return session_hint(auth);
        }
    }
    None
}

fn session_hint(error: &AuthError) -> Option<String> {
    error
        .is_session_terminal()
        .then(|| "the session has ended; run `till auth login`".to_string())
}
