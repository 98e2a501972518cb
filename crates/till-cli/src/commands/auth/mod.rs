mod login;
mod logout;
mod status;
mod tokens;

use anyhow::Context;
use till_auth::{ApiClient, SessionManager};
use till_config::TillConfig;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;

/// Handle `till auth <subcommand>`.
pub async fn handle(
    action: &AuthCommands,
    config: &TillConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let session = open_session(config)?;
    tracing::debug!(backend = %config.api.base_url, state = %session.state(), "auth command");
    match action {
        AuthCommands::Login(args) => {
            let client = ApiClient::new(&config.api, session)?;
            login::handle(args, &client, flags).await
        }
        AuthCommands::SetTokens(args) => tokens::set(args, &session, flags),
        AuthCommands::Refresh => tokens::refresh(&session, flags).await,
        AuthCommands::Status => status::handle(&session, config, flags),
        AuthCommands::Logout => logout::handle(&session, flags),
    }
}

fn open_session(config: &TillConfig) -> anyhow::Result<SessionManager> {
    till_auth::session_from_config(&config.api, &config.session)
        .context("failed to open session store")
}
