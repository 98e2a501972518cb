use chrono::{DateTime, Utc};
use serde::Serialize;
use till_auth::SessionManager;
use till_auth::refresh::decode_expiry;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthSetTokensArgs;
use crate::output::output;

#[derive(Serialize)]
struct SetTokensResponse {
    stored: bool,
    refresh_token_replaced: bool,
}

#[derive(Serialize)]
struct RefreshResponse {
    refreshed: bool,
    access_token_expires_at: Option<DateTime<Utc>>,
}

pub fn set(
    args: &AuthSetTokensArgs,
    session: &SessionManager,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    session.set_tokens(&args.access, args.refresh.as_deref())?;
    output(
        &SetTokensResponse {
            stored: true,
            refresh_token_replaced: args.refresh.is_some(),
        },
        flags.format,
    )
}

pub async fn refresh(session: &SessionManager, flags: &GlobalFlags) -> anyhow::Result<()> {
    let access = session.refresh_access_token().await?;
    output(
        &RefreshResponse {
            refreshed: true,
            access_token_expires_at: decode_expiry(&access).ok(),
        },
        flags.format,
    )
}
