use serde::Serialize;
use till_auth::{SessionManager, SessionStatus};
use till_config::TillConfig;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct AuthStatusResponse {
    #[serde(flatten)]
    session: SessionStatus,
    backend: String,
}

pub fn handle(
    session: &SessionManager,
    config: &TillConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    output(
        &AuthStatusResponse {
            session: session.status()?,
            backend: config.api.base_url.clone(),
        },
        flags.format,
    )
}
