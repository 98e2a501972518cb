use serde::Serialize;
use till_auth::SessionManager;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct AuthLogoutResponse {
    cleared: bool,
}

pub fn handle(session: &SessionManager, flags: &GlobalFlags) -> anyhow::Result<()> {
    session.logout()?;
    output(&AuthLogoutResponse { cleared: true }, flags.format)
}
