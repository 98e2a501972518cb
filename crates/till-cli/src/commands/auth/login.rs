use serde::Serialize;
use till_auth::{ApiClient, LoginRequest};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthLoginArgs;
use crate::output::output;

#[derive(Serialize)]
struct AuthLoginResponse {
    authenticated: bool,
    email: String,
    state: String,
}

pub async fn handle(
    args: &AuthLoginArgs,
    client: &ApiClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let password = match &args.password {
        Some(password) => password.clone(),
        None => std::env::var("TILL_PASSWORD")
            .map_err(|_| anyhow::anyhow!("pass --password or set TILL_PASSWORD"))?,
    };

    client
        .login(&LoginRequest {
            email: args.email.clone(),
            password,
        })
        .await?;

    output(
        &AuthLoginResponse {
            authenticated: true,
            email: args.email.clone(),
            state: client.session().state().to_string(),
        },
        flags.format,
    )
}
