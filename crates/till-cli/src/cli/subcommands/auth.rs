use clap::{Args, Subcommand};

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Log in with email and password.
    Login(AuthLoginArgs),
    /// Store an access token (and optionally a refresh token) directly.
    SetTokens(AuthSetTokensArgs),
    /// Exchange the stored refresh token for a new pair.
    Refresh,
    /// Show current session status.
    Status,
    /// Clear stored credentials.
    Logout,
}

#[derive(Clone, Debug, Args)]
pub struct AuthLoginArgs {
    /// Account email.
    #[arg(long)]
    pub email: String,
    /// Account password. Falls back to `TILL_PASSWORD`.
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuthSetTokensArgs {
    /// Access token.
    #[arg(long)]
    pub access: String,
    /// Refresh token. The stored one is kept when omitted.
    #[arg(long)]
    pub refresh: Option<String>,
}
