use base64::Engine as _;
use futures::future::BoxFuture;
use reqwest::header::COOKIE;
use serde::Deserialize;
use till_config::ApiConfig;

use crate::error::AuthError;

/// Tokens issued by the backend at login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    /// Absent when the backend keeps the existing refresh token alive.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Backends answer either with the bare pair or wrapped in `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TokenPayload {
    Wrapped { data: TokenPair },
    Bare(TokenPair),
}

/// Parse a login/refresh response body into a [`TokenPair`].
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if the body has no usable `accessToken`.
pub fn parse_token_pair(body: &[u8]) -> Result<TokenPair, AuthError> {
    let payload: TokenPayload = serde_json::from_slice(body)
        .map_err(|e| AuthError::InvalidToken(format!("unexpected token response: {e}")))?;
    let pair = match payload {
        TokenPayload::Wrapped { data } => data,
        TokenPayload::Bare(pair) => pair,
    };
    if pair.access_token.is_empty() {
        return Err(AuthError::InvalidToken("empty accessToken in response".into()));
    }
    Ok(pair)
}

/// Exchanges a refresh token for a new pair.
///
/// The network seam of `SessionManager`; production uses [`HttpRefresher`].
pub trait TokenRefresher: Send + Sync {
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, Result<TokenPair, AuthError>>;
}

/// `POST {base_url}{refresh_path}` with the refresh token as a cookie.
///
/// Uses its own client so the refresh call never passes through the
/// 401 interception it serves.
#[derive(Debug, Clone)]
pub struct HttpRefresher {
    http: reqwest::Client,
    url: String,
    cookie_name: String,
}

impl HttpRefresher {
    /// # Errors
    ///
    /// Returns `AuthError::RefreshFailed` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("till/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| AuthError::RefreshFailed(format!("client setup: {e}")))?;
        Ok(Self {
            http,
            url: config.url(&config.refresh_path),
            cookie_name: config.refresh_cookie.clone(),
        })
    }

    async fn exchange(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let resp = self
            .http
            .post(&self.url)
            .header(
                COOKIE,
                format!(
                    "{}={}",
                    self.cookie_name,
                    urlencoding::encode(refresh_token)
                ),
            )
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("refresh request: {e}")))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("read refresh response: {e}")))?;

        if !status.is_success() {
            return Err(AuthError::RefreshFailed(format!("HTTP {status}")));
        }

        parse_token_pair(&body).map_err(|e| AuthError::RefreshFailed(e.to_string()))
    }
}

impl TokenRefresher for HttpRefresher {
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, Result<TokenPair, AuthError>> {
        Box::pin(self.exchange(refresh_token))
    }
}

/// Decode a JWT `exp` claim without verifying the signature.
///
/// Best-effort: the backend enforces expiry; this only feeds status output.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if the token is not a JWT or has no
/// parseable `exp` claim.
pub fn decode_expiry(jwt: &str) -> Result<chrono::DateTime<chrono::Utc>, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::InvalidToken("invalid JWT format".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AuthError::InvalidToken(format!("base64 decode failed: {e}")))?;
    let value: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|e| AuthError::InvalidToken(format!("JSON parse failed: {e}")))?;
    let exp = value["exp"]
        .as_i64()
        .ok_or_else(|| AuthError::InvalidToken("missing exp claim".into()))?;
    chrono::DateTime::from_timestamp(exp, 0)
        .ok_or_else(|| AuthError::InvalidToken("invalid exp timestamp".into()))
}
