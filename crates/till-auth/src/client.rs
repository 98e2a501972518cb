//! Authenticated API client.
//!
//! Every outbound call attaches the current access token. A `401` on a call
//! that has not been retried triggers one token refresh (shared with any
//! concurrent caller) and exactly one resend. Non-2xx responses come back as
//! a normalized [`ErrorEnvelope`].

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use till_config::ApiConfig;
use till_core::envelope::ErrorEnvelope;

use crate::error::{ApiError, AuthError};
use crate::refresh::parse_token_pair;
use crate::session::SessionManager;

/// Per-request flags.
///
/// Never mutated in place; a resend gets a new context via
/// [`ApiRequest::into_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Set on the single resend after a refresh.
    pub retried: bool,
    /// Whether to attach the access token and refresh on `401`.
    pub authenticated: bool,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            retried: false,
            authenticated: true,
        }
    }
}

/// An outbound call before dispatch.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub context: RequestContext,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            context: RequestContext::default(),
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Send without a token and never refresh on `401`.
    #[must_use]
    pub const fn anonymous(mut self) -> Self {
        self.context.authenticated = false;
        self
    }

    /// The same request, marked as the one allowed resend.
    #[must_use]
    pub fn into_retry(self) -> Self {
        Self {
            context: RequestContext {
                retried: true,
                ..self.context
            },
            ..self
        }
    }
}

/// A received response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Credentials for `POST {login_path}`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// HTTP client bound to a [`SessionManager`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    session: SessionManager,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError::Client` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, session: SessionManager) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("till/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self {
            http,
            config: config.clone(),
            session,
        })
    }

    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Send a request through the session interceptor.
    ///
    /// # Errors
    ///
    /// - `ApiError::Timeout` when the call exceeds the configured timeout.
    /// - `ApiError::Session` when a `401` could not be recovered by refresh;
    ///   the session has been logged out.
    /// - `ApiError::Server` for any other non-2xx response or transport failure.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let sent_token = if request.context.authenticated {
            self.session.access_token()
        } else {
            None
        };

        let response = self.dispatch(&request, sent_token.as_deref()).await?;

        if response.status != 401 || request.context.retried || !request.context.authenticated {
            return finish(response);
        }

        tracing::debug!(method = %request.method, path = %request.path, "401; renewing session");
        let fresh = self.session.renew_rejected(sent_token.as_deref()).await?;
        let retry = request.into_retry();
        let response = self.dispatch(&retry, Some(&fresh)).await?;
        finish(response)
    }

    /// `GET` and decode.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`]; also `ApiError::Decode` for an unexpected body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    /// `POST` a JSON body and decode.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`]; also `ApiError::Decode` for an unexpected body.
    pub async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::post(path).json(encode(body)?);
        self.send(request).await?.json()
    }

    /// `PATCH` a JSON body and decode.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`]; also `ApiError::Decode` for an unexpected body.
    pub async fn patch<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::patch(path).json(encode(body)?);
        self.send(request).await?.json()
    }

    /// `DELETE`, ignoring the body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }

    /// Exchange credentials for a token pair and store it.
    ///
    /// Sent anonymously: a `401` here means bad credentials, not an expired
    /// session, and never triggers a refresh.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` for a rejected login and `ApiError::Session`
    /// if the response has no usable tokens or they cannot be stored.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<(), ApiError> {
        let request = ApiRequest::post(self.config.login_path.clone())
            .json(encode(credentials)?)
            .anonymous();
        let response = self.send(request).await?;
        let pair = parse_token_pair(&response.body)
            .map_err(|e| AuthError::LoginFailed(e.to_string()))?;
        self.session
            .set_tokens(&pair.access_token, pair.refresh_token.as_deref())?;
        tracing::info!(email = %credentials.email, "logged in");
        Ok(())
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.config.url(&request.path));
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, self.authorization(token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status,
            retried = request.context.retried,
            "api call"
        );
        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }

    fn authorization(&self, token: &str) -> String {
        let scheme = self.config.auth_scheme.trim();
        if scheme.is_empty() {
            token.to_string()
        } else {
            format!("{scheme} {token}")
        }
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(format!("encode request: {e}")))
}

fn finish(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Server(ErrorEnvelope::from_body(&response.body)))
    }
}
