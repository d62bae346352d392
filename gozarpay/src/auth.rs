//! Credential strategies for authenticating requests.
//!
//! An [`AuthStrategy`] owns its credential state and knows two things: how to
//! attach credentials to an outgoing request ([`AuthStrategy::attach`]) and
//! how to renew them after the upstream rejects a call
//! ([`AuthStrategy::renew_on_unauthorized`]). The request pipeline dispatches
//! through this trait and never branches on the concrete strategy.
//!
//! Three strategies are provided:
//!
//! - [`NoAuth`] — public endpoints, attaches nothing.
//! - [`TokenAuth`] — caller-supplied access/refresh token pair. Renewal is
//!   reactive only: an expired access token is sent as-is and replaced after
//!   the upstream answers 401.
//! - [`ApiKeyAuth`] — long-lived key/secret pair exchanged for tokens on
//!   first use, with a proactive refresh shortly before expiry.
//!
//! Credential state is guarded by a per-strategy [`tokio::sync::Mutex`] held
//! across the login/refresh round trip, so concurrent callers never race to
//! perform duplicate renewals.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::debug;

use crate::error::AuthenticationError;

/// Validity window granted to a freshly issued access token (50 minutes).
const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

/// How close to expiry the proactive refresh in [`ApiKeyAuth`] kicks in.
const EXPIRY_SKEW: Duration = Duration::from_secs(30);

/// Credential endpoint paths, relative to the configured base URL.
const API_LOGIN_PATH: &str = "/tp/v1/usr/api-login/";
const REFRESH_TOKEN_PATH: &str = "/tp/v1/usr/refresh-token/";

/// Strategy interface for attaching and renewing credentials.
///
/// Implementations must serialize their own renewal path: at most one
/// login/refresh round trip may be in flight per strategy instance.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Returns `headers` with credentials attached, if any.
    ///
    /// May perform a credential exchange as a side effect (e.g. the first
    /// login for [`ApiKeyAuth`]).
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError`] if a required credential exchange
    /// fails or yields a response missing token fields.
    async fn attach(
        &self,
        http: &reqwest::Client,
        headers: HeaderMap,
    ) -> Result<HeaderMap, AuthenticationError>;

    /// Attempts a single credential renewal after a 401 response.
    ///
    /// Returns `true` if the caller should retry the rejected request with
    /// freshly attached credentials. The default implementation never renews.
    async fn renew_on_unauthorized(&self, http: &reqwest::Client) -> bool {
        let _ = http;
        false
    }
}

/// Strategy for public endpoints: attaches nothing, never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

#[async_trait]
impl AuthStrategy for NoAuth {
    async fn attach(
        &self,
        _http: &reqwest::Client,
        headers: HeaderMap,
    ) -> Result<HeaderMap, AuthenticationError> {
        Ok(headers)
    }
}

/// Mutable token state held by [`TokenAuth`].
///
/// No expiry timestamp is tracked: the strategy never consults one, since
/// renewal is driven entirely by the 401 retry path.
#[derive(Debug)]
struct TokenState {
    access_token: String,
    refresh_token: Option<String>,
}

/// Strategy for a caller-supplied access/refresh token pair.
///
/// The access token is attached unconditionally; expiry is handled
/// reactively through the pipeline's 401 retry path rather than checked
/// before each request.
#[derive(Debug)]
pub struct TokenAuth {
    base_url: Url,
    state: Mutex<TokenState>,
}

impl TokenAuth {
    /// Creates a strategy from pre-acquired tokens.
    ///
    /// Without a refresh token the strategy can never renew, so a 401 is
    /// surfaced to the caller directly.
    #[must_use]
    pub fn new(base_url: Url, access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            base_url,
            state: Mutex::new(TokenState {
                access_token,
                refresh_token,
            }),
        }
    }
}

#[async_trait]
impl AuthStrategy for TokenAuth {
    async fn attach(
        &self,
        _http: &reqwest::Client,
        mut headers: HeaderMap,
    ) -> Result<HeaderMap, AuthenticationError> {
        let state = self.state.lock().await;
        // An expired access token is still sent as-is; the 401 retry path
        // replaces it. Renewal here is deliberately reactive only.
        headers.insert(AUTHORIZATION, bearer(&state.access_token)?);
        Ok(headers)
    }

    async fn renew_on_unauthorized(&self, http: &reqwest::Client) -> bool {
        let mut state = self.state.lock().await;
        let Some(refresh_token) = state.refresh_token.clone() else {
            return false;
        };
        match refresh_access_token(http, &self.base_url, &refresh_token).await {
            Ok(access_token) => {
                state.access_token = access_token;
                true
            }
            Err(_err) => {
                #[cfg(feature = "telemetry")]
                debug!(error = %_err, "token refresh after 401 failed, not retrying");
                false
            }
        }
    }
}

/// Tokens acquired through the API-key login exchange.
///
/// Either no login has happened yet (the strategy holds `None`) or both
/// tokens are present; the two never exist separately.
#[derive(Debug)]
struct SessionTokens {
    access_token: String,
    refresh_token: String,
    expires_at: Instant,
}

impl SessionTokens {
    fn near_expiry(&self) -> bool {
        self.expires_at.saturating_duration_since(Instant::now()) <= EXPIRY_SKEW
    }
}

/// Strategy for a long-lived API key/secret pair.
///
/// Performs the login exchange lazily on first [`attach`](AuthStrategy::attach)
/// and refreshes proactively when the access token is within
/// [`EXPIRY_SKEW`] of expiry, avoiding an extra round trip in the common
/// case. The 401 retry path remains the safety net for clock skew and
/// server-side early expiry.
#[derive(Debug)]
pub struct ApiKeyAuth {
    base_url: Url,
    api_key: String,
    secret_key: String,
    state: Mutex<Option<SessionTokens>>,
}

impl ApiKeyAuth {
    /// Creates a strategy from static key material. No I/O happens until the
    /// first authenticated request.
    #[must_use]
    pub fn new(base_url: Url, api_key: String, secret_key: String) -> Self {
        Self {
            base_url,
            api_key,
            secret_key,
            state: Mutex::new(None),
        }
    }

    /// Exchanges the key/secret pair for a fresh token pair.
    async fn login(&self, http: &reqwest::Client) -> Result<SessionTokens, AuthenticationError> {
        #[cfg(feature = "telemetry")]
        debug!("performing API-key login exchange");
        let url = endpoint_url(&self.base_url, API_LOGIN_PATH);
        let response = http
            .post(url)
            .json(&ApiLoginRequest {
                api_key: &self.api_key,
                secret_key: &self.secret_key,
            })
            .send()
            .await
            .map_err(|e| AuthenticationError::new(format!("API login request failed: {e}")))?;
        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthenticationError::new(format!(
                "API login failed: {status} {body}"
            )));
        }
        let body: ApiLoginResponse = response
            .json()
            .await
            .map_err(|e| AuthenticationError::new(format!("invalid API login response: {e}")))?;
        let access = body.access_token.or(body.token);
        let (Some(access_token), Some(refresh_token)) = (access, body.refresh_token) else {
            return Err(AuthenticationError::new(
                "login response missing access/refresh tokens",
            ));
        };
        Ok(SessionTokens {
            access_token,
            refresh_token,
            expires_at: Instant::now() + ACCESS_TOKEN_TTL,
        })
    }

    /// Rewinds the current token's expiry so the next attach sees it as
    /// about to expire.
    #[cfg(test)]
    async fn expire_current_token(&self) {
        if let Some(tokens) = self.state.lock().await.as_mut() {
            tokens.expires_at = Instant::now();
        }
    }
}

#[async_trait]
impl AuthStrategy for ApiKeyAuth {
    async fn attach(
        &self,
        http: &reqwest::Client,
        mut headers: HeaderMap,
    ) -> Result<HeaderMap, AuthenticationError> {
        // The lock is held across the whole exchange so concurrent callers
        // cannot trigger duplicate logins or out-of-order refreshes.
        let mut guard = self.state.lock().await;
        if guard.is_none() {
            *guard = Some(self.login(http).await?);
        } else if let Some(tokens) = guard.as_mut()
            && tokens.near_expiry()
        {
            #[cfg(feature = "telemetry")]
            debug!("access token near expiry, refreshing proactively");
            let refresh_token = tokens.refresh_token.clone();
            tokens.access_token =
                refresh_access_token(http, &self.base_url, &refresh_token).await?;
            tokens.expires_at = Instant::now() + ACCESS_TOKEN_TTL;
        }
        let access_token = guard
            .as_ref()
            .map(|tokens| tokens.access_token.clone())
            .ok_or_else(|| AuthenticationError::new("session tokens missing after login"))?;
        headers.insert(AUTHORIZATION, bearer(&access_token)?);
        Ok(headers)
    }

    async fn renew_on_unauthorized(&self, http: &reqwest::Client) -> bool {
        let mut guard = self.state.lock().await;
        let Some(tokens) = guard.as_mut() else {
            // Never logged in: there is no refresh token to exchange.
            return false;
        };
        let refresh_token = tokens.refresh_token.clone();
        match refresh_access_token(http, &self.base_url, &refresh_token).await {
            Ok(access_token) => {
                tokens.access_token = access_token;
                tokens.expires_at = Instant::now() + ACCESS_TOKEN_TTL;
                true
            }
            Err(_err) => {
                #[cfg(feature = "telemetry")]
                debug!(error = %_err, "token refresh after 401 failed, not retrying");
                false
            }
        }
    }
}

/// Exchanges a refresh token for a new access token.
async fn refresh_access_token(
    http: &reqwest::Client,
    base_url: &Url,
    refresh_token: &str,
) -> Result<String, AuthenticationError> {
    let url = endpoint_url(base_url, REFRESH_TOKEN_PATH);
    let response = http
        .post(url)
        .json(&RefreshRequest {
            refresh: refresh_token,
        })
        .send()
        .await
        .map_err(|e| AuthenticationError::new(format!("token refresh request failed: {e}")))?;
    if response.status() != StatusCode::OK {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AuthenticationError::new(format!(
            "failed to refresh token: {status} {body}"
        )));
    }
    let body: RefreshResponse = response
        .json()
        .await
        .map_err(|e| AuthenticationError::new(format!("invalid refresh response: {e}")))?;
    body.access
        .ok_or_else(|| AuthenticationError::new("refresh response missing access token"))
}

/// Builds `Authorization: Bearer <token>`.
fn bearer(token: &str) -> Result<HeaderValue, AuthenticationError> {
    HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| AuthenticationError::new("access token is not a valid header value"))
}

/// Joins a credential endpoint path onto the base URL.
fn endpoint_url(base_url: &Url, path: &str) -> String {
    format!("{}{path}", base_url.as_str().trim_end_matches('/'))
}

#[derive(Serialize)]
struct ApiLoginRequest<'a> {
    api_key: &'a str,
    secret_key: &'a str,
}

#[derive(Deserialize)]
struct ApiLoginResponse {
    access_token: Option<String>,
    token: Option<String>,
    refresh_token: Option<String>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: Option<String>,
}
