//! Error types for the GozarPay SDK.
//!
//! Every failure surfaces to the caller as one of the typed errors below;
//! nothing is swallowed inside the pipeline. [`ApiError`] carries enough
//! context (status, URL, method, body) to diagnose a rejected call without
//! reaching into SDK internals.

use http::{Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::versioning::ApiVersion;

/// Top-level error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Login or token refresh against the credential endpoints failed.
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    /// A business endpoint returned a non-2xx response.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A logical route is not defined for the active API version.
    #[error(transparent)]
    RouteNotFound(#[from] RouteNotFoundError),

    /// The client could not be constructed from the supplied configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// Human-readable description of what is missing or malformed.
        message: String,
    },

    /// The HTTP round trip itself failed (connection, timeout, TLS).
    #[error("HTTP transport error: {source}")]
    Transport {
        /// The underlying reqwest error.
        #[from]
        source: reqwest::Error,
    },

    /// A successful response body could not be decoded into the expected record.
    #[error("failed to decode response body: {source}")]
    Decode {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// A request payload could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Authentication handshake or token refresh failed.
///
/// Raised by the credential strategies when the login/refresh endpoints
/// return a non-success status or a response missing required token fields.
/// Always fatal to the current call; the pipeline never retries past the
/// single renewal attempt.
#[derive(Debug, Clone, thiserror::Error)]
#[error("authentication failed: {message}")]
pub struct AuthenticationError {
    /// What went wrong during the credential exchange.
    pub message: String,
}

impl AuthenticationError {
    /// Creates a new authentication error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A business endpoint returned a status outside `[200, 300)`.
///
/// Constructed at the pipeline boundary after the (possibly retried)
/// response is known to be a failure; never mutated afterwards.
#[derive(Debug, Clone, thiserror::Error)]
#[error("HTTP {status} {method} {url}")]
pub struct ApiError {
    /// The response status code.
    pub status: StatusCode,
    /// The HTTP method of the failed request.
    pub method: Method,
    /// The full URL of the failed request.
    pub url: Url,
    /// Best-effort parsed response body. Non-JSON bodies are wrapped as
    /// `{"text": "<raw>"}`.
    pub body: Value,
}

impl ApiError {
    /// Returns the status code as a plain integer.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }
}

/// A logical route name is not defined for the active API version.
///
/// This is a programming or configuration error; it should never occur in a
/// correctly configured deployment.
#[derive(Debug, Clone, thiserror::Error)]
#[error("route `{route}` is not defined for API version `{version}`")]
pub struct RouteNotFoundError {
    /// The logical route name that failed to resolve.
    pub route: String,
    /// The API version the lookup ran against.
    pub version: ApiVersion,
}
