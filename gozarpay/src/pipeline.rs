//! The versioned request pipeline.
//!
//! [`RequestPipeline`] wraps a shared [`reqwest::Client`]: it resolves the
//! full URL, asks the credential strategy for headers, executes the call
//! with a fixed per-attempt timeout, performs at most one renewal+retry on a
//! 401, and turns any remaining non-2xx response into a typed
//! [`ApiError`](crate::error::ApiError).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, Method, StatusCode};
use reqwest::Response;
use serde::Serialize;
use serde_json::{Value, json};
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument, trace};

use crate::auth::AuthStrategy;
use crate::error::{ApiError, Error};

/// Fixed timeout applied independently to the initial attempt and to the
/// retried attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-call request parameters.
///
/// One instance per call; credential attachment defaults to on.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    auth: bool,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            auth: true,
            query: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    /// Creates options for an authenticated call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for a public call: no credentials are attached and a
    /// 401 is surfaced without a retry.
    #[must_use]
    pub fn public() -> Self {
        Self {
            auth: false,
            ..Self::default()
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Sets the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `body` cannot be represented as JSON.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Whether credentials are attached to this call.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.auth
    }
}

/// Executes requests against the upstream with credential handling.
///
/// Owns exactly one credential strategy; the underlying HTTP client may be
/// shared across pipelines for connection reuse.
pub struct RequestPipeline {
    base_url: Url,
    http: reqwest::Client,
    auth: Arc<dyn AuthStrategy>,
    timeout: Duration,
}

impl fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The credential strategy is a dyn trait object and may hold secrets.
        f.debug_struct("RequestPipeline")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RequestPipeline {
    /// Creates a pipeline over a fresh HTTP client with the default timeout.
    #[must_use]
    pub fn new(base_url: Url, auth: Arc<dyn AuthStrategy>) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
            auth,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replaces the underlying HTTP client, e.g. to share a connection pool.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Overrides the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Executes one request against `path`, relative to the base URL.
    ///
    /// On a 401 with credential attachment enabled, the strategy is given one
    /// chance to renew; if it accepts, the call is retried exactly once with
    /// freshly attached credentials. Non-401 failures are never retried.
    ///
    /// # Errors
    ///
    /// - [`Error::Authentication`] if attaching credentials fails.
    /// - [`Error::Transport`] if the HTTP round trip fails.
    /// - [`Error::Api`] if the (possibly retried) response is non-2xx.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "gozarpay.pipeline.execute", skip_all, fields(method = %method, path), err)
    )]
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        let url = self.absolute_url(path)?;
        let mut response = self.send(method.clone(), url.clone(), &options).await?;

        if response.status() == StatusCode::UNAUTHORIZED && options.auth {
            #[cfg(feature = "telemetry")]
            debug!(url = %url, "received 401, attempting credential renewal");
            if self.auth.renew_on_unauthorized(&self.http).await {
                #[cfg(feature = "telemetry")]
                trace!(url = %url, "credentials renewed, retrying once");
                response = self.send(method.clone(), url.clone(), &options).await?;
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError {
                status,
                method,
                url,
                body: read_body(response).await,
            }
            .into());
        }
        Ok(response)
    }

    /// Builds and sends a single attempt.
    async fn send(
        &self,
        method: Method,
        url: Url,
        options: &RequestOptions,
    ) -> Result<Response, Error> {
        let mut request = self.http.request(method, url).timeout(self.timeout);
        if options.auth {
            let headers = self.auth.attach(&self.http, HeaderMap::new()).await?;
            request = request.headers(headers);
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Concatenates the base URL and an absolute path.
    fn absolute_url(&self, path: &str) -> Result<Url, Error> {
        let raw = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));
        Url::parse(&raw).map_err(|source| Error::Configuration {
            message: format!("invalid request URL `{raw}`: {source}"),
        })
    }
}

/// Best-effort body capture for error reporting: structured JSON when
/// possible, otherwise the raw text wrapped as `{"text": ...}`.
async fn read_body(response: Response) -> Value {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str(&text).unwrap_or_else(|_| json!({ "text": text }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{NoAuth, TokenAuth};
    use serde_json::json;
    use wiremock::matchers::{header, method as http_method, path as url_path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pipeline(server: &MockServer, auth: Arc<dyn AuthStrategy>) -> RequestPipeline {
        RequestPipeline::new(server.uri().parse().unwrap(), auth)
    }

    #[tokio::test]
    async fn success_passes_response_through() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .and(url_path("/ping/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let pipeline = pipeline(&server, Arc::new(NoAuth));
        let response = pipeline
            .execute(Method::GET, "/ping/", RequestOptions::public().query("page", 2))
            .await
            .unwrap();
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn non_2xx_is_api_error_with_parsed_body_and_no_retry() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .and(url_path("/missing/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "gone" })))
            .expect(1)
            .mount(&server)
            .await;

        let pipeline = pipeline(&server, Arc::new(NoAuth));
        let err = pipeline
            .execute(Method::GET, "/missing/", RequestOptions::public())
            .await
            .unwrap_err();
        let Error::Api(api) = err else {
            panic!("expected ApiError, got {err:?}");
        };
        assert_eq!(api.status_code(), 404);
        assert_eq!(api.method, Method::GET);
        assert_eq!(api.body, json!({ "detail": "gone" }));
    }

    #[tokio::test]
    async fn non_json_error_body_is_wrapped_as_text() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .and(url_path("/oops/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("gateway exploded"))
            .mount(&server)
            .await;

        let pipeline = pipeline(&server, Arc::new(NoAuth));
        let err = pipeline
            .execute(Method::GET, "/oops/", RequestOptions::public())
            .await
            .unwrap_err();
        let Error::Api(api) = err else {
            panic!("expected ApiError, got {err:?}");
        };
        assert_eq!(api.body, json!({ "text": "gateway exploded" }));
    }

    #[tokio::test]
    async fn unauthorized_without_refresh_token_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .and(url_path("/private/"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let auth = TokenAuth::new(server.uri().parse().unwrap(), "T1".to_owned(), None);
        let pipeline = pipeline(&server, Arc::new(auth));
        let err = pipeline
            .execute(Method::GET, "/private/", RequestOptions::new())
            .await
            .unwrap_err();
        let Error::Api(api) = err else {
            panic!("expected ApiError, got {err:?}");
        };
        assert_eq!(api.status_code(), 401);
    }

    #[tokio::test]
    async fn unauthorized_triggers_one_refresh_and_one_retry() {
        let server = MockServer::start().await;
        // The stale token is rejected, the renewed one accepted.
        Mock::given(http_method("GET"))
            .and(url_path("/private/"))
            .and(header("authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(http_method("GET"))
            .and(url_path("/private/"))
            .and(header("authorization", "Bearer T2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(http_method("POST"))
            .and(url_path("/tp/v1/usr/refresh-token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "T2" })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = TokenAuth::new(
            server.uri().parse().unwrap(),
            "T1".to_owned(),
            Some("R1".to_owned()),
        );
        let pipeline = pipeline(&server, Arc::new(auth));
        let response = pipeline
            .execute(Method::GET, "/private/", RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn second_unauthorized_after_renewal_is_not_retried_again() {
        let server = MockServer::start().await;
        // The business endpoint rejects even the renewed token.
        Mock::given(http_method("GET"))
            .and(url_path("/private/"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(http_method("POST"))
            .and(url_path("/tp/v1/usr/refresh-token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "T2" })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = TokenAuth::new(
            server.uri().parse().unwrap(),
            "T1".to_owned(),
            Some("R1".to_owned()),
        );
        let pipeline = pipeline(&server, Arc::new(auth));
        let err = pipeline
            .execute(Method::GET, "/private/", RequestOptions::new())
            .await
            .unwrap_err();
        let Error::Api(api) = err else {
            panic!("expected ApiError, got {err:?}");
        };
        assert_eq!(api.status_code(), 401);
        // Initial attempt, one refresh, one retry: nothing more.
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failed_refresh_surfaces_original_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .and(url_path("/private/"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(http_method("POST"))
            .and(url_path("/tp/v1/usr/refresh-token/"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let auth = TokenAuth::new(
            server.uri().parse().unwrap(),
            "T1".to_owned(),
            Some("R1".to_owned()),
        );
        let pipeline = pipeline(&server, Arc::new(auth));
        let err = pipeline
            .execute(Method::GET, "/private/", RequestOptions::new())
            .await
            .unwrap_err();
        let Error::Api(api) = err else {
            panic!("expected ApiError, got {err:?}");
        };
        assert_eq!(api.status_code(), 401);
    }

    #[tokio::test]
    async fn public_requests_skip_attach_and_renewal() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .and(url_path("/public/"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        // A strategy with a refresh token that must never be exercised.
        let auth = TokenAuth::new(
            server.uri().parse().unwrap(),
            "T1".to_owned(),
            Some("R1".to_owned()),
        );
        let pipeline = pipeline(&server, Arc::new(auth));
        let err = pipeline
            .execute(Method::GET, "/public/", RequestOptions::public())
            .await
            .unwrap_err();
        let Error::Api(api) = err else {
            panic!("expected ApiError, got {err:?}");
        };
        assert_eq!(api.status_code(), 401);
        // Only the single public request reached the server.
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
