//! Client construction.
//!
//! Strategy selection is a builder chain: an ordered list of
//! predicate+constructor pairs evaluated in fixed precedence order. A token
//! pair wins over a key pair, and a public no-auth client is the always-true
//! fallback — first match wins, so supplying both credential modes resolves
//! silently in favor of tokens.

use std::sync::Arc;

use url::Url;

use crate::auth::{ApiKeyAuth, NoAuth, TokenAuth};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::versioning::ApiVersion;

/// Environment variable read by [`from_env`]: upstream base URL.
pub const ENV_BASE_URL: &str = "GOZARPAY_BASE_URL";
/// Environment variable read by [`from_env`]: API version (`v1` or `v2`).
pub const ENV_API_VERSION: &str = "GOZARPAY_API_VERSION";
/// Environment variable read by [`from_env`]: API key.
pub const ENV_API_KEY: &str = "GOZARPAY_API_KEY";
/// Environment variable read by [`from_env`]: API secret.
pub const ENV_SECRET_KEY: &str = "GOZARPAY_SECRET_KEY";
/// Environment variable read by [`from_env`]: pre-acquired access token.
pub const ENV_ACCESS_TOKEN: &str = "GOZARPAY_ACCESS_TOKEN";
/// Environment variable read by [`from_env`]: pre-acquired refresh token.
pub const ENV_REFRESH_TOKEN: &str = "GOZARPAY_REFRESH_TOKEN";

/// One link of the builder chain: a predicate plus a constructor.
trait ClientBuilder: Send + Sync {
    fn can_build(&self, config: &ClientConfig) -> bool;
    fn build(&self, config: &ClientConfig) -> Result<Client, Error>;
}

/// Builds a client from a pre-acquired token pair.
struct TokensBuilder;

impl ClientBuilder for TokensBuilder {
    fn can_build(&self, config: &ClientConfig) -> bool {
        config.access_token.is_some() && config.refresh_token.is_some()
    }

    fn build(&self, config: &ClientConfig) -> Result<Client, Error> {
        let base_url = parse_base_url(&config.base_url)?;
        let access_token = config.access_token.clone().unwrap_or_default();
        let auth = TokenAuth::new(base_url.clone(), access_token, config.refresh_token.clone());
        Ok(Client::new(base_url, config.version, Arc::new(auth)))
    }
}

/// Builds a client that exchanges an API key/secret pair for tokens.
struct ApiKeysBuilder;

impl ClientBuilder for ApiKeysBuilder {
    fn can_build(&self, config: &ClientConfig) -> bool {
        config.api_key.is_some() && config.secret_key.is_some()
    }

    fn build(&self, config: &ClientConfig) -> Result<Client, Error> {
        let base_url = parse_base_url(&config.base_url)?;
        let api_key = config.api_key.clone().unwrap_or_default();
        let secret_key = config.secret_key.clone().unwrap_or_default();
        let auth = ApiKeyAuth::new(base_url.clone(), api_key, secret_key);
        Ok(Client::new(base_url, config.version, Arc::new(auth)))
    }
}

/// Always-true fallback: a public, unauthenticated client.
struct PublicBuilder;

impl ClientBuilder for PublicBuilder {
    fn can_build(&self, _config: &ClientConfig) -> bool {
        true
    }

    fn build(&self, config: &ClientConfig) -> Result<Client, Error> {
        let base_url = parse_base_url(&config.base_url)?;
        Ok(Client::new(base_url, config.version, Arc::new(NoAuth)))
    }
}

const BUILDERS: &[&dyn ClientBuilder] = &[&TokensBuilder, &ApiKeysBuilder, &PublicBuilder];

/// Builds a client from a configuration bag via the builder chain.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the base URL is missing or malformed.
pub fn create_client(config: &ClientConfig) -> Result<Client, Error> {
    for builder in BUILDERS {
        if builder.can_build(config) {
            return builder.build(config);
        }
    }
    // PublicBuilder is an always-true fallback, so the chain cannot fall through.
    Err(Error::Configuration {
        message: "no suitable client builder found".to_owned(),
    })
}

/// Builds a v1 client from a pre-acquired access/refresh token pair.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the base URL is missing or malformed.
pub fn client_with_tokens(
    base_url: impl Into<String>,
    access_token: impl Into<String>,
    refresh_token: impl Into<String>,
) -> Result<Client, Error> {
    create_client(&ClientConfig {
        base_url: base_url.into(),
        access_token: Some(access_token.into()),
        refresh_token: Some(refresh_token.into()),
        ..ClientConfig::default()
    })
}

/// Builds a v1 client from an API key/secret pair. The SDK performs the
/// token exchange lazily on the first authenticated call.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the base URL is missing or malformed.
pub fn client_with_api_keys(
    base_url: impl Into<String>,
    api_key: impl Into<String>,
    secret_key: impl Into<String>,
) -> Result<Client, Error> {
    create_client(&ClientConfig {
        base_url: base_url.into(),
        api_key: Some(api_key.into()),
        secret_key: Some(secret_key.into()),
        ..ClientConfig::default()
    })
}

/// Builds an unauthenticated v1 client for public endpoints.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the base URL is missing or malformed.
pub fn client_public(base_url: impl Into<String>) -> Result<Client, Error> {
    create_client(&ClientConfig::new(base_url))
}

/// Builds a client from process environment variables.
///
/// Reads [`ENV_BASE_URL`], [`ENV_API_VERSION`], [`ENV_API_KEY`],
/// [`ENV_SECRET_KEY`], [`ENV_ACCESS_TOKEN`], and [`ENV_REFRESH_TOKEN`] once,
/// at call time, and delegates selection to the builder chain. Unset or
/// blank variables are treated as absent.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the base URL is missing or the
/// version tag is unknown.
pub fn from_env() -> Result<Client, Error> {
    let version = match env_opt(ENV_API_VERSION) {
        Some(raw) => raw.parse::<ApiVersion>()?,
        None => ApiVersion::default(),
    };
    create_client(&ClientConfig {
        base_url: env_opt(ENV_BASE_URL).unwrap_or_default(),
        version,
        api_key: env_opt(ENV_API_KEY),
        secret_key: env_opt(ENV_SECRET_KEY),
        access_token: env_opt(ENV_ACCESS_TOKEN),
        refresh_token: env_opt(ENV_REFRESH_TOKEN),
    })
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Validates and parses the configured base URL.
fn parse_base_url(raw: &str) -> Result<Url, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Configuration {
            message: "base_url is required (e.g. `https://api.gozarpay.com`)".to_owned(),
        });
    }
    Url::parse(trimmed).map_err(|source| Error::Configuration {
        message: format!("invalid base_url `{trimmed}`: {source}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn receipt_body(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "user_phone": "09120000000",
            "status": "success",
            "irt_amount": "150000",
            "reference_id": "ref-1",
        })
    }

    #[test]
    fn missing_base_url_is_a_configuration_error() {
        let err = client_public("  ").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn config_version_is_honored() {
        let client = create_client(&ClientConfig {
            base_url: "https://api.example.com".to_owned(),
            version: ApiVersion::V2,
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.version(), ApiVersion::V2);
    }

    #[tokio::test]
    async fn api_key_client_logs_in_once_then_reuses_the_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tp/v1/usr/api-login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "A1",
                "refresh_token": "R1",
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tp/v1/rpt/receipts/42/"))
            .and(header("authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(receipt_body(42)))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_with_api_keys(server.uri(), "k", "s").unwrap();

        // First authenticated call performs the login exchange before the
        // business call; the second reuses the token.
        let first = client.receipt().get(42).await.unwrap();
        assert_eq!(first.id, 42);
        let second = client.receipt().get(42).await.unwrap();
        assert_eq!(second.id, 42);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].url.path(), "/tp/v1/usr/api-login/");
    }

    #[tokio::test]
    async fn token_pair_takes_precedence_over_key_pair() {
        let server = MockServer::start().await;
        // No login mock: an API-key exchange would fail the test via expect(2).
        Mock::given(method("GET"))
            .and(path("/tp/v1/rpt/receipts/7/"))
            .and(header("authorization", "Bearer AT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(receipt_body(7)))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&ClientConfig {
            base_url: server.uri(),
            access_token: Some("AT".to_owned()),
            refresh_token: Some("RT".to_owned()),
            api_key: Some("k".to_owned()),
            secret_key: Some("s".to_owned()),
            ..ClientConfig::default()
        })
        .unwrap();

        let receipt = client.receipt().get(7).await.unwrap();
        assert_eq!(receipt.id, 7);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn public_client_sends_no_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tp/v1/mrt/markets/price-stats/"))
            .and(|request: &wiremock::Request| !request.headers.contains_key("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_public(server.uri()).unwrap();
        let prices = client
            .market()
            .price_stats(&crate::services::PriceStatsFilter::default())
            .await
            .unwrap();
        assert!(prices.is_empty());
    }
}
