//! Configuration for building a client via the factory.

use crate::versioning::ApiVersion;

/// Configuration bag consumed by [`create_client`](crate::factory::create_client).
///
/// Provide one credential mode — a token pair, or a key pair — or neither for
/// public, unauthenticated access. When both are supplied the builder chain's
/// fixed precedence applies: tokens win over keys.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Upstream base URL, e.g. `https://api.gozarpay.com`. Required.
    pub base_url: String,

    /// API version to route against. Defaults to v1.
    pub version: ApiVersion,

    /// API key (exchanged for tokens by the SDK).
    pub api_key: Option<String>,
    /// API secret (exchanged for tokens by the SDK).
    pub secret_key: Option<String>,

    /// Pre-acquired access token.
    pub access_token: Option<String>,
    /// Pre-acquired refresh token.
    pub refresh_token: Option<String>,
}

impl ClientConfig {
    /// Creates a public (unauthenticated) configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}
