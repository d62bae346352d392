//! The high-level GozarPay client.
//!
//! A [`Client`] composes one [`RequestPipeline`] and one [`VersionRouter`]
//! and exposes the API surface through resource-oriented service handles.
//! Authentication is injected as an [`AuthStrategy`]; the factory decides
//! which one (see [`create_client`](crate::factory::create_client)).

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::auth::AuthStrategy;
use crate::pipeline::RequestPipeline;
use crate::services::{MarketService, ReceiptService, WalletService};
use crate::versioning::{ApiVersion, VersionRouter, VersionSpec};

/// High-level API client.
///
/// Exclusively owns one request pipeline and one version router. Cheap
/// handles to the market, receipt, and wallet services borrow from it.
#[derive(Debug)]
pub struct Client {
    pipeline: RequestPipeline,
    router: VersionRouter,
}

impl Client {
    /// Creates a client for the given base URL, API version, and credential
    /// strategy.
    #[must_use]
    pub fn new(base_url: Url, version: ApiVersion, auth: Arc<dyn AuthStrategy>) -> Self {
        Self {
            pipeline: RequestPipeline::new(base_url, auth),
            router: VersionRouter::new(VersionSpec::for_version(version)),
        }
    }

    /// Replaces the underlying HTTP client, e.g. to share a connection pool
    /// across clients.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.pipeline = self.pipeline.with_http_client(http);
        self
    }

    /// Overrides the fixed per-attempt request timeout (default 30 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.pipeline = self.pipeline.with_timeout(timeout);
        self
    }

    /// Returns the API version this client routes against.
    #[must_use]
    pub const fn version(&self) -> ApiVersion {
        self.router.version()
    }

    /// Market data operations.
    #[must_use]
    pub const fn market(&self) -> MarketService<'_> {
        MarketService::new(self)
    }

    /// Receipt lifecycle operations.
    #[must_use]
    pub const fn receipt(&self) -> ReceiptService<'_> {
        ReceiptService::new(self)
    }

    /// Wallet lookup operations.
    #[must_use]
    pub const fn wallet(&self) -> WalletService<'_> {
        WalletService::new(self)
    }

    pub(crate) const fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    pub(crate) const fn router(&self) -> &VersionRouter {
        &self.router
    }
}
