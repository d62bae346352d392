//! Market data operations.

use http::Method;

use crate::client::Client;
use crate::error::Error;
use crate::models::MarketPrice;
use crate::pipeline::RequestOptions;

use super::decode;

/// Optional filters for [`MarketService::price_stats`].
#[derive(Debug, Clone, Default)]
pub struct PriceStatsFilter {
    /// Base currency code.
    pub code1: Option<String>,
    /// Quote currency code.
    pub code2: Option<String>,
    /// Base currency id.
    pub currency1: Option<i64>,
    /// Quote currency id.
    pub currency2: Option<i64>,
    /// Market title search.
    pub title: Option<String>,
    /// Restrict to tradable markets.
    pub tradable: Option<bool>,
}

/// Market data endpoints.
#[derive(Debug)]
pub struct MarketService<'a> {
    client: &'a Client,
}

impl<'a> MarketService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetches market price statistics. Public endpoint, no credentials
    /// attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-2xx response and [`Error::Decode`] if
    /// the body is not a list of market prices.
    pub async fn price_stats(&self, filter: &PriceStatsFilter) -> Result<Vec<MarketPrice>, Error> {
        let mut options = RequestOptions::public();
        if let Some(code1) = &filter.code1 {
            options = options.query("code1", code1);
        }
        if let Some(code2) = &filter.code2 {
            options = options.query("code2", code2);
        }
        if let Some(currency1) = filter.currency1 {
            options = options.query("currency1", currency1);
        }
        if let Some(currency2) = filter.currency2 {
            options = options.query("currency2", currency2);
        }
        if let Some(title) = &filter.title {
            options = options.query("title", title);
        }
        if let Some(tradable) = filter.tradable {
            options = options.query("tradable", tradable);
        }
        let path = self.client.router().resolve("market.price_stats", &[])?;
        let response = self
            .client
            .pipeline()
            .execute(Method::GET, &path, options)
            .await?;
        decode(response).await
    }
}
