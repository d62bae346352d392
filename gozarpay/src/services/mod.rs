//! Resource-oriented service handles.
//!
//! Each service is a thin borrow of the [`Client`](crate::client::Client):
//! it resolves a logical route through the version router, executes the call
//! through the pipeline, and decodes the response into a typed record.

mod market;
mod receipt;
mod wallet;

pub use market::{MarketService, PriceStatsFilter};
pub use receipt::ReceiptService;
pub use wallet::WalletService;

use serde::de::DeserializeOwned;

use crate::error::Error;

/// Decodes a successful response body into a typed record.
pub(crate) async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    response
        .json()
        .await
        .map_err(|source| Error::Decode { source })
}
