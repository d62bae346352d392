//! Wallet lookup operations.

use http::Method;

use crate::client::Client;
use crate::error::Error;
use crate::models::PaginatedWalletList;
use crate::pipeline::RequestOptions;

use super::decode;

/// Wallet endpoints.
#[derive(Debug)]
pub struct WalletService<'a> {
    client: &'a Client,
}

impl<'a> WalletService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Lists the wallets belonging to a phone number, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-2xx response and [`Error::Decode`] if
    /// the body is not a wallet page.
    pub async fn list_by_phone(
        &self,
        phone: &str,
        page: Option<u32>,
        search: Option<&str>,
    ) -> Result<PaginatedWalletList, Error> {
        let path = self
            .client
            .router()
            .resolve("wallet.list_by_phone", &[("phone", phone)])?;
        let mut options = RequestOptions::new();
        if let Some(page) = page {
            options = options.query("page", page);
        }
        if let Some(search) = search {
            options = options.query("search", search);
        }
        let response = self
            .client
            .pipeline()
            .execute(Method::GET, &path, options)
            .await?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use crate::factory::client_with_tokens;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn phone_is_substituted_into_the_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tp/v1/wlt/wallets/09120000000/"))
            .and(query_param("search", "btc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": [{
                    "currency": { "id": 1, "code": "BTC" },
                    "balance": "0.5",
                    "value_total": "1000000",
                }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_tokens(server.uri(), "AT", "RT").unwrap();
        let page = client
            .wallet()
            .list_by_phone("09120000000", None, Some("btc"))
            .await
            .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].balance, "0.5");
    }
}
