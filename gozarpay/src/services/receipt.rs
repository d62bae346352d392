//! Receipt lifecycle operations.

use http::Method;

use crate::client::Client;
use crate::error::Error;
use crate::models::{PaginatedReceiptList, Receipt, ReceiptCreate, VerifyReceipt};
use crate::pipeline::RequestOptions;

use super::decode;

/// Receipt creation, verification, refund, and lookup endpoints.
#[derive(Debug)]
pub struct ReceiptService<'a> {
    client: &'a Client,
}

impl<'a> ReceiptService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Creates a new payment receipt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-2xx response and [`Error::Decode`] if
    /// the body is not a receipt record.
    pub async fn create(&self, request: &ReceiptCreate) -> Result<Receipt, Error> {
        let path = self.client.router().resolve("receipt.create", &[])?;
        let options = RequestOptions::new().json(request)?;
        let response = self
            .client
            .pipeline()
            .execute(Method::POST, &path, options)
            .await?;
        decode(response).await
    }

    /// Verifies a receipt by its caller-supplied reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-2xx response.
    pub async fn verify(&self, reference_id: &str) -> Result<VerifyReceipt, Error> {
        self.post_by_reference("receipt.verify", reference_id).await
    }

    /// Refunds a receipt by its caller-supplied reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-2xx response.
    pub async fn refund(&self, reference_id: &str) -> Result<VerifyReceipt, Error> {
        self.post_by_reference("receipt.refund", reference_id).await
    }

    /// Fetches a single receipt by upstream id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-2xx response.
    pub async fn get(&self, receipt_id: i64) -> Result<Receipt, Error> {
        let path = self
            .client
            .router()
            .resolve("receipt.get", &[("id", &receipt_id.to_string())])?;
        let response = self
            .client
            .pipeline()
            .execute(Method::GET, &path, RequestOptions::new())
            .await?;
        decode(response).await
    }

    /// Fetches one page of receipts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-2xx response.
    pub async fn list(&self, page: Option<u32>) -> Result<PaginatedReceiptList, Error> {
        let path = self.client.router().resolve("receipt.list", &[])?;
        let mut options = RequestOptions::new();
        if let Some(page) = page {
            options = options.query("page", page);
        }
        let response = self
            .client
            .pipeline()
            .execute(Method::GET, &path, options)
            .await?;
        decode(response).await
    }

    /// Walks every page and returns all receipts.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered while paging.
    pub async fn list_all(&self) -> Result<Vec<Receipt>, Error> {
        let mut receipts = Vec::new();
        let mut page = 1u32;
        loop {
            let current = self.list(Some(page)).await?;
            receipts.extend(current.results);
            if current.next.is_none() {
                break;
            }
            page += 1;
        }
        Ok(receipts)
    }

    async fn post_by_reference(
        &self,
        route: &str,
        reference_id: &str,
    ) -> Result<VerifyReceipt, Error> {
        let path = self.client.router().resolve(route, &[])?;
        let options = RequestOptions::new().json(&VerifyReceipt {
            reference_id: reference_id.to_owned(),
        })?;
        let response = self
            .client
            .pipeline()
            .execute(Method::POST, &path, options)
            .await?;
        decode(response).await
    }
}
