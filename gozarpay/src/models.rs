//! Typed records for the GozarPay REST API.
//!
//! Field names and optionality follow the upstream schema; unknown fields in
//! responses are ignored. Monetary amounts are carried as strings, as the
//! upstream serves them.

use serde::{Deserialize, Serialize};

/// Lifecycle states of a payment receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Receipt created, payment not started.
    Initialized,
    /// Payment in progress.
    Pending,
    /// Payment completed successfully.
    Success,
    /// Payment failed: amount was insufficient.
    FailedInsufficientAmount,
    /// Payment failed: never verified.
    FailedNotVerified,
    /// Receipt expired before payment.
    Expired,
    /// Payment was refunded.
    Refunded,
    /// Waiting for the payer to complete payment.
    WaitingPayment,
    /// A refund was attempted and failed.
    RefundFailed,
    /// Awaiting Divar-side verification.
    DivarVerification,
    /// Divar-side verification notified.
    DivarVerificationNotified,
}

/// A blockchain/settlement network attached to a currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Upstream identifier.
    pub id: i64,
    /// Short network code.
    pub code: String,
    /// English title.
    pub title: String,
    /// Persian title.
    #[serde(default)]
    pub title_fa: Option<String>,
    /// Logo URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Full currency record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Upstream identifier.
    pub id: i64,
    /// Short currency code.
    pub code: String,
    /// Persian title.
    #[serde(default)]
    pub title_fa: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Logo URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Display color.
    #[serde(default)]
    pub color: Option<String>,
    /// Networks this currency settles on.
    #[serde(default)]
    pub networks: Vec<Network>,
}

/// Condensed currency record as embedded in wallet responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySummary {
    /// Upstream identifier.
    pub id: i64,
    /// Short currency code.
    pub code: String,
    /// Persian title.
    #[serde(default)]
    pub title_fa: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Logo URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Display color.
    #[serde(default)]
    pub color: Option<String>,
    /// Display decimal places.
    #[serde(default)]
    pub decimal: Option<i32>,
    /// Decimal places for amounts.
    #[serde(default)]
    pub decimal_amount: Option<i32>,
    /// Decimal places for IRT values.
    #[serde(default)]
    pub decimal_irt: Option<i32>,
}

/// A user wallet balance for one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// The wallet's currency.
    pub currency: CurrencySummary,
    /// Balance in the wallet's currency.
    pub balance: String,
    /// Total value of the balance.
    pub value_total: String,
}

/// One page of wallet results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedWalletList {
    /// Total number of wallets across all pages.
    pub count: i64,
    /// URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page, if any.
    #[serde(default)]
    pub previous: Option<String>,
    /// Wallets on this page.
    pub results: Vec<Wallet>,
}

/// Market price statistics for one trading pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPrice {
    /// Upstream identifier.
    pub id: i64,
    /// Market code.
    pub code: String,
    /// Price metadata blob.
    pub price_info: String,
    /// Last price.
    pub price: String,
    /// Current buy price.
    pub buy_price: String,
    /// Current sell price.
    pub sell_price: String,
}

/// Request payload for creating a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptCreate {
    /// Amount in IRT.
    pub irt_amount: String,
    /// Caller-chosen reference for later verification.
    pub reference_id: String,
    /// Payer phone number.
    pub phone_number: String,
}

/// Payload for verifying or refunding a receipt by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReceipt {
    /// The reference supplied at creation time.
    pub reference_id: String,
}

/// A payment receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Upstream identifier.
    pub id: i64,
    /// Payer phone number.
    pub user_phone: String,
    /// Current lifecycle state.
    pub status: ReceiptStatus,
    /// Payment tracking code, once assigned.
    #[serde(default)]
    pub tracking_code: Option<String>,
    /// Amount in IRT.
    pub irt_amount: String,
    /// The caller-supplied reference.
    pub reference_id: String,
    /// Settlement currency, if settled in crypto.
    #[serde(default)]
    pub currency: Option<Currency>,
    /// Settlement network, if settled in crypto.
    #[serde(default)]
    pub network: Option<Network>,
    /// Settled amount in the settlement currency.
    #[serde(default)]
    pub amount: Option<String>,
    /// Payment timestamp.
    #[serde(default)]
    pub paid_at: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Expiry timestamp.
    #[serde(default)]
    pub expire_at: Option<String>,
}

/// One page of receipt results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedReceiptList {
    /// Total number of receipts across all pages.
    pub count: i64,
    /// URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page, if any.
    #[serde(default)]
    pub previous: Option<String>,
    /// Receipts on this page.
    pub results: Vec<Receipt>,
}
