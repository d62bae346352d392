#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Async client SDK for the GozarPay payment gateway REST API.
//!
//! The SDK builds authenticated requests against a versioned endpoint table,
//! normalizes responses into typed records, and transparently renews expired
//! credentials: a rejected call (401) triggers at most one token renewal and
//! one retry.
//!
//! # Getting started
//!
//! Clients are built through the factory, which picks a credential strategy
//! from whichever fields the configuration supplies — a pre-acquired token
//! pair, an API key/secret pair, or nothing for public access:
//!
//! ```no_run
//! # async fn run() -> Result<(), gozarpay::Error> {
//! let client = gozarpay::client_with_api_keys("https://api.gozarpay.com", "key", "secret")?;
//! let receipt = client.receipt().get(42).await?;
//! println!("receipt {} is {:?}", receipt.id, receipt.status);
//! # Ok(())
//! # }
//! ```
//!
//! [`from_env`] reads the `GOZARPAY_*` environment variables instead.
//!
//! # Modules
//!
//! - [`auth`] - Credential strategies (none, token pair, API-key exchange)
//! - [`client`] - The high-level [`Client`] and its service handles
//! - [`config`] - The [`ClientConfig`] bag consumed by the factory
//! - [`error`] - Typed error taxonomy
//! - [`factory`] - Builder-chain client construction
//! - [`models`] - Typed request/response records
//! - [`pipeline`] - The request pipeline with the single 401 retry
//! - [`services`] - Market, receipt, and wallet operations
//! - [`versioning`] - API versions and logical route resolution
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod factory;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod versioning;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ApiError, AuthenticationError, Error, RouteNotFoundError};
pub use factory::{client_public, client_with_api_keys, client_with_tokens, create_client, from_env};
pub use versioning::ApiVersion;
