//! MaxDigi - DigiFlazz Top-Up API Integration
//!
//! This crate provides a production-ready client for the DigiFlazz prepaid
//! top-up and billing API: signed outbound commands, verified inbound status
//! webhooks, and a supervised asynchronous transaction job.
//!
//! # Features
//!
//! - **Signed API Client**: balance check, price list, deposit tickets, and
//!   top-up transactions, with MD5 request signing per the provider protocol
//! - **Webhook Verification**: HMAC-SHA1 validation of `X-Hub-Signature`
//!   with constant-time comparison, republished as application events
//! - **Top-Up Jobs**: queue-fed background execution with explicit terminal
//!   outcome reporting
//!
//! # Architecture
//!
//! ```text
//! caller ──▶ TopUpQueue ──▶ TopUpWorker ──▶ ApiClient ──▶ DigiFlazz API
//!                                                             │
//!                         (async status callback)             ▼
//! listener ◀── EventPublisher ◀── WebhookVerifier ◀── POST /api/maxdigi/webhook
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use maxdigi::{ApiClient, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = ApiClient::new(&config)?;
//!
//!     let balance = client.check_balance().await?;
//!     println!("deposit balance: {}", balance["deposit"]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod job;
pub mod metrics;
pub mod signature;
pub mod webhook;

// Re-exports for convenience
pub use client::ApiClient;
pub use config::{Config, Credentials};
pub use error::{ApiError, ConfigError, Error, JobError, Result};
pub use job::{
    top_up_worker, JobOutcome, JobReport, JobState, RetryPolicy, TopUpJobSpec, TopUpQueue,
};
pub use webhook::{
    webhook_router, EventPublisher, TransactionStatusUpdated, WebhookState, WebhookVerifier,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
