//! DigiFlazz webhook handling.
//!
//! The provider reports transaction status asynchronously by POSTing signed
//! callbacks to this endpoint. This module implements:
//!
//! - **Signature Verification**: HMAC-SHA1 validation of the
//!   `X-Hub-Signature` header over the raw request body
//! - **Outcome Classification**: invalid signatures (403) are distinguished
//!   from missing payloads (400), accepted deliveries return 200
//! - **Event Publishing**: accepted payloads are republished as
//!   [`TransactionStatusUpdated`] events to an application-level publisher
//!
//! # Architecture
//!
//! ```text
//! Request -> Raw Body + X-Hub-Signature -> Verifier -> Publisher -> 200
//!                              |               |
//!                              v               v
//!                            403 (bad sig)   400 (no data)
//! ```
//!
//! # Security
//!
//! - The shared secret comes from the environment and is never logged
//! - Constant-time signature comparison to prevent timing attacks
//! - The digest is computed over the raw body bytes, before any parsing
//!
//! Verification failures are terminal per-request: the provider retries
//! delivery itself on non-2xx responses, so the only job here is correct
//! accept/reject classification.

pub mod events;
pub mod handler;
pub mod verifier;

pub use events::{
    BroadcastPublisher, CompositePublisher, EventPublisher, LoggingPublisher, NoOpPublisher,
    TransactionStatusUpdated,
};
pub use handler::{webhook_router, WebhookState, WEBHOOK_PATH};
pub use verifier::{RejectKind, WebhookOutcome, WebhookVerifier};
