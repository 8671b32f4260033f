//! Transaction status events republished from verified webhooks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::info;

/// Event emitted for every accepted webhook delivery.
///
/// `data` is the provider's payload carried verbatim; no reshaping happens
/// between the wire and the listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatusUpdated {
    /// The `data` object exactly as received from the provider
    pub data: Value,
    /// When this process accepted the delivery
    pub received_at: DateTime<Utc>,
}

impl TransactionStatusUpdated {
    /// Wrap a verified payload, stamping the receive time.
    pub fn new(data: Value) -> Self {
        Self {
            data,
            received_at: Utc::now(),
        }
    }

    /// The transaction's `ref_id`, when the provider included one.
    pub fn ref_id(&self) -> Option<&str> {
        self.data.get("ref_id").and_then(Value::as_str)
    }
}

/// Application-side sink for transaction status events.
///
/// The webhook handler publishes exactly one event per accepted delivery;
/// what happens next (persistence, notifications, reconciliation) is the
/// application's concern.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Deliver one event. Errors are logged by the caller, never turned into
    /// a webhook rejection.
    async fn publish(&self, event: TransactionStatusUpdated) -> anyhow::Result<()>;
}

/// Publisher that logs each event at info level.
#[derive(Debug, Clone, Default)]
pub struct LoggingPublisher;

#[async_trait::async_trait]
impl EventPublisher for LoggingPublisher {
    async fn publish(&self, event: TransactionStatusUpdated) -> anyhow::Result<()> {
        info!(
            ref_id = event.ref_id().unwrap_or("<none>"),
            data = %event.data,
            "Transaction status updated"
        );
        Ok(())
    }
}

/// Publisher backed by a tokio broadcast channel.
///
/// Subscribers receive every event published after they subscribe; lagging
/// subscribers drop the oldest events, which is acceptable because the
/// provider's webhook is a notification stream, not a ledger.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<TransactionStatusUpdated>,
}

impl BroadcastPublisher {
    /// Create a publisher with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Obtain a receiver for subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<TransactionStatusUpdated> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait::async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, event: TransactionStatusUpdated) -> anyhow::Result<()> {
        // A send error only means no subscriber is currently listening.
        let _ = self.tx.send(event);
        Ok(())
    }
}

/// Publisher that discards events, for tests.
#[derive(Debug, Clone, Default)]
pub struct NoOpPublisher;

#[async_trait::async_trait]
impl EventPublisher for NoOpPublisher {
    async fn publish(&self, _event: TransactionStatusUpdated) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Fan-out publisher delivering each event to every inner publisher.
pub struct CompositePublisher {
    publishers: Vec<Arc<dyn EventPublisher>>,
}

impl CompositePublisher {
    /// Build from a list of publishers.
    pub fn new(publishers: Vec<Arc<dyn EventPublisher>>) -> Self {
        Self { publishers }
    }
}

#[async_trait::async_trait]
impl EventPublisher for CompositePublisher {
    async fn publish(&self, event: TransactionStatusUpdated) -> anyhow::Result<()> {
        for publisher in &self.publishers {
            publisher.publish(event.clone()).await?;
        }
        Ok(())
    }
}
