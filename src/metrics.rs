//! Lightweight counters for maxdigi observability.
//!
//! Atomic counters only; no exporter. Webhook rejections are split by kind so
//! signature failures (a security signal) are distinguishable from malformed
//! payloads (a client-input problem) in logs and dashboards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use serde::Serialize;

/// Process-wide counters, thread-safe via atomics.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Outbound API requests attempted
    api_requests_total: AtomicU64,
    /// Outbound API requests that ended in an error
    api_errors_total: AtomicU64,
    /// Webhooks accepted and published
    webhook_accepted_total: AtomicU64,
    /// Webhooks rejected for a missing/invalid signature
    webhook_rejected_signature_total: AtomicU64,
    /// Webhooks rejected for a missing `data` payload
    webhook_rejected_payload_total: AtomicU64,
    /// Top-up jobs that completed successfully
    jobs_succeeded_total: AtomicU64,
    /// Top-up jobs that failed terminally
    jobs_failed_total: AtomicU64,
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Outbound API requests attempted
    pub api_requests_total: u64,
    /// Outbound API requests that ended in an error
    pub api_errors_total: u64,
    /// Webhooks accepted and published
    pub webhook_accepted_total: u64,
    /// Webhooks rejected for a missing/invalid signature
    pub webhook_rejected_signature_total: u64,
    /// Webhooks rejected for a missing `data` payload
    pub webhook_rejected_payload_total: u64,
    /// Top-up jobs that completed successfully
    pub jobs_succeeded_total: u64,
    /// Top-up jobs that failed terminally
    pub jobs_failed_total: u64,
}

impl Metrics {
    fn new() -> Self {
        Self::default()
    }

    /// Record an outbound API request.
    pub fn inc_api_requests(&self) {
        self.api_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an outbound API error.
    pub fn inc_api_errors(&self) {
        self.api_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted webhook.
    pub fn inc_webhook_accepted(&self) {
        self.webhook_accepted_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a webhook rejected for signature reasons.
    pub fn inc_webhook_rejected_signature(&self) {
        self.webhook_rejected_signature_total
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a webhook rejected for a missing payload.
    pub fn inc_webhook_rejected_payload(&self) {
        self.webhook_rejected_payload_total
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful top-up job.
    pub fn inc_jobs_succeeded(&self) {
        self.jobs_succeeded_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a terminally failed top-up job.
    pub fn inc_jobs_failed(&self) {
        self.jobs_failed_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            api_requests_total: self.api_requests_total.load(Ordering::Relaxed),
            api_errors_total: self.api_errors_total.load(Ordering::Relaxed),
            webhook_accepted_total: self.webhook_accepted_total.load(Ordering::Relaxed),
            webhook_rejected_signature_total: self
                .webhook_rejected_signature_total
                .load(Ordering::Relaxed),
            webhook_rejected_payload_total: self
                .webhook_rejected_payload_total
                .load(Ordering::Relaxed),
            jobs_succeeded_total: self.jobs_succeeded_total.load(Ordering::Relaxed),
            jobs_failed_total: self.jobs_failed_total.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Global metrics instance.
pub fn global_metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}
