//! Asynchronous top-up transaction execution.
//!
//! A [`TopUpJobSpec`] is built once at enqueue time and never mutated; a
//! background [`TopUpWorker`] consumes specs from an mpsc queue, invokes
//! [`ApiClient::transact`] once per job, and reports the terminal outcome on
//! a channel the application supervises. Failures are never swallowed: every
//! job ends in exactly one [`JobReport`].
//!
//! # Retry policy
//!
//! The worker carries a [`RetryPolicy`] (3 attempts, 60/120/180s backoff by
//! default) but does not act on it: provider/business errors are not
//! transient, and the upstream behavior this crate mirrors fails the job on
//! the first attempt for transport errors as well. The policy is logged at
//! startup and exposed for callers that decide to schedule their own
//! re-enqueues.
//!
//! # Architecture
//!
//! ```text
//! caller -> TopUpQueue::enqueue -> [mpsc] -> TopUpWorker::run
//!                                                |
//!                                                v
//!                                     ApiClient::transact (once)
//!                                          |          |
//!                                          v          v
//!                                 JobReport::Succeeded  JobReport::Failed
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::client::ApiClient;
use crate::error::{ApiError, JobError};
use crate::metrics::global_metrics;

/// Immutable description of one top-up transaction.
///
/// `ref_id` is the caller-supplied idempotency key; the job never generates
/// or rewrites it, and repeated enqueues with the same `ref_id` rely on the
/// provider's own dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopUpJobSpec {
    /// Product SKU to purchase
    pub sku_code: String,
    /// Destination customer number
    pub customer_no: String,
    /// Caller-supplied unique transaction reference
    pub ref_id: String,
}

impl TopUpJobSpec {
    /// Build a spec.
    pub fn new(
        sku_code: impl Into<String>,
        customer_no: impl Into<String>,
        ref_id: impl Into<String>,
    ) -> Self {
        Self {
            sku_code: sku_code.into(),
            customer_no: customer_no.into(),
            ref_id: ref_id.into(),
        }
    }
}

/// Declared retry schedule for top-up jobs.
///
/// Kept configurable for callers; the worker itself terminates every job on
/// the first failed attempt (see module docs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts a job may consume
    pub max_attempts: u32,
    /// Wait before each retry; the last entry repeats if attempts exceed it
    pub backoff: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: vec![
                Duration::from_secs(60),
                Duration::from_secs(120),
                Duration::from_secs(180),
            ],
        }
    }
}

impl RetryPolicy {
    /// Backoff to wait before the given attempt (1-based). Attempt 1 has no
    /// backoff; attempts beyond the schedule reuse the last entry. `None`
    /// once `max_attempts` is exhausted.
    pub fn backoff_before(&self, attempt: u32) -> Option<Duration> {
        if attempt <= 1 || attempt > self.max_attempts {
            return None;
        }
        let index = (attempt - 2) as usize;
        self.backoff
            .get(index)
            .or_else(|| self.backoff.last())
            .copied()
    }
}

/// Lifecycle states of a top-up job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Enqueued, not yet picked up
    Pending,
    /// Attempt in flight
    Running,
    /// Waiting for a scheduled retry (unreached through normal failure paths)
    Retrying,
    /// Terminal success
    Succeeded,
    /// Terminal failure
    Failed,
}

/// Terminal outcome of one job.
#[derive(Debug)]
pub enum JobOutcome {
    /// The provider accepted the transaction; carries its `data` object
    Succeeded(Value),
    /// The job failed terminally
    Failed(JobError),
}

/// What the worker reports back for every consumed job.
#[derive(Debug)]
pub struct JobReport {
    /// The spec that was executed
    pub spec: TopUpJobSpec,
    /// Attempts consumed (always 1 under the current failure policy)
    pub attempts: u32,
    /// Terminal outcome
    pub outcome: JobOutcome,
}

impl JobReport {
    /// Final state of the job.
    pub fn final_state(&self) -> JobState {
        match self.outcome {
            JobOutcome::Succeeded(_) => JobState::Succeeded,
            JobOutcome::Failed(_) => JobState::Failed,
        }
    }
}

/// Enqueue handle for top-up jobs.
#[derive(Debug, Clone)]
pub struct TopUpQueue {
    tx: mpsc::Sender<TopUpJobSpec>,
}

impl TopUpQueue {
    /// Enqueue one job. Fails only when the worker has shut down.
    pub async fn enqueue(&self, spec: TopUpJobSpec) -> anyhow::Result<()> {
        self.tx
            .send(spec)
            .await
            .map_err(|e| anyhow::anyhow!("top-up queue is closed: {e}"))
    }
}

/// Background worker draining the top-up queue.
pub struct TopUpWorker {
    client: Arc<ApiClient>,
    policy: RetryPolicy,
    rx: mpsc::Receiver<TopUpJobSpec>,
    reports: mpsc::Sender<JobReport>,
}

/// Wire up a queue/worker pair with a supervision channel.
///
/// Spawn the worker (`tokio::spawn(worker.run())`), hold the queue for
/// enqueuing, and drain the report receiver to observe outcomes.
pub fn top_up_worker(
    client: Arc<ApiClient>,
    policy: RetryPolicy,
    capacity: usize,
) -> (TopUpQueue, TopUpWorker, mpsc::Receiver<JobReport>) {
    let (tx, rx) = mpsc::channel(capacity);
    let (report_tx, report_rx) = mpsc::channel(capacity);

    let queue = TopUpQueue { tx };
    let worker = TopUpWorker {
        client,
        policy,
        rx,
        reports: report_tx,
    };
    (queue, worker, report_rx)
}

impl TopUpWorker {
    /// Run until the queue closes. One job at a time; parallelism comes from
    /// running multiple workers, each owning its own receiver.
    pub async fn run(mut self) {
        info!(
            max_attempts = self.policy.max_attempts,
            backoff = ?self.policy.backoff,
            "Starting top-up worker"
        );

        while let Some(spec) = self.rx.recv().await {
            let report = execute_job(&self.client, spec).await;

            match report.final_state() {
                JobState::Succeeded => global_metrics().inc_jobs_succeeded(),
                _ => global_metrics().inc_jobs_failed(),
            }

            if self.reports.send(report).await.is_err() {
                warn!("Job report channel closed; supervisor is gone");
            }
        }

        info!("Top-up worker shutting down");
    }
}

/// Execute one job: a single transact call, terminal either way.
async fn execute_job(client: &ApiClient, spec: TopUpJobSpec) -> JobReport {
    match client
        .transact(&spec.sku_code, &spec.customer_no, &spec.ref_id)
        .await
    {
        Ok(result) => {
            info!(ref_id = %spec.ref_id, result = %result, "Top-up transaction processed");
            JobReport {
                spec,
                attempts: 1,
                outcome: JobOutcome::Succeeded(result),
            }
        }
        Err(err) => {
            // Provider errors (insufficient balance, invalid SKU) are not
            // transient; retrying wastes attempts and can duplicate side
            // effects at the provider. Transport errors terminate too,
            // keeping the failure path uniform.
            match &err {
                ApiError::Provider { status, message } => error!(
                    ref_id = %spec.ref_id,
                    status,
                    %message,
                    "Top-up transaction failed (provider error)"
                ),
                other => error!(
                    ref_id = %spec.ref_id,
                    error = %other,
                    "Unexpected error while processing top-up transaction"
                ),
            }
            let ref_id = spec.ref_id.clone();
            JobReport {
                spec,
                attempts: 1,
                outcome: JobOutcome::Failed(JobError {
                    ref_id,
                    source: err,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_policy_matches_declared_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(
            policy.backoff,
            vec![
                Duration::from_secs(60),
                Duration::from_secs(120),
                Duration::from_secs(180)
            ]
        );
    }

    #[test]
    fn test_backoff_before_first_attempt_is_none() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_before(1), None);
    }

    #[test]
    fn test_backoff_escalates_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_before(2), Some(Duration::from_secs(60)));
        assert_eq!(policy.backoff_before(3), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_backoff_exhausted_past_max_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_before(4), None);
    }

    #[test]
    fn test_backoff_reuses_last_entry_for_short_schedules() {
        let policy = RetryPolicy {
            max_attempts: 5,
            backoff: vec![Duration::from_secs(10)],
        };
        assert_eq!(policy.backoff_before(4), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_spec_is_value_comparable() {
        let a = TopUpJobSpec::new("xld10", "08123456789", "trx-1");
        let b = TopUpJobSpec::new("xld10", "08123456789", "trx-1");
        assert_eq!(a, b);
    }
}
