//! Integration tests for the top-up job worker.

use std::sync::Arc;

use maxdigi::job::{top_up_worker, JobOutcome, JobState, RetryPolicy, TopUpJobSpec};
use maxdigi::{ApiClient, Config, Credentials};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(base_url: &str) -> Arc<ApiClient> {
    let config = Config::new(Credentials::new("user1", "key1").unwrap()).with_base_url(base_url);
    Arc::new(ApiClient::new(&config).unwrap())
}

#[tokio::test]
async fn failing_provider_terminates_job_after_exactly_one_attempt() {
    let server = MockServer::start().await;

    // expect(1) makes the mock server itself assert the no-retry policy.
    Mock::given(method("POST"))
        .and(path("/transaction"))
        .respond_with(
            ResponseTemplate::new(402)
                .set_body_json(json!({"data": {"message": "insufficient balance"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (queue, worker, mut reports) =
        top_up_worker(client_for(&server.uri()), RetryPolicy::default(), 8);
    let handle = tokio::spawn(worker.run());

    queue
        .enqueue(TopUpJobSpec::new("xld10", "08123456789", "trx-fail-1"))
        .await
        .unwrap();

    let report = reports.recv().await.expect("failure must be reported");
    assert_eq!(report.final_state(), JobState::Failed);
    assert_eq!(report.attempts, 1);
    match report.outcome {
        JobOutcome::Failed(err) => {
            assert_eq!(err.ref_id, "trx-fail-1");
            assert!(err.to_string().contains("insufficient balance"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    drop(queue);
    handle.await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn transport_failure_is_also_terminal_and_reported() {
    // Nothing listens here; every attempt fails at the transport layer.
    let (queue, worker, mut reports) = top_up_worker(
        client_for("http://127.0.0.1:9"),
        RetryPolicy::default(),
        8,
    );
    tokio::spawn(worker.run());

    queue
        .enqueue(TopUpJobSpec::new("xld10", "08123456789", "trx-fail-2"))
        .await
        .unwrap();

    let report = reports.recv().await.unwrap();
    assert_eq!(report.final_state(), JobState::Failed);
    assert_eq!(report.attempts, 1);
}

#[tokio::test]
async fn successful_transaction_reports_provider_result() {
    let server = MockServer::start().await;
    // Caller-generated idempotency key; the job passes it through untouched.
    let ref_id = format!("trx-{}", uuid::Uuid::new_v4());
    let data = json!({"ref_id": ref_id, "status": "Pending", "price": 10500});

    Mock::given(method("POST"))
        .and(path("/transaction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": data})))
        .expect(1)
        .mount(&server)
        .await;

    let (queue, worker, mut reports) =
        top_up_worker(client_for(&server.uri()), RetryPolicy::default(), 8);
    tokio::spawn(worker.run());

    queue
        .enqueue(TopUpJobSpec::new("xld10", "08123456789", ref_id.clone()))
        .await
        .unwrap();

    let report = reports.recv().await.unwrap();
    assert_eq!(report.final_state(), JobState::Succeeded);
    match report.outcome {
        JobOutcome::Succeeded(result) => assert_eq!(result, data),
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn worker_drains_jobs_in_enqueue_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transaction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"status": "ok"}})))
        .expect(3)
        .mount(&server)
        .await;

    let (queue, worker, mut reports) =
        top_up_worker(client_for(&server.uri()), RetryPolicy::default(), 8);
    tokio::spawn(worker.run());

    for i in 1..=3 {
        queue
            .enqueue(TopUpJobSpec::new("xld10", "08123456789", format!("trx-{i}")))
            .await
            .unwrap();
    }

    for i in 1..=3 {
        let report = reports.recv().await.unwrap();
        assert_eq!(report.spec.ref_id, format!("trx-{i}"));
    }
}

#[tokio::test]
async fn enqueue_fails_once_worker_is_gone() {
    let (queue, worker, _reports) = top_up_worker(
        client_for("http://127.0.0.1:9"),
        RetryPolicy::default(),
        1,
    );
    drop(worker);

    let err = queue
        .enqueue(TopUpJobSpec::new("xld10", "08123456789", "trx-x"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("closed"));
}
