//! Axum HTTP surface for the webhook endpoint.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http::{HeaderMap, StatusCode};
use serde_json::json;
use tracing::error;

use crate::webhook::events::{EventPublisher, TransactionStatusUpdated};
use crate::webhook::verifier::{WebhookOutcome, WebhookVerifier};

/// Route the provider is configured to call back.
pub const WEBHOOK_PATH: &str = "/api/maxdigi/webhook";

/// Header carrying the provider's HMAC signature.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

/// Shared state for the webhook handler.
pub struct WebhookState {
    verifier: WebhookVerifier,
    publisher: Arc<dyn EventPublisher>,
}

impl WebhookState {
    /// Bundle a verifier with the application's event publisher.
    pub fn new(verifier: WebhookVerifier, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            verifier,
            publisher,
        }
    }
}

/// Build the webhook router.
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(webhook_handler))
        .with_state(state)
}

/// Handle one webhook delivery.
///
/// The body is taken as raw bytes so the signature is computed over exactly
/// what arrived on the wire; parsing happens only after verification.
async fn webhook_handler(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature_header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match state.verifier.verify(&body, signature_header) {
        WebhookOutcome::Accepted(data) => {
            let event = TransactionStatusUpdated::new(data);
            // A failing publisher must not trigger provider redelivery; the
            // delivery itself was valid.
            if let Err(e) = state.publisher.publish(event).await {
                error!(error = %e, "Failed to publish transaction status event");
            }
            (
                StatusCode::OK,
                Json(json!({"message": "Webhook received successfully."})),
            )
                .into_response()
        }
        WebhookOutcome::Rejected(kind) => {
            let status =
                StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::FORBIDDEN);
            (status, Json(json!({"message": kind.message()}))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{format_signature_header, webhook_digest};
    use crate::webhook::events::BroadcastPublisher;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const SECRET: &str = "s3cr3t";

    fn router_with_publisher() -> (Router, BroadcastPublisher) {
        let publisher = BroadcastPublisher::new(8);
        let state = Arc::new(WebhookState::new(
            WebhookVerifier::new(Some(SECRET.to_string())),
            Arc::new(publisher.clone()),
        ));
        (webhook_router(state), publisher)
    }

    fn signed_request(body: &'static [u8]) -> Request<Body> {
        let header = format_signature_header(&webhook_digest(SECRET, body));
        Request::builder()
            .method("POST")
            .uri(WEBHOOK_PATH)
            .header(SIGNATURE_HEADER, header)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_delivery_returns_200_and_publishes_once() {
        let (router, publisher) = router_with_publisher();
        let mut rx = publisher.subscribe();

        let body = br#"{"data":{"ref_id":"trx-1","status":"Sukses"}}"#;
        let response = router.oneshot(signed_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.ref_id(), Some("trx-1"));
        assert!(rx.try_recv().is_err(), "exactly one event expected");
    }

    #[tokio::test]
    async fn test_missing_signature_returns_403() {
        let (router, _) = router_with_publisher();
        let request = Request::builder()
            .method("POST")
            .uri(WEBHOOK_PATH)
            .body(Body::from(r#"{"data":{"status":"ok"}}"#))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_signed_body_without_data_returns_400() {
        let (router, publisher) = router_with_publisher();
        let mut rx = publisher.subscribe();

        let response = router
            .oneshot(signed_request(br#"{"event":"ping"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(rx.try_recv().is_err(), "no event on rejection");
    }
}
