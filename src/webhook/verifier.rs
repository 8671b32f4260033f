//! Webhook authenticity verification.

use serde_json::Value;
use tracing::{debug, warn};

use crate::metrics::global_metrics;
use crate::signature;

/// Why a webhook delivery was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectKind {
    /// Secret unset, header missing, or digest mismatch. Maps to 403.
    InvalidSignature,
    /// Signature verified but the body carries no usable `data`. Maps to 400.
    MissingData,
}

impl RejectKind {
    /// HTTP status code equivalent for this rejection.
    pub fn status_code(&self) -> u16 {
        match self {
            RejectKind::InvalidSignature => 403,
            RejectKind::MissingData => 400,
        }
    }

    /// Response message sent back to the provider.
    pub fn message(&self) -> &'static str {
        match self {
            RejectKind::InvalidSignature => "Invalid signature.",
            RejectKind::MissingData => "No data received.",
        }
    }
}

/// Result of verifying one webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Delivery verified; carries the `data` payload verbatim.
    Accepted(Value),
    /// Delivery rejected; never retried within this request.
    Rejected(RejectKind),
}

impl WebhookOutcome {
    /// Whether the delivery was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, WebhookOutcome::Accepted(_))
    }
}

/// Verifies inbound webhook deliveries against the shared secret.
///
/// Stateless per call; one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    secret: Option<String>,
}

impl WebhookVerifier {
    /// Create a verifier. With no secret configured, every delivery is
    /// rejected as an invalid signature; verification is never attempted
    /// against an empty secret.
    pub fn new(secret: Option<String>) -> Self {
        let secret = secret.filter(|s| !s.is_empty());
        Self { secret }
    }

    /// Verify one delivery: raw body bytes plus the `X-Hub-Signature` value.
    pub fn verify(&self, raw_body: &[u8], signature_header: Option<&str>) -> WebhookOutcome {
        let metrics = global_metrics();

        let Some(secret) = self.secret.as_deref() else {
            warn!("Webhook rejected: no shared secret configured");
            metrics.inc_webhook_rejected_signature();
            return WebhookOutcome::Rejected(RejectKind::InvalidSignature);
        };
        let Some(header) = signature_header else {
            warn!("Webhook rejected: missing X-Hub-Signature header");
            metrics.inc_webhook_rejected_signature();
            return WebhookOutcome::Rejected(RejectKind::InvalidSignature);
        };
        if raw_body.is_empty() {
            warn!("Webhook rejected: empty body");
            metrics.inc_webhook_rejected_signature();
            return WebhookOutcome::Rejected(RejectKind::InvalidSignature);
        }

        if !signature::verify_signature_header(secret, raw_body, header) {
            warn!("Webhook rejected: signature mismatch");
            metrics.inc_webhook_rejected_signature();
            return WebhookOutcome::Rejected(RejectKind::InvalidSignature);
        }

        // Signature checked out; from here on failures are client-input
        // problems, not security ones.
        let data = serde_json::from_slice::<Value>(raw_body)
            .ok()
            .and_then(|body| body.get("data").cloned());

        match data {
            Some(data) if !data.is_null() => {
                debug!("Webhook verified");
                metrics.inc_webhook_accepted();
                WebhookOutcome::Accepted(data)
            }
            _ => {
                warn!("Webhook rejected: body has no data field");
                metrics.inc_webhook_rejected_payload();
                WebhookOutcome::Rejected(RejectKind::MissingData)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{format_signature_header, webhook_digest};
    use serde_json::json;

    const SECRET: &str = "s3cr3t";

    fn signed_header(body: &[u8]) -> String {
        format_signature_header(&webhook_digest(SECRET, body))
    }

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(Some(SECRET.to_string()))
    }

    #[test]
    fn test_accepts_valid_delivery_with_verbatim_data() {
        let body = br#"{"data":{"ref_id":"trx-1","status":"Sukses"}}"#;
        let outcome = verifier().verify(body, Some(&signed_header(body)));
        assert_eq!(
            outcome,
            WebhookOutcome::Accepted(json!({"ref_id": "trx-1", "status": "Sukses"}))
        );
    }

    #[test]
    fn test_rejects_when_secret_unset() {
        let body = br#"{"data":{"status":"ok"}}"#;
        let verifier = WebhookVerifier::new(None);
        let outcome = verifier.verify(body, Some(&signed_header(body)));
        assert_eq!(outcome, WebhookOutcome::Rejected(RejectKind::InvalidSignature));
    }

    #[test]
    fn test_rejects_empty_secret_without_verifying() {
        let body = br#"{"data":{"status":"ok"}}"#;
        let verifier = WebhookVerifier::new(Some(String::new()));
        // Header signed with the empty secret must still be rejected.
        let header = format_signature_header(&webhook_digest("", body));
        let outcome = verifier.verify(body, Some(&header));
        assert_eq!(outcome, WebhookOutcome::Rejected(RejectKind::InvalidSignature));
    }

    #[test]
    fn test_rejects_missing_header() {
        let body = br#"{"data":{"status":"ok"}}"#;
        let outcome = verifier().verify(body, None);
        assert_eq!(outcome, WebhookOutcome::Rejected(RejectKind::InvalidSignature));
    }

    #[test]
    fn test_rejects_empty_body() {
        let outcome = verifier().verify(b"", Some("sha1=whatever"));
        assert_eq!(outcome, WebhookOutcome::Rejected(RejectKind::InvalidSignature));
    }

    #[test]
    fn test_rejects_tampered_body() {
        let body = br#"{"data":{"ref_id":"trx-1","status":"Sukses"}}"#;
        let header = signed_header(body);
        let mut tampered = body.to_vec();
        let last = tampered.len() - 3;
        tampered[last] ^= 0x01;
        let outcome = verifier().verify(&tampered, Some(&header));
        assert_eq!(outcome, WebhookOutcome::Rejected(RejectKind::InvalidSignature));
    }

    #[test]
    fn test_rejects_signed_body_without_data() {
        let body = br#"{"event":"ping"}"#;
        let outcome = verifier().verify(body, Some(&signed_header(body)));
        assert_eq!(outcome, WebhookOutcome::Rejected(RejectKind::MissingData));
    }

    #[test]
    fn test_rejects_signed_body_with_null_data() {
        let body = br#"{"data":null}"#;
        let outcome = verifier().verify(body, Some(&signed_header(body)));
        assert_eq!(outcome, WebhookOutcome::Rejected(RejectKind::MissingData));
    }

    #[test]
    fn test_reject_kinds_map_to_distinct_statuses() {
        assert_eq!(RejectKind::InvalidSignature.status_code(), 403);
        assert_eq!(RejectKind::MissingData.status_code(), 400);
    }
}
