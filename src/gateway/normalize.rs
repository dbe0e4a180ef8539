//! Normalization of the gateway's status replies into one canonical outcome.
//!
//! Newer gateway API versions nest the true payment state in a `transaction`
//! object; the flat top-level `status` historically described whether the
//! API call itself succeeded, which is a different thing from the payment
//! outcome. The precedence here is therefore: `transaction` object first,
//! then the `data` envelope, then the flat fields as a backward-compatible
//! fallback.

use tracing::warn;

use crate::gateway::types::{PaymentOutcome, RawStatusReply, TerminalStatus};

/// Collapse a raw status reply into a canonical [`PaymentOutcome`].
///
/// An absent status means the terminal has not reported an outcome yet and
/// canonicalizes to `started`, same as the gateway's explicit `unknown`.
pub fn normalize(reply: &RawStatusReply) -> PaymentOutcome {
    let (raw_status, error_message, receipt) = if let Some(txn) = &reply.transaction {
        (txn.status.as_deref(), txn.error_msg.clone(), txn.receipt.clone())
    } else if let Some(data) = &reply.data {
        (data.status.as_deref(), None, None)
    } else {
        (
            reply.status.as_deref(),
            reply.error_msg.clone(),
            reply.receipt.clone(),
        )
    };

    let status = TerminalStatus::from_gateway(raw_status.unwrap_or("unknown"));
    if let TerminalStatus::Other(raw) = &status {
        warn!(status = %raw, "gateway reported an unrecognized transaction status");
    }

    PaymentOutcome {
        status,
        error_message,
        receipt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(value: serde_json::Value) -> RawStatusReply {
        serde_json::from_value(value).expect("reply should parse")
    }

    #[test]
    fn flat_shape_is_normalized() {
        let outcome = normalize(&reply(json!({
            "status": "success",
            "receipt": "=== RECEIPT ==="
        })));
        assert_eq!(outcome.status, TerminalStatus::Success);
        assert_eq!(outcome.receipt.as_deref(), Some("=== RECEIPT ==="));
        assert_eq!(outcome.error_message, None);
    }

    #[test]
    fn normalization_is_idempotent_on_canonical_flat_payloads() {
        for status in ["started", "success", "failed", "timeout"] {
            let outcome = normalize(&reply(json!({ "status": status })));
            assert_eq!(outcome.status.as_str(), status);
        }
    }

    #[test]
    fn nested_transaction_shape_wins_over_flat_fields() {
        let outcome = normalize(&reply(json!({
            "status": "success",
            "transaction": {
                "status": "failed",
                "errorMsg": "External Equipment Cancellation"
            }
        })));
        assert_eq!(outcome.status, TerminalStatus::Failed);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("External Equipment Cancellation")
        );
    }

    #[test]
    fn nested_transaction_shape_wins_over_data_envelope() {
        let outcome = normalize(&reply(json!({
            "transaction": { "status": "success" },
            "data": { "status": "failed" },
            "status": "failed"
        })));
        assert_eq!(outcome.status, TerminalStatus::Success);
    }

    #[test]
    fn data_envelope_wins_over_flat_fields() {
        let outcome = normalize(&reply(json!({
            "data": { "status": "failed" },
            "status": "success"
        })));
        assert_eq!(outcome.status, TerminalStatus::Failed);
    }

    #[test]
    fn unknown_nested_status_canonicalizes_to_started() {
        let outcome = normalize(&reply(json!({
            "transaction": { "status": "unknown" }
        })));
        assert_eq!(outcome.status, TerminalStatus::Started);
    }

    #[test]
    fn missing_status_canonicalizes_to_started() {
        let outcome = normalize(&reply(json!({})));
        assert_eq!(outcome.status, TerminalStatus::Started);
    }

    #[test]
    fn unrecognized_status_passes_through_unchanged() {
        let outcome = normalize(&reply(json!({ "status": "waiting" })));
        assert_eq!(outcome.status, TerminalStatus::Other("waiting".to_string()));
    }

    #[test]
    fn snake_case_error_field_is_accepted() {
        let outcome = normalize(&reply(json!({
            "transaction": { "status": "failed", "error_msg": "Kaart geweigerd" }
        })));
        assert_eq!(outcome.error_message.as_deref(), Some("Kaart geweigerd"));
    }
}
