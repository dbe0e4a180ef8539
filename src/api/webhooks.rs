//! Storefront platform webhook intake.
//!
//! A single endpoint serves every compliance topic (customers/data_request,
//! customers/redact, shop/redact). The service retains no customer personal
//! data, so every verified notification is acknowledged with an empty body
//! regardless of topic. Verification failures are uniformly 401 with no
//! detail: the caller must not learn whether the secret is misconfigured or
//! the signature simply wrong.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};

use crate::api::AppState;
use crate::webhooks::verify_signature;

pub const SIGNATURE_HEADER: &str = "x-shopify-hmac-sha256";
pub const TOPIC_HEADER: &str = "x-shopify-topic";

/// POST /webhooks/shopify
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    if !verify_signature(&body, signature, state.webhook_secret.as_deref()) {
        warn!("webhook signature verification failed");
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "Unauthorized"})),
        );
    }

    let topic = headers
        .get(TOPIC_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    info!(topic = %topic, "webhook received");

    // No customer data is stored, so data-subject topics need no action
    // beyond acknowledgement.
    (StatusCode::OK, Json(serde_json::json!({})))
}
