//! POS-facing terminal endpoints: start a transaction, poll its status,
//! list a shop's recent transactions.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::api::AppState;
use crate::error::AppError;
use crate::gateway::types::TerminalStatus;
use crate::middleware::error::get_request_id_from_headers;
use crate::routing::resolver::RoutingHints;
use crate::storage::models::TransactionRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTransactionRequest {
    #[serde(default)]
    pub shop_domain: Option<String>,
    /// Minor currency units. Accepted as a JSON integer or a numeric string;
    /// POS clients have been observed sending both.
    #[serde(default)]
    pub amount: Option<JsonValue>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub staff_member_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub shop_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTransactionResponse {
    pub success: bool,
    pub transaction_id: String,
    pub status: TerminalStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatusRequest {
    #[serde(default)]
    pub shop_domain: Option<String>,
    #[serde(default, alias = "transaction_id")]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub staff_member_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub shop_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatusResponse {
    pub success: bool,
    pub status: TerminalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
}

/// POST /api/terminal/start
pub async fn start_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<StartTransactionRequest>,
) -> Result<Json<StartTransactionResponse>, AppError> {
    let request_id = get_request_id_from_headers(&headers);
    let attach = |e: AppError| match &request_id {
        Some(id) => e.with_request_id(id.clone()),
        None => e,
    };

    let shop_domain = require_field(payload.shop_domain.as_deref(), "shopDomain").map_err(attach)?;
    let amount = parse_amount(payload.amount.as_ref()).map_err(attach)?;
    let hints = RoutingHints {
        location_id: payload.location_id,
        staff_member_id: payload.staff_member_id,
        user_id: payload.user_id,
        shop_id: payload.shop_id,
    };

    info!(shop_domain = %shop_domain, amount, "start transaction requested");

    let started = state
        .payments
        .start(&shop_domain, amount, &hints)
        .await
        .map_err(attach)?;

    Ok(Json(StartTransactionResponse {
        success: true,
        transaction_id: started.transaction_id,
        status: started.status,
    }))
}

/// POST /api/terminal/status
pub async fn get_transaction_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TransactionStatusRequest>,
) -> Result<Json<TransactionStatusResponse>, AppError> {
    let request_id = get_request_id_from_headers(&headers);
    let attach = |e: AppError| match &request_id {
        Some(id) => e.with_request_id(id.clone()),
        None => e,
    };

    let shop_domain = require_field(payload.shop_domain.as_deref(), "shopDomain").map_err(attach)?;
    let transaction_id =
        require_field(payload.transaction_id.as_deref(), "transactionId").map_err(attach)?;
    let hints = RoutingHints {
        location_id: payload.location_id,
        staff_member_id: payload.staff_member_id,
        user_id: payload.user_id,
        shop_id: payload.shop_id,
    };

    info!(transaction_id = %transaction_id, "transaction status requested");

    let outcome = state
        .payments
        .check_status(&shop_domain, &transaction_id, &hints)
        .await
        .map_err(attach)?;

    Ok(Json(TransactionStatusResponse {
        success: true,
        status: outcome.status,
        error_msg: outcome.error_message,
        receipt: outcome.receipt,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    #[serde(default)]
    pub shop: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub id: String,
    pub transaction_id: String,
    pub amount: i64,
    pub amount_display: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_member_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListResponse {
    pub success: bool,
    pub transactions: Vec<TransactionSummary>,
    pub count: usize,
}

const RECENT_TRANSACTIONS_LIMIT: i64 = 50;

/// GET /api/terminal/transactions?shop=acme.example-shops.com
///
/// Recent transactions for the embedded merchant dashboard, newest first.
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, AppError> {
    let shop = require_field(query.shop.as_deref(), "shop")?;

    let records = state
        .transactions
        .list_recent_by_shop(&shop, RECENT_TRANSACTIONS_LIMIT)
        .await?;

    let transactions: Vec<TransactionSummary> =
        records.into_iter().map(summarize_transaction).collect();
    let count = transactions.len();

    Ok(Json(TransactionListResponse {
        success: true,
        transactions,
        count,
    }))
}

fn summarize_transaction(record: TransactionRecord) -> TransactionSummary {
    TransactionSummary {
        id: record.id.to_string(),
        transaction_id: record.transaction_id,
        amount: record.amount,
        amount_display: format!("€{:.2}", record.amount as f64 / 100.0),
        status: record.status,
        created_at: record.created_at,
        location_id: record.location_id,
        staff_member_id: record.staff_member_id,
    }
}

fn require_field(value: Option<&str>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(AppError::missing_field(field)),
    }
}

fn parse_amount(value: Option<&JsonValue>) -> Result<i64, AppError> {
    let value = value.ok_or_else(|| AppError::missing_field("amount"))?;
    let amount = match value {
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| AppError::invalid_amount("amount must be an integer"))?,
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::invalid_amount("amount must be an integer"))?,
        _ => return Err(AppError::invalid_amount("amount must be an integer")),
    };

    if amount <= 0 {
        return Err(AppError::invalid_amount(
            "amount must be greater than zero",
        ));
    }
    Ok(amount)
}
