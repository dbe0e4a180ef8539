use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One physical payment terminal assigned to a shop context.
///
/// Uniqueness is deliberately not enforced: several bindings may share a
/// shop domain and the resolver disambiguates between them. The core never
/// mutates bindings; they are provisioned administratively.
#[derive(Debug, Clone, FromRow)]
pub struct TerminalBinding {
    pub id: Uuid,
    pub shop_domain: String,
    pub terminal_id: String,
    pub api_key: String,
    pub location_id: Option<String>,
    pub staff_member_id: Option<String>,
    pub user_id: Option<String>,
    pub shop_id: Option<String>,
    pub demo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Locally persisted record of one payment attempt.
///
/// `binding_id` is a weak reference: deleting the binding nulls it out
/// instead of cascading, and shop_domain/location/staff are denormalized
/// here so the audit trail survives binding changes.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub transaction_id: String,
    pub binding_id: Option<Uuid>,
    pub amount: i64,
    pub status: String,
    pub error_msg: Option<String>,
    pub receipt: Option<String>,
    pub shop_domain: String,
    pub location_id: Option<String>,
    pub staff_member_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a freshly started transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_id: String,
    pub binding_id: Option<Uuid>,
    pub amount: i64,
    pub status: String,
    pub shop_domain: String,
    pub location_id: Option<String>,
    pub staff_member_id: Option<String>,
}
