//! Postgres-backed implementations of the storage ports.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::storage::error::StorageError;
use crate::storage::models::{NewTransaction, TerminalBinding, TransactionRecord};
use crate::storage::{TerminalStore, TransactionStore};

pub struct PgTerminalStore {
    pool: PgPool,
}

impl PgTerminalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TerminalStore for PgTerminalStore {
    async fn find_by_shop_domain(
        &self,
        shop_domain: &str,
    ) -> Result<Vec<TerminalBinding>, StorageError> {
        sqlx::query_as::<_, TerminalBinding>(
            "SELECT id, shop_domain, terminal_id, api_key, location_id, staff_member_id,
                    user_id, shop_id, demo, created_at, updated_at
             FROM terminal_bindings
             WHERE shop_domain = $1
             ORDER BY created_at ASC, id ASC",
        )
        .bind(shop_domain)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from_sqlx)
    }
}

pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn insert(&self, new: NewTransaction) -> Result<TransactionRecord, StorageError> {
        sqlx::query_as::<_, TransactionRecord>(
            "INSERT INTO transactions
             (transaction_id, binding_id, amount, status, shop_domain, location_id, staff_member_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, transaction_id, binding_id, amount, status, error_msg, receipt,
                       shop_domain, location_id, staff_member_id, created_at, updated_at",
        )
        .bind(&new.transaction_id)
        .bind(new.binding_id)
        .bind(new.amount)
        .bind(&new.status)
        .bind(&new.shop_domain)
        .bind(&new.location_id)
        .bind(&new.staff_member_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::from_sqlx)
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<TransactionRecord>, StorageError> {
        sqlx::query_as::<_, TransactionRecord>(
            "SELECT id, transaction_id, binding_id, amount, status, error_msg, receipt,
                    shop_domain, location_id, staff_member_id, created_at, updated_at
             FROM transactions
             WHERE transaction_id = $1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::from_sqlx)
    }

    async fn update_outcome(
        &self,
        transaction_id: &str,
        status: &str,
        error_msg: Option<&str>,
        receipt: Option<&str>,
    ) -> Result<Option<TransactionRecord>, StorageError> {
        sqlx::query_as::<_, TransactionRecord>(
            "UPDATE transactions
             SET status = $2, error_msg = $3, receipt = $4, updated_at = now()
             WHERE transaction_id = $1
             RETURNING id, transaction_id, binding_id, amount, status, error_msg, receipt,
                       shop_domain, location_id, staff_member_id, created_at, updated_at",
        )
        .bind(transaction_id)
        .bind(status)
        .bind(error_msg)
        .bind(receipt)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::from_sqlx)
    }

    async fn list_recent_by_shop(
        &self,
        shop_domain: &str,
        limit: i64,
    ) -> Result<Vec<TransactionRecord>, StorageError> {
        sqlx::query_as::<_, TransactionRecord>(
            "SELECT id, transaction_id, binding_id, amount, status, error_msg, receipt,
                    shop_domain, location_id, staff_member_id, created_at, updated_at
             FROM transactions
             WHERE shop_domain = $1
             ORDER BY created_at DESC
             LIMIT $2",
        )
        .bind(shop_domain)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from_sqlx)
    }
}
