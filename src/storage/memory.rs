//! In-memory implementations of the storage ports.
//!
//! Used when the service runs without DATABASE_URL (local demos against the
//! gateway sandbox) and as the backing store for the test suite. Row order is
//! insertion order, which satisfies the stable-ordering contract the
//! resolver relies on.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;
use uuid::Uuid;

use crate::storage::error::StorageError;
use crate::storage::models::{NewTransaction, TerminalBinding, TransactionRecord};
use crate::storage::{TerminalStore, TransactionStore};

#[derive(Default)]
pub struct MemoryTerminalStore {
    bindings: RwLock<Vec<TerminalBinding>>,
}

impl MemoryTerminalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a binding, assigning id and timestamps.
    pub fn add_binding(
        &self,
        shop_domain: &str,
        terminal_id: &str,
        api_key: &str,
        location_id: Option<&str>,
        staff_member_id: Option<&str>,
        user_id: Option<&str>,
        shop_id: Option<&str>,
        demo: bool,
    ) -> TerminalBinding {
        let now = Utc::now();
        let binding = TerminalBinding {
            id: Uuid::new_v4(),
            shop_domain: shop_domain.to_string(),
            terminal_id: terminal_id.to_string(),
            api_key: api_key.to_string(),
            location_id: location_id.map(str::to_string),
            staff_member_id: staff_member_id.map(str::to_string),
            user_id: user_id.map(str::to_string),
            shop_id: shop_id.map(str::to_string),
            demo,
            created_at: now,
            updated_at: now,
        };
        self.bindings
            .write()
            .expect("binding store lock poisoned")
            .push(binding.clone());
        binding
    }
}

#[async_trait]
impl TerminalStore for MemoryTerminalStore {
    async fn find_by_shop_domain(
        &self,
        shop_domain: &str,
    ) -> Result<Vec<TerminalBinding>, StorageError> {
        let bindings = self.bindings.read().expect("binding store lock poisoned");
        Ok(bindings
            .iter()
            .filter(|b| b.shop_domain == shop_domain)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryTransactionStore {
    transactions: RwLock<Vec<TransactionRecord>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.transactions
            .read()
            .expect("transaction store lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn insert(&self, new: NewTransaction) -> Result<TransactionRecord, StorageError> {
        let now = Utc::now();
        let record = TransactionRecord {
            id: Uuid::new_v4(),
            transaction_id: new.transaction_id,
            binding_id: new.binding_id,
            amount: new.amount,
            status: new.status,
            error_msg: None,
            receipt: None,
            shop_domain: new.shop_domain,
            location_id: new.location_id,
            staff_member_id: new.staff_member_id,
            created_at: now,
            updated_at: now,
        };
        self.transactions
            .write()
            .expect("transaction store lock poisoned")
            .push(record.clone());
        Ok(record)
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<TransactionRecord>, StorageError> {
        let transactions = self
            .transactions
            .read()
            .expect("transaction store lock poisoned");
        Ok(transactions
            .iter()
            .rev()
            .find(|t| t.transaction_id == transaction_id)
            .cloned())
    }

    async fn update_outcome(
        &self,
        transaction_id: &str,
        status: &str,
        error_msg: Option<&str>,
        receipt: Option<&str>,
    ) -> Result<Option<TransactionRecord>, StorageError> {
        let mut transactions = self
            .transactions
            .write()
            .expect("transaction store lock poisoned");
        let record = transactions
            .iter_mut()
            .rev()
            .find(|t| t.transaction_id == transaction_id);

        Ok(record.map(|t| {
            t.status = status.to_string();
            t.error_msg = error_msg.map(str::to_string);
            t.receipt = receipt.map(str::to_string);
            t.updated_at = Utc::now();
            t.clone()
        }))
    }

    async fn list_recent_by_shop(
        &self,
        shop_domain: &str,
        limit: i64,
    ) -> Result<Vec<TransactionRecord>, StorageError> {
        let transactions = self
            .transactions
            .read()
            .expect("transaction store lock poisoned");
        Ok(transactions
            .iter()
            .rev()
            .filter(|t| t.shop_domain == shop_domain)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bindings_come_back_in_insertion_order() {
        let store = MemoryTerminalStore::new();
        store.add_binding("acme.example-shops.com", "T1", "k1", None, None, None, None, false);
        store.add_binding("acme.example-shops.com", "T2", "k2", None, None, None, None, false);
        store.add_binding("other.example-shops.com", "T3", "k3", None, None, None, None, false);

        let bindings = store
            .find_by_shop_domain("acme.example-shops.com")
            .await
            .expect("lookup should succeed");
        let ids: Vec<&str> = bindings.iter().map(|b| b.terminal_id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2"]);
    }

    #[tokio::test]
    async fn update_outcome_overwrites_status_error_and_receipt() {
        let store = MemoryTransactionStore::new();
        store
            .insert(NewTransaction {
                transaction_id: "2405102".to_string(),
                binding_id: None,
                amount: 1500,
                status: "started".to_string(),
                shop_domain: "acme.example-shops.com".to_string(),
                location_id: None,
                staff_member_id: None,
            })
            .await
            .expect("insert should succeed");

        let updated = store
            .update_outcome("2405102", "failed", Some("declined"), None)
            .await
            .expect("update should succeed")
            .expect("row should exist");
        assert_eq!(updated.status, "failed");
        assert_eq!(updated.error_msg.as_deref(), Some("declined"));
        assert_eq!(updated.receipt, None);
    }

    #[tokio::test]
    async fn update_outcome_on_unknown_id_is_none() {
        let store = MemoryTransactionStore::new();
        let updated = store
            .update_outcome("missing", "success", None, None)
            .await
            .expect("update should succeed");
        assert!(updated.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn recent_transactions_are_newest_first_and_limited() {
        let store = MemoryTransactionStore::new();
        for i in 0..4 {
            store
                .insert(NewTransaction {
                    transaction_id: format!("txn-{}", i),
                    binding_id: None,
                    amount: 100 + i,
                    status: "started".to_string(),
                    shop_domain: "acme.example-shops.com".to_string(),
                    location_id: None,
                    staff_member_id: None,
                })
                .await
                .expect("insert should succeed");
        }

        let recent = store
            .list_recent_by_shop("acme.example-shops.com", 2)
            .await
            .expect("list should succeed");
        let ids: Vec<&str> = recent.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["txn-3", "txn-2"]);
    }
}
