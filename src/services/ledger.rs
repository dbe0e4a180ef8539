//! Transaction ledger: the locally persisted record of each payment
//! attempt's last known state.
//!
//! The remote terminal is the source of truth for payment outcomes. Local
//! bookkeeping failures are therefore logged and swallowed during status
//! reconciliation: a missing or unwritable row must never block returning
//! the remote status to the caller.

use std::sync::Arc;
use tracing::{info, warn};

use crate::gateway::types::{PaymentOutcome, TerminalStatus};
use crate::routing::resolver::RoutingHints;
use crate::storage::error::StorageError;
use crate::storage::models::{NewTransaction, TerminalBinding, TransactionRecord};
use crate::storage::TransactionStore;

pub struct TransactionLedger {
    store: Arc<dyn TransactionStore>,
}

impl TransactionLedger {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Record a freshly started transaction.
    ///
    /// Called only after the gateway accepted the start call, so a gateway
    /// failure leaves no partial row behind.
    pub async fn record_start(
        &self,
        transaction_id: &str,
        binding: &TerminalBinding,
        amount: i64,
        hints: &RoutingHints,
    ) -> Result<TransactionRecord, StorageError> {
        let record = self
            .store
            .insert(NewTransaction {
                transaction_id: transaction_id.to_string(),
                binding_id: Some(binding.id),
                amount,
                status: TerminalStatus::Started.as_str().to_string(),
                shop_domain: binding.shop_domain.clone(),
                location_id: hints.location_id.clone(),
                staff_member_id: hints.staff_member_id.clone(),
            })
            .await?;
        info!(
            transaction_id = %record.transaction_id,
            amount,
            "transaction recorded"
        );
        Ok(record)
    }

    /// Overwrite the local row with the latest gateway-reported outcome.
    ///
    /// A transaction id unknown to local storage is a warning, not an error:
    /// the update is skipped and the caller still gets the remote status.
    pub async fn apply_status(&self, transaction_id: &str, outcome: &PaymentOutcome) {
        let result = self
            .store
            .update_outcome(
                transaction_id,
                outcome.status.as_str(),
                outcome.error_message.as_deref(),
                outcome.receipt.as_deref(),
            )
            .await;

        match result {
            Ok(Some(record)) => {
                info!(
                    transaction_id = %transaction_id,
                    status = %record.status,
                    "transaction updated"
                );
            }
            Ok(None) => {
                warn!(
                    transaction_id = %transaction_id,
                    "transaction not found in local ledger, skipping update"
                );
            }
            Err(e) => {
                warn!(
                    transaction_id = %transaction_id,
                    error = %e,
                    "ledger update failed, remote status still returned"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryTransactionStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn binding() -> TerminalBinding {
        TerminalBinding {
            id: Uuid::new_v4(),
            shop_domain: "acme.example-shops.com".to_string(),
            terminal_id: "T1".to_string(),
            api_key: "key".to_string(),
            location_id: None,
            staff_member_id: None,
            user_id: None,
            shop_id: None,
            demo: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn record_start_creates_a_started_row_with_denormalized_hints() {
        let store = Arc::new(MemoryTransactionStore::new());
        let ledger = TransactionLedger::new(store.clone());
        let hints = RoutingHints {
            location_id: Some("loc-9".to_string()),
            ..RoutingHints::default()
        };

        let record = ledger
            .record_start("2405102", &binding(), 1500, &hints)
            .await
            .expect("record should succeed");

        assert_eq!(record.status, "started");
        assert_eq!(record.amount, 1500);
        assert_eq!(record.location_id.as_deref(), Some("loc-9"));
        assert_eq!(record.shop_domain, "acme.example-shops.com");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn apply_status_overwrites_with_latest_gateway_truth() {
        let store = Arc::new(MemoryTransactionStore::new());
        let ledger = TransactionLedger::new(store.clone());
        ledger
            .record_start("2405102", &binding(), 1500, &RoutingHints::default())
            .await
            .expect("record should succeed");

        ledger
            .apply_status(
                "2405102",
                &PaymentOutcome {
                    status: TerminalStatus::Success,
                    error_message: None,
                    receipt: Some("=== RECEIPT ===".to_string()),
                },
            )
            .await;

        let record = store
            .find_by_transaction_id("2405102")
            .await
            .expect("lookup should succeed")
            .expect("row should exist");
        assert_eq!(record.status, "success");
        assert_eq!(record.receipt.as_deref(), Some("=== RECEIPT ==="));
    }

    #[tokio::test]
    async fn apply_status_on_unknown_id_writes_nothing_and_does_not_panic() {
        let store = Arc::new(MemoryTransactionStore::new());
        let ledger = TransactionLedger::new(store.clone());

        ledger
            .apply_status(
                "never-seen",
                &PaymentOutcome {
                    status: TerminalStatus::Success,
                    error_message: None,
                    receipt: None,
                },
            )
            .await;

        assert!(store.is_empty());
    }
}
