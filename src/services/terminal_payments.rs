//! Orchestration of the two POS request flows: start a terminal transaction
//! and reconcile its status.

use std::sync::Arc;
use tracing::{error, info};

use crate::error::AppResult;
use crate::gateway::normalize::normalize;
use crate::gateway::types::{PaymentOutcome, TerminalStatus};
use crate::gateway::TerminalGateway;
use crate::routing::resolver::{RoutingHints, TerminalResolver};
use crate::services::ledger::TransactionLedger;

/// Result of a successful start flow.
#[derive(Debug, Clone)]
pub struct StartedTransaction {
    pub transaction_id: String,
    pub status: TerminalStatus,
}

pub struct TerminalPaymentService {
    resolver: TerminalResolver,
    gateway: Arc<dyn TerminalGateway>,
    ledger: TransactionLedger,
}

impl TerminalPaymentService {
    pub fn new(
        resolver: TerminalResolver,
        gateway: Arc<dyn TerminalGateway>,
        ledger: TransactionLedger,
    ) -> Self {
        Self {
            resolver,
            gateway,
            ledger,
        }
    }

    /// Start a payment on the terminal resolved for this shop.
    ///
    /// The ledger row is created only after the gateway accepts the start
    /// call; a gateway failure leaves no partial row.
    pub async fn start(
        &self,
        shop_domain: &str,
        amount: i64,
        hints: &RoutingHints,
    ) -> AppResult<StartedTransaction> {
        let binding = self.resolver.resolve(shop_domain, hints).await?;

        let reply = self
            .gateway
            .start_transaction(&binding.terminal_id, &binding.api_key, amount)
            .await
            .map_err(|e| {
                error!(
                    shop_domain = %shop_domain,
                    terminal_id = %binding.terminal_id,
                    error = %e,
                    "gateway start call failed"
                );
                e
            })?;

        self.ledger
            .record_start(&reply.transaction_id, &binding, amount, hints)
            .await?;

        info!(
            shop_domain = %shop_domain,
            transaction_id = %reply.transaction_id,
            amount,
            "transaction started"
        );

        Ok(StartedTransaction {
            transaction_id: reply.transaction_id,
            status: TerminalStatus::Started,
        })
    }

    /// Poll the terminal for a transaction's current status and reconcile
    /// the local ledger with it.
    ///
    /// A transaction id unknown to local storage is not an error: the
    /// terminal remains the source of truth and its status is returned
    /// regardless of local bookkeeping.
    pub async fn check_status(
        &self,
        shop_domain: &str,
        transaction_id: &str,
        hints: &RoutingHints,
    ) -> AppResult<PaymentOutcome> {
        let binding = self.resolver.resolve(shop_domain, hints).await?;

        let reply = self
            .gateway
            .transaction_status(&binding.terminal_id, &binding.api_key, transaction_id)
            .await
            .map_err(|e| {
                error!(
                    shop_domain = %shop_domain,
                    transaction_id = %transaction_id,
                    error = %e,
                    "gateway status call failed"
                );
                e
            })?;

        let outcome = normalize(&reply);
        self.ledger.apply_status(transaction_id, &outcome).await;

        info!(
            transaction_id = %transaction_id,
            status = %outcome.status,
            "transaction status reconciled"
        );
        Ok(outcome)
    }
}
