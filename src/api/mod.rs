pub mod terminal;
pub mod webhooks;

use std::sync::Arc;

use crate::health::HealthChecker;
use crate::services::TerminalPaymentService;
use crate::storage::TransactionStore;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub payments: Arc<TerminalPaymentService>,
    pub transactions: Arc<dyn TransactionStore>,
    pub webhook_secret: Option<String>,
    pub health: HealthChecker,
}
