pub mod ledger;
pub mod terminal_payments;

pub use ledger::TransactionLedger;
pub use terminal_payments::{StartedTransaction, TerminalPaymentService};
