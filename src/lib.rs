//! Backend bridging storefront POS sessions to physical card-payment
//! terminals through a third-party in-store payments gateway.
//!
//! The POS client starts a transaction, then polls the status endpoint until
//! the terminal reports a final outcome; there is no background polling in
//! the service itself. Terminal selection, gateway access, status
//! normalization and ledger reconciliation live in [`routing`], [`gateway`],
//! and [`services`]; [`webhooks`] guards the storefront notification intake.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod routing;
pub mod services;
pub mod storage;
pub mod webhooks;
