pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::{GatewayConfig, TerminalGateway, TerminalGatewayClient};
pub use error::{GatewayError, GatewayResult};
pub use normalize::normalize;
pub use types::{GatewayStartReply, PaymentOutcome, RawStatusReply, TerminalStatus};
