use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("gateway request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("gateway returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("gateway request failed: {message}")]
    Network { message: String },

    #[error("invalid gateway response: {message}")]
    InvalidResponse { message: String },
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout { .. })
    }
}
