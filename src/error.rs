//! Unified error handling.
//!
//! One `AppError` covers the whole request path with HTTP status mapping,
//! machine-readable codes and user-facing messages. Validation problems are
//! caller-fixable and never logged as operational faults; gateway problems
//! map to 502 and are only ever retried by the POS caller, never here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gateway::error::GatewayError;
use crate::routing::resolver::ResolveError;
use crate::storage::error::StorageError;

/// Machine-readable error codes for client handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
    #[serde(rename = "NO_TERMINAL_FOUND")]
    NoTerminalFound,
    #[serde(rename = "GATEWAY_ERROR")]
    GatewayError,
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

/// Input validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Required field missing
    MissingField { field: String },
    /// Amount is not a positive integer number of minor currency units
    InvalidAmount { reason: String },
}

/// Terminal resolution errors
#[derive(Debug, Clone)]
pub enum ResolutionError {
    /// No binding exists for the shop; upstream misconfiguration
    NoTerminalForShop { shop_domain: String },
}

/// External service errors (the payments gateway)
#[derive(Debug, Clone)]
pub enum ExternalError {
    Gateway { message: String, timed_out: bool },
}

/// Infrastructure-level errors
#[derive(Debug, Clone)]
pub enum InfrastructureError {
    Database { message: String },
}

/// Unified application error type
#[derive(Debug, Clone)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AppErrorKind {
    Validation(ValidationError),
    Resolution(ResolutionError),
    External(ExternalError),
    Infrastructure(InfrastructureError),
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(AppErrorKind::Validation(ValidationError::MissingField {
            field: field.to_string(),
        }))
    }

    pub fn invalid_amount(reason: &str) -> Self {
        Self::new(AppErrorKind::Validation(ValidationError::InvalidAmount {
            reason: reason.to_string(),
        }))
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> u16 {
        match &self.kind {
            AppErrorKind::Validation(_) => 400,
            AppErrorKind::Resolution(_) => 404,
            AppErrorKind::External(_) => 502,
            AppErrorKind::Infrastructure(_) => 500,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> ErrorCode {
        match &self.kind {
            AppErrorKind::Validation(_) => ErrorCode::ValidationError,
            AppErrorKind::Resolution(_) => ErrorCode::NoTerminalFound,
            AppErrorKind::External(_) => ErrorCode::GatewayError,
            AppErrorKind::Infrastructure(InfrastructureError::Database { .. }) => {
                ErrorCode::DatabaseError
            }
        }
    }

    /// User-facing error message. Gateway and infrastructure details never
    /// leak to the caller.
    pub fn user_message(&self) -> String {
        match &self.kind {
            AppErrorKind::Validation(err) => match err {
                ValidationError::MissingField { field } => format!("{} is required", field),
                ValidationError::InvalidAmount { reason } => {
                    format!("invalid amount: {}", reason)
                }
            },
            AppErrorKind::Resolution(ResolutionError::NoTerminalForShop { .. }) => {
                "No matching terminal found".to_string()
            }
            AppErrorKind::External(ExternalError::Gateway { .. }) => {
                "Payment terminal unavailable".to_string()
            }
            AppErrorKind::Infrastructure(_) => "Internal server error".to_string(),
        }
    }

    /// Whether the POS caller may usefully retry the same request.
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            AppErrorKind::Validation(_) => false,
            AppErrorKind::Resolution(_) => false,
            AppErrorKind::External(_) => true,
            AppErrorKind::Infrastructure(_) => true,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AppErrorKind::Validation(err) => write!(f, "validation error: {:?}", err),
            AppErrorKind::Resolution(ResolutionError::NoTerminalForShop { shop_domain }) => {
                write!(f, "no terminal bound to shop {}", shop_domain)
            }
            AppErrorKind::External(ExternalError::Gateway { message, .. }) => {
                write!(f, "gateway error: {}", message)
            }
            AppErrorKind::Infrastructure(InfrastructureError::Database { message }) => {
                write!(f, "database error: {}", message)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let timed_out = err.is_timeout();
        AppError::new(AppErrorKind::External(ExternalError::Gateway {
            message: err.to_string(),
            timed_out,
        }))
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::new(AppErrorKind::Infrastructure(
            InfrastructureError::Database {
                message: err.to_string(),
            },
        ))
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NoTerminalForShop { shop_domain } => AppError::new(
                AppErrorKind::Resolution(ResolutionError::NoTerminalForShop { shop_domain }),
            ),
            ResolveError::Storage(storage) => storage.into(),
        }
    }
}

/// Result type for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        assert_eq!(AppError::missing_field("shopDomain").status_code(), 400);
        assert_eq!(
            AppError::new(AppErrorKind::Resolution(
                ResolutionError::NoTerminalForShop {
                    shop_domain: "acme.example-shops.com".to_string()
                }
            ))
            .status_code(),
            404
        );
        assert_eq!(
            AppError::from(GatewayError::Timeout { seconds: 30 }).status_code(),
            502
        );
        assert_eq!(
            AppError::from(StorageError::Query {
                message: "boom".to_string()
            })
            .status_code(),
            500
        );
    }

    #[test]
    fn gateway_timeout_maps_to_generic_unavailable_message() {
        let err = AppError::from(GatewayError::Timeout { seconds: 30 });
        assert_eq!(err.user_message(), "Payment terminal unavailable");
        assert_eq!(err.error_code(), ErrorCode::GatewayError);
        assert!(err.is_retryable());
    }

    #[test]
    fn resolution_error_converts_to_not_found() {
        let err = AppError::from(ResolveError::NoTerminalForShop {
            shop_domain: "acme.example-shops.com".to_string(),
        });
        assert_eq!(err.error_code(), ErrorCode::NoTerminalFound);
        assert_eq!(err.user_message(), "No matching terminal found");
        assert!(!err.is_retryable());
    }

    #[test]
    fn internal_details_do_not_leak_to_the_caller() {
        let err = AppError::from(StorageError::Query {
            message: "relation \"transactions\" does not exist".to_string(),
        });
        assert_eq!(err.user_message(), "Internal server error");
    }
}
