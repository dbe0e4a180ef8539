use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::env;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::gateway::error::{GatewayError, GatewayResult};
use crate::gateway::types::{GatewayStartReply, RawStatusReply};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Outbound contract to the in-store payments gateway.
///
/// Both operations are single-attempt: payment calls must not be silently
/// retried by a layer that cannot guarantee idempotence on the remote side.
/// Retry policy, if any, belongs to the POS caller. Demo terminal simulators
/// implement this same trait as test doubles.
#[async_trait]
pub trait TerminalGateway: Send + Sync {
    async fn start_transaction(
        &self,
        terminal_id: &str,
        api_key: &str,
        amount: i64,
    ) -> GatewayResult<GatewayStartReply>;

    async fn transaction_status(
        &self,
        terminal_id: &str,
        api_key: &str,
        transaction_id: &str,
    ) -> GatewayResult<RawStatusReply>;
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("TERMINAL_GATEWAY_BASE_URL")
            .map_err(|_| ConfigError::MissingVariable("TERMINAL_GATEWAY_BASE_URL".to_string()))?;
        let timeout_secs = env::var("TERMINAL_GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "TERMINAL_GATEWAY_BASE_URL cannot be empty".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "TERMINAL_GATEWAY_TIMEOUT_SECS cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP client for the gateway's in-store transaction API.
pub struct TerminalGatewayClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl TerminalGatewayClient {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Network {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        api_key: &str,
        form: &[(&str, &str)],
    ) -> GatewayResult<T> {
        let response = self
            .http
            .post(self.endpoint(path))
            .header("X-API-KEY", api_key)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    GatewayError::Network {
                        message: format!("gateway request failed: {}", e),
                    }
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<T>(&body).map_err(|e| GatewayError::InvalidResponse {
            message: format!("invalid gateway JSON response: {}", e),
        })
    }
}

#[async_trait]
impl TerminalGateway for TerminalGatewayClient {
    async fn start_transaction(
        &self,
        terminal_id: &str,
        api_key: &str,
        amount: i64,
    ) -> GatewayResult<GatewayStartReply> {
        debug!(terminal_id = %terminal_id, amount, "starting terminal transaction");
        let amount_field = amount.to_string();
        let reply: GatewayStartReply = self
            .post_form(
                "/instore/transactions/start",
                api_key,
                &[("terminal_id", terminal_id), ("amount", &amount_field)],
            )
            .await?;
        info!(transaction_id = %reply.transaction_id, "terminal transaction started");
        Ok(reply)
    }

    async fn transaction_status(
        &self,
        terminal_id: &str,
        api_key: &str,
        transaction_id: &str,
    ) -> GatewayResult<RawStatusReply> {
        debug!(transaction_id = %transaction_id, "checking terminal transaction status");
        self.post_form(
            "/instore/transactions/status",
            api_key,
            &[
                ("terminal_id", terminal_id),
                ("transaction_id", transaction_id),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_strips_trailing_slash_from_base_url() {
        let config = GatewayConfig {
            base_url: "https://gateway.test/V2/".to_string(),
            timeout: Duration::from_secs(30),
        };
        let client = TerminalGatewayClient::new(config).expect("client should build");
        assert_eq!(
            client.endpoint("/instore/transactions/start"),
            "https://gateway.test/V2/instore/transactions/start"
        );
    }

    #[test]
    fn config_validation_rejects_zero_timeout() {
        let config = GatewayConfig {
            base_url: "https://gateway.test".to_string(),
            timeout: Duration::from_secs(0),
        };
        assert!(config.validate().is_err());
    }
}
