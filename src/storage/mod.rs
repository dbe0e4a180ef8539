pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{error as log_error, info};

use self::error::StorageError;
use self::models::{NewTransaction, TerminalBinding, TransactionRecord};
use crate::config::DatabaseConfig;

/// Read access to the set of terminal bindings.
///
/// Implementations must return bindings for a shop in stable creation order;
/// the resolver's tie-break depends on it.
#[async_trait]
pub trait TerminalStore: Send + Sync {
    async fn find_by_shop_domain(
        &self,
        shop_domain: &str,
    ) -> Result<Vec<TerminalBinding>, StorageError>;
}

/// Persistence for the transaction ledger.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, new: NewTransaction) -> Result<TransactionRecord, StorageError>;

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<TransactionRecord>, StorageError>;

    /// Overwrite status/error/receipt with the latest gateway-reported truth.
    /// Returns `None` when no local row matches the gateway transaction id.
    async fn update_outcome(
        &self,
        transaction_id: &str,
        status: &str,
        error_msg: Option<&str>,
        receipt: Option<&str>,
    ) -> Result<Option<TransactionRecord>, StorageError>;

    async fn list_recent_by_shop(
        &self,
        shop_domain: &str,
        limit: i64,
    ) -> Result<Vec<TransactionRecord>, StorageError>;
}

/// Database pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            min_connections: 5,
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// Initialize the database connection pool
pub async fn init_pool(
    database_url: &str,
    config: Option<PoolConfig>,
) -> Result<PgPool, StorageError> {
    let config = config.unwrap_or_default();

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Initializing database pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connection_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(database_url)
        .await
        .map_err(|e| {
            log_error!("Failed to initialize database pool: {}", e);
            StorageError::from_sqlx(e)
        })?;

    pool.acquire().await.map_err(|e| {
        log_error!("Failed to acquire test connection: {}", e);
        StorageError::from_sqlx(e)
    })?;

    info!("Database pool initialized successfully");
    Ok(pool)
}

/// Connection pool health check
pub async fn health_check(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(StorageError::from_sqlx)?;
    Ok(())
}

/// Initialize the database pool from application configuration
pub async fn init_pool_from_config(config: &DatabaseConfig) -> Result<PgPool, StorageError> {
    let pool_config = PoolConfig {
        max_connections: config.max_connections,
        min_connections: config.min_connections,
        connection_timeout: Duration::from_secs(config.connection_timeout),
        idle_timeout: Duration::from_secs(config.idle_timeout.unwrap_or(600)),
    };

    init_pool(&config.url, Some(pool_config)).await
}
