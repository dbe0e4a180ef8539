use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::{error, info, warn};

use terminal_bridge::api::{self, AppState};
use terminal_bridge::config::AppConfig;
use terminal_bridge::gateway::{TerminalGateway, TerminalGatewayClient};
use terminal_bridge::health::{HealthChecker, HealthState, HealthStatus};
use terminal_bridge::logging::init_tracing;
use terminal_bridge::middleware::logging::{request_logging_middleware, UuidRequestId};
use terminal_bridge::routing::TerminalResolver;
use terminal_bridge::services::{TerminalPaymentService, TransactionLedger};
use terminal_bridge::storage::memory::{MemoryTerminalStore, MemoryTransactionStore};
use terminal_bridge::storage::postgres::{PgTerminalStore, PgTransactionStore};
use terminal_bridge::storage::{init_pool_from_config, TerminalStore, TransactionStore};

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;
    init_tracing(&config.logging);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        gateway = %config.gateway.base_url,
        "🚀 Starting terminal-bridge service"
    );

    // Storage: Postgres when configured, in-memory otherwise.
    let (pool, terminal_store, transaction_store): (
        Option<sqlx::PgPool>,
        Arc<dyn TerminalStore>,
        Arc<dyn TransactionStore>,
    ) = match &config.database {
        Some(db_config) => {
            let pool = init_pool_from_config(db_config).await.map_err(|e| {
                error!("Failed to initialize database pool: {}", e);
                anyhow::anyhow!(e)
            })?;
            info!("✅ Database connection pool initialized");
            (
                Some(pool.clone()),
                Arc::new(PgTerminalStore::new(pool.clone())),
                Arc::new(PgTransactionStore::new(pool)),
            )
        }
        None => {
            warn!("DATABASE_URL not set, running on in-memory storage");
            let terminals = MemoryTerminalStore::new();
            seed_demo_binding(&terminals);
            (
                None,
                Arc::new(terminals),
                Arc::new(MemoryTransactionStore::new()),
            )
        }
    };

    let gateway: Arc<dyn TerminalGateway> = Arc::new(
        TerminalGatewayClient::new(config.gateway.clone())
            .map_err(|e| anyhow::anyhow!("failed to initialize gateway client: {e}"))?,
    );

    let payments = Arc::new(TerminalPaymentService::new(
        TerminalResolver::new(terminal_store),
        gateway,
        TransactionLedger::new(transaction_store.clone()),
    ));

    let state = AppState {
        payments,
        transactions: transaction_store,
        webhook_secret: config.webhook.shared_secret.clone(),
        health: HealthChecker::new(pool),
    };

    if state.webhook_secret.is_none() {
        warn!("SHOPIFY_API_SECRET not set, all inbound webhooks will be rejected");
    }

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/health/live", get(liveness))
        .route("/api/terminal/start", post(api::terminal::start_transaction))
        .route(
            "/api/terminal/status",
            post(api::terminal::get_transaction_status),
        )
        .route(
            "/api/terminal/transactions",
            get(api::terminal::list_transactions),
        )
        .route("/webhooks/shopify", post(api::webhooks::handle_webhook))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(axum::middleware::from_fn(request_logging_middleware))
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to address {}: {}", addr, e);
        e
    })?;

    info!(address = %addr, "✅ Server is ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Provision one terminal binding from DEMO_* variables so the in-memory
/// mode can route requests against a gateway sandbox out of the box.
fn seed_demo_binding(terminals: &MemoryTerminalStore) {
    let (Ok(shop_domain), Ok(terminal_id), Ok(api_key)) = (
        std::env::var("DEMO_SHOP_DOMAIN"),
        std::env::var("DEMO_TERMINAL_ID"),
        std::env::var("DEMO_API_KEY"),
    ) else {
        return;
    };

    terminals.add_binding(
        &shop_domain,
        &terminal_id,
        &api_key,
        None,
        None,
        None,
        None,
        true,
    );
    info!(shop_domain = %shop_domain, terminal_id = %terminal_id, "seeded demo terminal binding");
}

// Handlers

async fn root() -> &'static str {
    "terminal-bridge is running"
}

async fn health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, (axum::http::StatusCode, String)> {
    let health_status = state.health.check_health().await;

    if matches!(health_status.status, HealthState::Unhealthy) {
        error!("Health check failed - service unhealthy");
        Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable".to_string(),
        ))
    } else {
        Ok(Json(health_status))
    }
}

/// Readiness probe - checks if the service is ready to accept traffic
async fn readiness(
    state: State<AppState>,
) -> Result<Json<HealthStatus>, (axum::http::StatusCode, String)> {
    health(state).await
}

/// Liveness probe - checks if the service is alive
async fn liveness() -> &'static str {
    "OK"
}
