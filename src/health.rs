//! Service health reporting for the /health probes.

use serde::Serialize;
use sqlx::PgPool;

use crate::storage;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: &'static str,
    pub state: HealthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub components: Vec<ComponentHealth>,
}

/// Checks the liveness of the service's dependencies.
#[derive(Clone)]
pub struct HealthChecker {
    pool: Option<PgPool>,
}

impl HealthChecker {
    pub fn new(pool: Option<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn check_health(&self) -> HealthStatus {
        let database = match &self.pool {
            Some(pool) => match storage::health_check(pool).await {
                Ok(()) => ComponentHealth {
                    name: "database",
                    state: HealthState::Healthy,
                    detail: None,
                },
                Err(e) => ComponentHealth {
                    name: "database",
                    state: HealthState::Unhealthy,
                    detail: Some(e.to_string()),
                },
            },
            None => ComponentHealth {
                name: "database",
                state: HealthState::Degraded,
                detail: Some("running on in-memory storage".to_string()),
            },
        };

        let status = match database.state {
            HealthState::Unhealthy => HealthState::Unhealthy,
            HealthState::Degraded => HealthState::Degraded,
            HealthState::Healthy => HealthState::Healthy,
        };

        HealthStatus {
            status,
            components: vec![database],
        }
    }
}
