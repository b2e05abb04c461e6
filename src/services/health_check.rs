use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;

/// Liveness report for the gateway and its database dependency.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub timestamp: i64,
    pub uptime_seconds: u64,
    pub database: DependencyHealth,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DependencyHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct HealthChecker {
    start_time: Arc<Instant>,
    db: PgPool,
}

impl HealthChecker {
    pub fn new(db: PgPool) -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            db,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub async fn status(&self) -> HealthStatus {
        let database = self.check_database().await;
        let status = if database.status == "healthy" {
            "healthy"
        } else {
            "degraded"
        };

        HealthStatus {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().timestamp(),
            uptime_seconds: self.uptime_seconds(),
            database,
        }
    }

    async fn check_database(&self) -> DependencyHealth {
        let start = Instant::now();

        match sqlx::query("SELECT 1").fetch_one(&self.db).await {
            Ok(_) => DependencyHealth {
                status: "healthy".to_string(),
                response_time_ms: Some(start.elapsed().as_millis() as u64),
                error: None,
            },
            Err(e) => DependencyHealth {
                status: "unhealthy".to_string(),
                response_time_ms: Some(start.elapsed().as_millis() as u64),
                error: Some(e.to_string()),
            },
        }
    }
}
