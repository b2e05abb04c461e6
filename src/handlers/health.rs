use axum::{extract::State, response::Json};

use crate::AppState;
use crate::services::health_check::HealthStatus;

/// Liveness check with a database ping
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Gateway health report", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.health_checker.status().await)
}
