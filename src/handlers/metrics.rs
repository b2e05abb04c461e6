// Prometheus exposition endpoint.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::AppState;

/// Prometheus metrics
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "metrics",
    responses(
        (status = 200, description = "Prometheus exposition format", content_type = "text/plain")
    )
)]
pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics_handle.render();

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
