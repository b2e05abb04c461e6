use axum::{extract::Request, middleware::Next, response::Response};
use metrics::{counter, gauge, histogram};
use std::time::Instant;
use uuid::Uuid;

/// Tracks request count, latency and status per normalized route.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());
    let start = Instant::now();

    counter!("http_requests_total", "method" => method.to_string(), "path" => path.clone())
        .increment(1);
    gauge!("http_requests_in_flight").increment(1.0);

    let response = next.run(request).await;

    let status = response.status();
    let duration = start.elapsed();

    gauge!("http_requests_in_flight").decrement(1.0);
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.clone(),
        "status" => status.as_u16().to_string()
    )
    .record(duration.as_secs_f64());

    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);

    if status.is_server_error() {
        counter!(
            "http_errors_total",
            "method" => method.to_string(),
            "path" => path,
            "status" => status.as_u16().to_string()
        )
        .increment(1);
    }

    response
}

/// Collapses per-entity path segments so metric label cardinality stays
/// bounded. UUID segments become `{id}`; the free-form account segment
/// becomes `{account_id}`.
fn normalize_path(path: &str) -> String {
    let mut normalized: Vec<String> = Vec::new();
    let mut previous = "";

    for segment in path.split('/') {
        let replaced = if segment.is_empty() {
            String::new()
        } else if Uuid::parse_str(segment).is_ok() {
            "{id}".to_string()
        } else if previous == "accounts" {
            "{account_id}".to_string()
        } else {
            segment.to_string()
        };
        previous = segment;
        normalized.push(replaced);
    }

    normalized.join("/")
}

/// Track login attempts against the client credential pair.
pub fn track_auth_attempt(success: bool) {
    counter!("auth_attempts_total", "success" => success.to_string()).increment(1);
}

/// Track end-user authorization flow dispatches per auth type.
pub fn track_authorization(auth_type: &str, success: bool) {
    counter!(
        "bot_authorizations_total",
        "auth_type" => auth_type.to_string(),
        "success" => success.to_string()
    )
    .increment(1);
}

/// Track outbound webhook delivery outcomes per event.
pub fn track_webhook_delivery(event: &str, outcome: &str) {
    counter!(
        "webhook_deliveries_total",
        "event" => event.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Track inbound webhook verification outcomes.
pub fn track_webhook_inbound(outcome: &str) {
    counter!("webhook_inbound_total", "outcome" => outcome.to_string()).increment(1);
}

/// Track requests rejected by the rate limiter.
pub fn track_rate_limit_hit() {
    counter!("rate_limit_hits_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_uuid_segments() {
        let path = format!("/api/v1/bots/{}/webhooks", Uuid::new_v4());
        assert_eq!(normalize_path(&path), "/api/v1/bots/{id}/webhooks");
    }

    #[test]
    fn test_normalize_collapses_account_segment() {
        let path = format!("/api/v1/bots/{}/accounts/acc-001/balance", Uuid::new_v4());
        assert_eq!(
            normalize_path(&path),
            "/api/v1/bots/{id}/accounts/{account_id}/balance"
        );
    }

    #[test]
    fn test_normalize_leaves_static_paths() {
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/api/v1/bots"), "/api/v1/bots");
    }
}
