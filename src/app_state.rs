//! Application state shared across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;

use crate::auth::jwt::JwtService;
use crate::config::Config;
use crate::middleware::RateLimiter;
use crate::services;

/// Application state shared across handlers.
///
/// Every service is cheap to clone; the pool and the limiter state are
/// shared behind their own handles.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub db: sqlx::PgPool,
    /// Application configuration
    pub config: Config,
    /// JWT issuance and verification for bearer and session tokens
    pub jwt_service: JwtService,
    /// Bot registry CRUD and search
    pub bot_service: services::BotService,
    /// End-user authorization flows and session validation
    pub auth_service: services::AuthService,
    /// Mocked account data
    pub account_service: services::AccountService,
    /// Webhook subscriptions, inbound verification, outbound fan-out
    pub webhook_service: services::WebhookService,
    /// Liveness reporting
    pub health_checker: services::HealthChecker,
    /// Sliding-window request limiter
    pub rate_limiter: RateLimiter,
    /// Prometheus exposition handle
    pub metrics_handle: PrometheusHandle,
}
