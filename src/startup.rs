//! Application startup and initialization logic.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::app_state::AppState;
use crate::auth::jwt::JwtService;
use crate::config::Config;
use crate::database;
use crate::middleware::RateLimiter;
use crate::services;

/// Initialize all application services and create the AppState.
pub async fn initialize_app(config: &Config) -> Result<AppState> {
    info!("🚀 Starting bank bot gateway");

    // Initialize Prometheus metrics exporter
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    info!("✅ Prometheus metrics initialized");

    // Setup database connections
    let db_pool = database::setup_database(config).await?;
    info!("✅ PostgreSQL connection established");

    // Run database migrations
    database::run_migrations(&db_pool).await?;
    info!("✅ Database migrations completed");

    if config.load_sample_data {
        database::seed_sample_bots(&db_pool).await?;
        info!("✅ Sample bots seeded");
    }

    // Initialize token issuing
    let jwt_service = JwtService::new(&config.jwt_secret, &config.jwt_issuer, &config.jwt_audience);
    info!("✅ JWT service initialized");

    let bot_service = services::BotService::new(db_pool.clone());
    info!("✅ Bot registry service initialized");

    let auth_service = services::AuthService::new(db_pool.clone(), jwt_service.clone());
    info!("✅ End-user authorization service initialized");

    let account_service = services::AccountService::new();
    info!("✅ Account data service initialized");

    let webhook_service = services::WebhookService::new(
        db_pool.clone(),
        Duration::from_secs(config.webhook_delivery_timeout_secs),
    );
    info!(
        delivery_timeout_secs = config.webhook_delivery_timeout_secs,
        "✅ Webhook service initialized"
    );

    let health_checker = services::HealthChecker::new(db_pool.clone());
    info!("✅ Health checker initialized");

    let rate_limiter = RateLimiter::new(
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_secs),
    );
    info!(
        max_requests = config.rate_limit_max_requests,
        window_secs = config.rate_limit_window_secs,
        "✅ Rate limiter initialized"
    );

    Ok(AppState {
        db: db_pool,
        config: config.clone(),
        jwt_service,
        bot_service,
        auth_service,
        account_service,
        webhook_service,
        health_checker,
        rate_limiter,
        metrics_handle,
    })
}
