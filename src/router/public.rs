//! Routes reachable without a bearer token.
//!
//! `public_routes` are exempt from rate limiting: health, metrics, the
//! Swagger UI, and the signed inbound webhook callback (its trust comes
//! from the signature, and throttling it would drop bank callbacks).
//! `open_routes` carry no bearer token but are rate limited: login, the
//! OAuth2 browser callback, and the session-token account endpoints.

use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app_state::AppState;
use crate::handlers::{accounts, auth, authorization, health, metrics, webhooks};
use crate::openapi::ApiDoc;

/// Routes exempt from rate limiting.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics))
        .route(
            "/api/v1/webhook/{webhook_id}",
            post(webhooks::inbound_webhook),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Rate-limited routes that carry no bearer token.
pub fn open_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/oauth/callback", get(authorization::oauth_callback))
        .route(
            "/api/v1/bots/{bot_id}/accounts",
            get(accounts::get_accounts),
        )
        .route(
            "/api/v1/bots/{bot_id}/accounts/{account_id}/balance",
            get(accounts::get_balance),
        )
        .route(
            "/api/v1/bots/{bot_id}/accounts/{account_id}/transactions",
            get(accounts::get_transactions),
        )
}
