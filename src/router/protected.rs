//! Routes that require a bearer token.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::app_state::AppState;
use crate::auth;
use crate::handlers::{authorization, bots, webhooks};
use crate::middleware;

/// Bearer-authenticated API surface. The rate limiter runs before the
/// token check so over-limit clients are rejected without a decode.
pub fn protected_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        // Bot registry
        .route("/api/v1/bots", post(bots::register_bot).get(bots::list_bots))
        .route("/api/v1/search/bots", get(bots::search_bots))
        .route(
            "/api/v1/bots/{bot_id}",
            get(bots::get_bot)
                .put(bots::update_bot)
                .delete(bots::delete_bot),
        )
        // End-user authorization
        .route(
            "/api/v1/bots/{bot_id}/authorize",
            post(authorization::authorize),
        )
        // Event ingress feeding the webhook dispatcher
        .route("/api/v1/bots/{bot_id}/events", post(webhooks::ingest_event))
        // Webhook subscriptions
        .route("/api/v1/webhooks", post(webhooks::register_webhook))
        .route(
            "/api/v1/bots/{bot_id}/webhooks",
            get(webhooks::list_bot_webhooks),
        )
        .route(
            "/api/v1/webhooks/{webhook_id}",
            get(webhooks::get_webhook).delete(webhooks::delete_webhook),
        )
        .layer(from_fn_with_state(
            app_state.clone(),
            auth::middleware::auth_middleware,
        ))
        .layer(from_fn_with_state(
            app_state,
            middleware::rate_limit_middleware,
        ))
}
