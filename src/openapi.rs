use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bank Bots API",
        version = "1.0.0",
        description = "Gateway for bank-bot registration, end-user authorization, \
                       account data and signed webhooks",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        // Health & metrics
        crate::handlers::health::health_check,
        crate::handlers::metrics::metrics,

        // Authentication
        crate::handlers::auth::login,

        // Bot registry
        crate::handlers::bots::register_bot,
        crate::handlers::bots::list_bots,
        crate::handlers::bots::search_bots,
        crate::handlers::bots::get_bot,
        crate::handlers::bots::update_bot,
        crate::handlers::bots::delete_bot,

        // Authorization flows
        crate::handlers::authorization::authorize,
        crate::handlers::authorization::oauth_callback,

        // Account data
        crate::handlers::accounts::get_accounts,
        crate::handlers::accounts::get_balance,
        crate::handlers::accounts::get_transactions,

        // Webhooks
        crate::handlers::webhooks::register_webhook,
        crate::handlers::webhooks::get_webhook,
        crate::handlers::webhooks::list_bot_webhooks,
        crate::handlers::webhooks::delete_webhook,
        crate::handlers::webhooks::inbound_webhook,
        crate::handlers::webhooks::ingest_event,
    ),
    components(schemas(
        crate::error::ErrorBody,

        crate::services::health_check::HealthStatus,
        crate::services::health_check::DependencyHealth,

        crate::auth::LoginRequest,
        crate::auth::TokenResponse,

        crate::models::bot::BotAuthType,
        crate::models::bot::BotCredentials,
        crate::models::bot::BotRegistrationRequest,
        crate::models::bot::BotUpdateRequest,
        crate::models::bot::BotResponse,
        crate::models::bot::BotListItem,
        crate::models::bot::BotListResponse,
        crate::handlers::bots::BotSearchResponse,

        crate::models::session::LoginPasswordAuthRequest,
        crate::models::session::ApiKeyAuthRequest,
        crate::models::session::AuthorizeResponse,

        crate::models::account::Account,
        crate::models::account::AccountBalance,
        crate::models::account::Transaction,

        crate::models::webhook::WebhookEvent,
        crate::models::webhook::WebhookRegistration,
        crate::models::webhook::WebhookResponse,
        crate::models::webhook::WebhookInfo,
        crate::models::webhook::WebhookPayload,
        crate::handlers::webhooks::EventIngressRequest,
        crate::handlers::webhooks::EventAccepted,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "metrics", description = "Prometheus exposition"),
        (name = "auth", description = "API client authentication"),
        (name = "bots", description = "Bank bot registry"),
        (name = "authorization", description = "End-user authorization flows"),
        (name = "accounts", description = "Account data for authorized sessions"),
        (name = "webhooks", description = "Webhook subscriptions and signed delivery"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Bearer token from /api/v1/auth/login"))
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builds_and_lists_routes() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/api/v1/auth/login"));
        assert!(doc.paths.paths.contains_key("/api/v1/bots"));
        assert!(doc.paths.paths.contains_key("/api/v1/webhook/{webhook_id}"));
        assert!(doc.paths.paths.contains_key("/api/v1/bots/{bot_id}/events"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
