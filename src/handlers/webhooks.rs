// Webhook subscription management, the signed inbound callback, and
// the event ingress that feeds the outbound dispatcher.

use axum::{
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::{ApiError, Result};
use crate::models::{WebhookEvent, WebhookInfo, WebhookRegistration, WebhookResponse};

/// A bank-side event pushed into the gateway for fan-out.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventIngressRequest {
    #[schema(example = "acc-001")]
    pub account_id: String,

    pub event: WebhookEvent,

    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventAccepted {
    pub status: String,
}

/// Register a webhook subscription
///
/// The response is the only place the generated secret appears.
#[utoipa::path(
    post,
    path = "/api/v1/webhooks",
    tag = "webhooks",
    security(("bearer_auth" = [])),
    request_body = WebhookRegistration,
    responses(
        (status = 201, description = "Subscription created, secret included", body = WebhookResponse),
        (status = 400, description = "Invalid event or URL"),
        (status = 404, description = "Unknown bot")
    )
)]
pub async fn register_webhook(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WebhookRegistration>, JsonRejection>,
) -> Result<(StatusCode, Json<WebhookResponse>)> {
    let Json(registration) = payload?;

    registration
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Invalid webhook registration: {}", e)))?;

    let webhook = state.webhook_service.register(registration).await?;
    Ok((StatusCode::CREATED, Json(webhook)))
}

/// List a bot's webhook subscriptions
#[utoipa::path(
    get,
    path = "/api/v1/bots/{bot_id}/webhooks",
    tag = "webhooks",
    security(("bearer_auth" = [])),
    params(("bot_id" = Uuid, Path, description = "Bot id")),
    responses(
        (status = 200, description = "Subscriptions, secrets omitted", body = [WebhookInfo])
    )
)]
pub async fn list_bot_webhooks(
    State(state): State<AppState>,
    Path(bot_id): Path<Uuid>,
) -> Result<Json<Vec<WebhookInfo>>> {
    let webhooks = state.webhook_service.list_for_bot(bot_id).await?;
    Ok(Json(webhooks))
}

/// Fetch one webhook subscription
#[utoipa::path(
    get,
    path = "/api/v1/webhooks/{webhook_id}",
    tag = "webhooks",
    security(("bearer_auth" = [])),
    params(("webhook_id" = Uuid, Path, description = "Webhook id")),
    responses(
        (status = 200, description = "Subscription, secret omitted", body = WebhookInfo),
        (status = 404, description = "Unknown webhook")
    )
)]
pub async fn get_webhook(
    State(state): State<AppState>,
    Path(webhook_id): Path<Uuid>,
) -> Result<Json<WebhookInfo>> {
    let webhook = state.webhook_service.get(webhook_id).await?;
    Ok(Json(webhook))
}

/// Delete a webhook subscription
#[utoipa::path(
    delete,
    path = "/api/v1/webhooks/{webhook_id}",
    tag = "webhooks",
    security(("bearer_auth" = [])),
    params(("webhook_id" = Uuid, Path, description = "Webhook id")),
    responses(
        (status = 204, description = "Subscription deleted"),
        (status = 404, description = "Unknown webhook")
    )
)]
pub async fn delete_webhook(
    State(state): State<AppState>,
    Path(webhook_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.webhook_service.delete(webhook_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Signed inbound callback
///
/// Trust is established by the `X-Signature` HMAC over the raw body,
/// never by a token. Unknown webhook ids are indistinguishable from bad
/// signatures.
#[utoipa::path(
    post,
    path = "/api/v1/webhook/{webhook_id}",
    tag = "webhooks",
    params(
        ("webhook_id" = Uuid, Path, description = "Webhook id"),
        ("X-Signature" = String, Header, description = "Lowercase-hex HMAC-SHA256 of the raw body")
    ),
    request_body = Vec<u8>,
    responses(
        (status = 200, description = "Payload verified and accepted"),
        (status = 400, description = "Missing signature header or malformed payload"),
        (status = 401, description = "Signature verification failed")
    )
)]
pub async fn inbound_webhook(
    State(state): State<AppState>,
    Path(webhook_id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let signature = headers
        .get("X-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("X-Signature header is required".to_string()))?;

    state
        .webhook_service
        .verify_and_process(webhook_id, signature, &body)
        .await?;

    Ok(StatusCode::OK)
}

/// Ingest a banking event and fan it out
///
/// Delivery runs on a spawned task; the caller gets 202 without waiting
/// on subscriber I/O.
#[utoipa::path(
    post,
    path = "/api/v1/bots/{bot_id}/events",
    tag = "webhooks",
    security(("bearer_auth" = [])),
    params(("bot_id" = Uuid, Path, description = "Bot id")),
    request_body = EventIngressRequest,
    responses(
        (status = 202, description = "Event accepted for delivery", body = EventAccepted),
        (status = 400, description = "Unknown event tag"),
        (status = 404, description = "Unknown bot")
    )
)]
pub async fn ingest_event(
    State(state): State<AppState>,
    Path(bot_id): Path<Uuid>,
    payload: std::result::Result<Json<EventIngressRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EventAccepted>)> {
    let Json(request) = payload?;

    if !state.bot_service.exists(bot_id).await? {
        return Err(ApiError::NotFound(format!(
            "Bot not found with ID: {}",
            bot_id
        )));
    }

    let webhook_service = state.webhook_service.clone();
    tokio::spawn(async move {
        if let Err(e) = webhook_service
            .trigger(bot_id, &request.account_id, request.event, request.data)
            .await
        {
            error!(bot_id = %bot_id, error = %e, "Webhook fan-out failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(EventAccepted {
            status: "accepted".to_string(),
        }),
    ))
}
