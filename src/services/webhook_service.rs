// Webhook subscriptions and signed delivery.
//
// Outbound path: a banking event is serialized once, signed per
// subscriber with that subscriber's secret, and POSTed with the hex
// MAC in `X-Signature`. Inbound path: the raw received bytes are
// verified against the stored secret before the payload is parsed.

use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use rand::RngCore;
use rand::rngs::OsRng;
use reqwest::Client;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::middleware::metrics::{track_webhook_delivery, track_webhook_inbound};
use crate::models::{
    WebhookEvent, WebhookInfo, WebhookPayload, WebhookRecord, WebhookRegistration, WebhookResponse,
};
use crate::utils::signature;

/// Upper bound on simultaneous outbound deliveries per trigger.
const DELIVERY_CONCURRENCY: usize = 8;

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct WebhookService {
    db: PgPool,
    client: Client,
}

impl WebhookService {
    pub fn new(db: PgPool, delivery_timeout: Duration) -> Self {
        // A client without the delivery timeout must never be used; the
        // builder only fails on TLS backend misconfiguration, which is a
        // startup-time programming error.
        let client = Client::builder()
            .timeout(delivery_timeout)
            .build()
            .expect("delivery HTTP client construction");

        Self { db, client }
    }

    /// Creates a subscription for an existing bot. The response is the
    /// only place the generated secret ever appears.
    pub async fn register(&self, registration: WebhookRegistration) -> Result<WebhookResponse> {
        let bot_exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM bots WHERE id = $1")
            .bind(registration.bot_id)
            .fetch_optional(&self.db)
            .await?
            .is_some();

        if !bot_exists {
            return Err(ApiError::NotFound(format!(
                "Bot not found with ID: {}",
                registration.bot_id
            )));
        }

        let id = Uuid::new_v4();
        let secret_key = generate_secret();
        let created_at = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO webhooks (id, bot_id, event, url, secret_key, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(registration.bot_id)
        .bind(registration.event.as_str())
        .bind(&registration.url)
        .bind(&secret_key)
        .bind(created_at)
        .execute(&self.db)
        .await
        .map_err(|e| insert_error(e, id))?;

        info!(
            webhook_id = %id,
            bot_id = %registration.bot_id,
            event = %registration.event,
            "Webhook registered"
        );

        Ok(WebhookResponse {
            webhook_id: id,
            bot_id: registration.bot_id,
            event: registration.event.as_str().to_string(),
            url: registration.url,
            secret_key,
            created_at,
        })
    }

    /// One subscription by id, secret omitted.
    pub async fn get(&self, webhook_id: Uuid) -> Result<WebhookInfo> {
        let record = sqlx::query_as::<_, WebhookRecord>(
            "SELECT id, bot_id, event, url, secret_key, created_at \
             FROM webhooks WHERE id = $1",
        )
        .bind(webhook_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Webhook not found with ID: {}", webhook_id))
        })?;

        Ok(record.into())
    }

    /// Subscriptions for one bot, secrets omitted.
    pub async fn list_for_bot(&self, bot_id: Uuid) -> Result<Vec<WebhookInfo>> {
        let records = sqlx::query_as::<_, WebhookRecord>(
            "SELECT id, bot_id, event, url, secret_key, created_at \
             FROM webhooks WHERE bot_id = $1 ORDER BY created_at DESC",
        )
        .bind(bot_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records.into_iter().map(WebhookInfo::from).collect())
    }

    pub async fn delete(&self, webhook_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM webhooks WHERE id = $1")
            .bind(webhook_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!(
                "Webhook not found with ID: {}",
                webhook_id
            )));
        }

        info!(webhook_id = %webhook_id, "Webhook deleted");
        Ok(())
    }

    /// Inbound verification path. Unknown webhook ids fail exactly like
    /// bad signatures so a caller cannot probe for valid ids.
    pub async fn verify_and_process(
        &self,
        webhook_id: Uuid,
        signature: &str,
        body: &[u8],
    ) -> Result<()> {
        let secret = self.secret_for(webhook_id).await?;

        if let Err(e) = Self::check_signature(secret.as_deref(), signature, body) {
            warn!(webhook_id = %webhook_id, "Rejected inbound webhook signature");
            track_webhook_inbound("rejected");
            return Err(e);
        }

        let payload: WebhookPayload = serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

        self.process_event(webhook_id, &payload);
        track_webhook_inbound("accepted");
        Ok(())
    }

    /// Trust decision for one inbound request. A missing secret means
    /// the webhook id is unknown; it fails with the exact same error as
    /// a signature mismatch.
    fn check_signature(secret: Option<&str>, signature: &str, body: &[u8]) -> Result<()> {
        let verified = match secret {
            Some(secret) => signature::verify(body, secret, signature),
            None => false,
        };

        if verified {
            Ok(())
        } else {
            Err(ApiError::InvalidSignature)
        }
    }

    /// Fans a banking event out to every matching subscription. Returns
    /// how many deliveries were attempted; per-subscriber failures are
    /// logged, never raised.
    pub async fn trigger(
        &self,
        bot_id: Uuid,
        account_id: &str,
        event: WebhookEvent,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> Result<usize> {
        let subscribers = self.subscribers_for(bot_id, event).await?;
        if subscribers.is_empty() {
            debug!(bot_id = %bot_id, event = %event, "No webhook subscribers for event");
            return Ok(0);
        }

        let payload = WebhookPayload {
            bot_id: bot_id.to_string(),
            account_id: account_id.to_string(),
            event: event.as_str().to_string(),
            data,
        };

        // One serialization for all subscribers; every signature covers
        // exactly these bytes.
        let body = serde_json::to_vec(&payload).map_err(|e| {
            ApiError::Internal(format!("Failed to serialize webhook payload: {}", e))
        })?;

        let attempted = subscribers.len();
        self.deliver_to_subscribers(&subscribers, &body).await;
        Ok(attempted)
    }

    /// Signs and posts one pre-serialized body to each subscriber with
    /// bounded concurrency. Delivery order across subscribers is not
    /// guaranteed.
    pub async fn deliver_to_subscribers(&self, subscribers: &[WebhookRecord], body: &[u8]) {
        stream::iter(subscribers)
            .for_each_concurrent(DELIVERY_CONCURRENCY, |webhook| self.deliver_one(webhook, body))
            .await;
    }

    async fn deliver_one(&self, webhook: &WebhookRecord, body: &[u8]) {
        let signature = signature::sign(body, &webhook.secret_key);

        let result = self
            .client
            .post(&webhook.url)
            .header("Content-Type", "application/json")
            .header("X-Signature", signature)
            .body(body.to_vec())
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(
                    webhook_id = %webhook.id,
                    url = %webhook.url,
                    event = %webhook.event,
                    "Webhook delivered"
                );
                track_webhook_delivery(&webhook.event, "delivered");
            }
            Ok(response) => {
                warn!(
                    webhook_id = %webhook.id,
                    url = %webhook.url,
                    status = %response.status(),
                    "Webhook delivery rejected by subscriber"
                );
                track_webhook_delivery(&webhook.event, "rejected");
            }
            Err(e) => {
                error!(
                    webhook_id = %webhook.id,
                    url = %webhook.url,
                    error = %e,
                    "Webhook delivery failed"
                );
                track_webhook_delivery(&webhook.event, "failed");
            }
        }
    }

    /// Dispatches a verified payload. Unknown event tags are logged and
    /// dropped; the endpoint already acknowledged by the time handlers
    /// would run.
    fn process_event(&self, webhook_id: Uuid, payload: &WebhookPayload) {
        match payload.event.parse::<WebhookEvent>() {
            Ok(event) => {
                info!(
                    webhook_id = %webhook_id,
                    bot_id = %payload.bot_id,
                    account_id = %payload.account_id,
                    event = %event,
                    "Inbound webhook event accepted"
                );
            }
            Err(_) => {
                warn!(
                    webhook_id = %webhook_id,
                    event = %payload.event,
                    "Ignoring inbound webhook with unknown event tag"
                );
            }
        }
    }

    async fn subscribers_for(
        &self,
        bot_id: Uuid,
        event: WebhookEvent,
    ) -> Result<Vec<WebhookRecord>> {
        let records = sqlx::query_as::<_, WebhookRecord>(
            "SELECT id, bot_id, event, url, secret_key, created_at \
             FROM webhooks WHERE bot_id = $1 AND event = $2",
        )
        .bind(bot_id)
        .bind(event.as_str())
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    async fn secret_for(&self, webhook_id: Uuid) -> Result<Option<String>> {
        let secret =
            sqlx::query_scalar::<_, String>("SELECT secret_key FROM webhooks WHERE id = $1")
                .bind(webhook_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(secret)
    }
}

/// Maps a primary-key collision on insert to `Conflict`. Ids are
/// server-generated, so in practice this never fires.
fn insert_error(err: sqlx::Error, webhook_id: Uuid) -> ApiError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            ApiError::Conflict(format!("Webhook already exists with ID: {}", webhook_id))
        }
        other => other.into(),
    }
}

/// 32 bytes from the OS CSPRNG, hex-encoded. Never derived from UUIDs
/// or timestamps.
fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
