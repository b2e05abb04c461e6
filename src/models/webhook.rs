use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::RE_HTTP_URL;

/// Banking events a webhook can subscribe to. Subscriptions outside
/// this vocabulary are rejected at the API boundary; inbound payloads
/// keep a free-form event string so unknown tags can be logged and
/// ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum WebhookEvent {
    #[serde(rename = "transaction.created")]
    TransactionCreated,
    #[serde(rename = "transaction.updated")]
    TransactionUpdated,
    #[serde(rename = "balance.changed")]
    BalanceChanged,
    #[serde(rename = "account.created")]
    AccountCreated,
    #[serde(rename = "account.updated")]
    AccountUpdated,
}

impl WebhookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::TransactionCreated => "transaction.created",
            WebhookEvent::TransactionUpdated => "transaction.updated",
            WebhookEvent::BalanceChanged => "balance.changed",
            WebhookEvent::AccountCreated => "account.created",
            WebhookEvent::AccountUpdated => "account.updated",
        }
    }
}

impl std::fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WebhookEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transaction.created" => Ok(WebhookEvent::TransactionCreated),
            "transaction.updated" => Ok(WebhookEvent::TransactionUpdated),
            "balance.changed" => Ok(WebhookEvent::BalanceChanged),
            "account.created" => Ok(WebhookEvent::AccountCreated),
            "account.updated" => Ok(WebhookEvent::AccountUpdated),
            _ => Err(format!("Invalid webhook event: {}", s)),
        }
    }
}

/// Webhook subscription row. `secret_key` never leaves the server
/// after the creation response.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WebhookRecord {
    pub id: Uuid,
    pub bot_id: Uuid,
    pub event: String,
    pub url: String,
    pub secret_key: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRegistration {
    pub bot_id: Uuid,

    pub event: WebhookEvent,

    #[validate(regex(path = *RE_HTTP_URL))]
    #[schema(example = "https://client.example.com/hooks/bank")]
    pub url: String,
}

/// Creation response; the only place the secret is ever returned.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub webhook_id: Uuid,
    pub bot_id: Uuid,
    pub event: String,
    pub url: String,
    pub secret_key: String,
    pub created_at: i64,
}

/// List projection with no secret field.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookInfo {
    pub webhook_id: Uuid,
    pub bot_id: Uuid,
    pub event: String,
    pub url: String,
    pub created_at: i64,
}

impl From<WebhookRecord> for WebhookInfo {
    fn from(record: WebhookRecord) -> Self {
        WebhookInfo {
            webhook_id: record.id,
            bot_id: record.bot_id,
            event: record.event,
            url: record.url,
            created_at: record.created_at,
        }
    }
}

/// Envelope sent on outbound delivery and expected on the inbound
/// callback. Signed as exact serialized bytes; the inbound side
/// verifies the raw body it received, never a re-serialization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub bot_id: String,
    pub account_id: String,
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_event_wire_names() {
        assert_eq!(
            serde_json::to_string(&WebhookEvent::TransactionCreated).unwrap(),
            "\"transaction.created\""
        );
        assert_eq!(
            serde_json::to_string(&WebhookEvent::BalanceChanged).unwrap(),
            "\"balance.changed\""
        );
    }

    #[test]
    fn test_event_round_trip() {
        for event in [
            WebhookEvent::TransactionCreated,
            WebhookEvent::TransactionUpdated,
            WebhookEvent::BalanceChanged,
            WebhookEvent::AccountCreated,
            WebhookEvent::AccountUpdated,
        ] {
            assert_eq!(WebhookEvent::from_str(event.as_str()).unwrap(), event);
        }
        assert!(WebhookEvent::from_str("card.frozen").is_err());
    }

    #[test]
    fn test_registration_rejects_unknown_event() {
        let body = serde_json::json!({
            "botId": "7f8a1f4e-1111-2222-3333-444455556666",
            "event": "card.frozen",
            "url": "https://client.example.com/hooks"
        });
        assert!(serde_json::from_value::<WebhookRegistration>(body).is_err());
    }

    #[test]
    fn test_registration_url_validation() {
        let registration = WebhookRegistration {
            bot_id: Uuid::new_v4(),
            event: WebhookEvent::TransactionCreated,
            url: "ftp://files.example.com/drop".to_string(),
        };
        assert!(registration.validate().is_err());

        let registration = WebhookRegistration {
            url: "https://client.example.com/hooks".to_string(),
            ..registration
        };
        assert!(registration.validate().is_ok());
    }

    #[test]
    fn test_list_projection_has_no_secret() {
        let record = WebhookRecord {
            id: Uuid::new_v4(),
            bot_id: Uuid::new_v4(),
            event: "balance.changed".to_string(),
            url: "https://client.example.com/hooks".to_string(),
            secret_key: "aa".repeat(32),
            created_at: 1_700_000_000,
        };
        let info: WebhookInfo = record.into();
        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("secretKey"));
        assert!(!json.contains("aaaa"));
        assert!(json.contains("webhookId"));
    }

    #[test]
    fn test_payload_data_defaults_to_empty() {
        let payload: WebhookPayload = serde_json::from_str(
            r#"{"botId":"bot-1","accountId":"acc-1","event":"balance.changed"}"#,
        )
        .unwrap();
        assert!(payload.data.is_empty());
    }
}
