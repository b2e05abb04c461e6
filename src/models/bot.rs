use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{RE_BANK_CODE, RE_BOT_HANDLE, RE_HTTP_URL};

/// Authorization flow a bot puts its end-users through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum BotAuthType {
    #[serde(rename = "oauth2")]
    OAuth2,
    #[serde(rename = "api_key")]
    ApiKey,
    #[serde(rename = "login_password")]
    LoginPassword,
}

impl BotAuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotAuthType::OAuth2 => "oauth2",
            BotAuthType::ApiKey => "api_key",
            BotAuthType::LoginPassword => "login_password",
        }
    }
}

impl std::fmt::Display for BotAuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BotAuthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oauth2" => Ok(BotAuthType::OAuth2),
            "api_key" => Ok(BotAuthType::ApiKey),
            "login_password" => Ok(BotAuthType::LoginPassword),
            _ => Err(format!("Invalid auth type: {}", s)),
        }
    }
}

/// Per-bot upstream credentials, stored as JSONB and never echoed in
/// bot responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BotCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Bot registry row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Bot {
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    pub bank_code: String,
    pub description: String,
    pub auth_type: String,
    pub credentials: Json<BotCredentials>,
    pub logo_url: Option<String>,
    pub supported_features: Json<Vec<String>>,
    pub created_at: i64,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BotRegistrationRequest {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Sberbank")]
    pub name: String,

    #[validate(length(min = 3, max = 50), regex(path = *RE_BOT_HANDLE))]
    #[schema(example = "@sberbank")]
    pub handle: String,

    #[validate(regex(path = *RE_BANK_CODE))]
    #[schema(example = "SBER")]
    pub bank_code: String,

    pub description: String,

    pub auth_type: BotAuthType,

    pub credentials: BotCredentials,

    #[validate(regex(path = *RE_HTTP_URL))]
    #[schema(example = "https://www.sberbank.ru/static/logo.png")]
    pub logo_url: Option<String>,

    #[serde(default)]
    pub supported_features: Vec<String>,
}

/// Partial update; keys follow the storage column names.
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct BotUpdateRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(regex(path = *RE_HTTP_URL))]
    pub logo_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BotResponse {
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    pub bank_code: String,
    pub description: String,
    pub auth_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub supported_features: Vec<String>,
    pub created_at: i64,
}

impl From<Bot> for BotResponse {
    fn from(bot: Bot) -> Self {
        BotResponse {
            id: bot.id,
            name: bot.name,
            handle: bot.handle,
            bank_code: bot.bank_code,
            description: bot.description,
            auth_type: bot.auth_type,
            logo_url: bot.logo_url,
            supported_features: bot.supported_features.0,
            created_at: bot.created_at,
        }
    }
}

/// Narrow projection used by list and search responses.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BotListItem {
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    pub bank_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BotListResponse {
    pub items: Vec<BotListItem>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_auth_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&BotAuthType::OAuth2).unwrap(),
            "\"oauth2\""
        );
        assert_eq!(
            serde_json::to_string(&BotAuthType::ApiKey).unwrap(),
            "\"api_key\""
        );
        assert_eq!(
            serde_json::to_string(&BotAuthType::LoginPassword).unwrap(),
            "\"login_password\""
        );
    }

    #[test]
    fn test_auth_type_round_trip() {
        for auth_type in [
            BotAuthType::OAuth2,
            BotAuthType::ApiKey,
            BotAuthType::LoginPassword,
        ] {
            assert_eq!(BotAuthType::from_str(auth_type.as_str()).unwrap(), auth_type);
        }
        assert!(BotAuthType::from_str("basic").is_err());
    }

    #[test]
    fn test_registration_request_rejects_unknown_auth_type() {
        let body = serde_json::json!({
            "name": "Test Bank",
            "handle": "@testbank",
            "bankCode": "TEST",
            "description": "test",
            "authType": "saml",
            "credentials": {}
        });
        assert!(serde_json::from_value::<BotRegistrationRequest>(body).is_err());
    }

    #[test]
    fn test_registration_request_validation() {
        let request = BotRegistrationRequest {
            name: "Test Bank".to_string(),
            handle: "@test_bank-1".to_string(),
            bank_code: "TEST".to_string(),
            description: "test".to_string(),
            auth_type: BotAuthType::ApiKey,
            credentials: BotCredentials::default(),
            logo_url: Some("https://example.com/logo.png".to_string()),
            supported_features: vec!["accounts".to_string()],
        };
        assert!(request.validate().is_ok());

        let bad_handle = BotRegistrationRequest {
            handle: "no-at-sign".to_string(),
            ..serde_json::from_value(serde_json::to_value(&request).unwrap()).unwrap()
        };
        assert!(bad_handle.validate().is_err());

        let bad_bank_code = BotRegistrationRequest {
            bank_code: "sber".to_string(),
            ..serde_json::from_value(serde_json::to_value(&request).unwrap()).unwrap()
        };
        assert!(bad_bank_code.validate().is_err());
    }

    #[test]
    fn test_credentials_never_serialized_in_bot_response() {
        let response = BotResponse {
            id: Uuid::new_v4(),
            name: "Bank".to_string(),
            handle: "@bank".to_string(),
            bank_code: "BANK".to_string(),
            description: String::new(),
            auth_type: "oauth2".to_string(),
            logo_url: None,
            supported_features: vec![],
            created_at: 0,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("credentials"));
        assert!(!json.contains("clientSecret"));
        assert!(json.contains("bankCode"));
    }
}
