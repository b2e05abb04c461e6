use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A completed end-user authorization against one bot. `expires_at`
/// mirrors the `exp` claim of the stored session JWT.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BotSession {
    pub id: Uuid,
    pub bot_id: Uuid,
    pub user_id: String,
    pub session_token: String,
    pub expires_at: i64,
}

/// Credentials for the `login_password` authorization flow
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginPasswordAuthRequest {
    pub username: String,
    pub password: String,
}

/// Credentials for the `api_key` authorization flow
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyAuthRequest {
    pub api_key: String,
}

/// Outcome of an authorization request.
///
/// Carries a session token for the credential flows, or the bank's
/// authorization URL when the bot uses OAuth2 and the user must be
/// redirected first.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
}

impl AuthorizeResponse {
    pub fn session(session_token: String, expires_in: i64) -> Self {
        Self {
            session_token: Some(session_token),
            expires_in: Some(expires_in),
            authorization_url: None,
        }
    }

    pub fn oauth_redirect(authorization_url: String) -> Self {
        Self {
            session_token: None,
            expires_in: None,
            authorization_url: Some(authorization_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_response_omits_oauth_fields() {
        let response = AuthorizeResponse::session("token".to_string(), 3600);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["sessionToken"], "token");
        assert_eq!(json["expiresIn"], 3600);
        assert!(json.get("authorizationUrl").is_none());
    }

    #[test]
    fn test_oauth_response_omits_session_fields() {
        let response =
            AuthorizeResponse::oauth_redirect("https://bank.example/authorize?x=1".to_string());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["authorizationUrl"], "https://bank.example/authorize?x=1");
        assert!(json.get("sessionToken").is_none());
        assert!(json.get("expiresIn").is_none());
    }

    #[test]
    fn test_api_key_request_wire_name() {
        let request: ApiKeyAuthRequest =
            serde_json::from_str(r#"{"apiKey":"sk-123"}"#).unwrap();
        assert_eq!(request.api_key, "sk-123");
    }
}
