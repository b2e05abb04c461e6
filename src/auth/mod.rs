use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub mod jwt;
pub mod middleware;

pub use jwt::{JwtService, API_TOKEN_TTL_SECS, SESSION_TTL_SECS};
pub use middleware::{auth_middleware, AuthenticatedClient};

/// Claims carried by platform API client bearer tokens
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiClaims {
    pub sub: String, // Subject (API client ID)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub iss: String, // Issuer
    pub aud: String, // Audience
}

impl ApiClaims {
    pub fn new(client_id: &str, issuer: &str, audience: &str) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: client_id.to_string(),
            exp: now + API_TOKEN_TTL_SECS,
            iat: now,
            iss: issuer.to_string(),
            aud: audience.to_string(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Claims carried by bot user session tokens.
///
/// Minted after a user authorizes with a bank bot, presented on account
/// endpoints via the `X-Session-Token` header.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionClaims {
    pub iss: String,     // Issuer
    pub aud: String,     // Audience
    pub bot_id: String,  // Bot the user authorized with
    pub user_id: String, // End user within the bot's bank
    pub exp: i64,        // Expiration time
}

impl SessionClaims {
    pub fn new(bot_id: Uuid, user_id: &str, issuer: &str, audience: &str) -> Self {
        Self {
            iss: issuer.to_string(),
            aud: audience.to_string(),
            bot_id: bot_id.to_string(),
            user_id: user_id.to_string(),
            exp: Utc::now().timestamp() + SESSION_TTL_SECS,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Client credentials exchanged for a bearer token
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "mobile-app")]
    pub client_id: String,
    #[validate(length(min = 1, max = 255))]
    pub client_secret: String,
}

/// Bearer token response for the client credentials login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_claims_not_expired_on_issue() {
        let claims = ApiClaims::new("mobile-app", "bank-bots-api", "bank-bots-users");
        assert!(!claims.is_expired());
        assert_eq!(claims.sub, "mobile-app");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_session_claims_carry_bot_and_user() {
        let bot_id = Uuid::new_v4();
        let claims = SessionClaims::new(bot_id, "user-42", "bank-bots-api", "bank-bots-users");

        assert_eq!(claims.bot_id, bot_id.to_string());
        assert_eq!(claims.user_id, "user-42");
        assert!(!claims.is_expired());
        assert!(claims.exp <= Utc::now().timestamp() + SESSION_TTL_SECS);
    }
}
