// JWT issuance and verification for API clients and bot user sessions.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::{ApiClaims, SessionClaims};
use crate::error::{ApiError, Result};

/// Bearer tokens for platform API clients live for 24 hours.
pub const API_TOKEN_TTL_SECS: i64 = 86_400;

/// Session tokens minted after bot authorization live for one hour.
pub const SESSION_TTL_SECS: i64 = 3_600;

/// Signs and verifies both token kinds with a shared HS256 secret.
///
/// API client tokens and session tokens use the same issuer; only session
/// tokens carry the user-facing audience and the `bot_id`/`user_id` pair.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl JwtService {
    pub fn new(secret: &str, issuer: &str, audience: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        }
    }

    /// Issues a bearer token for a platform API client.
    pub fn issue_api_token(&self, client_id: &str) -> Result<String> {
        let claims = ApiClaims::new(client_id, &self.issuer, &self.audience);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Token encoding error: {}", e)))
    }

    pub fn decode_api_token(&self, token: &str) -> Result<ApiClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<ApiClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ApiError::Unauthorized("Token expired".to_string())
                }
                _ => ApiError::Unauthorized("Invalid or expired token".to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Issues a session token for a user who authorized with a bot.
    ///
    /// Returns the signed token together with its expiry as a unix timestamp,
    /// which callers persist alongside the session row.
    pub fn issue_session_token(&self, bot_id: Uuid, user_id: &str) -> Result<(String, i64)> {
        let claims = SessionClaims::new(bot_id, user_id, &self.issuer, &self.audience);
        let expires_at = claims.exp;

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Token encoding error: {}", e)))?;

        Ok((token, expires_at))
    }

    pub fn decode_session_token(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ApiError::Unauthorized("Session token expired".to_string())
                }
                _ => ApiError::Unauthorized("Invalid session token".to_string()),
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", "bank-bots-api", "bank-bots-users")
    }

    #[test]
    fn test_api_token_round_trip() {
        let jwt = service();

        let token = jwt.issue_api_token("mobile-app").unwrap();
        let claims = jwt.decode_api_token(&token).unwrap();

        assert_eq!(claims.sub, "mobile-app");
        assert_eq!(claims.iss, "bank-bots-api");
    }

    #[test]
    fn test_session_token_round_trip() {
        let jwt = service();
        let bot_id = Uuid::new_v4();

        let (token, expires_at) = jwt.issue_session_token(bot_id, "user-42").unwrap();
        let claims = jwt.decode_session_token(&token).unwrap();

        assert_eq!(claims.bot_id, bot_id.to_string());
        assert_eq!(claims.user_id, "user-42");
        assert_eq!(claims.exp, expires_at);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let jwt = service();
        let other = JwtService::new("other-secret", "bank-bots-api", "bank-bots-users");

        let token = jwt.issue_api_token("mobile-app").unwrap();
        assert!(other.decode_api_token(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let jwt = service();
        let other = JwtService::new("test-secret", "someone-else", "bank-bots-users");

        let token = jwt.issue_api_token("mobile-app").unwrap();
        assert!(other.decode_api_token(&token).is_err());
    }

    #[test]
    fn test_session_token_is_not_an_api_token() {
        let jwt = service();

        let (token, _) = jwt.issue_session_token(Uuid::new_v4(), "user-42").unwrap();
        // Session tokens have no `sub`/`iat`, so API decoding must fail.
        assert!(jwt.decode_api_token(&token).is_err());
    }
}
