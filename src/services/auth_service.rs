// Bot authorization flows: login/password, API key and OAuth2.
//
// Every successful flow ends the same way: a session JWT is minted and a
// BotSession row persisted. The bank-side credential checks are mocked;
// a real integration would verify against the bank's API before issuing
// the session.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::jwt::{JwtService, SESSION_TTL_SECS};
use crate::error::{ApiError, Result};
use crate::models::{AuthorizeResponse, BotAuthType, BotCredentials};

/// Redirect URI registered with the banks for the OAuth2 flow.
const OAUTH_REDIRECT_URI: &str = "https://api.yourapp.com/api/v1/oauth/callback";

/// Deep link the OAuth callback redirects the end-user's browser to.
const OAUTH_DEEP_LINK: &str = "yourapp://oauth/callback";

#[derive(Debug, sqlx::FromRow)]
struct BotAuthRow {
    auth_type: String,
    credentials: Json<BotCredentials>,
}

/// Service driving end-user authorization against bots.
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(db: PgPool, jwt: JwtService) -> Self {
        Self { db, jwt }
    }

    /// The bot's declared auth type, deciding which flow `authorize`
    /// dispatches to. A stored value outside the vocabulary is a data
    /// problem surfaced as `BadRequest`.
    pub async fn bot_auth_type(&self, bot_id: Uuid) -> Result<BotAuthType> {
        let row = self.fetch_auth_row(bot_id).await?;

        row.auth_type.parse().map_err(|_| {
            ApiError::BadRequest(format!(
                "Unsupported authentication type: {}",
                row.auth_type
            ))
        })
    }

    /// Login/password flow. The credentials would be forwarded to the
    /// bank's auth endpoint; here they are accepted as-is.
    pub async fn authorize_with_login_password(
        &self,
        bot_id: Uuid,
        user_id: &str,
        username: &str,
        _password: &str,
    ) -> Result<AuthorizeResponse> {
        info!(bot_id = %bot_id, user_id = %user_id, username = %username,
              "Authorizing with login/password");

        self.require_bot(bot_id).await?;
        self.issue_session(bot_id, user_id).await
    }

    /// API-key flow. Mirrors the login/password flow with a different
    /// credential shape.
    pub async fn authorize_with_api_key(
        &self,
        bot_id: Uuid,
        user_id: &str,
        _api_key: &str,
    ) -> Result<AuthorizeResponse> {
        info!(bot_id = %bot_id, user_id = %user_id, "Authorizing with API key");

        self.require_bot(bot_id).await?;
        self.issue_session(bot_id, user_id).await
    }

    /// Starts the OAuth2 flow: no session yet, only the bank's
    /// authorization URL the end-user must visit first.
    pub async fn start_oauth_authorization(
        &self,
        bot_id: Uuid,
        user_id: &str,
    ) -> Result<AuthorizeResponse> {
        info!(bot_id = %bot_id, user_id = %user_id, "Starting OAuth2 authorization");

        let row = self.fetch_auth_row(bot_id).await?;

        let auth_url = row.credentials.0.authorization_url.clone().ok_or_else(|| {
            ApiError::Internal("OAuth2 authorization URL not configured for this bot".to_string())
        })?;

        let client_id = row.credentials.0.client_id.clone().unwrap_or_default();
        let state = encode_oauth_state(bot_id, user_id);

        let separator = if auth_url.contains('?') { '&' } else { '?' };
        let full_url = format!(
            "{}{}response_type=code&client_id={}&redirect_uri={}&state={}&scope=read",
            auth_url, separator, client_id, OAUTH_REDIRECT_URI, state
        );

        Ok(AuthorizeResponse::oauth_redirect(full_url))
    }

    /// Completes the OAuth2 flow after the bank redirected back with a
    /// code. The code exchange against the bank's token endpoint is
    /// mocked; the session is issued directly.
    pub async fn complete_oauth_authorization(
        &self,
        bot_id: Uuid,
        user_id: &str,
        code: &str,
    ) -> Result<AuthorizeResponse> {
        info!(bot_id = %bot_id, user_id = %user_id, code_len = code.len(),
              "Completing OAuth2 authorization");

        self.require_bot(bot_id).await?;
        self.issue_session(bot_id, user_id).await
    }

    /// Deep link carrying the freshly minted session token back into the
    /// client application.
    pub fn oauth_deep_link(&self, session_token: &str) -> String {
        format!("{}?session_token={}", OAUTH_DEEP_LINK, session_token)
    }

    /// Validates a session token for one specific bot: JWT signature,
    /// expiry, issuer/audience, the token's embedded bot id, and a live
    /// row in the session store.
    pub async fn validate_session(&self, token: &str, bot_id: Uuid) -> Result<()> {
        let claims = self.jwt.decode_session_token(token)?;

        if claims.bot_id != bot_id.to_string() {
            warn!(bot_id = %bot_id, "Session token presented for a different bot");
            return Err(ApiError::Unauthorized(
                "Invalid or expired session token".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp();
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM bot_sessions
             WHERE session_token = $1 AND bot_id = $2 AND expires_at >= $3",
        )
        .bind(token)
        .bind(bot_id)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;

        if found.is_none() {
            return Err(ApiError::Unauthorized(
                "Invalid or expired session token".to_string(),
            ));
        }

        Ok(())
    }

    /// Mints a session JWT and persists it as a BotSession row.
    async fn issue_session(&self, bot_id: Uuid, user_id: &str) -> Result<AuthorizeResponse> {
        let (token, expires_at) = self.jwt.issue_session_token(bot_id, user_id)?;

        sqlx::query(
            "INSERT INTO bot_sessions (id, bot_id, user_id, session_token, expires_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(bot_id)
        .bind(user_id)
        .bind(&token)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        info!(bot_id = %bot_id, user_id = %user_id, "Session issued");
        Ok(AuthorizeResponse::session(token, SESSION_TTL_SECS))
    }

    async fn fetch_auth_row(&self, bot_id: Uuid) -> Result<BotAuthRow> {
        sqlx::query_as::<_, BotAuthRow>(
            "SELECT auth_type, credentials FROM bots WHERE id = $1",
        )
        .bind(bot_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Bot not found with ID: {}", bot_id)))
    }

    async fn require_bot(&self, bot_id: Uuid) -> Result<()> {
        self.fetch_auth_row(bot_id).await.map(|_| ())
    }
}

/// Encodes the (bot, user) pair into the OAuth2 `state` parameter.
pub fn encode_oauth_state(bot_id: Uuid, user_id: &str) -> String {
    URL_SAFE.encode(format!("{}:{}", bot_id, user_id))
}

/// Decodes a `state` parameter back into the (bot, user) pair. Anything
/// that does not round-trip through `encode_oauth_state` is rejected.
pub fn parse_oauth_state(state: &str) -> Result<(Uuid, String)> {
    let decoded = URL_SAFE
        .decode(state)
        .map_err(|_| ApiError::BadRequest("Invalid state parameter".to_string()))?;

    let decoded = String::from_utf8(decoded)
        .map_err(|_| ApiError::BadRequest("Invalid state parameter".to_string()))?;

    let (bot_id, user_id) = decoded
        .split_once(':')
        .ok_or_else(|| ApiError::BadRequest("Invalid state parameter".to_string()))?;

    let bot_id = Uuid::parse_str(bot_id)
        .map_err(|_| ApiError::BadRequest("Invalid state parameter".to_string()))?;

    Ok((bot_id, user_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_state_round_trip() {
        let bot_id = Uuid::new_v4();
        let state = encode_oauth_state(bot_id, "user-42");

        let (decoded_bot, decoded_user) = parse_oauth_state(&state).unwrap();
        assert_eq!(decoded_bot, bot_id);
        assert_eq!(decoded_user, "user-42");
    }

    #[test]
    fn test_oauth_state_is_url_safe() {
        let state = encode_oauth_state(Uuid::new_v4(), "user+with/special=chars");
        assert!(!state.contains('+'));
        assert!(!state.contains('/'));
    }

    #[test]
    fn test_oauth_state_user_id_may_contain_colons() {
        // split_once keeps everything after the first colon in the user id
        let bot_id = Uuid::new_v4();
        let state = encode_oauth_state(bot_id, "tenant:user-42");

        let (_, user_id) = parse_oauth_state(&state).unwrap();
        assert_eq!(user_id, "tenant:user-42");
    }

    #[test]
    fn test_malformed_state_rejected() {
        assert!(parse_oauth_state("not base64 at all!").is_err());
        // Valid base64, but no bot:user structure inside
        assert!(parse_oauth_state(&URL_SAFE.encode("garbage")).is_err());
        // Structure present, but the bot id is not a UUID
        assert!(parse_oauth_state(&URL_SAFE.encode("not-a-uuid:user-1")).is_err());
    }
}
