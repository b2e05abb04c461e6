// End-user authorization flows: credential dispatch per bot auth type
// and the OAuth2 browser callback.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::auth::AuthenticatedClient;
use crate::error::{ApiError, Result};
use crate::middleware::metrics::track_authorization;
use crate::models::{ApiKeyAuthRequest, AuthorizeResponse, BotAuthType, LoginPasswordAuthRequest};
use crate::services::auth_service::parse_oauth_state;

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Authorize an end user with a bot
///
/// The request body depends on the bot's stored auth type: credentials
/// for `login_password` and `api_key`, empty for `oauth2`. The end-user
/// id is the `sub` claim of the caller's bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/bots/{bot_id}/authorize",
    tag = "authorization",
    security(("bearer_auth" = [])),
    params(("bot_id" = Uuid, Path, description = "Bot id")),
    request_body = Vec<u8>,
    responses(
        (status = 200, description = "Session issued or OAuth redirect URL", body = AuthorizeResponse),
        (status = 400, description = "Missing credentials for the bot's flow"),
        (status = 404, description = "Unknown bot")
    )
)]
pub async fn authorize(
    State(state): State<AppState>,
    Path(bot_id): Path<Uuid>,
    AuthenticatedClient(claims): AuthenticatedClient,
    body: Bytes,
) -> Result<Json<AuthorizeResponse>> {
    let user_id = claims.sub.as_str();
    let auth_type = state.auth_service.bot_auth_type(bot_id).await?;

    let result = match auth_type {
        BotAuthType::LoginPassword => {
            let request: LoginPasswordAuthRequest =
                serde_json::from_slice(&body).map_err(|_| {
                    ApiError::BadRequest(
                        "Expected username and password for the login_password flow".to_string(),
                    )
                })?;

            state
                .auth_service
                .authorize_with_login_password(bot_id, user_id, &request.username, &request.password)
                .await
        }
        BotAuthType::ApiKey => {
            let request: ApiKeyAuthRequest = serde_json::from_slice(&body).map_err(|_| {
                ApiError::BadRequest("Expected apiKey for the api_key flow".to_string())
            })?;

            state
                .auth_service
                .authorize_with_api_key(bot_id, user_id, &request.api_key)
                .await
        }
        BotAuthType::OAuth2 => {
            state
                .auth_service
                .start_oauth_authorization(bot_id, user_id)
                .await
        }
    };

    track_authorization(auth_type.as_str(), result.is_ok());
    result.map(Json)
}

/// OAuth2 redirect callback
///
/// The bank redirects the end-user's browser here after consent. No
/// bearer token is possible on this hop; identity is carried by the
/// signed `state` parameter issued when the flow started.
#[utoipa::path(
    get,
    path = "/api/v1/oauth/callback",
    tag = "authorization",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from the bank"),
        ("state" = Option<String>, Query, description = "Opaque state from the authorize step")
    ),
    responses(
        (status = 302, description = "Deep-link redirect carrying the session token"),
        (status = 400, description = "Missing or malformed code/state")
    )
)]
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Response> {
    let code = query
        .code
        .ok_or_else(|| ApiError::BadRequest("Missing code parameter".to_string()))?;
    let raw_state = query
        .state
        .ok_or_else(|| ApiError::BadRequest("Missing state parameter".to_string()))?;

    let (bot_id, user_id) = parse_oauth_state(&raw_state)?;

    let session = state
        .auth_service
        .complete_oauth_authorization(bot_id, &user_id, &code)
        .await?;

    let token = session.session_token.ok_or_else(|| {
        ApiError::Internal("OAuth completion produced no session token".to_string())
    })?;

    info!(bot_id = %bot_id, "OAuth2 callback completed");

    let location = state.auth_service.oauth_deep_link(&token);
    let response = Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .body(axum::body::Body::empty())
        .map_err(|e| ApiError::Internal(format!("Failed to build redirect: {}", e)))?;

    Ok(response.into_response())
}
