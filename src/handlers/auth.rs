use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use tracing::{info, warn};
use validator::Validate;

use crate::AppState;
use crate::auth::{API_TOKEN_TTL_SECS, LoginRequest, TokenResponse};
use crate::error::{ApiError, Result};
use crate::middleware::metrics::track_auth_attempt;

/// Exchange client credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token issued", body = TokenResponse),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "Invalid client credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(request) = payload?;

    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Invalid login request: {}", e)))?;

    let valid = request.client_id == state.config.api_client_id
        && request.client_secret == state.config.api_client_secret;

    if !valid {
        warn!(client_id = %request.client_id, "Login rejected");
        track_auth_attempt(false);
        return Err(ApiError::Unauthorized(
            "Invalid client credentials".to_string(),
        ));
    }

    let access_token = state.jwt_service.issue_api_token(&request.client_id)?;

    info!(client_id = %request.client_id, "API client logged in");
    track_auth_attempt(true);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: API_TOKEN_TTL_SECS,
    }))
}
