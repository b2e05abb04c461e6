use axum::{
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::{ApiError, Result};
use crate::models::{
    BotListItem, BotListResponse, BotRegistrationRequest, BotResponse, BotUpdateRequest,
};

#[derive(Debug, Deserialize)]
pub struct ListBotsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchBotsQuery {
    pub q: Option<String>,
    pub bank_code: Option<String>,
    pub limit: Option<i64>,
}

/// Search result envelope; unlike the list endpoint there is no total.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BotSearchResponse {
    pub items: Vec<BotListItem>,
}

/// Register a new bank bot
#[utoipa::path(
    post,
    path = "/api/v1/bots",
    tag = "bots",
    security(("bearer_auth" = [])),
    request_body = BotRegistrationRequest,
    responses(
        (status = 201, description = "Bot registered", body = BotResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Handle already taken")
    )
)]
pub async fn register_bot(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BotRegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BotResponse>)> {
    let Json(request) = payload?;

    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Invalid bot registration: {}", e)))?;

    let bot = state.bot_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(bot)))
}

/// List bots with pagination and sorting
#[utoipa::path(
    get,
    path = "/api/v1/bots",
    tag = "bots",
    security(("bearer_auth" = [])),
    params(
        ("limit" = Option<i64>, Query, description = "Page size, 1..100, default 20"),
        ("offset" = Option<i64>, Query, description = "Rows to skip, default 0"),
        ("sort" = Option<String>, Query, description = "name | created_at, prefix with - for descending")
    ),
    responses(
        (status = 200, description = "Paginated bot list", body = BotListResponse),
        (status = 400, description = "Invalid pagination parameters")
    )
)]
pub async fn list_bots(
    State(state): State<AppState>,
    Query(query): Query<ListBotsQuery>,
) -> Result<Json<BotListResponse>> {
    let bots = state
        .bot_service
        .list(query.limit, query.offset, query.sort.as_deref())
        .await?;

    Ok(Json(bots))
}

/// Search bots by name or handle
#[utoipa::path(
    get,
    path = "/api/v1/search/bots",
    tag = "bots",
    security(("bearer_auth" = [])),
    params(
        ("q" = Option<String>, Query, description = "Substring matched against name and handle"),
        ("bank_code" = Option<String>, Query, description = "Exact bank code filter"),
        ("limit" = Option<i64>, Query, description = "Max results, 1..100, default 10")
    ),
    responses(
        (status = 200, description = "Matching bots", body = BotSearchResponse),
        (status = 400, description = "Invalid limit parameter")
    )
)]
pub async fn search_bots(
    State(state): State<AppState>,
    Query(query): Query<SearchBotsQuery>,
) -> Result<Json<BotSearchResponse>> {
    let items = state
        .bot_service
        .search(
            query.q.as_deref().unwrap_or(""),
            query.bank_code.as_deref(),
            query.limit,
        )
        .await?;

    Ok(Json(BotSearchResponse { items }))
}

/// Fetch one bot
#[utoipa::path(
    get,
    path = "/api/v1/bots/{bot_id}",
    tag = "bots",
    security(("bearer_auth" = [])),
    params(("bot_id" = Uuid, Path, description = "Bot id")),
    responses(
        (status = 200, description = "Bot details", body = BotResponse),
        (status = 404, description = "Unknown bot")
    )
)]
pub async fn get_bot(
    State(state): State<AppState>,
    Path(bot_id): Path<Uuid>,
) -> Result<Json<BotResponse>> {
    let bot = state.bot_service.get(bot_id).await?;
    Ok(Json(bot))
}

/// Update a bot's mutable fields
#[utoipa::path(
    put,
    path = "/api/v1/bots/{bot_id}",
    tag = "bots",
    security(("bearer_auth" = [])),
    params(("bot_id" = Uuid, Path, description = "Bot id")),
    request_body = BotUpdateRequest,
    responses(
        (status = 200, description = "Updated bot", body = BotResponse),
        (status = 404, description = "Unknown bot")
    )
)]
pub async fn update_bot(
    State(state): State<AppState>,
    Path(bot_id): Path<Uuid>,
    payload: std::result::Result<Json<BotUpdateRequest>, JsonRejection>,
) -> Result<Json<BotResponse>> {
    let Json(update) = payload?;

    update
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Invalid bot update: {}", e)))?;

    let bot = state.bot_service.update(bot_id, update).await?;
    Ok(Json(bot))
}

/// Delete a bot and everything attached to it
#[utoipa::path(
    delete,
    path = "/api/v1/bots/{bot_id}",
    tag = "bots",
    security(("bearer_auth" = [])),
    params(("bot_id" = Uuid, Path, description = "Bot id")),
    responses(
        (status = 204, description = "Bot deleted"),
        (status = 404, description = "Unknown bot")
    )
)]
pub async fn delete_bot(
    State(state): State<AppState>,
    Path(bot_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.bot_service.delete(bot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
