// Account data endpoints, gated on the `X-Session-Token` header rather
// than the platform bearer token.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::error::{ApiError, Result};
use crate::models::{Account, AccountBalance, Transaction};
use crate::services::TransactionFilter;

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// List the authorized user's accounts
#[utoipa::path(
    get,
    path = "/api/v1/bots/{bot_id}/accounts",
    tag = "accounts",
    params(
        ("bot_id" = Uuid, Path, description = "Bot id"),
        ("X-Session-Token" = String, Header, description = "Session token from authorization")
    ),
    responses(
        (status = 200, description = "Accounts", body = [Account]),
        (status = 401, description = "Missing, invalid or expired session token")
    )
)]
pub async fn get_accounts(
    State(state): State<AppState>,
    Path(bot_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<Account>>> {
    require_session(&state, &headers, bot_id).await?;
    Ok(Json(state.account_service.accounts(bot_id)))
}

/// Fetch one account's balance
#[utoipa::path(
    get,
    path = "/api/v1/bots/{bot_id}/accounts/{account_id}/balance",
    tag = "accounts",
    params(
        ("bot_id" = Uuid, Path, description = "Bot id"),
        ("account_id" = String, Path, description = "Account id"),
        ("X-Session-Token" = String, Header, description = "Session token from authorization")
    ),
    responses(
        (status = 200, description = "Balance snapshot", body = AccountBalance),
        (status = 401, description = "Missing, invalid or expired session token")
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path((bot_id, account_id)): Path<(Uuid, String)>,
    headers: HeaderMap,
) -> Result<Json<AccountBalance>> {
    require_session(&state, &headers, bot_id).await?;
    Ok(Json(state.account_service.balance(bot_id, &account_id)))
}

/// List one account's transactions with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/bots/{bot_id}/accounts/{account_id}/transactions",
    tag = "accounts",
    params(
        ("bot_id" = Uuid, Path, description = "Bot id"),
        ("account_id" = String, Path, description = "Account id"),
        ("X-Session-Token" = String, Header, description = "Session token from authorization"),
        ("from" = Option<String>, Query, description = "Inclusive lower date bound, YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "Inclusive upper date bound, YYYY-MM-DD"),
        ("type" = Option<String>, Query, description = "debit or credit"),
        ("limit" = Option<i64>, Query, description = "Max results, 1..100, default 50")
    ),
    responses(
        (status = 200, description = "Filtered transactions", body = [Transaction]),
        (status = 400, description = "Invalid filter parameter"),
        (status = 401, description = "Missing, invalid or expired session token")
    )
)]
pub async fn get_transactions(
    State(state): State<AppState>,
    Path((bot_id, account_id)): Path<(Uuid, String)>,
    headers: HeaderMap,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>> {
    require_session(&state, &headers, bot_id).await?;

    let filter = TransactionFilter {
        from: query.from,
        to: query.to,
        limit: query.limit,
        kind: query.kind,
    };

    let transactions = state
        .account_service
        .transactions(bot_id, &account_id, filter)?;

    Ok(Json(transactions))
}

/// Validates the `X-Session-Token` header against the addressed bot.
async fn require_session(state: &AppState, headers: &HeaderMap, bot_id: Uuid) -> Result<()> {
    let token = headers
        .get("X-Session-Token")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    state.auth_service.validate_session(token, bot_id).await
}
