// Bot registry: persistence and queries for registered bank bots.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{
    Bot, BotListItem, BotListResponse, BotRegistrationRequest, BotResponse, BotUpdateRequest,
};
use crate::utils::validation::is_valid_limit;

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

const DEFAULT_LIST_LIMIT: i64 = 20;
const DEFAULT_SEARCH_LIMIT: i64 = 10;

/// Sort order accepted by the bot list endpoint. Parsed from the `sort`
/// query parameter; unrecognized values fall back to name ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotSort {
    pub column: &'static str,
    pub descending: bool,
}

impl BotSort {
    pub fn parse(sort: &str) -> Self {
        let (field, descending) = match sort.strip_prefix('-') {
            Some(field) => (field, true),
            None => (sort, false),
        };

        let column = match field {
            "created_at" => "created_at",
            // "name" and anything unrecognized sort by name
            _ => "name",
        };

        BotSort { column, descending }
    }

    fn order_clause(&self) -> String {
        format!(
            "{} {}",
            self.column,
            if self.descending { "DESC" } else { "ASC" }
        )
    }
}

/// Service for managing the bot registry.
#[derive(Clone)]
pub struct BotService {
    db: PgPool,
}

impl BotService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Registers a new bot. The handle must be unique; a duplicate fails
    /// with `Conflict` via the unique index rather than a racy pre-check.
    pub async fn register(&self, request: BotRegistrationRequest) -> Result<BotResponse> {
        let bot = Bot {
            id: Uuid::new_v4(),
            name: request.name,
            handle: request.handle,
            bank_code: request.bank_code,
            description: request.description,
            auth_type: request.auth_type.as_str().to_string(),
            credentials: Json(request.credentials),
            logo_url: request.logo_url,
            supported_features: Json(request.supported_features),
            created_at: Utc::now().timestamp(),
        };

        let result = sqlx::query(
            "INSERT INTO bots (id, name, handle, bank_code, description, auth_type, credentials, logo_url, supported_features, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(bot.id)
        .bind(&bot.name)
        .bind(&bot.handle)
        .bind(&bot.bank_code)
        .bind(&bot.description)
        .bind(&bot.auth_type)
        .bind(&bot.credentials)
        .bind(&bot.logo_url)
        .bind(&bot.supported_features)
        .bind(bot.created_at)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => {
                info!(bot_id = %bot.id, handle = %bot.handle, "Bot registered");
                Ok(bot.into())
            }
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(ApiError::Conflict(format!(
                    "Bot with handle {} already exists",
                    bot.handle
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lists bots with pagination and sorting. The response carries the
    /// narrow list projection plus the unpaginated total.
    pub async fn list(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
        sort: Option<&str>,
    ) -> Result<BotListResponse> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let offset = offset.unwrap_or(0);

        if !is_valid_limit(limit) || offset < 0 {
            return Err(ApiError::BadRequest(
                "Invalid pagination parameters".to_string(),
            ));
        }

        let sort = BotSort::parse(sort.unwrap_or("name"));

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bots")
            .fetch_one(&self.db)
            .await?;

        // order_clause is built from a fixed column whitelist, never from
        // raw client input
        let query = format!(
            "SELECT id, name, handle, bank_code, logo_url FROM bots ORDER BY {} LIMIT $1 OFFSET $2",
            sort.order_clause()
        );

        let items = sqlx::query_as::<_, BotListItem>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        Ok(BotListResponse { items, total })
    }

    pub async fn get(&self, bot_id: Uuid) -> Result<BotResponse> {
        let bot = sqlx::query_as::<_, Bot>(
            "SELECT id, name, handle, bank_code, description, auth_type, credentials, logo_url, supported_features, created_at
             FROM bots WHERE id = $1",
        )
        .bind(bot_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Bot not found with ID: {}", bot_id)))?;

        Ok(bot.into())
    }

    /// Partial update of the mutable fields (name, description, logo_url).
    /// Fields absent from the request keep their stored values.
    pub async fn update(&self, bot_id: Uuid, update: BotUpdateRequest) -> Result<BotResponse> {
        let bot = sqlx::query_as::<_, Bot>(
            "UPDATE bots
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 logo_url = COALESCE($4, logo_url)
             WHERE id = $1
             RETURNING id, name, handle, bank_code, description, auth_type, credentials, logo_url, supported_features, created_at",
        )
        .bind(bot_id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.logo_url)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Bot not found with ID: {}", bot_id)))?;

        info!(bot_id = %bot_id, "Bot updated");
        Ok(bot.into())
    }

    /// Hard delete. Sessions and webhooks referencing the bot go with it
    /// through the store-level cascade.
    pub async fn delete(&self, bot_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM bots WHERE id = $1")
            .bind(bot_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!(
                "Bot not found with ID: {}",
                bot_id
            )));
        }

        info!(bot_id = %bot_id, "Bot deleted");
        Ok(())
    }

    /// Substring search on name or handle with an optional exact bank-code
    /// filter. An empty query matches every bot.
    pub async fn search(
        &self,
        query: &str,
        bank_code: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<BotListItem>> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        if !is_valid_limit(limit) {
            return Err(ApiError::BadRequest("Invalid limit parameter".to_string()));
        }

        let pattern = format!("%{}%", query);

        let items = match bank_code {
            Some(code) => {
                sqlx::query_as::<_, BotListItem>(
                    "SELECT id, name, handle, bank_code, logo_url FROM bots
                     WHERE (name ILIKE $1 OR handle ILIKE $1) AND bank_code = $2
                     ORDER BY name ASC LIMIT $3",
                )
                .bind(&pattern)
                .bind(code)
                .bind(limit)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, BotListItem>(
                    "SELECT id, name, handle, bank_code, logo_url FROM bots
                     WHERE name ILIKE $1 OR handle ILIKE $1
                     ORDER BY name ASC LIMIT $2",
                )
                .bind(&pattern)
                .bind(limit)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(items)
    }

    /// Point-in-time existence check used by webhook registration and the
    /// event ingress endpoint.
    pub async fn exists(&self, bot_id: Uuid) -> Result<bool> {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM bots WHERE id = $1")
            .bind(bot_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_defaults_to_name_ascending() {
        let sort = BotSort::parse("name");
        assert_eq!(sort.column, "name");
        assert!(!sort.descending);

        // Unrecognized fields fall back rather than erroring
        assert_eq!(BotSort::parse("balance"), BotSort::parse("name"));
        assert_eq!(BotSort::parse(""), BotSort::parse("name"));
    }

    #[test]
    fn test_sort_leading_dash_means_descending() {
        let sort = BotSort::parse("-name");
        assert_eq!(sort.column, "name");
        assert!(sort.descending);

        let sort = BotSort::parse("-created_at");
        assert_eq!(sort.column, "created_at");
        assert!(sort.descending);
    }

    #[test]
    fn test_sort_order_clause_is_whitelisted() {
        assert_eq!(BotSort::parse("name").order_clause(), "name ASC");
        assert_eq!(BotSort::parse("-created_at").order_clause(), "created_at DESC");
        // Injection attempts collapse to the default column
        assert_eq!(
            BotSort::parse("name; DROP TABLE bots").order_clause(),
            "name ASC"
        );
    }
}
