use anyhow::Result;
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{BotAuthType, BotCredentials};

pub type DatabasePool = Pool<Postgres>;

pub async fn setup_database(config: &Config) -> Result<DatabasePool> {
    info!("Connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(180))
        .test_before_acquire(true)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("SET timezone = 'UTC'").execute(&mut *conn).await?;
                sqlx::query("SET statement_timeout = '15s'")
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    info!("✅ Database connection established");

    Ok(pool)
}

pub async fn run_migrations(pool: &DatabasePool) -> Result<()> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations").run(pool).await?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Seeds the three sample bank bots when the bots table is empty.
/// Gated behind `LOAD_SAMPLE_DATA`, intended for local development.
pub async fn seed_sample_bots(pool: &DatabasePool) -> Result<()> {
    let bot_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bots")
        .fetch_one(pool)
        .await?;

    if bot_count > 0 {
        info!("Database already contains data, skipping sample data population");
        return Ok(());
    }

    info!("Loading sample data...");

    let samples = [
        (
            "Сбербанк",
            "@sberbank",
            "SBER",
            "Официальный бот Сбербанка для выгрузки счетов и транзакций",
            "https://www.sberbank.ru/static/logo.png",
            BotAuthType::OAuth2,
            BotCredentials {
                client_id: Some("sber-client-id".to_string()),
                client_secret: Some("sber-client-secret".to_string()),
                authorization_url: Some("https://api.sberbank.ru/oauth/authorize".to_string()),
                token_url: Some("https://api.sberbank.ru/oauth/token".to_string()),
                ..Default::default()
            },
            serde_json::json!(["accounts", "transactions", "balance"]),
        ),
        (
            "Тинькофф",
            "@tinkoff",
            "TINK",
            "Официальный бот Тинькофф Банка для выгрузки счетов и транзакций",
            "https://www.tinkoff.ru/static/logo.png",
            BotAuthType::ApiKey,
            BotCredentials {
                api_key: Some("sample-api-key-field".to_string()),
                ..Default::default()
            },
            serde_json::json!(["accounts", "transactions", "balance", "categories"]),
        ),
        (
            "ВТБ",
            "@vtb",
            "VTB",
            "Официальный бот ВТБ для выгрузки счетов и транзакций",
            "https://www.vtb.ru/static/logo.png",
            BotAuthType::LoginPassword,
            BotCredentials {
                auth_endpoint: Some("https://api.vtb.ru/auth".to_string()),
                username_field: Some("login".to_string()),
                password_field: Some("password".to_string()),
                ..Default::default()
            },
            serde_json::json!(["accounts", "transactions"]),
        ),
    ];

    for (name, handle, bank_code, description, logo_url, auth_type, credentials, features) in
        samples
    {
        sqlx::query(
            "INSERT INTO bots (id, name, handle, bank_code, description, auth_type, credentials, logo_url, supported_features, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(handle)
        .bind(bank_code)
        .bind(description)
        .bind(auth_type.as_str())
        .bind(serde_json::to_value(&credentials)?)
        .bind(logo_url)
        .bind(features)
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?;
    }

    info!("Sample data populated successfully");
    Ok(())
}
