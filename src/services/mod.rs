// Business logic services
// Bot registry, authorization flows, account data, webhook delivery.

pub mod account_service;
pub mod auth_service;
pub mod bot_service;
pub mod health_check;
pub mod webhook_service;

pub use account_service::{AccountService, TransactionFilter};
pub use auth_service::AuthService;
pub use bot_service::BotService;
pub use health_check::HealthChecker;
pub use webhook_service::WebhookService;
