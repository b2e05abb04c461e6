pub mod accounts;
pub mod auth;
pub mod authorization;
pub mod bots;
pub mod health;
pub mod metrics;
pub mod webhooks;
