// Data models and DTOs
// Database rows, API request/response models, webhook envelopes.

pub mod account;
pub mod bot;
pub mod session;
pub mod webhook;

pub use account::{Account, AccountBalance, Transaction};
pub use bot::{
    Bot, BotAuthType, BotCredentials, BotListItem, BotListResponse, BotRegistrationRequest,
    BotResponse, BotUpdateRequest,
};
pub use session::{ApiKeyAuthRequest, AuthorizeResponse, BotSession, LoginPasswordAuthRequest};
pub use webhook::{
    WebhookEvent, WebhookInfo, WebhookPayload, WebhookRecord, WebhookRegistration, WebhookResponse,
};
