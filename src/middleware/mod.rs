// Middleware module - rate limiting, logging, metrics, security headers.

pub mod metrics;
pub mod rate_limit;
pub mod request_logger;
pub mod security_headers;

pub use metrics::metrics_middleware;
pub use rate_limit::{RateLimiter, rate_limit_middleware};
pub use request_logger::request_logger_middleware;
pub use security_headers::add_security_headers;
