// Utility functions
// Request metadata extraction, input validation and webhook signing.

pub mod request_info;
pub mod signature;
pub mod validation;

pub use request_info::extract_ip_address;
