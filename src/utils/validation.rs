// Shared validation patterns for request payloads.

use once_cell::sync::Lazy;
use regex::Regex;

/// Bot handle: leading `@`, then 3-50 chars of letters, digits, `_` or `-`.
/// Length is enforced separately by the validator attribute.
pub static RE_BOT_HANDLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@[A-Za-z0-9_-]+$").expect("valid regex"));

/// Bank code: 2-10 uppercase letters, e.g. `SBER`.
pub static RE_BANK_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,10}$").expect("valid regex"));

/// http(s) URL with a non-empty host.
pub static RE_HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?)://[^\s/$.?#].[^\s]*$").expect("valid regex"));

/// Calendar date in `YYYY-MM-DD` form.
pub static RE_ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Checks a transaction date filter before it reaches a comparison.
pub fn is_valid_iso_date(value: &str) -> bool {
    RE_ISO_DATE.is_match(value)
}

/// Page sizes accepted by the list endpoints.
pub fn is_valid_limit(limit: i64) -> bool {
    (1..=100).contains(&limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_handle_pattern() {
        assert!(RE_BOT_HANDLE.is_match("@sberbank"));
        assert!(RE_BOT_HANDLE.is_match("@bank_bot-2"));
        assert!(!RE_BOT_HANDLE.is_match("sberbank"));
        assert!(!RE_BOT_HANDLE.is_match("@sber bank"));
        assert!(!RE_BOT_HANDLE.is_match("@сбер"));
    }

    #[test]
    fn test_bank_code_pattern() {
        assert!(RE_BANK_CODE.is_match("SBER"));
        assert!(RE_BANK_CODE.is_match("VTB"));
        assert!(!RE_BANK_CODE.is_match("sber"));
        assert!(!RE_BANK_CODE.is_match("S"));
        assert!(!RE_BANK_CODE.is_match("TOOLONGBANKCODE"));
    }

    #[test]
    fn test_http_url_pattern() {
        assert!(RE_HTTP_URL.is_match("https://bank.example.com/webhooks"));
        assert!(RE_HTTP_URL.is_match("http://localhost:8080/hook"));
        assert!(!RE_HTTP_URL.is_match("ftp://bank.example.com"));
        assert!(!RE_HTTP_URL.is_match("not a url"));
    }

    #[test]
    fn test_iso_date() {
        assert!(is_valid_iso_date("2025-04-29"));
        assert!(!is_valid_iso_date("29-04-2025"));
        assert!(!is_valid_iso_date("2025-4-29"));
        assert!(!is_valid_iso_date("2025-04-29T10:00:00Z"));
    }

    #[test]
    fn test_limit_bounds() {
        assert!(is_valid_limit(1));
        assert!(is_valid_limit(100));
        assert!(!is_valid_limit(0));
        assert!(!is_valid_limit(101));
        assert!(!is_valid_limit(-5));
    }
}
