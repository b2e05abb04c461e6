// Client metadata extraction from request headers.
// Used for rate-limit keying and request logging behind a reverse proxy.

use axum::http::HeaderMap;

/// Resolves the client IP for a request.
///
/// Proxies prepend the original client to `X-Forwarded-For`, so the first
/// entry wins. Falls back to `X-Real-IP`, then loopback when neither header
/// is present (direct connections in local setups).
pub fn extract_ip_address(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .filter(|ip| !ip.is_empty())
        .unwrap_or("127.0.0.1")
        .to_string()
}

/// User-Agent header value, if the client sent one.
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.2, 10.0.0.1"),
        );
        assert_eq!(extract_ip_address(&headers), "203.0.113.7");
    }

    #[test]
    fn test_forwarded_for_beats_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.9"));
        assert_eq!(extract_ip_address(&headers), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.9"));
        assert_eq!(extract_ip_address(&headers), "198.51.100.9");
    }

    #[test]
    fn test_empty_forwarded_for_is_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  "));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.9"));
        assert_eq!(extract_ip_address(&headers), "198.51.100.9");
    }

    #[test]
    fn test_loopback_default() {
        assert_eq!(extract_ip_address(&HeaderMap::new()), "127.0.0.1");
    }

    #[test]
    fn test_user_agent() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_static("bank-bot-sdk/1.2"));
        assert_eq!(
            extract_user_agent(&headers),
            Some("bank-bot-sdk/1.2".to_string())
        );
        assert_eq!(extract_user_agent(&HeaderMap::new()), None);
    }
}
