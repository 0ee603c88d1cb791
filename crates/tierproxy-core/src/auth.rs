use http::HeaderMap;

/// Paths that never require the proxy-wide shared secret.
pub const BYPASS_PATHS: [&str; 2] = ["/health", "/favicon.ico"];

/// Looks for the presented key across `?key=`, `x-api-key`,
/// `Authorization: Bearer …`, `x-proxy-key`, in that order. First match
/// wins, matching the order the middleware checks them in (§4.5 step 1).
pub fn extract_presented_key(query_key: Option<&str>, headers: &HeaderMap) -> Option<String> {
    if let Some(key) = query_key {
        if !key.is_empty() {
            return Some(key.to_string());
        }
    }
    if let Some(value) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(value.to_string());
    }
    if let Some(value) = headers.get(http::header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }
    if let Some(value) = headers.get("x-proxy-key").and_then(|v| v.to_str().ok()) {
        return Some(value.to_string());
    }
    None
}

/// True when no secret is configured, or the presented key matches it.
pub fn authorized(configured_secret: Option<&str>, query_key: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(secret) = configured_secret else {
        return true;
    };
    matches!(extract_presented_key(query_key, headers), Some(presented) if presented == secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_secret_configured_allows_everything() {
        assert!(authorized(None, None, &HeaderMap::new()));
    }

    #[test]
    fn query_key_wins_first() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "wrong".parse().unwrap());
        assert!(authorized(Some("right"), Some("right"), &headers));
    }

    #[test]
    fn falls_back_to_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::AUTHORIZATION, "Bearer right".parse().unwrap());
        assert!(authorized(Some("right"), None, &headers));
    }

    #[test]
    fn mismatch_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("x-proxy-key", "wrong".parse().unwrap());
        assert!(!authorized(Some("right"), None, &headers));
    }

    #[test]
    fn missing_key_rejected_when_secret_configured() {
        assert!(!authorized(Some("right"), None, &HeaderMap::new()));
    }
}
