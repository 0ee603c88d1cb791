use tierproxy_common::BackendType;

/// Filters a comma-separated `anthropic-beta` header value down to the
/// tokens the target backend/model can actually use. Returns `None` when the
/// filtered result is empty (the header should then be omitted entirely).
pub fn filter_beta_header(raw: &str, backend: BackendType, reasoning_capable: bool) -> Option<String> {
    let filtered: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| !should_drop(token, backend, reasoning_capable))
        .collect();

    if filtered.is_empty() {
        None
    } else {
        Some(filtered.join(","))
    }
}

fn should_drop(token: &str, backend: BackendType, reasoning_capable: bool) -> bool {
    let lower = token.to_ascii_lowercase();
    if !reasoning_capable && (lower.contains("thinking") || lower.contains("effort")) {
        return true;
    }
    if backend == BackendType::GeminiBridge && lower.starts_with("thinking") {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_thinking_and_effort_tokens_for_non_reasoning_target() {
        let raw = "interleaved-thinking-2025-05-14,computer-use-2025-01-24,effort-2025-01-01";
        let filtered = filter_beta_header(raw, BackendType::GeminiBridge, false);
        assert_eq!(filtered.as_deref(), Some("computer-use-2025-01-24"));
    }

    #[test]
    fn keeps_thinking_token_for_reasoning_capable_target() {
        let raw = "interleaved-thinking-2025-05-14,computer-use-2025-01-24";
        let filtered = filter_beta_header(raw, BackendType::Anthropic, true);
        assert_eq!(filtered.as_deref(), raw.into());
    }

    #[test]
    fn empty_after_filtering_yields_none() {
        let raw = "interleaved-thinking-2025-05-14";
        assert_eq!(filter_beta_header(raw, BackendType::GeminiBridge, false), None);
    }

    #[test]
    fn gemini_bridge_drops_all_thinking_prefixed_tokens() {
        let raw = "thinking-extended,computer-use-2025-01-24";
        let filtered = filter_beta_header(raw, BackendType::GeminiBridge, false);
        assert_eq!(filtered.as_deref(), Some("computer-use-2025-01-24"));
    }
}
