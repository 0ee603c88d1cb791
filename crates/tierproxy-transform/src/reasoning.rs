use serde_json::Value;
use tierproxy_common::BackendType;

/// Deletes the top-level `thinking`/`effort` reasoning parameters unless the
/// target backend/model combination understands them.
pub fn strip_reasoning_params(body: &mut Value, backend: BackendType, outbound_model: &str) {
    if backend.is_reasoning_capable(outbound_model) {
        return;
    }
    if let Some(object) = body.as_object_mut() {
        object.remove("thinking");
        object.remove("effort");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_when_not_reasoning_capable() {
        let mut body = json!({"model": "x", "thinking": {"type": "enabled"}, "effort": "high"});
        strip_reasoning_params(&mut body, BackendType::Glm, "glm-4.7");
        assert!(body.get("thinking").is_none());
        assert!(body.get("effort").is_none());
    }

    #[test]
    fn keeps_for_reasoning_capable_anthropic_model() {
        let mut body = json!({"thinking": {"type": "enabled"}, "effort": "high"});
        strip_reasoning_params(&mut body, BackendType::Anthropic, "claude-sonnet-4-5");
        assert!(body.get("thinking").is_some());
        assert!(body.get("effort").is_some());
    }

    #[test]
    fn strips_for_anthropic_non_reasoning_model() {
        let mut body = json!({"thinking": {"type": "enabled"}});
        strip_reasoning_params(&mut body, BackendType::Anthropic, "claude-3-5-haiku-20241022");
        assert!(body.get("thinking").is_none());
    }
}
