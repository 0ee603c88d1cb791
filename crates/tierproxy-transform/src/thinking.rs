use serde_json::Value;
use tierproxy_protocol::types::THINKING_BLOCK_TYPES;

/// Removes every `thinking`/`redacted_thinking` content block from every
/// message whose `content` is an array. Returns the number of blocks removed
/// so the caller can log the size delta.
pub fn strip_thinking_blocks(body: &mut Value) -> usize {
    let mut removed = 0;
    let Some(messages) = body.get_mut("messages").and_then(Value::as_array_mut) else {
        return 0;
    };

    for message in messages.iter_mut() {
        let Some(content) = message.get_mut("content").and_then(Value::as_array_mut) else {
            continue;
        };
        let before = content.len();
        content.retain(|block| {
            !block
                .get("type")
                .and_then(Value::as_str)
                .map(|t| THINKING_BLOCK_TYPES.contains(&t))
                .unwrap_or(false)
        });
        removed += before - content.len();
    }

    removed
}

/// Removes thinking/redacted_thinking blocks from an already-parsed response
/// body's top-level `content` array (the shape of a non-streaming Anthropic
/// Messages response). Used by the anthropic adapter's response post-filter.
pub fn strip_thinking_blocks_from_response(body: &mut Value) -> usize {
    let Some(content) = body.get_mut("content").and_then(Value::as_array_mut) else {
        return 0;
    };
    let before = content.len();
    content.retain(|block| {
        !block
            .get("type")
            .and_then(Value::as_str)
            .map(|t| THINKING_BLOCK_TYPES.contains(&t))
            .unwrap_or(false)
    });
    before - content.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_thinking_and_redacted_thinking_blocks() {
        let mut body = json!({
            "model": "x",
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "thinking", "thinking": "hmm"},
                    {"type": "text", "text": "hi"},
                    {"type": "redacted_thinking", "data": "abc"},
                ],
            }],
        });

        let removed = strip_thinking_blocks(&mut body);
        assert_eq!(removed, 2);
        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
    }

    #[test]
    fn leaves_string_content_untouched() {
        let mut body = json!({
            "messages": [{"role": "user", "content": "hello"}],
        });
        assert_eq!(strip_thinking_blocks(&mut body), 0);
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[test]
    fn response_post_filter_strips_thinking() {
        let mut body = json!({
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "hi"},
            ],
        });
        let removed = strip_thinking_blocks_from_response(&mut body);
        assert_eq!(removed, 1);
        assert_eq!(body["content"].as_array().unwrap().len(), 1);
    }
}
