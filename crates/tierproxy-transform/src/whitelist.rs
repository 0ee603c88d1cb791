use serde_json::{Map, Value, json};

const TOP_LEVEL_KEYS: [&str; 10] = [
    "model",
    "messages",
    "system",
    "tools",
    "tool_choice",
    "max_tokens",
    "stream",
    "temperature",
    "top_p",
    "top_k",
];
const TOP_LEVEL_EXTRA_KEY: &str = "stop_sequences";

/// Deep whitelist sanitization for the generic "custom" Anthropic-compatible
/// backend: keeps only the fields that backend is documented to accept, at
/// every nesting level. Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(body: &Value) -> Value {
    let mut out = Map::new();

    for key in TOP_LEVEL_KEYS.iter().chain(std::iter::once(&TOP_LEVEL_EXTRA_KEY)) {
        let Some(value) = body.get(*key) else { continue };
        let sanitized = match *key {
            "messages" => sanitize_messages(value),
            "system" => sanitize_system(value),
            "tools" => sanitize_tools(value),
            _ => value.clone(),
        };
        out.insert((*key).to_string(), sanitized);
    }

    Value::Object(out)
}

fn sanitize_messages(value: &Value) -> Value {
    let Some(messages) = value.as_array() else {
        return json!([]);
    };
    Value::Array(messages.iter().map(sanitize_message).collect())
}

fn sanitize_message(message: &Value) -> Value {
    let mut out = Map::new();
    if let Some(role) = message.get("role") {
        out.insert("role".to_string(), role.clone());
    }
    if let Some(content) = message.get("content") {
        out.insert("content".to_string(), sanitize_content(content));
    }
    Value::Object(out)
}

fn sanitize_content(content: &Value) -> Value {
    match content {
        Value::String(_) => content.clone(),
        Value::Array(blocks) => Value::Array(
            blocks.iter().filter_map(sanitize_content_block).collect(),
        ),
        _ => json!([]),
    }
}

fn sanitize_content_block(block: &Value) -> Option<Value> {
    let block_type = block.get("type")?.as_str()?;
    let sanitized = match block_type {
        "text" => {
            let mut out = Map::new();
            out.insert("type".to_string(), json!("text"));
            out.insert("text".to_string(), block.get("text").cloned().unwrap_or(json!("")));
            Value::Object(out)
        }
        "tool_use" => {
            let mut out = Map::new();
            out.insert("type".to_string(), json!("tool_use"));
            out.insert("id".to_string(), block.get("id").cloned().unwrap_or(json!("")));
            out.insert("name".to_string(), block.get("name").cloned().unwrap_or(json!("")));
            out.insert("input".to_string(), sanitize_tool_use_input(block.get("input")));
            Value::Object(out)
        }
        "tool_result" => {
            let mut out = Map::new();
            out.insert("type".to_string(), json!("tool_result"));
            out.insert(
                "tool_use_id".to_string(),
                block.get("tool_use_id").cloned().unwrap_or(json!("")),
            );
            if let Some(content) = block.get("content") {
                out.insert("content".to_string(), sanitize_content(content));
            }
            if let Some(is_error) = block.get("is_error") {
                out.insert("is_error".to_string(), is_error.clone());
            }
            Value::Object(out)
        }
        "image" => {
            let mut out = Map::new();
            out.insert("type".to_string(), json!("image"));
            out.insert("source".to_string(), block.get("source").cloned().unwrap_or(json!(null)));
            Value::Object(out)
        }
        _ => return None,
    };
    Some(sanitized)
}

/// A malformed `tool_use.input` sometimes arrives JSON-encoded as a string
/// rather than an object; parse it, falling back to `{}` on failure.
fn sanitize_tool_use_input(input: Option<&Value>) -> Value {
    match input {
        Some(Value::String(s)) => {
            if s.is_empty() {
                json!({})
            } else {
                serde_json::from_str(s).unwrap_or_else(|_| json!({}))
            }
        }
        Some(other) => other.clone(),
        None => json!({}),
    }
}

fn sanitize_system(value: &Value) -> Value {
    match value {
        Value::String(_) => value.clone(),
        Value::Array(blocks) => Value::Array(
            blocks
                .iter()
                .map(|block| {
                    let mut out = Map::new();
                    if let Some(t) = block.get("type") {
                        out.insert("type".to_string(), t.clone());
                    }
                    if let Some(text) = block.get("text") {
                        out.insert("text".to_string(), text.clone());
                    }
                    Value::Object(out)
                })
                .collect(),
        ),
        _ => value.clone(),
    }
}

fn sanitize_tools(value: &Value) -> Value {
    let Some(tools) = value.as_array() else {
        return value.clone();
    };
    Value::Array(
        tools
            .iter()
            .map(|tool| {
                let mut out = Map::new();
                for key in ["name", "description", "input_schema", "type"] {
                    if let Some(v) = tool.get(key) {
                        out.insert(key.to_string(), v.clone());
                    }
                }
                Value::Object(out)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_non_whitelisted_top_level_and_block_fields() {
        let body = json!({
            "model": "m",
            "cache_control": {"type": "ephemeral"},
            "messages": [{
                "role": "user",
                "content": [{"type": "text", "text": "hi", "citations": ["x"], "cache_control": {}}],
            }],
        });
        let sanitized = sanitize(&body);
        assert!(sanitized.get("cache_control").is_none());
        let block = &sanitized["messages"][0]["content"][0];
        assert_eq!(block["text"], "hi");
        assert!(block.get("citations").is_none());
        assert!(block.get("cache_control").is_none());
    }

    #[test]
    fn parses_stringified_tool_use_input() {
        let body = json!({
            "messages": [{
                "role": "assistant",
                "content": [{"type": "tool_use", "id": "x", "name": "f", "input": "{\"a\":1}"}],
            }],
        });
        let sanitized = sanitize(&body);
        assert_eq!(sanitized["messages"][0]["content"][0]["input"], json!({"a": 1}));
    }

    #[test]
    fn malformed_tool_use_input_string_becomes_empty_object() {
        let body = json!({
            "messages": [{
                "role": "assistant",
                "content": [{"type": "tool_use", "id": "x", "name": "f", "input": "not json"}],
            }],
        });
        let sanitized = sanitize(&body);
        assert_eq!(sanitized["messages"][0]["content"][0]["input"], json!({}));
    }

    #[test]
    fn drops_unknown_content_block_types() {
        let body = json!({
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "thinking", "thinking": "hmm"},
                    {"type": "text", "text": "hi"},
                ],
            }],
        });
        let sanitized = sanitize(&body);
        let content = sanitized["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
    }

    #[test]
    fn never_drops_messages() {
        let body = json!({
            "messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": [{"type": "thinking", "thinking": "x"}]},
            ],
        });
        let sanitized = sanitize(&body);
        assert_eq!(sanitized["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn sanitization_is_idempotent() {
        let body = json!({
            "model": "m",
            "messages": [{
                "role": "user",
                "content": [{"type": "tool_result", "tool_use_id": "t1", "content": [{"type":"text","text":"ok"}], "is_error": false}],
            }],
            "tools": [{"name": "f", "description": "d", "input_schema": {}, "type": "custom", "extra": 1}],
        });
        let once = sanitize(&body);
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }
}
