use bytes::Bytes;
use serde_json::{Value, json};

/// Repairs malformed SSE `tool_use` deltas on the fly: some upstreams emit
/// `content_block.input` / `delta.input` as a JSON-encoded string instead of
/// an object. Operates on whole lines so it never buffers more than the
/// current record; non-`data:` lines and `data: [DONE]` pass through
/// unchanged.
#[derive(Debug, Default)]
pub struct SseRepairer {
    buffer: Vec<u8>,
}

impl SseRepairer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Bytes {
        self.buffer.extend_from_slice(chunk);
        let mut out = Vec::with_capacity(chunk.len());
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            out.extend_from_slice(&repair_line(&line));
        }
        Bytes::from(out)
    }

    /// Flush any trailing partial line (no final newline from upstream).
    pub fn finish(&mut self) -> Bytes {
        if self.buffer.is_empty() {
            return Bytes::new();
        }
        let line = std::mem::take(&mut self.buffer);
        Bytes::from(repair_line(&line))
    }
}

fn repair_line(line: &[u8]) -> Vec<u8> {
    let Ok(text) = std::str::from_utf8(line) else {
        return line.to_vec();
    };
    let ending = if text.ends_with("\r\n") {
        "\r\n"
    } else if text.ends_with('\n') {
        "\n"
    } else {
        ""
    };
    let trimmed = text.trim_end_matches(['\n', '\r']);
    let Some(rest) = trimmed.strip_prefix("data:") else {
        return line.to_vec();
    };
    let json_part = rest.trim_start();
    if json_part == "[DONE]" || json_part.is_empty() {
        return line.to_vec();
    }

    let Ok(mut value) = serde_json::from_str::<Value>(json_part) else {
        return line.to_vec();
    };

    if !repair_event(&mut value) {
        return line.to_vec();
    }

    format!("data: {value}{ending}").into_bytes()
}

fn repair_event(value: &mut Value) -> bool {
    let mut changed = false;
    if let Some(content_block) = value.get_mut("content_block") {
        changed |= repair_input_field(content_block);
    }
    if let Some(delta) = value.get_mut("delta") {
        changed |= repair_input_field(delta);
    }
    if let Some(content) = value
        .get_mut("message")
        .and_then(|m| m.get_mut("content"))
        .and_then(Value::as_array_mut)
    {
        for block in content.iter_mut() {
            if block.get("type").and_then(Value::as_str) == Some("tool_use") {
                changed |= repair_input_field(block);
            }
        }
    }
    changed
}

fn repair_input_field(block: &mut Value) -> bool {
    let Some(map) = block.as_object_mut() else {
        return false;
    };
    let needs_repair = matches!(map.get("input"), Some(Value::String(_)));
    if !needs_repair {
        return false;
    }
    let Some(Value::String(raw)) = map.get("input").cloned() else {
        return false;
    };
    let parsed = if raw.is_empty() {
        json!({})
    } else {
        serde_json::from_str(&raw).unwrap_or_else(|_| json!({}))
    };
    map.insert("input".to_string(), parsed);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repairs_content_block_start_input() {
        let mut repairer = SseRepairer::new();
        let line = b"data: {\"type\":\"content_block_start\",\"content_block\":{\"type\":\"tool_use\",\"id\":\"x\",\"name\":\"f\",\"input\":\"{\\\"a\\\":1}\"}}\n";
        let out = repairer.push(line);
        let text = String::from_utf8(out.to_vec()).unwrap();
        assert!(text.contains("\"input\":{\"a\":1}"));
    }

    #[test]
    fn passes_done_terminator_unchanged() {
        let mut repairer = SseRepairer::new();
        let out = repairer.push(b"data: [DONE]\n");
        assert_eq!(&*out, b"data: [DONE]\n");
    }

    #[test]
    fn passes_non_data_lines_unchanged() {
        let mut repairer = SseRepairer::new();
        let out = repairer.push(b"event: ping\n\n");
        assert_eq!(&*out, b"event: ping\n\n");
    }

    #[test]
    fn handles_split_chunks_without_losing_data() {
        let mut repairer = SseRepairer::new();
        let mut out = repairer.push(b"data: {\"delta\":{\"input\":\"{\\\"x\\\":");
        out = {
            let mut combined = out.to_vec();
            combined.extend_from_slice(&repairer.push(b"2}\"}}\n"));
            Bytes::from(combined)
        };
        let text = String::from_utf8(out.to_vec()).unwrap();
        assert!(text.contains("\"input\":{\"x\":2}"));
    }

    #[test]
    fn finish_flushes_trailing_partial_line() {
        let mut repairer = SseRepairer::new();
        let _ = repairer.push(b"data: [DONE]");
        let out = repairer.finish();
        assert_eq!(&*out, b"data: [DONE]");
    }
}
