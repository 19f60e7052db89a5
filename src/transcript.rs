use serde_json::Value;

/// `user`, `assistant` and `system` records are the conversation itself;
/// everything else in a transcript is bookkeeping around them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Assistant,
    System,
}

/// Best-effort classification of a single transcript line. Every line gets
/// exactly one class; nothing here is fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum LineClass {
    Message {
        kind: MessageKind,
        invocation_ids: Vec<String>,
    },
    ToolCall {
        invocation_ids: Vec<String>,
    },
    ToolResult {
        tool_use_id: Option<String>,
    },
    /// Parsed as a JSON object but with an unknown or missing `type`.
    Other,
    /// Not a single JSON object; carried verbatim wherever it lands.
    Opaque,
}

impl LineClass {
    pub fn is_message(&self) -> bool {
        matches!(self, LineClass::Message { .. })
    }

    pub fn is_assistant(&self) -> bool {
        matches!(
            self,
            LineClass::Message {
                kind: MessageKind::Assistant,
                ..
            }
        )
    }
}

/// Parses a line as a single JSON object, or `None` for opaque text.
pub fn parse_record(line: &str) -> Option<Value> {
    serde_json::from_str::<Value>(line)
        .ok()
        .filter(|v| v.is_object())
}

pub fn classify(line: &str) -> LineClass {
    let Some(record) = parse_record(line) else {
        return LineClass::Opaque;
    };
    match record["type"].as_str() {
        Some("user") => LineClass::Message {
            kind: MessageKind::User,
            invocation_ids: Vec::new(),
        },
        Some("assistant") => LineClass::Message {
            kind: MessageKind::Assistant,
            invocation_ids: invocation_ids(&record),
        },
        Some("system") => LineClass::Message {
            kind: MessageKind::System,
            invocation_ids: Vec::new(),
        },
        Some("tool_call") => LineClass::ToolCall {
            invocation_ids: invocation_ids(&record),
        },
        Some("tool_result") => LineClass::ToolResult {
            tool_use_id: record["tool_use_id"].as_str().map(str::to_string),
        },
        _ => LineClass::Other,
    }
}

/// The content array lives at `message.content` in Claude Code transcripts
/// and at `content` in flatter tool-call shapes; accept either.
pub fn content_items(record: &Value) -> Option<&Vec<Value>> {
    record["message"]["content"]
        .as_array()
        .or_else(|| record["content"].as_array())
}

/// Harvests every invocation identifier a record carries: `tool_use` content
/// items with an `id`, plus a top-level `id` on `tool_call` records.
pub fn invocation_ids(record: &Value) -> Vec<String> {
    let mut ids = Vec::new();
    if record["type"].as_str() == Some("tool_call") {
        if let Some(id) = record["id"].as_str() {
            ids.push(id.to_string());
        }
    }
    if let Some(items) = content_items(record) {
        for item in items {
            if item["type"] == "tool_use" {
                if let Some(id) = item["id"].as_str() {
                    ids.push(id.to_string());
                }
            }
        }
    }
    ids
}

/// Flattens a record's content into plain text: a bare string is taken as-is,
/// an array contributes its `text` items and nested string content.
pub fn content_text(record: &Value) -> String {
    let content = if record["content"].is_null() {
        &record["message"]["content"]
    } else {
        &record["content"]
    };
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                item["text"]
                    .as_str()
                    .or_else(|| item["content"].as_str())
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// The tool name on `tool_call` / `tool_result` records. Transcripts carry
/// both `bash` and `Bash` in the wild, so callers compare case-insensitively.
pub fn record_name(record: &Value) -> Option<&str> {
    record["name"]
        .as_str()
        .or_else(|| record["tool_name"].as_str())
}
