// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt text extraction from normalized requests.

use senytl_capture::canonical_json;
use serde_json::Value;

/// Flatten a chat message list into newline-joined text.
///
/// Plain strings pass through. Message objects contribute their `content`:
/// a string as-is, a block list by its `text` entries, anything else as JSON.
pub fn flatten_messages(messages: &Value) -> String {
    let items = match messages {
        Value::Null => return String::new(),
        Value::String(s) => return s.clone(),
        Value::Array(items) => items,
        other => return stringify(other),
    };

    let mut parts = Vec::new();
    for item in items {
        match item {
            Value::String(s) => parts.push(s.clone()),
            Value::Object(msg) => match msg.get("content") {
                Some(Value::String(s)) => parts.push(s.clone()),
                Some(Value::Array(blocks)) => {
                    parts.extend(blocks.iter().filter_map(block_text));
                }
                Some(Value::Null) | None => {}
                Some(other) => parts.push(stringify(other)),
            },
            other => parts.push(stringify(other)),
        }
    }
    parts.join("\n")
}

/// Text that rule predicates are evaluated against.
///
/// Looks at `prompt` (string), then `messages`, then `input` (string), and
/// falls back to the whole request serialized.
pub fn extract_prompt(request: &Value) -> String {
    if let Some(Value::String(prompt)) = request.get("prompt") {
        return prompt.clone();
    }
    if let Some(messages) = request.get("messages") {
        return flatten_messages(messages);
    }
    if let Some(Value::String(input)) = request.get("input") {
        return input.clone();
    }
    match request {
        Value::String(s) => s.clone(),
        other => canonical_json(other),
    }
}

/// Only `{type, text}` objects carry text; other block shapes are skipped.
fn block_text(block: &Value) -> Option<String> {
    block.as_object()?.get("text")?.as_str().map(str::to_string)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
