// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::prompt::extract_prompt;
use serde_json::json;

#[test]
fn test_normalize_uses_prompt_key_without_model() {
    let request = GenerateContentRequest::new("gemini-pro", "tell me a joke")
        .with_option("generation_config", json!({"temperature": 0}));

    let normalized = GoogleWire::normalize(&request);
    assert_eq!(
        normalized,
        json!({"prompt": "tell me a joke", "generation_config": {"temperature": 0}})
    );
    assert_eq!(extract_prompt(&normalized), "tell me a joke");
}

#[test]
fn test_synthesize_text_and_function_calls() {
    let response = MockResponse::new("sunny").with_tool_call(ToolCall::new("weather").with_arg("city", "Paris"));
    let synthesized = synthesize(&response);

    assert_eq!(synthesized.text(), "sunny");
    let candidate = &synthesized.candidates[0];
    assert_eq!(candidate.finish_reason.as_deref(), Some("STOP"));
    assert_eq!(candidate.content.role, "model");
    assert_eq!(parse(&synthesized), response);
}

#[test]
fn test_wire_format_is_camel_case() {
    let value = serde_json::to_value(synthesize(&MockResponse::new("x"))).unwrap();
    assert_eq!(value["candidates"][0]["finishReason"], "STOP");
    assert_eq!(value["candidates"][0]["content"]["parts"][0]["text"], "x");
}

#[test]
fn test_parse_real_reply() {
    let reply: GenerateContentResponse = serde_json::from_value(json!({
        "candidates": [{"content": {"role": "model", "parts": [
            {"text": "a"},
            {"functionCall": {"name": "f", "args": {"n": 1}}},
            {"text": "b"},
        ]}}],
        "usageMetadata": {"totalTokenCount": 3},
    }))
    .unwrap();

    let parsed = parse(&reply);
    assert_eq!(parsed.text, "ab");
    assert_eq!(parsed.tool_calls, vec![ToolCall::new("f").with_arg("n", 1)]);
}

#[test]
fn test_empty_reply() {
    assert_eq!(GenerateContentResponse::default().text(), "");
    assert_eq!(parse(&GenerateContentResponse::default()), MockResponse::default());
}
