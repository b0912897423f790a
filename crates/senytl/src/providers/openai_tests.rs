// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use serde_json::json;

#[test]
fn test_request_deserializes_extra_options() {
    let request: ChatCompletionRequest = serde_json::from_value(json!({
        "model": "gpt-4",
        "messages": [{"role": "user", "content": "hi"}],
        "temperature": 0.2,
    }))
    .unwrap();

    assert_eq!(request.model, "gpt-4");
    assert_eq!(request.messages, vec![ChatMessage::user("hi")]);
    assert_eq!(request.options["temperature"], json!(0.2));
}

#[test]
fn test_normalize_keeps_model_messages_and_options() {
    let request = ChatCompletionRequest::new("gpt-4", vec![ChatMessage::user("hi")])
        .with_option("temperature", 0);

    assert_eq!(
        OpenAiWire::normalize(&request),
        json!({
            "model": "gpt-4",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0,
        })
    );
}

#[test]
fn test_content_parts_round_trip_through_serde() {
    let raw = json!({"role": "user", "content": [{"type": "text", "text": "a"}, {"type": "image_url", "image_url": {"url": "u"}}]});
    let message: ChatMessage = serde_json::from_value(raw.clone()).unwrap();
    assert!(matches!(message.content, Some(MessageContent::Parts(ref p)) if p.len() == 2));
    assert_eq!(serde_json::to_value(&message).unwrap(), raw);
}

#[test]
fn test_synthesize_shape() {
    let response = MockResponse::new("hi").with_tool_call(ToolCall::new("lookup").with_arg("id", 7));
    let completion = synthesize(&response, "gpt-4");

    assert_eq!(completion.id, "senytl-mock");
    assert_eq!(completion.object, "chat.completion");
    assert_eq!(completion.content(), Some("hi"));

    let choice = &completion.choices[0];
    assert_eq!(choice.finish_reason.as_deref(), Some("stop"));
    assert_eq!(choice.message.role, "assistant");
    let call = &choice.message.tool_calls[0];
    assert_eq!(call.id, "senytl-toolcall-0");
    assert_eq!(call.kind, "function");
    assert_eq!(call.function.name, "lookup");
    assert_eq!(call.function.arguments, json!(r#"{"id":7}"#));
}

#[test]
fn test_parse_accepts_string_or_object_arguments() {
    let completion: ChatCompletion = serde_json::from_value(json!({
        "choices": [{"message": {"role": "assistant", "content": null, "tool_calls": [
            {"id": "1", "type": "function", "function": {"name": "a", "arguments": "{\"x\": 1}"}},
            {"id": "2", "type": "function", "function": {"name": "b", "arguments": {"y": 2}}},
            {"id": "3", "type": "function", "function": {"name": "", "arguments": "{}"}},
            {"id": "4", "type": "function", "function": {"name": "c", "arguments": "not json"}},
        ]}}]
    }))
    .unwrap();

    let parsed = parse(&completion);
    assert_eq!(parsed.text, "");
    let names: Vec<&str> = parsed.tool_calls.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(parsed.tool_calls[0].args["x"], 1);
    assert_eq!(parsed.tool_calls[1].args["y"], 2);
    assert!(parsed.tool_calls[2].args.is_empty());
}

#[test]
fn test_parse_without_choices_is_empty() {
    assert_eq!(parse(&ChatCompletion::default()), MockResponse::default());
}

#[test]
fn test_synthesize_then_parse_preserves_content() {
    let response = MockResponse::new("done").with_tool_call(ToolCall::new("t").with_arg("k", "v"));
    assert_eq!(parse(&synthesize(&response, "m")), response);
}
