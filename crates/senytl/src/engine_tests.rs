// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use rstest::rstest;
use serde_json::json;

fn chat(prompt: &str) -> Value {
    json!({"messages": [{"role": "user", "content": prompt}]})
}

fn rule(model: &str, matcher: MatchSpec, text: &str) -> Arc<MockRule> {
    Arc::new(MockRule::new(
        Provider::OpenAi,
        model,
        matcher,
        MockResponse::new(text),
    ))
}

fn resolved_text(resolution: Resolution) -> String {
    match resolution {
        Resolution::Resolved(response) => response.text,
        Resolution::PassThrough(pass) => panic!("unexpected pass-through: {:?}", pass),
    }
}

#[test]
fn test_last_registered_rule_wins() {
    let engine = MockEngine::default();
    engine.add_rule(rule("gpt-4", MatchSpec::contains("hello"), "first"));
    engine.add_rule(rule("gpt-4", MatchSpec::contains("hello"), "second"));

    let resolution = engine.handle(Provider::OpenAi, "gpt-4", &chat("hello")).unwrap();
    assert_eq!(resolved_text(resolution), "second");
}

#[test]
fn test_newer_non_matching_rule_is_skipped() {
    let engine = MockEngine::default();
    engine.add_rule(rule("gpt-4", MatchSpec::any(), "catch-all"));
    engine.add_rule(rule("gpt-4", MatchSpec::contains("refund"), "refund"));

    let resolution = engine.handle(Provider::OpenAi, "gpt-4", &chat("hello")).unwrap();
    assert_eq!(resolved_text(resolution), "catch-all");
}

#[test]
fn test_provider_and_model_must_match_exactly() {
    let engine = MockEngine::default();
    engine.add_rule(rule("gpt-4", MatchSpec::any(), "hit"));

    assert!(engine.handle(Provider::OpenAi, "gpt-4o", &chat("x")).is_err());
    assert!(engine.handle(Provider::Anthropic, "gpt-4", &chat("x")).is_err());
}

#[test]
fn test_sequence_clamps_at_last_response() {
    let engine = MockEngine::default();
    let seq = engine.add_rule(Arc::new(MockRule::with_sequence(
        Provider::OpenAi,
        "gpt-4",
        MatchSpec::any(),
        vec![MockResponse::new("a"), MockResponse::new("b")],
    )));

    let texts: Vec<String> = (0..4)
        .map(|_| resolved_text(engine.handle(Provider::OpenAi, "gpt-4", &chat("q")).unwrap()))
        .collect();
    assert_eq!(texts, vec!["a", "b", "b", "b"]);
    assert_eq!(seq.cursor(), 4);
    assert_eq!(seq.match_count(), 4);
}

#[test]
fn test_empty_sequence_yields_empty_text() {
    let rule = MockRule::with_sequence(Provider::OpenAi, "m", MatchSpec::any(), vec![]);
    assert_eq!(rule.sequence().map(<[MockResponse]>::len), Some(1));
    assert_eq!(rule.take_response("p").text, "");
}

#[test]
fn test_history_records_prompts() {
    let engine = MockEngine::default();
    let r = engine.add_rule(rule("gpt-4", MatchSpec::any(), "ok"));
    engine.handle(Provider::OpenAi, "gpt-4", &chat("one")).unwrap();
    engine.handle(Provider::OpenAi, "gpt-4", &chat("two")).unwrap();

    let prompts: Vec<String> = r.history().into_iter().map(|t| t.prompt).collect();
    assert_eq!(prompts, vec!["one", "two"]);
}

#[test]
fn test_reset_state_rewinds_sequence() {
    let r = MockRule::with_sequence(
        Provider::OpenAi,
        "m",
        MatchSpec::any(),
        vec![MockResponse::new("a"), MockResponse::new("b")],
    );
    r.take_response("p");
    r.set_scratch("turns", 1);
    r.reset_state();

    assert_eq!(r.cursor(), 0);
    assert_eq!(r.scratch("turns"), None);
    assert_eq!(r.take_response("p").text, "a");
}

#[test]
fn test_fallback_error_carries_prompt() {
    let engine = MockEngine::new(FallbackMode::Error);
    let err = engine
        .handle(Provider::OpenAi, "gpt-4", &chat("unmatched prompt"))
        .unwrap_err();
    match err {
        SenytlError::NoMockMatch { provider, model, prompt } => {
            assert_eq!(provider, Provider::OpenAi);
            assert_eq!(model, "gpt-4");
            assert_eq!(prompt, "unmatched prompt");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fallback_default_is_empty_response() {
    let engine = MockEngine::new(FallbackMode::Default);
    let resolution = engine.handle(Provider::Google, "gemini", &json!({"prompt": "x"})).unwrap();
    assert_eq!(resolution, Resolution::Resolved(MockResponse::default()));
}

#[test]
fn test_fallback_pass_through_returns_request() {
    let engine = MockEngine::new(FallbackMode::PassThrough);
    let request = chat("x");
    let resolution = engine.handle(Provider::OpenAi, "gpt-4", &request).unwrap();
    assert_eq!(
        resolution,
        Resolution::PassThrough(PassThroughRequest {
            provider: Provider::OpenAi,
            model: "gpt-4".into(),
            request,
        })
    );
}

#[rstest]
#[case(FallbackMode::Error)]
#[case(FallbackMode::Default)]
#[case(FallbackMode::PassThrough)]
fn test_reset_keeps_fallback(#[case] mode: FallbackMode) {
    let engine = MockEngine::new(mode);
    engine.add_rule(rule("gpt-4", MatchSpec::any(), "ok"));
    engine.reset();
    assert!(engine.is_empty());
    assert_eq!(engine.fallback(), mode);
}
