// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::config::SenytlConfig;
use crate::model::MockResponse;
use crate::providers::openai::ChatMessage;
use crate::providers::{ChatCompletion, ChatCompletionRequest, Sdk};
use tempfile::TempDir;

fn unreachable_openai(_: ChatCompletionRequest) -> Result<ChatCompletion, SenytlError> {
    Err(SenytlError::agent("real client should not be called"))
}

fn setup() -> (TempDir, Senytl) {
    let dir = TempDir::new().unwrap();
    let sdk = Sdk::new().with_openai(unreachable_openai);
    let senytl = Senytl::with_config(sdk, dir.path(), SenytlConfig::default());
    (dir, senytl)
}

fn ask(sdk: &Sdk, input: &str) -> Result<String, SenytlError> {
    let reply = sdk.chat_completions_create(ChatCompletionRequest::new(
        "gpt-4",
        vec![ChatMessage::user(input)],
    ))?;
    Ok(reply.content().unwrap_or_default().to_string())
}

#[test]
fn test_run_collects_trace_and_conversation() {
    let (_dir, senytl) = setup();
    senytl
        .mock("gpt-4")
        .always()
        .respond(MockResponse::new("booked").with_tools(["book_flight"]));

    let sdk = senytl.sdk().clone();
    let agent = senytl.wrap(move |input: &str| ask(&sdk, input));
    let response = agent.run("book me a flight").unwrap();

    assert_eq!(response.text, "booked");
    assert_eq!(response.llm_calls.len(), 1);
    assert!(response.called_tool("book_flight"));
    assert_eq!(
        agent.conversation(),
        vec![
            ConversationMessage {
                role: "user".into(),
                content: "book me a flight".into()
            },
            ConversationMessage {
                role: "assistant".into(),
                content: "booked".into()
            },
        ]
    );
}

#[test]
fn test_failed_run_closes_context() {
    let (_dir, senytl) = setup();
    let sdk = senytl.sdk().clone();
    let agent = senytl.wrap(move |input: &str| ask(&sdk, input));

    let err = agent.run("nothing matches this").unwrap_err();
    assert!(err.is_no_match());
    assert!(agent.conversation().is_empty());
    assert!(!crate::run::is_active(senytl.id()));
}

#[test]
fn test_runs_are_independent() {
    let (_dir, senytl) = setup();
    senytl.mock("gpt-4").always().respond_sequence(["one", "two"]);
    let sdk = senytl.sdk().clone();
    let agent = senytl.wrap(move |input: &str| ask(&sdk, input));

    let first = agent.run("a").unwrap();
    let second = agent.run("b").unwrap();
    assert_eq!(first.text, "one");
    assert_eq!(second.text, "two");
    assert_eq!(first.llm_calls.len(), 1);
    assert_eq!(second.llm_calls.len(), 1);
    assert_eq!(agent.conversation().len(), 4);
}

#[test]
fn test_agent_without_llm_calls() {
    let (_dir, senytl) = setup();
    let agent =
        senytl.wrap(|input: &str| -> Result<String, SenytlError> { Ok(input.to_uppercase()) });
    let response = agent.run("hi").unwrap();
    assert_eq!(response.text, "HI");
    assert!(response.llm_calls.is_empty());
    assert!(response.tool_calls.is_empty());
}
