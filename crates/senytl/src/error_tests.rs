// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;

#[test]
fn test_no_match_message_quotes_snippet() {
    let err = SenytlError::NoMockMatch {
        provider: Provider::OpenAi,
        model: "gpt-4".to_string(),
        prompt: "where is my order".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "No mock matched provider='openai' model='gpt-4'. Prompt snippet: \"where is my order\""
    );
    assert!(err.is_no_match());
}

#[test]
fn test_no_match_snippet_is_truncated() {
    let err = SenytlError::NoMockMatch {
        provider: Provider::Anthropic,
        model: "claude-3".to_string(),
        prompt: "é".repeat(500),
    };
    let message = err.to_string();
    assert!(message.contains(&"é".repeat(200)));
    assert!(!message.contains(&"é".repeat(201)));
}

#[test]
fn test_upstream_keeps_source() {
    let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timeout");
    let err = SenytlError::upstream(Provider::Google, io);
    assert_eq!(err.to_string(), "google request failed: socket timeout");
    assert!(std::error::Error::source(&err).is_some());
    assert!(!err.is_no_match());
}

#[test]
fn test_recording_not_found_message() {
    let err = SenytlError::RecordingNotFound {
        path: PathBuf::from("/tmp/sessions/missing.json"),
    };
    assert_eq!(
        err.to_string(),
        "Recording session not found: /tmp/sessions/missing.json"
    );
}
