// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fluent assertions over agent responses.
//!
//! ```
//! # use senytl::{expect, AgentResponse, ToolCall};
//! # let response = AgentResponse {
//! #     text: "Your refund is on its way".into(),
//! #     tool_calls: vec![ToolCall::new("refund").with_arg("order", 42)],
//! #     llm_calls: vec![],
//! #     duration: std::time::Duration::from_millis(5),
//! # };
//! expect(&response)
//!     .to_contain("refund")
//!     .to_have_called_with("refund", &serde_json::json!({"order": 42}))
//!     .not_to_have_called("cancel");
//! ```

use crate::agent::AgentResponse;
use crate::matching::{jaccard_similarity, DEFAULT_SEMANTIC_THRESHOLD};
use regex::RegexBuilder;
use serde_json::Value;
use std::time::Duration;

pub fn expect(response: &AgentResponse) -> Expectation<'_> {
    Expectation { response }
}

/// Panicking checks against one response. Each returns `self` for chaining.
#[derive(Debug)]
pub struct Expectation<'a> {
    response: &'a AgentResponse,
}

impl Expectation<'_> {
    #[track_caller]
    pub fn to_contain(&self, text: &str) -> &Self {
        assert!(
            self.response.text.contains(text),
            "Expected response to contain {:?}. Got: {:?}",
            text,
            self.response.text
        );
        self
    }

    /// Case-insensitive regex search.
    #[track_caller]
    pub fn to_match(&self, pattern: &str) -> &Self {
        let matched = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(|re| re.is_match(&self.response.text));
        assert!(
            matches!(matched, Ok(true)),
            "Expected response to match /{}/. Got: {:?}{}",
            pattern,
            self.response.text,
            matched
                .err()
                .map(|e| format!(" (invalid pattern: {})", e))
                .unwrap_or_default()
        );
        self
    }

    #[track_caller]
    pub fn to_contain_intent(&self, intent: &str) -> &Self {
        self.to_contain_intent_with(intent, DEFAULT_SEMANTIC_THRESHOLD)
    }

    #[track_caller]
    pub fn to_contain_intent_with(&self, intent: &str, threshold: f64) -> &Self {
        let score = jaccard_similarity(&self.response.text, intent);
        assert!(
            score >= threshold,
            "Expected response to semantically match {:?} (threshold={}). Score={:.3}. Got: {:?}",
            intent,
            threshold,
            score,
            self.response.text
        );
        self
    }

    #[track_caller]
    pub fn to_have_called(&self, tool: &str) -> &Self {
        assert!(
            self.response.called_tool(tool),
            "Expected tool {:?} to be called. Calls: {:?}",
            tool,
            self.response.tool_names()
        );
        self
    }

    #[track_caller]
    pub fn not_to_have_called(&self, tool: &str) -> &Self {
        assert!(
            !self.response.called_tool(tool),
            "Expected tool {:?} to NOT be called. Calls: {:?}",
            tool,
            self.response.tool_names()
        );
        self
    }

    /// Some call to `tool` must carry every key of `expected` with an equal
    /// value. Extra arguments are ignored.
    #[track_caller]
    pub fn to_have_called_with(&self, tool: &str, expected: &Value) -> &Self {
        self.to_have_called(tool);
        let expected = expected.as_object();
        let found = self
            .response
            .tool_calls
            .iter()
            .filter(|tc| tc.name == tool)
            .any(|tc| match expected {
                Some(expected) => expected.iter().all(|(k, v)| tc.args.get(k) == Some(v)),
                None => true,
            });
        assert!(
            found,
            "Expected tool {:?} to be called with {}. Calls: {:?}",
            tool,
            expected.map(|m| Value::Object(m.clone())).unwrap_or_default(),
            self.response.tool_calls
        );
        self
    }

    #[track_caller]
    pub fn to_have_response_time_under(&self, limit: Duration) -> &Self {
        assert!(
            self.response.duration <= limit,
            "Expected response under {:?}, got {:?}",
            limit,
            self.response.duration
        );
        self
    }
}

#[cfg(test)]
#[path = "expect_tests.rs"]
mod tests;
