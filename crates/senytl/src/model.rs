// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Response and call-record value types.

use crate::providers::Provider;
use senytl_capture::{RecordedResponse, RecordedToolCall};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool invocation requested by the model
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Map::new(),
        }
    }

    /// Add one argument
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Replace all arguments
    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        self.args = args;
        self
    }
}

/// The canonical substitute reply handed back to agent code.
///
/// `tools` is the legacy list of tool names; every name in it also appears,
/// in order and without arguments, at the front of `tool_calls`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MockResponse {
    pub text: String,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl MockResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// Add tool names, each also becoming an argument-less tool call.
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in tools {
            let name = name.into();
            let at = self.tools.len();
            self.tool_calls.insert(at, ToolCall::new(name.clone()));
            self.tools.push(name);
        }
        self
    }

    pub fn with_tool_call(mut self, call: ToolCall) -> Self {
        self.tool_calls.push(call);
        self
    }

    pub fn with_tool_calls(mut self, calls: impl IntoIterator<Item = ToolCall>) -> Self {
        self.tool_calls.extend(calls);
        self
    }

    pub fn called_tool(&self, name: &str) -> bool {
        self.tool_calls.iter().any(|tc| tc.name == name)
    }
}

impl From<&str> for MockResponse {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for MockResponse {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&MockResponse> for RecordedResponse {
    fn from(response: &MockResponse) -> Self {
        Self {
            text: response.text.clone(),
            reasoning: response.reasoning.clone(),
            tools: response.tools.clone(),
            tool_calls: response
                .tool_calls
                .iter()
                .map(|tc| RecordedToolCall {
                    name: tc.name.clone(),
                    args: tc.args.clone(),
                })
                .collect(),
        }
    }
}

impl From<RecordedResponse> for MockResponse {
    fn from(recorded: RecordedResponse) -> Self {
        Self {
            text: recorded.text,
            reasoning: recorded.reasoning,
            tools: recorded.tools,
            tool_calls: recorded
                .tool_calls
                .into_iter()
                .map(|tc| ToolCall {
                    name: tc.name,
                    args: tc.args,
                })
                .collect(),
        }
    }
}

/// One resolved provider call, as traced into a run context
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LlmCallRecord {
    pub provider: Provider,
    pub model: String,
    pub request: Value,
    pub response: MockResponse,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
