// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! OpenAI chat completion payloads.

use super::{Provider, WireFormat};
use crate::model::{MockResponse, ToolCall};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Id stamped on synthesized completions.
pub const MOCK_COMPLETION_ID: &str = "senytl-mock";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Sampling parameters, tool schemas and anything else sent along.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(MessageContent::Text(content.into())),
            ..Default::default()
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
}

impl ChatCompletion {
    /// Text of the first choice.
    pub fn content(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallWire>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallWire {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub function: FunctionCall,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default)]
    pub name: String,
    /// JSON-encoded arguments string; some clients send an object instead.
    #[serde(default)]
    pub arguments: Value,
}

/// Shape a canonical response as a chat completion.
pub fn synthesize(response: &MockResponse, model: &str) -> ChatCompletion {
    let tool_calls = response
        .tool_calls
        .iter()
        .enumerate()
        .map(|(idx, tc)| ToolCallWire {
            id: format!("senytl-toolcall-{}", idx),
            kind: "function".to_string(),
            function: FunctionCall {
                name: tc.name.clone(),
                arguments: Value::String(Value::Object(tc.args.clone()).to_string()),
            },
        })
        .collect();

    ChatCompletion {
        id: MOCK_COMPLETION_ID.to_string(),
        object: "chat.completion".to_string(),
        created: 0,
        model: model.to_string(),
        choices: vec![Choice {
            index: 0,
            message: AssistantMessage {
                role: "assistant".to_string(),
                content: Some(response.text.clone()),
                tool_calls,
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: None,
    }
}

/// Read the first choice back into a canonical response.
pub fn parse(completion: &ChatCompletion) -> MockResponse {
    let Some(choice) = completion.choices.first() else {
        return MockResponse::default();
    };

    let tool_calls = choice
        .message
        .tool_calls
        .iter()
        .filter(|tc| !tc.function.name.is_empty())
        .map(|tc| {
            ToolCall::new(tc.function.name.clone())
                .with_args(parse_arguments(&tc.function.arguments))
        })
        .collect::<Vec<_>>();

    MockResponse::new(choice.message.content.clone().unwrap_or_default())
        .with_tool_calls(tool_calls)
}

fn parse_arguments(arguments: &Value) -> Map<String, Value> {
    match arguments {
        Value::Object(map) => map.clone(),
        Value::String(raw) => match serde_json::from_str(raw) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

pub(crate) struct OpenAiWire;

impl WireFormat for OpenAiWire {
    type Request = ChatCompletionRequest;
    type Response = ChatCompletion;

    const PROVIDER: Provider = Provider::OpenAi;

    fn model(request: &ChatCompletionRequest) -> String {
        request.model.clone()
    }

    fn normalize(request: &ChatCompletionRequest) -> Value {
        serde_json::to_value(request).unwrap_or(Value::Null)
    }

    fn synthesize(response: &MockResponse, model: &str) -> ChatCompletion {
        synthesize(response, model)
    }

    fn parse(response: &ChatCompletion) -> MockResponse {
        parse(response)
    }
}

#[cfg(test)]
#[path = "openai_tests.rs"]
mod tests;
