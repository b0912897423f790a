// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Anthropic messages payloads.

use super::{Provider, WireFormat};
use crate::model::{MockResponse, ToolCall};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MOCK_MESSAGE_ID: &str = "senytl-mock";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    #[serde(default)]
    pub messages: Vec<MessageParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<Value>,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl MessagesRequest {
    pub fn new(model: impl Into<String>, messages: Vec<MessageParam>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Default::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(Value::String(system.into()));
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageParam {
    pub role: String,
    pub content: MessageParamContent,
}

impl MessageParam {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageParamContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: MessageParamContent::Text(text.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageParamContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: Value,
    },
    Thinking {
        thinking: String,
        #[serde(default)]
        signature: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
}

impl Message {
    /// Concatenated text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

pub fn synthesize(response: &MockResponse, model: &str) -> Message {
    let mut content = Vec::new();
    if let Some(reasoning) = &response.reasoning {
        content.push(ContentBlock::Thinking {
            thinking: reasoning.clone(),
            signature: String::new(),
        });
    }
    content.push(ContentBlock::Text {
        text: response.text.clone(),
    });
    content.extend(
        response
            .tool_calls
            .iter()
            .enumerate()
            .map(|(idx, tc)| ContentBlock::ToolUse {
                id: format!("senytl-toolu-{}", idx),
                name: tc.name.clone(),
                input: Value::Object(tc.args.clone()),
            }),
    );

    let stop_reason = if response.tool_calls.is_empty() {
        "end_turn"
    } else {
        "tool_use"
    };

    Message {
        id: MOCK_MESSAGE_ID.to_string(),
        kind: "message".to_string(),
        role: "assistant".to_string(),
        model: model.to_string(),
        content,
        stop_reason: Some(stop_reason.to_string()),
        usage: None,
    }
}

pub fn parse(message: &Message) -> MockResponse {
    let mut reasoning: Option<String> = None;
    let mut tool_calls = Vec::new();
    for block in &message.content {
        match block {
            ContentBlock::Thinking { thinking, .. } => {
                reasoning.get_or_insert_with(String::new).push_str(thinking);
            }
            ContentBlock::ToolUse { name, input, .. } if !name.is_empty() => {
                let args = input.as_object().cloned().unwrap_or_default();
                tool_calls.push(ToolCall::new(name.clone()).with_args(args));
            }
            _ => {}
        }
    }

    let mut response = MockResponse::new(message.text()).with_tool_calls(tool_calls);
    response.reasoning = reasoning;
    response
}

pub(crate) struct AnthropicWire;

impl WireFormat for AnthropicWire {
    type Request = MessagesRequest;
    type Response = Message;

    const PROVIDER: Provider = Provider::Anthropic;

    fn model(request: &MessagesRequest) -> String {
        request.model.clone()
    }

    fn normalize(request: &MessagesRequest) -> Value {
        serde_json::to_value(request).unwrap_or(Value::Null)
    }

    fn synthesize(response: &MockResponse, model: &str) -> Message {
        synthesize(response, model)
    }

    fn parse(response: &Message) -> MockResponse {
        parse(response)
    }
}

#[cfg(test)]
#[path = "anthropic_tests.rs"]
mod tests;
