// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Google generative model payloads.

use super::{Provider, WireFormat};
use crate::model::{MockResponse, ToolCall};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A `generate_content` call on a model handle.
///
/// `model` names the handle the call was made on and is not part of the
/// normalized request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub model: String,
    /// A prompt string, or a list of content entries.
    pub contents: Value,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl GenerateContentRequest {
    pub fn new(model: impl Into<String>, contents: impl Into<Value>) -> Self {
        Self {
            model: model.into(),
            contents: contents.into(),
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<Value>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

pub fn synthesize(response: &MockResponse) -> GenerateContentResponse {
    let mut parts = vec![Part {
        text: Some(response.text.clone()),
        function_call: None,
    }];
    parts.extend(response.tool_calls.iter().map(|tc| Part {
        text: None,
        function_call: Some(FunctionCall {
            name: tc.name.clone(),
            args: tc.args.clone(),
        }),
    }));

    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Content {
                role: "model".to_string(),
                parts,
            },
            finish_reason: Some("STOP".to_string()),
        }],
        usage_metadata: None,
    }
}

pub fn parse(response: &GenerateContentResponse) -> MockResponse {
    let tool_calls = response
        .candidates
        .first()
        .map(|c| {
            c.content
                .parts
                .iter()
                .filter_map(|p| p.function_call.as_ref())
                .filter(|fc| !fc.name.is_empty())
                .map(|fc| ToolCall::new(fc.name.clone()).with_args(fc.args.clone()))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    MockResponse::new(response.text()).with_tool_calls(tool_calls)
}

pub(crate) struct GoogleWire;

impl WireFormat for GoogleWire {
    type Request = GenerateContentRequest;
    type Response = GenerateContentResponse;

    const PROVIDER: Provider = Provider::Google;

    fn model(request: &GenerateContentRequest) -> String {
        request.model.clone()
    }

    fn normalize(request: &GenerateContentRequest) -> Value {
        let mut normalized = request.options.clone();
        normalized.insert("prompt".to_string(), request.contents.clone());
        Value::Object(normalized)
    }

    fn synthesize(response: &MockResponse, _model: &str) -> GenerateContentResponse {
        synthesize(response)
    }

    fn parse(response: &GenerateContentResponse) -> MockResponse {
        parse(response)
    }
}

#[cfg(test)]
#[path = "google_tests.rs"]
mod tests;
