// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Fake provider clients standing in for real SDKs.

#![allow(dead_code)]

use parking_lot::Mutex;
use senytl::providers::anthropic::{self, MessageParam};
use senytl::providers::google;
use senytl::providers::openai::{self, ChatMessage};
use senytl::providers::{
    ChatCompletion, ChatCompletionRequest, ChatCompletions, GenerateContentRequest,
    GenerateContentResponse, GenerativeModel, Message, Messages, MessagesRequest,
};
use senytl::{MockResponse, Sdk, Senytl, SenytlConfig, SenytlError};
use std::sync::Arc;
use tempfile::TempDir;

// =============================================================================
// Fake Clients
// =============================================================================

/// Answers every request with a canned response and counts the requests.
#[derive(Default)]
pub struct FakeClient {
    pub reply: Mutex<MockResponse>,
    pub requests: Mutex<Vec<serde_json::Value>>,
}

impl FakeClient {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(MockResponse::new(text)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

/// Shares one fake between the SDK slot and the test.
pub struct Shared(pub Arc<FakeClient>);

impl ChatCompletions for Shared {
    fn create(&self, request: ChatCompletionRequest) -> Result<ChatCompletion, SenytlError> {
        self.0
            .requests
            .lock()
            .push(serde_json::to_value(&request).unwrap());
        Ok(openai::synthesize(&self.0.reply.lock(), &request.model))
    }
}

impl Messages for Shared {
    fn create(&self, request: MessagesRequest) -> Result<Message, SenytlError> {
        self.0
            .requests
            .lock()
            .push(serde_json::to_value(&request).unwrap());
        Ok(anthropic::synthesize(&self.0.reply.lock(), &request.model))
    }
}

impl GenerativeModel for Shared {
    fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, SenytlError> {
        self.0
            .requests
            .lock()
            .push(serde_json::to_value(&request).unwrap());
        Ok(google::synthesize(&self.0.reply.lock()))
    }
}

// =============================================================================
// Setup
// =============================================================================

pub struct Harness {
    pub dir: TempDir,
    pub openai: Arc<FakeClient>,
    pub anthropic: Arc<FakeClient>,
    pub google: Arc<FakeClient>,
    pub sdk: Sdk,
    pub senytl: Senytl,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SenytlConfig::default())
    }

    pub fn with_config(config: SenytlConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let openai = FakeClient::replying("real openai");
        let anthropic = FakeClient::replying("real anthropic");
        let google = FakeClient::replying("real google");
        let sdk = Sdk::new()
            .with_openai(Shared(Arc::clone(&openai)))
            .with_anthropic(Shared(Arc::clone(&anthropic)))
            .with_google(Shared(Arc::clone(&google)));
        let senytl = Senytl::with_config(sdk.clone(), dir.path(), config);
        Self {
            dir,
            openai,
            anthropic,
            google,
            sdk,
            senytl,
        }
    }
}

// =============================================================================
// Agent Helpers
// =============================================================================

/// Agent body forwarding its input to the OpenAI chat call site.
pub fn ask_openai(sdk: &Sdk, model: &str, input: &str) -> Result<String, SenytlError> {
    let reply = sdk.chat_completions_create(ChatCompletionRequest::new(
        model,
        vec![ChatMessage::user(input)],
    ))?;
    Ok(reply.content().unwrap_or_default().to_string())
}

pub fn ask_anthropic(sdk: &Sdk, model: &str, input: &str) -> Result<String, SenytlError> {
    let reply = sdk.messages_create(
        MessagesRequest::new(model, vec![MessageParam::user(input)]).with_max_tokens(256),
    )?;
    Ok(reply.text())
}

pub fn ask_google(sdk: &Sdk, model: &str, input: &str) -> Result<String, SenytlError> {
    let reply = sdk.generate_content(GenerateContentRequest::new(model, input))?;
    Ok(reply.text())
}
