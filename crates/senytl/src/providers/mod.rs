// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Provider identities, client call sites and wire formats.
//!
//! Agent code never holds a provider client directly. It calls through an
//! [`Sdk`], a shared table of call-site slots. Installing interception swaps
//! each occupied slot for a shim; uninstalling puts the original back.

pub mod anthropic;
pub mod google;
pub mod openai;

use crate::error::SenytlError;
use crate::model::MockResponse;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use anthropic::{Message, MessagesRequest};
pub use google::{GenerateContentRequest, GenerateContentResponse};
pub use openai::{ChatCompletion, ChatCompletionRequest};

/// LLM vendor family
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
        }
    }

    /// Guess the provider from a model name; unknown names are OpenAI.
    pub fn infer(model: &str) -> Self {
        let model = model.to_lowercase();
        if model.contains("claude") || model.contains("anthropic") {
            Provider::Anthropic
        } else if model.contains("gemini") || model.contains("google") {
            Provider::Google
        } else {
            Provider::OpenAi
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An interceptable client entry point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallSite {
    OpenAiLegacyChatCompletion,
    OpenAiChatCompletions,
    AnthropicMessages,
    AnthropicLegacyMessages,
    GoogleGenerateContent,
}

impl CallSite {
    pub const ALL: [CallSite; 5] = [
        CallSite::OpenAiLegacyChatCompletion,
        CallSite::OpenAiChatCompletions,
        CallSite::AnthropicMessages,
        CallSite::AnthropicLegacyMessages,
        CallSite::GoogleGenerateContent,
    ];

    pub fn provider(&self) -> Provider {
        match self {
            CallSite::OpenAiLegacyChatCompletion | CallSite::OpenAiChatCompletions => {
                Provider::OpenAi
            }
            CallSite::AnthropicMessages | CallSite::AnthropicLegacyMessages => Provider::Anthropic,
            CallSite::GoogleGenerateContent => Provider::Google,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallSite::OpenAiLegacyChatCompletion => "openai.ChatCompletion.create",
            CallSite::OpenAiChatCompletions => "openai.chat.completions.create",
            CallSite::AnthropicMessages => "anthropic.messages.create",
            CallSite::AnthropicLegacyMessages => "anthropic.Anthropic.messages.create",
            CallSite::GoogleGenerateContent => "google.GenerativeModel.generate_content",
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OpenAI-style chat completion endpoint
pub trait ChatCompletions: Send + Sync {
    fn create(&self, request: ChatCompletionRequest) -> Result<ChatCompletion, SenytlError>;
}

impl<F> ChatCompletions for F
where
    F: Fn(ChatCompletionRequest) -> Result<ChatCompletion, SenytlError> + Send + Sync,
{
    fn create(&self, request: ChatCompletionRequest) -> Result<ChatCompletion, SenytlError> {
        self(request)
    }
}

/// Anthropic-style messages endpoint
pub trait Messages: Send + Sync {
    fn create(&self, request: MessagesRequest) -> Result<Message, SenytlError>;
}

impl<F> Messages for F
where
    F: Fn(MessagesRequest) -> Result<Message, SenytlError> + Send + Sync,
{
    fn create(&self, request: MessagesRequest) -> Result<Message, SenytlError> {
        self(request)
    }
}

/// Google-style content generation endpoint
pub trait GenerativeModel: Send + Sync {
    fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, SenytlError>;
}

impl<F> GenerativeModel for F
where
    F: Fn(GenerateContentRequest) -> Result<GenerateContentResponse, SenytlError> + Send + Sync,
{
    fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, SenytlError> {
        self(request)
    }
}

/// The client currently occupying a call site
#[derive(Clone)]
pub enum Client {
    Chat(Arc<dyn ChatCompletions>),
    Messages(Arc<dyn Messages>),
    Generative(Arc<dyn GenerativeModel>),
}

impl Client {
    /// Whether both values point at the same client object.
    pub fn ptr_eq(&self, other: &Client) -> bool {
        match (self, other) {
            (Client::Chat(a), Client::Chat(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (Client::Messages(a), Client::Messages(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Client::Generative(a), Client::Generative(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Client::Chat(_) => "Chat",
            Client::Messages(_) => "Messages",
            Client::Generative(_) => "Generative",
        };
        f.debug_tuple("Client").field(&kind).finish()
    }
}

/// Shared table of provider clients that agent code calls through.
///
/// Clones share the same slots, so a clone handed to agent code observes
/// interception installed later.
#[derive(Clone, Default)]
pub struct Sdk {
    slots: Arc<RwLock<HashMap<CallSite, Client>>>,
    retired: Arc<Mutex<Vec<Retired>>>,
}

/// A disarmed shim still buried under another interceptor's shim
struct Retired {
    site: CallSite,
    shim: Client,
    original: Client,
}

impl Sdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a modern OpenAI chat completions client.
    pub fn with_openai(self, client: impl ChatCompletions + 'static) -> Self {
        self.set(CallSite::OpenAiChatCompletions, Client::Chat(Arc::new(client)))
    }

    pub fn with_openai_legacy(self, client: impl ChatCompletions + 'static) -> Self {
        self.set(
            CallSite::OpenAiLegacyChatCompletion,
            Client::Chat(Arc::new(client)),
        )
    }

    pub fn with_anthropic(self, client: impl Messages + 'static) -> Self {
        self.set(CallSite::AnthropicMessages, Client::Messages(Arc::new(client)))
    }

    pub fn with_anthropic_legacy(self, client: impl Messages + 'static) -> Self {
        self.set(
            CallSite::AnthropicLegacyMessages,
            Client::Messages(Arc::new(client)),
        )
    }

    pub fn with_google(self, client: impl GenerativeModel + 'static) -> Self {
        self.set(
            CallSite::GoogleGenerateContent,
            Client::Generative(Arc::new(client)),
        )
    }

    fn set(self, site: CallSite, client: Client) -> Self {
        self.slots.write().insert(site, client);
        self.retired.lock().retain(|r| r.site != site);
        self
    }

    /// The client currently in `site`, if any.
    pub fn client(&self, site: CallSite) -> Option<Client> {
        self.slots.read().get(&site).cloned()
    }

    pub fn is_available(&self, site: CallSite) -> bool {
        self.slots.read().contains_key(&site)
    }

    /// Occupied call sites, in [`CallSite::ALL`] order.
    pub fn sites(&self) -> Vec<CallSite> {
        let slots = self.slots.read();
        CallSite::ALL
            .into_iter()
            .filter(|site| slots.contains_key(site))
            .collect()
    }

    /// Replace the client in an occupied slot with one derived from it,
    /// returning the previous client.
    pub(crate) fn wrap_slot(
        &self,
        site: CallSite,
        wrap: impl FnOnce(&Client) -> Client,
    ) -> Option<Client> {
        let mut slots = self.slots.write();
        let slot = slots.get_mut(&site)?;
        let wrapped = wrap(slot);
        Some(std::mem::replace(slot, wrapped))
    }

    /// Swap the client in an occupied slot, returning the previous one.
    pub(crate) fn replace(&self, site: CallSite, client: Client) -> Option<Client> {
        let mut slots = self.slots.write();
        let slot = slots.get_mut(&site)?;
        Some(std::mem::replace(slot, client))
    }

    /// Remember a shim that could not be removed because another shim sits
    /// on top of it. Whoever later restores it gets `original` instead.
    pub(crate) fn retire(&self, site: CallSite, shim: Client, original: Client) {
        self.retired.lock().push(Retired {
            site,
            shim,
            original,
        });
    }

    /// Follow retired shims down to the client they displaced.
    pub(crate) fn unwind(&self, site: CallSite, mut client: Client) -> Client {
        let mut retired = self.retired.lock();
        while let Some(pos) = retired
            .iter()
            .position(|r| r.site == site && r.shim.ptr_eq(&client))
        {
            client = retired.swap_remove(pos).original;
        }
        client
    }

    pub fn chat_completion_create(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletion, SenytlError> {
        self.chat(CallSite::OpenAiLegacyChatCompletion)?.create(request)
    }

    pub fn chat_completions_create(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletion, SenytlError> {
        self.chat(CallSite::OpenAiChatCompletions)?.create(request)
    }

    pub fn messages_create(&self, request: MessagesRequest) -> Result<Message, SenytlError> {
        self.messages(CallSite::AnthropicMessages)?.create(request)
    }

    pub fn legacy_messages_create(&self, request: MessagesRequest) -> Result<Message, SenytlError> {
        self.messages(CallSite::AnthropicLegacyMessages)?.create(request)
    }

    pub fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, SenytlError> {
        match self.client(CallSite::GoogleGenerateContent) {
            Some(Client::Generative(c)) => c.generate_content(request),
            _ => Err(SenytlError::SdkUnavailable {
                site: CallSite::GoogleGenerateContent,
            }),
        }
    }

    fn chat(&self, site: CallSite) -> Result<Arc<dyn ChatCompletions>, SenytlError> {
        match self.client(site) {
            Some(Client::Chat(c)) => Ok(c),
            _ => Err(SenytlError::SdkUnavailable { site }),
        }
    }

    fn messages(&self, site: CallSite) -> Result<Arc<dyn Messages>, SenytlError> {
        match self.client(site) {
            Some(Client::Messages(c)) => Ok(c),
            _ => Err(SenytlError::SdkUnavailable { site }),
        }
    }
}

impl fmt::Debug for Sdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sdk").field("sites", &self.sites()).finish()
    }
}

/// Translation between a provider's typed payloads and the engine's
/// normalized request and canonical response.
pub(crate) trait WireFormat {
    type Request;
    type Response;

    const PROVIDER: Provider;

    fn model(request: &Self::Request) -> String;

    /// Request document used for matching and fingerprinting.
    fn normalize(request: &Self::Request) -> Value;

    /// Build a provider-shaped response from a canonical one.
    fn synthesize(response: &MockResponse, model: &str) -> Self::Response;

    /// Extract the canonical response from a real provider reply.
    fn parse(response: &Self::Response) -> MockResponse;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
