// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rule storage and request dispatch.

use crate::config::FallbackMode;
use crate::error::SenytlError;
use crate::matching::MatchSpec;
use crate::model::MockResponse;
use crate::prompt::extract_prompt;
use crate::providers::Provider;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A request no rule answered while the fallback is `pass_through`.
///
/// Carries what the real client needs to be called instead.
#[derive(Clone, Debug, PartialEq)]
pub struct PassThroughRequest {
    pub provider: Provider,
    pub model: String,
    pub request: Value,
}

/// Outcome of dispatching one request through the engine
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Resolved(MockResponse),
    PassThrough(PassThroughRequest),
}

/// A prompt a rule answered, and what it answered with
#[derive(Clone, Debug, PartialEq)]
pub struct Turn {
    pub prompt: String,
    pub response: MockResponse,
}

#[derive(Debug, Default)]
struct RuleState {
    cursor: usize,
    history: Vec<Turn>,
    scratch: Map<String, Value>,
}

/// One registered mock: `(provider, model, predicate) -> response`.
///
/// A rule built with a sequence hands out its responses in order and keeps
/// returning the last one once exhausted.
#[derive(Debug)]
pub struct MockRule {
    provider: Provider,
    model: String,
    matcher: MatchSpec,
    response: MockResponse,
    sequence: Option<Vec<MockResponse>>,
    state: Mutex<RuleState>,
}

impl MockRule {
    pub fn new(
        provider: Provider,
        model: impl Into<String>,
        matcher: MatchSpec,
        response: MockResponse,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            matcher,
            response,
            sequence: None,
            state: Mutex::new(RuleState::default()),
        }
    }

    /// Build a rule answering with `responses` in order. An empty list
    /// behaves as a single empty-text response.
    pub fn with_sequence(
        provider: Provider,
        model: impl Into<String>,
        matcher: MatchSpec,
        responses: Vec<MockResponse>,
    ) -> Self {
        let responses = if responses.is_empty() {
            vec![MockResponse::default()]
        } else {
            responses
        };
        let mut rule = Self::new(provider, model, matcher, responses[0].clone());
        rule.sequence = Some(responses);
        rule
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn matcher(&self) -> &MatchSpec {
        &self.matcher
    }

    /// The fixed response, or the first of a sequence.
    pub fn response(&self) -> &MockResponse {
        &self.response
    }

    pub fn sequence(&self) -> Option<&[MockResponse]> {
        self.sequence.as_deref()
    }

    pub fn applies_to(&self, provider: Provider, model: &str, prompt: &str) -> bool {
        self.provider == provider && self.model == model && self.matcher.matches(prompt)
    }

    /// Produce the next response and remember the turn.
    pub fn take_response(&self, prompt: &str) -> MockResponse {
        let mut state = self.state.lock();
        let response = match &self.sequence {
            Some(seq) => {
                let idx = state.cursor.min(seq.len().saturating_sub(1));
                state.cursor += 1;
                seq.get(idx).cloned().unwrap_or_default()
            }
            None => self.response.clone(),
        };
        state.history.push(Turn {
            prompt: prompt.to_string(),
            response: response.clone(),
        });
        response
    }

    pub fn history(&self) -> Vec<Turn> {
        self.state.lock().history.clone()
    }

    pub fn match_count(&self) -> usize {
        self.state.lock().history.len()
    }

    /// Number of sequence responses handed out so far
    pub fn cursor(&self) -> usize {
        self.state.lock().cursor
    }

    /// Free-form per-rule state for test code
    pub fn scratch(&self, key: &str) -> Option<Value> {
        self.state.lock().scratch.get(key).cloned()
    }

    pub fn set_scratch(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.state.lock().scratch.insert(key.into(), value.into());
    }

    /// Rewind the sequence and forget history and scratch state.
    pub fn reset_state(&self) {
        *self.state.lock() = RuleState::default();
    }
}

/// Ordered rule list plus the fallback policy.
///
/// Rules are consulted newest first; the first one that applies wins.
#[derive(Debug, Default)]
pub struct MockEngine {
    rules: RwLock<Vec<Arc<MockRule>>>,
    fallback: RwLock<FallbackMode>,
}

impl MockEngine {
    pub fn new(fallback: FallbackMode) -> Self {
        Self {
            rules: RwLock::new(Vec::new()),
            fallback: RwLock::new(fallback),
        }
    }

    pub fn fallback(&self) -> FallbackMode {
        *self.fallback.read()
    }

    pub fn set_fallback(&self, fallback: FallbackMode) {
        *self.fallback.write() = fallback;
    }

    pub fn add_rule(&self, rule: Arc<MockRule>) -> Arc<MockRule> {
        tracing::debug!(
            provider = %rule.provider(),
            model = rule.model(),
            "registered mock rule"
        );
        self.rules.write().push(Arc::clone(&rule));
        rule
    }

    /// Snapshot of registered rules, oldest first.
    pub fn rules(&self) -> Vec<Arc<MockRule>> {
        self.rules.read().clone()
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// Remove every rule. The fallback mode is kept.
    pub fn reset(&self) {
        self.rules.write().clear();
    }

    /// Resolve a normalized request against the rules, then the fallback.
    pub fn handle(
        &self,
        provider: Provider,
        model: &str,
        request: &Value,
    ) -> Result<Resolution, SenytlError> {
        let prompt = extract_prompt(request);

        let matched = self
            .rules
            .read()
            .iter()
            .rev()
            .find(|rule| rule.applies_to(provider, model, &prompt))
            .cloned();
        if let Some(rule) = matched {
            tracing::trace!(%provider, model, "mock rule matched");
            return Ok(Resolution::Resolved(rule.take_response(&prompt)));
        }

        let fallback = self.fallback();
        tracing::debug!(%provider, model, %fallback, "no mock rule matched");
        match fallback {
            FallbackMode::PassThrough => Ok(Resolution::PassThrough(PassThroughRequest {
                provider,
                model: model.to_string(),
                request: request.clone(),
            })),
            FallbackMode::Default => Ok(Resolution::Resolved(MockResponse::default())),
            FallbackMode::Error => Err(SenytlError::NoMockMatch {
                provider,
                model: model.to_string(),
                prompt,
            }),
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
