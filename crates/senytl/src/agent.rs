// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Traced agent invocation.

use crate::error::SenytlError;
use crate::model::{LlmCallRecord, ToolCall};
use crate::senytl::Senytl;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Agent code under test: text in, text out.
pub trait Agent {
    fn call(&self, input: &str) -> Result<String, SenytlError>;
}

impl<F> Agent for F
where
    F: Fn(&str) -> Result<String, SenytlError>,
{
    fn call(&self, input: &str) -> Result<String, SenytlError> {
        self(input)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
}

/// What one wrapped invocation produced
#[derive(Clone, Debug, PartialEq)]
pub struct AgentResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub llm_calls: Vec<LlmCallRecord>,
    pub duration: Duration,
}

impl AgentResponse {
    pub fn called_tool(&self, name: &str) -> bool {
        self.tool_calls.iter().any(|tc| tc.name == name)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tool_calls.iter().map(|tc| tc.name.as_str()).collect()
    }
}

/// An agent whose invocations are traced through a [`Senytl`].
pub struct WrappedAgent<A> {
    agent: A,
    senytl: Senytl,
    conversation: Mutex<Vec<ConversationMessage>>,
}

impl<A: Agent> WrappedAgent<A> {
    pub fn new(agent: A, senytl: Senytl) -> Self {
        Self {
            agent,
            senytl,
            conversation: Mutex::new(Vec::new()),
        }
    }

    /// Invoke the agent inside a fresh run context.
    ///
    /// The run is closed even when the agent fails; a failed turn is not
    /// added to the conversation.
    pub fn run(&self, input: &str) -> Result<AgentResponse, SenytlError> {
        let handle = self.senytl.start_run();
        let result = self.agent.call(input);
        let (context, duration) = handle.finish();
        let text = result?;

        {
            let mut conversation = self.conversation.lock();
            conversation.push(ConversationMessage {
                role: "user".to_string(),
                content: input.to_string(),
            });
            conversation.push(ConversationMessage {
                role: "assistant".to_string(),
                content: text.clone(),
            });
        }

        tracing::debug!(
            llm_calls = context.llm_calls.len(),
            tool_calls = context.tool_calls.len(),
            ?duration,
            "agent run finished"
        );

        Ok(AgentResponse {
            text,
            tool_calls: context.tool_calls,
            llm_calls: context.llm_calls,
            duration,
        })
    }

    pub fn conversation(&self) -> Vec<ConversationMessage> {
        self.conversation.lock().clone()
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn senytl(&self) -> &Senytl {
        &self.senytl
    }
}

impl<A> std::fmt::Debug for WrappedAgent<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappedAgent")
            .field("senytl", &self.senytl)
            .field("turns", &(self.conversation.lock().len() / 2))
            .finish()
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
