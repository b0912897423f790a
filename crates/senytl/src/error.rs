// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types surfaced to agent code.

use crate::config::ConfigError;
use crate::providers::{CallSite, Provider};
use senytl_capture::CaptureError;
use std::path::PathBuf;
use thiserror::Error;

/// Longest prompt excerpt quoted in a no-match error.
const PROMPT_SNIPPET_CHARS: usize = 200;

/// Errors raised by the interception engine.
#[derive(Debug, Error)]
pub enum SenytlError {
    /// No rule matched and the fallback mode is `error`.
    #[error(
        "No mock matched provider='{provider}' model='{model}'. Prompt snippet: {:?}",
        prompt_snippet(.prompt)
    )]
    NoMockMatch {
        provider: Provider,
        model: String,
        prompt: String,
    },

    /// Replay requested for a session with no file on disk.
    #[error("Recording session not found: {}", .path.display())]
    RecordingNotFound { path: PathBuf },

    #[error("Invalid match pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Agent code called a provider whose client was never registered.
    #[error("No client registered for {site}")]
    SdkUnavailable { site: CallSite },

    /// A real provider client failed.
    #[error("{provider} request failed: {source}")]
    Upstream {
        provider: Provider,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A wrapped agent failed for its own reasons.
    #[error("Agent failed: {0}")]
    Agent(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SenytlError {
    /// Wrap an error returned by a real provider client.
    pub fn upstream(
        provider: Provider,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Upstream {
            provider,
            source: source.into(),
        }
    }

    /// Wrap an error raised inside agent code.
    pub fn agent(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Agent(source.into())
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMockMatch { .. })
    }
}

fn prompt_snippet(prompt: &str) -> String {
    prompt.chars().take(PROMPT_SNIPPET_CHARS).collect()
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
