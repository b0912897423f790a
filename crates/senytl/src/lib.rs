// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Senytl: mock interception and session record/replay for LLM agents
//!
//! Agent code calls provider clients through an [`Sdk`]. A [`Senytl`] facade
//! installs shims into the SDK's call sites and answers each call from a
//! replayed session, a registered mock rule, or (when allowed) the real
//! client, tracing every answer into the run context of the invocation that
//! made it.
//!
#![doc = include_str!("../docs/USAGE.md")]

pub mod agent;
pub mod config;
pub mod engine;
#[doc(hidden)]
pub mod env;
pub mod error;
pub mod expect;
pub mod matching;
pub mod model;
pub mod patch;
pub mod prompt;
pub mod providers;
pub mod recorder;
pub mod run;
mod senytl;
pub mod snapshot;
pub mod trajectory;

/// Re-exported session file types from the senytl-capture crate.
pub mod capture {
    pub use senytl_capture::{
        canonical_json, fingerprint, RecordedCall, RecordedResponse, RecordedToolCall, SessionFile,
    };
}

pub use agent::{Agent, AgentResponse, ConversationMessage, WrappedAgent};
pub use config::{FallbackMode, SenytlConfig};
pub use engine::{MockEngine, MockRule, PassThroughRequest, Resolution, Turn};
pub use error::SenytlError;
pub use expect::{expect, Expectation};
pub use matching::MatchSpec;
pub use model::{LlmCallRecord, MockResponse, ToolCall};
pub use patch::{PatchManager, Resolver};
pub use providers::{CallSite, Provider, Sdk};
pub use recorder::{RecorderMode, SessionRecorder};
pub use run::{RunContext, RunHandle};
pub use senytl::{MockModelBuilder, MockRuleBuilder, SessionGuard, Senytl};
pub use snapshot::{Comparison, SnapshotError, SnapshotStatus, SnapshotStore};
pub use trajectory::{Step, TrajectoryError};
