// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session capture for record/replay of LLM provider traffic.
//!
//! This crate owns everything that has to stay byte-stable between a
//! recording run and a later replay: canonical JSON, request fingerprints,
//! the recorded-call schema and the session file itself.

mod canonical;
mod error;
mod log;
mod session;

pub use canonical::{canonical_json, canonicalize, fingerprint, normalize_request};
pub use error::CaptureError;
pub use log::CaptureLog;
pub use session::{RecordedCall, RecordedResponse, RecordedToolCall, SessionFile};
