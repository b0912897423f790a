// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session recording and replay.

use crate::error::SenytlError;
use crate::model::MockResponse;
use crate::providers::Provider;
use parking_lot::Mutex;
use senytl_capture::{
    fingerprint, normalize_request, CaptureError, CaptureLog, RecordedCall, RecordedResponse,
    SessionFile,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderMode {
    Record,
    Replay,
}

impl fmt::Display for RecorderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderMode::Record => f.write_str("record"),
            RecorderMode::Replay => f.write_str("replay"),
        }
    }
}

#[derive(Debug, Default)]
struct RecorderState {
    mode: Option<RecorderMode>,
    name: Option<String>,
    replay_index: HashMap<String, MockResponse>,
}

/// Captures calls to a named session file, or answers calls from one.
///
/// At most one session is active. While recording, every resolved call is
/// buffered and written out on stop. While replaying, requests are looked up
/// by fingerprint and answered without touching rules or clients.
#[derive(Debug)]
pub struct SessionRecorder {
    sessions_dir: PathBuf,
    state: Mutex<RecorderState>,
    log: CaptureLog,
}

impl SessionRecorder {
    pub fn new(sessions_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
            state: Mutex::new(RecorderState::default()),
            log: CaptureLog::new(),
        }
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    pub fn session_path(&self, name: &str) -> PathBuf {
        SessionFile::path_for(&self.sessions_dir, name)
    }

    pub fn mode(&self) -> Option<RecorderMode> {
        self.state.lock().mode
    }

    pub fn name(&self) -> Option<String> {
        self.state.lock().name.clone()
    }

    /// Names of sessions present on disk.
    pub fn sessions(&self) -> Vec<String> {
        SessionFile::list(&self.sessions_dir)
    }

    /// Begin buffering calls for session `name`, discarding any active session.
    pub fn start_recording(&self, name: &str) -> Result<(), SenytlError> {
        std::fs::create_dir_all(&self.sessions_dir).map_err(CaptureError::from)?;
        let mut state = self.state.lock();
        *state = RecorderState {
            mode: Some(RecorderMode::Record),
            name: Some(name.to_string()),
            replay_index: HashMap::new(),
        };
        self.log.clear();
        tracing::info!(session = name, dir = %self.sessions_dir.display(), "recording session");
        Ok(())
    }

    /// Write the buffered calls and leave record mode.
    ///
    /// Returns `None` when not recording. If the write fails the session
    /// stays active with its buffer intact.
    pub fn stop_recording(&self) -> Result<Option<PathBuf>, SenytlError> {
        let mut state = self.state.lock();
        let name = match (&state.mode, &state.name) {
            (Some(RecorderMode::Record), Some(name)) => name.clone(),
            _ => return Ok(None),
        };

        let path = self.session_path(&name);
        let session = self.log.take_session();
        if let Err(e) = session.save(&path) {
            self.log.replace(session.calls);
            return Err(e.into());
        }

        *state = RecorderState::default();
        tracing::info!(
            session = %name,
            path = %path.display(),
            calls = session.calls.len(),
            "saved session"
        );
        Ok(Some(path))
    }

    /// Load session `name` and answer matching requests from it.
    pub fn start_replay(&self, name: &str) -> Result<(), SenytlError> {
        let path = self.session_path(name);
        if !path.exists() {
            return Err(SenytlError::RecordingNotFound { path });
        }
        let session = SessionFile::load(&path)?;

        let mut replay_index = HashMap::new();
        for call in &session.calls {
            replay_index.insert(call.key.clone(), MockResponse::from(call.response.clone()));
        }

        let mut state = self.state.lock();
        *state = RecorderState {
            mode: Some(RecorderMode::Replay),
            name: Some(name.to_string()),
            replay_index,
        };
        tracing::info!(
            session = name,
            path = %path.display(),
            calls = session.calls.len(),
            "replaying session"
        );
        self.log.replace(session.calls);
        Ok(())
    }

    pub fn stop_replay(&self) {
        let mut state = self.state.lock();
        if state.mode != Some(RecorderMode::Replay) {
            return;
        }
        if let Some(name) = state.name.take() {
            tracing::info!(session = %name, "stopped replay");
        }
        *state = RecorderState::default();
        self.log.clear();
    }

    /// Stop whichever session is active.
    pub fn stop(&self) -> Result<Option<PathBuf>, SenytlError> {
        match self.mode() {
            Some(RecorderMode::Record) => self.stop_recording(),
            Some(RecorderMode::Replay) => {
                self.stop_replay();
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Recorded answer for a request, when replaying.
    pub fn maybe_replay(
        &self,
        provider: Provider,
        model: &str,
        request: &Value,
    ) -> Option<MockResponse> {
        let state = self.state.lock();
        if state.mode != Some(RecorderMode::Replay) {
            return None;
        }
        let key = fingerprint(provider.as_str(), model, request);
        let hit = state.replay_index.get(&key).cloned();
        tracing::trace!(%provider, model, hit = hit.is_some(), "replay lookup");
        hit
    }

    /// Buffer one call, when recording.
    pub fn record(
        &self,
        provider: Provider,
        model: &str,
        request: &Value,
        response: &MockResponse,
        mocked: bool,
    ) {
        let state = self.state.lock();
        if state.mode != Some(RecorderMode::Record) {
            return;
        }
        let normalized = normalize_request(provider.as_str(), model, request);
        self.log.record(RecordedCall {
            key: fingerprint(provider.as_str(), model, request),
            provider: provider.as_str().to_string(),
            model: model.to_string(),
            request: normalized.get("request").cloned().unwrap_or(Value::Null),
            response: RecordedResponse::from(response),
            mocked,
        });
    }

    /// Calls buffered for the active session.
    pub fn buffered_calls(&self) -> Vec<RecordedCall> {
        self.log.calls()
    }

    /// Overwrite the buffer, e.g. to restore state saved earlier.
    pub fn restore_buffer(&self, calls: Vec<RecordedCall>) {
        self.log.replace(calls);
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
