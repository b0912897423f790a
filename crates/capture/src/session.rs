// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session file schema and persistence.
//!
//! A session file is a single JSON document:
//!
//! ```json
//! {"calls": [{"key": "<fingerprint>", "provider": "openai", "model": "gpt-4",
//!             "request": {...}, "response": {"text": "...", "reasoning": null,
//!             "tools": [], "tool_calls": [{"name": "...", "args": {}}]},
//!             "mocked": false}]}
//! ```

use crate::error::CaptureError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Extension used for session files.
pub const SESSION_EXTENSION: &str = "json";

/// A tool call as stored in a session file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedToolCall {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Map<String, Value>,
}

/// A provider response as stored in a session file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tools: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_calls: Vec<RecordedToolCall>,
}

/// One intercepted provider call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedCall {
    /// Fingerprint of `{provider, model, request}`
    pub key: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    /// Canonicalized request document
    #[serde(default)]
    pub request: Value,
    pub response: RecordedResponse,
    /// Whether the response came from a mock rule rather than the real provider
    #[serde(default)]
    pub mocked: bool,
}

/// The on-disk session document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SessionFile {
    pub calls: Vec<RecordedCall>,
}

impl SessionFile {
    pub fn new(calls: Vec<RecordedCall>) -> Self {
        Self { calls }
    }

    /// Path of the session named `name` inside `dir`.
    pub fn path_for(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{}.{}", name, SESSION_EXTENSION))
    }

    /// Parse a session document.
    ///
    /// Entries without a key or with a malformed response are skipped, so a
    /// hand-edited file still replays whatever it can.
    pub fn from_json(content: &str) -> Result<Self, CaptureError> {
        let payload: Value = serde_json::from_str(content)?;
        let calls = payload
            .get("calls")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value::<RecordedCall>(entry.clone()).ok())
                    .filter(|call| !call.key.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self { calls })
    }

    /// Load a session file from disk.
    pub fn load(path: &Path) -> Result<Self, CaptureError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Write the session as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), CaptureError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Names of all sessions stored in `dir`, sorted.
    ///
    /// A missing directory yields an empty list.
    pub fn list(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .into_iter()
            .flatten()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == SESSION_EXTENSION))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        names
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
