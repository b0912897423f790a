// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot regression checks over agent responses.
//!
//! The first check under a name writes the responses to
//! `<root>/.senytl/snapshots/<name>.json`. Later checks compare against the
//! stored turns and fail with a [`SnapshotError::Mismatch`] carrying both
//! sides.

use crate::agent::AgentResponse;
use crate::matching::{jaccard_similarity, DEFAULT_SEMANTIC_THRESHOLD};
use crate::model::ToolCall;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Snapshot directory relative to the project root
pub const DEFAULT_SNAPSHOTS_DIR: &str = ".senytl/snapshots";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot '{name}' mismatch: {reason}\nexpected:\n{expected}\nactual:\n{actual}")]
    Mismatch {
        name: String,
        reason: String,
        expected: String,
        actual: String,
    },

    #[error("Failed to access snapshot file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid snapshot file: {0}")]
    Json(#[from] serde_json::Error),
}

/// The recorded shape of one response
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTurn {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl From<&AgentResponse> for SnapshotTurn {
    fn from(response: &AgentResponse) -> Self {
        Self {
            text: response.text.clone(),
            tool_calls: response.tool_calls.clone(),
        }
    }
}

impl From<AgentResponse> for SnapshotTurn {
    fn from(response: AgentResponse) -> Self {
        Self::from(&response)
    }
}

impl From<&str> for SnapshotTurn {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub turns: Vec<SnapshotTurn>,
}

/// How stored and current turns are compared
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Comparison {
    /// Every field equal
    Exact,
    /// Text scored by token overlap, tool calls equal
    Semantic { threshold: f64 },
    /// Only the tool calls
    Tools,
}

/// Outcome of a check that did not fail
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// No snapshot existed; the current responses were written.
    Created(PathBuf),
    Matched,
}

/// Named response snapshots stored in one directory.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the default directory of the project at `root`.
    pub fn for_root(root: &Path) -> Self {
        Self::new(root.join(DEFAULT_SNAPSHOTS_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    pub fn check<I, T>(&self, name: &str, responses: I) -> Result<SnapshotStatus, SnapshotError>
    where
        I: IntoIterator<Item = T>,
        T: Into<SnapshotTurn>,
    {
        self.check_with(name, responses, Comparison::Exact)
    }

    pub fn check_semantic<I, T>(
        &self,
        name: &str,
        responses: I,
    ) -> Result<SnapshotStatus, SnapshotError>
    where
        I: IntoIterator<Item = T>,
        T: Into<SnapshotTurn>,
    {
        let threshold = DEFAULT_SEMANTIC_THRESHOLD;
        self.check_with(name, responses, Comparison::Semantic { threshold })
    }

    pub fn check_tools<I, T>(
        &self,
        name: &str,
        responses: I,
    ) -> Result<SnapshotStatus, SnapshotError>
    where
        I: IntoIterator<Item = T>,
        T: Into<SnapshotTurn>,
    {
        self.check_with(name, responses, Comparison::Tools)
    }

    /// Write the snapshot if it is missing, otherwise compare against it.
    pub fn check_with<I, T>(
        &self,
        name: &str,
        responses: I,
        comparison: Comparison,
    ) -> Result<SnapshotStatus, SnapshotError>
    where
        I: IntoIterator<Item = T>,
        T: Into<SnapshotTurn>,
    {
        let actual = SnapshotFile {
            turns: responses.into_iter().map(Into::into).collect(),
        };
        let path = self.path_for(name);
        if !path.exists() {
            self.write(&path, &actual)?;
            tracing::info!(snapshot = name, path = %path.display(), "snapshot created");
            return Ok(SnapshotStatus::Created(path));
        }

        let expected: SnapshotFile = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        match compare(&expected, &actual, comparison) {
            None => Ok(SnapshotStatus::Matched),
            Some(reason) => Err(SnapshotError::Mismatch {
                name: name.to_string(),
                reason,
                expected: pretty(&expected),
                actual: pretty(&actual),
            }),
        }
    }

    /// Delete a stored snapshot so the next check records afresh.
    pub fn remove(&self, name: &str) -> Result<bool, SnapshotError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        Ok(true)
    }

    fn write(&self, path: &Path, file: &SnapshotFile) -> Result<(), SnapshotError> {
        std::fs::create_dir_all(&self.dir)?;
        let mut json = serde_json::to_string_pretty(file)?;
        json.push('\n');
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// First difference between the two files, if any.
fn compare(expected: &SnapshotFile, actual: &SnapshotFile, comparison: Comparison) -> Option<String> {
    if expected.turns.len() != actual.turns.len() {
        return Some(format!(
            "expected {} turns, got {}",
            expected.turns.len(),
            actual.turns.len()
        ));
    }

    for (i, (exp, act)) in expected.turns.iter().zip(&actual.turns).enumerate() {
        let turn = i + 1;
        match comparison {
            Comparison::Exact if exp != act => {
                return Some(format!("turn {} differs", turn));
            }
            Comparison::Semantic { threshold } => {
                let score = jaccard_similarity(&exp.text, &act.text);
                if score < threshold {
                    return Some(format!(
                        "turn {} text similarity {:.2} below {:.2}",
                        turn, score, threshold
                    ));
                }
                if exp.tool_calls != act.tool_calls {
                    return Some(format!("turn {} tool calls differ", turn));
                }
            }
            Comparison::Tools if exp.tool_calls != act.tool_calls => {
                return Some(format!("turn {} tool calls differ", turn));
            }
            _ => {}
        }
    }
    None
}

fn pretty(file: &SnapshotFile) -> String {
    serde_json::to_string_pretty(file).unwrap_or_default()
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
