// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Assertions over the ordered tool calls of a run.

use crate::model::ToolCall;
use serde_json::{Map, Value};
use thiserror::Error;

/// Smallest repetition count that counts as a loop
const MIN_LOOP_THRESHOLD: usize = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    #[error("Expected step '{0}' not found (or out of order)")]
    MissingStep(String),

    #[error("Step '{0}' should NOT have occurred, but did")]
    UnexpectedStep(String),

    #[error("Redundant tool call detected: {name} with args {}", args_json(.args))]
    RedundantCall {
        name: String,
        args: Map<String, Value>,
    },

    #[error("Potential infinite loop detected: sequence {sequence:?} repeated {threshold} times")]
    Loop {
        sequence: Vec<String>,
        threshold: usize,
    },
}

/// One expected step: a tool that must run (in order) or must never run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Present(String),
    Absent(String),
}

impl Step {
    pub fn tool(name: impl Into<String>) -> Self {
        Step::Present(name.into())
    }

    pub fn absent(name: impl Into<String>) -> Self {
        Step::Absent(name.into())
    }
}

impl From<&str> for Step {
    fn from(name: &str) -> Self {
        Step::tool(name)
    }
}

/// Present steps must appear as an ordered subsequence of the calls; absent
/// steps must not appear at all.
pub fn assert_steps<I, S>(calls: &[ToolCall], expected: I) -> Result<(), TrajectoryError>
where
    I: IntoIterator<Item = S>,
    S: Into<Step>,
{
    let mut cursor = 0;
    for step in expected {
        match step.into() {
            Step::Absent(name) => {
                if calls.iter().any(|tc| tc.name == name) {
                    return Err(TrajectoryError::UnexpectedStep(name));
                }
            }
            Step::Present(name) => {
                let found = calls[cursor..].iter().position(|tc| tc.name == name);
                match found {
                    Some(offset) => cursor += offset + 1,
                    None => return Err(TrajectoryError::MissingStep(name)),
                }
            }
        }
    }
    Ok(())
}

/// No two consecutive calls may share both name and arguments.
pub fn assert_no_redundant_calls(calls: &[ToolCall]) -> Result<(), TrajectoryError> {
    match calls.windows(2).find(|w| w[0] == w[1]) {
        Some(pair) => Err(TrajectoryError::RedundantCall {
            name: pair[0].name.clone(),
            args: pair[0].args.clone(),
        }),
        None => Ok(()),
    }
}

/// No run of tool names may repeat `threshold` times back to back.
///
/// Thresholds below 2 are treated as 2.
pub fn assert_no_infinite_loops(
    calls: &[ToolCall],
    threshold: usize,
) -> Result<(), TrajectoryError> {
    let threshold = threshold.max(MIN_LOOP_THRESHOLD);
    let names: Vec<&str> = calls.iter().map(|tc| tc.name.as_str()).collect();
    let n = names.len();

    for length in 1..=n / threshold {
        for start in 0..=(n - length * threshold) {
            let sequence = &names[start..start + length];
            let repeats = (1..threshold).all(|k| {
                let from = start + k * length;
                &names[from..from + length] == sequence
            });
            if repeats {
                return Err(TrajectoryError::Loop {
                    sequence: sequence.iter().map(|s| s.to_string()).collect(),
                    threshold,
                });
            }
        }
    }
    Ok(())
}

fn args_json(args: &Map<String, Value>) -> Value {
    Value::Object(args.clone())
}

#[cfg(test)]
#[path = "trajectory_tests.rs"]
mod tests;
