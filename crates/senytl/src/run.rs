// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation run contexts.
//!
//! A run context lives in thread-local storage for the duration of one
//! wrapped-agent call, so concurrent calls on different threads never see
//! each other's traces. Runs are tagged with the facade that started them
//! and only that facade traces into them; nested runs on one thread receive
//! traces innermost first.

use crate::model::{LlmCallRecord, ToolCall};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

/// Everything one invocation did
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunContext {
    pub llm_calls: Vec<LlmCallRecord>,
    pub tool_calls: Vec<ToolCall>,
}

impl RunContext {
    pub fn called_tool(&self, name: &str) -> bool {
        self.tool_calls.iter().any(|tc| tc.name == name)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tool_calls.iter().map(|tc| tc.name.as_str()).collect()
    }
}

struct ActiveRun {
    id: u64,
    owner: u64,
    context: RunContext,
}

thread_local! {
    static ACTIVE_RUNS: RefCell<Vec<ActiveRun>> = const { RefCell::new(Vec::new()) };
    static NEXT_RUN_ID: std::cell::Cell<u64> = const { std::cell::Cell::new(0) };
}

/// Keeps a run open on the current thread until finished or dropped.
///
/// Not `Send`: the run belongs to the thread that started it.
#[must_use = "a run is closed when its handle is dropped"]
pub struct RunHandle {
    id: u64,
    started_at: Instant,
    finished: bool,
    _not_send: PhantomData<*const ()>,
}

impl RunHandle {
    /// Close the run, returning its context and wall-clock duration.
    pub fn finish(mut self) -> (RunContext, Duration) {
        self.finished = true;
        let context = detach(self.id).unwrap_or_default();
        (context, self.started_at.elapsed())
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        if !self.finished {
            detach(self.id);
        }
    }
}

impl std::fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunHandle")
            .field("id", &self.id)
            .field("elapsed", &self.started_at.elapsed())
            .finish()
    }
}

/// Open a run for `owner` on the current thread.
pub(crate) fn start(owner: u64) -> RunHandle {
    let id = NEXT_RUN_ID.with(|next| {
        let id = next.get();
        next.set(id.wrapping_add(1));
        id
    });
    ACTIVE_RUNS.with(|runs| {
        runs.borrow_mut().push(ActiveRun {
            id,
            owner,
            context: RunContext::default(),
        })
    });
    RunHandle {
        id,
        started_at: Instant::now(),
        finished: false,
        _not_send: PhantomData,
    }
}

/// Append a call to `owner`'s innermost run on this thread.
///
/// Returns false when no such run is open.
pub(crate) fn trace(owner: u64, record: LlmCallRecord) -> bool {
    ACTIVE_RUNS.with(|runs| {
        let mut runs = runs.borrow_mut();
        let Some(run) = runs.iter_mut().rev().find(|r| r.owner == owner) else {
            return false;
        };
        run.context
            .tool_calls
            .extend(record.response.tool_calls.iter().cloned());
        run.context.llm_calls.push(record);
        true
    })
}

pub(crate) fn is_active(owner: u64) -> bool {
    ACTIVE_RUNS.with(|runs| runs.borrow().iter().any(|r| r.owner == owner))
}

fn detach(id: u64) -> Option<RunContext> {
    ACTIVE_RUNS.with(|runs| {
        let mut runs = runs.borrow_mut();
        let idx = runs.iter().position(|r| r.id == id)?;
        Some(runs.remove(idx).context)
    })
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
