// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-safe buffer of recorded calls.

use crate::session::{RecordedCall, SessionFile};
use parking_lot::Mutex;
use std::sync::Arc;

/// Capture log shared by every thread that records into a session.
///
/// Appends go through a mutex so concurrent agent invocations never lose or
/// interleave entries. Clones share the same buffer.
pub struct CaptureLog {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CaptureLog {
    /// Create an empty capture log
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a call, returning its sequence number
    pub fn record(&self, call: RecordedCall) -> usize {
        let mut calls = self.calls.lock();
        calls.push(call);
        calls.len() - 1
    }

    /// Get all captured calls
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Replace the buffer contents
    pub fn replace(&self, calls: Vec<RecordedCall>) {
        *self.calls.lock() = calls;
    }

    /// Drain the buffer into a session document
    pub fn take_session(&self) -> SessionFile {
        SessionFile::new(std::mem::take(&mut *self.calls.lock()))
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Clear all recorded calls
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl Default for CaptureLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CaptureLog {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl std::fmt::Debug for CaptureLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureLog")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
