// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables read by senytl are defined here.

use crate::config::FallbackMode;
use std::path::PathBuf;

/// Overrides the configured fallback mode (`error`, `default`, `pass_through`).
pub const SENYTL_FALLBACK: &str = "SENYTL_FALLBACK";
/// Overrides the directory session files are written to and read from.
pub const SENYTL_SESSIONS_DIR: &str = "SENYTL_SESSIONS_DIR";

/// `SENYTL_FALLBACK` — Fallback mode override. Unknown values are ignored.
pub fn fallback() -> Option<FallbackMode> {
    fallback_raw().and_then(|v| v.parse().ok())
}

/// `SENYTL_FALLBACK` as set, trimmed, for callers that reject bad values.
pub fn fallback_raw() -> Option<String> {
    std::env::var(SENYTL_FALLBACK)
        .ok()
        .map(|v| v.trim().to_string())
}

/// `SENYTL_SESSIONS_DIR` — Session directory override.
pub fn sessions_dir() -> Option<PathBuf> {
    std::env::var(SENYTL_SESSIONS_DIR)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
