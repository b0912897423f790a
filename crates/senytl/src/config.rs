// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration read from `[package.metadata.senytl]`.
//!
//! ```toml
//! [package.metadata.senytl]
//! fallback = "pass_through"
//! sessions_dir = "tests/sessions"
//! ```

use crate::env;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Manifest the configuration table is read from
pub const MANIFEST_FILE: &str = "Cargo.toml";
/// Key under `metadata` holding the configuration table
pub const METADATA_KEY: &str = "senytl";
/// Session directory relative to the project root
pub const DEFAULT_SESSIONS_DIR: &str = ".senytl/sessions";

/// Errors that can occur while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid fallback mode '{0}': must be one of error, default, pass_through")]
    InvalidFallback(String),
}

/// Policy for requests no rule matches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Fail with a no-match error
    #[default]
    Error,
    /// Answer with an empty response
    Default,
    /// Let the real provider handle the call
    PassThrough,
}

impl FallbackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Default => "default",
            Self::PassThrough => "pass_through",
        }
    }
}

impl std::fmt::Display for FallbackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FallbackMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "default" => Ok(Self::Default),
            "pass_through" => Ok(Self::PassThrough),
            other => Err(ConfigError::InvalidFallback(other.to_string())),
        }
    }
}

/// Resolved project configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SenytlConfig {
    /// Fallback mode for unmatched requests (default: error)
    #[serde(default)]
    pub fallback: FallbackMode,

    /// Session directory, relative paths resolve against the project root
    /// (default: `.senytl/sessions`)
    #[serde(default)]
    pub sessions_dir: Option<PathBuf>,
}

impl SenytlConfig {
    /// Load configuration for the project at `root`.
    ///
    /// A missing or unreadable manifest, or an invalid table, yields the
    /// defaults. Environment overrides are applied last.
    pub fn load(root: &Path) -> Self {
        let manifest = root.join(MANIFEST_FILE);
        let config = match Self::from_manifest(&manifest) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::debug!(path = %manifest.display(), error = %e, "ignoring senytl config");
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    /// Load configuration for the project at `root`, reporting problems.
    ///
    /// Unlike [`SenytlConfig::load`], an unreadable manifest, an invalid
    /// table or an unknown `SENYTL_FALLBACK` value is an error.
    pub fn try_load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_manifest(&root.join(MANIFEST_FILE))?
            .unwrap_or_default()
            .with_env_overrides();
        if let Some(raw) = env::fallback_raw() {
            config.fallback = raw.parse()?;
        }
        Ok(config)
    }

    /// Read the configuration table from a manifest file.
    ///
    /// Returns `Ok(None)` when the file exists but has no senytl table, and
    /// also when the file does not exist.
    pub fn from_manifest(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_manifest_str(&content)
    }

    /// Parse the configuration table out of manifest text.
    ///
    /// `[package.metadata.senytl]` wins over `[workspace.metadata.senytl]`.
    pub fn from_manifest_str(content: &str) -> Result<Option<Self>, ConfigError> {
        let manifest: toml::Table = toml::from_str(content)?;
        let table = ["package", "workspace"].iter().find_map(|section| {
            manifest
                .get(*section)
                .and_then(|s| s.get("metadata"))
                .and_then(|m| m.get(METADATA_KEY))
        });
        match table {
            Some(value) => Ok(Some(value.clone().try_into()?)),
            None => Ok(None),
        }
    }

    /// Apply `SENYTL_FALLBACK` and `SENYTL_SESSIONS_DIR`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(fallback) = env::fallback() {
            self.fallback = fallback;
        }
        if let Some(dir) = env::sessions_dir() {
            self.sessions_dir = Some(dir);
        }
        self
    }

    /// Absolute session directory for a project rooted at `root`.
    pub fn resolve_sessions_dir(&self, root: &Path) -> PathBuf {
        match &self.sessions_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => root.join(dir),
            None => root.join(DEFAULT_SESSIONS_DIR),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
