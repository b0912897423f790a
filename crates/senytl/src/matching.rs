// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt matching predicates.

use crate::error::SenytlError;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Similarity a semantic match needs unless overridden
pub const DEFAULT_SEMANTIC_THRESHOLD: f64 = 0.3;

/// A composable predicate over prompt text.
///
/// Every configured condition must hold. With nothing configured it
/// matches any prompt. Substring and regex checks ignore case; the regex is
/// compiled up front, so a bad pattern fails at declaration.
#[derive(Clone, Debug)]
pub struct MatchSpec {
    contains: Option<Vec<String>>,
    regex: Option<Regex>,
    semantic_match: Option<String>,
    semantic_threshold: f64,
}

impl Default for MatchSpec {
    fn default() -> Self {
        Self::any()
    }
}

impl MatchSpec {
    /// Matches every prompt.
    pub fn any() -> Self {
        Self {
            contains: None,
            regex: None,
            semantic_match: None,
            semantic_threshold: DEFAULT_SEMANTIC_THRESHOLD,
        }
    }

    /// Prompt must contain `needle`.
    pub fn contains(needle: impl Into<String>) -> Self {
        Self::any().with_contains(needle)
    }

    /// Prompt must contain at least one of `needles`. An empty list never matches.
    pub fn contains_any<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::any().with_contains_any(needles)
    }

    /// Prompt must match `pattern` somewhere.
    pub fn regex(pattern: &str) -> Result<Self, SenytlError> {
        Self::any().with_regex(pattern)
    }

    /// Prompt must be lexically similar to `reference`.
    pub fn semantic(reference: impl Into<String>) -> Self {
        Self::any().with_semantic(reference)
    }

    pub fn with_contains(self, needle: impl Into<String>) -> Self {
        self.with_contains_any([needle])
    }

    pub fn with_contains_any<I, S>(mut self, needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contains = Some(
            needles
                .into_iter()
                .map(|n| n.into().to_lowercase())
                .collect(),
        );
        self
    }

    pub fn with_regex(mut self, pattern: &str) -> Result<Self, SenytlError> {
        self.regex = Some(RegexBuilder::new(pattern).case_insensitive(true).build()?);
        Ok(self)
    }

    pub fn with_semantic(mut self, reference: impl Into<String>) -> Self {
        self.semantic_match = Some(reference.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.semantic_threshold = threshold;
        self
    }

    pub fn semantic_threshold(&self) -> f64 {
        self.semantic_threshold
    }

    pub fn is_unconditional(&self) -> bool {
        self.contains.is_none() && self.regex.is_none() && self.semantic_match.is_none()
    }

    pub fn matches(&self, prompt: &str) -> bool {
        if let Some(needles) = &self.contains {
            let haystack = prompt.to_lowercase();
            if !needles.iter().any(|n| haystack.contains(n.as_str())) {
                return false;
            }
        }

        if let Some(re) = &self.regex {
            if !re.is_match(prompt) {
                return false;
            }
        }

        if let Some(reference) = &self.semantic_match {
            if jaccard_similarity(prompt, reference) < self.semantic_threshold {
                return false;
            }
        }

        true
    }
}

/// Split text into a lowercase set of word tokens (`[A-Za-z0-9_']+`).
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

/// Jaccard similarity of the token sets of `a` and `b`.
///
/// Two texts with no tokens are identical (1.0); one empty side scores 0.0.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let left = tokenize(a);
    let right = tokenize(b);
    if left.is_empty() && right.is_empty() {
        return 1.0;
    }
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
#[path = "matching_tests.rs"]
mod tests;
