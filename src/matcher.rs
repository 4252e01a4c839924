// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Run named patterns against the input text

use crate::error::TemplateError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A named regular expression supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternEntry {
    pub name: String,
    pub pattern: String,
}

impl PatternEntry {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// Compile the regex source, reporting failures against this entry's name.
    pub fn compile(&self) -> Result<Regex, TemplateError> {
        Regex::new(&self.pattern).map_err(|e| TemplateError::InvalidPattern {
            name: self.name.clone(),
            message: e.to_string(),
        })
    }
}

/// Pattern names follow `^[a-zA-Z][a-zA-Z0-9_]*$`.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// One occurrence of a pattern in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Full match text (group 0).
    pub text: String,
    /// Byte offsets into the input.
    pub start: usize,
    pub end: usize,
    /// Capture groups 1..=n; `None` when the group did not participate.
    groups: Vec<Option<String>>,
}

impl MatchResult {
    fn from_captures(caps: &regex::Captures<'_>) -> Option<Self> {
        let whole = caps.get(0)?;
        let groups = caps
            .iter()
            .skip(1)
            .map(|g| g.map(|m| m.as_str().to_string()))
            .collect();
        Some(Self {
            text: whole.as_str().to_string(),
            start: whole.start(),
            end: whole.end(),
            groups,
        })
    }

    /// Number of capture groups, not counting group 0.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Group `n` of this match; 0 is the full match.
    /// Returns `None` when the pattern has no such group and `Some("")` when
    /// the group exists but did not take part in the match.
    pub fn group(&self, n: usize) -> Option<&str> {
        if n == 0 {
            return Some(&self.text);
        }
        self.groups
            .get(n - 1)
            .map(|g| g.as_deref().unwrap_or(""))
    }
}

/// Matches per pattern name, produced fresh for every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    matches: HashMap<String, Vec<MatchResult>>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, results: Vec<MatchResult>) {
        self.matches.insert(name.into(), results);
    }

    /// Matches for `name`, or `None` when no such pattern was run.
    pub fn get(&self, name: &str) -> Option<&[MatchResult]> {
        self.matches.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.matches.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.matches.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Total number of matches across all patterns.
    pub fn total_matches(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }
}

/// Check names and compile every pattern, in order.
pub fn compile_patterns(patterns: &[PatternEntry]) -> Result<Vec<(&str, Regex)>, TemplateError> {
    let mut seen = HashSet::new();
    let mut compiled = Vec::with_capacity(patterns.len());
    for entry in patterns {
        if !is_valid_name(&entry.name) {
            return Err(TemplateError::InvalidName(entry.name.clone()));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(TemplateError::DuplicateName(entry.name.clone()));
        }
        compiled.push((entry.name.as_str(), entry.compile()?));
    }
    Ok(compiled)
}

/// Run every pattern over `input`, collecting non-overlapping matches left to right.
pub fn match_all(patterns: &[PatternEntry], input: &str) -> Result<MatchSet, TemplateError> {
    let compiled = compile_patterns(patterns)?;
    let mut set = MatchSet::new();
    for (name, re) in compiled {
        let results: Vec<MatchResult> = re
            .captures_iter(input)
            .filter_map(|caps| MatchResult::from_captures(&caps))
            .collect();
        tracing::trace!(pattern = name, matches = results.len(), "pattern matched");
        set.insert(name, results);
    }
    Ok(set)
}
