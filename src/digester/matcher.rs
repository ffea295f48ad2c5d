//! Pattern Matching
//!
//! Patterns come in three forms:
//!
//! | Pattern     | Matches                                            |
//! |-------------|----------------------------------------------------|
//! | `a/b/c`     | exactly that path (a leading `/` is ignored)       |
//! | `*/b/c`     | any path ending in `b/c`, including `b/c` itself    |
//! | `*`         | every element                                      |
//!
//! Exact patterns are indexed by their joined text and wildcard patterns by
//! their joined suffix, so a lookup costs one hash probe for the full path,
//! one per candidate suffix length and a copy of the universal bucket.

use super::path::PathStack;
use crate::error::{DigesterError, Result};
use std::collections::HashMap;
use std::fmt;

/// Registration index of a rule; also its tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub(crate) usize);

impl RuleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Exact,
    /// Leading `*/`: anchored at the end of the path
    Suffix,
    /// Bare `*`
    Universal,
}

/// A validated path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    /// Segments joined with '/', without any wildcard marker
    key: String,
    segments: usize,
    kind: PatternKind,
}

impl Pattern {
    pub fn parse(source: &str) -> Result<Pattern> {
        if source.is_empty() {
            return Err(DigesterError::pattern(source, "empty pattern"));
        }
        if source == "*" {
            return Ok(Pattern {
                source: source.to_string(),
                key: String::new(),
                segments: 0,
                kind: PatternKind::Universal,
            });
        }

        let (kind, body) = match source.strip_prefix("*/") {
            Some(rest) => (PatternKind::Suffix, rest),
            None => (PatternKind::Exact, source.strip_prefix('/').unwrap_or(source)),
        };
        if body.is_empty() {
            return Err(DigesterError::pattern(source, "no segments after the prefix"));
        }

        let mut segments = 0;
        for segment in body.split('/') {
            if segment.is_empty() {
                return Err(DigesterError::pattern(source, "empty path segment"));
            }
            if segment.contains('*') {
                return Err(DigesterError::pattern(
                    source,
                    "wildcards are only allowed as a leading `*/` or a bare `*`",
                ));
            }
            segments += 1;
        }

        Ok(Pattern {
            source: source.to_string(),
            key: body.to_string(),
            segments,
            kind,
        })
    }

    /// Pattern as registered
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Number of literal segments
    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Check a single path against this pattern
    pub fn matches(&self, path: &PathStack) -> bool {
        match self.kind {
            PatternKind::Exact => path.as_match() == self.key,
            PatternKind::Suffix => {
                path.depth() >= self.segments && path.suffix(self.segments) == self.key
            }
            PatternKind::Universal => !path.is_empty(),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Index from patterns to the rules registered under them
#[derive(Debug, Default, Clone)]
pub struct PatternMatcher {
    exact: HashMap<String, Vec<RuleId>>,
    suffix: HashMap<String, Vec<RuleId>>,
    universal: Vec<RuleId>,
    /// Segment count of the longest suffix pattern
    longest_suffix: usize,
}

impl PatternMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `id` under `pattern`; ids must arrive in registration order
    pub fn add(&mut self, pattern: &Pattern, id: RuleId) {
        match pattern.kind {
            PatternKind::Exact => self.exact.entry(pattern.key.clone()).or_default().push(id),
            PatternKind::Suffix => {
                self.suffix.entry(pattern.key.clone()).or_default().push(id);
                self.longest_suffix = self.longest_suffix.max(pattern.segments);
            }
            PatternKind::Universal => self.universal.push(id),
        }
    }

    /// Rules matching `path`, most specific first
    ///
    /// Exact matches come first, then suffix matches from the longest
    /// matched suffix to the shortest, then the universal pattern. Rules
    /// under the same pattern keep their registration order.
    pub fn matching_rules(&self, path: &PathStack) -> Vec<RuleId> {
        let mut matched = Vec::new();
        if path.is_empty() {
            return matched;
        }

        if let Some(ids) = self.exact.get(path.as_match()) {
            matched.extend_from_slice(ids);
        }
        for k in (1..=self.longest_suffix.min(path.depth())).rev() {
            if let Some(ids) = self.suffix.get(path.suffix(k)) {
                matched.extend_from_slice(ids);
            }
        }
        matched.extend_from_slice(&self.universal);
        matched
    }
}
