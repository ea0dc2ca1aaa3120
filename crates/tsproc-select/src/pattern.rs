//! Wildcard patterns for time series lists
//!
//! Matching is case-sensitive and covers the whole value. `*` matches any
//! sequence of characters (including none); every other character is literal.

use std::fmt;

/// A pattern matched against aliases and identifier text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Exact, case-sensitive match
    Exact(String),

    /// Pattern containing at least one `*`
    /// - `A*` matches A1, A2, ...
    /// - `*.Day` matches any daily identifier
    /// - `*Flow*` matches any value containing Flow
    Wildcard(String),
}

impl Pattern {
    /// Build a pattern from text, choosing wildcard matching when `*` is present
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.contains('*') {
            Pattern::Wildcard(text)
        } else {
            Pattern::Exact(text)
        }
    }

    /// Create an exact match pattern
    pub fn exact(s: impl Into<String>) -> Self {
        Pattern::Exact(s.into())
    }

    /// Check if a value matches this pattern
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Exact(pattern) => value == pattern,
            Pattern::Wildcard(pattern) => match_wildcard(pattern, value),
        }
    }

    /// Pattern text as written
    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Exact(s) | Pattern::Wildcard(s) => s,
        }
    }

    /// Check if this pattern contains wildcards
    pub fn has_wildcards(&self) -> bool {
        matches!(self, Pattern::Wildcard(_))
    }
}

/// Greedy wildcard match with single-star backtracking
fn match_wildcard(pattern: &str, value: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let v: Vec<char> = value.chars().collect();

    let (mut pi, mut vi) = (0, 0);
    // Position after the last '*' seen, and the value position it was tried at
    let mut star: Option<(usize, usize)> = None;

    while vi < v.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi + 1, vi));
            pi += 1;
        } else if pi < p.len() && p[pi] == v[vi] {
            pi += 1;
            vi += 1;
        } else if let Some((after_star, tried)) = star {
            pi = after_star;
            vi = tried + 1;
            star = Some((after_star, tried + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
