//! Pattern matching against a single submitted code value.
//!
//! A stored pattern is sniffed once into a [`PatternKind`]:
//! - **RegexLike** if it starts with `^` or contains any of `[ ( * + ?`.
//!   It is compiled and searched (unanchored unless the pattern anchors itself).
//!   A pattern that fails to compile degrades to a literal.
//! - **Literal** otherwise. A literal matches when either string contains the
//!   other, which includes equality.
//!
//! Literal containment is symmetric: a short literal such as `"1"` matches
//! nearly every code, and a long literal matches any submitted value that is a
//! fragment of it.
//!
//! Comparison is case-sensitive; no normalisation is applied to either side.

use regex::Regex;
use tracing::debug;

const REGEX_MARKERS: [char; 5] = ['[', '(', '*', '+', '?'];

/// How a pattern string is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    Literal,
    RegexLike,
}

impl PatternKind {
    pub fn classify(pattern: &str) -> Self {
        if pattern.starts_with('^') || pattern.contains(REGEX_MARKERS) {
            Self::RegexLike
        } else {
            Self::Literal
        }
    }
}

/// A pattern prepared for repeated matching.
#[derive(Clone, Debug)]
pub enum CompiledPattern {
    Regex(Regex),
    Literal(String),
}

impl CompiledPattern {
    pub fn compile(pattern: &str) -> Self {
        match PatternKind::classify(pattern) {
            PatternKind::Literal => Self::Literal(pattern.to_string()),
            PatternKind::RegexLike => match Regex::new(pattern) {
                Ok(re) => Self::Regex(re),
                Err(e) => {
                    debug!(pattern, error = %e, "malformed pattern, matching as literal");
                    Self::Literal(pattern.to_string())
                }
            },
        }
    }

    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(value),
            Self::Literal(literal) => value.contains(literal.as_str()) || literal.contains(value),
        }
    }
}

/// Test one pattern against one value.
pub fn matches(pattern: &str, value: &str) -> bool {
    CompiledPattern::compile(pattern).is_match(value)
}
