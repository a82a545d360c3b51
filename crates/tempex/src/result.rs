//! Result types returned by the `parse` family and the scanner.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single resolved point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateResult {
    /// The resolved instant (UTC).
    pub instant: DateTime<Utc>,
    /// Title text recovered from a titled expression, if any.
    pub title: Option<String>,
}

/// A resolved length of time with no anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationResult {
    /// Total duration in milliseconds.
    pub milliseconds: i64,
    /// True when the duration used approximate units (months or years).
    pub approximate: bool,
    /// Title text recovered from a titled expression, if any.
    pub title: Option<String>,
}

/// A resolved start/end pair. `duration_ms` always equals `end - start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanResult {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Exactly `end - start`, in milliseconds.
    pub duration_ms: i64,
    pub title: Option<String>,
}

/// An approximate calendar period such as "Q1" or "early march".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuzzyResult {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Always true; fuzzy periods are approximate by definition.
    pub approximate: bool,
    pub title: Option<String>,
}

/// The outcome of resolving one time expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParseResult {
    Date(DateResult),
    Duration(DurationResult),
    Span(SpanResult),
    Fuzzy(FuzzyResult),
}

impl ParseResult {
    /// The title carried by the result, if any.
    pub fn title(&self) -> Option<&str> {
        match self {
            ParseResult::Date(r) => r.title.as_deref(),
            ParseResult::Duration(r) => r.title.as_deref(),
            ParseResult::Span(r) => r.title.as_deref(),
            ParseResult::Fuzzy(r) => r.title.as_deref(),
        }
    }

    pub(crate) fn set_title(&mut self, title: Option<String>) {
        match self {
            ParseResult::Date(r) => r.title = title,
            ParseResult::Duration(r) => r.title = title,
            ParseResult::Span(r) => r.title = title,
            ParseResult::Fuzzy(r) => r.title = title,
        }
    }
}

/// One expression located inside prose by [`crate::scan`].
///
/// Offsets are byte positions into the original, pre-normalization input.
/// `end` covers the raw consumed words, including any trailing punctuation
/// that was stripped before resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanMatch {
    pub result: ParseResult,
    /// The matched expression text with trailing punctuation stripped.
    pub matched_text: String,
    pub start: usize,
    pub end: usize,
}
