//! AST-to-result conversion.
//!
//! Each node kind has a dedicated converter; this module dispatches and
//! shapes the outcome into the public result types. Fuzzy periods whose
//! start/end modifier collapsed them surface as dates, not fuzzy results.

pub mod date;
pub mod duration;
pub mod fuzzy;
pub mod range;

use chrono::Duration;

use crate::ast::Node;
use crate::error::{Result, TempexError};
use crate::options::ParseOptions;
use crate::result::{DateResult, DurationResult, FuzzyResult, ParseResult, SpanResult};

pub fn resolve(node: &Node, opts: &ParseOptions) -> Result<ParseResult> {
    match node {
        Node::Date(d) => Ok(ParseResult::Date(DateResult {
            instant: date::resolve_date(d, opts)?,
            title: None,
        })),
        Node::Duration(d) => {
            let (milliseconds, approximate) = duration::resolve_duration(d)?;
            Ok(ParseResult::Duration(DurationResult {
                milliseconds,
                approximate,
                title: None,
            }))
        }
        Node::Span(s) => {
            let start = date::resolve_date(&s.start, opts)?;
            let (ms, _) = duration::resolve_duration(&s.duration)?;
            let end = start
                .checked_add_signed(Duration::milliseconds(ms))
                .ok_or_else(|| TempexError::InvalidDuration(format!("span of {ms} ms")))?;
            Ok(ParseResult::Span(SpanResult {
                start,
                end,
                duration_ms: ms,
                title: None,
            }))
        }
        Node::Range(r) => {
            let (start, end, duration_ms) = range::resolve_range(r, opts)?;
            Ok(ParseResult::Span(SpanResult {
                start,
                end,
                duration_ms,
                title: None,
            }))
        }
        Node::Fuzzy(f) => match fuzzy::resolve_fuzzy(f, opts)? {
            fuzzy::FuzzyOutcome::Range { start, end } => Ok(ParseResult::Fuzzy(FuzzyResult {
                start,
                end,
                approximate: true,
                title: None,
            })),
            fuzzy::FuzzyOutcome::Instant(instant) => {
                Ok(ParseResult::Date(DateResult {
                    instant,
                    title: None,
                }))
            }
        },
        Node::Relative(r) => {
            let (start, end, duration_ms) = range::resolve_relative(r, opts)?;
            Ok(ParseResult::Span(SpanResult {
                start,
                end,
                duration_ms,
                title: None,
            }))
        }
        Node::RelativeDate(rd) => Ok(ParseResult::Date(DateResult {
            instant: range::resolve_relative_date(rd, opts)?,
            title: None,
        })),
        Node::Titled(t) => {
            let mut inner = resolve(&t.inner, opts)?;
            // Grammar-captured literal; the resolver replaces this with the
            // original-case substring when the offset map allows it.
            inner.set_title(Some(t.literal.trim().to_string()));
            Ok(inner)
        }
    }
}
