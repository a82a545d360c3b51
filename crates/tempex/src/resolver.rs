//! Single-expression resolution: normalize, tokenize, parse, convert.
//!
//! This is the whole pipeline behind [`parse`] and its derived accessors.
//! Failures at any stage (empty input, unrecognized characters, zero
//! derivations, semantically invalid values) uniformly yield `None`; no
//! partial results and no distinguished error codes cross this boundary.

use chrono::{DateTime, Duration, Utc};

use crate::ast::Node;
use crate::convert;
use crate::grammar::GRAMMAR;
use crate::normalize::{normalize, Normalized};
use crate::options::ParseOptions;
use crate::parser;
use crate::result::{ParseResult, SpanResult};
use crate::token::{tokenize, Token, TokenKind};

/// Tokens the grammar never sees: layout, articles that only pad phrases,
/// and commas ("jan 5, 2025").
fn significant(tok: &Token) -> bool {
    !matches!(
        tok.kind,
        TokenKind::Whitespace | TokenKind::Newline | TokenKind::The | TokenKind::Comma
    )
}

/// Parse one complete time expression.
pub fn parse(text: &str, options: &ParseOptions) -> Option<ParseResult> {
    let (node, normalized) = parse_to_node(text)?;
    let mut result = convert::resolve(&node, options).ok()?;

    // Title offsets address the normalized text; recover the original-case
    // substring through the byte map.
    if let Node::Titled(t) = &node {
        if let Some(title) = original_title(text, &normalized, t.start, t.end) {
            result.set_title(Some(title));
        }
    }
    Some(result)
}

fn parse_to_node(text: &str) -> Option<(Node, Normalized)> {
    if text.trim().is_empty() {
        return None;
    }
    let normalized = normalize(text);
    if normalized.text.is_empty() {
        return None;
    }
    // ASCII lowering preserves byte offsets into the normalized text.
    let lowered = normalized.text.to_ascii_lowercase();
    let tokens: Vec<Token> = tokenize(&lowered)
        .ok()?
        .into_iter()
        .filter(significant)
        .collect();
    let node = parser::parse(&GRAMMAR, &tokens)?.node()?;
    Some((node, normalized))
}

fn original_title(original: &str, normalized: &Normalized, start: usize, end: usize) -> Option<String> {
    if start >= end || end > normalized.map.len() {
        return None;
    }
    let from = normalized.map[start];
    let to = normalized.map[end - 1] + 1;
    let title = original.get(from..to)?.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Parse and force the result down to a single instant: dates verbatim,
/// durations added to the reference, spans and fuzzy periods at their start.
pub fn parse_date(text: &str, options: &ParseOptions) -> Option<DateTime<Utc>> {
    match parse(text, options)? {
        ParseResult::Date(d) => Some(d.instant),
        ParseResult::Duration(d) => options
            .reference
            .checked_add_signed(Duration::milliseconds(d.milliseconds)),
        ParseResult::Span(s) => Some(s.start),
        ParseResult::Fuzzy(f) => Some(f.start),
    }
}

/// Parse and return a total duration in milliseconds; spans report their
/// extent, everything else is absent.
pub fn parse_duration(text: &str, options: &ParseOptions) -> Option<i64> {
    match parse(text, options)? {
        ParseResult::Duration(d) => Some(d.milliseconds),
        ParseResult::Span(s) => Some(s.duration_ms),
        _ => None,
    }
}

/// Parse and return a span; fuzzy periods widen to their full range.
pub fn parse_span(text: &str, options: &ParseOptions) -> Option<SpanResult> {
    match parse(text, options)? {
        ParseResult::Span(s) => Some(s),
        ParseResult::Fuzzy(f) => Some(SpanResult {
            start: f.start,
            end: f.end,
            duration_ms: (f.end - f.start).num_milliseconds(),
            title: f.title,
        }),
        _ => None,
    }
}
