//! Prose scanner: locate time expressions inside free text.
//!
//! A battery of anchor patterns marks probable expression starts. Each
//! anchor grows a candidate window word by word, re-running the full
//! single-expression resolver after every word, and keeps the best-scoring
//! parse. The scoring constants are empirically tuned and load-bearing;
//! changing them changes which of several overlapping readings wins.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::convert::date::has_clock_time;
use crate::options::ParseOptions;
use crate::resolver::parse;
use crate::result::{ParseResult, ScanMatch};

/// Candidate growth cap, in words.
const MAX_WORDS: usize = 12;
/// Consecutive failed extensions tolerated once a parse has succeeded.
const MAX_FAILURES: usize = 3;

const TRAILING_PUNCT: &[char] = &['.', ',', '!', '?', ';', ':'];
const TITLE_SEPARATORS: &[char] = &['-', ':', '\u{2013}', '\u{2014}', '(', ')', '[', ']'];

/// Modal continuations that mark "may" as the auxiliary verb.
const MODALS: &[&str] = &[
    "be", "have", "not", "never", "also", "still", "just", "want", "need", "as", "well", "or",
];

/// Words that legitimize an ambiguous standalone anchor ("march", "second").
const CONTEXT_WORDS: &[&str] = &["in", "by", "on", "at", "for", "the"];
const NEEDS_CONTEXT: &[&str] = &["march", "spring", "fall", "second"];

static ANCHORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Weekday, month, and season names.
        r"(?i)\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues?|wed|thur?s?|fri|sat|sun)\b",
        r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\b",
        r"(?i)\b(?:spring|summer|fall|autumn|winter)\b",
        r"(?i)\b(?:q[1-4]|h[12])\b",
        // Relative modifiers and special days.
        r"(?i)\b(?:next|last|this|coming|upcoming|previous|past)\b",
        r"(?i)\b(?:today|tomorrow|tmrw|yesterday|tonight|now)\b",
        // Clock times and meridiem forms.
        r"(?i)\b\d{1,2}:\d{2}\b",
        r"(?i)\b\d{1,2}\s*(?:am|pm)\b",
        // ISO dates and plausible bare years.
        r"\b\d{4}-\d{2}-\d{2}\b",
        r"\b(?:19|20)\d{2}\b",
        // Number + unit.
        r"(?i)\b\d+(?:\.\d+)?\s*(?:seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|wks?|months?|mo|years?|yrs?|fortnights?|[smhdwy])\b",
        // Lead-in words.
        r"(?i)\b(?:in|from|within|between)\b",
        // Word numbers.
        r"(?i)\b(?:one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty|thirty)\b",
        r"(?i)\b(?:eod|cob|ytd)\b",
        // "a week", "an hour".
        r"(?i)\ban?\s+(?:second|minute|hour|day|week|month|quarter|year|fortnight)s?\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("anchor pattern"))
    .collect()
});

/// Scan prose for time expressions, returning non-overlapping matches
/// ordered by start offset.
pub fn scan(text: &str, options: &ParseOptions) -> Vec<ScanMatch> {
    let mut anchors = BTreeSet::new();
    for re in ANCHORS.iter() {
        for m in re.find_iter(text) {
            anchors.insert(m.start());
        }
    }

    let mut matches: Vec<ScanMatch> = Vec::new();
    for anchor in anchors {
        if !at_word_boundary(text, anchor) || rejected_by_context(text, anchor) {
            continue;
        }
        if let Some(m) = best_match_at(text, anchor, options) {
            matches.push(m);
        }
    }

    remove_overlaps(matches)
}

fn at_word_boundary(text: &str, offset: usize) -> bool {
    offset == 0
        || text[..offset]
            .chars()
            .next_back()
            .is_some_and(|c| !c.is_alphanumeric())
}

/// Reject ambiguous standalone anchors: "may" before a modal verb, and
/// "march"/"spring"/"fall"/"second" without a nearby introducing word.
fn rejected_by_context(text: &str, anchor: usize) -> bool {
    let word: String = text[anchor..]
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();

    if word == "may" {
        let next = next_word(text, anchor + word.len());
        if MODALS.contains(&next.as_str()) {
            return true;
        }
    }

    // "a second" hides the ambiguous word behind the article.
    let ambiguous = if word == "a" || word == "an" {
        next_word(text, anchor + word.len())
    } else {
        word
    };
    if NEEDS_CONTEXT.contains(&ambiguous.as_str()) {
        let window_start = anchor.saturating_sub(10);
        let window = text
            .get(window_start..anchor)
            .unwrap_or("")
            .to_ascii_lowercase();
        let introduced = window
            .split(|c: char| !c.is_ascii_alphabetic())
            .any(|w| CONTEXT_WORDS.contains(&w));
        if !introduced {
            return true;
        }
    }

    false
}

fn next_word(text: &str, from: usize) -> String {
    text.get(from..)
        .unwrap_or("")
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Grow a candidate from `anchor` word by word, tracking the best parse.
fn best_match_at(text: &str, anchor: usize, options: &ParseOptions) -> Option<ScanMatch> {
    let mut best: Option<(f64, ScanMatch)> = None;
    let mut failures = 0;

    for word_end in word_ends(text, anchor).into_iter().take(MAX_WORDS) {
        let raw = &text[anchor..word_end];
        let candidate = raw.trim_end_matches(TRAILING_PUNCT).trim_end();

        let parsed = if candidate.is_empty() {
            None
        } else {
            parse(candidate, options)
        };
        match parsed {
            Some(result) => {
                failures = 0;
                let score = score_of(&result, candidate);
                if best.as_ref().is_none_or(|(b, _)| score > *b) {
                    best = Some((
                        score,
                        ScanMatch {
                            result,
                            matched_text: candidate.to_string(),
                            start: anchor,
                            end: word_end,
                        },
                    ));
                }
            }
            None => {
                if best.is_some() {
                    failures += 1;
                    if failures >= MAX_FAILURES {
                        break;
                    }
                }
            }
        }

        // Sentence-ending punctuation terminates growth.
        if raw.ends_with(['.', '!', '?']) {
            break;
        }
    }

    best.map(|(_, m)| m)
}

/// End offsets of each successive word starting at `from`.
fn word_ends(text: &str, from: usize) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut in_word = false;
    for (i, c) in text[from..].char_indices() {
        if c.is_whitespace() {
            if in_word {
                ends.push(from + i);
                in_word = false;
            }
        } else {
            in_word = true;
        }
    }
    if in_word {
        ends.push(text.len());
    }
    ends
}

fn score_of(result: &ParseResult, candidate: &str) -> f64 {
    let mut score = 1.0;
    match result {
        ParseResult::Date(d) if has_clock_time(d.instant) => score += 2.0,
        ParseResult::Span(_) => score += 3.0,
        ParseResult::Fuzzy(_) => score += 0.5,
        _ => {}
    }
    if result.title().is_some() {
        // A title with no separator nearby is almost always over-matching.
        let separated = candidate.chars().any(|c| TITLE_SEPARATORS.contains(&c));
        if !separated {
            score -= 5.0;
        }
    } else {
        // Tiny bonus so longer plain matches win ties.
        score += 0.001 * candidate.len() as f64;
    }
    score
}

/// Keep matches sorted by start; on overlap the earlier (or, at the same
/// start, longer) match wins.
fn remove_overlaps(mut matches: Vec<ScanMatch>) -> Vec<ScanMatch> {
    matches.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then((b.end - b.start).cmp(&(a.end - a.start)))
    });
    let mut kept: Vec<ScanMatch> = Vec::new();
    for m in matches {
        if kept.last().is_none_or(|prev| m.start >= prev.end) {
            kept.push(m);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn opts() -> ParseOptions {
        ParseOptions::new(
            DateTime::parse_from_rfc3339("2025-01-15T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    #[test]
    fn test_scan_meeting_prose() {
        let matches = scan("can we meet tomorrow at 5pm?", &opts());
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.matched_text, "tomorrow at 5pm");
        assert_eq!(m.start, 12);
        assert_eq!(m.end, 28);
        match &m.result {
            ParseResult::Date(d) => {
                assert_eq!(
                    d.instant,
                    DateTime::parse_from_rfc3339("2025-01-16T17:00:00Z").unwrap()
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_scan_multiple_expressions() {
        let matches = scan("standup next friday. review due jan 20", &opts());
        assert!(matches.len() >= 2, "got {matches:?}");
        assert_eq!(matches[0].matched_text, "next friday");
        assert!(matches.iter().any(|m| m.matched_text == "jan 20"));
    }

    #[test]
    fn test_scan_non_overlapping_and_ordered() {
        let matches = scan("from jan 5 to jan 20 then 3pm friday", &opts());
        for pair in matches.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_may_modal_is_rejected() {
        let matches = scan("we may be a bit late", &opts());
        assert!(matches.is_empty(), "got {matches:?}");
    }

    #[test]
    fn test_may_month_with_context() {
        let matches = scan("see you in may", &opts());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_text, "may");
    }

    #[test]
    fn test_march_requires_context_word() {
        assert!(scan("soldiers march daily", &opts()).is_empty());
        let matches = scan("report due in march", &opts());
        assert!(matches.iter().any(|m| m.matched_text == "march"));
    }

    #[test]
    fn test_second_requires_context() {
        assert!(scan("wait a second longer", &opts()).is_empty());
    }

    #[test]
    fn test_sentence_punctuation_stops_growth() {
        let matches = scan("due tomorrow. more text after", &opts());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_text, "tomorrow");
        // The raw end includes the stripped period.
        assert_eq!(&"due tomorrow. more text after"[matches[0].start..matches[0].end], "tomorrow.");
    }

    #[test]
    fn test_no_matches_in_plain_prose() {
        assert!(scan("nothing temporal here at all", &opts()).is_empty());
    }

    #[test]
    fn test_span_outscores_date_prefix() {
        // The range reading should win over the bare "jan 5" date.
        let matches = scan("offsite jan 5 to jan 20", &opts());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_text, "jan 5 to jan 20");
        assert!(matches!(matches[0].result, ParseResult::Span(_)));
    }
}
