//! Lexical tokenizer for normalized (lower-cased) time expressions.
//!
//! Produces a deterministic token stream. Pattern precedence is a
//! correctness invariant, not cosmetic:
//!
//! 1. Clock times (`9:30`) before plain integers.
//! 2. Compact month+day (`jan15`) before separate month/integer tokens.
//! 3. Quarter/half/ordinal/short-duration/decimal before generic integers.
//! 4. AM/PM markers before generic word matching.
//! 5. Words classified by first match against the ordered keyword table;
//!    unit words precede ordinal words so "second" lexes as a unit.
//!
//! Tokens carry no semantic value beyond their normalized text; numeric
//! conversion happens in the converters.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TempexError};

/// Token categories. Each relative modifier, connector, and time-of-day
/// word is its own kind so the grammar can reference them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    Newline,
    /// `HH:MM` or `HH:MM:SS`.
    ClockTime,
    /// Compact month+day, e.g. `july10`.
    MonthDay,
    /// `q1`..`q4`.
    Quarter,
    /// `h1`..`h2`.
    Half,
    /// `1st`..`31st`.
    OrdinalNum,
    /// `1.5` and friends.
    Decimal,
    /// Abbreviated duration, e.g. `2w`, `3d`, `6mo`, `45min`.
    ShortDuration,
    Integer,
    /// `am` / `pm` markers.
    Meridiem,
    Month,
    Weekday,
    Season,
    /// Spelled-out number ("one".."twenty", "thirty").
    WordNumber,
    /// Duration/period unit word ("day", "week", "half", ...).
    Unit,
    /// "first", "third", "fourth", "fifth" ("second" lexes as a unit).
    OrdinalWord,
    // Relative modifiers.
    Next,
    Last,
    This,
    Coming,
    Previous,
    Past,
    // Special days.
    Today,
    Tomorrow,
    Yesterday,
    Now,
    // Times of day.
    Noon,
    Midday,
    Midnight,
    Morning,
    Afternoon,
    Evening,
    Night,
    Tonight,
    // Period words.
    Weekend,
    Ytd,
    Eod,
    Cob,
    // Qualifiers.
    Business,
    Early,
    Mid,
    Middle,
    Late,
    Beginning,
    Start,
    End,
    // Connectors.
    Ago,
    In,
    On,
    At,
    Of,
    From,
    To,
    Until,
    Through,
    Between,
    And,
    For,
    By,
    Before,
    After,
    Starting,
    Within,
    // Articles.
    The,
    A,
    An,
    // Punctuation.
    Dash,
    Slash,
    Colon,
    Comma,
    Semicolon,
    Dot,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    /// Any word not in the keyword table.
    Word,
}

/// One lexeme: kind, normalized text, and byte offset into the normalized
/// input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

const MONTH_NAMES: &str = "january|february|march|april|june|july|august|september|sept|october|november|december|jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}(?::\d{2})?\b").unwrap());
static MONTH_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^(?:{MONTH_NAMES})(\d{{1,2}})\b")).unwrap());
static QUARTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^q[1-4]\b").unwrap());
static HALF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^h[1-2]\b").unwrap());
static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}(?:st|nd|rd|th)\b").unwrap());
static SHORT_DUR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?(?:mo|min|[smhdwy])\b").unwrap());
static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+").unwrap());
static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+").unwrap());
static MERIDIEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:a\.m\.|p\.m\.|am\b|pm\b)").unwrap());
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]+").unwrap());

/// Ordered keyword table. First match wins, so entry order is load-bearing:
/// units come before ordinal words ("second" must lex as a unit) and before
/// nothing else that shares a spelling.
const KEYWORDS: &[(TokenKind, &[&str])] = &[
    (
        TokenKind::Unit,
        &[
            "seconds", "second", "secs", "sec", "minutes", "minute", "mins", "min", "hours",
            "hour", "hrs", "hr", "days", "day", "weeks", "week", "wks", "wk", "months", "month",
            "mo", "years", "year", "yrs", "yr", "quarters", "quarter", "halves", "half",
            "fortnights", "fortnight",
        ],
    ),
    (TokenKind::OrdinalWord, &["first", "third", "fourth", "fifth"]),
    (
        TokenKind::WordNumber,
        &[
            "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
            "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
            "eighteen", "nineteen", "twenty", "thirty",
        ],
    ),
    (
        TokenKind::Month,
        &[
            "january", "jan", "february", "feb", "march", "mar", "april", "apr", "may", "june",
            "jun", "july", "jul", "august", "aug", "september", "sept", "sep", "october", "oct",
            "november", "nov", "december", "dec",
        ],
    ),
    (
        TokenKind::Weekday,
        &[
            "monday", "mon", "tuesday", "tues", "tue", "wednesday", "wed", "thursday", "thurs",
            "thur", "thu", "friday", "fri", "saturday", "sat", "sunday", "sun",
        ],
    ),
    (
        TokenKind::Season,
        &["spring", "summer", "fall", "autumn", "winter"],
    ),
    (TokenKind::Next, &["next"]),
    (TokenKind::Last, &["last"]),
    (TokenKind::This, &["this"]),
    (TokenKind::Coming, &["coming", "upcoming"]),
    (TokenKind::Previous, &["previous", "prev"]),
    (TokenKind::Past, &["past"]),
    (TokenKind::Today, &["today"]),
    (TokenKind::Tomorrow, &["tomorrow", "tmrw"]),
    (TokenKind::Yesterday, &["yesterday"]),
    (TokenKind::Now, &["now"]),
    (TokenKind::Noon, &["noon"]),
    (TokenKind::Midday, &["midday"]),
    (TokenKind::Midnight, &["midnight"]),
    (TokenKind::Morning, &["morning"]),
    (TokenKind::Afternoon, &["afternoon"]),
    (TokenKind::Evening, &["evening"]),
    (TokenKind::Night, &["night"]),
    (TokenKind::Tonight, &["tonight"]),
    (TokenKind::Weekend, &["weekend", "weekends"]),
    (TokenKind::Ytd, &["ytd"]),
    (TokenKind::Eod, &["eod"]),
    (TokenKind::Cob, &["cob"]),
    (TokenKind::Business, &["business"]),
    (TokenKind::Early, &["early"]),
    (TokenKind::Mid, &["mid"]),
    (TokenKind::Middle, &["middle"]),
    (TokenKind::Late, &["late"]),
    (TokenKind::Beginning, &["beginning"]),
    (TokenKind::Start, &["start"]),
    (TokenKind::End, &["end"]),
    (TokenKind::Ago, &["ago"]),
    (TokenKind::In, &["in"]),
    (TokenKind::On, &["on"]),
    (TokenKind::At, &["at"]),
    (TokenKind::Of, &["of"]),
    (TokenKind::From, &["from"]),
    (TokenKind::To, &["to"]),
    (TokenKind::Until, &["until", "till"]),
    (TokenKind::Through, &["through", "thru"]),
    (TokenKind::Between, &["between"]),
    (TokenKind::And, &["and"]),
    (TokenKind::For, &["for"]),
    (TokenKind::By, &["by"]),
    (TokenKind::Before, &["before"]),
    (TokenKind::After, &["after"]),
    (TokenKind::Starting, &["starting"]),
    (TokenKind::Within, &["within"]),
    (TokenKind::The, &["the"]),
    (TokenKind::A, &["a"]),
    (TokenKind::An, &["an"]),
];

fn classify_word(word: &str) -> TokenKind {
    for (kind, words) in KEYWORDS {
        if words.contains(&word) {
            return *kind;
        }
    }
    TokenKind::Word
}

/// Tokenize a lower-cased, punctuation-normalized string.
///
/// # Errors
///
/// Returns [`TempexError::InvalidExpression`] on any character no rule
/// accepts; the whole input is rejected rather than partially tokenized.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        let ch = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };

        if ch.is_whitespace() {
            let run: String = rest.chars().take_while(|c| c.is_whitespace()).collect();
            let kind = if run.contains('\n') {
                TokenKind::Newline
            } else {
                TokenKind::Whitespace
            };
            let len = run.len();
            tokens.push(Token {
                kind,
                text: run,
                offset: pos,
            });
            pos += len;
            continue;
        }

        let matched = match_pattern(rest);
        match matched {
            Some((kind, len)) => {
                tokens.push(Token {
                    kind,
                    text: rest[..len].to_string(),
                    offset: pos,
                });
                pos += len;
            }
            None => {
                return Err(TempexError::InvalidExpression(format!(
                    "unrecognized character '{ch}' at byte {pos}"
                )));
            }
        }
    }

    Ok(tokens)
}

fn match_pattern(rest: &str) -> Option<(TokenKind, usize)> {
    if let Some(m) = CLOCK_RE.find(rest) {
        return Some((TokenKind::ClockTime, m.end()));
    }
    if let Some(m) = MONTH_DAY_RE.find(rest) {
        return Some((TokenKind::MonthDay, m.end()));
    }
    if let Some(m) = QUARTER_RE.find(rest) {
        return Some((TokenKind::Quarter, m.end()));
    }
    if let Some(m) = HALF_RE.find(rest) {
        return Some((TokenKind::Half, m.end()));
    }
    if let Some(m) = ORDINAL_RE.find(rest) {
        return Some((TokenKind::OrdinalNum, m.end()));
    }
    if let Some(m) = SHORT_DUR_RE.find(rest) {
        return Some((TokenKind::ShortDuration, m.end()));
    }
    if let Some(m) = DECIMAL_RE.find(rest) {
        return Some((TokenKind::Decimal, m.end()));
    }
    if let Some(m) = INTEGER_RE.find(rest) {
        return Some((TokenKind::Integer, m.end()));
    }
    if let Some(m) = MERIDIEM_RE.find(rest) {
        return Some((TokenKind::Meridiem, m.end()));
    }
    if let Some(m) = WORD_RE.find(rest) {
        let word = m.as_str();
        return Some((classify_word(word), m.end()));
    }

    let ch = rest.chars().next()?;
    let kind = match ch {
        '-' | '\u{2013}' | '\u{2014}' => TokenKind::Dash,
        '/' => TokenKind::Slash,
        ':' => TokenKind::Colon,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        '.' => TokenKind::Dot,
        '(' => TokenKind::OpenParen,
        ')' => TokenKind::CloseParen,
        '[' => TokenKind::OpenBracket,
        ']' => TokenKind::CloseBracket,
        _ => return None,
    };
    Some((kind, ch.len_utf8()))
}

// ── Lexical value helpers ───────────────────────────────────────────────────
//
// Shared by grammar actions and converters; tokens themselves stay
// value-free.

/// Month name (full or abbreviated) to month number 1-12.
pub fn month_number(name: &str) -> Option<u32> {
    match name {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sept" | "sep" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

/// Weekday name (full or abbreviated) to `chrono::Weekday`.
pub fn weekday_from(name: &str) -> Option<chrono::Weekday> {
    use chrono::Weekday;
    match name {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tues" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thurs" | "thur" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Spelled-out number to its value.
pub fn word_number_value(word: &str) -> Option<i64> {
    let v = match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "thirty" => 30,
        _ => return None,
    };
    Some(v)
}

/// Ordinal word ("first".."fifth") to its rank. "second" arrives as a unit
/// token, so callers match it separately.
pub fn ordinal_word_value(word: &str) -> Option<u32> {
    match word {
        "first" => Some(1),
        "second" => Some(2),
        "third" => Some(3),
        "fourth" => Some(4),
        "fifth" => Some(5),
        _ => None,
    }
}

/// Numeric ordinal ("21st") to its rank.
pub fn ordinal_num_value(text: &str) -> Option<u32> {
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Split a compact month+day token ("july10") into month and day numbers.
pub fn split_month_day(text: &str) -> Option<(u32, u32)> {
    let split_at = text.find(|c: char| c.is_ascii_digit())?;
    let month = month_number(&text[..split_at])?;
    let day: u32 = text[split_at..].parse().ok()?;
    Some((month, day))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_clock_time_beats_integer() {
        assert_eq!(kinds("9:30"), vec![TokenKind::ClockTime]);
        assert_eq!(
            kinds("9 30"),
            vec![TokenKind::Integer, TokenKind::Integer]
        );
    }

    #[test]
    fn test_compact_month_day() {
        assert_eq!(kinds("july10"), vec![TokenKind::MonthDay]);
        assert_eq!(kinds("jan15"), vec![TokenKind::MonthDay]);
        assert_eq!(split_month_day("july10"), Some((7, 10)));
    }

    #[test]
    fn test_quarter_half_ordinal() {
        assert_eq!(kinds("q1"), vec![TokenKind::Quarter]);
        assert_eq!(kinds("h2"), vec![TokenKind::Half]);
        assert_eq!(kinds("21st"), vec![TokenKind::OrdinalNum]);
        assert_eq!(ordinal_num_value("21st"), Some(21));
    }

    #[test]
    fn test_short_durations() {
        assert_eq!(kinds("2w"), vec![TokenKind::ShortDuration]);
        assert_eq!(kinds("6mo"), vec![TokenKind::ShortDuration]);
        assert_eq!(kinds("45min"), vec![TokenKind::ShortDuration]);
        assert_eq!(kinds("1.5h"), vec![TokenKind::ShortDuration]);
    }

    #[test]
    fn test_ordinal_not_confused_with_short_duration() {
        // "2nd" must stay an ordinal even though it ends in 'd'.
        assert_eq!(kinds("2nd"), vec![TokenKind::OrdinalNum]);
        assert_eq!(kinds("3d"), vec![TokenKind::ShortDuration]);
    }

    #[test]
    fn test_meridiem_before_words() {
        assert_eq!(
            kinds("3 pm"),
            vec![TokenKind::Integer, TokenKind::Meridiem]
        );
        assert_eq!(kinds("p.m."), vec![TokenKind::Meridiem]);
    }

    #[test]
    fn test_second_is_a_unit_not_an_ordinal() {
        assert_eq!(kinds("second"), vec![TokenKind::Unit]);
        assert_eq!(kinds("third"), vec![TokenKind::OrdinalWord]);
    }

    #[test]
    fn test_keyword_categories() {
        assert_eq!(
            kinds("next friday at noon"),
            vec![
                TokenKind::Next,
                TokenKind::Weekday,
                TokenKind::At,
                TokenKind::Noon
            ]
        );
        assert_eq!(kinds("may"), vec![TokenKind::Month]);
        assert_eq!(kinds("winter"), vec![TokenKind::Season]);
        assert_eq!(kinds("hello"), vec![TokenKind::Word]);
    }

    #[test]
    fn test_offsets_are_byte_positions() {
        let toks = tokenize("jan 5 to jan 20").unwrap();
        let jan20 = toks.iter().rfind(|t| t.kind == TokenKind::Month).unwrap();
        assert_eq!(jan20.offset, 9);
    }

    #[test]
    fn test_unknown_character_rejects_input() {
        assert!(tokenize("tomorrow @ 5").is_err());
    }

    #[test]
    fn test_punctuation_kinds() {
        assert_eq!(
            kinds("1/5/2025"),
            vec![
                TokenKind::Integer,
                TokenKind::Slash,
                TokenKind::Integer,
                TokenKind::Slash,
                TokenKind::Integer
            ]
        );
        assert_eq!(
            kinds("(next monday)"),
            vec![
                TokenKind::OpenParen,
                TokenKind::Next,
                TokenKind::Weekday,
                TokenKind::CloseParen
            ]
        );
    }
}
