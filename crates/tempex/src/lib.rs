//! # tempex
//!
//! Natural-language time expression parsing.
//!
//! Tempex turns free-form English time expressions ("next friday at 3pm",
//! "Q1 2025", "jan 5 to jan 20", "Team sync - next monday") into structured
//! results: a point in time, a duration, a concrete span, or an approximate
//! fuzzy period, each optionally carrying a title recovered from the
//! surrounding text. Everything is computed against an explicit reference
//! instant, so results are pure and reproducible.
//!
//! ## Modules
//!
//! - [`token`] — lower-cased text → typed token stream
//! - [`grammar`] / [`parser`] — Earley parser over the expression grammar
//! - [`ast`] — typed nodes produced by grammar actions
//! - [`convert`] — AST → result conversion (calendar-correct date math)
//! - [`calendar`] / [`weekday`] — quarter/half/season boundaries, weekday lookup
//! - [`normalize`] — pre-parse punctuation balancing
//! - [`resolver`] — the single-expression pipeline behind [`parse`]
//! - [`scanner`] — find expressions embedded in prose
//! - [`segmenter`] — split prose on hard delimiters and resolve each piece
//! - [`error`] — error types

pub mod ast;
pub mod calendar;
pub mod convert;
pub mod error;
pub mod grammar;
pub mod normalize;
pub mod options;
pub mod parser;
pub mod resolver;
pub mod result;
pub mod scanner;
pub mod segmenter;
pub mod token;
pub mod weekday;

pub use error::{Result, TempexError};
pub use options::{DateFormat, FiscalYearStart, ParseOptions, WeekStartDay};
pub use resolver::{parse, parse_date, parse_duration, parse_span};
pub use result::{
    DateResult, DurationResult, FuzzyResult, ParseResult, ScanMatch, SpanResult,
};
pub use scanner::scan;
pub use segmenter::extract;
