//! Parse options: the reference instant and calendar conventions.
//!
//! Every operation in this crate is a pure function of its input text plus
//! these options. The reference instant is an explicit injected "now" — the
//! crate never reads the system clock on its own except in
//! [`ParseOptions::default`], which exists for convenience at the very edge
//! of the API. Tests always supply an explicit instant.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The month a fiscal year begins, used for quarter and half boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FiscalYearStart {
    /// Calendar-aligned fiscal year (Q1 = Jan–Mar).
    #[default]
    January,
    /// Q1 = Apr–Jun (e.g. UK, Japan).
    April,
    /// Q1 = Jul–Sep (e.g. Australia).
    July,
    /// Q1 = Oct–Dec (e.g. US federal).
    October,
}

impl FiscalYearStart {
    /// First calendar month (1-12) of the fiscal year.
    pub fn start_month(self) -> u32 {
        match self {
            FiscalYearStart::January => 1,
            FiscalYearStart::April => 4,
            FiscalYearStart::July => 7,
            FiscalYearStart::October => 10,
        }
    }
}

/// Which day begins a week for period computations ("next week", week-number
/// lookups, weekday-of-week resolution).
///
/// Does **not** affect named-weekday expressions like "next monday".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WeekStartDay {
    /// ISO 8601 standard (Monday = day 0 of the week).
    #[default]
    Monday,
    /// US/Canada convention (Sunday = day 0 of the week).
    Sunday,
}

/// Day/month ordering for delimited dates like `1/5/2025`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DateFormat {
    /// Day/month/year.
    #[default]
    Intl,
    /// Month/day/year, unless the first component can only be a day.
    Us,
    /// Month/day/year unless the first component exceeds 12.
    Auto,
}

/// Options for the `parse` family of functions.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// The "now" anchor every relative expression resolves against.
    pub reference: DateTime<Utc>,
    /// Fiscal year start month for quarter/half boundaries.
    pub fiscal_year_start: FiscalYearStart,
    /// Which day starts the week for period computations.
    pub week_starts_on: WeekStartDay,
    /// Day/month ordering for delimited dates.
    pub date_format: DateFormat,
}

impl ParseOptions {
    /// Options anchored at an explicit reference instant, with default
    /// calendar conventions.
    pub fn new(reference: DateTime<Utc>) -> Self {
        Self {
            reference,
            fiscal_year_start: FiscalYearStart::default(),
            week_starts_on: WeekStartDay::default(),
            date_format: DateFormat::default(),
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults() {
        let opts = ParseOptions::new(Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap());
        assert_eq!(opts.fiscal_year_start, FiscalYearStart::January);
        assert_eq!(opts.week_starts_on, WeekStartDay::Monday);
        assert_eq!(opts.date_format, DateFormat::Intl);
    }

    #[test]
    fn test_fiscal_start_months() {
        assert_eq!(FiscalYearStart::January.start_month(), 1);
        assert_eq!(FiscalYearStart::April.start_month(), 4);
        assert_eq!(FiscalYearStart::July.start_month(), 7);
        assert_eq!(FiscalYearStart::October.start_month(), 10);
    }
}
