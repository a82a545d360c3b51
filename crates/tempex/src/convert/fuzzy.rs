//! Fuzzy period conversion: named calendar periods to inclusive ranges.
//!
//! Periods resolve to `[start, end]` instants where `end` is one
//! millisecond before the next period starts. Quarter and half honor the
//! fiscal year start and auto-advance to the next year when the computed
//! period has already ended. The start/end modifiers collapse the range to
//! a single instant and thereby change the result kind, which the caller
//! surfaces as a date instead of a fuzzy period.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::ast::{FuzzyModifier, FuzzyNode, PeriodSpec, PeriodUnit, RelWord, Season};
use crate::calendar;
use crate::convert::date::{midnight, resolve_date};
use crate::error::{Result, TempexError};
use crate::options::ParseOptions;

/// A resolved fuzzy period: a range, or a single instant when a start/end
/// modifier collapsed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzyOutcome {
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Instant(DateTime<Utc>),
}

impl FuzzyOutcome {
    /// The period start, or the instant itself.
    pub fn start(self) -> DateTime<Utc> {
        match self {
            FuzzyOutcome::Range { start, .. } => start,
            FuzzyOutcome::Instant(i) => i,
        }
    }

    /// The period end, or the instant itself.
    pub fn end(self) -> DateTime<Utc> {
        match self {
            FuzzyOutcome::Range { end, .. } => end,
            FuzzyOutcome::Instant(i) => i,
        }
    }
}

fn rel_offset(rel: Option<RelWord>) -> i64 {
    match rel {
        None | Some(RelWord::This) => 0,
        Some(r) if r.is_backward() => -1,
        Some(_) => 1,
    }
}

pub fn resolve_fuzzy(node: &FuzzyNode, opts: &ParseOptions) -> Result<FuzzyOutcome> {
    let reference = opts.reference;
    let ref_date = reference.date_naive();
    let err = || TempexError::InvalidDate(format!("unresolvable period {:?}", node.period));

    // Resolve the base period as [start, end] inclusive instants.
    let (start, end) = match &node.period {
        PeriodSpec::Quarter(q) => {
            let span = fiscal_span(*q, node.year, reference, opts, calendar::quarter_span)?;
            day_span_to_instants(span)
        }
        PeriodSpec::Half(h) => {
            let span = fiscal_span(*h, node.year, reference, opts, calendar::half_span)?;
            day_span_to_instants(span)
        }
        PeriodSpec::Season(season) => {
            let year = season_year(*season, node.year, node.rel, ref_date)?;
            day_span_to_instants(calendar::season_span(year, *season).ok_or_else(err)?)
        }
        PeriodSpec::Month(month) => {
            let year = match node.year {
                Some(y) => y,
                None => closest_month_year(*month, ref_date),
            };
            day_span_to_instants(calendar::month_span(year, *month).ok_or_else(err)?)
        }
        PeriodSpec::UnitPeriod(unit) => {
            day_span_to_instants(unit_period_span(*unit, node.rel, ref_date, opts)?)
        }
        PeriodSpec::WeekNumber(week) => {
            let year = node.year.unwrap_or_else(|| ref_date.iso_week().year());
            day_span_to_instants(calendar::iso_week_span(year, *week).ok_or_else(err)?)
        }
        PeriodSpec::WeekOf(date_node) => {
            let anchor = resolve_date(date_node, opts)?.date_naive();
            day_span_to_instants(calendar::week_span(anchor, opts.week_starts_on))
        }
        PeriodSpec::WeekOfMonth { week, month } => {
            let year = closest_month_year(*month, ref_date);
            let days = calendar::days_in_month(year, *month).ok_or_else(err)?;
            if (week - 1) * 7 >= days {
                return Err(err());
            }
            let start = calendar::month_start(year, *month as i64)
                .ok_or_else(err)?
                + Duration::days((*week as i64 - 1) * 7);
            day_span_to_instants((start, start + Duration::days(7)))
        }
        PeriodSpec::Year(year) => {
            day_span_to_instants(calendar::year_span(*year).ok_or_else(err)?)
        }
        PeriodSpec::Weekend => {
            let saturday = calendar::week_start_of(ref_date, opts.week_starts_on)
                + Duration::days(calendar::days_from_week_start(
                    chrono::Weekday::Sat,
                    opts.week_starts_on,
                ))
                + Duration::days(7 * rel_offset(node.rel));
            day_span_to_instants((saturday, saturday + Duration::days(2)))
        }
        PeriodSpec::Night => {
            let start = crate::convert::date::apply_time(
                ref_date,
                &crate::ast::TimeSpec::Named(crate::ast::NamedTime::Night),
            )?;
            let end = midnight(ref_date + Duration::days(1)) - Duration::milliseconds(1);
            (start, end)
        }
        PeriodSpec::Fortnight => {
            let start = calendar::week_start_of(ref_date, opts.week_starts_on)
                + Duration::days(14 * rel_offset(node.rel));
            day_span_to_instants((start, start + Duration::days(14)))
        }
        PeriodSpec::YearToDate => {
            let start = NaiveDate::from_ymd_opt(ref_date.year(), 1, 1).ok_or_else(err)?;
            (midnight(start), reference)
        }
    };

    Ok(apply_modifier(start, end, node.modifier))
}

/// `[start_day, next_start_day)` to inclusive instants.
fn day_span_to_instants(span: (NaiveDate, NaiveDate)) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        midnight(span.0),
        midnight(span.1) - Duration::milliseconds(1),
    )
}

/// Quarter/half resolution with fiscal labeling and auto-year-advance.
fn fiscal_span(
    n: u32,
    explicit_year: Option<i32>,
    reference: DateTime<Utc>,
    opts: &ParseOptions,
    span_fn: impl Fn(i32, u32, crate::options::FiscalYearStart) -> Option<(NaiveDate, NaiveDate)>,
) -> Result<(NaiveDate, NaiveDate)> {
    let err = || TempexError::InvalidDate(format!("period index {n}"));
    match explicit_year {
        Some(year) => span_fn(year, n, opts.fiscal_year_start).ok_or_else(err),
        None => {
            let (label, _) =
                calendar::quarter_containing(reference.date_naive(), opts.fiscal_year_start);
            let span = span_fn(label, n, opts.fiscal_year_start).ok_or_else(err)?;
            if midnight(span.1) <= reference {
                // Period already over: take next year's occurrence.
                span_fn(label + 1, n, opts.fiscal_year_start).ok_or_else(err)
            } else {
                Ok(span)
            }
        }
    }
}

fn season_year(
    season: Season,
    explicit_year: Option<i32>,
    rel: Option<RelWord>,
    ref_date: NaiveDate,
) -> Result<i32> {
    if let Some(year) = explicit_year {
        return Ok(year);
    }
    let err = || TempexError::InvalidDate(format!("season {season:?}"));
    let span = calendar::season_span(ref_date.year(), season).ok_or_else(err)?;
    Ok(match rel {
        // "next summer" during or after this year's summer means next year.
        Some(RelWord::Next) | Some(RelWord::Coming) => {
            if span.0 <= ref_date {
                ref_date.year() + 1
            } else {
                ref_date.year()
            }
        }
        // "last summer" before this year's summer has ended means last year.
        Some(r) if r.is_backward() => {
            if span.1 > ref_date {
                ref_date.year() - 1
            } else {
                ref_date.year()
            }
        }
        _ => ref_date.year(),
    })
}

/// Closest occurrence of a month relative to the reference, ties breaking
/// toward the past.
fn closest_month_year(month: u32, ref_date: NaiveDate) -> i32 {
    let forward = (month as i64 - ref_date.month() as i64).rem_euclid(12);
    let backward = (ref_date.month() as i64 - month as i64).rem_euclid(12);
    if backward <= forward {
        if month <= ref_date.month() {
            ref_date.year()
        } else {
            ref_date.year() - 1
        }
    } else if month >= ref_date.month() {
        ref_date.year()
    } else {
        ref_date.year() + 1
    }
}

fn unit_period_span(
    unit: PeriodUnit,
    rel: Option<RelWord>,
    ref_date: NaiveDate,
    opts: &ParseOptions,
) -> Result<(NaiveDate, NaiveDate)> {
    let off = rel_offset(rel);
    let err = || TempexError::InvalidDate(format!("period unit {unit:?}"));
    match unit {
        PeriodUnit::Day => {
            let day = ref_date + Duration::days(off);
            Ok((day, day + Duration::days(1)))
        }
        PeriodUnit::Week => {
            let (start, next) = calendar::week_span(ref_date, opts.week_starts_on);
            Ok((
                start + Duration::days(7 * off),
                next + Duration::days(7 * off),
            ))
        }
        PeriodUnit::Month => {
            let (year, month) =
                calendar::normalize_month(ref_date.year(), ref_date.month0() as i64 + off);
            calendar::month_span(year, month).ok_or_else(err)
        }
        PeriodUnit::Quarter => {
            let (label, q) = calendar::quarter_containing(ref_date, opts.fiscal_year_start);
            let q0 = (q as i64 - 1) + off;
            let label = label + q0.div_euclid(4) as i32;
            let q = q0.rem_euclid(4) as u32 + 1;
            calendar::quarter_span(label, q, opts.fiscal_year_start).ok_or_else(err)
        }
        PeriodUnit::Half => {
            let (label, h) = calendar::half_containing(ref_date, opts.fiscal_year_start);
            let h0 = (h as i64 - 1) + off;
            let label = label + h0.div_euclid(2) as i32;
            let h = h0.rem_euclid(2) as u32 + 1;
            calendar::half_span(label, h, opts.fiscal_year_start).ok_or_else(err)
        }
        PeriodUnit::Year => {
            calendar::year_span(ref_date.year() + off as i32).ok_or_else(err)
        }
    }
}

fn apply_modifier(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    modifier: Option<FuzzyModifier>,
) -> FuzzyOutcome {
    let Some(modifier) = modifier else {
        return FuzzyOutcome::Range { start, end };
    };
    let span = end - start;
    let third = span / 3;
    let half = span / 2;
    match modifier {
        FuzzyModifier::Early => FuzzyOutcome::Range {
            start,
            end: start + third,
        },
        FuzzyModifier::Mid => FuzzyOutcome::Range {
            start: start + third,
            end: start + third * 2,
        },
        FuzzyModifier::Late => FuzzyOutcome::Range {
            start: start + third * 2,
            end,
        },
        FuzzyModifier::FirstHalf => FuzzyOutcome::Range {
            start,
            end: start + half,
        },
        FuzzyModifier::SecondHalf => FuzzyOutcome::Range {
            start: start + half,
            end,
        },
        FuzzyModifier::StartOf => FuzzyOutcome::Instant(start),
        // Collapse to the period's final day, normalized to midnight.
        FuzzyModifier::EndOf => FuzzyOutcome::Instant(midnight(end.date_naive())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{FiscalYearStart, ParseOptions};

    fn opts() -> ParseOptions {
        ParseOptions::new(
            DateTime::parse_from_rfc3339("2025-01-15T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn range_of(node: FuzzyNode, opts: &ParseOptions) -> (DateTime<Utc>, DateTime<Utc>) {
        match resolve_fuzzy(&node, opts).unwrap() {
            FuzzyOutcome::Range { start, end } => (start, end),
            other => panic!("expected range, got {other:?}"),
        }
    }

    #[test]
    fn test_current_quarter() {
        let (start, end) = range_of(FuzzyNode::new(PeriodSpec::Quarter(1)), &opts());
        assert_eq!(start, instant("2025-01-01T00:00:00Z"));
        assert_eq!(end, instant("2025-03-31T23:59:59.999Z"));
    }

    #[test]
    fn test_quarter_auto_advances_when_over() {
        // In October, Q1 of the current fiscal year is long over.
        let o = ParseOptions::new(instant("2025-10-10T00:00:00Z"));
        let (start, _) = range_of(FuzzyNode::new(PeriodSpec::Quarter(1)), &o);
        assert_eq!(start, instant("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn test_fiscal_year_start_shifts_quarters() {
        let mut o = opts();
        o.fiscal_year_start = FiscalYearStart::April;
        // Mid-January sits in Q4 of the fiscal year labeled 2024.
        let (start, end) = range_of(FuzzyNode::new(PeriodSpec::Quarter(4)), &o);
        assert_eq!(start, instant("2025-01-01T00:00:00Z"));
        assert_eq!(end, instant("2025-03-31T23:59:59.999Z"));
    }

    #[test]
    fn test_next_week_period() {
        let mut node = FuzzyNode::new(PeriodSpec::UnitPeriod(PeriodUnit::Week));
        node.rel = Some(RelWord::Next);
        // Reference Wed Jan 15; next week starts Monday Jan 20.
        let (start, end) = range_of(node, &opts());
        assert_eq!(start, instant("2025-01-20T00:00:00Z"));
        assert_eq!(end, instant("2025-01-26T23:59:59.999Z"));
    }

    #[test]
    fn test_start_of_collapses_to_instant() {
        let mut node = FuzzyNode::new(PeriodSpec::UnitPeriod(PeriodUnit::Week));
        node.rel = Some(RelWord::Next);
        node.modifier = Some(FuzzyModifier::StartOf);
        match resolve_fuzzy(&node, &opts()).unwrap() {
            FuzzyOutcome::Instant(i) => assert_eq!(i, instant("2025-01-20T00:00:00Z")),
            other => panic!("expected instant, got {other:?}"),
        }
    }

    #[test]
    fn test_end_of_month_is_midnight_of_last_day() {
        let mut node = FuzzyNode::new(PeriodSpec::Month(3));
        node.modifier = Some(FuzzyModifier::EndOf);
        match resolve_fuzzy(&node, &opts()).unwrap() {
            FuzzyOutcome::Instant(i) => assert_eq!(i, instant("2025-03-31T00:00:00Z")),
            other => panic!("expected instant, got {other:?}"),
        }
    }

    #[test]
    fn test_early_month_is_first_third() {
        let mut node = FuzzyNode::new(PeriodSpec::Month(3));
        node.modifier = Some(FuzzyModifier::Early);
        let (start, end) = range_of(node, &opts());
        assert_eq!(start, instant("2025-03-01T00:00:00Z"));
        // A 31-day month's first third ends a third of the way in.
        assert!(end > start && end < instant("2025-03-12T00:00:00Z"));
    }

    #[test]
    fn test_weekend() {
        let (start, end) = range_of(FuzzyNode::new(PeriodSpec::Weekend), &opts());
        assert_eq!(start, instant("2025-01-18T00:00:00Z"));
        assert_eq!(end, instant("2025-01-19T23:59:59.999Z"));
    }

    #[test]
    fn test_tonight() {
        let (start, end) = range_of(FuzzyNode::new(PeriodSpec::Night), &opts());
        assert_eq!(start, instant("2025-01-15T21:00:00Z"));
        assert_eq!(end, instant("2025-01-15T23:59:59.999Z"));
    }

    #[test]
    fn test_year_to_date_ends_at_reference() {
        let (start, end) = range_of(FuzzyNode::new(PeriodSpec::YearToDate), &opts());
        assert_eq!(start, instant("2025-01-01T00:00:00Z"));
        assert_eq!(end, opts().reference);
    }

    #[test]
    fn test_seasons_with_rel() {
        // "next summer" from January is this calendar year's summer.
        let mut node = FuzzyNode::new(PeriodSpec::Season(Season::Summer));
        node.rel = Some(RelWord::Next);
        let (start, _) = range_of(node, &opts());
        assert_eq!(start, instant("2025-06-01T00:00:00Z"));

        // "last summer" from January is the previous year's.
        let mut node = FuzzyNode::new(PeriodSpec::Season(Season::Summer));
        node.rel = Some(RelWord::Last);
        let (start, _) = range_of(node, &opts());
        assert_eq!(start, instant("2024-06-01T00:00:00Z"));
    }

    #[test]
    fn test_week_number() {
        let (start, _) = range_of(FuzzyNode::new(PeriodSpec::WeekNumber(3)), &opts());
        assert_eq!(start, instant("2025-01-13T00:00:00Z"));
    }

    #[test]
    fn test_december_resolves_to_closest_occurrence() {
        // From mid-January, December means last month.
        let (start, _) = range_of(FuzzyNode::new(PeriodSpec::Month(12)), &opts());
        assert_eq!(start, instant("2024-12-01T00:00:00Z"));
    }
}
