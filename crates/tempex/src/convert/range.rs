//! Range, relative-window, and relative-date conversion.
//!
//! Ranges resolve both endpoints independently and apply the rollover
//! heuristic when the end lands before the start: weekday-based ends
//! advance one week, anything else one calendar year. Relative dates apply
//! a signed offset to a base instant; month/year offsets use calendar
//! arithmetic, everything else is millisecond arithmetic.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};

use crate::ast::{
    BaseRef, Direction, DurUnit, DurationNode, Endpoint, OffsetSpec, RangeNode, RelativeDateNode,
    RelativeNode,
};
use crate::calendar;
use crate::convert::date::{apply_time, is_weekday_based, resolve_date};
use crate::convert::duration::{disambiguate, resolve_duration, MS_DAY, MS_FORTNIGHT, MS_HOUR,
    MS_MINUTE, MS_SECOND, MS_WEEK};
use crate::convert::fuzzy::resolve_fuzzy;
use crate::error::{Result, TempexError};
use crate::options::ParseOptions;

/// A resolved range as `(start, end, duration_ms)`.
pub type Span = (DateTime<Utc>, DateTime<Utc>, i64);

pub fn resolve_range(node: &RangeNode, opts: &ParseOptions) -> Result<Span> {
    let (start, _, _) = endpoint_bounds(&node.start, opts)?;
    let (_, mut end, end_is_weekday) = endpoint_bounds(&node.end, opts)?;

    if end < start {
        // Rollover heuristic, applied once.
        end = if end_is_weekday {
            end + Duration::days(7)
        } else {
            shift_months(end, 12)?
        };
    }
    if end < start {
        return Err(TempexError::InvalidDate("range end precedes start".into()));
    }
    Ok((start, end, (end - start).num_milliseconds()))
}

/// Endpoint bounds: a date endpoint is a single instant; a fuzzy endpoint
/// contributes its period start or end depending on which side it sits.
fn endpoint_bounds(
    ep: &Endpoint,
    opts: &ParseOptions,
) -> Result<(DateTime<Utc>, DateTime<Utc>, bool)> {
    match ep {
        Endpoint::Date(d) => {
            let instant = resolve_date(d, opts)?;
            Ok((instant, instant, is_weekday_based(d)))
        }
        Endpoint::Fuzzy(f) => {
            let outcome = resolve_fuzzy(f, opts)?;
            Ok((outcome.start(), outcome.end(), false))
        }
    }
}

pub fn resolve_relative(node: &RelativeNode, opts: &ParseOptions) -> Result<Span> {
    let (ms, _) = resolve_duration(&node.duration)?;
    let reference = opts.reference;
    let overflow = || TempexError::InvalidDuration(format!("window of {ms} ms out of range"));
    let (start, end) = match node.direction {
        Direction::Past => (
            reference
                .checked_sub_signed(Duration::milliseconds(ms))
                .ok_or_else(overflow)?,
            reference,
        ),
        Direction::Future => (
            reference,
            reference
                .checked_add_signed(Duration::milliseconds(ms))
                .ok_or_else(overflow)?,
        ),
    };
    Ok((start, end, ms))
}

pub fn resolve_relative_date(
    node: &RelativeDateNode,
    opts: &ParseOptions,
) -> Result<DateTime<Utc>> {
    let base = match &node.base {
        BaseRef::Reference => opts.reference,
        BaseRef::Date(d) => resolve_date(d, opts)?,
        BaseRef::Fuzzy(f) => {
            let outcome = resolve_fuzzy(f, opts)?;
            if node.anchor_end {
                outcome.end()
            } else {
                outcome.start()
            }
        }
    };

    let sign: i64 = match node.direction {
        Direction::Past => -1,
        Direction::Future => 1,
    };

    let shifted = match &node.offset {
        OffsetSpec::Duration(dur) => duration_offset(base, dur, sign)?,
        OffsetSpec::BusinessDays(n) => business_day_offset(base, *n, sign)?,
        OffsetSpec::NthWeekday { n, weekday } => nth_weekday_offset(base, *n, *weekday),
    };

    match &node.time {
        Some(time) => apply_time(shifted.date_naive(), time),
        None => Ok(shifted),
    }
}

/// Duration offset with calendar-aware month/year handling: whole months
/// and years preserve the day-of-month (rolling overflow days forward),
/// all other parts are millisecond arithmetic.
fn duration_offset(base: DateTime<Utc>, dur: &DurationNode, sign: i64) -> Result<DateTime<Utc>> {
    if dur.parts.is_empty() {
        return Err(TempexError::InvalidDuration("empty duration".into()));
    }
    let has_hour = dur.parts.iter().any(|p| p.unit == DurUnit::Hour);

    let mut dt = base;
    for part in &dur.parts {
        if part.value < 0.0 || !part.value.is_finite() {
            return Err(TempexError::InvalidDuration(format!("value {}", part.value)));
        }
        let unit = disambiguate(part.unit, has_hour);
        let whole = part.value.fract() == 0.0;
        dt = match unit {
            DurUnit::Month if whole => shift_months(dt, sign * part.value as i64)?,
            DurUnit::Year if whole => shift_months(dt, sign * 12 * part.value as i64)?,
            _ => {
                let ms_unit = match unit {
                    DurUnit::Second => MS_SECOND,
                    DurUnit::Minute => MS_MINUTE,
                    DurUnit::Hour => MS_HOUR,
                    DurUnit::Day => MS_DAY,
                    DurUnit::Week => MS_WEEK,
                    DurUnit::Fortnight => MS_FORTNIGHT,
                    // Fractional month/year counts fall back to the
                    // approximate multipliers.
                    DurUnit::Month | DurUnit::MonthOrMinute => 30 * MS_DAY,
                    DurUnit::Year => 365 * MS_DAY,
                };
                let ms = (part.value * ms_unit as f64).round() as i64;
                dt.checked_add_signed(Duration::milliseconds(sign * ms))
                    .ok_or_else(|| {
                        TempexError::InvalidDuration(format!("offset of {ms} ms out of range"))
                    })?
            }
        };
    }
    Ok(dt)
}

/// Shift whole months preserving time-of-day.
fn shift_months(dt: DateTime<Utc>, months: i64) -> Result<DateTime<Utc>> {
    let date = calendar::add_months_rolling(dt.date_naive(), months)
        .ok_or_else(|| TempexError::InvalidDate(format!("month shift {months}")))?;
    Ok(DateTime::from_naive_utc_and_offset(
        date.and_time(dt.time()),
        Utc,
    ))
}

/// Counts beyond this never make sense in a scheduling phrase, and the
/// stepping loop below must stay bounded.
const MAX_BUSINESS_DAYS: i64 = 10_000;

/// Step one day at a time, counting only Monday through Friday.
fn business_day_offset(base: DateTime<Utc>, n: i64, sign: i64) -> Result<DateTime<Utc>> {
    if !(0..=MAX_BUSINESS_DAYS).contains(&n) {
        return Err(TempexError::InvalidDuration(format!("{n} business days")));
    }
    let mut dt = base;
    let mut remaining = n;
    while remaining > 0 {
        dt += Duration::days(sign);
        if !matches!(dt.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    Ok(dt)
}

/// Step forward one day at a time until the nth occurrence of the weekday.
fn nth_weekday_offset(base: DateTime<Utc>, n: u32, weekday: Weekday) -> DateTime<Utc> {
    let mut dt = base;
    let mut seen = 0;
    while seen < n {
        dt += Duration::days(1);
        if dt.weekday() == weekday {
            seen += 1;
        }
    }
    dt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DateNode, DateSpec, DurPart, FuzzyNode, PeriodSpec, PeriodUnit, RelWord};

    fn opts() -> ParseOptions {
        ParseOptions::new(instant("2025-01-15T12:00:00Z"))
    }

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn month_day(month: u32, day: u32) -> DateNode {
        DateNode::new(DateSpec::MonthDay {
            month,
            day: Some(day),
            year: None,
            rel: None,
        })
    }

    fn dur(value: f64, unit: DurUnit) -> DurationNode {
        DurationNode {
            parts: vec![DurPart { value, unit }],
        }
    }

    #[test]
    fn test_simple_range() {
        let node = RangeNode {
            start: Endpoint::Date(month_day(1, 5)),
            end: Endpoint::Date(month_day(1, 20)),
        };
        let (start, end, ms) = resolve_range(&node, &opts()).unwrap();
        assert_eq!(start, instant("2025-01-05T00:00:00Z"));
        assert_eq!(end, instant("2025-01-20T00:00:00Z"));
        assert_eq!(ms, 15 * MS_DAY);
    }

    #[test]
    fn test_weekday_end_rolls_a_week() {
        // From Wed Jan 15, "friday to thursday": next Thursday (Jan 16)
        // lands before Friday (Jan 17) and advances one week.
        let node = RangeNode {
            start: Endpoint::Date(DateNode::new(DateSpec::WeekdayRel {
                weekday: Weekday::Fri,
                rel: None,
            })),
            end: Endpoint::Date(DateNode::new(DateSpec::WeekdayRel {
                weekday: Weekday::Thu,
                rel: None,
            })),
        };
        let (start, end, _) = resolve_range(&node, &opts()).unwrap();
        assert_eq!(start, instant("2025-01-17T00:00:00Z"));
        assert_eq!(end, instant("2025-01-23T00:00:00Z"));
    }

    #[test]
    fn test_month_end_rolls_a_year() {
        // "dec 20 to jan 5": jan 5 resolves into 2025, before the start,
        // and rolls forward a year.
        let o = ParseOptions::new(instant("2025-11-01T00:00:00Z"));
        let node = RangeNode {
            start: Endpoint::Date(month_day(12, 20)),
            end: Endpoint::Date(month_day(1, 5)),
        };
        let (start, end, _) = resolve_range(&node, &o).unwrap();
        assert_eq!(start, instant("2025-12-20T00:00:00Z"));
        assert_eq!(end, instant("2026-01-05T00:00:00Z"));
    }

    #[test]
    fn test_fuzzy_endpoints_use_period_bounds() {
        // "next week to march": starts at the week start, ends at March's
        // final millisecond.
        let mut week = FuzzyNode::new(PeriodSpec::UnitPeriod(PeriodUnit::Week));
        week.rel = Some(RelWord::Next);
        let node = RangeNode {
            start: Endpoint::Fuzzy(week),
            end: Endpoint::Fuzzy(FuzzyNode::new(PeriodSpec::Month(3))),
        };
        let (start, end, _) = resolve_range(&node, &opts()).unwrap();
        assert_eq!(start, instant("2025-01-20T00:00:00Z"));
        assert_eq!(end, instant("2025-03-31T23:59:59.999Z"));
    }

    #[test]
    fn test_relative_window_past() {
        let node = RelativeNode {
            direction: Direction::Past,
            duration: dur(30.0, DurUnit::Day),
        };
        let (start, end, ms) = resolve_relative(&node, &opts()).unwrap();
        assert_eq!(end, opts().reference);
        assert_eq!(start, instant("2024-12-16T12:00:00Z"));
        assert_eq!(ms, 30 * MS_DAY);
    }

    fn rd(
        base: BaseRef,
        offset: OffsetSpec,
        direction: Direction,
    ) -> RelativeDateNode {
        RelativeDateNode {
            base,
            offset,
            direction,
            anchor_end: false,
            time: None,
        }
    }

    #[test]
    fn test_days_before_date() {
        let node = rd(
            BaseRef::Date(Box::new(DateNode::new(DateSpec::WeekdayRel {
                weekday: Weekday::Fri,
                rel: None,
            }))),
            OffsetSpec::Duration(dur(2.0, DurUnit::Day)),
            Direction::Past,
        );
        assert_eq!(
            resolve_relative_date(&node, &opts()).unwrap(),
            instant("2025-01-15T00:00:00Z")
        );
    }

    #[test]
    fn test_calendar_month_offset_preserves_day() {
        let node = rd(
            BaseRef::Date(Box::new(month_day(1, 31))),
            OffsetSpec::Duration(dur(1.0, DurUnit::Month)),
            Direction::Future,
        );
        // Jan 31 + 1 month rolls into March 3 (2025 is not a leap year).
        assert_eq!(
            resolve_relative_date(&node, &opts()).unwrap(),
            instant("2025-03-03T00:00:00Z")
        );
    }

    #[test]
    fn test_business_days_skip_weekends() {
        // Wed Jan 15 + 5 business days = Wed Jan 22.
        let node = rd(
            BaseRef::Reference,
            OffsetSpec::BusinessDays(5),
            Direction::Future,
        );
        assert_eq!(
            resolve_relative_date(&node, &opts()).unwrap(),
            instant("2025-01-22T12:00:00Z")
        );
    }

    #[test]
    fn test_business_day_count_is_capped() {
        let node = rd(
            BaseRef::Reference,
            OffsetSpec::BusinessDays(99_999_999_999),
            Direction::Future,
        );
        assert!(resolve_relative_date(&node, &opts()).is_err());
        let node = rd(
            BaseRef::Reference,
            OffsetSpec::BusinessDays(-1),
            Direction::Future,
        );
        assert!(resolve_relative_date(&node, &opts()).is_err());
    }

    #[test]
    fn test_huge_offsets_error_instead_of_panicking() {
        // Saturated millisecond offsets overflow the chrono range.
        let node = rd(
            BaseRef::Reference,
            OffsetSpec::Duration(dur(99_999_999_999.0, DurUnit::Week)),
            Direction::Future,
        );
        assert!(resolve_relative_date(&node, &opts()).is_err());

        // Calendar-aware year shifts walk past the representable calendar.
        let node = rd(
            BaseRef::Reference,
            OffsetSpec::Duration(dur(99_999_999_999.0, DurUnit::Year)),
            Direction::Future,
        );
        assert!(resolve_relative_date(&node, &opts()).is_err());

        let window = RelativeNode {
            direction: Direction::Future,
            duration: dur(99_999_999_999.0, DurUnit::Year),
        };
        assert!(resolve_relative(&window, &opts()).is_err());
    }

    #[test]
    fn test_nth_weekday_from_reference() {
        // 3rd Friday after Wed Jan 15: Jan 17, 24, 31.
        let node = rd(
            BaseRef::Reference,
            OffsetSpec::NthWeekday {
                n: 3,
                weekday: Weekday::Fri,
            },
            Direction::Future,
        );
        assert_eq!(
            resolve_relative_date(&node, &opts()).unwrap(),
            instant("2025-01-31T12:00:00Z")
        );
    }

    #[test]
    fn test_after_fuzzy_anchors_period_end() {
        let mut week = FuzzyNode::new(PeriodSpec::UnitPeriod(PeriodUnit::Week));
        week.rel = Some(RelWord::Next);
        let mut node = rd(
            BaseRef::Fuzzy(Box::new(week)),
            OffsetSpec::Duration(dur(1.0, DurUnit::Day)),
            Direction::Future,
        );
        node.anchor_end = true;
        // Next week ends Sun Jan 26 at the last millisecond; one day later.
        assert_eq!(
            resolve_relative_date(&node, &opts()).unwrap(),
            instant("2025-01-27T23:59:59.999Z")
        );
    }

    #[test]
    fn test_trailing_time_overwrites() {
        let mut node = rd(
            BaseRef::Reference,
            OffsetSpec::Duration(dur(2.0, DurUnit::Week)),
            Direction::Future,
        );
        node.time = Some(crate::ast::TimeSpec::Clock {
            hour: 9,
            minute: 30,
            second: 0,
            meridiem: None,
        });
        assert_eq!(
            resolve_relative_date(&node, &opts()).unwrap(),
            instant("2025-01-29T09:30:00Z")
        );
    }
}
