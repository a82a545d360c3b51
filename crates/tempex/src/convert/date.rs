//! Date conversion: a typed date node plus options to a single UTC instant.
//!
//! Branch order follows the documented priority ladder. Every branch
//! resolves to a calendar date at midnight (except "now", which keeps the
//! reference instant), and a nested time specification is applied last,
//! overwriting hour and minute. Invalid times fail the whole conversion
//! rather than clamping.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc, Weekday};

use crate::ast::{DateNode, DateSpec, Meridiem, MonthRef, RelWord, SpecialDay, TimeSpec};
use crate::calendar;
use crate::error::{Result, TempexError};
use crate::options::{DateFormat, ParseOptions};
use crate::weekday;

pub fn resolve_date(node: &DateNode, opts: &ParseOptions) -> Result<DateTime<Utc>> {
    let reference = opts.reference;
    let ref_date = reference.date_naive();

    let base = match &node.spec {
        DateSpec::Special(day) => {
            if *day == SpecialDay::Now {
                return match &node.time {
                    Some(time) => apply_time(ref_date, time),
                    None => Ok(reference),
                };
            }
            let offset = match day {
                SpecialDay::Today | SpecialDay::Now => 0,
                SpecialDay::Tomorrow => 1,
                SpecialDay::Yesterday => -1,
                SpecialDay::DayAfterTomorrow => 2,
                SpecialDay::DayBeforeYesterday => -2,
            };
            ref_date + Duration::days(offset)
        }
        DateSpec::TimeOnly => ref_date,
        DateSpec::OrdinalWeekday {
            ordinal,
            weekday,
            month,
        } => {
            let (year, month) = resolve_month_ref(*month, ref_date)?;
            ordinal_weekday_in_month(year, month, *weekday, *ordinal)?
        }
        DateSpec::WeekdayRel { weekday, rel } => match rel {
            Some(r) if r.is_backward() => weekday::prev_occurrence(ref_date, *weekday),
            Some(RelWord::This) => weekday::this_occurrence(ref_date, *weekday),
            // "next", "coming", and the bare form all exclude today.
            _ => weekday::next_occurrence(ref_date, *weekday),
        },
        DateSpec::WeekdayOfWeek { weekday, rel } => {
            let shift = match rel {
                RelWord::This => 0,
                r if r.is_backward() => -7,
                _ => 7,
            };
            let anchor = calendar::week_start_of(ref_date, opts.week_starts_on)
                + Duration::days(shift);
            anchor + Duration::days(calendar::days_from_week_start(*weekday, opts.week_starts_on))
        }
        DateSpec::Delimited { a, b, c } => delimited_date(*a, *b, *c, opts.date_format)?,
        DateSpec::MonthDay {
            month,
            day,
            year,
            rel,
        } => month_day_date(*month, *day, *year, *rel, ref_date)?,
        DateSpec::DayOfMonth { day } => day_of_month_date(*day, ref_date)?,
        DateSpec::MonthEdge { last, month } => {
            let (year, month) = resolve_month_ref(*month, ref_date)?;
            if *last {
                calendar::last_day_of_month(year, month)
                    .ok_or_else(|| TempexError::InvalidDate(format!("{year}-{month}")))?
            } else {
                NaiveDate::from_ymd_opt(year, month, 1)
                    .ok_or_else(|| TempexError::InvalidDate(format!("{year}-{month}")))?
            }
        }
    };

    match &node.time {
        Some(time) => apply_time(base, time),
        None => Ok(midnight(base)),
    }
}

/// Apply a time spec to a calendar date, overwriting hour/minute/second.
pub fn apply_time(date: NaiveDate, time: &TimeSpec) -> Result<DateTime<Utc>> {
    let (hour, minute, second) = match time {
        TimeSpec::Named(named) => (named.hour(), 0, 0),
        TimeSpec::Clock {
            hour,
            minute,
            second,
            meridiem,
        } => {
            let hour = match meridiem {
                Some(m) => {
                    if !(1..=12).contains(hour) {
                        return Err(TempexError::InvalidTime(format!("hour {hour}")));
                    }
                    match m {
                        Meridiem::Am => hour % 12,
                        Meridiem::Pm => hour % 12 + 12,
                    }
                }
                None => {
                    if *hour > 23 {
                        return Err(TempexError::InvalidTime(format!("hour {hour}")));
                    }
                    *hour
                }
            };
            if *minute > 59 || *second > 59 {
                return Err(TempexError::InvalidTime(format!("{minute}:{second}")));
            }
            (hour, *minute, *second)
        }
    };
    let naive = date
        .and_hms_opt(hour, minute, second)
        .ok_or_else(|| TempexError::InvalidTime(format!("{hour}:{minute}:{second}")))?;
    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}

pub fn midnight(date: NaiveDate) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0).unwrap_or_default(), Utc)
}

/// Resolve a month reference to `(year, month)`, advancing the year when an
/// explicit month precedes the reference month.
fn resolve_month_ref(month: MonthRef, ref_date: NaiveDate) -> Result<(i32, u32)> {
    Ok(match month {
        MonthRef::Current => (ref_date.year(), ref_date.month()),
        MonthRef::Next => {
            calendar::normalize_month(ref_date.year(), ref_date.month0() as i64 + 1)
        }
        MonthRef::Named { month, year } => match year {
            Some(y) => (y, month),
            None if month < ref_date.month() => (ref_date.year() + 1, month),
            None => (ref_date.year(), month),
        },
    })
}

fn ordinal_weekday_in_month(
    year: i32,
    month: u32,
    weekday: Weekday,
    ordinal: crate::ast::WeekdayOrdinal,
) -> Result<NaiveDate> {
    let days = calendar::days_in_month(year, month)
        .ok_or_else(|| TempexError::InvalidDate(format!("{year}-{month}")))?;
    let err = || TempexError::InvalidDate(format!("no such weekday in {year}-{month}"));

    match ordinal {
        crate::ast::WeekdayOrdinal::Nth(n) => {
            let mut seen = 0;
            for day in 1..=days {
                let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(err)?;
                if date.weekday() == weekday {
                    seen += 1;
                    if seen == n {
                        return Ok(date);
                    }
                }
            }
            Err(err())
        }
        crate::ast::WeekdayOrdinal::LastOf => {
            for day in (1..=days).rev() {
                let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(err)?;
                if date.weekday() == weekday {
                    return Ok(date);
                }
            }
            Err(err())
        }
    }
}

/// Slash/dash-delimited numeric triple to a date.
///
/// A first component above 1000 is an ISO year-month-day. Otherwise a last
/// component above 1000 is a 4-digit year with day/month order decided by
/// the configured format; a small last component is a 2-digit year with a
/// pivot at 50.
fn delimited_date(a: i64, b: i64, c: i64, format: DateFormat) -> Result<NaiveDate> {
    let err = || TempexError::InvalidDate(format!("{a}/{b}/{c}"));

    let (year, month, day) = if a > 1000 {
        (a, b, c)
    } else {
        let year = if c > 1000 {
            c
        } else if (0..=50).contains(&c) {
            2000 + c
        } else if (51..100).contains(&c) {
            1900 + c
        } else {
            return Err(err());
        };
        let (day, month) = match format {
            DateFormat::Intl => (a, b),
            // An unambiguous day>12 / month<=12 pair wins over the flag.
            DateFormat::Us if a > 12 && b <= 12 => (a, b),
            DateFormat::Us => (b, a),
            DateFormat::Auto if a > 12 => (a, b),
            DateFormat::Auto => (b, a),
        };
        (year, month, day)
    };

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(err());
    }
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32).ok_or_else(err)
}

fn month_day_date(
    month: u32,
    day: Option<u32>,
    year: Option<i32>,
    rel: Option<RelWord>,
    ref_date: NaiveDate,
) -> Result<NaiveDate> {
    let err = || TempexError::InvalidDate(format!("month {month} day {day:?}"));
    if !(1..=12).contains(&month) {
        return Err(err());
    }

    let year = match (year, rel) {
        (Some(y), _) => y,
        // A relative-month modifier governs the year directly.
        (None, Some(r)) if r.is_backward() => {
            if month < ref_date.month() {
                ref_date.year()
            } else {
                ref_date.year() - 1
            }
        }
        (None, Some(RelWord::This)) => ref_date.year(),
        (None, Some(_)) => {
            if month > ref_date.month() {
                ref_date.year()
            } else {
                ref_date.year() + 1
            }
        }
        (None, None) => match day {
            // With an explicit day: only a month strictly before the
            // reference month has "already passed" and rolls forward.
            Some(_) => {
                if month < ref_date.month() {
                    ref_date.year() + 1
                } else {
                    ref_date.year()
                }
            }
            // Bare month: prefer the closer occurrence, ties to the past.
            None => {
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
        },
    };

    NaiveDate::from_ymd_opt(year, month, day.unwrap_or(1)).ok_or_else(err)
}

/// Bare day-of-month: current month if the day has not passed, else next
/// month, advancing further past months too short to contain the day.
fn day_of_month_date(day: u32, ref_date: NaiveDate) -> Result<NaiveDate> {
    if !(1..=31).contains(&day) {
        return Err(TempexError::InvalidDate(format!("day {day}")));
    }
    let mut month0 = ref_date.month0() as i64;
    if day < ref_date.day() {
        month0 += 1;
    }
    for _ in 0..24 {
        let (y, m) = calendar::normalize_month(ref_date.year(), month0);
        if let Some(date) = NaiveDate::from_ymd_opt(y, m, day) {
            return Ok(date);
        }
        month0 += 1;
    }
    Err(TempexError::InvalidDate(format!("day {day}")))
}

/// Whether a date node resolves through weekday arithmetic; range rollover
/// advances such endpoints by a week instead of a year.
pub fn is_weekday_based(node: &DateNode) -> bool {
    matches!(
        node.spec,
        DateSpec::WeekdayRel { .. }
            | DateSpec::WeekdayOfWeek { .. }
            | DateSpec::OrdinalWeekday { .. }
    )
}

/// True when the instant is not at midnight; scanner scoring rewards
/// explicit times.
pub fn has_clock_time(instant: DateTime<Utc>) -> bool {
    instant.hour() != 0 || instant.minute() != 0 || instant.second() != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DateNode, NamedTime, WeekdayOrdinal};

    // Wednesday, mid-month.
    fn opts() -> ParseOptions {
        ParseOptions::new(
            DateTime::parse_from_rfc3339("2025-01-15T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resolve(spec: DateSpec) -> Result<DateTime<Utc>> {
        resolve_date(&DateNode::new(spec), &opts())
    }

    #[test]
    fn test_special_days() {
        assert_eq!(
            resolve(DateSpec::Special(SpecialDay::Tomorrow)).unwrap(),
            midnight(date(2025, 1, 16))
        );
        assert_eq!(
            resolve(DateSpec::Special(SpecialDay::DayBeforeYesterday)).unwrap(),
            midnight(date(2025, 1, 13))
        );
        assert_eq!(
            resolve(DateSpec::Special(SpecialDay::Now)).unwrap(),
            opts().reference
        );
    }

    #[test]
    fn test_next_weekday_excludes_today() {
        let instant = resolve(DateSpec::WeekdayRel {
            weekday: Weekday::Wed,
            rel: Some(RelWord::Next),
        })
        .unwrap();
        assert_eq!(instant, midnight(date(2025, 1, 22)));
    }

    #[test]
    fn test_this_weekday_includes_today() {
        let instant = resolve(DateSpec::WeekdayRel {
            weekday: Weekday::Wed,
            rel: Some(RelWord::This),
        })
        .unwrap();
        assert_eq!(instant, midnight(date(2025, 1, 15)));
    }

    #[test]
    fn test_weekday_of_next_week() {
        // Friday of next week: week starts Monday Jan 20, so Friday Jan 24,
        // not the nearer Jan 17.
        let instant = resolve(DateSpec::WeekdayOfWeek {
            weekday: Weekday::Fri,
            rel: RelWord::Next,
        })
        .unwrap();
        assert_eq!(instant, midnight(date(2025, 1, 24)));
    }

    #[test]
    fn test_ordinal_weekday() {
        let instant = resolve(DateSpec::OrdinalWeekday {
            ordinal: WeekdayOrdinal::Nth(3),
            weekday: Weekday::Thu,
            month: MonthRef::Named {
                month: 11,
                year: None,
            },
        })
        .unwrap();
        assert_eq!(instant, midnight(date(2025, 11, 20)));

        let instant = resolve(DateSpec::OrdinalWeekday {
            ordinal: WeekdayOrdinal::LastOf,
            weekday: Weekday::Fri,
            month: MonthRef::Named {
                month: 1,
                year: None,
            },
        })
        .unwrap();
        assert_eq!(instant, midnight(date(2025, 1, 31)));
    }

    #[test]
    fn test_delimited_formats() {
        // ISO first.
        assert_eq!(
            delimited_date(2025, 1, 5, DateFormat::Intl).unwrap(),
            date(2025, 1, 5)
        );
        // Intl: day/month/year.
        assert_eq!(
            delimited_date(5, 1, 2025, DateFormat::Intl).unwrap(),
            date(2025, 1, 5)
        );
        // Us: month/day/year.
        assert_eq!(
            delimited_date(1, 5, 2025, DateFormat::Us).unwrap(),
            date(2025, 1, 5)
        );
        // Unambiguous day>12 overrides the us flag.
        assert_eq!(
            delimited_date(25, 12, 2025, DateFormat::Us).unwrap(),
            date(2025, 12, 25)
        );
        // Two-digit year pivot.
        assert_eq!(
            delimited_date(5, 1, 30, DateFormat::Intl).unwrap(),
            date(2030, 1, 5)
        );
        assert_eq!(
            delimited_date(5, 1, 99, DateFormat::Intl).unwrap(),
            date(1999, 1, 5)
        );
    }

    #[test]
    fn test_month_day_year_rollover() {
        // Same month, earlier day: stays in the reference year.
        assert_eq!(
            month_day_date(1, Some(5), None, None, date(2025, 1, 15)).unwrap(),
            date(2025, 1, 5)
        );
        // Earlier month rolls to next year.
        assert_eq!(
            month_day_date(11, Some(1), None, None, date(2025, 12, 10)).unwrap(),
            date(2026, 11, 1)
        );
        // "last march" from January looks back.
        assert_eq!(
            month_day_date(3, None, None, Some(RelWord::Last), date(2025, 1, 15)).unwrap(),
            date(2024, 3, 1)
        );
    }

    #[test]
    fn test_bare_month_prefers_closer_occurrence() {
        // From mid-January, December is 1 back vs 11 forward.
        assert_eq!(
            month_day_date(12, None, None, None, date(2025, 1, 15)).unwrap(),
            date(2024, 12, 1)
        );
        // March is 2 forward vs 10 back.
        assert_eq!(
            month_day_date(3, None, None, None, date(2025, 1, 15)).unwrap(),
            date(2025, 3, 1)
        );
    }

    #[test]
    fn test_day_of_month_overflow_advances() {
        // Day 31 from mid-January: the 31st has not passed.
        assert_eq!(day_of_month_date(31, date(2025, 1, 15)).unwrap(), date(2025, 1, 31));
        // Day 5 already passed: next month.
        assert_eq!(day_of_month_date(5, date(2025, 1, 15)).unwrap(), date(2025, 2, 5));
        // Day 30 from Feb 1 skips February entirely.
        assert_eq!(day_of_month_date(30, date(2025, 2, 1)).unwrap(), date(2025, 3, 30));
    }

    #[test]
    fn test_invalid_time_fails_whole_parse() {
        let node = DateNode::with_time(
            DateSpec::TimeOnly,
            TimeSpec::Clock {
                hour: 25,
                minute: 0,
                second: 0,
                meridiem: None,
            },
        );
        assert!(resolve_date(&node, &opts()).is_err());

        let node = DateNode::with_time(
            DateSpec::TimeOnly,
            TimeSpec::Clock {
                hour: 9,
                minute: 75,
                second: 0,
                meridiem: None,
            },
        );
        assert!(resolve_date(&node, &opts()).is_err());
    }

    #[test]
    fn test_named_time_and_meridiem() {
        let node = DateNode::with_time(DateSpec::TimeOnly, TimeSpec::Named(NamedTime::Noon));
        let instant = resolve_date(&node, &opts()).unwrap();
        assert_eq!(instant.hour(), 12);

        let node = DateNode::with_time(
            DateSpec::Special(SpecialDay::Tomorrow),
            TimeSpec::Clock {
                hour: 12,
                minute: 0,
                second: 0,
                meridiem: Some(Meridiem::Am),
            },
        );
        // 12am is midnight.
        assert_eq!(resolve_date(&node, &opts()).unwrap().hour(), 0);
    }

    #[test]
    fn test_month_edge() {
        let instant = resolve(DateSpec::MonthEdge {
            last: true,
            month: MonthRef::Named {
                month: 2,
                year: None,
            },
        })
        .unwrap();
        assert_eq!(instant, midnight(date(2025, 2, 28)));

        let instant = resolve(DateSpec::MonthEdge {
            last: false,
            month: MonthRef::Next,
        })
        .unwrap();
        assert_eq!(instant, midnight(date(2025, 2, 1)));
    }
}
