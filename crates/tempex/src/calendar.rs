//! Calendar period math: month, quarter, half, season, week, and year
//! boundaries, fiscal-year aware where it matters.
//!
//! Period functions return `[start, next_start)` as a pair of dates; the
//! fuzzy converter derives inclusive instants from them. Everything works
//! on naive UTC dates — the crate has no timezone dimension.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::ast::Season;
use crate::options::{FiscalYearStart, WeekStartDay};

/// Normalize a possibly out-of-range 0-based month offset into `(year, month)`.
pub fn normalize_month(year: i32, month0: i64) -> (i32, u32) {
    let y = year as i64 + month0.div_euclid(12);
    let m = month0.rem_euclid(12) as u32 + 1;
    (y as i32, m)
}

/// First day of a month. `month` may be out of 1-12 range and is normalized.
pub fn month_start(year: i32, month: i64) -> Option<NaiveDate> {
    let (y, m) = normalize_month(year, month - 1);
    NaiveDate::from_ymd_opt(y, m, 1)
}

/// Last day of a month, via day-0-of-next-month arithmetic.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    month_start(year, month as i64 + 1)?.pred_opt()
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    Some(last_day_of_month(year, month)?.day())
}

/// How many days `weekday` is from the week-start day.
pub fn days_from_week_start(weekday: Weekday, ws: WeekStartDay) -> i64 {
    match ws {
        WeekStartDay::Monday => weekday.num_days_from_monday() as i64,
        WeekStartDay::Sunday => weekday.num_days_from_sunday() as i64,
    }
}

/// Start of the week containing `date`.
pub fn week_start_of(date: NaiveDate, ws: WeekStartDay) -> NaiveDate {
    date - Duration::days(days_from_week_start(date.weekday(), ws))
}

/// `[start, next_start)` of the week containing `date`.
pub fn week_span(date: NaiveDate, ws: WeekStartDay) -> (NaiveDate, NaiveDate) {
    let start = week_start_of(date, ws);
    (start, start + Duration::days(7))
}

/// `[start, next_start)` of an ISO week number in a year.
pub fn iso_week_span(year: i32, week: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
    Some((start, start + Duration::days(7)))
}

/// `[start, next_start)` of a calendar month.
pub fn month_span(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    Some((month_start(year, month as i64)?, month_start(year, month as i64 + 1)?))
}

/// `[start, next_start)` of a calendar year.
pub fn year_span(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
    ))
}

/// `[start, next_start)` of fiscal quarter `q` (1-4) of the fiscal year
/// labeled `year`. The label is the calendar year the fiscal year starts in.
pub fn quarter_span(
    year: i32,
    q: u32,
    fiscal: FiscalYearStart,
) -> Option<(NaiveDate, NaiveDate)> {
    if !(1..=4).contains(&q) {
        return None;
    }
    let first = fiscal.start_month() as i64 + (q as i64 - 1) * 3;
    Some((month_start(year, first)?, month_start(year, first + 3)?))
}

/// `[start, next_start)` of fiscal half `h` (1-2) of fiscal year `year`.
pub fn half_span(year: i32, h: u32, fiscal: FiscalYearStart) -> Option<(NaiveDate, NaiveDate)> {
    if !(1..=2).contains(&h) {
        return None;
    }
    let first = fiscal.start_month() as i64 + (h as i64 - 1) * 6;
    Some((month_start(year, first)?, month_start(year, first + 6)?))
}

/// The fiscal quarter containing `date`: `(label_year, quarter)`.
pub fn quarter_containing(date: NaiveDate, fiscal: FiscalYearStart) -> (i32, u32) {
    let start = fiscal.start_month();
    let m0 = (date.month() as i64 - start as i64).rem_euclid(12);
    let q = (m0 / 3) as u32 + 1;
    let label = if date.month() >= start {
        date.year()
    } else {
        date.year() - 1
    };
    (label, q)
}

/// The fiscal half containing `date`: `(label_year, half)`.
pub fn half_containing(date: NaiveDate, fiscal: FiscalYearStart) -> (i32, u32) {
    let (label, q) = quarter_containing(date, fiscal);
    (label, (q - 1) / 2 + 1)
}

/// `[start, next_start)` of a meteorological season. Winter belongs to the
/// year it starts in (winter 2025 = Dec 2025 – Feb 2026).
pub fn season_span(year: i32, season: Season) -> Option<(NaiveDate, NaiveDate)> {
    let (start_month, months) = match season {
        Season::Spring => (3, 3),
        Season::Summer => (6, 3),
        Season::Fall => (9, 3),
        Season::Winter => (12, 3),
    };
    Some((
        month_start(year, start_month)?,
        month_start(year, start_month + months)?,
    ))
}

/// Add `n` months preserving day-of-month, rolling overflow days into the
/// following month (Jan 31 + 1 month = Mar 3, matching UTC month rollover).
pub fn add_months_rolling(date: NaiveDate, n: i64) -> Option<NaiveDate> {
    let month0 = (date.month0() as i64).checked_add(n)?;
    // Years outside i32 would wrap through normalize_month's cast.
    let y = i32::try_from(date.year() as i64 + month0.div_euclid(12)).ok()?;
    let start = NaiveDate::from_ymd_opt(y, month0.rem_euclid(12) as u32 + 1, 1)?;
    start.checked_add_signed(Duration::days(date.day() as i64 - 1))
}
