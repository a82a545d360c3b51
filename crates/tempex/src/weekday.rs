//! Weekday occurrence lookup relative to an anchor date.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// The next occurrence of `weekday` strictly after `from` (today excluded).
pub fn next_occurrence(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (weekday.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64
        + 7)
        % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    from + Duration::days(ahead)
}

/// The most recent occurrence of `weekday` strictly before `from`.
pub fn prev_occurrence(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let back = (from.weekday().num_days_from_monday() as i64
        - weekday.num_days_from_monday() as i64
        + 7)
        % 7;
    let back = if back == 0 { 7 } else { back };
    from - Duration::days(back)
}

/// Forward-looking occurrence: today if it matches, else the next one.
/// This is "this friday" semantics, not the calendar-week occurrence.
pub fn this_occurrence(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    if from.weekday() == weekday {
        from
    } else {
        next_occurrence(from, weekday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-01-15 is a Wednesday.
    fn wed() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_next_is_strictly_after() {
        assert_eq!(
            next_occurrence(wed(), Weekday::Fri),
            NaiveDate::from_ymd_opt(2025, 1, 17).unwrap()
        );
        // Same weekday jumps a full week.
        assert_eq!(
            next_occurrence(wed(), Weekday::Wed),
            NaiveDate::from_ymd_opt(2025, 1, 22).unwrap()
        );
    }

    #[test]
    fn test_prev_is_strictly_before() {
        assert_eq!(
            prev_occurrence(wed(), Weekday::Mon),
            NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
        );
        assert_eq!(
            prev_occurrence(wed(), Weekday::Wed),
            NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()
        );
    }

    #[test]
    fn test_this_includes_today() {
        assert_eq!(this_occurrence(wed(), Weekday::Wed), wed());
        assert_eq!(
            this_occurrence(wed(), Weekday::Sat),
            NaiveDate::from_ymd_opt(2025, 1, 18).unwrap()
        );
    }
}
