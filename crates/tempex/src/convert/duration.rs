//! Duration conversion: unit+value parts to total milliseconds.
//!
//! Units use fixed multipliers; month and year are 30- and 365-day
//! approximations and mark the result approximate. The overloaded `m`
//! abbreviation resolves to minutes when the combined duration carries an
//! hour component, and to months otherwise.

use crate::ast::{DurUnit, DurationNode};
use crate::error::{Result, TempexError};

pub const MS_SECOND: i64 = 1_000;
pub const MS_MINUTE: i64 = 60 * MS_SECOND;
pub const MS_HOUR: i64 = 60 * MS_MINUTE;
pub const MS_DAY: i64 = 24 * MS_HOUR;
pub const MS_WEEK: i64 = 7 * MS_DAY;
pub const MS_FORTNIGHT: i64 = 14 * MS_DAY;
pub const MS_MONTH: i64 = 30 * MS_DAY;
pub const MS_YEAR: i64 = 365 * MS_DAY;

fn multiplier(unit: DurUnit) -> i64 {
    match unit {
        DurUnit::Second => MS_SECOND,
        DurUnit::Minute => MS_MINUTE,
        DurUnit::Hour => MS_HOUR,
        DurUnit::Day => MS_DAY,
        DurUnit::Week => MS_WEEK,
        DurUnit::Fortnight => MS_FORTNIGHT,
        DurUnit::Month | DurUnit::MonthOrMinute => MS_MONTH,
        DurUnit::Year => MS_YEAR,
    }
}

/// Resolve the ambiguous `m` unit against the rest of the duration.
pub fn disambiguate(unit: DurUnit, has_hour: bool) -> DurUnit {
    match unit {
        DurUnit::MonthOrMinute if has_hour => DurUnit::Minute,
        DurUnit::MonthOrMinute => DurUnit::Month,
        other => other,
    }
}

/// Total milliseconds plus whether any approximate unit contributed.
pub fn resolve_duration(node: &DurationNode) -> Result<(i64, bool)> {
    if node.parts.is_empty() {
        return Err(TempexError::InvalidDuration("empty duration".into()));
    }
    let has_hour = node.parts.iter().any(|p| p.unit == DurUnit::Hour);

    let mut total: f64 = 0.0;
    let mut approximate = false;
    for part in &node.parts {
        if part.value < 0.0 || !part.value.is_finite() {
            return Err(TempexError::InvalidDuration(format!("value {}", part.value)));
        }
        let unit = disambiguate(part.unit, has_hour);
        if matches!(unit, DurUnit::Month | DurUnit::Year) {
            approximate = true;
        }
        total += part.value * multiplier(unit) as f64;
    }
    Ok((total.round() as i64, approximate))
}
