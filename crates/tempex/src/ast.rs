//! Typed abstract syntax tree for time expressions.
//!
//! Nodes are built by grammar semantic actions, consumed exactly once by a
//! converter, and discarded — no AST outlives a single `parse` call. Each
//! node kind is its own variant struct so converters can match exhaustively
//! instead of probing a loose field map.

use chrono::Weekday;

/// A parsed expression, before calendar resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Date(DateNode),
    Duration(DurationNode),
    /// A date anchored to a duration ("jan 5 for 2 weeks").
    Span(SpanNode),
    /// Two endpoints ("jan 5 to jan 20").
    Range(RangeNode),
    /// A named approximate period ("q1", "early march").
    Fuzzy(FuzzyNode),
    /// A duration window anchored at the reference ("last 30 days").
    Relative(RelativeNode),
    /// A base date plus a signed offset ("2 days before friday").
    RelativeDate(RelativeDateNode),
    /// Any of the above wrapped with leading title text.
    Titled(TitledNode),
}

// ── Date ────────────────────────────────────────────────────────────────────

/// Relative modifier attached to a weekday, month, or period word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelWord {
    Next,
    Last,
    This,
    Coming,
    Previous,
}

impl RelWord {
    /// Whether this modifier points backward in time.
    pub fn is_backward(self) -> bool {
        matches!(self, RelWord::Last | RelWord::Previous)
    }
}

/// Named single-day references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialDay {
    Today,
    Tomorrow,
    Yesterday,
    Now,
    DayAfterTomorrow,
    DayBeforeYesterday,
}

/// How a month was referenced in an ordinal-weekday or month-edge form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthRef {
    /// The month containing the reference instant.
    Current,
    /// The month after the reference month.
    Next,
    /// An explicit month, optionally with an explicit year.
    Named { month: u32, year: Option<i32> },
}

/// A clock-time specification attached to a date form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpec {
    /// Named time of day mapped to a fixed hour (noon, midnight, eod, ...).
    Named(NamedTime),
    /// Explicit hour/minute/second, with optional am/pm marker.
    Clock {
        hour: u32,
        minute: u32,
        second: u32,
        meridiem: Option<Meridiem>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedTime {
    Noon,
    Midnight,
    Morning,
    Afternoon,
    Evening,
    Night,
    EndOfDay,
}

impl NamedTime {
    /// Fixed hour for the named time.
    pub fn hour(self) -> u32 {
        match self {
            NamedTime::Midnight => 0,
            NamedTime::Morning => 9,
            NamedTime::Noon => 12,
            NamedTime::Afternoon => 13,
            NamedTime::EndOfDay => 17,
            NamedTime::Evening => 18,
            NamedTime::Night => 21,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

/// Ordinal position of a weekday within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekdayOrdinal {
    /// 1-based, counted forward from the 1st.
    Nth(u32),
    /// Counted backward from month end.
    LastOf,
}

/// The date forms of §date conversion, one variant per branch.
#[derive(Debug, Clone, PartialEq)]
pub enum DateSpec {
    /// today / tomorrow / yesterday / now / day after tomorrow / ...
    Special(SpecialDay),
    /// A bare clock time anchored to the reference date ("3pm").
    TimeOnly,
    /// "third thursday of november".
    OrdinalWeekday {
        ordinal: WeekdayOrdinal,
        weekday: Weekday,
        month: MonthRef,
    },
    /// "next friday", "friday".
    WeekdayRel {
        weekday: Weekday,
        rel: Option<RelWord>,
    },
    /// "friday of next week" — the modifier shifts the week, not the day.
    WeekdayOfWeek { weekday: Weekday, rel: RelWord },
    /// Slash/dash separated numeric triple.
    Delimited { a: i64, b: i64, c: i64 },
    /// Month name with optional day, year, and relative-month modifier.
    MonthDay {
        month: u32,
        day: Option<u32>,
        year: Option<i32>,
        rel: Option<RelWord>,
    },
    /// Bare day of month ("the 15th").
    DayOfMonth { day: u32 },
    /// "last day of march", "first day of next month".
    MonthEdge { last: bool, month: MonthRef },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateNode {
    pub spec: DateSpec,
    /// Nested time, applied last and overwriting hour/minute.
    pub time: Option<TimeSpec>,
}

impl DateNode {
    pub fn new(spec: DateSpec) -> Self {
        DateNode { spec, time: None }
    }

    pub fn with_time(spec: DateSpec, time: TimeSpec) -> Self {
        DateNode {
            spec,
            time: Some(time),
        }
    }
}

// ── Duration ────────────────────────────────────────────────────────────────

/// A duration unit. `MonthOrMinute` is the lexically overloaded `m`
/// abbreviation; the converter resolves it from context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Fortnight,
    Month,
    Year,
    MonthOrMinute,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurPart {
    pub value: f64,
    pub unit: DurUnit,
}

/// One unit+value pair, or a combined list summed by the converter.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationNode {
    pub parts: Vec<DurPart>,
}

// ── Span / Range ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SpanNode {
    pub start: DateNode,
    pub duration: DurationNode,
}

/// A range endpoint is itself a date or fuzzy sub-expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    Date(DateNode),
    Fuzzy(FuzzyNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeNode {
    pub start: Endpoint,
    pub end: Endpoint,
}

// ── Fuzzy ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

/// The base calendar period a fuzzy expression names.
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodSpec {
    /// Fiscal quarter 1-4.
    Quarter(u32),
    /// Fiscal half 1-2.
    Half(u32),
    Season(Season),
    /// An explicit calendar month (fuzzy form, e.g. "early march").
    Month(u32),
    /// The day/week/month/quarter/half/year containing (or adjacent to)
    /// the reference, named by a unit word.
    UnitPeriod(PeriodUnit),
    /// ISO-style week number ("week 32").
    WeekNumber(u32),
    /// The week containing an explicit date ("week of jan 5").
    WeekOf(Box<DateNode>),
    /// "week 2 of may".
    WeekOfMonth { week: u32, month: u32 },
    /// An explicit 4-digit year.
    Year(i32),
    Weekend,
    /// Tonight / "night" — the evening of the reference day.
    Night,
    /// Two weeks anchored at a week start.
    Fortnight,
    /// Jan 1 of the reference year through the reference instant.
    YearToDate,
}

/// Period units nameable with this/next/last ("next week").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Quarter,
    Half,
    Year,
}

/// Subdivision modifier ("early march", "second half of 2025").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzyModifier {
    /// First third.
    Early,
    /// Middle third.
    Mid,
    /// Final third.
    Late,
    /// First half.
    FirstHalf,
    /// Second half.
    SecondHalf,
    /// Collapse to the period start (changes the result kind to a date).
    StartOf,
    /// Collapse to the period end, normalized to that day's midnight.
    EndOf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyNode {
    pub period: PeriodSpec,
    pub rel: Option<RelWord>,
    pub year: Option<i32>,
    pub modifier: Option<FuzzyModifier>,
}

impl FuzzyNode {
    pub fn new(period: PeriodSpec) -> Self {
        FuzzyNode {
            period,
            rel: None,
            year: None,
            modifier: None,
        }
    }
}

// ── Relative / RelativeDate ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Past,
    Future,
}

/// "last 30 days" / "next 2 weeks": a window anchored at the reference.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeNode {
    pub direction: Direction,
    pub duration: DurationNode,
}

/// What a relative-date offset is applied to.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseRef {
    /// The reference instant itself ("in 5 days", "3 days ago").
    Reference,
    Date(Box<DateNode>),
    Fuzzy(Box<FuzzyNode>),
}

/// The offset kinds of relative-date arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum OffsetSpec {
    /// Plain duration offset (calendar-aware for months/years).
    Duration(DurationNode),
    /// Weekday count skipping Saturday/Sunday.
    BusinessDays(i64),
    /// "3rd friday from now": count matches of a target weekday.
    NthWeekday { n: u32, weekday: Weekday },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelativeDateNode {
    pub base: BaseRef,
    pub offset: OffsetSpec,
    pub direction: Direction,
    /// For a fuzzy base: anchor at the period end ("after next week")
    /// instead of its start ("before"/"from").
    pub anchor_end: bool,
    /// Trailing time, applied after the offset.
    pub time: Option<TimeSpec>,
}

// ── Titled ──────────────────────────────────────────────────────────────────

/// A wrapped expression with leading title text.
///
/// Offsets index the normalized input; the resolver maps them back to the
/// original string for original-case extraction. `literal` is the grammar's
/// own lower-cased capture, used only when mapping fails.
#[derive(Debug, Clone, PartialEq)]
pub struct TitledNode {
    pub inner: Box<Node>,
    pub start: usize,
    pub end: usize,
    pub literal: String,
}
