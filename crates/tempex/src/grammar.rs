//! The time-expression grammar: an ordered rule table with semantic actions.
//!
//! Rule order is load-bearing. Extraction takes the first derivation in
//! declaration order, so alternatives are listed by priority: ranges before
//! relative dates, relative windows before spans, durations before dates,
//! dates before fuzzy periods. A bare month name ("march") therefore
//! resolves as a date while "early march" falls through to the fuzzy rules,
//! and "next week" reaches the fuzzy period rules because no date rule
//! claims it.
//!
//! Actions return `None` to reject a derivation on lexical-value grounds
//! (e.g. a week number out of range); extraction then tries the next rule.

use once_cell::sync::Lazy;

use crate::ast::{
    BaseRef, DateNode, DateSpec, DurPart, DurUnit, DurationNode, Direction, Endpoint,
    FuzzyModifier, FuzzyNode, Meridiem, MonthRef, NamedTime, Node, PeriodSpec, PeriodUnit,
    RangeNode, RelWord, RelativeDateNode, RelativeNode, Season, SpanNode, SpecialDay, TimeSpec,
    TitledNode, WeekdayOrdinal,
};
use crate::parser::{Grammar, Rule, Sym, Term, Val};
use crate::token::{
    month_number, ordinal_num_value, ordinal_word_value, split_month_day, weekday_from,
    word_number_value, Token, TokenKind as K,
};

// ── Symbol shorthands ───────────────────────────────────────────────────────

fn n(name: &'static str) -> Sym {
    Sym::N(name)
}

fn k(kind: K) -> Sym {
    Sym::T(Term::Kind(kind))
}

fn kw(kind: K, text: &'static str) -> Sym {
    Sym::T(Term::KindText(kind, text))
}

fn rule(
    lhs: &'static str,
    rhs: Vec<Sym>,
    action: impl Fn(Vec<Val>) -> Option<Val> + Send + Sync + 'static,
) -> Rule {
    Rule {
        lhs,
        rhs,
        action: Box::new(action),
    }
}

fn pass(mut v: Vec<Val>) -> Option<Val> {
    v.pop()
}

// ── Lexical value mapping ───────────────────────────────────────────────────

fn num_value(tok: &Token) -> Option<i64> {
    match tok.kind {
        K::Integer => tok.text.parse().ok(),
        K::WordNumber => word_number_value(&tok.text),
        _ => None,
    }
}

fn dur_unit_of(text: &str) -> Option<DurUnit> {
    match text {
        "seconds" | "second" | "secs" | "sec" => Some(DurUnit::Second),
        "minutes" | "minute" | "mins" | "min" => Some(DurUnit::Minute),
        "hours" | "hour" | "hrs" | "hr" => Some(DurUnit::Hour),
        "days" | "day" => Some(DurUnit::Day),
        "weeks" | "week" | "wks" | "wk" => Some(DurUnit::Week),
        "fortnights" | "fortnight" => Some(DurUnit::Fortnight),
        "months" | "month" | "mo" => Some(DurUnit::Month),
        "years" | "year" | "yrs" | "yr" => Some(DurUnit::Year),
        _ => None,
    }
}

fn period_unit_of(text: &str) -> Option<PeriodUnit> {
    match text {
        "day" | "days" => Some(PeriodUnit::Day),
        "week" | "weeks" => Some(PeriodUnit::Week),
        "month" | "months" => Some(PeriodUnit::Month),
        "quarter" | "quarters" => Some(PeriodUnit::Quarter),
        "half" => Some(PeriodUnit::Half),
        "year" | "years" => Some(PeriodUnit::Year),
        _ => None,
    }
}

/// Abbreviated duration token ("2w", "1.5h", "45min", "6mo", "30m") to a
/// duration part. A bare `m` stays ambiguous for the converter to resolve.
fn short_duration_part(text: &str) -> Option<DurPart> {
    let split = text.find(|c: char| c.is_ascii_alphabetic())?;
    let value: f64 = text[..split].parse().ok()?;
    let unit = match &text[split..] {
        "s" => DurUnit::Second,
        "min" => DurUnit::Minute,
        "m" => DurUnit::MonthOrMinute,
        "h" => DurUnit::Hour,
        "d" => DurUnit::Day,
        "w" => DurUnit::Week,
        "mo" => DurUnit::Month,
        "y" => DurUnit::Year,
        _ => return None,
    };
    Some(DurPart { value, unit })
}

fn clock_parts(text: &str) -> Option<(u32, u32, u32)> {
    let mut it = text.split(':');
    let hour = it.next()?.parse().ok()?;
    let minute = it.next()?.parse().ok()?;
    let second = match it.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    Some((hour, minute, second))
}

fn season_of(text: &str) -> Option<Season> {
    match text {
        "spring" => Some(Season::Spring),
        "summer" => Some(Season::Summer),
        "fall" | "autumn" => Some(Season::Fall),
        "winter" => Some(Season::Winter),
        _ => None,
    }
}

fn rel_word_of(kind: K) -> Option<RelWord> {
    match kind {
        K::Next => Some(RelWord::Next),
        K::Last => Some(RelWord::Last),
        K::This => Some(RelWord::This),
        K::Coming => Some(RelWord::Coming),
        K::Previous => Some(RelWord::Previous),
        _ => None,
    }
}

fn base_of(ep: Endpoint) -> BaseRef {
    match ep {
        Endpoint::Date(d) => BaseRef::Date(Box::new(d)),
        Endpoint::Fuzzy(f) => BaseRef::Fuzzy(Box::new(f)),
    }
}

fn single_dur(value: f64, unit: DurUnit) -> DurationNode {
    DurationNode {
        parts: vec![DurPart { value, unit }],
    }
}

fn date_val(spec: DateSpec) -> Option<Val> {
    Some(Val::Date(DateNode::new(spec)))
}

fn fuzzy_val(period: PeriodSpec) -> Option<Val> {
    Some(Val::Fuzzy(FuzzyNode::new(period)))
}

fn rd_val(
    base: BaseRef,
    offset: crate::ast::OffsetSpec,
    direction: Direction,
    anchor_end: bool,
) -> Option<Val> {
    Some(Val::Node(Node::RelativeDate(RelativeDateNode {
        base,
        offset,
        direction,
        anchor_end,
        time: None,
    })))
}

fn modified_fuzzy(mut v: Vec<Val>, modifier: FuzzyModifier) -> Option<Val> {
    let mut f = v.pop()?.fuzzy()?;
    f.modifier = Some(modifier);
    Some(Val::Fuzzy(f))
}

/// Title separator followed by an expression, or a parenthesized expression.
fn titled_at(mut v: Vec<Val>, expr_idx: usize) -> Option<Val> {
    let inner = v.remove(expr_idx).node()?;
    let (start, end, literal) = match v.remove(0) {
        Val::Title {
            start,
            end,
            literal,
        } => (start, end, literal),
        _ => return None,
    };
    Some(Val::Node(Node::Titled(TitledNode {
        inner: Box::new(inner),
        start,
        end,
        literal,
    })))
}

pub static GRAMMAR: Lazy<Grammar> = Lazy::new(build);

fn build() -> Grammar {
    let mut r: Vec<Rule> = Vec::new();

    // ── Top level ───────────────────────────────────────────────────────────
    r.push(rule("top", vec![n("expr")], pass));
    r.push(rule("top", vec![n("titled")], pass));

    r.push(rule("titled", vec![n("phrase"), k(K::Dash), n("expr")], |v| {
        titled_at(v, 2)
    }));
    r.push(rule("titled", vec![n("phrase"), k(K::Colon), n("expr")], |v| {
        titled_at(v, 2)
    }));
    r.push(rule(
        "titled",
        vec![n("phrase"), k(K::OpenParen), n("expr"), k(K::CloseParen)],
        |v| titled_at(v, 2),
    ));
    r.push(rule(
        "titled",
        vec![n("phrase"), k(K::OpenBracket), n("expr"), k(K::CloseBracket)],
        |v| titled_at(v, 2),
    ));

    r.push(rule("phrase", vec![Sym::T(Term::Phraseish)], |mut v| {
        let t = v.pop()?.tok()?;
        Some(Val::Title {
            start: t.offset,
            end: t.offset + t.text.len(),
            literal: t.text,
        })
    }));
    r.push(rule(
        "phrase",
        vec![Sym::T(Term::Phraseish), n("phrase")],
        |mut v| {
            let rest = v.pop()?;
            let t = v.pop()?.tok()?;
            match rest {
                Val::Title { end, literal, .. } => Some(Val::Title {
                    start: t.offset,
                    end,
                    literal: format!("{} {}", t.text, literal),
                }),
                _ => None,
            }
        },
    ));

    // ── Expression alternatives, in priority order ──────────────────────────
    r.push(rule("expr", vec![n("range")], pass));
    r.push(rule("expr", vec![n("relative_date")], pass));
    r.push(rule("expr", vec![n("relative")], pass));
    r.push(rule("expr", vec![n("span")], pass));
    r.push(rule("expr", vec![n("duration")], |mut v| {
        Some(Val::Node(Node::Duration(v.pop()?.dur()?)))
    }));
    r.push(rule("expr", vec![n("date")], |mut v| {
        Some(Val::Node(Node::Date(v.pop()?.date()?)))
    }));
    r.push(rule("expr", vec![n("fuzzy")], |mut v| {
        Some(Val::Node(Node::Fuzzy(v.pop()?.fuzzy()?)))
    }));

    // ── Ranges ──────────────────────────────────────────────────────────────
    r.push(rule(
        "range",
        vec![n("endpoint"), n("range_sep"), n("endpoint")],
        |mut v| {
            let end = v.pop()?.endpoint()?;
            v.pop();
            let start = v.pop()?.endpoint()?;
            Some(Val::Node(Node::Range(RangeNode { start, end })))
        },
    ));
    r.push(rule(
        "range",
        vec![k(K::Between), n("endpoint"), k(K::And), n("endpoint")],
        |mut v| {
            let end = v.pop()?.endpoint()?;
            let start = v.remove(1).endpoint()?;
            Some(Val::Node(Node::Range(RangeNode { start, end })))
        },
    ));
    r.push(rule(
        "range",
        vec![k(K::From), n("endpoint"), n("range_sep"), n("endpoint")],
        |mut v| {
            let end = v.pop()?.endpoint()?;
            let start = v.remove(1).endpoint()?;
            Some(Val::Node(Node::Range(RangeNode { start, end })))
        },
    ));
    for sep in [K::To, K::Dash, K::Through, K::Until] {
        r.push(rule("range_sep", vec![k(sep)], pass));
    }

    r.push(rule("endpoint", vec![n("date")], |mut v| {
        Some(Val::End(Endpoint::Date(v.pop()?.date()?)))
    }));
    r.push(rule("endpoint", vec![n("fuzzy")], |mut v| {
        Some(Val::End(Endpoint::Fuzzy(v.pop()?.fuzzy()?)))
    }));

    // ── Relative dates (base ± offset) ──────────────────────────────────────
    r.push(rule("relative_date", vec![n("rd_core")], pass));
    r.push(rule(
        "relative_date",
        vec![n("rd_core"), n("time_spec")],
        |mut v| {
            let time = v.pop()?.time()?;
            match v.pop()?.node()? {
                Node::RelativeDate(mut rd) => {
                    rd.time = Some(time);
                    Some(Val::Node(Node::RelativeDate(rd)))
                }
                _ => None,
            }
        },
    ));

    r.push(rule(
        "rd_core",
        vec![n("duration"), k(K::Before), n("rd_base")],
        |mut v| {
            let base = base_of(v.pop()?.endpoint()?);
            v.pop();
            let dur = v.pop()?.dur()?;
            rd_val(base, crate::ast::OffsetSpec::Duration(dur), Direction::Past, false)
        },
    ));
    for conn in [K::After, K::From] {
        let anchor_end = conn == K::After;
        r.push(rule(
            "rd_core",
            vec![n("duration"), k(conn), n("rd_base")],
            move |mut v| {
                let base = base_of(v.pop()?.endpoint()?);
                v.pop();
                let dur = v.pop()?.dur()?;
                rd_val(
                    base,
                    crate::ast::OffsetSpec::Duration(dur),
                    Direction::Future,
                    anchor_end,
                )
            },
        ));
    }
    for lead in [K::In, K::Within] {
        r.push(rule("rd_core", vec![k(lead), n("duration")], |mut v| {
            let dur = v.pop()?.dur()?;
            rd_val(
                BaseRef::Reference,
                crate::ast::OffsetSpec::Duration(dur),
                Direction::Future,
                false,
            )
        }));
    }
    r.push(rule("rd_core", vec![n("duration"), k(K::Ago)], |mut v| {
        v.pop();
        let dur = v.pop()?.dur()?;
        rd_val(
            BaseRef::Reference,
            crate::ast::OffsetSpec::Duration(dur),
            Direction::Past,
            false,
        )
    }));

    // Business-day offsets.
    for conn in [K::From, K::After] {
        let anchor_end = conn == K::After;
        r.push(rule(
            "rd_core",
            vec![n("num"), k(K::Business), n("unit_day"), k(conn), n("rd_base")],
            move |mut v| {
                let base = base_of(v.pop()?.endpoint()?);
                let count = v.remove(0).int()?;
                rd_val(
                    base,
                    crate::ast::OffsetSpec::BusinessDays(count),
                    Direction::Future,
                    anchor_end,
                )
            },
        ));
    }
    r.push(rule(
        "rd_core",
        vec![n("num"), k(K::Business), n("unit_day"), k(K::Before), n("rd_base")],
        |mut v| {
            let base = base_of(v.pop()?.endpoint()?);
            let count = v.remove(0).int()?;
            rd_val(
                base,
                crate::ast::OffsetSpec::BusinessDays(count),
                Direction::Past,
                false,
            )
        },
    ));
    r.push(rule(
        "rd_core",
        vec![k(K::In), n("num"), k(K::Business), n("unit_day")],
        |mut v| {
            let count = v.remove(1).int()?;
            rd_val(
                BaseRef::Reference,
                crate::ast::OffsetSpec::BusinessDays(count),
                Direction::Future,
                false,
            )
        },
    ));
    r.push(rule(
        "rd_core",
        vec![n("num"), k(K::Business), n("unit_day"), k(K::Ago)],
        |mut v| {
            let count = v.remove(0).int()?;
            rd_val(
                BaseRef::Reference,
                crate::ast::OffsetSpec::BusinessDays(count),
                Direction::Past,
                false,
            )
        },
    ));

    // "3rd friday from now".
    r.push(rule(
        "rd_core",
        vec![n("wk_ord"), k(K::Weekday), k(K::From), n("rd_base")],
        |mut v| {
            let base = base_of(v.pop()?.endpoint()?);
            v.pop();
            let weekday = weekday_from(&v.pop()?.tok()?.text)?;
            let nth = v.pop()?.int()?;
            if !(1..=31).contains(&nth) {
                return None;
            }
            rd_val(
                base,
                crate::ast::OffsetSpec::NthWeekday {
                    n: nth as u32,
                    weekday,
                },
                Direction::Future,
                false,
            )
        },
    ));

    for text in ["day", "days"] {
        r.push(rule("unit_day", vec![kw(K::Unit, text)], pass));
    }
    r.push(rule("rd_base", vec![n("endpoint")], pass));

    // ── Relative windows ("last 30 days") ───────────────────────────────────
    for (kinds, direction) in [
        (&[K::Last, K::Past, K::Previous][..], Direction::Past),
        (&[K::Next, K::Coming][..], Direction::Future),
    ] {
        for kind in kinds {
            r.push(rule(
                "relative",
                vec![k(*kind), n("num"), n("dur_unit")],
                move |mut v| {
                    let unit = v.pop()?.dur_unit()?;
                    let count = v.pop()?.int()?;
                    if count <= 0 {
                        return None;
                    }
                    Some(Val::Node(Node::Relative(RelativeNode {
                        direction,
                        duration: single_dur(count as f64, unit),
                    })))
                },
            ));
        }
    }

    // ── Spans ───────────────────────────────────────────────────────────────
    r.push(rule(
        "span",
        vec![n("date"), k(K::For), n("duration")],
        |mut v| {
            let duration = v.pop()?.dur()?;
            v.pop();
            let start = v.pop()?.date()?;
            Some(Val::Node(Node::Span(SpanNode { start, duration })))
        },
    ));
    r.push(rule(
        "span",
        vec![k(K::Starting), n("date"), k(K::For), n("duration")],
        |mut v| {
            let duration = v.pop()?.dur()?;
            let start = v.remove(1).date()?;
            Some(Val::Node(Node::Span(SpanNode { start, duration })))
        },
    ));

    // ── Durations ───────────────────────────────────────────────────────────
    r.push(rule("duration", vec![n("dur_list")], pass));
    r.push(rule("dur_list", vec![n("dur_part")], pass));
    r.push(rule("dur_list", vec![n("dur_part"), n("dur_list")], |mut v| {
        let rest = v.pop()?.dur()?;
        let mut first = v.pop()?.dur()?;
        first.parts.extend(rest.parts);
        Some(Val::Dur(first))
    }));
    r.push(rule(
        "dur_list",
        vec![n("dur_part"), k(K::And), n("dur_list")],
        |mut v| {
            let rest = v.pop()?.dur()?;
            v.pop();
            let mut first = v.pop()?.dur()?;
            first.parts.extend(rest.parts);
            Some(Val::Dur(first))
        },
    ));

    r.push(rule("dur_part", vec![n("num"), n("dur_unit")], |mut v| {
        let unit = v.pop()?.dur_unit()?;
        let value = v.pop()?.int()?;
        if value < 0 {
            return None;
        }
        Some(Val::Dur(single_dur(value as f64, unit)))
    }));
    r.push(rule(
        "dur_part",
        vec![k(K::Decimal), n("dur_unit")],
        |mut v| {
            let unit = v.pop()?.dur_unit()?;
            let value: f64 = v.pop()?.tok()?.text.parse().ok()?;
            Some(Val::Dur(single_dur(value, unit)))
        },
    ));
    r.push(rule("dur_part", vec![k(K::ShortDuration)], |mut v| {
        let part = short_duration_part(&v.pop()?.tok()?.text)?;
        Some(Val::Dur(DurationNode { parts: vec![part] }))
    }));
    for article in [K::A, K::An] {
        r.push(rule("dur_part", vec![k(article), n("dur_unit")], |mut v| {
            let unit = v.pop()?.dur_unit()?;
            Some(Val::Dur(single_dur(1.0, unit)))
        }));
    }
    r.push(rule(
        "dur_part",
        vec![kw(K::Unit, "half"), k(K::An), n("dur_unit")],
        |mut v| {
            let unit = v.pop()?.dur_unit()?;
            Some(Val::Dur(single_dur(0.5, unit)))
        },
    ));

    r.push(rule("dur_unit", vec![k(K::Unit)], |mut v| {
        Some(Val::DurU(dur_unit_of(&v.pop()?.tok()?.text)?))
    }));

    // ── Dates ───────────────────────────────────────────────────────────────
    r.push(rule("date", vec![n("d_core")], pass));
    r.push(rule("date", vec![n("d_core"), n("time_spec")], |mut v| {
        let time = v.pop()?.time()?;
        let mut d = v.pop()?.date()?;
        d.time = Some(time);
        Some(Val::Date(d))
    }));
    r.push(rule("date", vec![n("time_spec")], |mut v| {
        let time = v.pop()?.time()?;
        Some(Val::Date(DateNode::with_time(DateSpec::TimeOnly, time)))
    }));
    // Deadline/schedule lead-ins pass the date through unchanged.
    for lead in [K::On, K::By] {
        r.push(rule("date", vec![k(lead), n("date")], pass));
    }

    // Special days.
    for (kind, day) in [
        (K::Today, SpecialDay::Today),
        (K::Tomorrow, SpecialDay::Tomorrow),
        (K::Yesterday, SpecialDay::Yesterday),
        (K::Now, SpecialDay::Now),
    ] {
        r.push(rule("d_core", vec![k(kind)], move |_| {
            date_val(DateSpec::Special(day))
        }));
    }
    r.push(rule(
        "d_core",
        vec![kw(K::Unit, "day"), k(K::After), k(K::Tomorrow)],
        |_| date_val(DateSpec::Special(SpecialDay::DayAfterTomorrow)),
    ));
    r.push(rule(
        "d_core",
        vec![kw(K::Unit, "day"), k(K::Before), k(K::Yesterday)],
        |_| date_val(DateSpec::Special(SpecialDay::DayBeforeYesterday)),
    ));
    for kind in [K::Eod, K::Cob] {
        r.push(rule("d_core", vec![k(kind)], |_| {
            Some(Val::Date(DateNode::with_time(
                DateSpec::TimeOnly,
                TimeSpec::Named(NamedTime::EndOfDay),
            )))
        }));
    }

    // Ordinal weekday of month.
    r.push(rule("d_core", vec![n("wk_ord"), k(K::Weekday)], |mut v| {
        let weekday = weekday_from(&v.pop()?.tok()?.text)?;
        let nth = v.pop()?.int()?;
        if !(1..=5).contains(&nth) {
            return None;
        }
        date_val(DateSpec::OrdinalWeekday {
            ordinal: WeekdayOrdinal::Nth(nth as u32),
            weekday,
            month: MonthRef::Current,
        })
    }));
    r.push(rule(
        "d_core",
        vec![n("wk_ord"), k(K::Weekday), k(K::Of), n("month_ref")],
        |mut v| {
            let month = v.pop()?.month_ref()?;
            v.pop();
            let weekday = weekday_from(&v.pop()?.tok()?.text)?;
            let nth = v.pop()?.int()?;
            if !(1..=5).contains(&nth) {
                return None;
            }
            date_val(DateSpec::OrdinalWeekday {
                ordinal: WeekdayOrdinal::Nth(nth as u32),
                weekday,
                month,
            })
        },
    ));
    r.push(rule(
        "d_core",
        vec![k(K::Last), k(K::Weekday), k(K::Of), n("month_ref")],
        |mut v| {
            let month = v.pop()?.month_ref()?;
            v.pop();
            let weekday = weekday_from(&v.pop()?.tok()?.text)?;
            date_val(DateSpec::OrdinalWeekday {
                ordinal: WeekdayOrdinal::LastOf,
                weekday,
                month,
            })
        },
    ));

    // Weekday forms.
    r.push(rule("d_core", vec![n("rel_w"), k(K::Weekday)], |mut v| {
        let weekday = weekday_from(&v.pop()?.tok()?.text)?;
        let rel = v.pop()?.rel()?;
        date_val(DateSpec::WeekdayRel {
            weekday,
            rel: Some(rel),
        })
    }));
    r.push(rule("d_core", vec![k(K::Weekday)], |mut v| {
        let weekday = weekday_from(&v.pop()?.tok()?.text)?;
        date_val(DateSpec::WeekdayRel { weekday, rel: None })
    }));
    r.push(rule(
        "d_core",
        vec![k(K::Weekday), k(K::Of), n("rel_w"), kw(K::Unit, "week")],
        |mut v| {
            v.pop();
            let rel = v.pop()?.rel()?;
            v.pop();
            let weekday = weekday_from(&v.pop()?.tok()?.text)?;
            date_val(DateSpec::WeekdayOfWeek { weekday, rel })
        },
    ));
    r.push(rule(
        "d_core",
        vec![k(K::Weekday), n("rel_w"), kw(K::Unit, "week")],
        |mut v| {
            v.pop();
            let rel = v.pop()?.rel()?;
            let weekday = weekday_from(&v.pop()?.tok()?.text)?;
            date_val(DateSpec::WeekdayOfWeek { weekday, rel })
        },
    ));

    // Delimited numeric triples.
    for sep in [K::Slash, K::Dash] {
        r.push(rule(
            "d_core",
            vec![n("int"), k(sep), n("int"), k(sep), n("int")],
            |mut v| {
                let c = v.pop()?.int()?;
                v.pop();
                let b = v.pop()?.int()?;
                v.pop();
                let a = v.pop()?.int()?;
                date_val(DateSpec::Delimited { a, b, c })
            },
        ));
    }

    // Month + day.
    r.push(rule("d_core", vec![k(K::MonthDay)], |mut v| {
        let (month, day) = split_month_day(&v.pop()?.tok()?.text)?;
        date_val(DateSpec::MonthDay {
            month,
            day: Some(day),
            year: None,
            rel: None,
        })
    }));
    r.push(rule("d_core", vec![k(K::MonthDay), n("year_num")], |mut v| {
        let year = v.pop()?.int()? as i32;
        let (month, day) = split_month_day(&v.pop()?.tok()?.text)?;
        date_val(DateSpec::MonthDay {
            month,
            day: Some(day),
            year: Some(year),
            rel: None,
        })
    }));

    // month-first and day-first orders, with optional year.
    let md = |month: u32, day: u32, year: Option<i32>| {
        date_val(DateSpec::MonthDay {
            month,
            day: Some(day),
            year,
            rel: None,
        })
    };
    r.push(rule("d_core", vec![k(K::Month), n("day_t")], move |mut v| {
        let day = v.pop()?.int()? as u32;
        let month = month_number(&v.pop()?.tok()?.text)?;
        md(month, day, None)
    }));
    r.push(rule("d_core", vec![k(K::Month), k(K::OrdinalNum)], move |mut v| {
        let day = ordinal_num_value(&v.pop()?.tok()?.text)?;
        let month = month_number(&v.pop()?.tok()?.text)?;
        md(month, day, None)
    }));
    r.push(rule(
        "d_core",
        vec![k(K::Month), n("day_t"), n("year_num")],
        move |mut v| {
            let year = v.pop()?.int()? as i32;
            let day = v.pop()?.int()? as u32;
            let month = month_number(&v.pop()?.tok()?.text)?;
            md(month, day, Some(year))
        },
    ));
    r.push(rule(
        "d_core",
        vec![k(K::Month), k(K::OrdinalNum), n("year_num")],
        move |mut v| {
            let year = v.pop()?.int()? as i32;
            let day = ordinal_num_value(&v.pop()?.tok()?.text)?;
            let month = month_number(&v.pop()?.tok()?.text)?;
            md(month, day, Some(year))
        },
    ));
    r.push(rule("d_core", vec![n("day_t"), k(K::Month)], move |mut v| {
        let month = month_number(&v.pop()?.tok()?.text)?;
        let day = v.pop()?.int()? as u32;
        md(month, day, None)
    }));
    r.push(rule("d_core", vec![k(K::OrdinalNum), k(K::Month)], move |mut v| {
        let month = month_number(&v.pop()?.tok()?.text)?;
        let day = ordinal_num_value(&v.pop()?.tok()?.text)?;
        md(month, day, None)
    }));
    r.push(rule(
        "d_core",
        vec![n("day_t"), k(K::Of), k(K::Month)],
        move |mut v| {
            let month = month_number(&v.pop()?.tok()?.text)?;
            v.pop();
            let day = v.pop()?.int()? as u32;
            md(month, day, None)
        },
    ));
    r.push(rule(
        "d_core",
        vec![k(K::OrdinalNum), k(K::Of), k(K::Month)],
        move |mut v| {
            let month = month_number(&v.pop()?.tok()?.text)?;
            v.pop();
            let day = ordinal_num_value(&v.pop()?.tok()?.text)?;
            md(month, day, None)
        },
    ));
    r.push(rule(
        "d_core",
        vec![n("day_t"), k(K::Month), n("year_num")],
        move |mut v| {
            let year = v.pop()?.int()? as i32;
            let month = month_number(&v.pop()?.tok()?.text)?;
            let day = v.pop()?.int()? as u32;
            md(month, day, Some(year))
        },
    ));
    r.push(rule(
        "d_core",
        vec![k(K::OrdinalNum), k(K::Month), n("year_num")],
        move |mut v| {
            let year = v.pop()?.int()? as i32;
            let month = month_number(&v.pop()?.tok()?.text)?;
            let day = ordinal_num_value(&v.pop()?.tok()?.text)?;
            md(month, day, Some(year))
        },
    ));

    // Relative-month modifier governs the year directly.
    r.push(rule("d_core", vec![n("rel_w"), k(K::Month)], |mut v| {
        let month = month_number(&v.pop()?.tok()?.text)?;
        let rel = v.pop()?.rel()?;
        date_val(DateSpec::MonthDay {
            month,
            day: None,
            year: None,
            rel: Some(rel),
        })
    }));
    r.push(rule(
        "d_core",
        vec![n("rel_w"), k(K::Month), n("day_t")],
        |mut v| {
            let day = v.pop()?.int()? as u32;
            let month = month_number(&v.pop()?.tok()?.text)?;
            let rel = v.pop()?.rel()?;
            date_val(DateSpec::MonthDay {
                month,
                day: Some(day),
                year: None,
                rel: Some(rel),
            })
        },
    ));
    r.push(rule("d_core", vec![k(K::Month), n("year_num")], |mut v| {
        let year = v.pop()?.int()? as i32;
        let month = month_number(&v.pop()?.tok()?.text)?;
        date_val(DateSpec::MonthDay {
            month,
            day: None,
            year: Some(year),
            rel: None,
        })
    }));
    r.push(rule("d_core", vec![k(K::Month)], |mut v| {
        let month = month_number(&v.pop()?.tok()?.text)?;
        date_val(DateSpec::MonthDay {
            month,
            day: None,
            year: None,
            rel: None,
        })
    }));

    // Bare day of month ("the 15th" with the article dropped pre-parse).
    r.push(rule("d_core", vec![k(K::OrdinalNum)], |mut v| {
        let day = ordinal_num_value(&v.pop()?.tok()?.text)?;
        if !(1..=31).contains(&day) {
            return None;
        }
        date_val(DateSpec::DayOfMonth { day })
    }));

    // Month edges.
    r.push(rule(
        "d_core",
        vec![k(K::Last), kw(K::Unit, "day"), k(K::Of), n("month_ref")],
        |mut v| {
            let month = v.pop()?.month_ref()?;
            date_val(DateSpec::MonthEdge { last: true, month })
        },
    ));
    r.push(rule(
        "d_core",
        vec![
            kw(K::OrdinalWord, "first"),
            kw(K::Unit, "day"),
            k(K::Of),
            n("month_ref"),
        ],
        |mut v| {
            let month = v.pop()?.month_ref()?;
            date_val(DateSpec::MonthEdge { last: false, month })
        },
    ));

    r.push(rule("month_ref", vec![k(K::Month)], |mut v| {
        let month = month_number(&v.pop()?.tok()?.text)?;
        Some(Val::MRef(MonthRef::Named { month, year: None }))
    }));
    r.push(rule("month_ref", vec![k(K::Month), n("year_num")], |mut v| {
        let year = v.pop()?.int()? as i32;
        let month = month_number(&v.pop()?.tok()?.text)?;
        Some(Val::MRef(MonthRef::Named {
            month,
            year: Some(year),
        }))
    }));
    r.push(rule("month_ref", vec![k(K::Next), kw(K::Unit, "month")], |_| {
        Some(Val::MRef(MonthRef::Next))
    }));
    r.push(rule("month_ref", vec![k(K::This), kw(K::Unit, "month")], |_| {
        Some(Val::MRef(MonthRef::Current))
    }));
    r.push(rule("month_ref", vec![kw(K::Unit, "month")], |_| {
        Some(Val::MRef(MonthRef::Current))
    }));

    // ── Times ───────────────────────────────────────────────────────────────
    r.push(rule("time_spec", vec![k(K::At), n("time")], pass));
    r.push(rule("time_spec", vec![n("time")], pass));

    r.push(rule("time", vec![k(K::ClockTime)], |mut v| {
        let (hour, minute, second) = clock_parts(&v.pop()?.tok()?.text)?;
        Some(Val::Time(TimeSpec::Clock {
            hour,
            minute,
            second,
            meridiem: None,
        }))
    }));
    r.push(rule("time", vec![k(K::ClockTime), k(K::Meridiem)], |mut v| {
        let meridiem = meridiem_of(&v.pop()?.tok()?.text);
        let (hour, minute, second) = clock_parts(&v.pop()?.tok()?.text)?;
        Some(Val::Time(TimeSpec::Clock {
            hour,
            minute,
            second,
            meridiem,
        }))
    }));
    r.push(rule("time", vec![n("int"), k(K::Meridiem)], |mut v| {
        let meridiem = meridiem_of(&v.pop()?.tok()?.text);
        let hour = v.pop()?.int()?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        Some(Val::Time(TimeSpec::Clock {
            hour: hour as u32,
            minute: 0,
            second: 0,
            meridiem,
        }))
    }));
    for (kind, named) in [
        (K::Noon, NamedTime::Noon),
        (K::Midday, NamedTime::Noon),
        (K::Midnight, NamedTime::Midnight),
        (K::Morning, NamedTime::Morning),
        (K::Afternoon, NamedTime::Afternoon),
        (K::Evening, NamedTime::Evening),
        (K::Night, NamedTime::Night),
        (K::Eod, NamedTime::EndOfDay),
        (K::Cob, NamedTime::EndOfDay),
    ] {
        r.push(rule("time", vec![k(kind)], move |_| {
            Some(Val::Time(TimeSpec::Named(named)))
        }));
    }

    // ── Fuzzy periods ───────────────────────────────────────────────────────
    r.push(rule("fuzzy", vec![n("fz")], pass));

    r.push(rule("fz", vec![n("fz_base")], pass));
    r.push(rule("fz", vec![k(K::Early), n("fz_base")], |v| {
        modified_fuzzy(v, FuzzyModifier::Early)
    }));
    r.push(rule("fz", vec![k(K::Mid), n("fz_base")], |v| {
        modified_fuzzy(v, FuzzyModifier::Mid)
    }));
    r.push(rule("fz", vec![k(K::Middle), k(K::Of), n("fz_base")], |v| {
        modified_fuzzy(v, FuzzyModifier::Mid)
    }));
    r.push(rule("fz", vec![k(K::Late), n("fz_base")], |v| {
        modified_fuzzy(v, FuzzyModifier::Late)
    }));
    r.push(rule("fz", vec![k(K::Beginning), k(K::Of), n("fz_base")], |v| {
        modified_fuzzy(v, FuzzyModifier::StartOf)
    }));
    r.push(rule("fz", vec![k(K::Start), k(K::Of), n("fz_base")], |v| {
        modified_fuzzy(v, FuzzyModifier::StartOf)
    }));
    r.push(rule("fz", vec![k(K::End), k(K::Of), n("fz_base")], |v| {
        modified_fuzzy(v, FuzzyModifier::EndOf)
    }));
    r.push(rule(
        "fz",
        vec![kw(K::OrdinalWord, "first"), kw(K::Unit, "half"), k(K::Of), n("fz_base")],
        |v| modified_fuzzy(v, FuzzyModifier::FirstHalf),
    ));
    r.push(rule(
        "fz",
        vec![kw(K::Unit, "second"), kw(K::Unit, "half"), k(K::Of), n("fz_base")],
        |v| modified_fuzzy(v, FuzzyModifier::SecondHalf),
    ));

    // Quarter / half tokens ("q1", "h2"), optionally with a year.
    r.push(rule("fz_base", vec![k(K::Quarter)], |mut v| {
        fuzzy_val(PeriodSpec::Quarter(label_digit(&v.pop()?.tok()?.text)?))
    }));
    r.push(rule("fz_base", vec![k(K::Quarter), n("year_num")], |mut v| {
        let year = v.pop()?.int()? as i32;
        let q = label_digit(&v.pop()?.tok()?.text)?;
        let mut f = FuzzyNode::new(PeriodSpec::Quarter(q));
        f.year = Some(year);
        Some(Val::Fuzzy(f))
    }));
    r.push(rule(
        "fz_base",
        vec![k(K::Quarter), k(K::Of), n("year_num")],
        |mut v| {
            let year = v.pop()?.int()? as i32;
            v.pop();
            let q = label_digit(&v.pop()?.tok()?.text)?;
            let mut f = FuzzyNode::new(PeriodSpec::Quarter(q));
            f.year = Some(year);
            Some(Val::Fuzzy(f))
        },
    ));
    r.push(rule("fz_base", vec![k(K::Half)], |mut v| {
        fuzzy_val(PeriodSpec::Half(label_digit(&v.pop()?.tok()?.text)?))
    }));
    r.push(rule("fz_base", vec![k(K::Half), n("year_num")], |mut v| {
        let year = v.pop()?.int()? as i32;
        let h = label_digit(&v.pop()?.tok()?.text)?;
        let mut f = FuzzyNode::new(PeriodSpec::Half(h));
        f.year = Some(year);
        Some(Val::Fuzzy(f))
    }));
    r.push(rule(
        "fz_base",
        vec![k(K::Half), k(K::Of), n("year_num")],
        |mut v| {
            let year = v.pop()?.int()? as i32;
            v.pop();
            let h = label_digit(&v.pop()?.tok()?.text)?;
            let mut f = FuzzyNode::new(PeriodSpec::Half(h));
            f.year = Some(year);
            Some(Val::Fuzzy(f))
        },
    ));

    // Seasons.
    r.push(rule("fz_base", vec![k(K::Season)], |mut v| {
        fuzzy_val(PeriodSpec::Season(season_of(&v.pop()?.tok()?.text)?))
    }));
    r.push(rule("fz_base", vec![k(K::Season), n("year_num")], |mut v| {
        let year = v.pop()?.int()? as i32;
        let season = season_of(&v.pop()?.tok()?.text)?;
        let mut f = FuzzyNode::new(PeriodSpec::Season(season));
        f.year = Some(year);
        Some(Val::Fuzzy(f))
    }));
    r.push(rule("fz_base", vec![n("rel_w"), k(K::Season)], |mut v| {
        let season = season_of(&v.pop()?.tok()?.text)?;
        let rel = v.pop()?.rel()?;
        let mut f = FuzzyNode::new(PeriodSpec::Season(season));
        f.rel = Some(rel);
        Some(Val::Fuzzy(f))
    }));

    // this/next/last + unit period.
    r.push(rule("fz_base", vec![n("rel_w"), n("p_unit")], |mut v| {
        let unit = v.pop()?.period_unit()?;
        let rel = v.pop()?.rel()?;
        let mut f = FuzzyNode::new(PeriodSpec::UnitPeriod(unit));
        f.rel = Some(rel);
        Some(Val::Fuzzy(f))
    }));
    r.push(rule(
        "fz_base",
        vec![n("rel_w"), kw(K::Unit, "fortnight")],
        |mut v| {
            v.pop();
            let rel = v.pop()?.rel()?;
            let mut f = FuzzyNode::new(PeriodSpec::Fortnight);
            f.rel = Some(rel);
            Some(Val::Fuzzy(f))
        },
    ));

    // Weekend / tonight.
    r.push(rule("fz_base", vec![n("rel_w"), k(K::Weekend)], |mut v| {
        v.pop();
        let rel = v.pop()?.rel()?;
        let mut f = FuzzyNode::new(PeriodSpec::Weekend);
        f.rel = Some(rel);
        Some(Val::Fuzzy(f))
    }));
    r.push(rule("fz_base", vec![k(K::Weekend)], |_| {
        fuzzy_val(PeriodSpec::Weekend)
    }));
    r.push(rule("fz_base", vec![k(K::Tonight)], |_| {
        fuzzy_val(PeriodSpec::Night)
    }));

    // Week numbers and week-of forms.
    r.push(rule("fz_base", vec![kw(K::Unit, "week"), n("num")], |mut v| {
        let week = v.pop()?.int()?;
        if !(1..=53).contains(&week) {
            return None;
        }
        fuzzy_val(PeriodSpec::WeekNumber(week as u32))
    }));
    r.push(rule(
        "fz_base",
        vec![kw(K::Unit, "week"), n("num"), k(K::Of), n("year_num")],
        |mut v| {
            let year = v.pop()?.int()? as i32;
            v.pop();
            let week = v.pop()?.int()?;
            if !(1..=53).contains(&week) {
                return None;
            }
            let mut f = FuzzyNode::new(PeriodSpec::WeekNumber(week as u32));
            f.year = Some(year);
            Some(Val::Fuzzy(f))
        },
    ));
    r.push(rule(
        "fz_base",
        vec![kw(K::Unit, "week"), n("num"), k(K::Of), k(K::Month)],
        |mut v| {
            let month = month_number(&v.pop()?.tok()?.text)?;
            v.pop();
            let week = v.pop()?.int()?;
            if !(1..=6).contains(&week) {
                return None;
            }
            fuzzy_val(PeriodSpec::WeekOfMonth {
                week: week as u32,
                month,
            })
        },
    ));
    r.push(rule(
        "fz_base",
        vec![kw(K::Unit, "week"), k(K::Of), n("date")],
        |mut v| {
            let date = v.pop()?.date()?;
            fuzzy_val(PeriodSpec::WeekOf(Box::new(date)))
        },
    ));

    // Fuzzy month ("early march" reaches here through the modifier rules).
    r.push(rule("fz_base", vec![k(K::Month)], |mut v| {
        fuzzy_val(PeriodSpec::Month(month_number(&v.pop()?.tok()?.text)?))
    }));
    r.push(rule("fz_base", vec![k(K::Month), n("year_num")], |mut v| {
        let year = v.pop()?.int()? as i32;
        let month = month_number(&v.pop()?.tok()?.text)?;
        let mut f = FuzzyNode::new(PeriodSpec::Month(month));
        f.year = Some(year);
        Some(Val::Fuzzy(f))
    }));

    // Bare year, year-to-date.
    r.push(rule("fz_base", vec![n("year_num")], |mut v| {
        fuzzy_val(PeriodSpec::Year(v.pop()?.int()? as i32))
    }));
    r.push(rule("fz_base", vec![k(K::Ytd)], |_| {
        fuzzy_val(PeriodSpec::YearToDate)
    }));
    r.push(rule(
        "fz_base",
        vec![kw(K::Unit, "year"), k(K::To), kw(K::Word, "date")],
        |_| fuzzy_val(PeriodSpec::YearToDate),
    ));

    // ── Shared leaves ───────────────────────────────────────────────────────
    for kind in [K::Next, K::Last, K::This, K::Coming, K::Previous] {
        r.push(rule("rel_w", vec![k(kind)], move |_| {
            Some(Val::Rel(rel_word_of(kind)?))
        }));
    }
    r.push(rule("p_unit", vec![k(K::Unit)], |mut v| {
        Some(Val::PUnit(period_unit_of(&v.pop()?.tok()?.text)?))
    }));
    r.push(rule("num", vec![Sym::T(Term::Num)], |mut v| {
        Some(Val::Int(num_value(&v.pop()?.tok()?)?))
    }));
    r.push(rule("int", vec![k(K::Integer)], |mut v| {
        Some(Val::Int(v.pop()?.tok()?.text.parse().ok()?))
    }));
    r.push(rule("day_t", vec![Sym::T(Term::DayNum)], |mut v| {
        Some(Val::Int(v.pop()?.tok()?.text.parse().ok()?))
    }));
    r.push(rule("year_num", vec![Sym::T(Term::Year)], |mut v| {
        Some(Val::Int(v.pop()?.tok()?.text.parse().ok()?))
    }));
    r.push(rule("wk_ord", vec![k(K::OrdinalNum)], |mut v| {
        Some(Val::Int(ordinal_num_value(&v.pop()?.tok()?.text)? as i64))
    }));
    r.push(rule("wk_ord", vec![k(K::OrdinalWord)], |mut v| {
        Some(Val::Int(ordinal_word_value(&v.pop()?.tok()?.text)? as i64))
    }));
    r.push(rule("wk_ord", vec![kw(K::Unit, "second")], |_| Some(Val::Int(2))));

    Grammar {
        start: "top",
        rules: r,
    }
}

/// Trailing digit of a quarter/half token ("q3" -> 3).
fn label_digit(text: &str) -> Option<u32> {
    text.chars().last()?.to_digit(10)
}

fn meridiem_of(text: &str) -> Option<Meridiem> {
    if text.starts_with('a') {
        Some(Meridiem::Am)
    } else if text.starts_with('p') {
        Some(Meridiem::Pm)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use crate::token::{tokenize, TokenKind};

    fn parse_str(input: &str) -> Option<Node> {
        let tokens: Vec<_> = tokenize(input)
            .unwrap()
            .into_iter()
            .filter(|t| {
                !matches!(
                    t.kind,
                    TokenKind::Whitespace | TokenKind::Newline | TokenKind::The | TokenKind::Comma
                )
            })
            .collect();
        parser::parse(&GRAMMAR, &tokens)?.node()
    }

    #[test]
    fn test_no_epsilon_rules_and_all_nonterminals_defined() {
        let defined: std::collections::HashSet<_> =
            GRAMMAR.rules.iter().map(|r| r.lhs).collect();
        for r in &GRAMMAR.rules {
            assert!(!r.rhs.is_empty(), "epsilon rule for {}", r.lhs);
            for sym in &r.rhs {
                if let Sym::N(nt) = sym {
                    assert!(defined.contains(nt), "undefined nonterminal {nt}");
                }
            }
        }
        assert!(defined.contains(GRAMMAR.start));
    }

    #[test]
    fn test_weekday_with_relative() {
        match parse_str("next friday") {
            Some(Node::Date(d)) => assert_eq!(
                d.spec,
                DateSpec::WeekdayRel {
                    weekday: chrono::Weekday::Fri,
                    rel: Some(RelWord::Next),
                }
            ),
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_lead_in_words_pass_through() {
        assert!(matches!(parse_str("on friday"), Some(Node::Date(_))));
        assert!(matches!(parse_str("by 5 pm"), Some(Node::Date(_))));
    }

    #[test]
    fn test_date_with_time() {
        match parse_str("tomorrow at 5pm") {
            Some(Node::Date(d)) => {
                assert_eq!(d.spec, DateSpec::Special(SpecialDay::Tomorrow));
                assert_eq!(
                    d.time,
                    Some(TimeSpec::Clock {
                        hour: 5,
                        minute: 0,
                        second: 0,
                        meridiem: Some(Meridiem::Pm),
                    })
                );
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_duration_beats_date_for_bare_counts() {
        match parse_str("2 weeks") {
            Some(Node::Duration(d)) => {
                assert_eq!(d.parts.len(), 1);
                assert_eq!(d.parts[0].unit, DurUnit::Week);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_combined_duration() {
        match parse_str("1 hour and 30 minutes") {
            Some(Node::Duration(d)) => {
                assert_eq!(d.parts.len(), 2);
                assert_eq!(d.parts[0].unit, DurUnit::Hour);
                assert_eq!(d.parts[1].unit, DurUnit::Minute);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_range_over_month_days() {
        match parse_str("jan 5 to jan 20") {
            Some(Node::Range(range)) => {
                assert!(matches!(range.start, Endpoint::Date(_)));
                assert!(matches!(range.end, Endpoint::Date(_)));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_bare_month_is_a_date_but_early_month_is_fuzzy() {
        assert!(matches!(parse_str("march"), Some(Node::Date(_))));
        match parse_str("early march") {
            Some(Node::Fuzzy(f)) => {
                assert_eq!(f.period, PeriodSpec::Month(3));
                assert_eq!(f.modifier, Some(FuzzyModifier::Early));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_quarter_with_year() {
        match parse_str("q1 2025") {
            Some(Node::Fuzzy(f)) => {
                assert_eq!(f.period, PeriodSpec::Quarter(1));
                assert_eq!(f.year, Some(2025));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_next_week_is_fuzzy_period() {
        match parse_str("next week") {
            Some(Node::Fuzzy(f)) => {
                assert_eq!(f.period, PeriodSpec::UnitPeriod(PeriodUnit::Week));
                assert_eq!(f.rel, Some(RelWord::Next));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_relative_window() {
        match parse_str("last 30 days") {
            Some(Node::Relative(rel)) => {
                assert_eq!(rel.direction, Direction::Past);
                assert_eq!(rel.duration.parts[0].value, 30.0);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_relative_date_forms() {
        assert!(matches!(
            parse_str("2 days before friday"),
            Some(Node::RelativeDate(_))
        ));
        assert!(matches!(parse_str("in 2 weeks"), Some(Node::RelativeDate(_))));
        assert!(matches!(
            parse_str("within 2 weeks"),
            Some(Node::RelativeDate(_))
        ));
        assert!(matches!(parse_str("3 days ago"), Some(Node::RelativeDate(_))));
        match parse_str("in 5 business days") {
            Some(Node::RelativeDate(rd)) => {
                assert_eq!(rd.offset, crate::ast::OffsetSpec::BusinessDays(5));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_span_with_for() {
        assert!(matches!(parse_str("jan 5 for 2 weeks"), Some(Node::Span(_))));
    }

    #[test]
    fn test_titled_expression() {
        match parse_str("team offsite - march 10 to march 14") {
            Some(Node::Titled(t)) => {
                assert_eq!(t.literal, "team offsite");
                assert!(matches!(*t.inner, Node::Range(_)));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_ordinal_weekday_of_month() {
        match parse_str("third thursday of november") {
            Some(Node::Date(d)) => assert_eq!(
                d.spec,
                DateSpec::OrdinalWeekday {
                    ordinal: WeekdayOrdinal::Nth(3),
                    weekday: chrono::Weekday::Thu,
                    month: MonthRef::Named {
                        month: 11,
                        year: None,
                    },
                }
            ),
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_second_as_ordinal_and_as_unit() {
        // "second friday" uses the unit-token escape hatch for the ordinal.
        assert!(matches!(parse_str("second friday"), Some(Node::Date(_))));
        match parse_str("30 seconds") {
            Some(Node::Duration(d)) => assert_eq!(d.parts[0].unit, DurUnit::Second),
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_garbage_fails() {
        assert!(parse_str("hello world").is_none());
        assert!(parse_str("to to to").is_none());
    }
}
