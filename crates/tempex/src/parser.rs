//! Earley chart parser over the time-expression grammar.
//!
//! The grammar is ambiguous by design: one token stream may admit several
//! derivations. The engine recognizes with a standard Earley chart, then
//! extracts the **first** derivation in grammar rule declaration order —
//! rule order is the crate's documented disambiguation mechanism, so the
//! extraction walk always tries lower-numbered rules first.
//!
//! The grammar contains no epsilon productions (optional elements are
//! expanded into alternatives), which keeps completion scanning simple and
//! guarantees every nonterminal spans at least one token. Extraction work
//! is bounded by a fixed budget so pathological inputs terminate.

use std::collections::{HashMap, HashSet};

use crate::ast::{
    DateNode, DurUnit, DurationNode, Endpoint, FuzzyNode, MonthRef, Node, PeriodUnit, RelWord,
    TimeSpec,
};
use crate::token::{Token, TokenKind};

/// A terminal: how one grammar symbol matches one token.
#[derive(Debug, Clone, Copy)]
pub enum Term {
    /// Match on token kind alone.
    Kind(TokenKind),
    /// Match kind plus exact normalized text (keyword-level terminals).
    KindText(TokenKind, &'static str),
    /// Integer or spelled-out number.
    Num,
    /// Integer in 1..=31.
    DayNum,
    /// Four-digit integer (1000..=9999).
    Year,
    /// Any token permitted inside title text (everything except title
    /// separators and brackets).
    Phraseish,
}

pub fn term_matches(term: &Term, tok: &Token) -> bool {
    match term {
        Term::Kind(k) => tok.kind == *k,
        Term::KindText(k, text) => tok.kind == *k && tok.text == *text,
        Term::Num => {
            tok.kind == TokenKind::Integer || tok.kind == TokenKind::WordNumber
        }
        Term::DayNum => {
            tok.kind == TokenKind::Integer
                && tok.text.parse::<u32>().is_ok_and(|v| (1..=31).contains(&v))
        }
        Term::Year => {
            tok.kind == TokenKind::Integer
                && tok.text.len() == 4
                && tok.text.parse::<u32>().is_ok_and(|v| (1000..=9999).contains(&v))
        }
        Term::Phraseish => !matches!(
            tok.kind,
            TokenKind::Dash
                | TokenKind::Colon
                | TokenKind::OpenParen
                | TokenKind::CloseParen
                | TokenKind::OpenBracket
                | TokenKind::CloseBracket
        ),
    }
}

/// One grammar symbol.
#[derive(Debug, Clone, Copy)]
pub enum Sym {
    T(Term),
    N(&'static str),
}

/// Semantic value passed between grammar actions during extraction.
#[derive(Debug, Clone)]
pub enum Val {
    Tok(Token),
    Node(Node),
    Date(DateNode),
    Fuzzy(FuzzyNode),
    Dur(DurationNode),
    DurU(DurUnit),
    PUnit(PeriodUnit),
    Time(TimeSpec),
    Rel(RelWord),
    Int(i64),
    End(Endpoint),
    MRef(MonthRef),
    Title {
        start: usize,
        end: usize,
        literal: String,
    },
}

impl Val {
    pub fn tok(self) -> Option<Token> {
        match self {
            Val::Tok(t) => Some(t),
            _ => None,
        }
    }
    pub fn node(self) -> Option<Node> {
        match self {
            Val::Node(n) => Some(n),
            _ => None,
        }
    }
    pub fn date(self) -> Option<DateNode> {
        match self {
            Val::Date(d) => Some(d),
            _ => None,
        }
    }
    pub fn fuzzy(self) -> Option<FuzzyNode> {
        match self {
            Val::Fuzzy(f) => Some(f),
            _ => None,
        }
    }
    pub fn dur(self) -> Option<DurationNode> {
        match self {
            Val::Dur(d) => Some(d),
            _ => None,
        }
    }
    pub fn dur_unit(self) -> Option<DurUnit> {
        match self {
            Val::DurU(u) => Some(u),
            _ => None,
        }
    }
    pub fn period_unit(self) -> Option<PeriodUnit> {
        match self {
            Val::PUnit(u) => Some(u),
            _ => None,
        }
    }
    pub fn time(self) -> Option<TimeSpec> {
        match self {
            Val::Time(t) => Some(t),
            _ => None,
        }
    }
    pub fn rel(self) -> Option<RelWord> {
        match self {
            Val::Rel(r) => Some(r),
            _ => None,
        }
    }
    pub fn int(self) -> Option<i64> {
        match self {
            Val::Int(i) => Some(i),
            _ => None,
        }
    }
    pub fn endpoint(self) -> Option<Endpoint> {
        match self {
            Val::End(e) => Some(e),
            _ => None,
        }
    }
    pub fn month_ref(self) -> Option<MonthRef> {
        match self {
            Val::MRef(m) => Some(m),
            _ => None,
        }
    }
}

/// A semantic action: children values in, one value out. Returning `None`
/// rejects this derivation and extraction moves to the next candidate.
pub type Action = Box<dyn Fn(Vec<Val>) -> Option<Val> + Send + Sync>;

pub struct Rule {
    pub lhs: &'static str,
    pub rhs: Vec<Sym>,
    pub action: Action,
}

pub struct Grammar {
    pub start: &'static str,
    pub rules: Vec<Rule>,
}

/// Total derivation steps allowed during extraction.
const EXTRACTION_BUDGET: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Item {
    rule: usize,
    dot: usize,
    origin: usize,
}

fn push_unique(set: &mut Vec<Item>, item: Item) {
    if !set.contains(&item) {
        set.push(item);
    }
}

/// Parse a token stream, returning the first derivation's semantic value.
pub fn parse(grammar: &Grammar, tokens: &[Token]) -> Option<Val> {
    if tokens.is_empty() {
        return None;
    }
    let chart = recognize(grammar, tokens);

    // Index completed spans: (origin, lhs) -> [(end, rule)].
    let mut completed: HashMap<(usize, &'static str), Vec<(usize, usize)>> = HashMap::new();
    for (end, items) in chart.iter().enumerate() {
        for item in items {
            let rule = &grammar.rules[item.rule];
            if item.dot == rule.rhs.len() {
                completed
                    .entry((item.origin, rule.lhs))
                    .or_default()
                    .push((end, item.rule));
            }
        }
    }

    let mut ex = Extractor {
        grammar,
        tokens,
        completed,
        budget: EXTRACTION_BUDGET,
        dead: HashSet::new(),
        active: HashSet::new(),
    };
    ex.derive(grammar.start, 0, tokens.len())
}

fn recognize(grammar: &Grammar, tokens: &[Token]) -> Vec<Vec<Item>> {
    let n = tokens.len();
    let mut chart: Vec<Vec<Item>> = vec![Vec::new(); n + 1];

    for (ri, rule) in grammar.rules.iter().enumerate() {
        if rule.lhs == grammar.start {
            push_unique(
                &mut chart[0],
                Item {
                    rule: ri,
                    dot: 0,
                    origin: 0,
                },
            );
        }
    }

    for pos in 0..=n {
        let mut scans: Vec<Item> = Vec::new();
        let mut idx = 0;
        while idx < chart[pos].len() {
            let item = chart[pos][idx];
            idx += 1;
            let rule = &grammar.rules[item.rule];
            match rule.rhs.get(item.dot) {
                Some(Sym::N(nt)) => {
                    for (ri, r) in grammar.rules.iter().enumerate() {
                        if r.lhs == *nt {
                            push_unique(
                                &mut chart[pos],
                                Item {
                                    rule: ri,
                                    dot: 0,
                                    origin: pos,
                                },
                            );
                        }
                    }
                }
                Some(Sym::T(term)) => {
                    if pos < n && term_matches(term, &tokens[pos]) {
                        scans.push(Item {
                            rule: item.rule,
                            dot: item.dot + 1,
                            origin: item.origin,
                        });
                    }
                }
                None => {
                    // Completion. No epsilon rules, so origin < pos and the
                    // parent set is a different chart cell.
                    let lhs = rule.lhs;
                    let parents: Vec<Item> = chart[item.origin].clone();
                    for parent in parents {
                        if let Some(Sym::N(nt)) = grammar.rules[parent.rule].rhs.get(parent.dot) {
                            if *nt == lhs {
                                push_unique(
                                    &mut chart[pos],
                                    Item {
                                        rule: parent.rule,
                                        dot: parent.dot + 1,
                                        origin: parent.origin,
                                    },
                                );
                            }
                        }
                    }
                }
            }
        }
        if pos < n {
            for item in scans {
                push_unique(&mut chart[pos + 1], item);
            }
        }
    }

    chart
}

struct Extractor<'a> {
    grammar: &'a Grammar,
    tokens: &'a [Token],
    completed: HashMap<(usize, &'static str), Vec<(usize, usize)>>,
    budget: usize,
    dead: HashSet<(usize, usize, &'static str)>,
    active: HashSet<(usize, usize, &'static str)>,
}

impl Extractor<'_> {
    fn derive(&mut self, nt: &'static str, start: usize, end: usize) -> Option<Val> {
        if self.dead.contains(&(start, end, nt)) || !self.active.insert((start, end, nt)) {
            return None;
        }

        let mut rules: Vec<usize> = self
            .completed
            .get(&(start, nt))
            .map(|ends| {
                ends.iter()
                    .filter(|(e, _)| *e == end)
                    .map(|(_, r)| *r)
                    .collect()
            })
            .unwrap_or_default();
        rules.sort_unstable();
        rules.dedup();

        let mut found = None;
        for ri in rules {
            if let Some(children) = self.match_seq(ri, 0, start, end) {
                if let Some(val) = (self.grammar.rules[ri].action)(children) {
                    found = Some(val);
                    break;
                }
            }
        }

        self.active.remove(&(start, end, nt));
        if found.is_none() {
            self.dead.insert((start, end, nt));
        }
        found
    }

    fn match_seq(
        &mut self,
        rule: usize,
        sym_idx: usize,
        pos: usize,
        end: usize,
    ) -> Option<Vec<Val>> {
        if self.budget == 0 {
            return None;
        }
        self.budget -= 1;

        let len = self.grammar.rules[rule].rhs.len();
        if sym_idx == len {
            return (pos == end).then(Vec::new);
        }
        let remaining = len - sym_idx - 1;

        match self.grammar.rules[rule].rhs[sym_idx] {
            Sym::T(term) => {
                if pos < end && term_matches(&term, &self.tokens[pos]) {
                    let mut rest = self.match_seq(rule, sym_idx + 1, pos + 1, end)?;
                    rest.insert(0, Val::Tok(self.tokens[pos].clone()));
                    Some(rest)
                } else {
                    None
                }
            }
            Sym::N(nt) => {
                let mut mids: Vec<usize> = self
                    .completed
                    .get(&(pos, nt))
                    .map(|ends| ends.iter().map(|(e, _)| *e).collect())
                    .unwrap_or_default();
                mids.sort_unstable();
                mids.dedup();

                for mid in mids {
                    if mid + remaining > end || (remaining == 0 && mid != end) {
                        continue;
                    }
                    if let Some(child) = self.derive(nt, pos, mid) {
                        if let Some(mut rest) = self.match_seq(rule, sym_idx + 1, mid, end) {
                            rest.insert(0, child);
                            return Some(rest);
                        }
                    }
                }
                None
            }
        }
    }
}
