//! Pre-parse punctuation normalization.
//!
//! Runs before tokenization: trailing unmatched closing parens/brackets are
//! stripped one at a time (re-trimming trailing whitespace each step) until
//! balanced, remaining unmatched opening parens/brackets are deleted from
//! their first occurrence onward, and internal whitespace runs collapse to
//! single spaces. The byte map lets title extraction address the original,
//! pre-normalization string, so normalization never disturbs title offsets.
//!
//! Normalization is idempotent: applying it to its own output is a no-op.

/// A normalized string plus, for every output byte, the byte offset it came
/// from in the original input.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub text: String,
    pub map: Vec<usize>,
}

const PAIRS: &[(char, char)] = &[('(', ')'), ('[', ']')];

fn count_of(chars: &[(char, usize)], target: char) -> usize {
    chars.iter().filter(|(c, _)| *c == target).count()
}

fn trim_end(chars: &mut Vec<(char, usize)>) {
    while chars.last().is_some_and(|(c, _)| c.is_whitespace()) {
        chars.pop();
    }
}

fn trim_start(chars: &mut Vec<(char, usize)>) {
    let keep = chars
        .iter()
        .position(|(c, _)| !c.is_whitespace())
        .unwrap_or(chars.len());
    chars.drain(..keep);
}

/// Index of the first unmatched `open` character, if any.
fn first_unmatched_open(chars: &[(char, usize)], open: char, close: char) -> Option<usize> {
    let mut stack = Vec::new();
    for (i, (c, _)) in chars.iter().enumerate() {
        if *c == open {
            stack.push(i);
        } else if *c == close {
            stack.pop();
        }
    }
    stack.first().copied()
}

/// Balance-normalize `input`, keeping a per-byte map into the original.
pub fn normalize(input: &str) -> Normalized {
    let mut chars: Vec<(char, usize)> = input.char_indices().map(|(i, c)| (c, i)).collect();
    trim_start(&mut chars);
    trim_end(&mut chars);

    // Strip trailing unmatched closers one at a time.
    loop {
        trim_end(&mut chars);
        let last = chars.last().map(|(c, _)| *c);
        let unmatched_closer = last.is_some_and(|c| {
            PAIRS.iter().any(|(open, close)| {
                c == *close && count_of(&chars, *close) > count_of(&chars, *open)
            })
        });
        if !unmatched_closer {
            break;
        }
        chars.pop();
    }

    // Delete unmatched openers from their first occurrence onward.
    for (open, close) in PAIRS {
        while let Some(idx) = first_unmatched_open(&chars, *open, *close) {
            chars.remove(idx);
        }
    }
    trim_start(&mut chars);
    trim_end(&mut chars);

    // Collapse whitespace runs to single spaces.
    let mut text = String::new();
    let mut map = Vec::new();
    let mut prev_space = false;
    for (c, off) in chars {
        if c.is_whitespace() {
            if !prev_space {
                text.push(' ');
                map.push(off);
            }
            prev_space = true;
        } else {
            for i in 0..c.len_utf8() {
                map.push(off + i);
            }
            text.push(c);
            prev_space = false;
        }
    }

    Normalized { text, map }
}

/// Normalized text only; convenience for callers that do not need the map.
pub fn balance(input: &str) -> String {
    normalize(input).text
}
