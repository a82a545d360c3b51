//! Hard-delimiter segmentation: the simple alternative to scanning.
//!
//! Splits on commas, semicolons, newlines, and the standalone word "and",
//! then resolves each piece independently. Segments that fail to resolve
//! are dropped without comment.

use crate::options::ParseOptions;
use crate::resolver::parse;
use crate::result::ParseResult;

/// Resolve every delimiter-separated segment of `text`, in order.
pub fn extract(text: &str, options: &ParseOptions) -> Vec<ParseResult> {
    segments(text)
        .into_iter()
        .filter_map(|seg| parse(seg, options))
        .collect()
}

fn segments(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for piece in text.split([',', ';', '\n']) {
        // " and " splits too, but only as a standalone word.
        let mut rest = piece;
        loop {
            match find_and(rest) {
                Some(at) => {
                    push_trimmed(&mut out, &rest[..at]);
                    rest = &rest[at + 5..];
                }
                None => {
                    push_trimmed(&mut out, rest);
                    break;
                }
            }
        }
    }
    out
}

fn find_and(text: &str) -> Option<usize> {
    let lowered = text.to_ascii_lowercase();
    lowered.find(" and ")
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, seg: &'a str) {
    let seg = seg.trim();
    if !seg.is_empty() {
        out.push(seg);
    }
}
