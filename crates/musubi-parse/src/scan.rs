//! Match iteration with emulated look-behind.
//!
//! `regex` has no look-around, so every rule pattern wraps the part that
//! matters in a group named `b` and spells its trailing context as a
//! consuming tail. The leading context is checked here against the raw
//! text, and scanning resumes at the end of `b` so a consumed tail can
//! still serve as leading context for the next match.

use regex::{Captures, Regex};

/// What may precede the body of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lead {
    Any,
    /// Not a letter or digit.
    NoAlnum,
    /// Not a digit.
    NoDigit,
    /// Not a letter or digit, and not a `yyyy.` prefix (dotted dates).
    NoAlnumOrYearDot,
}

impl Lead {
    fn accepts(self, text: &str, start: usize) -> bool {
        let before = &text[..start];
        let prev = before.chars().next_back();
        match self {
            Lead::Any => true,
            Lead::NoAlnum => !prev.is_some_and(char::is_alphanumeric),
            Lead::NoDigit => !prev.is_some_and(|c| c.is_ascii_digit()),
            Lead::NoAlnumOrYearDot => {
                if prev.is_some_and(char::is_alphanumeric) {
                    return false;
                }
                !ends_with_year_dot(before)
            }
        }
    }
}

fn ends_with_year_dot(before: &str) -> bool {
    let bytes = before.as_bytes();
    bytes.len() >= 5
        && bytes[bytes.len() - 1] == b'.'
        && bytes[bytes.len() - 5..bytes.len() - 1]
            .iter()
            .all(u8::is_ascii_digit)
}

/// Whether scanning should go on after a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// Call `on_match` for each match of `regex` in `text` whose body passes
/// the `lead` check. `on_match` returns `None` to reject a match, which
/// makes scanning retry one character further on.
pub(crate) fn for_each<E>(
    regex: &Regex,
    text: &str,
    lead: Lead,
    mut on_match: impl FnMut(&Captures<'_>) -> Result<Option<Flow>, E>,
) -> Result<(), E> {
    let mut pos = 0;
    while pos <= text.len() {
        let Some(caps) = regex.captures_at(text, pos) else {
            break;
        };
        let Some(body) = caps.name("b") else {
            break;
        };
        if !lead.accepts(text, body.start()) {
            pos = next_boundary(text, body.start());
            continue;
        }
        match on_match(&caps)? {
            None => pos = next_boundary(text, body.start()),
            Some(Flow::Stop) => break,
            Some(Flow::Continue) => pos = body.end().max(next_boundary(text, body.start())),
        }
    }
    Ok(())
}

fn next_boundary(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| at + c.len_utf8())
}

/// The maximal run of ASCII letters and digits around `start..end`.
pub(crate) fn enclosing_word(text: &str, start: usize, end: usize) -> &str {
    let bytes = text.as_bytes();
    let mut from = start;
    while from > 0 && bytes[from - 1].is_ascii_alphanumeric() {
        from -= 1;
    }
    let mut to = end;
    while to < bytes.len() && bytes[to].is_ascii_alphanumeric() {
        to += 1;
    }
    &text[from..to]
}
