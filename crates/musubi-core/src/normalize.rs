//! Label normalization for name comparison.
//!
//! Levels applied in order:
//! 1. Unicode NFKC + case folding
//! 2. Character transliteration
//! 3. Checksum removal
//! 4. Separator expansion
//! 5. Punctuation erasure
//! 6. Whitespace collapse

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Apply the full normalization pipeline.
pub fn normalize(s: &str) -> String {
    let s = unicode_normalize(s);
    let s = transliterate(&s);
    let s = strip_checksums(&s);
    let s = expand_separators(&s);
    let s = erase_punctuation(&s);
    collapse_whitespace(&s)
}

/// Normalized words of a label.
pub fn tokens(s: &str) -> Vec<String> {
    normalize(s).split(' ').filter(|w| !w.is_empty()).map(String::from).collect()
}

// ── Level 1: Unicode NFKC + case folding ──────────────────────────────

fn unicode_normalize(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase()
}

// ── Level 2: Character transliteration ────────────────────────────────

fn transliterate(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\u{00D7}' => result.push('x'),                             // ×
            '\u{2019}' | '\u{2018}' | '\u{02BC}' => result.push('\''), // curly quotes
            '\u{201C}' | '\u{201D}' => result.push('"'),
            '\u{2013}' | '\u{2014}' => result.push('-'), // en/em dash
            '&' => result.push_str(" and "),
            '\u{00E6}' => result.push_str("ae"), // æ
            '\u{0153}' => result.push_str("oe"), // œ
            '\u{00DF}' => result.push_str("ss"), // ß
            c => result.push(c),
        }
    }
    result
}

// ── Level 3: Checksum removal ─────────────────────────────────────────

static CHECKSUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\[(]\s*[0-9a-f]{8}\s*[\])]").expect("valid checksum pattern")
});

/// Drop bracketed CRC32 checksums such as `[ef62df13]`.
fn strip_checksums(s: &str) -> String {
    CHECKSUM.replace_all(s, " ").into_owned()
}

// ── Level 4: Separator expansion ──────────────────────────────────────

fn expand_separators(s: &str) -> String {
    s.chars()
        .map(|c| if matches!(c, '.' | '_' | '-') { ' ' } else { c })
        .collect()
}

// ── Level 5: Punctuation erasure ──────────────────────────────────────

fn erase_punctuation(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

// ── Level 6: Whitespace collapse ──────────────────────────────────────

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullwidth_and_case() {
        assert_eq!(normalize("ＦＵＬＬＷＩＤＴＨ Title"), "fullwidth title");
    }

    #[test]
    fn separators_become_spaces() {
        assert_eq!(normalize("The.Show_Name-Title"), "the show name title");
    }

    #[test]
    fn checksums_are_removed() {
        assert_eq!(normalize("test [EF62DF13]"), "test");
        assert_eq!(normalize("[Group] Show - 01 (ab12CD34).mkv"), "group show 01 mkv");
    }

    #[test]
    fn non_checksum_brackets_keep_content() {
        assert_eq!(normalize("Show [1080p]"), "show 1080p");
        assert_eq!(normalize("Show (2010)"), "show 2010");
    }

    #[test]
    fn punctuation_and_symbols() {
        assert_eq!(normalize("Marvel\u{2019}s Agents of S.H.I.E.L.D."), "marvels agents of s h i e l d");
        assert_eq!(normalize("Law & Order"), "law and order");
        assert_eq!(normalize("Stra\u{00DF}e"), "strasse");
    }

    #[test]
    fn token_split() {
        assert_eq!(tokens("  Hot   Dogs!"), vec!["hot", "dogs"]);
        assert!(tokens("...").is_empty());
    }
}
