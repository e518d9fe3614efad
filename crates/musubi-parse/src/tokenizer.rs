/// Token types produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Text enclosed in brackets: `[Group]`, `(720p)`.
    Bracketed,
    /// Free text between brackets/delimiters.
    FreeText,
    /// A run of delimiter characters (space, underscore, dot).
    Delimiter,
}

/// A single token from a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// A free-text token that carries a word (not a dash).
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::FreeText && self.text != "-"
    }
}

/// Opening/closing bracket pairs, including CJK brackets.
const BRACKETS: &[(char, char)] = &[
    ('[', ']'),
    ('(', ')'),
    ('{', '}'),
    ('\u{300C}', '\u{300D}'), // 「」
    ('\u{300E}', '\u{300F}'), // 『』
    ('\u{3010}', '\u{3011}'), // 【】
];

/// Media and subtitle extensions removed from the end of a label.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "ogm", "wmv", "mpg", "mpeg", "flv", "webm", "m4v", "ts", "mov", "3gp",
    "rm", "rmvb", "m2ts", "divx", "srt", "sub", "ass", "ssa", "idx", "smi",
];

fn is_soft_delimiter(c: char) -> bool {
    matches!(c, ' ' | '_' | '.' | '\u{3000}')
}

fn is_dash(c: char) -> bool {
    matches!(c, '-' | '\u{2013}' | '\u{2014}')
}

fn closing_bracket(c: char) -> Option<char> {
    BRACKETS
        .iter()
        .find(|(open, _)| *open == c)
        .map(|(_, close)| *close)
}

fn is_stray_bracket(c: char) -> bool {
    BRACKETS.iter().any(|&(open, close)| c == open || c == close)
}

/// Split a label into bracketed groups, free text and delimiters.
///
/// Dashes become `FreeText("-")`. Brackets without a partner are dropped
/// and the text around them is tokenized as free text.
pub fn tokenize(input: &str) -> Vec<Token> {
    let input = strip_extension(input).0;
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(close) = closing_bracket(c) {
            let Some(len) = chars[i + 1..].iter().position(|&x| x == close) else {
                i += 1;
                continue;
            };
            let text: String = chars[i + 1..i + 1 + len].iter().collect();
            if !text.trim().is_empty() {
                tokens.push(Token::new(TokenKind::Bracketed, text));
            }
            i += len + 2;
            continue;
        }

        if is_stray_bracket(c) {
            i += 1;
            continue;
        }

        if is_dash(c) {
            tokens.push(Token::new(TokenKind::FreeText, "-"));
            i += 1;
            while i < chars.len() && is_soft_delimiter(chars[i]) {
                i += 1;
            }
            continue;
        }

        if is_soft_delimiter(c) {
            while i < chars.len() && is_soft_delimiter(chars[i]) {
                i += 1;
            }
            tokens.push(Token::new(TokenKind::Delimiter, " "));
            continue;
        }

        // A dot between digits ("1.02", "H.264") stays inside the token.
        let start = i;
        while i < chars.len() && !is_dash(chars[i]) && !is_stray_bracket(chars[i]) {
            if is_soft_delimiter(chars[i]) {
                if chars[i] == '.'
                    && i > start
                    && i + 1 < chars.len()
                    && chars[i - 1].is_ascii_digit()
                    && chars[i + 1].is_ascii_digit()
                {
                    i += 1;
                    continue;
                }
                break;
            }
            i += 1;
        }
        let text: String = chars[start..i].iter().collect();
        if !text.is_empty() {
            tokens.push(Token::new(TokenKind::FreeText, text));
        }
    }

    tokens
}

/// Strip a known media extension, returning the base name and the
/// lowercased extension.
pub fn strip_extension(input: &str) -> (&str, Option<&'static str>) {
    let Some(dot) = input.rfind('.') else {
        return (input, None);
    };
    let suffix = &input[dot + 1..];
    MEDIA_EXTENSIONS
        .iter()
        .find(|ext| suffix.eq_ignore_ascii_case(ext))
        .map_or((input, None), |ext| (&input[..dot], Some(*ext)))
}

/// Eight hex digits, as used for CRC32 release checksums.
pub fn is_checksum(s: &str) -> bool {
    s.len() == 8 && s.chars().all(|c| c.is_ascii_hexdigit())
}
