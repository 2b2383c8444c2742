//! Scanner (C6): text to raw-token stream, in the lexical priority
//! order of spec §4.5.

use super::raw_token::{RawToken, RawTokenType};

const RSQUO: char = '\u{2019}';
const ELLIPSIS: char = '\u{2026}';

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == RSQUO
}

const ASCII_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}'];

/// Try to scan a word starting at `start`. Handles a leading
/// apostrophe before a letter (`'twas`), internal apostrophes and
/// hyphens between letters, a trailing bare apostrophe after a letter
/// (`heroes'`), and intra-word `…`/right-single-quote when flanked by
/// letters on both sides (spec rule 4's fallthrough).
fn try_scan_word(chars: &[char], start: usize) -> Option<(String, usize)> {
    let n = chars.len();
    let mut j = start;
    let mut s = String::new();

    if is_apostrophe(chars[j]) && j + 1 < n && chars[j + 1].is_alphabetic() {
        s.push(chars[j]);
        j += 1;
    }

    if j >= n || !chars[j].is_alphanumeric() {
        return None;
    }

    loop {
        if j >= n {
            break;
        }
        let c = chars[j];
        if c.is_alphanumeric() {
            s.push(c);
            j += 1;
            continue;
        }
        let last_is_letter = s.chars().last().map(|l| l.is_alphabetic()).unwrap_or(false);
        if is_apostrophe(c) {
            if j + 1 < n && chars[j + 1].is_alphabetic() {
                s.push(c);
                j += 1;
                continue;
            }
            if last_is_letter {
                s.push(c);
                j += 1;
            }
            break;
        }
        if c == '-' && last_is_letter && j + 1 < n && chars[j + 1].is_alphabetic() {
            s.push(c);
            j += 1;
            continue;
        }
        if c == ELLIPSIS && last_is_letter && j + 1 < n && chars[j + 1].is_alphabetic() {
            s.push(c);
            j += 1;
            continue;
        }
        break;
    }

    if s.is_empty() {
        None
    } else {
        Some((s, j))
    }
}

/// Digit run with up to 4 trailing letters (`1st`, `2nd`, `11th`).
fn try_scan_number(chars: &[char], start: usize) -> Option<(String, usize)> {
    let n = chars.len();
    if !chars[start].is_ascii_digit() {
        return None;
    }
    let mut j = start;
    while j < n && chars[j].is_ascii_digit() {
        j += 1;
    }
    let mut letters = 0;
    while j < n && chars[j].is_alphabetic() && letters < 4 {
        j += 1;
        letters += 1;
    }
    Some((chars[start..j].iter().collect(), j))
}

pub struct Scanner<'a> {
    chars: Vec<char>,
    _source: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Scanner {
            chars: text.chars().collect(),
            _source: text,
        }
    }

    pub fn scan(&self) -> Vec<RawToken> {
        let chars = &self.chars;
        let n = chars.len();
        let mut tokens = Vec::new();
        let mut i = 0usize;
        let mut line = 1u32;
        let mut col = 0u32;

        if n > 0 && chars[0] == '\u{FEFF}' {
            i = 1;
        }

        while i < n {
            let c = chars[i];

            // 1. tab/space/CR/BOM
            if c == '\t' || c == ' ' || c == '\r' || c == '\u{FEFF}' {
                i += 1;
                col += 1;
                continue;
            }
            // 2. newline
            if c == '\n' {
                i += 1;
                line += 1;
                col = 0;
                continue;
            }

            let (start_line, start_col) = (line, col);

            // 3. underscore italic marker
            if c == '_' {
                let prev = if i > 0 { Some(chars[i - 1]) } else { None };
                let next = chars.get(i + 1).copied();
                let boundary = |o: Option<char>| o.map(|c| !c.is_alphanumeric()).unwrap_or(true);
                let (b_before, b_after) = (boundary(prev), boundary(next));
                let kind = if b_before && !b_after {
                    RawTokenType::ItalicStart
                } else if !b_before && b_after {
                    RawTokenType::ItalicEnd
                } else {
                    RawTokenType::Punctuation
                };
                tokens.push(RawToken::new("_", kind, start_line, start_col));
                i += 1;
                col += 1;
                continue;
            }

            // 5. triple-dot ellipsis / double-hyphen em-dash
            if c == '.' && chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') {
                tokens.push(RawToken::new(
                    "...",
                    RawTokenType::Punctuation,
                    start_line,
                    start_col,
                ));
                i += 3;
                col += 3;
                continue;
            }
            if c == '-' && chars.get(i + 1) == Some(&'-') {
                tokens.push(RawToken::new(
                    "--",
                    RawTokenType::Punctuation,
                    start_line,
                    start_col,
                ));
                i += 2;
                col += 2;
                continue;
            }

            // 6. ASCII single-char punctuation
            if ASCII_PUNCT.contains(&c) {
                tokens.push(RawToken::new(
                    c.to_string(),
                    RawTokenType::Punctuation,
                    start_line,
                    start_col,
                ));
                i += 1;
                col += 1;
                continue;
            }

            // 7/8. word (with leading-apostrophe / internal apostrophe-hyphen rules)
            if c.is_alphabetic() || (is_apostrophe(c) && chars.get(i + 1).map(|n| n.is_alphabetic()).unwrap_or(false))
            {
                if let Some((surface, end)) = try_scan_word(chars, i) {
                    let len = (end - i) as u32;
                    tokens.push(RawToken::new(
                        surface,
                        RawTokenType::Word,
                        start_line,
                        start_col,
                    ));
                    i = end;
                    col += len;
                    continue;
                }
            }

            // 9. digit run with trailing letters
            if c.is_ascii_digit() {
                if let Some((surface, end)) = try_scan_number(chars, i) {
                    let len = (end - i) as u32;
                    tokens.push(RawToken::new(
                        surface,
                        RawTokenType::Number,
                        start_line,
                        start_col,
                    ));
                    i = end;
                    col += len;
                    continue;
                }
            }

            // 10. fallback: single-character punctuation
            tokens.push(RawToken::new(
                c.to_string(),
                RawTokenType::Punctuation,
                start_line,
                start_col,
            ));
            i += 1;
            col += 1;
        }

        tokens
    }
}

pub fn scan(text: &str) -> Vec<RawToken> {
    Scanner::new(text).scan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_sentence() {
        let toks = scan("the cat the");
        assert_eq!(toks.len(), 3);
        assert!(toks.iter().all(|t| t.kind == RawTokenType::Word));
    }

    #[test]
    fn italic_marker_scenario() {
        let toks = scan("_hello_ world");
        assert_eq!(toks[0].kind, RawTokenType::ItalicStart);
        assert_eq!(toks[1].surface, "hello");
        assert_eq!(toks[2].kind, RawTokenType::ItalicEnd);
        assert_eq!(toks[3].surface, "world");
    }

    #[test]
    fn possessive_apostrophe() {
        let toks = scan("Alice's");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].surface, "Alice's");
    }

    #[test]
    fn possessive_plural_trailing_apostrophe() {
        let toks = scan("heroes'");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].surface, "heroes'");
    }

    #[test]
    fn hyphenated_compound() {
        let toks = scan("well-known");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].surface, "well-known");
    }

    #[test]
    fn ellipsis_and_emdash() {
        let toks = scan("wait... done--now");
        assert_eq!(toks[0].surface, "wait");
        assert_eq!(toks[1].surface, "...");
        assert_eq!(toks[1].kind, RawTokenType::Punctuation);
        assert_eq!(toks[2].surface, "done");
        assert_eq!(toks[3].surface, "--");
        assert_eq!(toks[4].surface, "now");
    }

    #[test]
    fn ordinal_number() {
        let toks = scan("11th place");
        assert_eq!(toks[0].surface, "11th");
        assert_eq!(toks[0].kind, RawTokenType::Number);
    }

    #[test]
    fn capitalization_flag() {
        let toks = scan("Alice alice");
        assert!(toks[0].is_capitalized);
        assert!(!toks[1].is_capitalized);
    }

    #[test]
    fn leading_apostrophe_contraction() {
        let toks = scan("'twas the night");
        assert_eq!(toks[0].surface, "'twas");
    }
}
