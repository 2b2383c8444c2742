//! Raw token type produced by the scanner (spec §3.4).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTokenType {
    Word,
    Number,
    Punctuation,
    ItalicStart,
    ItalicEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub surface: String,
    pub kind: RawTokenType,
    pub is_capitalized: bool,
    pub line: u32,
    pub column: u32,
}

impl RawToken {
    pub fn new(surface: impl Into<String>, kind: RawTokenType, line: u32, column: u32) -> Self {
        let surface = surface.into();
        let is_capitalized = surface
            .chars()
            .find(|c| c.is_alphabetic())
            .map(|c| c.is_uppercase())
            .unwrap_or(false);
        RawToken {
            surface,
            kind,
            is_capitalized,
            line,
            column,
        }
    }
}
