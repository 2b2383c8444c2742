//! Resolver (C7): raw tokens to Token IDs, with normalize / exact /
//! case-relax / possessive-split / hyphen-split / sic-fallback policy
//! (spec §4.6).
//!
//! Depends only on `cache::VocabLookup`, never on a concrete storage
//! type — the cyclic-reference design note (spec §9) keeps this module
//! from linking against the relational or KV tiers directly.

use super::resolved_token::{Provenance, ResolvedToken};
use crate::cache::VocabLookup;
use crate::error::Result;
use crate::markers::Marker;
use crate::scan::raw_token::{RawToken, RawTokenType};
use crate::token_id::TokenId;
use crate::vocab::record::{char_token_id, CharGroup};

const RSQUO: char = '\u{2019}';

/// Fixed surface-to-id table for punctuation raw tokens (spec §4.6):
/// ASCII delimiters the scanner emits as single tokens, plus the
/// scanner's two multi-character punctuation surfaces and the curated
/// Unicode quote set the spacing reconstructor also knows about.
const PUNCT_TABLE: &[&str] = &[
    ".", ",", ";", ":", "!", "?", "(", ")", "[", "]", "{", "}", "-", "'", "...", "--",
    "\u{2018}", "\u{2019}", "\u{201C}", "\u{201D}",
];

pub fn punctuation_token_id(surface: &str) -> Option<TokenId> {
    PUNCT_TABLE
        .iter()
        .position(|&s| s == surface)
        .map(|n| char_token_id(CharGroup::Punctuation, n as u32).expect("punct table within range"))
}

fn normalize_apostrophes(s: &str) -> String {
    s.chars().map(|c| if c == RSQUO { '\'' } else { c }).collect()
}

fn marker_token(marker: Marker) -> ResolvedToken {
    ResolvedToken {
        id: marker.token_id(),
        surface: String::new(),
        provenance: Provenance::Marker,
    }
}

#[derive(Debug, Clone)]
pub struct UnknownWordLogEntry {
    pub surface: String,
    pub line: u32,
    pub column: u32,
}

pub struct Resolver<'a> {
    vocab: &'a dyn VocabLookup,
    unknown_log: Vec<UnknownWordLogEntry>,
}

impl<'a> Resolver<'a> {
    pub fn new(vocab: &'a dyn VocabLookup) -> Self {
        Resolver {
            vocab,
            unknown_log: Vec::new(),
        }
    }

    pub fn unknown_log(&self) -> &[UnknownWordLogEntry] {
        &self.unknown_log
    }

    pub fn resolve(&mut self, token: &RawToken) -> Result<Vec<ResolvedToken>> {
        match token.kind {
            RawTokenType::Punctuation => Ok(vec![self.resolve_punctuation(token)?]),
            RawTokenType::ItalicStart => Ok(vec![marker_token(Marker::ItalicStart)]),
            RawTokenType::ItalicEnd => Ok(vec![marker_token(Marker::ItalicEnd)]),
            RawTokenType::Word | RawTokenType::Number => self.resolve_word(token),
        }
    }

    fn resolve_punctuation(&self, token: &RawToken) -> Result<ResolvedToken> {
        if let Some(id) = punctuation_token_id(&token.surface) {
            return Ok(ResolvedToken {
                id,
                surface: token.surface.clone(),
                provenance: Provenance::Punctuation,
            });
        }
        if let Some(c) = token.surface.chars().next() {
            if let Some(id) = self.vocab.lookup_char(c)? {
                return Ok(ResolvedToken {
                    id,
                    surface: token.surface.clone(),
                    provenance: Provenance::Punctuation,
                });
            }
        }
        Ok(marker_token(Marker::Tbd))
    }

    fn lookup_simple(&self, text: &str, capitalized: bool) -> Result<Option<TokenId>> {
        if let Some(id) = self.vocab.lookup_word(text)? {
            return Ok(Some(id));
        }
        if capitalized {
            return self.vocab.lookup_word(&text.to_lowercase());
        }
        Ok(None)
    }

    fn resolve_word(&mut self, token: &RawToken) -> Result<Vec<ResolvedToken>> {
        let normalized = normalize_apostrophes(&token.surface);

        if let Some(id) = self.vocab.lookup_word(&normalized)? {
            return Ok(vec![ResolvedToken {
                id,
                surface: token.surface.clone(),
                provenance: Provenance::Exact,
            }]);
        }

        if token.is_capitalized {
            let lower = normalized.to_lowercase();
            if let Some(id) = self.vocab.lookup_word(&lower)? {
                return Ok(vec![ResolvedToken {
                    id,
                    surface: token.surface.clone(),
                    provenance: Provenance::CaseRelaxed,
                }]);
            }
        }

        if let Some(tokens) = self.try_possessive_split(&normalized, token)? {
            return Ok(tokens);
        }

        if let Some(tokens) = self.try_hyphen_split(&normalized, token)? {
            return Ok(tokens);
        }

        self.sic_fallback(token)
    }

    fn try_possessive_split(
        &self,
        normalized: &str,
        token: &RawToken,
    ) -> Result<Option<Vec<ResolvedToken>>> {
        let chars: Vec<char> = normalized.chars().collect();
        let n = chars.len();

        if n >= 3 && chars[n - 2] == '\'' && chars[n - 1] == 's' {
            let stem: String = chars[..n - 2].iter().collect();
            if let Some(stem_id) = self.lookup_simple(&stem, token.is_capitalized)? {
                if let Some(s_id) = self.vocab.lookup_word("s")? {
                    let apostrophe_id =
                        punctuation_token_id("'").expect("apostrophe is in the punct table");
                    return Ok(Some(vec![
                        ResolvedToken {
                            id: stem_id,
                            surface: stem,
                            provenance: Provenance::Split,
                        },
                        ResolvedToken {
                            id: apostrophe_id,
                            surface: "'".to_string(),
                            provenance: Provenance::Punctuation,
                        },
                        ResolvedToken {
                            id: s_id,
                            surface: "s".to_string(),
                            provenance: Provenance::Split,
                        },
                    ]));
                }
            }
        }

        if n >= 2 && chars[n - 1] == '\'' {
            let stem: String = chars[..n - 1].iter().collect();
            if let Some(stem_id) = self.lookup_simple(&stem, token.is_capitalized)? {
                let apostrophe_id =
                    punctuation_token_id("'").expect("apostrophe is in the punct table");
                return Ok(Some(vec![
                    ResolvedToken {
                        id: stem_id,
                        surface: stem,
                        provenance: Provenance::Split,
                    },
                    ResolvedToken {
                        id: apostrophe_id,
                        surface: "'".to_string(),
                        provenance: Provenance::Punctuation,
                    },
                ]));
            }
        }

        Ok(None)
    }

    fn try_hyphen_split(
        &self,
        normalized: &str,
        token: &RawToken,
    ) -> Result<Option<Vec<ResolvedToken>>> {
        if !normalized.contains('-') {
            return Ok(None);
        }
        let segments: Vec<&str> = normalized.split('-').collect();
        if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
            return Ok(None);
        }

        let mut ids = Vec::with_capacity(segments.len());
        for seg in &segments {
            match self.lookup_simple(seg, token.is_capitalized)? {
                Some(id) => ids.push(id),
                None => return Ok(None),
            }
        }

        let hyphen_id = punctuation_token_id("-").expect("hyphen is in the punct table");
        let mut out = Vec::with_capacity(segments.len() * 2 - 1);
        for (i, (seg, id)) in segments.into_iter().zip(ids).enumerate() {
            if i > 0 {
                out.push(ResolvedToken {
                    id: hyphen_id,
                    surface: "-".to_string(),
                    provenance: Provenance::Punctuation,
                });
            }
            out.push(ResolvedToken {
                id,
                surface: seg.to_string(),
                provenance: Provenance::Split,
            });
        }
        Ok(Some(out))
    }

    fn sic_fallback(&mut self, token: &RawToken) -> Result<Vec<ResolvedToken>> {
        self.unknown_log.push(UnknownWordLogEntry {
            surface: token.surface.clone(),
            line: token.line,
            column: token.column,
        });

        let mut out = vec![marker_token(Marker::SicStart)];
        for c in token.surface.chars() {
            match self.vocab.lookup_char(c)? {
                Some(id) => out.push(ResolvedToken {
                    id,
                    surface: c.to_string(),
                    provenance: Provenance::Sic,
                }),
                None => {
                    tracing::warn!(char = %c, surface = %token.surface, "unknown character in sic fallback");
                    out.push(marker_token(Marker::Tbd));
                }
            }
        }
        out.push(marker_token(Marker::SicEnd));
        Ok(out)
    }
}
