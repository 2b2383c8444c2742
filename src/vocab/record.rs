//! Vocabulary record model and the address-layout helpers that build
//! Token IDs for each region of the namespace (spec §3.2, §3.3).

use crate::error::Result;
use crate::token_id::TokenId;
use serde::{Deserialize, Serialize};

/// The logical scope a vocabulary record lives in. The address root
/// determines the scope; this is carried on the record for convenience
/// (display, filtering) rather than re-derived on every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    Core,
    Language,
    Names,
    Var,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Core => "core",
            Scope::Language => "language",
            Scope::Names => "names",
            Scope::Var => "var",
        }
    }
}

/// Category tag used by spacing rules (C12) and display logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Byte,
    Character,
    Word,
    Punctuation,
    Marker,
    /// `stream_start` / `stream_end` — suppresses spacing on both sides.
    PbmAnchor,
    Document,
    Var,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Byte => "byte",
            Category::Character => "character",
            Category::Word => "word",
            Category::Punctuation => "punctuation",
            Category::Marker => "marker",
            Category::PbmAnchor => "pbm_anchor",
            Category::Document => "document",
            Category::Var => "var",
        }
    }
}

/// A single vocabulary entry: an id, its surface, and classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabRecord {
    pub id: TokenId,
    pub surface: String,
    pub category: Category,
    pub subcategory: Option<String>,
    pub scope: Scope,
}

/// Word layer (1st char of the 3rd pair of a word token id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordLayer {
    Affix = 0,
    Fragment = 1,
    Word = 2,
    Derivative = 3,
    Multiword = 4,
}

/// Part-of-speech / sub-category (2nd char of the 3rd pair), for the
/// `Word` layer. Other layers have their own small sub-vocabularies;
/// this crate only needs the `Word` layer's granularity to resolve
/// ordinary running text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun = 0,
    Verb = 1,
    Adj = 2,
    Adv = 3,
    Prep = 4,
    Conj = 5,
    Det = 6,
    Pron = 7,
    Intj = 8,
    Num = 9,
    Symbol = 10,
    Particle = 11,
    Punct = 12,
    Article = 13,
    Postp = 14,
    Character = 15,
}

/// Root pair values (spec §3.2).
pub mod roots {
    pub const UNIVERSAL: u32 = 0; // AA
    pub const TEXT: u32 = 1; // AB
    pub const NAMES: u32 = 48 * 50; // yA
    pub const SOURCE_PBM: u32 = 49 * 50; // zA
    pub const SEQUENCE: u32 = 4; // AE (2nd pair under AA for structural markers)

    /// Reserved 3rd-pair value under `AB.AB` for var (mint-on-miss)
    /// tokens. The source leaves var addressing unspecified (spec §9,
    /// open question); this crate reserves the top word-layer slot
    /// rather than opening a new top-level root, so a var token still
    /// round-trips through the same B-side partitioning storage (C10)
    /// uses for ordinary words. See DESIGN.md.
    pub const VAR_PAIR3: u32 = 2499;
}

/// `AA.AA.AA.AA.{v}` — one of 256 byte-code tokens.
pub fn byte_token_id(value: u8) -> TokenId {
    TokenId::new(&[roots::UNIVERSAL, 0, 0, 0, value as u32]).expect("byte token id always valid")
}

/// Character token group codes (`AA.AB.AA.{group}.{n}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharGroup {
    Control = 0,
    Whitespace = 1,
    Digit = 2,
    Upper = 3,
    Lower = 4,
    Punctuation = 5,
}

/// `AA.AB.AA.{group}.{n}` — an ASCII/curated-Unicode character token.
pub fn char_token_id(group: CharGroup, n: u32) -> Result<TokenId> {
    TokenId::new(&[roots::UNIVERSAL, roots::TEXT, 0, group as u32, n])
}

/// `AB.AB.{layer*50+sub}.{hi}.{lo}` — an English word/affix/phrase token.
pub fn word_token_id(layer: WordLayer, sub: u32, hi: u32, lo: u32) -> Result<TokenId> {
    let pair3 = (layer as u32) * 50 + sub;
    TokenId::new(&[roots::TEXT, roots::TEXT, pair3, hi, lo])
}

/// `AB.AB.{VAR_PAIR3}.{hi}.{lo}` — a mint-on-miss var token.
pub fn var_token_id(count: u32) -> Result<TokenId> {
    let hi = count / 2500;
    let lo = count % 2500;
    TokenId::new(&[roots::TEXT, roots::TEXT, roots::VAR_PAIR3, hi, lo])
}

/// `yA.{hi}.{lo}` — a proper-noun name component, flat-addressed.
pub fn name_token_id(count: u32) -> Result<TokenId> {
    let hi = count / 2500;
    let lo = count % 2500;
    TokenId::new(&[roots::NAMES, hi, lo])
}

/// `zA.AB.{century}.{hi}.{lo}` — a text-mode document address.
/// `century` is itself a pair value (e.g. the value decoded from the
/// two-letter century code `"AS"`), not a raw integer count.
pub fn document_token_id(century: u32, hi: u32, lo: u32) -> Result<TokenId> {
    TokenId::new(&[roots::SOURCE_PBM, roots::TEXT, century, hi, lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_token_ids_are_depth_five() {
        let id = byte_token_id(65);
        assert_eq!(id.depth(), 5);
        assert_eq!(
            id.to_string(),
            format!("AA.AA.AA.AA.{}", crate::token_id::encode_pair(65).unwrap())
        );
    }

    #[test]
    fn word_token_uses_layer_sub_encoding() {
        let id = word_token_id(WordLayer::Word, PartOfSpeech::Noun as u32, 0, 0).unwrap();
        assert_eq!(id.depth(), 5);
        // layer=2 (Word), sub=0 (Noun) => pair3 = 2*50+0 = 100
        assert_eq!(id.pair(2), Some(100));
    }

    #[test]
    fn name_token_flat_addressed() {
        let id = name_token_id(5000).unwrap();
        assert_eq!(id.depth(), 3);
        assert_eq!(id.pair(0), Some(roots::NAMES));
    }
}
