//! Relational storage (C10): schema, document-address allocation, the
//! write protocol, and the read/query surface, plus the `SqlStore`
//! adapter that wires the cold store into the cache-miss resolver
//! (spec §9's interface-at-the-edge design).

pub mod address;
pub mod read;
pub mod schema;
pub mod write;

pub use read::DocumentRecord;
pub use write::store_pbm;

use crate::cache::{ColdVocabStore, ForwardWalkResult};
use crate::error::Result;
use crate::token_id::TokenId;
use crate::vocab::record::roots;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

/// Which bond-storage table a B-side Token ID routes to, keyed by its
/// leading namespace pair(s) (spec §4.9.1's partition scheme).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondPartition {
    /// `AB.AB.*` — an ordinary word/affix/phrase token.
    Word,
    /// `AA.AE.*` — a structural marker.
    Marker,
    /// `AA.*` (not a marker) — a byte or character token; the implied
    /// `AA` root is not stored, only pairs 2-5.
    CharImplied,
    /// Any other root — stored with an explicit leading pair so it can
    /// still be distinguished from the implied-root character rows.
    Fallback,
}

pub fn classify_b_side(b: TokenId) -> BondPartition {
    let root = b.pair(0).unwrap_or(roots::UNIVERSAL);
    let second = b.pair(1);
    if root == roots::TEXT && second == Some(roots::TEXT) {
        BondPartition::Word
    } else if root == roots::UNIVERSAL && second == Some(roots::SEQUENCE) {
        BondPartition::Marker
    } else if root == roots::UNIVERSAL {
        BondPartition::CharImplied
    } else {
        BondPartition::Fallback
    }
}

/// SQLite-backed cold vocabulary store, pooled via `r2d2`. This is the
/// concrete type `cache::CacheMissResolver` holds behind the
/// `ColdVocabStore` trait object; nothing above the cache layer should
/// name it directly.
pub struct SqlStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqlStore {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Result<Self> {
        let store = SqlStore { pool };
        {
            let conn = store.pool.get()?;
            schema::ensure_schema(&conn)?;
            schema::seed_core_vocabulary(&conn)?;
        }
        Ok(store)
    }

    pub fn pool(&self) -> &Pool<SqliteConnectionManager> {
        &self.pool
    }
}

impl ColdVocabStore for SqlStore {
    fn lookup_word(&self, surface: &str) -> Result<Option<TokenId>> {
        let conn = self.pool.get()?;
        read::lookup_word(&conn, surface)
    }

    fn lookup_char(&self, surface: &str) -> Result<Option<TokenId>> {
        let conn = self.pool.get()?;
        read::lookup_char(&conn, surface)
    }

    fn mint_var(&self, surface: &str, line: u32, column: u32) -> Result<TokenId> {
        let conn = self.pool.get()?;
        read::mint_var(&conn, surface, line, column)
    }

    fn forward_walk_cold(&self, prefix: &str) -> Result<ForwardWalkResult> {
        let conn = self.pool.get()?;
        read::forward_walk_cold(&conn, prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::Marker;
    use crate::vocab::record::{byte_token_id, word_token_id, PartOfSpeech, WordLayer};

    #[test]
    fn classifies_word_bonds() {
        let w = word_token_id(WordLayer::Word, PartOfSpeech::Noun as u32, 0, 0).unwrap();
        assert_eq!(classify_b_side(w), BondPartition::Word);
    }

    #[test]
    fn classifies_marker_bonds() {
        assert_eq!(
            classify_b_side(Marker::ParagraphStart.token_id()),
            BondPartition::Marker
        );
    }

    #[test]
    fn classifies_char_implied_bonds() {
        assert_eq!(classify_b_side(byte_token_id(65)), BondPartition::CharImplied);
    }

    #[test]
    fn classifies_fallback_bonds() {
        let name = crate::vocab::record::name_token_id(0).unwrap();
        assert_eq!(classify_b_side(name), BondPartition::Fallback);
    }
}
