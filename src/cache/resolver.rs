//! Cache-miss resolver (C5): hot cache -> on-disk KV -> cold
//! relational store -> var mint, plus the forward-walk boilerplate
//! service.
//!
//! Per the cyclic-reference design note (spec §9), this module is the
//! only place that knows about both the KV tier and the cold store; it
//! exposes `VocabLookup` so `resolve::resolver` (C7) depends on a small
//! trait rather than on storage directly.

use crate::cache::kv::KvTier;
use crate::error::Result;
use crate::token_id::TokenId;
use crate::vocab::cache::HotCacheCell;
use crate::vocab::record::{Category, Scope, VocabRecord};
use std::sync::Arc;

/// Result of a forward-walk boilerplate-prefix lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardWalkResult {
    NoMatch,
    Partial,
    Complete(TokenId),
}

impl ForwardWalkResult {
    fn encode(self) -> String {
        match self {
            ForwardWalkResult::NoMatch => "0".to_string(),
            ForwardWalkResult::Partial => "1".to_string(),
            ForwardWalkResult::Complete(id) => id.to_string(),
        }
    }

    fn decode(s: &str) -> Option<Self> {
        match s {
            "0" => Some(ForwardWalkResult::NoMatch),
            "1" => Some(ForwardWalkResult::Partial),
            other => other.parse().ok().map(ForwardWalkResult::Complete),
        }
    }
}

/// The cold relational store's vocabulary surface, as seen by the
/// cache-miss resolver. Implemented by `storage::SqlStore`; kept as a
/// trait here so this module (and `resolve::resolver` above it) never
/// names a concrete storage type.
pub trait ColdVocabStore: Send + Sync {
    fn lookup_word(&self, surface: &str) -> Result<Option<TokenId>>;
    fn lookup_char(&self, surface: &str) -> Result<Option<TokenId>>;
    /// Atomically return the existing var id for `surface` or mint a
    /// new one, recording `(line, column)` for librarian review.
    fn mint_var(&self, surface: &str, line: u32, column: u32) -> Result<TokenId>;
    /// Cold-storage half of the forward-walk service. Must answer
    /// `NoMatch` correctly against an empty boilerplate population.
    fn forward_walk_cold(&self, prefix: &str) -> Result<ForwardWalkResult>;
}

/// The trait `resolve::resolver` depends on: enough to resolve a
/// surface or character to a Token ID and to read back surface/
/// category for already-known ids, without knowing whether the answer
/// came from the hot cache, the KV tier, or cold storage.
pub trait VocabLookup: Send + Sync {
    fn lookup_word(&self, text: &str) -> Result<Option<TokenId>>;
    fn lookup_char(&self, ch: char) -> Result<Option<TokenId>>;
    fn category(&self, id: TokenId) -> Option<Category>;
    fn surface(&self, id: TokenId) -> Option<String>;
    fn resolve_var_request(&self, surface: &str, line: u32, column: u32) -> Result<TokenId>;
    fn forward_walk(&self, prefix: &str) -> Result<ForwardWalkResult>;
}

pub struct CacheMissResolver {
    hot: Arc<HotCacheCell>,
    kv: KvTier,
    cold: Arc<dyn ColdVocabStore>,
}

impl CacheMissResolver {
    pub fn new(hot: Arc<HotCacheCell>, kv: KvTier, cold: Arc<dyn ColdVocabStore>) -> Result<Self> {
        kv.ensure_schema()?;
        Ok(CacheMissResolver { hot, kv, cold })
    }
}

impl VocabLookup for CacheMissResolver {
    fn lookup_word(&self, text: &str) -> Result<Option<TokenId>> {
        if let Some(id) = self.hot.load().lookup(text) {
            return Ok(Some(id));
        }
        if let Some(id) = self.kv.get_word(text)? {
            return Ok(Some(id));
        }
        match self.cold.lookup_word(text) {
            Ok(Some(id)) => {
                if let Err(err) = self.kv.put_word(text, id) {
                    tracing::warn!(surface = text, error = %err, "kv write-back failed, serving from cold storage");
                }
                Ok(Some(id))
            }
            Ok(None) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn lookup_char(&self, ch: char) -> Result<Option<TokenId>> {
        let text = ch.to_string();
        if let Some(id) = self.hot.load().lookup(&text) {
            return Ok(Some(id));
        }
        if let Some(id) = self.kv.get_char(&text)? {
            return Ok(Some(id));
        }
        match self.cold.lookup_char(&text) {
            Ok(Some(id)) => {
                if let Err(err) = self.kv.put_char(&text, id) {
                    tracing::warn!(char = %text, error = %err, "kv write-back failed, serving from cold storage");
                }
                Ok(Some(id))
            }
            Ok(None) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn category(&self, id: TokenId) -> Option<Category> {
        self.hot.load().category(id)
    }

    fn surface(&self, id: TokenId) -> Option<String> {
        self.hot.load().surface(id).map(|s| s.to_string())
    }

    fn resolve_var_request(&self, surface: &str, line: u32, column: u32) -> Result<TokenId> {
        let id = self.cold.mint_var(surface, line, column)?;
        if let Err(err) = self.kv.put_word(surface, id) {
            tracing::warn!(surface, error = %err, "kv write-back failed after var mint");
        }
        self.hot.insert_record(&VocabRecord {
            id,
            surface: surface.to_string(),
            category: Category::Var,
            subcategory: None,
            scope: Scope::Var,
        });
        Ok(id)
    }

    fn forward_walk(&self, prefix: &str) -> Result<ForwardWalkResult> {
        if let Some(encoded) = self.kv.get_forward(prefix)? {
            if let Some(result) = ForwardWalkResult::decode(&encoded) {
                return Ok(result);
            }
        }
        let result = self.cold.forward_walk_cold(prefix)?;
        if let Err(err) = self.kv.put_forward(prefix, &result.encode()) {
            tracing::warn!(prefix, error = %err, "kv write-back failed for forward walk");
        }
        Ok(result)
    }
}
