//! Hot-path vocabulary cache (C4).
//!
//! Loaded once at engine start from cold storage. Lookup protocol:
//! single-character map, then exact-surface map, then lower-cased map.
//! Anchor registration (`stream_start`/`stream_end`) is load-bearing —
//! the reconstructor uses category `PbmAnchor` to suppress spacing.

use crate::markers::ALL_MARKERS;
use crate::token_id::TokenId;
use crate::vocab::record::{Category, VocabRecord};
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};

/// An immutable snapshot of the hot cache's four maps. Readers take an
/// `Arc` clone under the cell's read lock and then drop the lock, so a
/// long-running reader never blocks a writer and never observes a
/// write half-applied.
#[derive(Debug, Clone, Default)]
pub struct HotCache {
    word_lower: FxHashMap<String, TokenId>,
    word_exact: FxHashMap<String, TokenId>,
    char_map: FxHashMap<char, TokenId>,
    id_to_surface: FxHashMap<TokenId, String>,
    id_to_category: FxHashMap<TokenId, Category>,
}

impl HotCache {
    pub fn new() -> Self {
        let mut cache = Self::default();
        cache.register_markers();
        cache
    }

    fn register_markers(&mut self) {
        for &m in ALL_MARKERS {
            let id = m.token_id();
            self.id_to_surface.insert(id, String::new());
            self.id_to_category.insert(id, m.category());
        }
    }

    pub fn from_records(records: impl IntoIterator<Item = VocabRecord>) -> Self {
        let mut cache = Self::new();
        for rec in records {
            cache.insert_record(&rec);
        }
        cache
    }

    pub fn insert_record(&mut self, rec: &VocabRecord) {
        match rec.category {
            Category::Character => {
                if let Some(ch) = rec.surface.chars().next() {
                    if rec.surface.chars().count() == 1 {
                        self.char_map.insert(ch, rec.id);
                    }
                }
            }
            Category::Word => {
                self.word_exact.insert(rec.surface.clone(), rec.id);
                self.word_lower
                    .insert(rec.surface.to_lowercase(), rec.id);
            }
            _ => {}
        }
        self.id_to_surface.insert(rec.id, rec.surface.clone());
        self.id_to_category.insert(rec.id, rec.category);
    }

    /// `lookup(text)`: single-character map, exact-surface map,
    /// lower-cased map, in that order. `None` on miss.
    pub fn lookup(&self, text: &str) -> Option<TokenId> {
        let mut chars = text.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(&id) = self.char_map.get(&c) {
                return Some(id);
            }
        }
        if let Some(&id) = self.word_exact.get(text) {
            return Some(id);
        }
        self.word_lower.get(&text.to_lowercase()).copied()
    }

    pub fn surface(&self, id: TokenId) -> Option<&str> {
        self.id_to_surface.get(&id).map(|s| s.as_str())
    }

    pub fn category(&self, id: TokenId) -> Option<Category> {
        self.id_to_category.get(&id).copied()
    }

    pub fn word_count(&self) -> usize {
        self.word_exact.len()
    }

    pub fn char_count(&self) -> usize {
        self.char_map.len()
    }
}

/// Concurrency wrapper: an `RwLock` over an `Arc<HotCache>`. Readers
/// clone the `Arc` under the read lock (cheap, no torn reads). Writers
/// build a whole new `HotCache` and swap the `Arc` under the write
/// lock — single-writer discipline, append-only in practice since var
/// minting only ever adds entries.
#[derive(Debug)]
pub struct HotCacheCell(RwLock<Arc<HotCache>>);

impl HotCacheCell {
    pub fn new(cache: HotCache) -> Self {
        HotCacheCell(RwLock::new(Arc::new(cache)))
    }

    pub fn load(&self) -> Arc<HotCache> {
        self.0.read().expect("hot cache lock poisoned").clone()
    }

    /// Replace the cache wholesale with a freshly extended snapshot.
    pub fn store(&self, cache: HotCache) {
        *self.0.write().expect("hot cache lock poisoned") = Arc::new(cache);
    }

    /// Insert one record via clone-and-swap. Used by the var minter on
    /// a cache miss; callers on the hot path should batch inserts when
    /// possible rather than clone-and-swap per token.
    pub fn insert_record(&self, rec: &VocabRecord) {
        let mut next = (*self.load()).clone();
        next.insert_record(rec);
        self.store(next);
    }
}
