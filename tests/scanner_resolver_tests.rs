//! Integration tests for the scanner (C6) and resolver (C7): lexical
//! priority rules and the concrete resolution scenarios of spec §8.3.

use pairbond::cache::{CacheMissResolver, ForwardWalkResult, KvTier, VocabLookup};
use pairbond::markers::Marker;
use pairbond::scan::{scan, RawTokenType};
use pairbond::vocab::cache::{HotCache, HotCacheCell};
use r2d2_sqlite::SqliteConnectionManager;
use std::sync::Arc;

#[test]
fn scanner_lexical_priority_scenarios() {
    let toks = scan("Mr. O'Brien said: \"Well-known _facts_ don't lie...\"");
    assert!(toks.iter().any(|t| t.surface == "O'Brien"));
    assert!(toks.iter().any(|t| t.surface == "Well-known"));
    assert!(toks.iter().any(|t| t.kind == RawTokenType::ItalicStart));
    assert!(toks.iter().any(|t| t.kind == RawTokenType::ItalicEnd));
    assert!(toks.iter().any(|t| t.surface == "don't"));
    assert!(toks.iter().any(|t| t.surface == "..."));
}

#[test]
fn scanner_underscore_neighborhood_rules() {
    // A lone underscore with letters on both sides is neither start nor
    // end by the boundary rule -- it falls through to literal punctuation.
    let toks = scan("a_b");
    assert!(toks.iter().any(|t| t.kind == RawTokenType::Punctuation && t.surface == "_"));
}

/// A resolver backed by a fixed in-memory vocabulary, for exercising
/// resolution policy (possessive/hyphen split, sic fallback) without
/// standing up a full engine.
struct FixedVocab {
    words: std::collections::HashMap<&'static str, pairbond::TokenId>,
    chars: std::collections::HashMap<char, pairbond::TokenId>,
}

impl VocabLookup for FixedVocab {
    fn lookup_word(&self, text: &str) -> pairbond::Result<Option<pairbond::TokenId>> {
        Ok(self.words.get(text).copied())
    }
    fn lookup_char(&self, ch: char) -> pairbond::Result<Option<pairbond::TokenId>> {
        Ok(self.chars.get(&ch).copied())
    }
    fn category(&self, _id: pairbond::TokenId) -> Option<pairbond::vocab::Category> {
        None
    }
    fn surface(&self, _id: pairbond::TokenId) -> Option<String> {
        None
    }
    fn resolve_var_request(
        &self,
        _surface: &str,
        _line: u32,
        _column: u32,
    ) -> pairbond::Result<pairbond::TokenId> {
        unimplemented!()
    }
    fn forward_walk(&self, _prefix: &str) -> pairbond::Result<ForwardWalkResult> {
        Ok(ForwardWalkResult::NoMatch)
    }
}

fn word_id(n: u32) -> pairbond::TokenId {
    use pairbond::vocab::record::{word_token_id, PartOfSpeech, WordLayer};
    word_token_id(WordLayer::Word, PartOfSpeech::Noun as u32, 0, n).unwrap()
}

#[test]
fn possessive_split_scenario() {
    let mut words = std::collections::HashMap::new();
    words.insert("Alice", word_id(0));
    words.insert("s", word_id(1));
    let vocab = FixedVocab {
        words,
        chars: std::collections::HashMap::new(),
    };
    let mut resolver = pairbond::resolve::Resolver::new(&vocab);
    let raw = &scan("Alice's")[0];
    let resolved = resolver.resolve(raw).unwrap();
    assert_eq!(resolved.len(), 3);
    assert_eq!(resolved[1].surface, "'");
    assert_eq!(resolved[2].surface, "s");
}

#[test]
fn sic_fallback_scenario() {
    let mut chars = std::collections::HashMap::new();
    for (i, c) in ['g', 'r', 'b', 'l', 'x'].into_iter().enumerate() {
        use pairbond::vocab::record::{word_token_id, PartOfSpeech, WordLayer};
        chars.insert(
            c,
            word_token_id(WordLayer::Word, PartOfSpeech::Character as u32, 0, i as u32).unwrap(),
        );
    }
    let vocab = FixedVocab {
        words: std::collections::HashMap::new(),
        chars,
    };
    let mut resolver = pairbond::resolve::Resolver::new(&vocab);
    let raw = &scan("grblx")[0];
    let resolved = resolver.resolve(raw).unwrap();
    assert_eq!(resolved.first().unwrap().id, Marker::SicStart.token_id());
    assert_eq!(resolved.last().unwrap().id, Marker::SicEnd.token_id());
    assert_eq!(resolved.len(), 7); // sic_start + 5 chars + sic_end
    assert_eq!(resolver.unknown_log().len(), 1);
}

#[test]
fn italic_marker_scenario_through_resolver() {
    let mut words = std::collections::HashMap::new();
    words.insert("hello", word_id(0));
    words.insert("world", word_id(1));
    let vocab = FixedVocab {
        words,
        chars: std::collections::HashMap::new(),
    };
    let mut resolver = pairbond::resolve::Resolver::new(&vocab);

    let mut resolved = Vec::new();
    for raw in scan("_hello_ world") {
        resolved.extend(resolver.resolve(&raw).unwrap());
    }

    // italic_start, hello, italic_end, world
    assert_eq!(resolved.len(), 4);
    assert_eq!(resolved[0].id, Marker::ItalicStart.token_id());
    assert_eq!(resolved[1].id, word_id(0));
    assert_eq!(resolved[2].id, Marker::ItalicEnd.token_id());
    assert_eq!(resolved[3].id, word_id(1));
}

#[test]
fn cache_miss_resolver_serves_concurrent_readers() {
    let manager = SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder().max_size(2).build(manager).unwrap();
    let kv = KvTier::new(pool);
    let hot = Arc::new(HotCacheCell::new(HotCache::new()));

    struct EmptyCold;
    impl pairbond::cache::ColdVocabStore for EmptyCold {
        fn lookup_word(&self, _s: &str) -> pairbond::Result<Option<pairbond::TokenId>> {
            Ok(None)
        }
        fn lookup_char(&self, _s: &str) -> pairbond::Result<Option<pairbond::TokenId>> {
            Ok(None)
        }
        fn mint_var(
            &self,
            _s: &str,
            _l: u32,
            _c: u32,
        ) -> pairbond::Result<pairbond::TokenId> {
            Ok(word_id(0))
        }
        fn forward_walk_cold(&self, _p: &str) -> pairbond::Result<ForwardWalkResult> {
            Ok(ForwardWalkResult::NoMatch)
        }
    }

    let resolver = CacheMissResolver::new(hot, kv, Arc::new(EmptyCold)).unwrap();
    assert_eq!(resolver.lookup_word("nonexistent").unwrap(), None);
}
