//! Cache-miss resolution tier (C5): on-disk KV backfill, cold-storage
//! fallback, and var-mint-on-request.

pub mod kv;
pub mod resolver;

pub use kv::KvTier;
pub use resolver::{CacheMissResolver, ColdVocabStore, ForwardWalkResult, VocabLookup};
