//! Vocabulary model (C3): records, scopes, address-layout helpers, and
//! the hot-path in-memory cache built from them (C4).

pub mod cache;
pub mod record;

pub use cache::{HotCache, HotCacheCell};
pub use record::{Category, Scope, VocabRecord};
