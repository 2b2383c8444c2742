//! Engine facade (C14): the crate's one external surface. A tagged
//! `Request` enum plus an exhaustive `handle()` dispatch for wire-style
//! callers, and direct typed methods for in-process Rust callers — both
//! paths share the same internal logic (spec §9's "dynamic dispatch"
//! note, taken literally per SPEC_FULL.md §4.13.1).

use crate::cache::{CacheMissResolver, KvTier, VocabLookup};
use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::markers::Marker;
use crate::pbm::{disassemble, reassemble, Pbm};
use crate::resolve::resolver::{Resolver, UnknownWordLogEntry};
use crate::scan::scan;
use crate::spacing;
use crate::storage::{self, SqlStore};
use crate::structure::{structural_events, StructuralEvent};
use crate::token_id::{decode_pair, TokenId};
use crate::vocab::cache::{HotCache, HotCacheCell};
use crate::vocab::record::Category;
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub ready: bool,
    pub words: usize,
    pub labels: usize,
    pub chars: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenizeReport {
    pub tokens: usize,
    pub unique: usize,
    pub bonds: usize,
    pub total_pairs: u64,
    pub original_bytes: usize,
    pub ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub doc_id: String,
    pub tokens: usize,
    pub unique: usize,
    pub slots: usize,
    pub ms: f64,
    pub meta_known: usize,
    pub meta_unreviewed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub doc_id: String,
    pub name: String,
    pub starters: usize,
    pub bonds: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub doc_id: String,
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub created_at: DateTime<Utc>,
    pub metadata: serde_json::Value,
    pub starters: usize,
    pub bonds: usize,
    pub total_pairs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrieveReport {
    pub text: String,
    pub tokens: usize,
    pub load_ms: f64,
    pub ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BondView {
    pub token: String,
    pub surface: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateMetaReport {
    pub fields_set: usize,
    pub fields_removed: usize,
}

/// The wire-style request shape (spec §6.1): one variant per action,
/// tagged by `action`, carrying that action's operation-specific
/// fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    Health,
    Tokenize {
        text: String,
    },
    Ingest {
        text: String,
        name: String,
        century: String,
        #[serde(default)]
        metadata: Option<serde_json::Value>,
        #[serde(default)]
        catalog: Option<String>,
    },
    List,
    Info {
        doc_id: String,
    },
    Retrieve {
        doc_id: String,
    },
    Bonds {
        doc_id: String,
        #[serde(default)]
        token: Option<String>,
    },
    UpdateMeta {
        doc_id: String,
        #[serde(default)]
        set: Option<serde_json::Map<String, serde_json::Value>>,
        #[serde(default)]
        remove: Option<Vec<String>>,
    },
}

/// The engine: owns the hot cache, the cache-miss resolver, and the
/// pooled connection document reads/writes use. Constructed once at
/// startup and shared by reference across all request handlers (spec
/// §9's "explicit engine value" guidance).
pub struct Engine {
    hot: Arc<HotCacheCell>,
    vocab: Arc<CacheMissResolver>,
    pool: Pool<SqliteConnectionManager>,
}

fn starter_count(pbm: &Pbm) -> usize {
    let set: FxHashSet<TokenId> = pbm.bonds.keys().map(|&(a, _)| a).collect();
    set.len()
}

impl Engine {
    pub fn open(config: &Config) -> Result<Engine> {
        let manager = SqliteConnectionManager::file(&config.db_path);
        let pool = Pool::builder().max_size(config.pool_size).build(manager)?;

        let cold = Arc::new(SqlStore::new(pool.clone())?);

        let kv_manager = SqliteConnectionManager::file(&config.db_path);
        let kv_pool = Pool::builder().max_size(config.pool_size).build(kv_manager)?;
        let kv = KvTier::new(kv_pool);

        let records = {
            let conn = pool.get()?;
            storage::read::load_all_vocab(&conn)?
        };
        let hot = Arc::new(HotCacheCell::new(HotCache::from_records(records)));

        let vocab = Arc::new(CacheMissResolver::new(hot.clone(), kv, cold)?);

        Ok(Engine { hot, vocab, pool })
    }

    /// Scan, structure-segment, and resolve `text` into a full anchored
    /// Token ID stream, alongside the unknown-word log the resolver
    /// accumulated along the way.
    fn build_stream(&self, text: &str) -> Result<(Vec<TokenId>, Vec<UnknownWordLogEntry>)> {
        let vocab_ref: &dyn VocabLookup = &*self.vocab;
        let mut resolver = Resolver::new(vocab_ref);
        let mut stream = vec![Marker::StreamStart.token_id()];

        for event in structural_events(text) {
            match event {
                StructuralEvent::Marker(m) => stream.push(m.token_id()),
                StructuralEvent::Text(t) => {
                    for raw in scan(&t) {
                        for resolved in resolver.resolve(&raw)? {
                            stream.push(resolved.id);
                        }
                    }
                }
            }
        }
        stream.push(Marker::StreamEnd.token_id());
        Ok((stream, resolver.unknown_log().to_vec()))
    }

    pub fn health(&self) -> Result<HealthReport> {
        let cache = self.hot.load();
        let conn = self.pool.get()?;
        let labels: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tokens WHERE scope = 'names'",
            [],
            |row| row.get(0),
        )?;
        Ok(HealthReport {
            ready: true,
            words: cache.word_count(),
            labels: labels as usize,
            chars: cache.char_count(),
        })
    }

    pub fn tokenize(&self, text: &str) -> Result<TokenizeReport> {
        let started = Instant::now();
        let (stream, _) = self.build_stream(text)?;
        let pbm = disassemble(&stream);
        Ok(TokenizeReport {
            tokens: stream.len(),
            unique: pbm.unique_tokens().len(),
            bonds: pbm.bonds.len(),
            total_pairs: pbm.total_pairs(),
            original_bytes: text.len(),
            ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }

    pub fn ingest(
        &self,
        text: &str,
        name: &str,
        century_code: &str,
        metadata: Option<serde_json::Value>,
        catalog: Option<String>,
    ) -> Result<IngestReport> {
        let started = Instant::now();
        let (stream, unknown_log) = self.build_stream(text)?;
        let pbm = disassemble(&stream);
        let century = decode_pair(century_code)?;
        let metadata = metadata.unwrap_or_else(|| serde_json::json!({}));
        let category = catalog.unwrap_or_else(|| "uncategorized".to_string());

        let conn = self.pool.get()?;
        let doc_id = storage::write::store_pbm(
            &conn,
            name,
            &category,
            None,
            century,
            &pbm,
            &metadata,
            Utc::now(),
        )?;

        Ok(IngestReport {
            doc_id: doc_id.to_string(),
            tokens: stream.len(),
            unique: pbm.unique_tokens().len(),
            slots: pbm.bonds.len(),
            ms: started.elapsed().as_secs_f64() * 1000.0,
            meta_known: stream.len().saturating_sub(2),
            meta_unreviewed: unknown_log.len(),
        })
    }

    pub fn list(&self) -> Result<Vec<DocumentSummary>> {
        let conn = self.pool.get()?;
        let docs = storage::read::list_documents(&conn)?;
        let mut out = Vec::with_capacity(docs.len());
        for doc in docs {
            let pbm = storage::read::load_pbm(&conn, &doc)?;
            out.push(DocumentSummary {
                doc_id: doc.doc_id.to_string(),
                name: doc.name.clone(),
                starters: starter_count(&pbm),
                bonds: pbm.bonds.len(),
            });
        }
        Ok(out)
    }

    pub fn info(&self, doc_id: &str) -> Result<DocumentInfo> {
        let conn = self.pool.get()?;
        let doc = storage::read::load_document(&conn, doc_id)?;
        let pbm = storage::read::load_pbm(&conn, &doc)?;
        Ok(DocumentInfo {
            doc_id: doc.doc_id.to_string(),
            name: doc.name.clone(),
            category: doc.category.clone(),
            subcategory: doc.subcategory.clone(),
            created_at: doc.created_at,
            metadata: doc.metadata.clone(),
            starters: starter_count(&pbm),
            bonds: pbm.bonds.len(),
            total_pairs: pbm.total_pairs(),
        })
    }

    pub fn retrieve(&self, doc_id: &str) -> Result<RetrieveReport> {
        let load_started = Instant::now();
        let conn = self.pool.get()?;
        let doc = storage::read::load_document(&conn, doc_id)?;
        let pbm = storage::read::load_pbm(&conn, &doc)?;
        let load_ms = load_started.elapsed().as_secs_f64() * 1000.0;

        let reassemble_started = Instant::now();
        let content = reassemble(&pbm.bond_triples());
        let text = spacing::reconstruct(&content, |id| {
            (
                self.vocab.surface(id).unwrap_or_default(),
                self.vocab.category(id).unwrap_or(Category::Word),
            )
        });
        let ms = reassemble_started.elapsed().as_secs_f64() * 1000.0;

        Ok(RetrieveReport {
            text,
            tokens: content.len(),
            load_ms,
            ms,
        })
    }

    pub fn bonds(&self, doc_id: &str, token: Option<TokenId>) -> Result<Vec<BondView>> {
        let conn = self.pool.get()?;
        let doc = storage::read::load_document(&conn, doc_id)?;
        let pbm = storage::read::load_pbm(&conn, &doc)?;

        match token {
            Some(t) => Ok(pbm
                .bonds
                .iter()
                .filter(|&(&(a, _), _)| a == t)
                .map(|(&(_, b), &count)| BondView {
                    token: b.to_string(),
                    surface: self.vocab.surface(b).unwrap_or_default(),
                    count,
                })
                .collect()),
            None => {
                let mut totals: FxHashMap<TokenId, u64> = FxHashMap::default();
                for (&(a, _), &count) in &pbm.bonds {
                    *totals.entry(a).or_insert(0) += count;
                }
                Ok(totals
                    .into_iter()
                    .map(|(a, count)| BondView {
                        token: a.to_string(),
                        surface: self.vocab.surface(a).unwrap_or_default(),
                        count,
                    })
                    .collect())
            }
        }
    }

    pub fn update_meta(
        &self,
        doc_id: &str,
        set: Option<serde_json::Map<String, serde_json::Value>>,
        remove: Option<Vec<String>>,
    ) -> Result<UpdateMetaReport> {
        let conn = self.pool.get()?;
        let set = set.unwrap_or_default();
        let remove = remove.unwrap_or_default();
        let (fields_set, fields_removed) =
            storage::read::update_metadata(&conn, doc_id, &set, &remove)?;
        Ok(UpdateMetaReport {
            fields_set,
            fields_removed,
        })
    }

    fn dispatch(&self, request: Request) -> Result<serde_json::Value> {
        match request {
            Request::Health => Ok(serde_json::to_value(self.health()?).unwrap()),
            Request::Tokenize { text } => Ok(serde_json::to_value(self.tokenize(&text)?).unwrap()),
            Request::Ingest {
                text,
                name,
                century,
                metadata,
                catalog,
            } => Ok(serde_json::to_value(
                self.ingest(&text, &name, &century, metadata, catalog)?,
            )
            .unwrap()),
            Request::List => Ok(serde_json::json!({ "documents": self.list()? })),
            Request::Info { doc_id } => Ok(serde_json::to_value(self.info(&doc_id)?).unwrap()),
            Request::Retrieve { doc_id } => {
                Ok(serde_json::to_value(self.retrieve(&doc_id)?).unwrap())
            }
            Request::Bonds { doc_id, token } => {
                let token_id: Option<TokenId> = token.map(|s| s.parse()).transpose()?;
                Ok(serde_json::json!({ "bonds": self.bonds(&doc_id, token_id)? }))
            }
            Request::UpdateMeta {
                doc_id,
                set,
                remove,
            } => Ok(serde_json::to_value(self.update_meta(&doc_id, set, remove)?).unwrap()),
        }
    }

    /// Handle a tagged `Request`, returning a `status`-enveloped JSON
    /// value on both success and failure — the facade never panics.
    pub fn handle(&self, request: Request) -> serde_json::Value {
        match self.dispatch(request) {
            Ok(value) => {
                let mut obj = match value {
                    serde_json::Value::Object(o) => o,
                    other => {
                        let mut o = serde_json::Map::new();
                        o.insert("result".to_string(), other);
                        o
                    }
                };
                obj.insert("status".to_string(), serde_json::json!("ok"));
                serde_json::Value::Object(obj)
            }
            Err(err) => serde_json::json!({"status": "error", "message": err.to_string()}),
        }
    }
}
