//! On-disk key-value tier (C5), backed by a second set of plain tables
//! in the same SQLite database as cold storage (see SPEC_FULL.md
//! §4.4.1). Keyed by text, values are UTF-8 strings — the dotted
//! Token ID form — kept zero-copy-ish by avoiding any binary codec.

use crate::error::{EngineError, Result};
use crate::token_id::TokenId;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

/// One pooled connection dedicated to KV reads/writes, so they never
/// contend with the cold-store connection used in the same request.
pub struct KvTier {
    pool: Pool<SqliteConnectionManager>,
}

const TABLES: &[&str] = &["kv_w2t", "kv_c2t", "kv_l2t", "kv_t2w", "kv_t2c", "kv_forward"];

impl KvTier {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        KvTier { pool }
    }

    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.pool.get()?;
        for table in TABLES {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} (key TEXT PRIMARY KEY, value TEXT NOT NULL)"
                ),
                [],
            )?;
        }
        Ok(())
    }

    fn get(&self, table: &str, key: &str) -> Result<Option<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("SELECT value FROM {table} WHERE key = ?1"))?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    fn put(&self, table: &str, key: &str, value: &str) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            &format!(
                "INSERT INTO {table} (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value"
            ),
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    fn get_token(&self, table: &str, key: &str) -> Result<Option<TokenId>> {
        match self.get(table, key)? {
            Some(s) => Ok(Some(s.parse().map_err(|_| EngineError::StorageError(
                format!("corrupt kv entry for {key:?} in {table}"),
            ))?)),
            None => Ok(None),
        }
    }

    pub fn get_word(&self, surface: &str) -> Result<Option<TokenId>> {
        self.get_token("kv_w2t", surface)
    }

    pub fn put_word(&self, surface: &str, id: TokenId) -> Result<()> {
        self.put("kv_w2t", surface, &id.to_string())?;
        self.put("kv_t2w", &id.to_string(), surface)
    }

    pub fn get_char(&self, surface: &str) -> Result<Option<TokenId>> {
        self.get_token("kv_c2t", surface)
    }

    pub fn put_char(&self, surface: &str, id: TokenId) -> Result<()> {
        self.put("kv_c2t", surface, &id.to_string())?;
        self.put("kv_t2c", &id.to_string(), surface)
    }

    pub fn get_label(&self, surface: &str) -> Result<Option<TokenId>> {
        self.get_token("kv_l2t", surface)
    }

    pub fn put_label(&self, surface: &str, id: TokenId) -> Result<()> {
        self.put("kv_l2t", surface, &id.to_string())
    }

    pub fn get_forward(&self, prefix: &str) -> Result<Option<String>> {
        self.get("kv_forward", prefix)
    }

    pub fn put_forward(&self, prefix: &str, encoded: &str) -> Result<()> {
        self.put("kv_forward", prefix, encoded)
    }
}
