//! PBM and vocabulary read surface (C10): document lookup, full PBM
//! reconstruction from the three bond partitions, metadata updates,
//! and the cold-storage half of vocabulary resolution (C5).

use super::address::next_sequence;
use crate::cache::ForwardWalkResult;
use crate::error::{EngineError, Result};
use crate::pbm::Pbm;
use crate::token_id::TokenId;
use crate::vocab::record::{roots, var_token_id, Category, Scope, VocabRecord};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub doc_id: TokenId,
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub first_fpb: (TokenId, TokenId),
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<DocumentRecord> {
    let doc_id_str: String = row.get("doc_id")?;
    let fpb_a: String = row.get("first_fpb_a")?;
    let fpb_b: String = row.get("first_fpb_b")?;
    let metadata_str: String = row.get("metadata")?;
    let created_at_str: String = row.get("created_at")?;

    let doc_id = doc_id_str.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(EngineError::StorageError("bad doc_id".to_string())),
        )
    })?;
    let fpb_a_id = fpb_a.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(EngineError::StorageError("bad first_fpb_a".to_string())),
        )
    })?;
    let fpb_b_id = fpb_b.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(EngineError::StorageError("bad first_fpb_b".to_string())),
        )
    })?;
    let metadata = serde_json::from_str(&metadata_str).unwrap_or(serde_json::Value::Null);
    let created_at = created_at_str
        .parse::<DateTime<Utc>>()
        .unwrap_or_else(|_| Utc::now());

    Ok(DocumentRecord {
        doc_id,
        name: row.get("name")?,
        category: row.get("category")?,
        subcategory: row.get("subcategory")?,
        first_fpb: (fpb_a_id, fpb_b_id),
        metadata,
        created_at,
    })
}

pub fn load_document(conn: &Connection, doc_id: &str) -> Result<DocumentRecord> {
    conn.query_row(
        "SELECT doc_id, name, category, subcategory, first_fpb_a, first_fpb_b, metadata, created_at
         FROM pbm_documents WHERE doc_id = ?1",
        params![doc_id],
        row_to_document,
    )
    .optional()?
    .ok_or_else(|| EngineError::UnknownDocument {
        doc_id: doc_id.to_string(),
    })
}

pub fn list_documents(conn: &Connection) -> Result<Vec<DocumentRecord>> {
    let mut stmt = conn.prepare(
        "SELECT doc_id, name, category, subcategory, first_fpb_a, first_fpb_b, metadata, created_at
         FROM pbm_documents ORDER BY doc_id",
    )?;
    let rows = stmt.query_map([], row_to_document)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn reconstruct_a_side(a_p: [Option<i64>; 5], depth: i64) -> Result<TokenId> {
    let values: Vec<u32> = a_p
        .iter()
        .take(depth as usize)
        .map(|v| v.unwrap_or(0) as u32)
        .collect();
    TokenId::new(&values)
}

pub fn load_pbm(conn: &Connection, doc: &DocumentRecord) -> Result<Pbm> {
    let doc_id_str = doc.doc_id.to_string();
    let mut triples = Vec::new();

    let mut word_stmt = conn.prepare(
        "SELECT s.a_p1, s.a_p2, s.a_p3, s.a_p4, s.a_p5, s.a_depth, b.b_p3, b.b_p4, b.b_p5, b.count
         FROM pbm_word_bonds b JOIN pbm_starters s ON s.id = b.starter_id
         WHERE s.document_id = ?1",
    )?;
    let mut rows = word_stmt.query(params![doc_id_str])?;
    while let Some(row) = rows.next()? {
        let a = reconstruct_a_side(
            [row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?],
            row.get(5)?,
        )?;
        let b_p3: i64 = row.get(6)?;
        let b_p4: i64 = row.get(7)?;
        let b_p5: i64 = row.get(8)?;
        let count: i64 = row.get(9)?;
        let b = TokenId::new(&[roots::TEXT, roots::TEXT, b_p3 as u32, b_p4 as u32, b_p5 as u32])?;
        triples.push((a, b, count as u64));
    }
    drop(rows);

    let mut marker_stmt = conn.prepare(
        "SELECT s.a_p1, s.a_p2, s.a_p3, s.a_p4, s.a_p5, s.a_depth, b.b_p3, b.b_p4, b.count
         FROM pbm_marker_bonds b JOIN pbm_starters s ON s.id = b.starter_id
         WHERE s.document_id = ?1",
    )?;
    let mut rows = marker_stmt.query(params![doc_id_str])?;
    while let Some(row) = rows.next()? {
        let a = reconstruct_a_side(
            [row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?],
            row.get(5)?,
        )?;
        let b_p3: i64 = row.get(6)?;
        let b_p4: i64 = row.get(7)?;
        let count: i64 = row.get(8)?;
        let b = TokenId::new(&[roots::UNIVERSAL, roots::SEQUENCE, b_p3 as u32, b_p4 as u32])?;
        triples.push((a, b, count as u64));
    }
    drop(rows);

    let mut char_stmt = conn.prepare(
        "SELECT s.a_p1, s.a_p2, s.a_p3, s.a_p4, s.a_p5, s.a_depth,
                b.b_p1, b.b_p2, b.b_p3, b.b_p4, b.b_p5, b.depth, b.count
         FROM pbm_char_bonds b JOIN pbm_starters s ON s.id = b.starter_id
         WHERE s.document_id = ?1",
    )?;
    let mut rows = char_stmt.query(params![doc_id_str])?;
    while let Some(row) = rows.next()? {
        let a = reconstruct_a_side(
            [row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?],
            row.get(5)?,
        )?;
        let b_p1: Option<i64> = row.get(6)?;
        let b_p2: Option<i64> = row.get(7)?;
        let b_p3: Option<i64> = row.get(8)?;
        let b_p4: Option<i64> = row.get(9)?;
        let b_p5: Option<i64> = row.get(10)?;
        let depth: i64 = row.get(11)?;
        let count: i64 = row.get(12)?;

        let b = match b_p1 {
            Some(p1) => {
                let rest = [b_p2, b_p3, b_p4, b_p5];
                let mut values = vec![p1 as u32];
                values.extend(rest.iter().take(depth as usize - 1).map(|v| v.unwrap_or(0) as u32));
                TokenId::new(&values)?
            }
            None => {
                let rest = [b_p2, b_p3, b_p4, b_p5];
                let mut values = vec![roots::UNIVERSAL];
                values.extend(rest.iter().take(depth as usize - 1).map(|v| v.unwrap_or(0) as u32));
                TokenId::new(&values)?
            }
        };
        triples.push((a, b, count as u64));
    }

    Ok(Pbm::from_triples(triples).with_first_fpb(doc.first_fpb))
}

pub fn update_metadata(
    conn: &Connection,
    doc_id: &str,
    set: &serde_json::Map<String, serde_json::Value>,
    remove: &[String],
) -> Result<(usize, usize)> {
    let current: String = conn
        .query_row(
            "SELECT metadata FROM pbm_documents WHERE doc_id = ?1",
            params![doc_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| EngineError::UnknownDocument {
            doc_id: doc_id.to_string(),
        })?;

    let mut value: serde_json::Value =
        serde_json::from_str(&current).unwrap_or_else(|_| serde_json::json!({}));
    let obj = value
        .as_object_mut()
        .ok_or_else(|| EngineError::StorageError("document metadata is not an object".to_string()))?;

    let mut set_count = 0usize;
    for (k, v) in set {
        obj.insert(k.clone(), v.clone());
        set_count += 1;
    }
    let mut removed_count = 0usize;
    for k in remove {
        if obj.remove(k).is_some() {
            removed_count += 1;
        }
    }

    conn.execute(
        "UPDATE pbm_documents SET metadata = ?1 WHERE doc_id = ?2",
        params![value.to_string(), doc_id],
    )?;

    Ok((set_count, removed_count))
}

fn parse_category(s: &str) -> Result<Category> {
    Ok(match s {
        "byte" => Category::Byte,
        "character" => Category::Character,
        "word" => Category::Word,
        "punctuation" => Category::Punctuation,
        "marker" => Category::Marker,
        "pbm_anchor" => Category::PbmAnchor,
        "document" => Category::Document,
        "var" => Category::Var,
        other => {
            return Err(EngineError::StorageError(format!(
                "unknown category {other:?}"
            )))
        }
    })
}

fn parse_scope(s: &str) -> Result<Scope> {
    Ok(match s {
        "core" => Scope::Core,
        "language" => Scope::Language,
        "names" => Scope::Names,
        "var" => Scope::Var,
        other => {
            return Err(EngineError::StorageError(format!(
                "unknown scope {other:?}"
            )))
        }
    })
}

pub fn lookup_word(conn: &Connection, surface: &str) -> Result<Option<TokenId>> {
    let row: Option<(i64, Option<i64>, Option<i64>, Option<i64>, Option<i64>, i64)> = conn
        .query_row(
            "SELECT p1, p2, p3, p4, p5, depth FROM tokens
             WHERE category = 'word' AND (surface = ?1 OR surface_lower = ?1) LIMIT 1",
            params![surface],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            },
        )
        .optional()?;
    match row {
        Some((p1, p2, p3, p4, p5, depth)) => {
            let all = [Some(p1), p2, p3, p4, p5];
            let values: Vec<u32> = all.iter().take(depth as usize).map(|v| v.unwrap_or(0) as u32).collect();
            Ok(Some(TokenId::new(&values)?))
        }
        None => Ok(None),
    }
}

pub fn lookup_char(conn: &Connection, surface: &str) -> Result<Option<TokenId>> {
    let row: Option<(i64, Option<i64>, Option<i64>, Option<i64>, Option<i64>, i64)> = conn
        .query_row(
            "SELECT p1, p2, p3, p4, p5, depth FROM tokens
             WHERE category IN ('character', 'byte') AND surface = ?1 LIMIT 1",
            params![surface],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            },
        )
        .optional()?;
    match row {
        Some((p1, p2, p3, p4, p5, depth)) => {
            let all = [Some(p1), p2, p3, p4, p5];
            let values: Vec<u32> = all.iter().take(depth as usize).map(|v| v.unwrap_or(0) as u32).collect();
            Ok(Some(TokenId::new(&values)?))
        }
        None => Ok(None),
    }
}

/// Atomically return the existing var id for `surface` or mint a new
/// one, logging `(line, column)` to `pbm_var_log` for librarian review.
pub fn mint_var(conn: &Connection, surface: &str, line: u32, column: u32) -> Result<TokenId> {
    if let Some(id) = lookup_word(conn, surface)? {
        log_var_request(conn, surface, id, line, column)?;
        return Ok(id);
    }

    let seq = next_sequence(conn, roots::TEXT, roots::TEXT, roots::VAR_PAIR3)?;
    let id = var_token_id(seq)?;

    super::schema::insert_vocab_record(
        conn,
        &VocabRecord {
            id,
            surface: surface.to_string(),
            category: Category::Var,
            subcategory: None,
            scope: Scope::Var,
        },
    )?;
    log_var_request(conn, surface, id, line, column)?;
    Ok(id)
}

fn log_var_request(conn: &Connection, surface: &str, id: TokenId, line: u32, column: u32) -> Result<()> {
    conn.execute(
        "INSERT INTO pbm_var_log (surface, token_id, line, column, logged_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![surface, id.to_string(), line, column, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Cold-storage half of the forward-walk service. Defaults to
/// `NoMatch` when `prefix` has no row in `pbm_boilerplate`, including
/// against a wholly empty boilerplate population.
pub fn forward_walk_cold(conn: &Connection, prefix: &str) -> Result<ForwardWalkResult> {
    let result: Option<String> = conn
        .query_row(
            "SELECT result FROM pbm_boilerplate WHERE prefix = ?1",
            params![prefix],
            |row| row.get(0),
        )
        .optional()?;
    Ok(match result.as_deref() {
        None => ForwardWalkResult::NoMatch,
        Some("0") => ForwardWalkResult::NoMatch,
        Some("1") => ForwardWalkResult::Partial,
        Some(other) => other
            .parse::<TokenId>()
            .map(ForwardWalkResult::Complete)
            .unwrap_or(ForwardWalkResult::NoMatch),
    })
}

/// Load the full vocabulary for hot-cache population at engine startup.
pub fn load_all_vocab(conn: &Connection) -> Result<Vec<VocabRecord>> {
    let mut stmt = conn.prepare(
        "SELECT p1, p2, p3, p4, p5, depth, surface, category, subcategory, scope FROM tokens",
    )?;
    let rows = stmt.query_map([], |row| {
        let p1: i64 = row.get(0)?;
        let p2: Option<i64> = row.get(1)?;
        let p3: Option<i64> = row.get(2)?;
        let p4: Option<i64> = row.get(3)?;
        let p5: Option<i64> = row.get(4)?;
        let depth: i64 = row.get(5)?;
        let surface: String = row.get(6)?;
        let category: String = row.get(7)?;
        let subcategory: Option<String> = row.get(8)?;
        let scope: String = row.get(9)?;
        Ok((p1, p2, p3, p4, p5, depth, surface, category, subcategory, scope))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (p1, p2, p3, p4, p5, depth, surface, category, subcategory, scope) = row?;
        let all = [Some(p1), p2, p3, p4, p5];
        let values: Vec<u32> = all.iter().take(depth as usize).map(|v| v.unwrap_or(0) as u32).collect();
        let id = TokenId::new(&values)?;
        out.push(VocabRecord {
            id,
            surface,
            category: parse_category(&category)?,
            subcategory,
            scope: parse_scope(&scope)?,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::Marker;
    use crate::storage::schema::{ensure_schema, seed_core_vocabulary};
    use crate::storage::write::store_pbm;
    use crate::vocab::record::{word_token_id, PartOfSpeech, WordLayer};

    #[test]
    fn round_trips_a_stored_pbm() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let start = Marker::StreamStart.token_id();
        let end = Marker::StreamEnd.token_id();
        let the = word_token_id(WordLayer::Word, PartOfSpeech::Article as u32, 0, 0).unwrap();
        let cat = word_token_id(WordLayer::Word, PartOfSpeech::Noun as u32, 0, 0).unwrap();
        let stream = vec![start, the, cat, the, end];
        let original = crate::pbm::disassemble(&stream);

        let doc_id = store_pbm(
            &conn,
            "the cat the",
            "fiction",
            None,
            5,
            &original,
            &serde_json::json!({"source": "test"}),
            Utc::now(),
        )
        .unwrap();

        let doc = load_document(&conn, &doc_id.to_string()).unwrap();
        assert_eq!(doc.name, "the cat the");
        let reloaded = load_pbm(&conn, &doc).unwrap();
        assert_eq!(reloaded.total_pairs(), original.total_pairs());
        for (&(a, b), &count) in &original.bonds {
            assert_eq!(reloaded.bonds.get(&(a, b)), Some(&count));
        }
    }

    #[test]
    fn update_metadata_sets_and_removes_keys() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let start = Marker::StreamStart.token_id();
        let end = Marker::StreamEnd.token_id();
        let pbm = crate::pbm::disassemble(&[start, end]);
        let doc_id = store_pbm(
            &conn,
            "empty",
            "fiction",
            None,
            5,
            &pbm,
            &serde_json::json!({"keep": 1, "drop": 2}),
            Utc::now(),
        )
        .unwrap();

        let mut set = serde_json::Map::new();
        set.insert("added".to_string(), serde_json::json!(true));
        let (set_count, removed_count) =
            update_metadata(&conn, &doc_id.to_string(), &set, &["drop".to_string()]).unwrap();
        assert_eq!(set_count, 1);
        assert_eq!(removed_count, 1);

        let doc = load_document(&conn, &doc_id.to_string()).unwrap();
        assert_eq!(doc.metadata["added"], serde_json::json!(true));
        assert_eq!(doc.metadata["keep"], serde_json::json!(1));
        assert!(doc.metadata.get("drop").is_none());
    }

    #[test]
    fn mint_var_is_idempotent_per_surface() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        seed_core_vocabulary(&conn).unwrap();

        let first = mint_var(&conn, "zorblatt", 1, 1).unwrap();
        let second = mint_var(&conn, "zorblatt", 2, 2).unwrap();
        assert_eq!(first, second);

        let log_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM pbm_var_log", [], |r| r.get(0))
            .unwrap();
        assert_eq!(log_count, 2);
    }

    #[test]
    fn forward_walk_cold_defaults_to_no_match() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(
            forward_walk_cold(&conn, "the old").unwrap(),
            ForwardWalkResult::NoMatch
        );
    }

    #[test]
    fn load_all_vocab_round_trips_seeded_core() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        seed_core_vocabulary(&conn).unwrap();
        let all = load_all_vocab(&conn).unwrap();
        assert!(!all.is_empty());
        assert!(all.iter().any(|r| r.category == Category::Byte));
    }
}
