//! PBM write protocol (C10): allocate a document address, insert the
//! document row, intern A-side starters, and bulk-insert bonds into
//! the partition their B-side namespace routes them to.

use super::address::{next_sequence, split_counter};
use super::{classify_b_side, BondPartition};
use crate::error::{EngineError, Result};
use crate::pbm::Pbm;
use crate::token_id::TokenId;
use crate::vocab::record::{document_token_id, roots};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use rustc_hash::FxHashMap;

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn intern_starter(conn: &Connection, document_id: &str, a: TokenId) -> Result<i64> {
    let v = a.values();
    let p: Vec<Option<i64>> = (0..5).map(|i| v.get(i).map(|&x| x as i64)).collect();
    conn.execute(
        "INSERT OR IGNORE INTO pbm_starters (document_id, a_p1, a_p2, a_p3, a_p4, a_p5, a_depth)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![document_id, p[0], p[1], p[2], p[3], p[4], a.depth() as i64],
    )?;
    let id: i64 = conn.query_row(
        "SELECT id FROM pbm_starters
         WHERE document_id = ?1 AND a_p1 IS ?2 AND a_p2 IS ?3 AND a_p3 IS ?4 AND a_p4 IS ?5 AND a_p5 IS ?6",
        params![document_id, p[0], p[1], p[2], p[3], p[4]],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn insert_bond(conn: &Connection, starter_id: i64, b: TokenId, count: u64) -> Result<()> {
    match classify_b_side(b) {
        BondPartition::Word => {
            conn.execute(
                "INSERT INTO pbm_word_bonds (starter_id, b_p3, b_p4, b_p5, count)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(starter_id, b_p3, b_p4, b_p5) DO UPDATE SET count = count + excluded.count",
                params![
                    starter_id,
                    b.pair(2).unwrap_or(0) as i64,
                    b.pair(3).unwrap_or(0) as i64,
                    b.pair(4).unwrap_or(0) as i64,
                    count as i64
                ],
            )?;
        }
        BondPartition::Marker => {
            conn.execute(
                "INSERT INTO pbm_marker_bonds (starter_id, b_p3, b_p4, count)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(starter_id, b_p3, b_p4) DO UPDATE SET count = count + excluded.count",
                params![
                    starter_id,
                    b.pair(2).unwrap_or(0) as i64,
                    b.pair(3).unwrap_or(0) as i64,
                    count as i64
                ],
            )?;
        }
        partition @ (BondPartition::CharImplied | BondPartition::Fallback) => {
            let values = b.values();
            let p1 = if partition == BondPartition::Fallback {
                values.first().map(|&v| v as i64)
            } else {
                None
            };
            let p2 = values.get(1).map(|&v| v as i64);
            let p3 = values.get(2).map(|&v| v as i64);
            let p4 = values.get(3).map(|&v| v as i64);
            let p5 = values.get(4).map(|&v| v as i64);
            conn.execute(
                "INSERT INTO pbm_char_bonds (starter_id, b_p1, b_p2, b_p3, b_p4, b_p5, depth, count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(starter_id, b_p1, b_p2, b_p3, b_p4, b_p5)
                 DO UPDATE SET count = count + excluded.count",
                params![starter_id, p1, p2, p3, p4, p5, b.depth() as i64, count as i64],
            )?;
        }
    }
    Ok(())
}

/// Allocate a document address and persist its PBM atomically. On
/// success returns the allocated document Token ID.
pub fn store_pbm(
    conn: &Connection,
    name: &str,
    category: &str,
    subcategory: Option<&str>,
    century: u32,
    pbm: &Pbm,
    metadata: &serde_json::Value,
    created_at: DateTime<Utc>,
) -> Result<TokenId> {
    conn.execute_batch("BEGIN IMMEDIATE")?;

    let result = (|| -> Result<TokenId> {
        let seq = next_sequence(conn, roots::SOURCE_PBM, roots::TEXT, century)?;
        let (hi, lo) = split_counter(seq);
        let doc_id = document_token_id(century, hi, lo)?;
        let doc_id_str = doc_id.to_string();

        let (fpb_a, fpb_b) = pbm.first_fpb.ok_or_else(|| {
            EngineError::MalformedRequest("pbm has no first_fpb to persist".to_string())
        })?;

        let insert = conn.execute(
            "INSERT INTO pbm_documents
                (p1, p2, p3, p4, p5, doc_id, name, category, subcategory, first_fpb_a, first_fpb_b, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                doc_id.pair(0).unwrap() as i64,
                doc_id.pair(1).unwrap() as i64,
                doc_id.pair(2).unwrap() as i64,
                doc_id.pair(3).unwrap() as i64,
                doc_id.pair(4).unwrap() as i64,
                doc_id_str,
                name,
                category,
                subcategory,
                fpb_a.to_string(),
                fpb_b.to_string(),
                metadata.to_string(),
                created_at.to_rfc3339(),
            ],
        );
        insert.map_err(|e| {
            if is_unique_violation(&e) {
                EngineError::DuplicateDocumentAddress {
                    address: doc_id_str.clone(),
                }
            } else {
                EngineError::from(e)
            }
        })?;

        let mut starter_ids: FxHashMap<TokenId, i64> = FxHashMap::default();
        for (&(a, b), &count) in &pbm.bonds {
            let starter_id = match starter_ids.get(&a) {
                Some(&id) => id,
                None => {
                    let id = intern_starter(conn, &doc_id_str, a)?;
                    starter_ids.insert(a, id);
                    id
                }
            };
            insert_bond(conn, starter_id, b, count)?;
        }

        Ok(doc_id)
    })();

    match result {
        Ok(doc_id) => {
            conn.execute_batch("COMMIT")?;
            Ok(doc_id)
        }
        Err(err) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::Marker;
    use crate::storage::schema::ensure_schema;
    use crate::vocab::record::{word_token_id, PartOfSpeech, WordLayer};

    #[test]
    fn stores_document_and_bonds() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let start = Marker::StreamStart.token_id();
        let end = Marker::StreamEnd.token_id();
        let the = word_token_id(WordLayer::Word, PartOfSpeech::Article as u32, 0, 0).unwrap();
        let cat = word_token_id(WordLayer::Word, PartOfSpeech::Noun as u32, 0, 0).unwrap();
        let stream = vec![start, the, cat, the, end];
        let pbm = crate::pbm::disassemble(&stream);

        let doc_id = store_pbm(
            &conn,
            "the cat the",
            "fiction",
            None,
            0,
            &pbm,
            &serde_json::json!({}),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(doc_id.depth(), 5);
        let starters: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pbm_starters WHERE document_id = ?1",
                params![doc_id.to_string()],
                |r| r.get(0),
            )
            .unwrap();
        assert!(starters >= 2);
    }
}
