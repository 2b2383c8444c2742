//! Integration tests for PBM storage (C10): schema, address
//! allocation, write/read round-trips, and the persisted-bond
//! invariants of spec §8.1.

use chrono::Utc;
use pairbond::markers::Marker;
use pairbond::pbm::disassemble;
use pairbond::storage::address::next_sequence;
use pairbond::storage::schema::{ensure_schema, seed_core_vocabulary};
use pairbond::storage::{read, write};
use pairbond::vocab::record::{roots, word_token_id, PartOfSpeech, WordLayer};
use rusqlite::Connection;

fn open_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    ensure_schema(&conn).unwrap();
    seed_core_vocabulary(&conn).unwrap();
    conn
}

fn word(n: u32) -> pairbond::TokenId {
    word_token_id(WordLayer::Word, PartOfSpeech::Noun as u32, 0, n).unwrap()
}

#[test]
fn store_and_load_pbm_round_trips_bond_multiset() {
    let conn = open_db();

    let start = Marker::StreamStart.token_id();
    let end = Marker::StreamEnd.token_id();
    let the = word(0);
    let cat = word(1);
    let stream = vec![start, the, cat, the, end];
    let original = disassemble(&stream);

    let doc_id = write::store_pbm(
        &conn,
        "the cat the",
        "fiction",
        None,
        10,
        &original,
        &serde_json::json!({"source": "unit-test"}),
        Utc::now(),
    )
    .unwrap();

    let doc = read::load_document(&conn, &doc_id.to_string()).unwrap();
    let reloaded = read::load_pbm(&conn, &doc).unwrap();

    assert_eq!(reloaded.total_pairs(), original.total_pairs());
    let original_set: std::collections::HashSet<_> = original.bond_triples().into_iter().collect();
    let reloaded_set: std::collections::HashSet<_> = reloaded.bond_triples().into_iter().collect();
    assert_eq!(original_set, reloaded_set);
}

#[test]
fn document_address_counter_is_monotonic_per_slot() {
    let conn = open_db();
    let start = Marker::StreamStart.token_id();
    let end = Marker::StreamEnd.token_id();
    let pbm = disassemble(&[start, word(0), end]);

    let first = write::store_pbm(&conn, "a", "fiction", None, 5, &pbm, &serde_json::json!({}), Utc::now()).unwrap();
    let second = write::store_pbm(&conn, "b", "fiction", None, 5, &pbm, &serde_json::json!({}), Utc::now()).unwrap();
    assert_ne!(first, second);
    assert!(first < second);
}

#[test]
fn next_sequence_is_independent_per_namespace_slot() {
    let conn = open_db();
    assert_eq!(next_sequence(&conn, roots::SOURCE_PBM, roots::TEXT, 1).unwrap(), 0);
    assert_eq!(next_sequence(&conn, roots::SOURCE_PBM, roots::TEXT, 1).unwrap(), 1);
    assert_eq!(next_sequence(&conn, roots::SOURCE_PBM, roots::TEXT, 2).unwrap(), 0);
}

#[test]
fn every_bond_a_side_is_interned_exactly_once_as_a_starter() {
    let conn = open_db();
    let start = Marker::StreamStart.token_id();
    let end = Marker::StreamEnd.token_id();
    let the = word(0);
    let cat = word(1);
    let sat = word(2);
    // "the cat the sat" -- "the" recurs as an A-side starter.
    let stream = vec![start, the, cat, the, sat, end];
    let pbm = disassemble(&stream);

    let doc_id = write::store_pbm(&conn, "doc", "fiction", None, 5, &pbm, &serde_json::json!({}), Utc::now()).unwrap();

    let starter_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pbm_starters WHERE document_id = ?1",
            rusqlite::params![doc_id.to_string()],
            |r| r.get(0),
        )
        .unwrap();
    let distinct_a_sides = pbm.bonds.keys().map(|&(a, _)| a).collect::<std::collections::HashSet<_>>().len();
    assert_eq!(starter_count as usize, distinct_a_sides);
}

#[test]
fn update_metadata_persists_across_reload() {
    let conn = open_db();
    let start = Marker::StreamStart.token_id();
    let end = Marker::StreamEnd.token_id();
    let pbm = disassemble(&[start, end]);
    let doc_id = write::store_pbm(
        &conn,
        "doc",
        "fiction",
        None,
        5,
        &pbm,
        &serde_json::json!({"a": 1}),
        Utc::now(),
    )
    .unwrap();

    let mut set = serde_json::Map::new();
    set.insert("b".to_string(), serde_json::json!("two"));
    read::update_metadata(&conn, &doc_id.to_string(), &set, &["a".to_string()]).unwrap();

    let doc = read::load_document(&conn, &doc_id.to_string()).unwrap();
    assert_eq!(doc.metadata["b"], serde_json::json!("two"));
    assert!(doc.metadata.get("a").is_none());
}

#[test]
fn unknown_document_lookup_errors() {
    let conn = open_db();
    let err = read::load_document(&conn, "zz.zz.zz.zz.zz").unwrap_err();
    assert!(matches!(err, pairbond::EngineError::UnknownDocument { .. }));
}
