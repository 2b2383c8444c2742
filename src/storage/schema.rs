//! Relational schema (C10 + C3) and core-vocabulary seeding.
//!
//! A single SQLite database carries both the cold vocabulary store
//! (`tokens`, `scopes`) and the PBM partition tables, per
//! SPEC_FULL.md §4.9.1. Column order in the `pbm_*` tables is a
//! compatibility surface (spec §6.3) and must not be reordered.

use crate::byte_table::byte_table;
use crate::error::Result;
use crate::markers::ALL_MARKERS;
use crate::vocab::record::{byte_token_id, char_token_id, CharGroup, Category, Scope, VocabRecord};
use rusqlite::Connection;

pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS scopes (
            name TEXT PRIMARY KEY,
            description TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tokens (
            p1 INTEGER NOT NULL,
            p2 INTEGER,
            p3 INTEGER,
            p4 INTEGER,
            p5 INTEGER,
            depth INTEGER NOT NULL,
            surface TEXT NOT NULL,
            surface_lower TEXT,
            category TEXT NOT NULL,
            subcategory TEXT,
            scope TEXT NOT NULL,
            PRIMARY KEY (p1, p2, p3, p4, p5)
        );
        CREATE INDEX IF NOT EXISTS idx_tokens_surface ON tokens(surface);
        CREATE INDEX IF NOT EXISTS idx_tokens_surface_lower ON tokens(surface_lower);

        CREATE TABLE IF NOT EXISTS pbm_counters (
            ns INTEGER NOT NULL,
            p2 INTEGER NOT NULL,
            p3 INTEGER NOT NULL,
            next_seq INTEGER NOT NULL,
            PRIMARY KEY (ns, p2, p3)
        );

        CREATE TABLE IF NOT EXISTS pbm_documents (
            p1 INTEGER NOT NULL,
            p2 INTEGER NOT NULL,
            p3 INTEGER NOT NULL,
            p4 INTEGER NOT NULL,
            p5 INTEGER NOT NULL,
            doc_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            subcategory TEXT,
            first_fpb_a TEXT NOT NULL,
            first_fpb_b TEXT NOT NULL,
            metadata TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (p1, p2, p3, p4, p5)
        );

        CREATE TABLE IF NOT EXISTS pbm_starters (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            document_id TEXT NOT NULL,
            a_p1 INTEGER NOT NULL,
            a_p2 INTEGER,
            a_p3 INTEGER,
            a_p4 INTEGER,
            a_p5 INTEGER,
            a_depth INTEGER NOT NULL,
            UNIQUE (document_id, a_p1, a_p2, a_p3, a_p4, a_p5)
        );

        CREATE TABLE IF NOT EXISTS pbm_word_bonds (
            starter_id INTEGER NOT NULL,
            b_p3 INTEGER NOT NULL,
            b_p4 INTEGER NOT NULL,
            b_p5 INTEGER NOT NULL,
            count INTEGER NOT NULL,
            PRIMARY KEY (starter_id, b_p3, b_p4, b_p5)
        );

        CREATE TABLE IF NOT EXISTS pbm_char_bonds (
            starter_id INTEGER NOT NULL,
            b_p1 INTEGER,
            b_p2 INTEGER,
            b_p3 INTEGER,
            b_p4 INTEGER,
            b_p5 INTEGER,
            depth INTEGER NOT NULL,
            count INTEGER NOT NULL,
            PRIMARY KEY (starter_id, b_p1, b_p2, b_p3, b_p4, b_p5)
        );

        CREATE TABLE IF NOT EXISTS pbm_marker_bonds (
            starter_id INTEGER NOT NULL,
            b_p3 INTEGER NOT NULL,
            b_p4 INTEGER NOT NULL,
            count INTEGER NOT NULL,
            PRIMARY KEY (starter_id, b_p3, b_p4)
        );

        CREATE TABLE IF NOT EXISTS pbm_var_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            surface TEXT NOT NULL,
            token_id TEXT NOT NULL,
            line INTEGER NOT NULL,
            column INTEGER NOT NULL,
            logged_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pbm_boilerplate (
            prefix TEXT PRIMARY KEY,
            result TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

pub fn insert_vocab_record(conn: &Connection, rec: &VocabRecord) -> Result<()> {
    let values = rec.id.values();
    let pairs: Vec<Option<i64>> = (0..5)
        .map(|i| values.get(i).map(|&v| v as i64))
        .collect();
    conn.execute(
        "INSERT OR IGNORE INTO tokens
            (p1, p2, p3, p4, p5, depth, surface, surface_lower, category, subcategory, scope)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            pairs[0],
            pairs[1],
            pairs[2],
            pairs[3],
            pairs[4],
            rec.id.depth() as i64,
            rec.surface,
            rec.surface.to_lowercase(),
            rec.category.as_str(),
            rec.subcategory,
            rec.scope.as_str(),
        ],
    )?;
    Ok(())
}

/// Printable ASCII plus a curated Unicode set (smart quotes, em/en
/// dash, ellipsis) the scanner and spacing reconstructor recognize.
fn curated_characters() -> Vec<(char, CharGroup)> {
    let mut v = Vec::new();
    for b in 0x20u8..=0x7Eu8 {
        let c = b as char;
        let group = if b == 0x20 {
            CharGroup::Whitespace
        } else if c.is_ascii_digit() {
            CharGroup::Digit
        } else if c.is_ascii_uppercase() {
            CharGroup::Upper
        } else if c.is_ascii_lowercase() {
            CharGroup::Lower
        } else {
            CharGroup::Punctuation
        };
        v.push((c, group));
    }
    for c in ['\n', '\t', '\r'] {
        v.push((c, CharGroup::Whitespace));
    }
    for c in ['\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2013}', '\u{2014}', '\u{2026}'] {
        v.push((c, CharGroup::Punctuation));
    }
    v
}

fn seed_bytes(conn: &Connection) -> Result<()> {
    for code in byte_table() {
        let id = byte_token_id(code.value);
        let surface = code.ascii_char.map(|c| c.to_string()).unwrap_or_default();
        insert_vocab_record(
            conn,
            &VocabRecord {
                id,
                surface,
                category: Category::Byte,
                subcategory: Some(code.name.clone()),
                scope: Scope::Core,
            },
        )?;
    }
    Ok(())
}

fn seed_characters(conn: &Connection) -> Result<()> {
    let mut control_n = 0u32;
    let mut whitespace_n = 0u32;
    let mut digit_n = 0u32;
    let mut upper_n = 0u32;
    let mut lower_n = 0u32;
    let mut punct_n = 0u32;

    for (ch, group) in curated_characters() {
        let n = match group {
            CharGroup::Control => &mut control_n,
            CharGroup::Whitespace => &mut whitespace_n,
            CharGroup::Digit => &mut digit_n,
            CharGroup::Upper => &mut upper_n,
            CharGroup::Lower => &mut lower_n,
            CharGroup::Punctuation => &mut punct_n,
        };
        let id = char_token_id(group, *n)?;
        *n += 1;
        insert_vocab_record(
            conn,
            &VocabRecord {
                id,
                surface: ch.to_string(),
                category: Category::Character,
                subcategory: None,
                scope: Scope::Core,
            },
        )?;
    }
    Ok(())
}

fn seed_markers(conn: &Connection) -> Result<()> {
    for &m in ALL_MARKERS {
        insert_vocab_record(
            conn,
            &VocabRecord {
                id: m.token_id(),
                surface: String::new(),
                category: m.category(),
                subcategory: Some(m.name().to_string()),
                scope: Scope::Core,
            },
        )?;
    }
    Ok(())
}

fn seed_scopes(conn: &Connection) -> Result<()> {
    let rows: &[(&str, &str)] = &[
        ("core", "bytes, characters, structural markers, anchors"),
        ("language", "words and phrase tokens for a language family"),
        ("names", "proper-noun atoms"),
        ("var", "mint-on-miss tokens for unresolved input"),
    ];
    for (name, description) in rows {
        conn.execute(
            "INSERT OR IGNORE INTO scopes (name, description) VALUES (?1, ?2)",
            rusqlite::params![name, description],
        )?;
    }
    Ok(())
}

/// Idempotent: seeds bytes, curated characters, structural markers,
/// and the scope reference table. Safe to call on every engine start.
pub fn seed_core_vocabulary(conn: &Connection) -> Result<()> {
    seed_scopes(conn)?;
    seed_bytes(conn)?;
    seed_characters(conn)?;
    seed_markers(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_and_seed_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        seed_core_vocabulary(&conn).unwrap();
        seed_core_vocabulary(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM tokens", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count as usize, 256 + curated_characters().len() + ALL_MARKERS.len());
    }
}
