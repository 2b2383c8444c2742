//! Document-address allocator (C10): atomic upsert-and-return over
//! `pbm_counters`, keyed `(ns, p2, p3) -> next_seq`.

use crate::error::Result;
use rusqlite::Connection;

/// Allocate the next monotonic sequence number for the `(ns, p2, p3)`
/// slot, starting at 0. Atomic: the insert-or-increment and the read
/// happen in the same statement via `RETURNING`.
pub fn next_sequence(conn: &Connection, ns: u32, p2: u32, p3: u32) -> Result<u32> {
    let seq: i64 = conn.query_row(
        "INSERT INTO pbm_counters (ns, p2, p3, next_seq) VALUES (?1, ?2, ?3, 0)
         ON CONFLICT(ns, p2, p3) DO UPDATE SET next_seq = next_seq + 1
         RETURNING next_seq",
        rusqlite::params![ns, p2, p3],
        |row| row.get(0),
    )?;
    Ok(seq as u32)
}

/// Split a monotonic counter into the `(hi, lo)` pair values used by
/// the flat two-pair counter addressing of names, var tokens, and
/// document ids.
pub fn split_counter(seq: u32) -> (u32, u32) {
    (seq / 2500, seq % 2500)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::ensure_schema;

    #[test]
    fn sequence_is_monotonic_per_slot() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(next_sequence(&conn, 1, 2, 3).unwrap(), 0);
        assert_eq!(next_sequence(&conn, 1, 2, 3).unwrap(), 1);
        assert_eq!(next_sequence(&conn, 1, 2, 3).unwrap(), 2);
        // a different slot starts over at 0
        assert_eq!(next_sequence(&conn, 1, 2, 4).unwrap(), 0);
    }

    #[test]
    fn split_counter_matches_2500_base() {
        assert_eq!(split_counter(0), (0, 0));
        assert_eq!(split_counter(2499), (0, 2499));
        assert_eq!(split_counter(2500), (1, 0));
    }
}
