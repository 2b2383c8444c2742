//! Validator (C13): independent re-checks used by ingest/retrieve
//! round-trip tests (spec §8.1-§8.2) rather than by any runtime path —
//! nothing in `engine` calls these; they exist so the testable
//! properties have a single, shared, hand-written implementation
//! instead of being re-derived ad hoc in every test file.

use crate::pbm::Pbm;
use crate::token_id::TokenId;

/// Recount a Token ID stream's bonds independently of disassembly and
/// compare against a previously produced `Pbm`'s bond multiset.
pub fn bonds_match(a: &Pbm, b: &Pbm) -> bool {
    if a.bonds.len() != b.bonds.len() {
        return false;
    }
    a.bonds.iter().all(|(k, v)| b.bonds.get(k) == Some(v))
}

/// Disassemble `stream` fresh and compare its bonds against `stored`
/// (typically the result of `store_pbm` followed by `load_pbm`).
pub fn verify_round_trip(stream: &[TokenId], stored: &Pbm) -> bool {
    bonds_match(&crate::pbm::disassemble(stream), stored)
}

/// Lower-cased alphabetic runs, in order — the word-sequence
/// projection spec §8.1 compares reconstructed text against the
/// original on, ignoring punctuation/whitespace/case.
pub fn word_sequence(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_alphabetic() {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// True when the two texts' word sequences (per `word_sequence`) are
/// identical, regardless of whitespace placement or punctuation.
pub fn word_sequences_match(original: &str, reconstructed: &str) -> bool {
    word_sequence(original) == word_sequence(reconstructed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::Marker;
    use crate::vocab::record::{word_token_id, PartOfSpeech, WordLayer};

    #[test]
    fn bonds_match_ignores_order() {
        let a = word_token_id(WordLayer::Word, PartOfSpeech::Article as u32, 0, 0).unwrap();
        let b = word_token_id(WordLayer::Word, PartOfSpeech::Noun as u32, 0, 0).unwrap();
        let start = Marker::StreamStart.token_id();
        let end = Marker::StreamEnd.token_id();

        let stream_a = vec![start, a, b, end];
        let stream_b = vec![start, a, b, end];
        let pbm_a = crate::pbm::disassemble(&stream_a);
        let pbm_b = crate::pbm::disassemble(&stream_b);
        assert!(bonds_match(&pbm_a, &pbm_b));
    }

    #[test]
    fn verify_round_trip_detects_divergence() {
        let a = word_token_id(WordLayer::Word, PartOfSpeech::Article as u32, 0, 0).unwrap();
        let b = word_token_id(WordLayer::Word, PartOfSpeech::Noun as u32, 0, 0).unwrap();
        let start = Marker::StreamStart.token_id();
        let end = Marker::StreamEnd.token_id();

        let stream = vec![start, a, b, end];
        let stored = crate::pbm::disassemble(&[start, b, a, end]);
        assert!(!verify_round_trip(&stream, &stored));
        assert!(verify_round_trip(&stream, &crate::pbm::disassemble(&stream)));
    }

    #[test]
    fn word_sequence_ignores_case_and_punctuation() {
        assert_eq!(
            word_sequence("The cat, the CAT!"),
            vec!["the", "cat", "the", "cat"]
        );
    }

    #[test]
    fn word_sequences_match_despite_whitespace_reflow() {
        assert!(word_sequences_match(
            "The cat   sat\non the mat.",
            "The cat sat on the mat."
        ));
    }
}
