//! Disassembler (C9): Token ID sequence to Pair-Bond Map.
//!
//! A single pass over consecutive pairs. No token-specific logic —
//! disassembly is universal over any stream, anchors included.

use super::Pbm;
use crate::token_id::TokenId;

/// Disassemble a Token ID stream (anchors already prepended/appended
/// by the caller) into its Pair-Bond Map.
pub fn disassemble(stream: &[TokenId]) -> Pbm {
    let mut pbm = Pbm::default();
    for window in stream.windows(2) {
        let (a, b) = (window[0], window[1]);
        if pbm.first_fpb.is_none() {
            pbm.first_fpb = Some((a, b));
        }
        *pbm.bonds.entry((a, b)).or_insert(0) += 1;
    }
    pbm
}
