//! Pair-Bond Map data model (spec §3.6), disassembly (C9) and
//! reassembly (C11).

pub mod disassemble;
pub mod reassemble;

pub use disassemble::disassemble;
pub use reassemble::reassemble;

use crate::token_id::TokenId;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// A document's Pair-Bond Map: the multiset of adjacent Token ID pairs
/// plus the first-FPB seed. `IndexMap` preserves first-seen bond order,
/// which keeps disassembly deterministic for tests without implying
/// any storage-side ordering guarantee (spec §4.9's read protocol is
/// explicit that readers must not assume partition order).
#[derive(Debug, Clone, Default)]
pub struct Pbm {
    pub bonds: IndexMap<(TokenId, TokenId), u64>,
    pub first_fpb: Option<(TokenId, TokenId)>,
}

impl Pbm {
    pub fn total_pairs(&self) -> u64 {
        self.bonds.values().sum()
    }

    pub fn unique_tokens(&self) -> FxHashSet<TokenId> {
        let mut set = FxHashSet::default();
        for (a, b) in self.bonds.keys() {
            set.insert(*a);
            set.insert(*b);
        }
        set
    }

    pub fn bond_triples(&self) -> Vec<(TokenId, TokenId, u64)> {
        self.bonds
            .iter()
            .map(|(&(a, b), &c)| (a, b, c))
            .collect()
    }

    pub fn from_triples(triples: impl IntoIterator<Item = (TokenId, TokenId, u64)>) -> Self {
        let mut bonds = IndexMap::new();
        let mut first = None;
        for (a, b, c) in triples {
            if first.is_none() {
                first = Some((a, b));
            }
            *bonds.entry((a, b)).or_insert(0) += c;
        }
        Pbm {
            bonds,
            first_fpb: first,
        }
    }

    /// Override the first-FPB, e.g. with the authoritative value
    /// stored on the document record rather than whatever bond
    /// happened to arrive first out of an unordered partition union.
    pub fn with_first_fpb(mut self, fpb: (TokenId, TokenId)) -> Self {
        self.first_fpb = Some(fpb);
        self
    }
}
