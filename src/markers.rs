//! Structural / sequence marker registry.
//!
//! All markers live under `AA.AE.{cat}.{n}` (depth 4, spec §3.2). This
//! crate uses a single category (`cat = 0`) and assigns each marker a
//! sequential `n` — the marker population is small and fixed, so the
//! category dimension isn't needed to avoid collisions; it is kept in
//! the address shape for forward compatibility with a future marker
//! family that does need more than one category.

use crate::token_id::TokenId;
use crate::vocab::record::{roots, Category};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    DocumentStart,
    DocumentEnd,
    ParagraphStart,
    ParagraphEnd,
    ChapterBreak,
    SectionBreak,
    TitleStart,
    TitleEnd,
    LineBreak,
    ItalicStart,
    ItalicEnd,
    AllCapsStart,
    AllCapsEnd,
    SicStart,
    SicEnd,
    Tbd,
    StreamStart,
    StreamEnd,
    VarRequest,
}

pub const ALL_MARKERS: &[Marker] = &[
    Marker::DocumentStart,
    Marker::DocumentEnd,
    Marker::ParagraphStart,
    Marker::ParagraphEnd,
    Marker::ChapterBreak,
    Marker::SectionBreak,
    Marker::TitleStart,
    Marker::TitleEnd,
    Marker::LineBreak,
    Marker::ItalicStart,
    Marker::ItalicEnd,
    Marker::AllCapsStart,
    Marker::AllCapsEnd,
    Marker::SicStart,
    Marker::SicEnd,
    Marker::Tbd,
    Marker::StreamStart,
    Marker::StreamEnd,
    Marker::VarRequest,
];

impl Marker {
    fn index(self) -> u32 {
        ALL_MARKERS
            .iter()
            .position(|m| *m == self)
            .expect("marker listed in ALL_MARKERS") as u32
    }

    /// This marker's Token ID, under `AA.AE.AA.{n}`.
    pub fn token_id(self) -> TokenId {
        TokenId::new(&[roots::UNIVERSAL, roots::SEQUENCE, 0, self.index()])
            .expect("marker token id always in range")
    }

    pub fn name(self) -> &'static str {
        match self {
            Marker::DocumentStart => "document_start",
            Marker::DocumentEnd => "document_end",
            Marker::ParagraphStart => "paragraph_start",
            Marker::ParagraphEnd => "paragraph_end",
            Marker::ChapterBreak => "chapter_break",
            Marker::SectionBreak => "section_break",
            Marker::TitleStart => "title_start",
            Marker::TitleEnd => "title_end",
            Marker::LineBreak => "line_break",
            Marker::ItalicStart => "italic_start",
            Marker::ItalicEnd => "italic_end",
            Marker::AllCapsStart => "allcaps_start",
            Marker::AllCapsEnd => "allcaps_end",
            Marker::SicStart => "sic_start",
            Marker::SicEnd => "sic_end",
            Marker::Tbd => "tbd",
            Marker::StreamStart => "stream_start",
            Marker::StreamEnd => "stream_end",
            Marker::VarRequest => "var_request",
        }
    }

    /// Markers carry empty surface; the two stream anchors are tagged
    /// `pbm_anchor` (load-bearing for spacing suppression), everything
    /// else is tagged `marker`.
    pub fn category(self) -> Category {
        match self {
            Marker::StreamStart | Marker::StreamEnd => Category::PbmAnchor,
            _ => Category::Marker,
        }
    }

    pub fn by_name(name: &str) -> Option<Marker> {
        ALL_MARKERS.iter().copied().find(|m| m.name() == name)
    }
}

pub fn lookup(id: TokenId) -> Option<Marker> {
    ALL_MARKERS.iter().copied().find(|m| m.token_id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_have_distinct_ids() {
        let mut ids: Vec<_> = ALL_MARKERS.iter().map(|m| m.token_id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), ALL_MARKERS.len());
    }

    #[test]
    fn lookup_roundtrips() {
        for &m in ALL_MARKERS {
            assert_eq!(lookup(m.token_id()), Some(m));
        }
    }

    #[test]
    fn anchors_are_pbm_anchor_category() {
        assert_eq!(Marker::StreamStart.category(), Category::PbmAnchor);
        assert_eq!(Marker::StreamEnd.category(), Category::PbmAnchor);
        assert_eq!(Marker::ParagraphStart.category(), Category::Marker);
    }
}
