//! Spacing reconstructor (C12): rebuild whitespace between adjacent
//! tokens from a rule table keyed on category/surface, not stored
//! position data.

use crate::token_id::TokenId;
use crate::vocab::record::Category;

const NO_SPACE_BEFORE: &[&str] = &[",", ".", ";", ":", "!", "?", ")", "]", "}"];
const NO_SPACE_AFTER: &[&str] = &["(", "[", "{"];

/// Curated Unicode quote/bracket surfaces that behave like their ASCII
/// counterparts for spacing purposes.
const NO_SPACE_BEFORE_UNICODE: &[&str] = &["\u{2019}", "\u{201D}"]; // right single/double quote
const NO_SPACE_AFTER_UNICODE: &[&str] = &["\u{2018}", "\u{201C}"]; // left single/double quote

fn suppresses_space_before(surface: &str) -> bool {
    NO_SPACE_BEFORE.contains(&surface) || NO_SPACE_BEFORE_UNICODE.contains(&surface)
}

fn suppresses_space_after(surface: &str) -> bool {
    NO_SPACE_AFTER.contains(&surface) || NO_SPACE_AFTER_UNICODE.contains(&surface)
}

fn is_structural_whitespace(surface: &str) -> bool {
    matches!(surface, "\n" | "\r" | "\t")
}

/// A single resolved-id-plus-metadata view the reconstructor needs.
/// Engine callers supply a closure resolving id -> (surface, category).
pub fn reconstruct<F>(sequence: &[TokenId], lookup: F) -> String
where
    F: Fn(TokenId) -> (String, Category),
{
    let mut out = String::new();
    let mut prev: Option<(TokenId, String, Category)> = None;

    for &id in sequence {
        let (surface, category) = lookup(id);

        if let Some((_, prev_surface, prev_category)) = &prev {
            if is_structural_whitespace(&surface) || is_structural_whitespace(prev_surface) {
                // structural whitespace renders directly, never padded
            } else if category == Category::PbmAnchor || *prev_category == Category::PbmAnchor {
                // anchors suppress spacing on both sides
            } else if category == Category::Character && *prev_category == Category::Character {
                // adjacent single characters (sic runs, punctuation runs) render contiguously
            } else if suppresses_space_before(&surface) {
                // no space before closing punctuation
            } else if suppresses_space_after(prev_surface) {
                // no space after opening brackets/quotes
            } else {
                out.push(' ');
            }
        }

        out.push_str(&surface);
        prev = Some((id, surface, category));
    }

    out
}
