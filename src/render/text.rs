//! Plain text rendering for decoded pages.

use crate::model::Page;

/// Concatenate the text of all pages, separated by a blank line.
pub fn to_text(pages: &[Page]) -> String {
    pages
        .iter()
        .map(Page::text)
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}
