//! JSON rendering for decoded pages.

use serde::Serialize;

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a page, a list of pages or any other model value to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Line, Page, Word};

    fn page() -> Page {
        let mut page = Page::new(BoundingBox::new(0.0, 0.0, 100.0, 50.0));
        page.id = Some("page_1".to_string());
        let mut line = Line::new(BoundingBox::new(0.0, 0.0, 100.0, 10.0));
        line.add_word(Word::new("Hello", BoundingBox::new(0.0, 0.0, 40.0, 10.0)));
        page.add_line(line);
        page
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&page(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"page_1\""));
        assert!(json.contains("Hello"));
        assert!(json.contains('\n')); // Pretty has newlines
    }

    #[test]
    fn test_to_json_compact() {
        let pages = vec![page(), page()];
        let json = to_json(&pages, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n')); // Compact has no newlines
        assert!(json.starts_with('['));
    }

    #[test]
    fn test_json_roundtrip() {
        let json = to_json(&page(), JsonFormat::Compact).unwrap();
        let back: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(back, page());
    }
}
