//! JSON serialisation of layout trees.
//!
//! The output mirrors the model: an optional `summary`, then `pages`, each
//! with its `status` and tagged `nodes`.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{ConversionSummary, Document, PageContent};

use super::RenderOptions;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented, one field per line
    #[default]
    Pretty,
    /// Single line
    Compact,
}

/// A document view restricted to the selected pages.
#[derive(Serialize)]
struct SelectedPages<'a> {
    summary: Option<&'a ConversionSummary>,
    pages: Vec<&'a PageContent>,
}

/// Serialise a whole document.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    encode(doc, format)
}

/// Serialise only the pages selected by `options.page_selection`.
pub fn to_json_with_options(
    doc: &Document,
    format: JsonFormat,
    options: &RenderOptions,
) -> Result<String> {
    let view = SelectedPages {
        summary: doc.summary.as_ref(),
        pages: doc
            .pages
            .iter()
            .filter(|page| options.includes(page.number))
            .collect(),
    };
    encode(&view, format)
}

fn encode<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    }
    .map_err(|e| Error::Render(format!("could not serialise layout tree: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LayoutNode, PageStatus, StyledParagraph, TextRole};
    use crate::pages::PageSet;

    fn three_pages() -> Document {
        let mut doc = Document::new();
        doc.summary = Some(ConversionSummary::new("scan.tif", 3));
        for number in 1..=3 {
            let mut page = PageContent::new(number, PageStatus::Reconstructed);
            page.push(LayoutNode::Paragraph(StyledParagraph::new(
                format!("page {}", number),
                TextRole::Body,
            )));
            doc.add_page(page);
        }
        doc
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&three_pages(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"source_name\": \"scan.tif\""));
        assert!(json.contains("\"type\": \"paragraph\""));
        assert!(json.contains("\"role\": \"body\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let mut doc = Document::new();
        doc.add_page(PageContent::new(1, PageStatus::Excluded));

        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"status\":\"excluded\""));
    }

    #[test]
    fn test_to_json_selected_pages() {
        let options = RenderOptions::new().with_pages(PageSet::parse("2-3"));
        let json = to_json_with_options(&three_pages(), JsonFormat::Compact, &options).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let pages = value["pages"].as_array().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0]["number"], 2);
        assert_eq!(value["summary"]["total_pages"], 3);
    }
}
