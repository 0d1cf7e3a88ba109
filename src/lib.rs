//! # unscan
//!
//! Layout reconstruction for OCR'd scanned documents.
//!
//! This library takes the structured output of an OCR service (paragraphs
//! with bounding boxes, block types and per-word confidence) and rebuilds
//! the visual layout of each page: tables from horizontally aligned text,
//! titles and section headers from vocabulary rules, indentation and
//! emphasis, and inline markers for words the OCR was unsure about.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unscan::{convert_files, render};
//!
//! fn main() -> unscan::Result<()> {
//!     // One stored OCR response per page, in page order
//!     let doc = convert_files(&["page-001.json", "page-002.json"])?;
//!
//!     // Render to Markdown
//!     let options = render::RenderOptions::default();
//!     let markdown = render::to_markdown(&doc, &options)?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Table reconstruction**: aligned text on one visual row becomes a table row
//! - **Role classification**: titles, section headers, numbered items, continuations
//! - **Data-driven vocabulary**: role and emphasis rules load from JSON
//! - **Confidence markers**: low-confidence words are flagged inline
//! - **Parallel processing**: pages are reconstructed concurrently with Rayon
//! - **Multiple output formats**: Markdown, plain text, JSON

pub mod convert;
pub mod error;
pub mod layout;
pub mod model;
pub mod ocr;
pub mod pages;
pub mod render;

// Re-export commonly used types
pub use convert::{ConvertOptions, Converter, OutputMode, PageInput, ProgressEvent};
pub use error::{Error, Result};
pub use layout::{LayoutEngine, LayoutOptions, RuleSet};
pub use model::{
    Alignment, ConfidenceLevel, ConversionSummary, Document, Emphasis, LayoutNode, Page,
    PageContent, PageStatus, Paragraph, StyledParagraph, Table, TableCell, TableRow, TextRole,
};
pub use ocr::{OcrProvider, RawPage, VisionFileProvider};
pub use pages::PageSet;
pub use render::{JsonFormat, LayoutStats, RenderOptions, RenderResult};

use std::path::{Path, PathBuf};

/// Reconstruct the layout of one raw OCR page with the default engine.
///
/// # Example
///
/// ```
/// use unscan::model::BlockTag;
/// use unscan::ocr::{RawBlock, RawPage, RawParagraph};
///
/// let raw = RawPage::new(1000.0, 1000.0).with_block(
///     RawBlock::new(BlockTag::Table)
///         .with_paragraph(RawParagraph::rect(50.0, 300.0, 150.0, 320.0).with_text("REF", 0.99))
///         .with_paragraph(RawParagraph::rect(400.0, 301.0, 500.0, 320.0).with_text("A-12", 0.99)),
/// );
///
/// let nodes = unscan::reconstruct(&raw)?;
/// assert!(nodes[0].is_table());
/// # Ok::<(), unscan::Error>(())
/// ```
pub fn reconstruct(raw: &RawPage) -> Result<Vec<LayoutNode>> {
    let engine = LayoutEngine::new()?;
    Ok(engine.reconstruct_raw(raw))
}

/// Convert stored OCR responses, one file per page, into a document.
///
/// # Example
///
/// ```no_run
/// use unscan::convert_files;
///
/// let doc = convert_files(&["page-001.json"]).unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn convert_files<P: AsRef<Path>>(paths: &[P]) -> Result<Document> {
    Ok(Unscan::new().convert_files(paths)?.document)
}

/// Convert stored OCR responses to Markdown.
///
/// # Example
///
/// ```no_run
/// use unscan::to_markdown;
///
/// let markdown = to_markdown(&["page-001.json", "page-002.json"]).unwrap();
/// std::fs::write("output.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(paths: &[P]) -> Result<String> {
    let doc = convert_files(paths)?;
    render::to_markdown(&doc, &RenderOptions::default())
}

/// Convert stored OCR responses to plain text.
pub fn to_text<P: AsRef<Path>>(paths: &[P], options: &RenderOptions) -> Result<String> {
    let doc = convert_files(paths)?;
    render::to_text(&doc, options)
}

/// Convert stored OCR responses to JSON.
pub fn to_json<P: AsRef<Path>>(paths: &[P], format: JsonFormat) -> Result<String> {
    let doc = convert_files(paths)?;
    render::to_json(&doc, format)
}

/// Builder for converting OCR'd pages into documents.
///
/// # Example
///
/// ```no_run
/// use unscan::{OutputMode, PageSet, Unscan};
///
/// let markdown = Unscan::new()
///     .with_source_name("inspection.tif")
///     .with_mode(OutputMode::Layout)
///     .exclude(PageSet::parse("1-2"))
///     .with_image_dir("./scans")
///     .with_image_prefix("./images/")
///     .convert_files(&["p1.json", "p2.json", "p3.json"])?
///     .to_markdown()?;
/// # Ok::<(), unscan::Error>(())
/// ```
pub struct Unscan {
    convert_options: ConvertOptions,
    render_options: RenderOptions,
    image_dir: Option<PathBuf>,
}

impl Unscan {
    /// Create a new Unscan builder.
    pub fn new() -> Self {
        Self {
            convert_options: ConvertOptions::default(),
            render_options: RenderOptions::default(),
            image_dir: None,
        }
    }

    /// Set the output mode.
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.convert_options = self.convert_options.with_mode(mode);
        self
    }

    /// Keep the given pages as images, without OCR.
    pub fn exclude(mut self, pages: PageSet) -> Self {
        self.convert_options = self.convert_options.with_excluded(pages);
        self
    }

    /// Set the source name shown in the summary.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.convert_options = self.convert_options.with_source_name(name);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.convert_options = self.convert_options.sequential();
        self
    }

    /// Set the role and emphasis rules.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.convert_options = self.convert_options.with_rules(rules);
        self
    }

    /// Set the layout thresholds.
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.convert_options = self.convert_options.with_layout(layout);
        self
    }

    /// Attach `<dir>/<stem>.png` as the image of each page.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    /// Set the image path prefix used in rendered output.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_image_prefix(prefix);
        self
    }

    /// Hide low-confidence markers in rendered output.
    pub fn without_confidence_markers(mut self) -> Self {
        self.render_options = self.render_options.with_confidence_markers(false);
        self
    }

    /// Set the pages to render.
    pub fn with_pages(mut self, pages: PageSet) -> Self {
        self.render_options = self.render_options.with_pages(pages);
        self
    }

    /// Convert stored OCR response files, one per page in page order.
    pub fn convert_files<P: AsRef<Path>>(self, paths: &[P]) -> Result<UnscanResult> {
        let converter = Converter::new(self.convert_options.clone())?;
        let sources: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        let mut inputs = converter.recognize_all(&VisionFileProvider::new(), &sources);

        if let Some(ref dir) = self.image_dir {
            for (input, source) in inputs.iter_mut().zip(&sources) {
                input.image = Some(image_for(dir, source));
            }
        }

        Ok(UnscanResult {
            document: converter.convert(inputs),
            render_options: self.render_options,
        })
    }

    /// Convert pages that were recognized elsewhere.
    pub fn convert_pages(self, inputs: Vec<PageInput>) -> Result<UnscanResult> {
        let converter = Converter::new(self.convert_options)?;
        Ok(UnscanResult {
            document: converter.convert(inputs),
            render_options: self.render_options,
        })
    }
}

impl Default for Unscan {
    fn default() -> Self {
        Self::new()
    }
}

/// Image path for a page source: `<dir>/<source stem>.png`.
pub fn image_for(dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(format!("{}.png", stem))
}

/// Result of converting a document.
pub struct UnscanResult {
    /// The converted document
    pub document: Document,

    /// Render options to use
    render_options: RenderOptions,
}

impl UnscanResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to Markdown with layout statistics.
    pub fn to_markdown_with_stats(&self) -> Result<RenderResult> {
        render::to_markdown_with_stats(&self.document, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json_with_options(&self.document, format, &self.render_options)
    }

    /// Collect layout statistics without rendering.
    pub fn stats(&self) -> LayoutStats {
        LayoutStats::from_pages(&self.document.pages)
    }

    /// Get plain text of all pages.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get plain text of a single page.
    pub fn page_text(&self, page_num: u32) -> Result<String> {
        self.document
            .get_page(page_num)
            .map(|page| page.plain_text())
            .ok_or_else(|| Error::PageOutOfRange(page_num, self.document.page_count()))
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Word};

    fn body_page(text: &str) -> Page {
        let para = Paragraph::new(
            vec![Word::new(text, 0.99)],
            BoundingBox::new(100.0, 400.0, 300.0, 20.0),
            1000.0,
            1000.0,
        );
        Page::from_paragraphs(1000.0, 1000.0, vec![para]).with_confidence(0.99)
    }

    #[test]
    fn test_unscan_builder() {
        let unscan = Unscan::new()
            .with_mode(OutputMode::Lines)
            .exclude(PageSet::parse("2"))
            .sequential()
            .without_confidence_markers();
        assert_eq!(unscan.convert_options.mode, OutputMode::Lines);
        assert!(unscan.convert_options.excluded.contains(2));
        assert!(!unscan.convert_options.parallel);
        assert!(!unscan.render_options.show_confidence_markers);
    }

    #[test]
    fn test_unscan_builder_default() {
        let builder = Unscan::default();
        assert_eq!(builder.convert_options.mode, OutputMode::Layout);
        assert!(builder.image_dir.is_none());
        assert!(builder.render_options.page_selection.is_none());
    }

    #[test]
    fn test_image_for() {
        let path = image_for(Path::new("/scans"), Path::new("/ocr/page-007.json"));
        assert_eq!(path, PathBuf::from("/scans/page-007.png"));
    }

    #[test]
    fn test_convert_pages() {
        let result = Unscan::new()
            .with_source_name("scan.tif")
            .convert_pages(vec![PageInput::recognized(1, body_page("hello"))])
            .unwrap();

        assert_eq!(result.document().page_count(), 1);
        assert!(result.plain_text().contains("hello"));

        let markdown = result.to_markdown().unwrap();
        assert!(markdown.contains("CONVERTED DOCUMENT"));
        assert!(markdown.contains("hello"));

        let stats = result.stats();
        assert_eq!(stats.reconstructed_pages, 1);

        assert!(result.page_text(1).unwrap().contains("hello"));
        assert!(matches!(
            result.page_text(3),
            Err(Error::PageOutOfRange(3, 1))
        ));
    }

    #[test]
    fn test_convert_files_missing_file_is_failed_page() {
        let result = Unscan::new()
            .convert_files(&["/nonexistent/page-001.json"])
            .unwrap();
        let page = result.document().get_page(1).unwrap();
        assert!(matches!(page.status, PageStatus::Failed { .. }));
    }

    #[test]
    fn test_reconstruct_empty_page() {
        let nodes = reconstruct(&RawPage::new(1000.0, 1000.0)).unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(matches!(nodes[0], LayoutNode::Notice(_)));
    }
}
