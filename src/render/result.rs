//! Rendering result with summary and statistics.

use serde::{Deserialize, Serialize};

use crate::model::{ConversionSummary, LayoutNode, PageContent, PageStatus, TextRole};

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered content (Markdown, text, etc.)
    pub content: String,

    /// Conversion summary (copied from the source document)
    pub summary: Option<ConversionSummary>,

    /// Layout statistics
    pub stats: LayoutStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, summary: Option<ConversionSummary>, stats: LayoutStats) -> Self {
        Self {
            content,
            summary,
            stats,
        }
    }

    /// Create a simple result with just content.
    pub fn content_only(content: String) -> Self {
        Self {
            content,
            summary: None,
            stats: LayoutStats::default(),
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics over a reconstructed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Total number of pages
    pub page_count: u32,

    /// Pages with a reconstructed layout
    pub reconstructed_pages: u32,

    /// Pages transcribed line by line
    pub transcribed_pages: u32,

    /// Pages kept as images (excluded or image-only mode)
    pub image_pages: u32,

    /// Pages whose OCR failed
    pub failed_pages: u32,

    /// Number of table nodes
    pub table_count: u32,

    /// Number of table cells
    pub cell_count: u32,

    /// Cells containing low-confidence words
    pub uncertain_cells: u32,

    /// Paragraphs by role
    pub titles: u32,
    /// Section headers
    pub section_headers: u32,
    /// Numbered items
    pub numbered_items: u32,
    /// Continuation lines
    pub continuations: u32,
    /// Page-header lines
    pub page_headers: u32,
    /// Body paragraphs
    pub body_paragraphs: u32,

    /// Paragraphs carrying a low-confidence marker
    pub low_confidence_markers: u32,

    /// Spacer nodes
    pub spacer_count: u32,

    /// Image nodes
    pub image_count: u32,

    /// Notice nodes
    pub notice_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl LayoutStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect statistics over pages.
    pub fn from_pages<'a>(pages: impl IntoIterator<Item = &'a PageContent>) -> Self {
        let mut stats = Self::new();
        for page in pages {
            stats.add_page(page);
        }
        stats
    }

    /// Count a page and its nodes.
    pub fn add_page(&mut self, page: &PageContent) {
        self.page_count += 1;
        match page.status {
            PageStatus::Reconstructed => self.reconstructed_pages += 1,
            PageStatus::Transcribed => self.transcribed_pages += 1,
            PageStatus::ImageOnly | PageStatus::Excluded => self.image_pages += 1,
            PageStatus::Failed { .. } => self.failed_pages += 1,
        }
        for node in &page.nodes {
            self.add_node(node);
        }
    }

    /// Count one node.
    pub fn add_node(&mut self, node: &LayoutNode) {
        match node {
            LayoutNode::Table(table) => {
                self.table_count += 1;
                for cell in table.rows.iter().flat_map(|r| r.cells.iter()) {
                    self.cell_count += 1;
                    if cell.uncertain {
                        self.uncertain_cells += 1;
                    }
                }
            }
            LayoutNode::Paragraph(para) => {
                *self.role_counter(para.role) += 1;
                if para.has_marker() {
                    self.low_confidence_markers += 1;
                }
            }
            LayoutNode::Spacer => self.spacer_count += 1,
            LayoutNode::Notice(_) => self.notice_count += 1,
            LayoutNode::Image { .. } => self.image_count += 1,
            LayoutNode::PageBanner { .. } | LayoutNode::PageBreak => {}
        }
    }

    /// Number of paragraphs with a role.
    pub fn role_count(&self, role: TextRole) -> u32 {
        match role {
            TextRole::SectionHeader => self.section_headers,
            TextRole::Title => self.titles,
            TextRole::NumberedItem => self.numbered_items,
            TextRole::Continuation => self.continuations,
            TextRole::PageHeader => self.page_headers,
            TextRole::Body => self.body_paragraphs,
        }
    }

    /// Total number of paragraphs.
    pub fn paragraph_count(&self) -> u32 {
        TextRole::ALL.iter().map(|r| self.role_count(*r)).sum()
    }

    fn role_counter(&mut self, role: TextRole) -> &mut u32 {
        match role {
            TextRole::SectionHeader => &mut self.section_headers,
            TextRole::Title => &mut self.titles,
            TextRole::NumberedItem => &mut self.numbered_items,
            TextRole::Continuation => &mut self.continuations,
            TextRole::PageHeader => &mut self.page_headers,
            TextRole::Body => &mut self.body_paragraphs,
        }
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        // Word count: whitespace-separated tokens
        self.word_count += text.split_whitespace().count() as u32;

        // Character count: non-whitespace characters
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }
}
