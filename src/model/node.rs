//! Layout nodes: the engine's output, ready for a renderer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Semantic role of a flowing text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    /// Labelled section opener such as "Notes:"
    SectionHeader,
    /// Document or section title
    Title,
    /// Enumerated or bulleted item
    NumberedItem,
    /// Indented line continuing the previous item
    Continuation,
    /// Text inside the page's leading header band
    PageHeader,
    /// Regular body text
    #[default]
    Body,
}

impl TextRole {
    /// All roles, in rule-precedence order.
    pub const ALL: [TextRole; 6] = [
        TextRole::SectionHeader,
        TextRole::Title,
        TextRole::NumberedItem,
        TextRole::Continuation,
        TextRole::PageHeader,
        TextRole::Body,
    ];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextRole::SectionHeader => "section_header",
            TextRole::Title => "title",
            TextRole::NumberedItem => "numbered_item",
            TextRole::Continuation => "continuation",
            TextRole::PageHeader => "page_header",
            TextRole::Body => "body",
        }
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
}

impl Alignment {
    /// Alignment of column `index` in a row of `count` cells: first left,
    /// last right, interior centered.
    pub fn for_column(index: usize, count: usize) -> Self {
        if index == 0 {
            Alignment::Left
        } else if index + 1 == count {
            Alignment::Right
        } else {
            Alignment::Center
        }
    }
}

/// Emphasis flags carried by cells and paragraphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emphasis {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Underlined text
    pub underline: bool,

    /// Larger than body text
    pub large: bool,

    /// Drawn with a border (table cells)
    pub bordered: bool,
}

impl Emphasis {
    /// No emphasis.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Bold only.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Bold with a cell border, used for emphasized table cells.
    pub fn bordered() -> Self {
        Self {
            bold: true,
            bordered: true,
            ..Default::default()
        }
    }

    /// Default emphasis for a paragraph role.
    pub fn for_role(role: TextRole) -> Self {
        match role {
            TextRole::SectionHeader => Self {
                bold: true,
                underline: true,
                ..Default::default()
            },
            TextRole::Title => Self {
                bold: true,
                large: true,
                ..Default::default()
            },
            TextRole::PageHeader => Self::bold(),
            TextRole::NumberedItem | TextRole::Continuation | TextRole::Body => Self::plain(),
        }
    }

    /// Check if any flag is set.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.underline || self.large || self.bordered
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell text
    pub text: String,

    /// Cell alignment
    pub alignment: Alignment,

    /// Emphasis flags
    pub emphasis: Emphasis,

    /// At least one word in the cell was recognized with low confidence
    pub uncertain: bool,
}

impl TableCell {
    /// Create a plain left-aligned cell.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alignment: Alignment::Left,
            emphasis: Emphasis::plain(),
            uncertain: false,
        }
    }

    /// Set alignment and return self.
    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set emphasis and return self.
    pub fn emphasize(mut self, emphasis: Emphasis) -> Self {
        self.emphasis = emphasis;
        self
    }

    /// Mark the cell as containing low-confidence words.
    pub fn uncertain(mut self, uncertain: bool) -> Self {
        self.uncertain = uncertain;
        self
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row, left to right
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table node. Zone tables have exactly one row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a single-row table.
    pub fn single_row(cells: Vec<TableCell>) -> Self {
        Self {
            rows: vec![TableRow::new(cells)],
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A paragraph with its classified role and presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledParagraph {
    /// Paragraph text
    pub text: String,

    /// Classified role
    pub role: TextRole,

    /// Emphasis flags
    pub emphasis: Emphasis,

    /// Horizontal alignment
    pub alignment: Alignment,

    /// Left indentation in centimetres (0 = none)
    pub indent: f32,

    /// Low-confidence words to flag inline, in word order.
    ///
    /// Empty when there are none or when there are too many to show.
    pub low_confidence: Vec<String>,
}

impl StyledParagraph {
    /// Create a paragraph with the default presentation for `role`.
    pub fn new(text: impl Into<String>, role: TextRole) -> Self {
        let alignment = if role == TextRole::Title {
            Alignment::Center
        } else {
            Alignment::Left
        };
        Self {
            text: text.into(),
            role,
            emphasis: Emphasis::for_role(role),
            alignment,
            indent: 0.0,
            low_confidence: Vec::new(),
        }
    }

    /// Set indentation and return self.
    pub fn indented(mut self, indent: f32) -> Self {
        self.indent = indent;
        self
    }

    /// Set alignment and return self.
    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set emphasis and return self.
    pub fn emphasize(mut self, emphasis: Emphasis) -> Self {
        self.emphasis = emphasis;
        self
    }

    /// Attach low-confidence words and return self.
    pub fn with_low_confidence(mut self, words: Vec<String>) -> Self {
        self.low_confidence = words;
        self
    }

    /// Check if an inline low-confidence marker should be shown.
    pub fn has_marker(&self) -> bool {
        !self.low_confidence.is_empty()
    }
}

/// Kind of a notice node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// The page had no recognized text
    NoText,
    /// OCR failed for the page
    OcrFailed,
    /// Informational note
    Note,
}

/// A visible, non-content message such as "no text detected".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Kind of notice
    pub kind: NoticeKind,

    /// Message text
    pub text: String,
}

impl Notice {
    /// Placeholder for a page without recognized text.
    pub fn no_text() -> Self {
        Self {
            kind: NoticeKind::NoText,
            text: "[No text detected on this page]".to_string(),
        }
    }

    /// Error marker for a page whose OCR failed.
    pub fn ocr_failed(reason: impl AsRef<str>) -> Self {
        Self {
            kind: NoticeKind::OcrFailed,
            text: format!("[OCR error: {}]", reason.as_ref()),
        }
    }

    /// Informational note.
    pub fn note(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Note,
            text: text.into(),
        }
    }
}

/// Coarse confidence bucket used to flag pages and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// ≥ 0.90
    High,
    /// ≥ 0.75
    Medium,
    /// below 0.75
    Low,
}

impl ConfidenceLevel {
    /// Bucket a confidence score.
    pub fn from_score(score: f32) -> Self {
        if score >= 0.9 {
            ConfidenceLevel::High
        } else if score >= 0.75 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// A unit of page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutNode {
    /// A table
    Table(Table),

    /// A styled paragraph
    Paragraph(StyledParagraph),

    /// Vertical whitespace between distant zones
    Spacer,

    /// Placeholder or error marker
    Notice(Notice),

    /// The original page image
    Image {
        /// Path to the page image
        path: PathBuf,
    },

    /// Banner introducing the reconstructed text of a page
    PageBanner {
        /// 1-indexed page number
        number: u32,
        /// Total pages in the document
        total: u32,
        /// Mean OCR confidence, when known
        confidence: Option<f32>,
    },

    /// A page break marker
    PageBreak,
}

impl LayoutNode {
    /// Check if this node is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, LayoutNode::Table(_))
    }

    /// Check if this node is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, LayoutNode::Paragraph(_))
    }

    /// Get the paragraph if this node is one.
    pub fn as_paragraph(&self) -> Option<&StyledParagraph> {
        match self {
            LayoutNode::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Get the table if this node is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            LayoutNode::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Get plain text content of the node, if it has any.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            LayoutNode::Table(t) => Some(t.plain_text()),
            LayoutNode::Paragraph(p) => Some(p.text.clone()),
            LayoutNode::Notice(n) => Some(n.text.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_alignment() {
        assert_eq!(Alignment::for_column(0, 3), Alignment::Left);
        assert_eq!(Alignment::for_column(1, 3), Alignment::Center);
        assert_eq!(Alignment::for_column(2, 3), Alignment::Right);
        // A lone cell is first before it is last.
        assert_eq!(Alignment::for_column(0, 1), Alignment::Left);
    }

    #[test]
    fn test_role_emphasis() {
        let section = Emphasis::for_role(TextRole::SectionHeader);
        assert!(section.bold && section.underline);

        let title = StyledParagraph::new("INTRODUCTION", TextRole::Title);
        assert_eq!(title.alignment, Alignment::Center);
        assert!(title.emphasis.large);

        assert!(!Emphasis::for_role(TextRole::Body).has_styling());
    }

    #[test]
    fn test_table_counts() {
        let mut table = Table::single_row(vec![TableCell::text("a"), TableCell::text("b")]);
        table.add_row(TableRow::new(vec![TableCell::text("c")]));
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.plain_text(), "a\tb\nc");
    }

    #[test]
    fn test_confidence_level() {
        assert_eq!(ConfidenceLevel::from_score(0.95), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.9), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.8), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.5), ConfidenceLevel::Low);
    }

    #[test]
    fn test_node_serde_tag() {
        let node = LayoutNode::Notice(Notice::no_text());
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"notice\""));
        assert!(json.contains("\"kind\":\"no_text\""));
    }
}
