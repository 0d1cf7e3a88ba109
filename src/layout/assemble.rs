//! Document assembly: classified zones to layout nodes.

use crate::model::{
    Alignment, ConversionSummary, Emphasis, LayoutNode, Notice, Page, StyledParagraph, Table,
    TableCell, TableRow, TextRole,
};

use super::confidence::{has_low_confidence, paragraph_marker};
use super::roles::RoleClassifier;
use super::rows::{group_rows, Zone};
use super::zone::is_table_zone;
use super::LayoutOptions;

/// Whether a page is still inside its leading header band.
///
/// Starts true for every page and flips to false, permanently, at the first
/// zone lying below the cutoff. Create one per page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderState {
    in_header: bool,
    cutoff: f32,
}

impl HeaderState {
    /// Fresh state for a new page.
    pub fn new(cutoff: f32) -> Self {
        Self {
            in_header: true,
            cutoff,
        }
    }

    /// Record the next zone's position and return the updated state.
    pub fn observe(&mut self, y_percent: f32) -> bool {
        if y_percent > self.cutoff {
            self.in_header = false;
        }
        self.in_header
    }

    /// Check if the page is still in its header section.
    pub fn in_header_section(&self) -> bool {
        self.in_header
    }
}

/// Build the node sequence of one page.
///
/// An empty page yields a single "no text" notice.
pub fn page_nodes(page: &Page, options: &LayoutOptions, classifier: &RoleClassifier) -> Vec<LayoutNode> {
    if page.is_empty() {
        return vec![LayoutNode::Notice(Notice::no_text())];
    }

    let zones = group_rows(&page.paragraphs, options.row_threshold);
    let mut nodes = Vec::with_capacity(zones.len());
    let mut header = HeaderState::new(options.header_cutoff);
    let mut last_y = 0.0f32;

    for (index, zone) in zones.iter().enumerate() {
        let y = zone.y_percent();
        let in_header = header.observe(y);

        if index > 0 && y - last_y > options.spacer_gap {
            nodes.push(LayoutNode::Spacer);
        }

        if is_table_zone(zone) {
            nodes.push(LayoutNode::Table(table_row(zone, in_header, options, classifier)));
        } else {
            let para = zone.paragraphs[0];
            let styled = classifier
                .style(para, in_header, options)
                .with_low_confidence(paragraph_marker(para, options));
            nodes.push(LayoutNode::Paragraph(styled));
        }

        last_y = y;
    }

    log::debug!(
        "Assembled {} nodes from {} zones",
        nodes.len(),
        zones.len()
    );
    nodes
}

fn table_row(
    zone: &Zone<'_>,
    in_header: bool,
    options: &LayoutOptions,
    classifier: &RoleClassifier,
) -> Table {
    let columns = zone.columns();
    let count = columns.len();
    let cells = columns
        .iter()
        .enumerate()
        .map(|(index, para)| {
            let emphasis = if classifier.is_emphasized(para, in_header) {
                Emphasis::bordered()
            } else {
                Emphasis::plain()
            };
            TableCell::text(para.text.clone())
                .align(Alignment::for_column(index, count))
                .emphasize(emphasis)
                .uncertain(has_low_confidence(para, options.low_confidence_threshold))
        })
        .collect();
    Table::single_row(cells)
}

/// Nodes presenting conversion statistics, ending with a page break.
pub fn summary_nodes(summary: &ConversionSummary) -> Vec<LayoutNode> {
    let title = StyledParagraph::new("CONVERTED DOCUMENT", TextRole::Title);
    let subtitle = StyledParagraph::new("Scanned pages with OCR layout reconstruction", TextRole::Body)
        .align(Alignment::Center);

    let entries = [
        ("Source file", summary.source_name.clone()),
        ("Conversion date", summary.created_label()),
        ("Total pages", summary.total_pages.to_string()),
        ("Pages with OCR", summary.ocr_pages.to_string()),
        ("Pages excluded from OCR", summary.excluded_label()),
        ("Mean OCR confidence", summary.confidence_label()),
        ("Detected languages", summary.languages_label(3)),
    ];
    let mut table = Table::new();
    for (key, value) in entries {
        table.add_row(TableRow::new(vec![
            TableCell::text(key).emphasize(Emphasis::bold()),
            TableCell::text(value),
        ]));
    }

    vec![
        LayoutNode::Paragraph(title),
        LayoutNode::Paragraph(subtitle),
        LayoutNode::Spacer,
        LayoutNode::Table(table),
        LayoutNode::Spacer,
        LayoutNode::Notice(Notice::note(
            "Each page shows the original image followed by its reconstructed text.",
        )),
        LayoutNode::PageBreak,
    ]
}

/// Page nodes, preceded by the summary sequence when one is given.
pub fn assemble(
    page: &Page,
    summary: Option<&ConversionSummary>,
    options: &LayoutOptions,
    classifier: &RoleClassifier,
) -> Vec<LayoutNode> {
    let mut nodes = summary.map(summary_nodes).unwrap_or_default();
    nodes.extend(page_nodes(page, options, classifier));
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RuleSet;
    use crate::model::{BlockTag, BoundingBox, NoticeKind, Paragraph, Word};

    fn classifier() -> RoleClassifier {
        RoleClassifier::new(&RuleSet::default()).unwrap()
    }

    fn para(text: &str, x: f32, y: f32) -> Paragraph {
        Paragraph::from_text(text, BoundingBox::new(x, y, 5.0, 1.0), 100.0, 100.0)
    }

    fn nodes_for(paragraphs: Vec<Paragraph>) -> Vec<LayoutNode> {
        let page = Page::from_paragraphs(100.0, 100.0, paragraphs);
        page_nodes(&page, &LayoutOptions::default(), &classifier())
    }

    #[test]
    fn test_header_state() {
        let mut state = HeaderState::new(15.0);
        assert!(state.observe(3.0));
        assert!(state.observe(15.0));
        assert!(!state.observe(15.5));
        // Never flips back.
        assert!(!state.observe(2.0));
        assert!(!state.in_header_section());
    }

    #[test]
    fn test_empty_page_notice() {
        let nodes = nodes_for(vec![]);
        assert_eq!(nodes.len(), 1);
        assert!(matches!(&nodes[0], LayoutNode::Notice(n) if n.kind == NoticeKind::NoText));
    }

    #[test]
    fn test_two_columns_make_table() {
        let nodes = nodes_for(vec![para("Left", 5.0, 5.0), para("Right", 60.0, 5.1)]);
        assert_eq!(nodes.len(), 1);
        let table = nodes[0].as_table().unwrap();
        let cells = &table.rows[0].cells;
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].alignment, Alignment::Left);
        assert_eq!(cells[1].alignment, Alignment::Right);
        // Still in the header band, so cells are emphasized.
        assert!(cells[0].emphasis.bordered);
    }

    #[test]
    fn test_spacer_between_distant_zones() {
        let nodes = nodes_for(vec![
            para("first line", 5.0, 20.0),
            para("second line", 5.0, 22.6),
            para("far below", 5.0, 40.0),
        ]);
        let kinds: Vec<bool> = nodes.iter().map(|n| matches!(n, LayoutNode::Spacer)).collect();
        assert_eq!(kinds, vec![false, false, true, false]);
    }

    #[test]
    fn test_cell_uncertain_flag() {
        let words = vec![Word::new("blurry", 0.4), Word::new("ok", 0.99)];
        let left = Paragraph::new(words, BoundingBox::new(5.0, 50.0, 5.0, 1.0), 100.0, 100.0)
            .with_block(BlockTag::Table);
        let nodes = nodes_for(vec![left]);
        let table = nodes[0].as_table().unwrap();
        assert!(table.rows[0].cells[0].uncertain);
        assert!(table.rows[0].cells[0].emphasis.bold);
    }

    #[test]
    fn test_summary_prefix() {
        let summary = ConversionSummary::new("scan.tiff", 2);
        let page = Page::from_paragraphs(100.0, 100.0, vec![para("body", 5.0, 50.0)]);
        let nodes = assemble(&page, Some(&summary), &LayoutOptions::default(), &classifier());
        let breaks = nodes
            .iter()
            .position(|n| matches!(n, LayoutNode::PageBreak))
            .unwrap();
        assert_eq!(breaks, nodes.len() - 2);
        assert_eq!(nodes[0].as_paragraph().unwrap().text, "CONVERTED DOCUMENT");
        let table = nodes[3].as_table().unwrap();
        assert_eq!(table.row_count(), 7);
        assert_eq!(table.rows[0].cells[1].text, "scan.tiff");
    }
}
