//! Plain text rendering for reconstructed documents.

use crate::error::Result;
use crate::model::{Document, LayoutNode, StyledParagraph};

use super::markdown::image_reference;
use super::RenderOptions;

/// Spaces per indent unit.
const INDENT_WIDTH: f32 = 4.0;

/// Convert a document to plain text.
///
/// Tables become " | "-separated lines and indentation becomes spaces.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    let mut blocks: Vec<String> = Vec::new();

    for page in doc.pages.iter().filter(|p| options.includes(p.number)) {
        for node in &page.nodes {
            if let Some(block) = render_node(node, options) {
                blocks.push(block);
            }
        }
    }

    Ok(blocks.join("\n\n").trim().to_string())
}

fn render_node(node: &LayoutNode, options: &RenderOptions) -> Option<String> {
    match node {
        LayoutNode::Paragraph(p) => Some(render_paragraph(p, options)),
        LayoutNode::Table(table) => Some(
            table
                .rows
                .iter()
                .map(|row| {
                    row.cells
                        .iter()
                        .map(|cell| {
                            if options.show_confidence_markers && cell.uncertain {
                                format!("{} [?]", cell.text)
                            } else {
                                cell.text.clone()
                            }
                        })
                        .collect::<Vec<_>>()
                        .join(" | ")
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        LayoutNode::Notice(n) => Some(n.text.clone()),
        LayoutNode::Image { path } => options
            .include_images
            .then(|| format!("[Image: {}]", image_reference(options, path))),
        LayoutNode::PageBanner {
            number,
            total,
            confidence,
        } => options.show_page_banners.then(|| match confidence {
            Some(c) => format!("== Page {}/{} [confidence {:.0}%] ==", number, total, c * 100.0),
            None => format!("== Page {}/{} ==", number, total),
        }),
        LayoutNode::Spacer | LayoutNode::PageBreak => None,
    }
}

fn render_paragraph(para: &StyledParagraph, options: &RenderOptions) -> String {
    let indent = " ".repeat((para.indent * INDENT_WIDTH).round() as usize);
    let mut line = format!("{}{}", indent, para.text);
    if options.show_confidence_markers && para.has_marker() {
        line.push_str(&format!("  [? {}]", para.low_confidence.join(", ")));
    }
    line
}
