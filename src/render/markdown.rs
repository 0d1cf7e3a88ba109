//! Markdown rendering for reconstructed documents.

use std::path::Path;

use crate::error::Result;
use crate::model::{
    Alignment, Document, Emphasis, LayoutNode, Notice, NoticeKind, PageContent, StyledParagraph,
    Table, TextRole,
};

use super::{LayoutStats, RenderOptions, RenderResult};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Convert a document to Markdown with statistics.
pub fn to_markdown_with_stats(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    let mut options = options.clone();
    options.collect_stats = true;
    let renderer = MarkdownRenderer::new(options);
    renderer.render_with_stats(doc)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
    stats: LayoutStats,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: LayoutStats::new(),
        }
    }

    /// Render a document to Markdown.
    pub fn render(mut self, doc: &Document) -> Result<String> {
        self.render_internal(doc)
    }

    /// Render a document to Markdown with layout statistics.
    pub fn render_with_stats(mut self, doc: &Document) -> Result<RenderResult> {
        self.options.collect_stats = true;
        let content = self.render_internal(doc)?;

        // Count words and characters in final content
        self.stats.count_text(&content);

        Ok(RenderResult::new(content, doc.summary.clone(), self.stats))
    }

    fn render_internal(&mut self, doc: &Document) -> Result<String> {
        let mut output = String::new();

        for page in &doc.pages {
            if self.options.includes(page.number) {
                self.render_page(&mut output, page);
            }
        }

        Ok(output.trim().to_string())
    }

    fn render_page(&mut self, output: &mut String, page: &PageContent) {
        if self.options.collect_stats {
            self.stats.add_page(page);
        }
        for node in &page.nodes {
            self.render_node(output, node);
        }
    }

    fn render_node(&self, output: &mut String, node: &LayoutNode) {
        match node {
            LayoutNode::Paragraph(p) => self.render_paragraph(output, p),
            LayoutNode::Table(t) => self.render_table(output, t),
            LayoutNode::Spacer => output.push_str("<br>\n\n"),
            LayoutNode::Notice(n) => self.render_notice(output, n),
            LayoutNode::Image { path } => {
                if self.options.include_images {
                    self.render_image(output, path);
                }
            }
            LayoutNode::PageBanner {
                number,
                total,
                confidence,
            } => {
                if self.options.show_page_banners {
                    output.push_str(&format!("---\n\n**Page {}/{}**", number, total));
                    if let Some(c) = confidence {
                        output.push_str(&format!(" *(confidence {:.0}%)*", c * 100.0));
                    }
                    output.push_str("\n\n");
                }
            }
            LayoutNode::PageBreak => {
                if !output.is_empty() && !output.ends_with("\n\n") {
                    output.push_str("\n\n");
                }
            }
        }
    }

    fn render_paragraph(&self, output: &mut String, para: &StyledParagraph) {
        if para.text.trim().is_empty() {
            return;
        }

        let mut text = self.escape(&para.text);
        if self.options.escape_special_chars {
            text = escape_block_start(&text);
        }

        if para.role == TextRole::Title {
            output.push_str("## ");
            output.push_str(&text);
        } else {
            match para.role {
                TextRole::Continuation => {
                    output.push_str(&"&emsp;".repeat(para.indent.round().max(1.0) as usize));
                }
                TextRole::NumberedItem if para.indent > 0.0 => output.push_str("&ensp;"),
                _ => {}
            }
            if para.alignment == Alignment::Center {
                output.push_str("<center>");
                output.push_str(&apply_emphasis(&text, &para.emphasis));
                output.push_str("</center>");
            } else {
                output.push_str(&apply_emphasis(&text, &para.emphasis));
            }
        }

        if self.options.show_confidence_markers && para.has_marker() {
            let words: Vec<String> = para.low_confidence.iter().map(|w| self.escape(w)).collect();
            output.push_str(&format!(" *\\[? {}\\]*", words.join(", ")));
        }
        output.push_str("\n\n");
    }

    fn render_notice(&self, output: &mut String, notice: &Notice) {
        let text = self.escape(&notice.text);
        match notice.kind {
            NoticeKind::OcrFailed => output.push_str(&format!("> **{}**\n\n", text)),
            NoticeKind::NoText | NoticeKind::Note => output.push_str(&format!("*{}*\n\n", text)),
        }
    }

    fn render_table(&self, output: &mut String, table: &Table) {
        let col_count = table.column_count();
        if col_count == 0 {
            return;
        }

        for (i, row) in table.rows.iter().enumerate() {
            output.push('|');
            for index in 0..col_count {
                let content = row
                    .cells
                    .get(index)
                    .map(|cell| {
                        let mut text = apply_emphasis(
                            &self.escape(cell.text.replace('\n', " ").trim()),
                            &cell.emphasis,
                        );
                        if self.options.show_confidence_markers && cell.uncertain {
                            text.push_str(" \\[?\\]");
                        }
                        text
                    })
                    .unwrap_or_default();
                output.push_str(&format!(" {} |", content));
            }
            output.push('\n');

            // Separator after the first row
            if i == 0 {
                output.push('|');
                for index in 0..col_count {
                    let alignment = row.cells.get(index).map(|c| c.alignment).unwrap_or_default();
                    let align_marker = match alignment {
                        Alignment::Left => " --- |",
                        Alignment::Center => " :---: |",
                        Alignment::Right => " ---: |",
                    };
                    output.push_str(align_marker);
                }
                output.push('\n');
            }
        }

        output.push('\n');
    }

    fn render_image(&self, output: &mut String, path: &Path) {
        output.push_str(&format!("![Page image]({})\n\n", image_reference(&self.options, path)));
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// Path under which an image is referenced in rendered output.
pub(crate) fn image_reference(options: &RenderOptions, path: &Path) -> String {
    if options.image_path_prefix.is_empty() {
        return path.display().to_string();
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("{}{}", options.image_path_prefix, name)
}

fn apply_emphasis(text: &str, emphasis: &Emphasis) -> String {
    let mut result = text.to_string();

    // Apply styles (innermost first)
    if emphasis.italic {
        result = format!("*{}*", result);
    }
    if emphasis.bold {
        result = format!("**{}**", result);
    }
    if emphasis.underline {
        result = format!("<u>{}</u>", result);
    }

    result
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            // Core formatting that must be escaped
            '\\' | '`' | '*' | '_' |
            // Brackets for links/images, pipe for tables
            '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

/// Escape a leading character that would open a heading, blockquote or list.
fn escape_block_start(text: &str) -> String {
    let body = text.trim_start();
    let indent = &text[..text.len() - body.len()];
    match body.chars().next() {
        Some('#' | '>' | '+') => format!("{}\\{}", indent, body),
        _ => text.to_string(),
    }
}
