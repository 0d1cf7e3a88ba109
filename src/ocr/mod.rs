//! OCR provider boundary.
//!
//! The engine never talks to an OCR service. Providers hand it a [`RawPage`]:
//! page dimensions plus blocks of paragraphs with their corner vertices and
//! word confidences, exactly as reported. [`crate::layout::normalize`] turns
//! that into a [`crate::model::Page`].

mod vision;

pub use vision::decode_response;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BlockTag, DetectedLanguage};

/// A page as reported by an OCR provider, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    /// Page width in pixels
    pub width: f32,

    /// Page height in pixels
    pub height: f32,

    /// Blocks in provider order
    #[serde(default)]
    pub blocks: Vec<RawBlock>,

    /// Languages detected on the page
    #[serde(default)]
    pub languages: Vec<DetectedLanguage>,

    /// Full page text as reported by the provider
    #[serde(default)]
    pub full_text: String,
}

impl RawPage {
    /// Create a page with no blocks.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Add a block and return self.
    pub fn with_block(mut self, block: RawBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Check if the provider reported no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate every word on the page, across all blocks.
    pub fn words(&self) -> impl Iterator<Item = &RawWord> {
        self.blocks
            .iter()
            .flat_map(|b| b.paragraphs.iter())
            .flat_map(|p| p.words.iter())
    }
}

/// A provider block: a type tag and its paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    /// Block classification
    #[serde(default)]
    pub block: BlockTag,

    /// Paragraphs in provider order
    #[serde(default)]
    pub paragraphs: Vec<RawParagraph>,
}

impl RawBlock {
    /// Create an empty block of the given type.
    pub fn new(block: BlockTag) -> Self {
        Self {
            block,
            paragraphs: Vec::new(),
        }
    }

    /// Add a paragraph and return self.
    pub fn with_paragraph(mut self, paragraph: RawParagraph) -> Self {
        self.paragraphs.push(paragraph);
        self
    }
}

/// A polygon corner. Providers omit zero coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Horizontal coordinate
    #[serde(default)]
    pub x: f32,
    /// Vertical coordinate
    #[serde(default)]
    pub y: f32,
}

impl Vertex {
    /// Create a new vertex.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A provider paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawParagraph {
    /// Bounding polygon, clockwise from the top-left corner
    #[serde(default)]
    pub vertices: Vec<Vertex>,

    /// Paragraph confidence, when reported
    #[serde(default)]
    pub confidence: Option<f32>,

    /// Words in reading order
    #[serde(default)]
    pub words: Vec<RawWord>,
}

impl RawParagraph {
    /// Create a paragraph with an axis-aligned rectangle as its polygon.
    pub fn rect(x: f32, y: f32, x2: f32, y2: f32) -> Self {
        Self {
            vertices: vec![
                Vertex::new(x, y),
                Vertex::new(x2, y),
                Vertex::new(x2, y2),
                Vertex::new(x, y2),
            ],
            confidence: None,
            words: Vec::new(),
        }
    }

    /// Add a word and return self.
    pub fn with_word(mut self, text: impl Into<String>, confidence: f32) -> Self {
        self.words.push(RawWord::new(text, confidence));
        self
    }

    /// Add whitespace-separated words sharing one confidence and return self.
    pub fn with_text(mut self, text: &str, confidence: f32) -> Self {
        self.words
            .extend(text.split_whitespace().map(|w| RawWord::new(w, confidence)));
        self
    }

    /// Set the paragraph confidence and return self.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Top-left corner (vertex 0).
    pub fn top_left(&self) -> Option<(f32, f32)> {
        self.vertices.first().map(|v| (v.x, v.y))
    }

    /// Bottom-right corner (vertex 2).
    pub fn bottom_right(&self) -> Option<(f32, f32)> {
        self.vertices.get(2).map(|v| (v.x, v.y))
    }
}

/// A provider word.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWord {
    /// Word text (concatenated symbols)
    pub text: String,

    /// Recognition confidence, when reported
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl RawWord {
    /// Create a word with a known confidence.
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence: Some(confidence),
        }
    }
}

/// Trait for OCR providers.
///
/// Implement this trait to plug a recognition backend into
/// [`crate::convert::Converter::recognize_all`].
pub trait OcrProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Recognize one page from its source (image or stored response).
    fn recognize(&self, source: &Path) -> Result<RawPage>;
}

/// Provider that reads stored Vision `images:annotate` JSON responses.
///
/// Each source path is a JSON file holding the response for one page.
#[derive(Debug, Clone, Default)]
pub struct VisionFileProvider {
    _private: (),
}

impl VisionFileProvider {
    /// Create a new provider.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl OcrProvider for VisionFileProvider {
    fn name(&self) -> &str {
        "vision-file"
    }

    fn recognize(&self, source: &Path) -> Result<RawPage> {
        let json = fs::read_to_string(source)?;
        decode_response(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_corners() {
        let para = RawParagraph::rect(10.0, 20.0, 110.0, 40.0);
        assert_eq!(para.top_left(), Some((10.0, 20.0)));
        assert_eq!(para.bottom_right(), Some((110.0, 40.0)));
    }

    #[test]
    fn test_missing_vertices() {
        let para = RawParagraph::default();
        assert_eq!(para.top_left(), None);
        assert_eq!(para.bottom_right(), None);
    }

    #[test]
    fn test_page_words() {
        let page = RawPage::new(100.0, 100.0)
            .with_block(
                RawBlock::new(BlockTag::Text)
                    .with_paragraph(RawParagraph::rect(0.0, 0.0, 1.0, 1.0).with_text("a b", 0.9)),
            )
            .with_block(
                RawBlock::new(BlockTag::Table)
                    .with_paragraph(RawParagraph::rect(0.0, 0.0, 1.0, 1.0).with_word("c", 0.5)),
            );
        let words: Vec<&str> = page.words().map(|w| w.text.as_str()).collect();
        assert_eq!(words, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_provider_missing_file() {
        let provider = VisionFileProvider::new();
        let err = provider
            .recognize(Path::new("/nonexistent/page-1.json"))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
