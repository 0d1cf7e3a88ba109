//! Page-level types produced by the geometry normalizer.

use serde::{Deserialize, Serialize};

/// A single recognized word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// The word text
    pub text: String,

    /// Recognition confidence in [0, 1]
    pub confidence: f32,
}

impl Word {
    /// Create a new word.
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Axis-aligned bounding box in source-image pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width (never negative)
    pub width: f32,
    /// Height (never negative)
    pub height: f32,
}

impl BoundingBox {
    /// Create a box from its top-left corner and size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Build a box from its top-left and bottom-right corners.
    ///
    /// A missing top-left corner is taken as the origin; a missing
    /// bottom-right corner collapses the box to zero size.
    pub fn from_corners(top_left: Option<(f32, f32)>, bottom_right: Option<(f32, f32)>) -> Self {
        let (x, y) = top_left.unwrap_or((0.0, 0.0));
        let (x2, y2) = bottom_right.unwrap_or((x, y));
        Self::new(x, y, x2 - x, y2 - y)
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// OCR block classification inherited by every paragraph of the block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockTag {
    /// Regular text block
    #[default]
    Text,
    /// Explicitly detected table
    Table,
    /// Picture region
    Picture,
    /// Horizontal/vertical ruler line
    Ruler,
    /// Barcode
    Barcode,
    /// Any other or unknown block type
    #[serde(other)]
    Unknown,
}

/// A paragraph of recognized text with its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Words joined with single spaces
    pub text: String,

    /// Bounding box in pixels
    pub bbox: BoundingBox,

    /// Left edge as a percentage of page width
    pub x_percent: f32,

    /// Top edge as a percentage of page height
    pub y_percent: f32,

    /// Block type inherited from the enclosing OCR block
    pub block: BlockTag,

    /// Paragraph-level confidence reported by the OCR provider
    pub confidence: f32,

    /// Words in reading order
    pub words: Vec<Word>,
}

impl Paragraph {
    /// Create a paragraph from its words, placed on a page of the given size.
    ///
    /// The paragraph confidence defaults to the mean word confidence.
    pub fn new(words: Vec<Word>, bbox: BoundingBox, page_width: f32, page_height: f32) -> Self {
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let confidence = mean(words.iter().map(|w| w.confidence)).unwrap_or(0.0);

        Self {
            text,
            bbox,
            x_percent: percent_of(bbox.x, page_width),
            y_percent: percent_of(bbox.y, page_height),
            block: BlockTag::Text,
            confidence,
            words,
        }
    }

    /// Create a paragraph from plain text, one fully-confident word per token.
    pub fn from_text(
        text: &str,
        bbox: BoundingBox,
        page_width: f32,
        page_height: f32,
    ) -> Self {
        let words = text.split_whitespace().map(|w| Word::new(w, 1.0)).collect();
        Self::new(words, bbox, page_width, page_height)
    }

    /// Set the inherited block tag.
    pub fn with_block(mut self, block: BlockTag) -> Self {
        self.block = block;
        self
    }

    /// Set the provider-reported paragraph confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Check if the paragraph belongs to an explicitly detected table.
    pub fn is_table_tagged(&self) -> bool {
        self.block == BlockTag::Table
    }

    /// Number of whitespace-separated words in the text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A language reported for the page, with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    /// BCP-47 code, e.g. "fr"
    pub code: String,

    /// Detection confidence in [0, 1]
    pub confidence: f32,
}

impl DetectedLanguage {
    /// Create a new detected language entry.
    pub fn new(code: impl Into<String>, confidence: f32) -> Self {
        Self {
            code: code.into(),
            confidence,
        }
    }
}

/// A recognized page: its dimensions and its paragraphs in reading order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    /// Page width in pixels
    pub width: f32,

    /// Page height in pixels
    pub height: f32,

    /// Paragraphs sorted top-to-bottom, then left-to-right
    pub paragraphs: Vec<Paragraph>,

    /// Mean word confidence over the whole page (0 when no words)
    pub confidence: f32,

    /// Languages detected on the page
    pub languages: Vec<DetectedLanguage>,

    /// Raw full text as reported by the provider
    pub full_text: String,
}

impl Page {
    /// Create an empty page with the given dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Create a page from paragraphs, putting them in canonical reading order.
    ///
    /// The sort is stable on `(y, x)`, so paragraphs sharing a position keep
    /// their input order.
    pub fn from_paragraphs(width: f32, height: f32, mut paragraphs: Vec<Paragraph>) -> Self {
        sort_reading_order(&mut paragraphs);
        let confidence = mean(
            paragraphs
                .iter()
                .flat_map(|p| p.words.iter().map(|w| w.confidence)),
        )
        .unwrap_or(0.0);

        Self {
            width,
            height,
            paragraphs,
            confidence,
            ..Default::default()
        }
    }

    /// Set the mean word confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the detected languages.
    pub fn with_languages(mut self, languages: Vec<DetectedLanguage>) -> Self {
        self.languages = languages;
        self
    }

    /// Set the provider's full text.
    pub fn with_full_text(mut self, text: impl Into<String>) -> Self {
        self.full_text = text.into();
        self
    }

    /// Check if the page has no recognized paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Total number of words on the page.
    pub fn word_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.words.len()).sum()
    }
}

/// Stable sort by top edge, then left edge.
pub(crate) fn sort_reading_order(paragraphs: &mut [Paragraph]) {
    paragraphs.sort_by(|a, b| {
        a.bbox
            .y
            .total_cmp(&b.bbox.y)
            .then(a.bbox.x.total_cmp(&b.bbox.x))
    });
}

/// `100 * value / extent`, or 0 when the extent is not positive.
pub(crate) fn percent_of(value: f32, extent: f32) -> f32 {
    if extent > 0.0 {
        value / extent * 100.0
    } else {
        0.0
    }
}

pub(crate) fn mean(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values.fold((0.0f32, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f32)
}
