//! Document-level types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConfidenceLevel, DetectedLanguage, LayoutNode};
use crate::pages::PageSet;

/// A reconstructed document: an optional summary plus per-page content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Conversion statistics, rendered ahead of the first page
    pub summary: Option<ConversionSummary>,

    /// Pages in document order
    pub pages: Vec<PageContent>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&PageContent> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: PageContent) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterate every node of every page in order.
    pub fn nodes(&self) -> impl Iterator<Item = &LayoutNode> {
        self.pages.iter().flat_map(|p| p.nodes.iter())
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// How a page was processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageStatus {
    /// Layout reconstructed from OCR geometry
    Reconstructed,
    /// OCR full text copied line by line
    Transcribed,
    /// Image only, by output mode
    ImageOnly,
    /// Skipped by the excluded-page selector
    Excluded,
    /// OCR failed; the page carries an error notice
    Failed {
        /// Failure reason reported by the provider
        reason: String,
    },
}

impl PageStatus {
    /// Check if OCR output was used for this page.
    pub fn has_ocr(&self) -> bool {
        matches!(self, PageStatus::Reconstructed | PageStatus::Transcribed)
    }
}

/// The content of one page: its status and its node sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// 1-indexed page number
    pub number: u32,

    /// Processing status
    #[serde(flatten)]
    pub status: PageStatus,

    /// Mean word confidence (0 when unknown)
    pub confidence: f32,

    /// Languages detected on the page
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<DetectedLanguage>,

    /// Layout nodes in reading order
    pub nodes: Vec<LayoutNode>,
}

impl PageContent {
    /// Create an empty page with the given number and status.
    pub fn new(number: u32, status: PageStatus) -> Self {
        Self {
            number,
            status,
            confidence: 0.0,
            languages: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Set the page confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the detected languages.
    pub fn with_languages(mut self, languages: Vec<DetectedLanguage>) -> Self {
        self.languages = languages;
        self
    }

    /// Append a node.
    pub fn push(&mut self, node: LayoutNode) {
        self.nodes.push(node);
    }

    /// Get plain text content of the page.
    pub fn plain_text(&self) -> String {
        self.nodes
            .iter()
            .filter_map(|n| n.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Aggregate conversion statistics shown ahead of the first page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Source file name
    pub source_name: String,

    /// Conversion timestamp
    pub created: DateTime<Utc>,

    /// Total pages in the document
    pub total_pages: u32,

    /// Pages excluded from OCR (restricted to 1..=total)
    pub excluded: PageSet,

    /// Pages that went through OCR
    pub ocr_pages: u32,

    /// Mean confidence over pages with a positive score
    pub mean_confidence: Option<f32>,

    /// Languages with their mean confidence, most confident first
    pub languages: Vec<DetectedLanguage>,
}

impl ConversionSummary {
    /// Create a summary for a document with no OCR data yet.
    pub fn new(source_name: impl Into<String>, total_pages: u32) -> Self {
        Self {
            source_name: source_name.into(),
            created: Utc::now(),
            total_pages,
            excluded: PageSet::new(),
            ocr_pages: total_pages,
            mean_confidence: None,
            languages: Vec::new(),
        }
    }

    /// Confidence bucket for the mean confidence.
    pub fn confidence_level(&self) -> Option<ConfidenceLevel> {
        self.mean_confidence.map(ConfidenceLevel::from_score)
    }

    /// Mean confidence as a percentage with one decimal, or "N/A".
    pub fn confidence_label(&self) -> String {
        match self.mean_confidence {
            Some(c) => format!("{:.1}%", c * 100.0),
            None => "N/A".to_string(),
        }
    }

    /// Excluded pages as "N (list)", or "None".
    pub fn excluded_label(&self) -> String {
        if self.excluded.is_empty() {
            "None".to_string()
        } else {
            format!(
                "{} ({})",
                self.excluded.len(),
                self.excluded.to_compact_string()
            )
        }
    }

    /// Top `n` languages as "FR (98%), EN (12%)", or "Not detected".
    pub fn languages_label(&self, n: usize) -> String {
        if self.languages.is_empty() {
            return "Not detected".to_string();
        }
        self.languages
            .iter()
            .take(n)
            .map(|l| format!("{} ({:.0}%)", l.code.to_uppercase(), l.confidence * 100.0))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Conversion timestamp formatted for display.
    pub fn created_label(&self) -> String {
        self.created.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}
