//! Layout reconstruction options.

use serde::{Deserialize, Serialize};

/// Numeric thresholds for layout reconstruction.
///
/// Positions are percentages of page width/height; indents are in
/// centimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Maximum vertical distance between paragraphs of one row
    pub row_threshold: f32,

    /// Vertical gap between zones above which a spacer is emitted
    pub spacer_gap: f32,

    /// A page leaves its header section at the first zone below this line
    pub header_cutoff: f32,

    /// Words below this confidence are low-confidence
    pub low_confidence_threshold: f32,

    /// Largest number of low-confidence words shown as a paragraph marker
    pub max_marker_words: usize,

    /// Left position that maps to zero indent for continuations
    pub indent_origin: f32,

    /// Percent of page width per indent unit for continuations
    pub indent_step: f32,

    /// Smallest indent for a continuation line
    pub min_indent: f32,

    /// Indent of numbered items
    pub numbered_indent: f32,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row threshold.
    pub fn with_row_threshold(mut self, threshold: f32) -> Self {
        self.row_threshold = threshold;
        self
    }

    /// Set the zone gap that triggers a spacer.
    pub fn with_spacer_gap(mut self, gap: f32) -> Self {
        self.spacer_gap = gap;
        self
    }

    /// Set the header-section cutoff.
    pub fn with_header_cutoff(mut self, cutoff: f32) -> Self {
        self.header_cutoff = cutoff;
        self
    }

    /// Set the low-confidence threshold.
    pub fn with_low_confidence_threshold(mut self, threshold: f32) -> Self {
        self.low_confidence_threshold = threshold;
        self
    }

    /// Set the largest marker size.
    pub fn with_max_marker_words(mut self, count: usize) -> Self {
        self.max_marker_words = count;
        self
    }

    /// Indent for a continuation line starting at `x_percent`.
    pub fn continuation_indent(&self, x_percent: f32) -> f32 {
        if self.indent_step > 0.0 {
            ((x_percent - self.indent_origin) / self.indent_step).max(self.min_indent)
        } else {
            self.min_indent
        }
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            row_threshold: 2.5,
            spacer_gap: 3.0,
            header_cutoff: 15.0,
            low_confidence_threshold: 0.85,
            max_marker_words: 3,
            indent_origin: 10.0,
            indent_step: 15.0,
            min_indent: 1.0,
            numbered_indent: 0.5,
        }
    }
}
