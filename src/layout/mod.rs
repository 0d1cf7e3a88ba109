//! Layout reconstruction engine.
//!
//! The engine runs in fixed stages over one page at a time:
//!
//! 1. [`normalize`]: raw provider output to paragraphs in reading order
//! 2. [`group_rows`]: paragraphs to horizontal zones
//! 3. [`is_table_zone`]: table row or flowing text
//! 4. [`RoleClassifier`]: semantic role of flowing text, from a [`RuleSet`]
//! 5. [`page_nodes`]: zones to [`LayoutNode`]s, with low-confidence markers
//!
//! Every stage is synchronous and free of I/O, so pages can be processed
//! concurrently. The same page always yields the same nodes.
//!
//! # Example
//!
//! ```
//! use unscan::layout::LayoutEngine;
//! use unscan::model::BlockTag;
//! use unscan::ocr::{RawBlock, RawPage, RawParagraph};
//!
//! let raw = RawPage::new(1000.0, 1000.0).with_block(
//!     RawBlock::new(BlockTag::Text)
//!         .with_paragraph(RawParagraph::rect(50.0, 20.0, 200.0, 40.0).with_text("RESUME:", 0.98)),
//! );
//!
//! let engine = LayoutEngine::new()?;
//! let nodes = engine.reconstruct_raw(&raw);
//! assert_eq!(nodes.len(), 1);
//! # Ok::<(), unscan::Error>(())
//! ```

mod assemble;
mod confidence;
mod normalize;
mod options;
mod roles;
mod rows;
mod rules;
mod zone;

pub use assemble::{assemble, page_nodes, summary_nodes, HeaderState};
pub use confidence::{has_low_confidence, low_confidence_words, paragraph_marker};
pub use normalize::normalize;
pub use options::LayoutOptions;
pub use roles::RoleClassifier;
pub use rows::{group_rows, Zone};
pub use rules::{CompiledRules, Condition, RoleRule, RuleSet, TextContext};
pub use zone::is_table_zone;

use crate::error::Result;
use crate::model::{ConversionSummary, LayoutNode, Page};
use crate::ocr::RawPage;

/// Layout options and a compiled rule set, ready to reconstruct pages.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    options: LayoutOptions,
    classifier: RoleClassifier,
}

impl LayoutEngine {
    /// Create an engine with default options and the built-in rule set.
    pub fn new() -> Result<Self> {
        Self::with_config(LayoutOptions::default(), &RuleSet::default())
    }

    /// Create an engine from options and a rule set.
    pub fn with_config(options: LayoutOptions, rules: &RuleSet) -> Result<Self> {
        Ok(Self {
            options,
            classifier: RoleClassifier::new(rules)?,
        })
    }

    /// Get the layout options.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Get the role classifier.
    pub fn classifier(&self) -> &RoleClassifier {
        &self.classifier
    }

    /// Reconstruct a normalized page.
    pub fn reconstruct(&self, page: &Page) -> Vec<LayoutNode> {
        page_nodes(page, &self.options, &self.classifier)
    }

    /// Normalize and reconstruct a raw provider page.
    pub fn reconstruct_raw(&self, raw: &RawPage) -> Vec<LayoutNode> {
        self.reconstruct(&normalize(raw))
    }

    /// Reconstruct a page, prefixed by the summary sequence when given.
    pub fn assemble(&self, page: &Page, summary: Option<&ConversionSummary>) -> Vec<LayoutNode> {
        assemble(page, summary, &self.options, &self.classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_with_invalid_rules() {
        let rules = RuleSet {
            name: "bad".into(),
            roles: vec![RoleRule::new(
                crate::model::TextRole::Title,
                Condition::matches(["["], false),
            )],
            emphasis: vec![],
        };
        assert!(LayoutEngine::with_config(LayoutOptions::default(), &rules).is_err());
    }

    #[test]
    fn test_engine_empty_raw_page() {
        let engine = LayoutEngine::new().unwrap();
        let nodes = engine.reconstruct_raw(&RawPage::new(1000.0, 1000.0));
        assert_eq!(nodes.len(), 1);
    }
}
