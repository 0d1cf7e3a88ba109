//! Text role classification and paragraph styling.

use crate::error::Result;
use crate::model::{Paragraph, StyledParagraph, TextRole};

use super::rules::{CompiledRules, RuleSet, TextContext};
use super::LayoutOptions;

/// Evaluates a compiled [`RuleSet`] against paragraphs.
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    rules: CompiledRules,
}

impl RoleClassifier {
    /// Compile a rule set into a classifier.
    pub fn new(rules: &RuleSet) -> Result<Self> {
        Ok(Self {
            rules: rules.compile()?,
        })
    }

    /// Role of a paragraph; body text when no rule matches.
    pub fn classify(&self, paragraph: &Paragraph, in_header_section: bool) -> TextRole {
        self.classify_context(&TextContext::of(paragraph, in_header_section))
    }

    /// Role for an arbitrary context.
    pub fn classify_context(&self, ctx: &TextContext<'_>) -> TextRole {
        self.rules.role(ctx).unwrap_or(TextRole::Body)
    }

    /// Check if a table cell built from this paragraph is emphasized.
    pub fn is_emphasized(&self, paragraph: &Paragraph, in_header_section: bool) -> bool {
        self.rules
            .is_emphasized(&TextContext::of(paragraph, in_header_section))
    }

    /// Classify a paragraph and give it its role's presentation.
    pub fn style(
        &self,
        paragraph: &Paragraph,
        in_header_section: bool,
        options: &LayoutOptions,
    ) -> StyledParagraph {
        let role = self.classify(paragraph, in_header_section);
        let indent = match role {
            TextRole::NumberedItem => options.numbered_indent,
            TextRole::Continuation => options.continuation_indent(paragraph.x_percent),
            _ => 0.0,
        };
        StyledParagraph::new(paragraph.text.clone(), role).indented(indent)
    }
}
