//! Data model for OCR pages and reconstructed layouts.
//!
//! [`Page`] and its [`Paragraph`]s are the engine's input, produced once by
//! the geometry normalizer and never mutated. [`LayoutNode`] sequences are
//! its output, grouped per page into a [`Document`].

mod document;
mod node;
mod page;

pub use document::{ConversionSummary, Document, PageContent, PageStatus};
pub use node::{
    Alignment, ConfidenceLevel, Emphasis, LayoutNode, Notice, NoticeKind, StyledParagraph, Table,
    TableCell, TableRow, TextRole,
};
pub use page::{BlockTag, BoundingBox, DetectedLanguage, Page, Paragraph, Word};

pub(crate) use page::mean;
