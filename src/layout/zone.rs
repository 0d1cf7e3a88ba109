//! Zone classification: table row or flowing text.

use super::rows::Zone;

/// Check if a zone is a table row.
///
/// An explicit table tag on any member is decisive; otherwise two or more
/// members on one line are taken as columns.
pub fn is_table_zone(zone: &Zone<'_>) -> bool {
    zone.paragraphs.iter().any(|p| p.is_table_tagged()) || zone.len() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockTag, BoundingBox, Paragraph};

    fn para(block: BlockTag) -> Paragraph {
        Paragraph::from_text("cell", BoundingBox::new(0.0, 0.0, 1.0, 1.0), 100.0, 100.0)
            .with_block(block)
    }

    #[test]
    fn test_single_text_paragraph_is_not_table() {
        let p = para(BlockTag::Text);
        assert!(!is_table_zone(&Zone { paragraphs: vec![&p] }));
    }

    #[test]
    fn test_tagged_single_paragraph_is_table() {
        let p = para(BlockTag::Table);
        assert!(is_table_zone(&Zone { paragraphs: vec![&p] }));
    }

    #[test]
    fn test_two_columns_are_table() {
        let (a, b) = (para(BlockTag::Text), para(BlockTag::Text));
        assert!(is_table_zone(&Zone {
            paragraphs: vec![&a, &b]
        }));
    }
}
