//! Low-confidence word detection.

use crate::model::Paragraph;

use super::LayoutOptions;

/// Texts of the paragraph's words below `threshold`, in word order.
pub fn low_confidence_words(paragraph: &Paragraph, threshold: f32) -> Vec<String> {
    paragraph
        .words
        .iter()
        .filter(|w| w.confidence < threshold)
        .map(|w| w.text.clone())
        .collect()
}

/// Check if any word of the paragraph is below `threshold`.
pub fn has_low_confidence(paragraph: &Paragraph, threshold: f32) -> bool {
    paragraph.words.iter().any(|w| w.confidence < threshold)
}

/// Words to show as an inline marker for a flowing paragraph.
///
/// When more than `max_marker_words` words are low-confidence the marker is
/// suppressed entirely rather than truncated.
pub fn paragraph_marker(paragraph: &Paragraph, options: &LayoutOptions) -> Vec<String> {
    let words = low_confidence_words(paragraph, options.low_confidence_threshold);
    if words.len() > options.max_marker_words {
        log::debug!(
            "Suppressing marker for {} low-confidence words",
            words.len()
        );
        return Vec::new();
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Word};

    fn paragraph(confidences: &[f32]) -> Paragraph {
        let words = confidences
            .iter()
            .enumerate()
            .map(|(i, c)| Word::new(format!("w{}", i), *c))
            .collect();
        Paragraph::new(words, BoundingBox::default(), 100.0, 100.0)
    }

    #[test]
    fn test_threshold_is_strict() {
        let para = paragraph(&[0.85, 0.8499, 0.99]);
        assert_eq!(low_confidence_words(&para, 0.85), vec!["w1"]);
        assert!(has_low_confidence(&para, 0.85));
        assert!(!has_low_confidence(&paragraph(&[0.9, 0.95]), 0.85));
    }

    #[test]
    fn test_marker_keeps_three() {
        let para = paragraph(&[0.1, 0.9, 0.2, 0.3]);
        assert_eq!(
            paragraph_marker(&para, &LayoutOptions::default()),
            vec!["w0", "w2", "w3"]
        );
    }

    #[test]
    fn test_marker_suppressed_above_limit() {
        let para = paragraph(&[0.1, 0.2, 0.3, 0.4]);
        assert!(paragraph_marker(&para, &LayoutOptions::default()).is_empty());
    }
}
