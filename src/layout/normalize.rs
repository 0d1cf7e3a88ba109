//! Geometry normalization: raw provider output to an ordered [`Page`].

use unicode_normalization::UnicodeNormalization;

use crate::model::{mean, BoundingBox, Page, Paragraph, Word};
use crate::ocr::RawPage;

/// Normalize a raw OCR page.
///
/// Corners are reduced to an axis-aligned box (a missing corner collapses
/// it rather than failing), word text is NFC-normalized, paragraphs whose
/// text is empty after trimming are dropped, and the survivors are put in
/// reading order. The page confidence averages every reported word,
/// including words of dropped paragraphs.
pub fn normalize(raw: &RawPage) -> Page {
    let mut paragraphs = Vec::new();

    for block in &raw.blocks {
        for para in &block.paragraphs {
            let words: Vec<Word> = para
                .words
                .iter()
                .map(|w| Word::new(w.text.nfc().collect::<String>(), w.confidence.unwrap_or(0.0)))
                .collect();

            let bbox = BoundingBox::from_corners(para.top_left(), para.bottom_right());
            let mut paragraph =
                Paragraph::new(words, bbox, raw.width, raw.height).with_block(block.block);
            if paragraph.text.trim().is_empty() {
                continue;
            }
            if let Some(confidence) = para.confidence {
                paragraph = paragraph.with_confidence(confidence);
            }
            paragraphs.push(paragraph);
        }
    }

    let confidence = mean(raw.words().map(|w| w.confidence.unwrap_or(0.0))).unwrap_or(0.0);
    log::debug!(
        "Normalized {} paragraphs from {} blocks (confidence {:.3})",
        paragraphs.len(),
        raw.blocks.len(),
        confidence
    );

    Page::from_paragraphs(raw.width, raw.height, paragraphs)
        .with_confidence(confidence)
        .with_languages(raw.languages.clone())
        .with_full_text(raw.full_text.clone())
}
