//! Aggregation of per-page OCR results into a [`ConversionSummary`].

use chrono::Utc;

use crate::model::{mean, ConversionSummary, DetectedLanguage, Page};
use crate::pages::PageSet;

/// Summarize a conversion.
///
/// `recognized` holds the pages that went through OCR successfully. Their
/// confidences are averaged, skipping pages that scored zero; languages are
/// averaged per code and sorted most confident first. Excluded pages outside
/// `1..=total_pages` are ignored.
pub fn summarize<'a>(
    source_name: impl Into<String>,
    total_pages: u32,
    excluded: &PageSet,
    recognized: impl IntoIterator<Item = &'a Page>,
) -> ConversionSummary {
    let excluded = excluded.within(total_pages);
    let mut confidences = Vec::new();
    let mut by_code: Vec<(String, Vec<f32>)> = Vec::new();

    for page in recognized {
        if page.confidence > 0.0 {
            confidences.push(page.confidence);
        }
        for lang in &page.languages {
            if lang.code.is_empty() {
                continue;
            }
            match by_code.iter_mut().find(|(code, _)| *code == lang.code) {
                Some((_, values)) => values.push(lang.confidence),
                None => by_code.push((lang.code.clone(), vec![lang.confidence])),
            }
        }
    }

    let mut languages: Vec<DetectedLanguage> = by_code
        .into_iter()
        .filter_map(|(code, values)| {
            mean(values.into_iter()).map(|c| DetectedLanguage::new(code, c))
        })
        .collect();
    languages.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    ConversionSummary {
        source_name: source_name.into(),
        created: Utc::now(),
        total_pages,
        ocr_pages: total_pages.saturating_sub(excluded.len() as u32),
        excluded,
        mean_confidence: mean(confidences.into_iter()),
        languages,
    }
}
