//! Integration tests for the conversion pipeline.

use std::path::{Path, PathBuf};

use unscan::convert::{ConvertOptions, Converter, OutputMode, PageInput, ProgressEvent};
use unscan::error::{Error, Result};
use unscan::model::{
    BlockTag, BoundingBox, DetectedLanguage, LayoutNode, NoticeKind, Page, PageStatus, Paragraph,
};
use unscan::ocr::{OcrProvider, RawBlock, RawPage, RawParagraph};
use unscan::pages::PageSet;

/// Provider serving canned pages, failing on sources named "broken".
struct MockProvider;

impl OcrProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn recognize(&self, source: &Path) -> Result<RawPage> {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem == "broken" {
            return Err(Error::Ocr("quota exceeded (code 8)".into()));
        }
        Ok(RawPage::new(1000.0, 1000.0).with_block(
            RawBlock::new(BlockTag::Text).with_paragraph(
                RawParagraph::rect(50.0, 400.0, 600.0, 430.0).with_text(&format!("text of {}", stem), 0.92),
            ),
        ))
    }
}

fn text_page(text: &str, confidence: f32) -> Page {
    let para = Paragraph::from_text(text, BoundingBox::new(50.0, 400.0, 500.0, 30.0), 1000.0, 1000.0);
    Page::from_paragraphs(1000.0, 1000.0, vec![para])
        .with_confidence(confidence)
        .with_languages(vec![DetectedLanguage::new("fr", 0.9)])
        .with_full_text(format!("{}\n\nsecond line\n", text))
}

fn inputs(count: u32) -> Vec<PageInput> {
    (1..=count)
        .map(|n| {
            PageInput::recognized(n, text_page(&format!("page {}", n), 0.9))
                .with_image(format!("images/page-{:03}.png", n))
        })
        .collect()
}

#[test]
fn test_layout_page_composition() {
    let converter = Converter::new(ConvertOptions::new().with_summary(false)).unwrap();
    let doc = converter.convert(inputs(2));

    let page = doc.get_page(2).unwrap();
    assert_eq!(page.status, PageStatus::Reconstructed);
    assert!(matches!(page.nodes[0], LayoutNode::Image { .. }));
    assert_eq!(page.nodes[1], LayoutNode::PageBreak);
    match &page.nodes[2] {
        LayoutNode::PageBanner {
            number,
            total,
            confidence,
        } => {
            assert_eq!(*number, 2);
            assert_eq!(*total, 2);
            assert_eq!(*confidence, Some(0.9));
        }
        other => panic!("expected a banner, got {:?}", other),
    }
    assert_eq!(page.nodes[3].as_paragraph().unwrap().text, "page 2");
}

#[test]
fn test_summary_on_first_page_only() {
    let converter = Converter::new(ConvertOptions::new().with_source_name("scan.tif")).unwrap();
    let doc = converter.convert(inputs(3));

    let summary = doc.summary.as_ref().unwrap();
    assert_eq!(summary.source_name, "scan.tif");
    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.ocr_pages, 3);

    let first = doc.get_page(1).unwrap();
    assert_eq!(
        first.nodes[0].as_paragraph().unwrap().text,
        "CONVERTED DOCUMENT"
    );
    for number in 2..=3 {
        let page = doc.get_page(number).unwrap();
        assert!(matches!(page.nodes[0], LayoutNode::Image { .. }));
    }
}

#[test]
fn test_excluded_pages_are_image_only() {
    let converter = Converter::new(
        ConvertOptions::new()
            .with_excluded(PageSet::parse("2,9"))
            .with_summary(false),
    )
    .unwrap();
    let mut pages = inputs(3);
    pages[1] = PageInput::unrecognized(2).with_image("images/page-002.png");
    let doc = converter.convert(pages);

    let excluded = doc.get_page(2).unwrap();
    assert_eq!(excluded.status, PageStatus::Excluded);
    assert_eq!(excluded.nodes.len(), 1);
    assert!(matches!(excluded.nodes[0], LayoutNode::Image { .. }));

    let summary = doc.summary.as_ref().unwrap();
    assert_eq!(summary.ocr_pages, 2);
    assert_eq!(summary.excluded_label(), "1 (2)");
}

#[test]
fn test_failed_page_gets_notice() {
    let converter = Converter::new(ConvertOptions::new().with_summary(false)).unwrap();
    let mut pages = inputs(2);
    pages[0] = PageInput::failed(1, Error::Ocr("deadline exceeded".into()));
    let doc = converter.convert(pages);

    let failed = doc.get_page(1).unwrap();
    assert_eq!(
        failed.status,
        PageStatus::Failed {
            reason: "deadline exceeded".into()
        }
    );
    let notice = failed
        .nodes
        .iter()
        .find_map(|n| match n {
            LayoutNode::Notice(notice) => Some(notice),
            _ => None,
        })
        .unwrap();
    assert_eq!(notice.kind, NoticeKind::OcrFailed);
    assert_eq!(notice.text, "[OCR error: deadline exceeded]");

    // The other page is unaffected.
    assert_eq!(doc.get_page(2).unwrap().status, PageStatus::Reconstructed);
}

#[test]
fn test_failed_pages_excluded_from_mean_confidence() {
    let converter = Converter::new(ConvertOptions::new()).unwrap();
    let pages = vec![
        PageInput::recognized(1, text_page("a", 0.8)),
        PageInput::failed(2, Error::Ocr("x".into())),
        PageInput::recognized(3, text_page("b", 1.0)),
        PageInput::recognized(4, text_page("c", 0.0)),
    ];
    let summary = converter.summarize(&pages);

    assert_eq!(summary.total_pages, 4);
    assert_eq!(summary.confidence_label(), "90.0%");
    assert_eq!(summary.languages_label(3), "FR (90%)");
}

#[test]
fn test_sequential_and_parallel_agree() {
    let parallel = Converter::new(ConvertOptions::new().with_summary(false)).unwrap();
    let sequential = Converter::new(ConvertOptions::new().with_summary(false).sequential()).unwrap();

    let a = parallel.convert(inputs(12));
    let b = sequential.convert(inputs(12));

    assert_eq!(a.pages, b.pages);
    let numbers: Vec<u32> = a.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, (1..=12).collect::<Vec<_>>());
}

#[test]
fn test_progress_events() {
    let (sender, receiver) = crossbeam_channel::unbounded::<ProgressEvent>();
    let converter = Converter::new(ConvertOptions::new().with_excluded(PageSet::parse("3")))
        .unwrap()
        .with_progress(sender);

    let mut pages = inputs(4);
    pages[2] = PageInput::unrecognized(3);
    converter.convert(pages);
    drop(converter);

    let mut events: Vec<ProgressEvent> = receiver.iter().collect();
    events.sort_by_key(|e| e.page);

    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.total == 4));
    assert_eq!(events[2].status, PageStatus::Excluded);
    assert_eq!(events[0].status, PageStatus::Reconstructed);
}

#[test]
fn test_lines_mode_transcribes_full_text() {
    let converter = Converter::new(ConvertOptions::new().with_mode(OutputMode::Lines)).unwrap();
    let doc = converter.convert(inputs(1));

    let page = doc.get_page(1).unwrap();
    assert_eq!(page.status, PageStatus::Transcribed);
    let texts: Vec<&str> = page
        .nodes
        .iter()
        .filter_map(|n| n.as_paragraph())
        .map(|p| p.text.as_str())
        .collect();
    assert_eq!(texts, vec!["page 1", "second line"]);

    // The summary is computed but only prefixed in layout mode.
    assert!(doc.summary.is_some());
    assert!(matches!(page.nodes[0], LayoutNode::Image { .. }));
}

#[test]
fn test_image_only_mode() {
    let converter = Converter::new(ConvertOptions::new().with_mode(OutputMode::ImageOnly)).unwrap();
    let pages = (1..=3)
        .map(|n| PageInput::unrecognized(n).with_image(format!("p{}.png", n)))
        .collect();
    let doc = converter.convert(pages);

    assert!(doc.summary.is_none());
    assert!(doc.pages.iter().all(|p| p.status == PageStatus::ImageOnly));
    assert!(doc.pages.iter().all(|p| p.nodes.len() == 1));
}

#[test]
fn test_recognize_all_with_provider() {
    let converter = Converter::new(ConvertOptions::new().with_excluded(PageSet::parse("2"))).unwrap();
    let sources: Vec<PathBuf> = ["one.json", "two.json", "broken.json"]
        .iter()
        .map(PathBuf::from)
        .collect();

    let recognized = converter.recognize_all(&MockProvider, &sources);
    assert_eq!(recognized.len(), 3);
    assert!(matches!(recognized[0].ocr, Some(Ok(_))));
    assert!(recognized[1].ocr.is_none());
    assert!(matches!(recognized[2].ocr, Some(Err(_))));

    let doc = converter.convert(recognized);
    assert_eq!(doc.get_page(1).unwrap().status, PageStatus::Reconstructed);
    assert_eq!(doc.get_page(2).unwrap().status, PageStatus::Excluded);
    assert!(matches!(
        doc.get_page(3).unwrap().status,
        PageStatus::Failed { .. }
    ));
    assert!(doc.plain_text().contains("text of one"));
}

#[test]
fn test_invalid_rules_rejected() {
    let rules = unscan::RuleSet::from_json(
        r#"{ "roles": [ { "role": "title", "when": { "type": "matches", "patterns": ["(unclosed"] } } ] }"#,
    )
    .unwrap();
    let result = Converter::new(ConvertOptions::new().with_rules(rules));
    assert!(matches!(result, Err(Error::InvalidPattern { .. })));
}

#[test]
fn test_excluded_first_page_drops_summary_nodes() {
    let converter = Converter::new(ConvertOptions::new().with_excluded(PageSet::parse("1"))).unwrap();
    let mut pages = inputs(2);
    pages[0] = PageInput::unrecognized(1).with_image("images/page-001.png");
    let doc = converter.convert(pages);

    let summary = doc.summary.as_ref().unwrap();
    assert_eq!(summary.excluded_label(), "1 (1)");

    let first = doc.get_page(1).unwrap();
    assert_eq!(first.status, PageStatus::Excluded);
    assert_eq!(first.nodes.len(), 1);
    assert!(matches!(first.nodes[0], LayoutNode::Image { .. }));

    let second = doc.get_page(2).unwrap();
    assert!(second
        .nodes
        .iter()
        .filter_map(|n| n.as_paragraph())
        .all(|p| p.text != "CONVERTED DOCUMENT"));
}
