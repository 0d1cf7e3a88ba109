//! Document conversion around the layout engine.
//!
//! The [`Converter`] is the caller side of the engine: it decides per page
//! whether OCR applies (output mode and excluded pages), substitutes a
//! visible error notice for pages whose OCR failed, aggregates the
//! [`ConversionSummary`], and composes each page's image, banner and
//! reconstructed nodes into a [`Document`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use unscan::convert::{ConvertOptions, Converter};
//! use unscan::ocr::VisionFileProvider;
//!
//! fn main() -> unscan::Result<()> {
//!     let converter = Converter::new(ConvertOptions::new().with_source_name("scan.tif"))?;
//!     let sources = vec![PathBuf::from("page-001.json"), PathBuf::from("page-002.json")];
//!     let inputs = converter.recognize_all(&VisionFileProvider::new(), &sources);
//!     let doc = converter.convert(inputs);
//!     println!("{}", doc.plain_text());
//!     Ok(())
//! }
//! ```

mod summary;

pub use summary::summarize;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crossbeam_channel::Sender;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::{normalize, LayoutEngine, LayoutOptions, RuleSet};
use crate::model::{
    ConversionSummary, Document, LayoutNode, Notice, Page, PageContent, PageStatus,
    StyledParagraph, TextRole,
};
use crate::ocr::OcrProvider;
use crate::pages::PageSet;

/// How recognized pages are presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Image, then the reconstructed layout
    #[default]
    Layout,
    /// Image, then the OCR text line by line
    Lines,
    /// Image only, no OCR
    ImageOnly,
}

impl OutputMode {
    /// Check if this mode uses OCR at all.
    pub fn uses_ocr(&self) -> bool {
        !matches!(self, OutputMode::ImageOnly)
    }
}

impl FromStr for OutputMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "layout" => Ok(OutputMode::Layout),
            "lines" => Ok(OutputMode::Lines),
            "image-only" | "image" => Ok(OutputMode::ImageOnly),
            other => Err(Error::Other(format!("Unknown output mode: {}", other))),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputMode::Layout => "layout",
            OutputMode::Lines => "lines",
            OutputMode::ImageOnly => "image-only",
        })
    }
}

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Output mode
    pub mode: OutputMode,

    /// Pages to keep as images only
    pub excluded: PageSet,

    /// Source file name shown in the summary
    pub source_name: String,

    /// Whether to process pages in parallel
    pub parallel: bool,

    /// Whether to put a "Page n/N" banner before each page's text
    pub page_banner: bool,

    /// Whether to prepend the conversion summary to the first page
    pub summary: bool,

    /// Layout thresholds
    pub layout: LayoutOptions,

    /// Role and emphasis rules
    pub rules: RuleSet,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output mode.
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the excluded pages.
    pub fn with_excluded(mut self, excluded: PageSet) -> Self {
        self.excluded = excluded;
        self
    }

    /// Set the source name.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Enable or disable page banners.
    pub fn with_page_banner(mut self, banner: bool) -> Self {
        self.page_banner = banner;
        self
    }

    /// Enable or disable the summary.
    pub fn with_summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }

    /// Set layout options.
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Set the rule set.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            mode: OutputMode::Layout,
            excluded: PageSet::new(),
            source_name: "document".to_string(),
            parallel: true,
            page_banner: true,
            summary: true,
            layout: LayoutOptions::default(),
            rules: RuleSet::default(),
        }
    }
}

/// One page handed to the converter.
#[derive(Debug)]
pub struct PageInput {
    /// 1-indexed page number
    pub number: u32,

    /// Path to the page image, if any
    pub image: Option<PathBuf>,

    /// OCR outcome; `None` when OCR was not run for the page
    pub ocr: Option<Result<Page>>,
}

impl PageInput {
    /// A successfully recognized page.
    pub fn recognized(number: u32, page: Page) -> Self {
        Self {
            number,
            image: None,
            ocr: Some(Ok(page)),
        }
    }

    /// A page whose OCR failed.
    pub fn failed(number: u32, error: Error) -> Self {
        Self {
            number,
            image: None,
            ocr: Some(Err(error)),
        }
    }

    /// A page that was not sent to OCR.
    pub fn unrecognized(number: u32) -> Self {
        Self {
            number,
            image: None,
            ocr: None,
        }
    }

    /// Attach the page image.
    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image = Some(path.into());
        self
    }

    fn page(&self) -> Option<&Page> {
        self.ocr.as_ref().and_then(|r| r.as_ref().ok())
    }
}

/// Per-page progress, reported as each page completes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Page number
    pub page: u32,
    /// Total pages
    pub total: u32,
    /// How the page was processed
    pub status: PageStatus,
}

/// Converts OCR results into a [`Document`].
#[derive(Debug, Clone)]
pub struct Converter {
    options: ConvertOptions,
    engine: LayoutEngine,
    progress: Option<Sender<ProgressEvent>>,
}

impl Converter {
    /// Create a converter, compiling the rule set.
    pub fn new(options: ConvertOptions) -> Result<Self> {
        let engine = LayoutEngine::with_config(options.layout.clone(), &options.rules)?;
        Ok(Self {
            options,
            engine,
            progress: None,
        })
    }

    /// Report per-page progress on a channel.
    pub fn with_progress(mut self, sender: Sender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Get the conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Get the layout engine.
    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// Check if a page should go through OCR.
    pub fn needs_ocr(&self, number: u32) -> bool {
        self.options.mode.uses_ocr() && !self.options.excluded.contains(number)
    }

    /// Run a provider over page sources, one source per page in order.
    ///
    /// Pages that don't need OCR are skipped. A provider error stays attached
    /// to its page.
    pub fn recognize_all(&self, provider: &dyn OcrProvider, sources: &[PathBuf]) -> Vec<PageInput> {
        let recognize = |(index, source): (usize, &PathBuf)| {
            let number = index as u32 + 1;
            if self.needs_ocr(number) {
                PageInput {
                    number,
                    image: None,
                    ocr: Some(self.recognize_one(provider, source)),
                }
            } else {
                PageInput::unrecognized(number)
            }
        };

        if self.options.parallel {
            sources.par_iter().enumerate().map(recognize).collect()
        } else {
            sources.iter().enumerate().map(recognize).collect()
        }
    }

    fn recognize_one(&self, provider: &dyn OcrProvider, source: &Path) -> Result<Page> {
        let raw = provider.recognize(source).map_err(|e| {
            log::warn!(
                "{} failed on {}: {}",
                provider.name(),
                source.display(),
                e
            );
            e
        })?;
        Ok(normalize(&raw))
    }

    /// Aggregate the conversion summary for a set of inputs.
    pub fn summarize(&self, inputs: &[PageInput]) -> ConversionSummary {
        let total = inputs.len() as u32;
        for page in self.options.excluded.iter().filter(|p| *p == 0 || *p > total) {
            log::warn!("Excluded page {} is outside 1..={}", page, total);
        }
        summarize(
            self.options.source_name.clone(),
            total,
            &self.options.excluded,
            inputs
                .iter()
                .filter(|i| self.needs_ocr(i.number))
                .filter_map(PageInput::page),
        )
    }

    /// Convert page inputs into a document.
    ///
    /// Pages are built independently (in parallel unless disabled) and
    /// returned in input order.
    pub fn convert(&self, inputs: Vec<PageInput>) -> Document {
        let total = inputs.len() as u32;
        let summary = self.options.mode.uses_ocr().then(|| self.summarize(&inputs));
        let leading = summary
            .as_ref()
            .filter(|_| self.options.summary && self.options.mode == OutputMode::Layout);

        let build = |(index, input): (usize, PageInput)| {
            let prefix = if index == 0 { leading } else { None };
            let content = self.build_page(input, total, prefix);
            if let Some(ref sender) = self.progress {
                // A dropped receiver only means nobody is listening.
                let _ = sender.send(ProgressEvent {
                    page: content.number,
                    total,
                    status: content.status.clone(),
                });
            }
            content
        };

        let pages: Vec<PageContent> = if self.options.parallel {
            inputs.into_par_iter().enumerate().map(build).collect()
        } else {
            inputs.into_iter().enumerate().map(build).collect()
        };

        Document { summary, pages }
    }

    fn build_page(
        &self,
        input: PageInput,
        total: u32,
        summary: Option<&ConversionSummary>,
    ) -> PageContent {
        let number = input.number;
        let image = input.image.map(|path| LayoutNode::Image { path });

        if !self.needs_ocr(number) {
            let status = if self.options.mode.uses_ocr() {
                PageStatus::Excluded
            } else {
                PageStatus::ImageOnly
            };
            let mut content = PageContent::new(number, status);
            match image {
                Some(node) => content.push(node),
                None => content.push(LayoutNode::Notice(Notice::note(format!(
                    "[Page {} has no image]",
                    number
                )))),
            }
            return content;
        }

        let outcome = input
            .ocr
            .unwrap_or_else(|| Err(Error::Ocr("page was not recognized".into())));

        let (mut content, body) = match outcome {
            Ok(page) => {
                let (status, body) = match self.options.mode {
                    OutputMode::Lines => (PageStatus::Transcribed, line_nodes(&page)),
                    _ => (PageStatus::Reconstructed, self.engine.reconstruct(&page)),
                };
                let content = PageContent::new(number, status)
                    .with_confidence(page.confidence)
                    .with_languages(page.languages);
                (content, body)
            }
            Err(e) => {
                log::warn!("OCR failed for page {}: {}", number, e);
                let reason = match e {
                    Error::Ocr(message) => message,
                    other => other.to_string(),
                };
                let notice = LayoutNode::Notice(Notice::ocr_failed(&reason));
                (PageContent::new(number, PageStatus::Failed { reason }), vec![notice])
            }
        };

        if let Some(summary) = summary {
            content.nodes.extend(crate::layout::summary_nodes(summary));
        }
        if let Some(node) = image {
            content.push(node);
            content.push(LayoutNode::PageBreak);
        }
        if self.options.page_banner {
            let confidence = (content.confidence > 0.0).then_some(content.confidence);
            content.push(LayoutNode::PageBanner {
                number,
                total,
                confidence,
            });
        }
        content.nodes.extend(body);
        content
    }
}

/// One body paragraph per non-blank line of the OCR full text.
fn line_nodes(page: &Page) -> Vec<LayoutNode> {
    let nodes: Vec<LayoutNode> = page
        .full_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| LayoutNode::Paragraph(StyledParagraph::new(line, TextRole::Body)))
        .collect();
    if nodes.is_empty() {
        vec![LayoutNode::Notice(Notice::no_text())]
    } else {
        nodes
    }
}
