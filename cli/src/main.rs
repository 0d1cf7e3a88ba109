//! unscan CLI - layout reconstruction for OCR'd scans

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

use unscan::{
    image_for, ConfidenceLevel, ConvertOptions, Converter, Document, JsonFormat, LayoutStats,
    OutputMode, PageSet, PageStatus, RenderOptions, RuleSet, VisionFileProvider,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "unscan")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rebuild scanned-page layouts from OCR output as Markdown, text, and JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert OCR output to all formats (Markdown, text, JSON)
    Convert {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Convert OCR output to Markdown
    #[command(alias = "md")]
    Markdown {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Hide low-confidence markers
        #[arg(long)]
        no_markers: bool,

        /// Pages to render (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Convert OCR output to plain text
    Text {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Pages to render (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Convert OCR output to JSON
    Json {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Pages to include (e.g., "1-3, 5")
        #[arg(long, value_name = "RANGE")]
        pages: Option<String>,
    },

    /// Show conversion summary and layout statistics
    Info {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the summary and statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a page-range expression and print it in compact form
    Pages {
        /// Page range (e.g., "1-3, 5")
        #[arg(value_name = "RANGE")]
        range: String,

        /// Drop pages outside 1..=TOTAL
        #[arg(long, value_name = "TOTAL")]
        total: Option<u32>,
    },

    /// Show version information
    Version,
}

/// Where pages come from and how they are converted.
#[derive(Args)]
struct SourceArgs {
    /// Stored OCR responses, one file per page in page order, or a directory of them
    #[arg(value_name = "FILES", required = true)]
    inputs: Vec<PathBuf>,

    /// Directory holding page images named after each response (<stem>.png)
    #[arg(long, value_name = "DIR")]
    images: Option<PathBuf>,

    /// Pages to keep as images only (e.g., "1-3,5")
    #[arg(long, value_name = "PAGES")]
    exclude: Option<String>,

    /// Output mode
    #[arg(long, value_enum, default_value = "layout")]
    mode: ModeArg,

    /// Rule set: a JSON file or a preset name (default, fmea-fr)
    #[arg(long, value_name = "FILE", env = "UNSCAN_RULES")]
    rules: Option<String>,

    /// Source name shown in the summary
    #[arg(long)]
    name: Option<String>,

    /// Process pages one at a time
    #[arg(long)]
    sequential: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Image, then the reconstructed layout (default)
    Layout,
    /// Image, then the OCR text line by line
    Lines,
    /// Image only, no OCR
    ImageOnly,
}

impl From<ModeArg> for OutputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Layout => OutputMode::Layout,
            ModeArg::Lines => OutputMode::Lines,
            ModeArg::ImageOnly => OutputMode::ImageOnly,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert { source, output }) => cmd_convert(&source, output.as_deref()),
        Some(Commands::Markdown {
            source,
            output,
            no_markers,
            pages,
        }) => cmd_markdown(&source, output.as_deref(), no_markers, pages.as_deref()),
        Some(Commands::Text {
            source,
            output,
            pages,
        }) => cmd_text(&source, output.as_deref(), pages.as_deref()),
        Some(Commands::Json {
            source,
            output,
            compact,
            pages,
        }) => cmd_json(&source, output.as_deref(), compact, pages.as_deref()),
        Some(Commands::Info { source, json }) => cmd_info(&source, json),
        Some(Commands::Pages { range, total }) => {
            cmd_pages(&range, total);
            Ok(())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: unscan <COMMAND> <FILES>...".yellow());
            println!("       unscan --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Expand inputs: directories contribute their `.json` files in name order.
fn collect_sources(inputs: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut files: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            files.sort();
            sources.extend(files);
        } else {
            sources.push(input.clone());
        }
    }
    log::debug!("Collected {} OCR response files", sources.len());
    if sources.is_empty() {
        return Err("no OCR response files found".into());
    }
    Ok(sources)
}

fn load_rules(spec: Option<&str>) -> CliResult<RuleSet> {
    match spec {
        None => Ok(RuleSet::default()),
        Some(name) if RuleSet::PRESETS.contains(&name) && !Path::new(name).exists() => {
            log::debug!("Using rule preset '{}'", name);
            Ok(RuleSet::preset(name)?)
        }
        Some(path) => {
            log::debug!("Loading rules from {}", path);
            Ok(RuleSet::load(path)?)
        }
    }
}

fn convert_options(source: &SourceArgs, sources: &[PathBuf]) -> CliResult<ConvertOptions> {
    let name = source.name.clone().unwrap_or_else(|| {
        let first = &source.inputs[0];
        first
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| first.display().to_string())
    });

    let mut options = ConvertOptions::new()
        .with_mode(source.mode.into())
        .with_source_name(name)
        .with_rules(load_rules(source.rules.as_deref())?);

    if let Some(ref exclude) = source.exclude {
        let excluded = PageSet::parse(exclude);
        let total = sources.len() as u32;
        if excluded.within(total).len() != excluded.len() {
            eprintln!(
                "{} excluded pages outside 1-{} are ignored",
                "Warning:".yellow(),
                total
            );
        }
        options = options.with_excluded(excluded);
    }
    if source.sequential {
        options = options.sequential();
    }

    Ok(options)
}

/// Run the conversion with a progress bar fed by the converter's events.
fn run(source: &SourceArgs) -> CliResult<Document> {
    let sources = collect_sources(&source.inputs)?;
    let options = convert_options(source, &sources)?;

    let (sender, receiver) = crossbeam_channel::unbounded();
    let converter = Converter::new(options)?.with_progress(sender);

    let pb = ProgressBar::new(sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Recognizing pages...");

    let doc = std::thread::scope(|scope| {
        scope.spawn(|| {
            for event in receiver.iter() {
                pb.set_message(format!("page {} {}", event.page, status_label(&event.status)));
                pb.inc(1);
            }
        });

        let mut inputs = converter.recognize_all(&VisionFileProvider::new(), &sources);
        if let Some(ref dir) = source.images {
            for (input, path) in inputs.iter_mut().zip(&sources) {
                input.image = Some(image_for(dir, path));
            }
        }
        let doc = converter.convert(inputs);

        // Closing the channel ends the progress thread.
        drop(converter);
        doc
    });

    pb.finish_and_clear();

    let failed = doc
        .pages
        .iter()
        .filter(|p| matches!(p.status, PageStatus::Failed { .. }))
        .count();
    if failed > 0 {
        eprintln!(
            "{} OCR failed on {} of {} pages",
            "Warning:".yellow(),
            failed,
            doc.page_count()
        );
    }

    Ok(doc)
}

fn status_label(status: &PageStatus) -> &'static str {
    match status {
        PageStatus::Reconstructed => "reconstructed",
        PageStatus::Transcribed => "transcribed",
        PageStatus::ImageOnly => "image only",
        PageStatus::Excluded => "excluded",
        PageStatus::Failed { .. } => "failed",
    }
}

fn render_options(pages: Option<&str>) -> RenderOptions {
    let options = RenderOptions::new();
    match pages {
        Some(p) => options.with_pages(PageSet::parse(p)),
        None => options,
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> CliResult<()> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_convert(source: &SourceArgs, output: Option<&Path>) -> CliResult<()> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let first = &source.inputs[0];
        let stem = first.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });

    fs::create_dir_all(&output_dir)?;

    let doc = run(source)?;
    let render_options = RenderOptions::new();

    let markdown = unscan::render::to_markdown(&doc, &render_options)?;
    fs::write(output_dir.join("extract.md"), &markdown)?;

    let text = unscan::render::to_text(&doc, &render_options)?;
    fs::write(output_dir.join("extract.txt"), &text)?;

    let json = unscan::render::to_json(&doc, JsonFormat::Pretty)?;
    fs::write(output_dir.join("content.json"), &json)?;

    println!("{} {}", "Output files in".green().bold(), output_dir.display());
    println!("  {} extract.md", "├─".dimmed());
    println!("  {} extract.txt", "├─".dimmed());
    println!("  {} content.json", "└─".dimmed());

    Ok(())
}

fn cmd_markdown(
    source: &SourceArgs,
    output: Option<&Path>,
    no_markers: bool,
    pages: Option<&str>,
) -> CliResult<()> {
    let doc = run(source)?;
    let options = render_options(pages).with_confidence_markers(!no_markers);
    let markdown = unscan::render::to_markdown(&doc, &options)?;
    write_or_print(output, &markdown)
}

fn cmd_text(source: &SourceArgs, output: Option<&Path>, pages: Option<&str>) -> CliResult<()> {
    let doc = run(source)?;
    let text = unscan::render::to_text(&doc, &render_options(pages))?;
    write_or_print(output, &text)
}

fn cmd_json(
    source: &SourceArgs,
    output: Option<&Path>,
    compact: bool,
    pages: Option<&str>,
) -> CliResult<()> {
    let doc = run(source)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = unscan::render::to_json_with_options(&doc, format, &render_options(pages))?;
    write_or_print(output, &json)
}

fn colorize_level(label: String, level: Option<ConfidenceLevel>) -> ColoredString {
    match level {
        Some(ConfidenceLevel::High) => label.as_str().green(),
        Some(ConfidenceLevel::Medium) => label.as_str().yellow(),
        Some(ConfidenceLevel::Low) => label.as_str().red(),
        None => label.as_str().dimmed(),
    }
}

/// Summary and layout statistics as a JSON object.
fn info_json(doc: &Document) -> CliResult<String> {
    let value = serde_json::json!({
        "pages": doc.page_count(),
        "summary": doc.summary,
        "stats": LayoutStats::from_pages(&doc.pages),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn cmd_info(source: &SourceArgs, json: bool) -> CliResult<()> {
    let doc = run(source)?;

    if json {
        println!("{}", info_json(&doc)?);
        return Ok(());
    }

    println!("{}", "Conversion Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    if let Some(ref summary) = doc.summary {
        println!("{}: {}", "Source".bold(), summary.source_name);
        println!("{}: {}", "Converted".bold(), summary.created_label());
        println!("{}: {}", "Pages".bold(), summary.total_pages);
        println!("{}: {}", "Pages with OCR".bold(), summary.ocr_pages);
        println!("{}: {}", "Excluded".bold(), summary.excluded_label());
        println!(
            "{}: {}",
            "Mean confidence".bold(),
            colorize_level(summary.confidence_label(), summary.confidence_level())
        );
        println!("{}: {}", "Languages".bold(), summary.languages_label(3));
    } else {
        println!("{}: {}", "Pages".bold(), doc.page_count());
        println!("{}", "No OCR in image-only mode".dimmed());
    }

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for page in &doc.pages {
        let confidence = if page.status.has_ocr() {
            colorize_level(
                format!("{:.1}%", page.confidence * 100.0),
                Some(ConfidenceLevel::from_score(page.confidence)),
            )
        } else {
            "-".dimmed()
        };
        println!(
            "  {:>4}  {:<14} {}",
            page.number,
            status_label(&page.status),
            confidence
        );
    }

    let stats = LayoutStats::from_pages(&doc.pages);
    let text = doc.plain_text();

    println!();
    println!("{}", "Layout Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!(
        "{}: {} ({} uncertain)",
        "Cells".bold(),
        stats.cell_count,
        stats.uncertain_cells
    );
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count());
    println!("  Titles: {}", stats.titles);
    println!("  Section headers: {}", stats.section_headers);
    println!("  Numbered items: {}", stats.numbered_items);
    println!("  Continuations: {}", stats.continuations);
    println!("  Page headers: {}", stats.page_headers);
    println!("{}: {}", "Low-confidence markers".bold(), stats.low_confidence_markers);
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());

    Ok(())
}

fn cmd_pages(range: &str, total: Option<u32>) {
    let pages = PageSet::parse(range);
    let pages = match total {
        Some(total) => pages.within(total),
        None => pages,
    };

    if pages.is_empty() {
        println!("{}", "None".dimmed());
    } else {
        println!("{} ({} pages)", pages.to_compact_string(), pages.len());
    }
}

fn cmd_version() {
    println!("{} {}", "unscan".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Layout reconstruction for OCR'd scans");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unscan".dimmed());
    println!("License: MIT");
}
