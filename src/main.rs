use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scantext::config::Config;
use scantext::extract::{ExtractionOptions, Extractor};
use scantext::format::{render, OutputFormat};
use scantext::language::LanguageSet;
use scantext::ocr::{OcrHealthChecker, TesseractCli};

/// Convert scanned or rendered PDF pages into corrected, searchable text.
#[derive(Parser, Debug)]
#[command(name = "scantext", version, about)]
struct Args {
    /// PDF or image file to process.
    input: PathBuf,

    /// Page range, e.g. "1-3,5". Empty means all pages.
    #[arg(short, long, default_value = "")]
    pages: String,

    /// Disable the OCR fallback for pages without a text layer.
    #[arg(long)]
    no_ocr: bool,

    /// OCR languages (Tesseract codes, comma separated). Disables
    /// automatic language detection.
    #[arg(short, long, value_delimiter = ',')]
    lang: Vec<String>,

    /// Skip image enhancement before OCR.
    #[arg(long)]
    no_enhance: bool,

    /// Skip statistical spell correction for Latin-script text.
    #[arg(long)]
    no_spelling: bool,

    /// Collapse runs of spaces and excess blank lines in the output.
    #[arg(long)]
    remove_extra_spaces: bool,

    /// Rasterization resolution for the OCR path.
    #[arg(long)]
    dpi: Option<u32>,

    /// Tesseract page segmentation mode.
    #[arg(long, default_value_t = 6)]
    psm: u8,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Txt)]
    format: OutputFormat,

    /// Output file. Defaults to stdout for text formats; required for docx.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the extraction metadata record as JSON to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let manual_languages = if args.lang.is_empty() {
        None
    } else {
        let set = LanguageSet::from_codes(&args.lang);
        if let Err(e) = OcrHealthChecker::new().validate_language_combination(&set.join()) {
            warn!(%e, "requested OCR languages may not be installed");
        }
        Some(set)
    };

    let options = ExtractionOptions {
        use_ocr: !args.no_ocr,
        detect_language: manual_languages.is_none(),
        manual_languages,
        enhance_images: !args.no_enhance,
        correct_spelling: !args.no_spelling,
        remove_extra_spaces: args.remove_extra_spaces,
        min_chunk_length: config.min_chunk_length,
        dpi: args.dpi.unwrap_or(config.dpi),
        image_dir: config.image_dir,
    };

    let extractor =
        Extractor::with_backend(options, Box::new(TesseractCli::with_page_seg_mode(args.psm)));
    if !extractor.capabilities().ocr_available() {
        warn!("degraded capabilities:\n{}", extractor.capabilities());
    }

    let result = extractor.extract(&args.input, &args.pages)?;
    info!(
        pages = result.processed_pages.len(),
        ocr_used = result.ocr_used,
        "extraction finished"
    );

    if args.verbose {
        eprintln!("{}", serde_json::to_string_pretty(&result.metadata())?);
    }

    let rendered = render(&result.text, args.format)?;
    match &args.output {
        Some(path) => fs::write(path, rendered)?,
        None if args.format == OutputFormat::Docx => {
            anyhow::bail!("--output is required for docx format")
        }
        None => {
            std::io::stdout().write_all(&rendered)?;
            println!();
        }
    }

    Ok(())
}
