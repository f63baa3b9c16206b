//! The extraction pipeline: per page, try the embedded text layer first,
//! fall back to rasterize → enhance → OCR for scanned pages, then run
//! language detection and script-aware correction, and assemble the
//! page-marked output.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::correction::{remove_extra_spaces, TextCorrector};
use crate::enhance::ImageEnhancer;
use crate::errors::{ExtractionError, PageError};
use crate::language::{LanguageDetector, LanguageSet, DEFAULT_MIN_CHUNK_LENGTH};
use crate::ocr::{CapabilityReport, OcrBackend, TesseractCli};
use crate::page_range::parse_page_range;
use crate::pdf::SourceDocument;

pub const DEFAULT_DPI: u32 = 300;

/// Immutable per-run processing options, built at the boundary and passed
/// in. The core keeps no ambient settings state.
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub use_ocr: bool,
    pub detect_language: bool,
    pub manual_languages: Option<LanguageSet>,
    pub enhance_images: bool,
    pub correct_spelling: bool,
    pub remove_extra_spaces: bool,
    pub min_chunk_length: usize,
    pub dpi: u32,
    /// Where per-page preview images land; defaults to the document's
    /// own directory.
    pub image_dir: Option<PathBuf>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            use_ocr: true,
            detect_language: true,
            manual_languages: None,
            enhance_images: true,
            correct_spelling: true,
            remove_extra_spaces: false,
            min_chunk_length: DEFAULT_MIN_CHUNK_LENGTH,
            dpi: DEFAULT_DPI,
            image_dir: None,
        }
    }
}

/// Which path produced a page's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSource {
    Embedded,
    Ocr,
    Empty,
}

/// Per-page processing record, exposed so callers can see which pages
/// degraded instead of divining it from a shorter-than-expected output.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub index: usize,
    pub source: PageSource,
    pub languages: LanguageSet,
    pub degraded: bool,
    pub error: Option<String>,
}

/// Aggregate result of one extraction run.
#[derive(Debug)]
pub struct ExtractionResult {
    pub text: String,
    pub total_pages: usize,
    pub processed_pages: Vec<usize>,
    pub page_languages: HashMap<usize, LanguageSet>,
    pub ocr_used: bool,
    pub reports: Vec<PageReport>,
}

/// Serializable metadata record handed to callers alongside the text.
#[derive(Debug, Serialize)]
pub struct ExtractionMetadata {
    pub total_pages: usize,
    pub processed_pages: Vec<usize>,
    pub ocr_used: bool,
    pub languages_detected: Vec<String>,
}

impl ExtractionResult {
    pub fn metadata(&self) -> ExtractionMetadata {
        let mut languages: Vec<String> = Vec::new();
        for index in &self.processed_pages {
            if let Some(set) = self.page_languages.get(index) {
                for code in set.iter() {
                    if !languages.iter().any(|l| l == code) {
                        languages.push(code.to_string());
                    }
                }
            }
        }
        ExtractionMetadata {
            total_pages: self.total_pages,
            processed_pages: self.processed_pages.clone(),
            ocr_used: self.ocr_used,
            languages_detected: languages,
        }
    }
}

/// The top-level extraction pipeline.
pub struct Extractor {
    options: ExtractionOptions,
    detector: LanguageDetector,
    enhancer: ImageEnhancer,
    corrector: TextCorrector,
    backend: Box<dyn OcrBackend>,
    capabilities: CapabilityReport,
}

impl Extractor {
    pub fn new(options: ExtractionOptions) -> Self {
        Self::with_backend(options, Box::new(TesseractCli::new()))
    }

    /// Construct with a caller-supplied OCR backend. This is the seam
    /// tests use to run the pipeline without external binaries.
    pub fn with_backend(options: ExtractionOptions, backend: Box<dyn OcrBackend>) -> Self {
        let capabilities = CapabilityReport::probe();
        let detector = LanguageDetector::new(options.min_chunk_length);
        let corrector = TextCorrector::new(options.correct_spelling);
        Self {
            options,
            detector,
            enhancer: ImageEnhancer::new(),
            corrector,
            backend,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> &CapabilityReport {
        &self.capabilities
    }

    /// Run the pipeline over `path`, processing the pages selected by
    /// `page_range` (empty means all) in ascending order.
    pub fn extract(
        &self,
        path: &Path,
        page_range: &str,
    ) -> Result<ExtractionResult, ExtractionError> {
        let document = SourceDocument::open(path)?;
        let total_pages = document.total_pages();
        let pages = parse_page_range(page_range, Some(total_pages))?;

        info!(
            path = %path.display(),
            total_pages,
            selected = pages.len(),
            "starting extraction"
        );

        let mut blocks: Vec<(usize, String)> = Vec::new();
        let mut page_languages = HashMap::new();
        let mut reports = Vec::new();
        let mut ocr_used = false;

        for &index in &pages {
            let report = self.process_page(&document, index, &mut blocks);
            if report.source == PageSource::Ocr {
                ocr_used = true;
            }
            page_languages.insert(index, report.languages.clone());
            reports.push(report);
        }

        let mut text = String::new();
        for (index, block) in &blocks {
            text.push_str(&format!("\n--- Page {} ---\n", index + 1));
            text.push_str(block);
            text.push('\n');
        }
        let mut text = text.trim().to_string();
        if self.options.remove_extra_spaces {
            text = remove_extra_spaces(&text);
        }

        Ok(ExtractionResult {
            text,
            total_pages,
            processed_pages: pages.into_iter().collect(),
            page_languages,
            ocr_used,
            reports,
        })
    }

    /// Process one page through the state machine: embedded text if the
    /// page has a text layer, OCR fallback otherwise. Page-level failures
    /// are recovered here as empty blocks; only document-level problems
    /// ever escape this function's caller.
    fn process_page(
        &self,
        document: &SourceDocument,
        index: usize,
        blocks: &mut Vec<(usize, String)>,
    ) -> PageReport {
        let embedded = document.page_text(index);

        if !embedded.trim().is_empty() {
            debug!(page = index + 1, "page has embedded text layer");
            let languages = self.resolve_languages(&embedded);
            let outcome = self.corrector.correct(&embedded, &languages);
            blocks.push((index, outcome.text.trim().to_string()));
            return PageReport {
                index,
                source: PageSource::Embedded,
                languages,
                degraded: outcome.degraded,
                error: outcome.reason,
            };
        }

        if !self.options.use_ocr {
            debug!(page = index + 1, "no text layer and OCR disabled");
            blocks.push((index, String::new()));
            return PageReport {
                index,
                source: PageSource::Empty,
                languages: self.manual_or_default(),
                degraded: true,
                error: Some("no embedded text and OCR disabled".to_string()),
            };
        }

        if !self.capabilities.ocr_available() && !self.backend.is_available() {
            warn!(page = index + 1, "no text layer and OCR backend unavailable");
            blocks.push((index, String::new()));
            return PageReport {
                index,
                source: PageSource::Empty,
                languages: self.manual_or_default(),
                degraded: true,
                error: Some("OCR backend unavailable".to_string()),
            };
        }

        match self.ocr_page(document, index) {
            Ok((text, languages, degraded, reason)) => {
                blocks.push((index, text.trim().to_string()));
                PageReport {
                    index,
                    source: PageSource::Ocr,
                    languages,
                    degraded,
                    error: reason,
                }
            }
            Err(e) => {
                warn!(page = index + 1, %e, "page processing failed, contributing empty block");
                blocks.push((index, String::new()));
                PageReport {
                    index,
                    source: PageSource::Ocr,
                    languages: self.manual_or_default(),
                    degraded: true,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// The OCR path: rasterize, enhance, persist the preview image, run
    /// the engine, correct.
    fn ocr_page(
        &self,
        document: &SourceDocument,
        index: usize,
    ) -> Result<(String, LanguageSet, bool, Option<String>), PageError> {
        let raster = document.rasterize_page(index, self.options.dpi)?;

        let mut degraded = false;
        let mut reason: Option<String> = None;

        // The preview keeps the native geometry; the engine gets the
        // resolution-normalized image, binarized when enhancement is on.
        let (preview, ocr_input) = if self.options.enhance_images {
            let outcome = self.enhancer.enhance(&raster);
            degraded |= outcome.degraded;
            if reason.is_none() {
                reason = outcome.reason;
            }
            let enhanced = image::DynamicImage::ImageLuma8(outcome.image);
            let resized = self.enhancer.smart_resize_for_ocr(enhanced.clone());
            let ocr_input = match self.enhancer.binarize(&resized.to_luma8()) {
                Ok(binary) => image::DynamicImage::ImageLuma8(binary),
                Err(cause) => {
                    warn!(page = index + 1, %cause, "binarization skipped, passing enhanced image to OCR");
                    degraded = true;
                    reason.get_or_insert(cause);
                    resized
                }
            };
            (enhanced, ocr_input)
        } else {
            let ocr_input = self.enhancer.smart_resize_for_ocr(raster.clone());
            (raster, ocr_input)
        };

        let preview_path = document.page_image_path(index, self.options.image_dir.as_deref());
        if let Err(e) = preview.save(&preview_path) {
            warn!(page = index + 1, %e, "failed to persist page preview image");
        }

        let scratch = tempfile::tempdir().map_err(|e| PageError::Rasterization {
            page: index,
            details: e.to_string(),
        })?;
        let ocr_image_path = scratch.path().join(format!("ocr_page_{}.png", index + 1));
        ocr_input
            .save(&ocr_image_path)
            .map_err(|e| PageError::ImageLoad {
                page: index,
                details: e.to_string(),
            })?;

        let languages = if self.options.detect_language {
            // First pass with the default language set just to get a
            // sample for detection; second pass with the resolved set.
            let sample = self
                .backend
                .recognize(&ocr_image_path, &LanguageSet::default())
                .unwrap_or_default();
            self.detector.detect(&sample)
        } else {
            self.manual_or_default()
        };

        let text = self
            .backend
            .recognize(&ocr_image_path, &languages)
            .map_err(|source| PageError::Ocr {
                page: index,
                source,
            })?;

        let outcome = self.corrector.correct(&text, &languages);
        degraded |= outcome.degraded;
        if reason.is_none() {
            reason = outcome.reason;
        }

        Ok((outcome.text, languages, degraded, reason))
    }

    /// Language resolution priority for pages with embedded text:
    /// detection on the page's own text, then manual selection, then the
    /// default.
    fn resolve_languages(&self, sample: &str) -> LanguageSet {
        if self.options.detect_language {
            self.detector.detect(sample)
        } else {
            self.manual_or_default()
        }
    }

    fn manual_or_default(&self) -> LanguageSet {
        self.options
            .manual_languages
            .clone()
            .unwrap_or_default()
    }
}
