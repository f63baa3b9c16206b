//! Document access: embedded text via lopdf, rasterization via the
//! poppler `pdftoppm` binary. Standalone image files are treated as
//! one-page documents with no text layer, so they always take the OCR
//! path.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::errors::{ExtractionError, PageError};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

enum Source {
    Pdf(lopdf::Document),
    Image,
}

/// An opened document, immutable for the duration of one pipeline run.
pub struct SourceDocument {
    path: PathBuf,
    source: Source,
    total_pages: usize,
}

impl SourceDocument {
    /// Open a PDF or image file. Unsupported extensions are a validation
    /// failure; a PDF that cannot be parsed is a document-level fatal
    /// error.
    pub fn open(path: &Path) -> Result<Self, ExtractionError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if extension == "pdf" {
            let doc = lopdf::Document::load(path).map_err(|source| {
                ExtractionError::DocumentUnreadable {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            let total_pages = doc.get_pages().len();
            debug!(path = %path.display(), total_pages, "opened PDF document");
            Ok(Self {
                path: path.to_path_buf(),
                source: Source::Pdf(doc),
                total_pages,
            })
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Ok(Self {
                path: path.to_path_buf(),
                source: Source::Image,
                total_pages: 1,
            })
        } else {
            Err(ExtractionError::UnsupportedFileType {
                path: path.to_path_buf(),
            })
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// The page's embedded text layer, if any. An empty result is a
    /// normal state meaning "scanned page, use OCR", never an error.
    pub fn page_text(&self, index: usize) -> String {
        match &self.source {
            Source::Pdf(doc) => {
                let page_number = (index + 1) as u32;
                match doc.extract_text(&[page_number]) {
                    Ok(text) => text,
                    Err(e) => {
                        debug!(page = page_number, %e, "no extractable text layer");
                        String::new()
                    }
                }
            }
            Source::Image => String::new(),
        }
    }

    /// Rasterize one page at the given resolution. For image inputs the
    /// file itself is the page.
    pub fn rasterize_page(&self, index: usize, dpi: u32) -> Result<DynamicImage, PageError> {
        match &self.source {
            Source::Image => image::open(&self.path).map_err(|e| PageError::ImageLoad {
                page: index,
                details: e.to_string(),
            }),
            Source::Pdf(_) => {
                let temp = tempfile::tempdir().map_err(|e| PageError::Rasterization {
                    page: index,
                    details: e.to_string(),
                })?;
                let image_path = pdftoppm(&self.path, index + 1, dpi, temp.path(), self.total_pages)
                    .map_err(|details| PageError::Rasterization {
                        page: index,
                        details,
                    })?;
                image::open(&image_path).map_err(|e| PageError::ImageLoad {
                    page: index,
                    details: e.to_string(),
                })
            }
        }
    }

    /// On-disk location for the page's rasterized/enhanced image, derived
    /// from the source path and the 1-based page number so the page
    /// viewer can find it without rerunning OCR.
    pub fn page_image_path(&self, index: usize, image_dir: Option<&Path>) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let file_name = format!("{}_page_{}.png", stem, index + 1);
        match image_dir {
            Some(dir) => dir.join(file_name),
            None => self
                .path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(file_name),
        }
    }
}

/// Render a single 1-based PDF page to a PNG with poppler and return the
/// generated file's path.
fn pdftoppm(
    pdf_path: &Path,
    page: usize,
    dpi: u32,
    out_dir: &Path,
    total_pages: usize,
) -> Result<PathBuf, String> {
    let page_arg = page.to_string();
    let prefix = out_dir.join("page");

    let status = Command::new("pdftoppm")
        .args(["-png", "-r", &dpi.to_string(), "-f", &page_arg, "-l", &page_arg])
        .arg(pdf_path)
        .arg(&prefix)
        .status();

    match status {
        Ok(s) if s.success() => find_page_image(out_dir, page, total_pages)
            .ok_or_else(|| format!("pdftoppm produced no image for page {page}")),
        Ok(_) => Err("pdftoppm failed to convert PDF page".to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err("pdftoppm not found (install poppler-utils)".to_string())
        }
        Err(e) => Err(e.to_string()),
    }
}

/// pdftoppm zero-pads page numbers in output names to the width of the
/// document's last page number. Try that width first, then probe the
/// small widths in case a build pads differently.
pub(crate) fn find_page_image(dir: &Path, page: usize, total_pages: usize) -> Option<PathBuf> {
    let derived = total_pages.max(1).to_string().len();
    let widths = std::iter::once(derived).chain([1, 2, 3, 4].into_iter().filter(|w| *w != derived));
    for digits in widths {
        let candidate = dir.join(format!("page-{page:0digits$}.png"));
        if candidate.exists() {
            return Some(candidate);
        }
    }
    warn!(page, "generated page image not found under expected names");
    None
}
