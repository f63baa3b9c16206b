use std::path::PathBuf;

use thiserror::Error;

use crate::ocr::OcrError;
use crate::page_range::PageRangeError;

/// Document-level failures. These abort the whole extraction call;
/// everything page-scoped is recovered locally as a [`PageError`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    InvalidPageRange(#[from] PageRangeError),

    #[error("Unsupported file type: {path}")]
    UnsupportedFileType { path: PathBuf },

    #[error("Cannot open or parse document {path}: {source}")]
    DocumentUnreadable {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures scoped to a single page. The orchestrator logs these, records
/// them in the page report, and continues with an empty text block.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Failed to rasterize page {page}: {details}")]
    Rasterization { page: usize, details: String },

    #[error("OCR failed on page {page}: {source}")]
    Ocr {
        page: usize,
        #[source]
        source: OcrError,
    },

    #[error("Failed to load page image for page {page}: {details}")]
    ImageLoad { page: usize, details: String },
}
