use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR backend not available: {0}")]
    BackendUnavailable(String),

    #[error("Tesseract language data not found for '{lang}'. Install tesseract-ocr-{lang}")]
    LanguageDataNotFound { lang: String },

    #[error("OCR invocation failed: {details}")]
    InvocationFailed { details: String },

    #[error("Invalid image for OCR: {details}")]
    InvalidImage { details: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl OcrError {
    /// Configuration problems are detected up front and degrade the
    /// feature set; they are never retried per page.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            OcrError::BackendUnavailable(_) | OcrError::LanguageDataNotFound { .. }
        )
    }
}
