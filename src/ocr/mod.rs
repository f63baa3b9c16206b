//! The OCR engine seam.
//!
//! OCR is an external collaborator, not something this crate implements:
//! the [`OcrBackend`] trait is the contract, and [`TesseractCli`] fulfils
//! it by shelling out to the tesseract binary. Tests substitute their own
//! implementations.

pub mod error;
pub mod health;

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::language::LanguageSet;
pub use error::OcrError;
pub use health::{CapabilityReport, OcrHealthChecker};

/// A recognition engine that turns a preprocessed page image into text.
pub trait OcrBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the engine can actually run right now.
    fn is_available(&self) -> bool;

    /// Recognize text in the image, constrained to the given languages.
    fn recognize(&self, image_path: &Path, languages: &LanguageSet) -> Result<String, OcrError>;
}

/// Tesseract invoked via its command line.
pub struct TesseractCli {
    /// Page segmentation mode; 6 ("assume a uniform block of text") works
    /// best for full scanned pages.
    psm: u8,
}

impl TesseractCli {
    pub fn new() -> Self {
        Self { psm: 6 }
    }

    pub fn with_page_seg_mode(psm: u8) -> Self {
        Self { psm }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractCli {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        OcrHealthChecker::new().check_tesseract_installation().is_ok()
    }

    fn recognize(&self, image_path: &Path, languages: &LanguageSet) -> Result<String, OcrError> {
        let lang = languages.join();
        debug!(image = %image_path.display(), %lang, "running tesseract");

        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &lang])
            .args(["--psm", &self.psm.to_string()])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                if stderr.contains("Failed loading language") {
                    Err(OcrError::LanguageDataNotFound { lang })
                } else {
                    Err(OcrError::InvocationFailed {
                        details: stderr.trim().to_string(),
                    })
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrError::BackendUnavailable(
                "tesseract not found (install tesseract-ocr)".to_string(),
            )),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}
