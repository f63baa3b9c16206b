//! Proactive capability checks for the external OCR and rasterization
//! collaborators, run once at pipeline startup. Missing capabilities
//! degrade the feature set with a visible warning instead of crashing
//! mid-document.

use std::fmt;
use std::process::Command;

use tracing::warn;

use crate::ocr::error::OcrError;

pub struct OcrHealthChecker;

impl OcrHealthChecker {
    pub fn new() -> Self {
        Self
    }

    /// Check that the tesseract binary runs, returning its version line.
    pub fn check_tesseract_installation(&self) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg("--version")
            .output()
            .map_err(|_| OcrError::BackendUnavailable("tesseract not found".to_string()))?;

        if !output.status.success() {
            return Err(OcrError::BackendUnavailable(
                "tesseract --version failed".to_string(),
            ));
        }

        // Version output goes to stderr on some builds.
        let info = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };
        Ok(info.lines().next().unwrap_or("unknown").to_string())
    }

    /// The language packs tesseract reports as installed.
    pub fn get_available_languages(&self) -> Result<Vec<String>, OcrError> {
        let output = Command::new("tesseract")
            .arg("--list-langs")
            .output()
            .map_err(|_| OcrError::BackendUnavailable("tesseract not found".to_string()))?;

        if !output.status.success() {
            return Err(OcrError::BackendUnavailable(
                "tesseract --list-langs failed".to_string(),
            ));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        let mut languages: Vec<String> = listing
            .lines()
            .skip(1) // header: "List of available languages ..."
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        languages.sort();
        Ok(languages)
    }

    /// Validate a `+`-joined language combination against the installed
    /// packs.
    pub fn validate_language_combination(&self, combination: &str) -> Result<(), OcrError> {
        if combination.is_empty() {
            return Err(OcrError::LanguageDataNotFound {
                lang: "empty".to_string(),
            });
        }
        let available = self.get_available_languages()?;
        for lang in combination.split('+') {
            let lang = lang.trim();
            if !available.iter().any(|a| a == lang) {
                return Err(OcrError::LanguageDataNotFound {
                    lang: lang.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether the poppler rasterizer is on PATH.
    pub fn check_pdftoppm(&self) -> bool {
        Command::new("pdftoppm")
            .arg("-v")
            .output()
            .map(|output| {
                // pdftoppm prints its version banner and exits 0 or 99
                // depending on the build; existence is what matters here.
                !output.stderr.is_empty() || output.status.success()
            })
            .unwrap_or(false)
    }
}

impl Default for OcrHealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of what the external collaborators can do right now.
#[derive(Debug, Clone)]
pub struct CapabilityReport {
    pub tesseract_version: Option<String>,
    pub available_languages: Vec<String>,
    pub rasterizer_available: bool,
}

impl CapabilityReport {
    pub fn probe() -> Self {
        let checker = OcrHealthChecker::new();

        let tesseract_version = match checker.check_tesseract_installation() {
            Ok(version) => Some(version),
            Err(e) => {
                warn!(%e, "OCR engine unavailable, OCR fallback will be disabled");
                None
            }
        };

        let available_languages = if tesseract_version.is_some() {
            checker.get_available_languages().unwrap_or_default()
        } else {
            Vec::new()
        };

        let rasterizer_available = checker.check_pdftoppm();
        if !rasterizer_available {
            warn!("pdftoppm not found, scanned pages cannot be rasterized");
        }

        Self {
            tesseract_version,
            available_languages,
            rasterizer_available,
        }
    }

    pub fn ocr_available(&self) -> bool {
        self.tesseract_version.is_some() && self.rasterizer_available
    }
}

impl fmt::Display for CapabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Tesseract: {}",
            self.tesseract_version.as_deref().unwrap_or("not installed")
        )?;
        writeln!(f, "Languages: {}", self.available_languages.join(", "))?;
        write!(
            f,
            "Rasterizer (pdftoppm): {}",
            if self.rasterizer_available {
                "available"
            } else {
                "not installed"
            }
        )
    }
}
