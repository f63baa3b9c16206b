use std::fmt;
use std::sync::OnceLock;

use lingua::{Language, LanguageDetectorBuilder};
use serde::Serialize;
use tracing::{debug, warn};

/// Default minimum paragraph length considered reliable for detection.
pub const DEFAULT_MIN_CHUNK_LENGTH: usize = 50;

/// Tesseract language code used when detection yields nothing usable.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// ISO 639-1 identifiers mapped to the Tesseract code space.
const TESSERACT_CODES: &[(&str, &str)] = &[
    ("en", "eng"),
    ("ar", "ara"),
    ("es", "spa"),
    ("fr", "fra"),
    ("de", "deu"),
    ("it", "ita"),
    ("ru", "rus"),
    ("zh", "chi_sim"),
    ("ja", "jpn"),
    ("ko", "kor"),
];

/// The languages the detection model is loaded with.
const DETECTABLE: &[Language] = &[
    Language::English,
    Language::Arabic,
    Language::Spanish,
    Language::French,
    Language::German,
    Language::Italian,
    Language::Russian,
    Language::Chinese,
    Language::Japanese,
    Language::Korean,
];

/// An ordered, deduplicated sequence of Tesseract language codes.
///
/// Never empty: falling back to `{eng}` when nothing usable was detected is
/// the documented default-language policy, so callers never have to
/// special-case an empty set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageSet(Vec<String>);

impl LanguageSet {
    /// Build a set from Tesseract codes, keeping first-seen order and
    /// dropping codes outside the supported table. Falls back to `{eng}`
    /// if nothing survives.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Vec::new();
        for code in codes {
            let code = code.as_ref().trim().to_lowercase();
            if !is_supported_code(&code) {
                if !code.is_empty() {
                    warn!(code = %code, "ignoring unsupported language code");
                }
                continue;
            }
            if !set.contains(&code) {
                set.push(code);
            }
        }
        if set.is_empty() {
            set.push(DEFAULT_LANGUAGE.to_string());
        }
        LanguageSet(set)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn codes(&self) -> &[String] {
        &self.0
    }

    /// The combination string Tesseract expects for multi-language OCR,
    /// e.g. `"eng+ara"`.
    pub fn join(&self) -> String {
        self.0.join("+")
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        LanguageSet(vec![DEFAULT_LANGUAGE.to_string()])
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join())
    }
}

fn model() -> &'static lingua::LanguageDetector {
    static DETECTOR: OnceLock<lingua::LanguageDetector> = OnceLock::new();
    DETECTOR.get_or_init(|| LanguageDetectorBuilder::from_languages(DETECTABLE).build())
}

/// Whether `code` is one of the Tesseract codes this crate supports.
pub fn is_supported_code(code: &str) -> bool {
    TESSERACT_CODES.iter().any(|(_, tess)| *tess == code)
}

/// Map an ISO 639-1 identifier to its Tesseract code, if supported.
pub fn tesseract_code(iso: &str) -> Option<&'static str> {
    TESSERACT_CODES
        .iter()
        .find(|(short, _)| *short == iso)
        .map(|(_, tess)| *tess)
}

/// Identify the language of a single paragraph, as a Tesseract code.
///
/// Returns `None` when the model cannot classify the text or the language
/// is outside the supported table; callers treat that as "leave the text
/// alone", never as an error.
pub fn identify_paragraph(text: &str) -> Option<&'static str> {
    let language = model().detect_language_of(text)?;
    tesseract_code(&language.iso_code_639_1().to_string().to_lowercase())
}

/// Detects the set of natural languages present in a text sample.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    min_chunk_length: usize,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self {
            min_chunk_length: DEFAULT_MIN_CHUNK_LENGTH,
        }
    }
}

impl LanguageDetector {
    pub fn new(min_chunk_length: usize) -> Self {
        Self { min_chunk_length }
    }

    /// Detect the languages present in `sample`.
    ///
    /// The sample is split into paragraph-like chunks on blank lines and
    /// each chunk is classified independently, so a single page can come
    /// back multi-lingual. Chunks shorter than the configured minimum are
    /// skipped as too short to classify reliably, and chunks the model
    /// fails on are ignored rather than aborting the whole call.
    pub fn detect(&self, sample: &str) -> LanguageSet {
        let mut codes: Vec<&'static str> = Vec::new();

        for chunk in sample.split("\n\n") {
            let chunk = chunk.trim();
            if chunk.chars().count() < self.min_chunk_length {
                continue;
            }
            match identify_paragraph(chunk) {
                Some(code) => {
                    if !codes.contains(&code) {
                        codes.push(code);
                    }
                }
                None => {
                    debug!(len = chunk.len(), "chunk yielded no usable language");
                }
            }
        }

        LanguageSet::from_codes(codes)
    }
}
