pub mod arabic;
pub mod config;
pub mod correction;
pub mod enhance;
pub mod errors;
pub mod extract;
pub mod format;
pub mod language;
pub mod ocr;
pub mod page_range;
pub mod pdf;
pub mod spell;

#[cfg(test)]
mod tests;

pub use errors::{ExtractionError, PageError};
pub use extract::{ExtractionOptions, ExtractionResult, Extractor};
pub use format::OutputFormat;
pub use language::LanguageSet;
