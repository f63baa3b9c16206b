use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::extract::DEFAULT_DPI;
use crate::language::DEFAULT_MIN_CHUNK_LENGTH;

/// Environment-level defaults for the CLI; per-run behavior lives in
/// `ExtractionOptions`, which is built from these plus the flags.
#[derive(Clone, Debug)]
pub struct Config {
    pub dpi: u32,
    pub min_chunk_length: usize,
    pub image_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            dpi: env::var("SCANTEXT_DPI")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DPI),
            min_chunk_length: env::var("SCANTEXT_MIN_CHUNK_LENGTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MIN_CHUNK_LENGTH),
            image_dir: env::var("SCANTEXT_IMAGE_DIR").ok().map(PathBuf::from),
        })
    }
}
