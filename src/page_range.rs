use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

/// Errors produced while parsing a page-range expression.
#[derive(Debug, Error)]
pub enum PageRangeError {
    #[error("Invalid page range token: '{0}'")]
    MalformedToken(String),
}

/// Parse a human-entered page-range expression into a sorted, deduplicated
/// set of zero-based page indices.
///
/// The grammar is comma-separated tokens, each either a single 1-based page
/// number (`"5"`) or a 1-based inclusive range (`"2-4"`). Whitespace is
/// ignored. An empty expression means "all pages" when `total_pages` is
/// known, and an empty set otherwise.
///
/// Bounds are clamped against `total_pages` when it is known. Single-page
/// tokens that land out of bounds are dropped silently; user input is
/// treated as tolerant, not adversarial. Non-numeric tokens are an error.
pub fn parse_page_range(
    expr: &str,
    total_pages: Option<usize>,
) -> Result<BTreeSet<usize>, PageRangeError> {
    let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();

    if compact.is_empty() {
        return Ok(match total_pages {
            Some(n) => (0..n).collect(),
            None => BTreeSet::new(),
        });
    }

    let mut pages = BTreeSet::new();

    for token in compact.split(',') {
        if token.is_empty() {
            continue;
        }

        if let Some((start_str, end_str)) = token.split_once('-') {
            let start: usize = start_str
                .parse()
                .map_err(|_| PageRangeError::MalformedToken(token.to_string()))?;
            let end: usize = end_str
                .parse()
                .map_err(|_| PageRangeError::MalformedToken(token.to_string()))?;

            // 1-based inclusive bounds become a 0-based half-open range.
            let start = start.saturating_sub(1);
            let end = match total_pages {
                Some(n) => end.min(n),
                None => end,
            };
            pages.extend(start..end);
        } else {
            let page: usize = token
                .parse()
                .map_err(|_| PageRangeError::MalformedToken(token.to_string()))?;
            let index = page.saturating_sub(1);
            match total_pages {
                Some(n) if index >= n => {
                    debug!(page, total = n, "dropping out-of-range page token");
                }
                _ if page == 0 => {
                    debug!("dropping page token 0 (pages are 1-based)");
                }
                _ => {
                    pages.insert(index);
                }
            }
        }
    }

    Ok(pages)
}
