//! Shared error type for fetching and parsing catalog pages.

use thiserror::Error;

/// Scraper error for URL building, HTTP, and page parsing.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Invalid user id '{0}': must be non-empty and contain no '/', '?' or '#'.")]
    InvalidUserId(String),

    // HTTP and network
    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },

    // Parsing
    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    /// A single-node field (title or rating) is absent from an entry. Aborts the run.
    #[error("Page {page}, entry {entry}: missing {field} ({selector}); page layout may have changed.")]
    MissingField {
        page: u32,
        /// 1-based position of the entry on the page.
        entry: usize,
        field: &'static str,
        selector: &'static str,
    },
}
