use std::time::Duration;
use thiserror::Error;

pub mod brochure;
pub mod config;
pub mod display;
pub mod fetch;
pub mod llm;
pub mod prompt;
pub mod scrape;
pub mod types;

// Re-export commonly used types
pub use brochure::BrochureGenerator;
pub use config::AppConfig;
pub use types::{LinkRef, PageContent, RelevanceSet};

/// The `BrochureError` enum represents various errors that can occur while
/// generating a brochure.
#[derive(Error, Debug)]
pub enum BrochureError {
    /// Represents an error that occurs during an HTTP request.
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Represents an error returned by the completion endpoint.
    #[error("Completion request failed: {0}")]
    CompletionError(String),
    /// Represents a link-selection response that is not valid JSON for the
    /// declared `{links: [{type, url}]}` schema.
    #[error("Link selection returned invalid JSON: {0}")]
    SelectionError(#[from] serde_json::Error),
    /// Represents an error that occurs while writing the brochure to disk.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A type alias for `Result` with the `BrochureError` error type.
pub type Result<T> = std::result::Result<T, BrochureError>;

// Constants

/// The default timeout duration for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Maximum number of characters kept from a single fetched page
/// (title, separator and body combined).
pub const CONTENT_CHAR_LIMIT: usize = 2_000;
/// Maximum number of characters of the final brochure user prompt.
pub const PROMPT_CHAR_LIMIT: usize = 5_000;
/// Title used when a page has no usable `<title>` element.
pub const NO_TITLE: &str = "No title found";

/// Truncates `text` to at most `limit` characters.
///
/// This is a plain prefix slice: it may cut mid-word, and it never fails.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that truncation is a pure prefix slice over characters.
    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 10), "");
        // Multi-byte characters count as one unit each.
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
