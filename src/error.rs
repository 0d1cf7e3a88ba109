//! Error types for unscan library.

use std::io;
use thiserror::Error;

/// Result type alias for unscan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading OCR output, configuring the
/// layout engine, or rendering its result.
///
/// The reconstruction engine itself never fails; these errors come from the
/// boundaries around it.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON (OCR response or rule set).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A rule pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern text
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// A rule set is structurally invalid.
    #[error("Invalid rule set: {0}")]
    InvalidRules(String),

    /// The OCR provider reported an error for a page.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error during rendering (Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an [`Error::InvalidPattern`] from a pattern and its compile error.
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Error::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Ocr("quota exceeded".to_string());
        assert_eq!(err.to_string(), "OCR error: quota exceeded");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_invalid_pattern_display() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = Error::pattern("(", source);
        assert!(err.to_string().starts_with("Invalid pattern '('"));
    }
}
