//! Error types for the itinerary redaction library.
//!
//! Every failure is terminal for the single document it affects. Callers
//! (the batch driver in particular) receive the typed error and decide
//! whether to continue with the next document.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for redaction operations.
pub type RedactorResult<T> = Result<T, RedactorError>;

/// Error type for all redaction operations.
///
/// A missing anchor or a degenerate region is never an error: those are
/// logged and the rule simply emits nothing.
#[derive(Debug, Error)]
pub enum RedactorError {
    /// Error occurred while reading or writing files
    #[error("IO error for path '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    /// The source document could not be opened or decoded
    #[error("Failed to open '{}': {reason}", .path.display())]
    Open { path: PathBuf, reason: String },

    /// Error occurred while processing a loaded document
    #[error("PDF processing error{}: {message}", page_suffix(.page))]
    PdfProcessing {
        message: String,
        page: Option<usize>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The redacted document could not be written
    #[error("Failed to save '{}': {reason}", .path.display())]
    Save { path: PathBuf, reason: String },

    /// Text extraction failed
    #[error("Text extraction failed for '{}': {reason}", .path.display())]
    TextExtraction { path: PathBuf, reason: String },

    /// Invalid configuration or parameters
    #[error("Invalid input for '{parameter}': {reason}")]
    InvalidInput { parameter: String, reason: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error in '{}': {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    /// Backend-specific error (MuPDF)
    #[error("{backend} backend error: {message}")]
    BackendError {
        backend: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

fn page_suffix(page: &Option<usize>) -> String {
    page.map(|p| format!(" on page {}", p)).unwrap_or_default()
}

impl RedactorError {
    /// Shorthand for a MuPDF failure with the original error attached.
    pub(crate) fn mupdf<E>(message: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::BackendError {
            backend: "MuPDF".to_string(),
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Returns the 1-based page number this error refers to, if any.
    pub fn page(&self) -> Option<usize> {
        match self {
            Self::PdfProcessing { page, .. } => *page,
            _ => None,
        }
    }
}
