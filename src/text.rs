//! Plain-text extraction for verifying redacted output.

use std::path::Path;

use crate::error::{RedactorError, RedactorResult};

/// Extracts the text layer of a PDF.
///
/// Redacted blocks must not appear in the result; anchor labels outside
/// the blocks still do.
pub fn extract_text_from_pdf(input: &Path) -> RedactorResult<String> {
    let bytes = std::fs::read(input).map_err(|e| RedactorError::Io {
        path: input.to_path_buf(),
        source: e,
    })?;

    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| RedactorError::TextExtraction {
        path: input.to_path_buf(),
        reason: e.to_string(),
    })
}
