//! Custom assertions for redacted itinerary output.

use std::path::Path;

/// Asserts that a piece of sensitive text no longer appears in a PDF.
///
/// # Panics
/// Panics if the text is still extractable from the PDF.
pub fn assert_redacted(pdf_path: &Path, text: &str) {
    let extracted = extract_text_or_panic(pdf_path);
    assert!(
        !extracted.contains(text),
        "'{}' should be redacted but was found in output PDF at '{}'.\nExtracted text:\n{}",
        text,
        pdf_path.display(),
        extracted
    );
}

/// Asserts that text outside every block survived redaction.
///
/// # Panics
/// Panics if the text is not found in the PDF.
pub fn assert_preserved(pdf_path: &Path, text: &str) {
    let extracted = extract_text_or_panic(pdf_path);
    assert!(
        extracted.contains(text),
        "'{}' should be preserved but was not found in PDF at '{}'.\nExtracted text:\n{}",
        text,
        pdf_path.display(),
        extracted
    );
}

/// Asserts that none of the given texts appear in the PDF.
///
/// # Panics
/// Panics if any text is found in the PDF.
pub fn assert_all_redacted(pdf_path: &Path, texts: &[&str]) {
    let extracted = extract_text_or_panic(pdf_path);
    let found: Vec<_> = texts
        .iter()
        .filter(|text| extracted.contains(*text))
        .collect();

    assert!(
        found.is_empty(),
        "The following texts should be redacted but were found: {:?}",
        found
    );
}

/// Asserts that a PDF exists, loads, and has the expected page count.
///
/// # Panics
/// Panics if the file is missing or structurally invalid.
pub fn assert_valid_pdf(pdf_path: &Path, pages: usize) {
    assert!(pdf_path.exists(), "PDF should exist at '{}'", pdf_path.display());

    let document = ::lopdf::Document::load(pdf_path)
        .unwrap_or_else(|e| panic!("'{}' is not a loadable PDF: {}", pdf_path.display(), e));
    assert_eq!(
        document.get_pages().len(),
        pages,
        "unexpected page count in '{}'",
        pdf_path.display()
    );
}

fn extract_text_or_panic(pdf_path: &Path) -> String {
    itinerary_redactor::extract_text_from_pdf(pdf_path).unwrap_or_else(|e| {
        panic!(
            "Failed to extract text from PDF '{}': {}",
            pdf_path.display(),
            e
        )
    })
}
