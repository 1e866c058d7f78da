//! Test fixtures and itinerary PDF builders.
//!
//! Lines are laid out top-down at a fixed pitch so block geometry stays
//! predictable: every line starts at the same left edge and is separated
//! from the next by more than any block padding.

use anyhow::Result;
use printpdf::*;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const LEFT_MM: f32 = 20.0;
const TOP_MM: f32 = 20.0;
const LINE_PITCH_MM: f32 = 10.0;
const FONT_SIZE: f32 = 11.0;

/// Builder for itinerary-like test PDFs.
///
/// # Example
///
/// ```no_run
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// let pdf = ItineraryPdfBuilder::new()
///     .line("Passenger: Jane Roe")
///     .line("Agent: Travel Desk Ltd")
///     .line("Address: 1 Harbour Road")
///     .build(std::path::Path::new("/tmp/itinerary.pdf"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ItineraryPdfBuilder {
    title: String,
    pages: Vec<Vec<Option<String>>>,
    page_width: Mm,
    page_height: Mm,
}

impl ItineraryPdfBuilder {
    /// Creates a builder for a single empty A4 page.
    pub fn new() -> Self {
        Self {
            title: "Itinerary".to_string(),
            pages: vec![Vec::new()],
            page_width: Mm(210.0),  // A4 width
            page_height: Mm(297.0), // A4 height
        }
    }

    /// Appends a text line to the current page.
    pub fn line(mut self, text: &str) -> Self {
        self.current_page().push(Some(text.to_string()));
        self
    }

    /// Leaves one line empty.
    pub fn gap(mut self) -> Self {
        self.current_page().push(None);
        self
    }

    /// Starts a new page.
    pub fn page_break(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    fn current_page(&mut self) -> &mut Vec<Option<String>> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Builds the PDF and writes it to the specified path.
    pub fn build(self, output_path: &Path) -> Result<PathBuf> {
        let (doc, first_page, first_layer) =
            PdfDocument::new(&self.title, self.page_width, self.page_height, "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

        for (page_no, lines) in self.pages.iter().enumerate() {
            let layer = if page_no == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(self.page_width, self.page_height, "Layer 1");
                doc.get_page(page).get_layer(layer)
            };

            for (row, line) in lines.iter().enumerate() {
                if let Some(text) = line {
                    let y = self.page_height.0 - TOP_MM - row as f32 * LINE_PITCH_MM;
                    layer.use_text(text.as_str(), FONT_SIZE, Mm(LEFT_MM), Mm(y), &font);
                }
            }
        }

        doc.save(&mut BufWriter::new(fs::File::create(output_path)?))?;
        Ok(output_path.to_path_buf())
    }
}

impl Default for ItineraryPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A full itinerary page carrying all three blocks.
pub fn create_full_itinerary(path: &Path) -> Result<PathBuf> {
    ItineraryPdfBuilder::new()
        .line("Booking reference: QX7TZP")
        .line("Passenger: Jane Roe")
        .gap()
        .line("Agent: Travel Desk Ltd")
        .line("Phone: +44 20 7946 0018")
        .line("Address: 1 Harbour Road, Leith")
        .gap()
        .gap()
        .line("Fare rules: Non-refundable after departure")
        .line("Change fee 75 EUR per direction")
        .gap()
        .line("Restrictions: valid on KL only")
        .gap()
        .gap()
        .line("Links to comments: https://comments.example.test/r/QX7TZP")
        .gap()
        .gap()
        .line("Thank you for booking with us")
        .build(path)
}

/// A document with no recognized anchors at all.
pub fn create_plain_document(path: &Path) -> Result<PathBuf> {
    ItineraryPdfBuilder::new()
        .line("Boarding pass")
        .line("Passenger: Jane Roe")
        .line("Seat 14C")
        .build(path)
}
