//! Page rendering for checks on what a redacted page looks like.

use mupdf::{Colorspace, Document, Matrix};
use std::path::Path;

/// An RGB rendering of one page at 72 dpi, so pixels line up with points.
pub struct RenderedPage {
    width: u32,
    height: u32,
    stride: usize,
    n: usize,
    samples: Vec<u8>,
}

impl RenderedPage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let at = y as usize * self.stride + x as usize * self.n;
        [self.samples[at], self.samples[at + 1], self.samples[at + 2]]
    }

    /// Every pixel inside `[x0, x1) x [y0, y1)`, clipped to the page.
    pub fn pixels_in(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<(u32, u32, [u8; 3])> {
        let xs = (x0.max(0.0) as u32)..(x1.min(self.width as f32) as u32);
        let ys = (y0.max(0.0) as u32)..(y1.min(self.height as f32) as u32);
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .map(|(x, y)| (x, y, self.pixel(x, y)))
            .collect()
    }
}

/// Renders page `index` of a PDF.
///
/// # Panics
/// Panics if the document cannot be opened or rendered.
pub fn render_page(pdf_path: &Path, index: i32) -> RenderedPage {
    let path = pdf_path.to_str().expect("test paths are UTF-8");
    let document = Document::open(path)
        .unwrap_or_else(|e| panic!("'{}' cannot be opened: {}", pdf_path.display(), e));
    let page = document.load_page(index).expect("page should load");
    let pixmap = page
        .to_pixmap(&Matrix::IDENTITY, &Colorspace::device_rgb(), false, false)
        .expect("page should render");

    RenderedPage {
        width: pixmap.width(),
        height: pixmap.height(),
        stride: pixmap.stride() as usize,
        n: pixmap.n() as usize,
        samples: pixmap.samples().to_vec(),
    }
}

/// Bounding box (page space) of the first occurrence of `needle` on page 0.
pub fn text_box(pdf_path: &Path, needle: &str) -> mupdf::Rect {
    let path = pdf_path.to_str().expect("test paths are UTF-8");
    let document = Document::open(path).expect("document should open");
    let page = document.load_page(0).expect("page should load");
    let hits = page.search(needle, 1).expect("search should run");
    let quad = hits
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("'{}' not found in '{}'", needle, pdf_path.display()));

    mupdf::Rect {
        x0: quad.ul.x.min(quad.ll.x),
        y0: quad.ul.y.min(quad.ur.y),
        x1: quad.ur.x.max(quad.lr.x),
        y1: quad.ll.y.max(quad.lr.y),
    }
}
