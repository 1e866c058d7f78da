//! Secure redaction backend using MuPDF.
//!
//! Regions become PDF redaction annotations which are then applied with
//! MuPDF's page redaction, so covered text is physically removed from the
//! content stream and cannot be extracted from the output. The configured
//! fill is then painted over each region in a content stream of its own.

use std::cell::OnceCell;
use std::path::Path;

use mupdf::pdf::{
    PdfAnnotation, PdfAnnotationType, PdfDocument, PdfObject, PdfPage, PdfWriteOptions,
};
use mupdf::{Context, Matrix, Page, Quad, TextPageOptions};

use super::{ApplyOptions, ImageHandling};
use crate::document::{DocumentBackend, RedactableDocument, RedactablePage};
use crate::error::{RedactorError, RedactorResult};
use crate::geometry::Rect;

/// Opens documents with MuPDF.
#[derive(Debug, Clone)]
pub struct MupdfBackend {
    /// Maximum search hits per literal per page
    max_hits: u32,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self { max_hits: 100 }
    }

    /// Sets the maximum number of search hits per literal.
    pub fn with_max_hits(mut self, max_hits: u32) -> Self {
        self.max_hits = max_hits;
        self
    }
}

impl DocumentBackend for MupdfBackend {
    type Document = MupdfDocument;

    fn open(&self, path: &Path) -> RedactorResult<MupdfDocument> {
        let path_str = path_str(path, "input")?;
        let inner = PdfDocument::open(path_str).map_err(|e| RedactorError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(MupdfDocument {
            inner,
            max_hits: self.max_hits,
        })
    }

    fn name(&self) -> &str {
        "MuPDF"
    }
}

/// A PDF opened through MuPDF. Dropping it releases the document.
pub struct MupdfDocument {
    inner: PdfDocument,
    max_hits: u32,
}

impl RedactableDocument for MupdfDocument {
    type Page = MupdfPage;

    fn page_count(&self) -> RedactorResult<usize> {
        let count = self
            .inner
            .page_count()
            .map_err(|e| RedactorError::mupdf("Failed to get page count", e))?;
        Ok(count.max(0) as usize)
    }

    fn load_page(&self, index: usize) -> RedactorResult<MupdfPage> {
        let page = self
            .inner
            .load_page(index as i32)
            .map_err(|e| RedactorError::PdfProcessing {
                message: format!("Failed to load page {}", index + 1),
                page: Some(index + 1),
                source: Some(Box::new(e)),
            })?;

        let pdf_page =
            PdfPage::try_from(page.clone()).map_err(|_| RedactorError::PdfProcessing {
                message: "Page does not support PDF annotations".to_string(),
                page: Some(index + 1),
                source: None,
            })?;

        Ok(MupdfPage {
            page,
            pdf_page,
            index,
            max_hits: self.max_hits,
            glyphs: OnceCell::new(),
        })
    }

    fn save_compacted(&self, output: &Path) -> RedactorResult<()> {
        let output_str = path_str(output, "output")?;

        let mut options = PdfWriteOptions::default();
        options.set_garbage_level(4);
        options.set_compress(true);

        self.inner
            .save_with_options(output_str, options)
            .map_err(|e| RedactorError::Save {
                path: output.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

/// One loaded page, kept as both a generic and a PDF page.
pub struct MupdfPage {
    page: Page,
    pdf_page: PdfPage,
    index: usize,
    max_hits: u32,
    /// Text layer glyphs, built on the first search and reset on apply.
    glyphs: OnceCell<Vec<Glyph>>,
}

/// One character of the text layer with its bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Glyph {
    c: char,
    rect: Rect,
}

impl MupdfPage {
    fn glyphs(&self) -> RedactorResult<&[Glyph]> {
        if let Some(glyphs) = self.glyphs.get() {
            return Ok(glyphs);
        }

        let text_page = self
            .page
            .to_text_page(TextPageOptions::empty())
            .map_err(|e| {
                RedactorError::mupdf(
                    format!("Failed to extract text layer of page {}", self.index + 1),
                    e,
                )
            })?;

        let mut glyphs = Vec::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                for ch in line.chars() {
                    if let Some(c) = ch.char() {
                        glyphs.push(Glyph {
                            c,
                            rect: quad_bounds(&ch.quad()),
                        });
                    }
                }
            }
        }

        Ok(self.glyphs.get_or_init(|| glyphs))
    }

    /// Maps page space (top-left origin) to the page's PDF user space.
    fn user_space(&self) -> RedactorResult<Matrix> {
        let page_no = self.index + 1;
        let ctm = self.pdf_page.ctm().map_err(|e| {
            RedactorError::mupdf(format!("Failed to get transform of page {}", page_no), e)
        })?;

        invert(&ctm).ok_or_else(|| RedactorError::PdfProcessing {
            message: "Page transform is not invertible".to_string(),
            page: Some(page_no),
            source: None,
        })
    }

    fn processing_error(&self, message: &str, source: mupdf::Error) -> RedactorError {
        RedactorError::PdfProcessing {
            message: message.to_string(),
            page: Some(self.index + 1),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a redaction annotation covering `rect` (user space).
    fn create_redaction(&mut self, rect: &Rect) -> RedactorResult<PdfAnnotation> {
        let annot = self
            .pdf_page
            .create_annotation(PdfAnnotationType::Redact)
            .map_err(|e| self.processing_error("Failed to create redaction annotation", e))?;

        // The new annotation is the last entry of the page's /Annots.
        let placed = (|| -> Result<bool, mupdf::Error> {
            let page_obj = self.pdf_page.object();
            let Some(annots) = page_obj.get_dict("Annots")? else {
                return Ok(false);
            };
            let Some(last) = annots.len()?.checked_sub(1) else {
                return Ok(false);
            };
            let Some(mut annot_obj) = annots.get_array(last as i32)? else {
                return Ok(false);
            };
            let Some(doc) = page_obj.document() else {
                return Ok(false);
            };

            let mut bounds = doc.new_array()?;
            for value in [rect.x0, rect.y0, rect.x1, rect.y1] {
                bounds.array_push(PdfObject::new_real(value)?)?;
            }
            annot_obj.dict_put("Rect", bounds)?;
            Ok(true)
        })()
        .map_err(|e| self.processing_error("Failed to place redaction annotation", e))?;

        if !placed {
            return Err(RedactorError::PdfProcessing {
                message: "Redaction annotation missing from page".to_string(),
                page: Some(self.index + 1),
                source: None,
            });
        }
        Ok(annot)
    }

    /// Paints `rects` (user space) in `fill` on top of the page content.
    ///
    /// The existing content is wrapped in `q`/`Q` so the fill is drawn with
    /// the default graphics state.
    fn paint_fill(&mut self, rects: &[Rect], fill: [f32; 3]) -> Result<(), mupdf::Error> {
        let mut page_obj = self.pdf_page.object();
        let Some(mut doc) = page_obj.document() else {
            return Err(mupdf::Error::InvalidPdfDocument);
        };

        let mut contents = doc.new_array()?;
        contents.array_push(content_stream(&mut doc, "q\n")?)?;
        if let Some(existing) = page_obj.get_dict("Contents")? {
            if existing.is_array()? {
                for i in 0..existing.len()? {
                    if let Some(part) = existing.get_array(i as i32)? {
                        contents.array_push(part)?;
                    }
                }
            } else {
                contents.array_push(existing)?;
            }
        }
        contents.array_push(content_stream(&mut doc, &fill_operators(rects, fill))?)?;

        page_obj.dict_put("Contents", contents)
    }
}

impl RedactablePage for MupdfPage {
    fn bounds(&self) -> RedactorResult<Rect> {
        let bounds = self.page.bounds().map_err(|e| {
            RedactorError::mupdf(format!("Failed to get bounds for page {}", self.index + 1), e)
        })?;
        Ok(Rect::new(bounds.x0, bounds.y0, bounds.x1, bounds.y1))
    }

    fn search(&self, needle: &str) -> RedactorResult<Vec<Rect>> {
        let hits = self
            .page
            .search(needle, self.max_hits)
            .map_err(|e| RedactorError::mupdf(format!("Search failed for: {}", needle), e))?;
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        // MuPDF search folds case; keep only hits whose glyphs match exactly.
        let hits: Vec<Rect> = hits.into_iter().map(|quad| quad_bounds(&quad)).collect();
        Ok(exact_hits(hits, self.glyphs()?, needle))
    }

    fn apply_redactions(
        &mut self,
        regions: &[Rect],
        options: &ApplyOptions,
    ) -> RedactorResult<()> {
        let page_no = self.index + 1;
        let to_user = self.user_space()?;
        let user_rects: Vec<Rect> = regions
            .iter()
            .map(|region| transform_rect(region, &to_user))
            .collect();

        let mut annots = Vec::with_capacity(user_rects.len());
        for rect in &user_rects {
            annots.push(self.create_redaction(rect)?);
        }

        let changed = match options.images {
            ImageHandling::Pixels => self
                .pdf_page
                .redact()
                .map_err(|e| self.processing_error("Failed to apply redactions", e))?,
            images => {
                let ctx = Context::get();
                let mut changed = false;
                for annot in &annots {
                    changed |= unsafe { ffi::apply_redaction(&ctx, annot, images) };
                }
                changed
            }
        };
        drop(annots);
        if !changed {
            tracing::warn!(page = page_no, "MuPDF reported no redaction applied");
        }

        self.paint_fill(&user_rects, options.fill)
            .map_err(|e| self.processing_error("Failed to paint redaction fill", e))?;
        self.glyphs = OnceCell::new();

        tracing::debug!(page = page_no, regions = regions.len(), images = ?options.images, "applied redactions");
        Ok(())
    }
}

/// Drops hits whose glyphs differ from `needle` in more than whitespace.
///
/// A hit split over two lines yields one box per line, so each box only has
/// to match a contiguous part of the needle.
fn exact_hits(hits: Vec<Rect>, glyphs: &[Glyph], needle: &str) -> Vec<Rect> {
    let wanted: String = needle.chars().filter(|c| !c.is_whitespace()).collect();

    hits.into_iter()
        .filter(|hit| {
            let found: String = glyphs
                .iter()
                .filter(|glyph| !glyph.c.is_whitespace() && centre_within(&glyph.rect, hit))
                .map(|glyph| glyph.c)
                .collect();
            !found.is_empty() && wanted.contains(&found)
        })
        .collect()
}

fn centre_within(inner: &Rect, outer: &Rect) -> bool {
    let x = (inner.x0 + inner.x1) / 2.0;
    let y = (inner.y0 + inner.y1) / 2.0;
    x >= outer.x0 && x <= outer.x1 && y >= outer.y0 && y <= outer.y1
}

/// `q r g b rg x y w h re ... f Q`, preceded by the `Q` closing the
/// wrapped original content.
fn fill_operators(rects: &[Rect], fill: [f32; 3]) -> String {
    let [r, g, b] = fill.map(|c| c.clamp(0.0, 1.0));
    let mut ops = format!("Q\nq\n{} {} {} rg\n", r, g, b);
    for rect in rects {
        ops.push_str(&format!(
            "{} {} {} {} re\n",
            rect.x0,
            rect.y0,
            rect.x1 - rect.x0,
            rect.y1 - rect.y0
        ));
    }
    ops.push_str("f\nQ\n");
    ops
}

fn content_stream(doc: &mut PdfDocument, ops: &str) -> Result<PdfObject, mupdf::Error> {
    let dict = doc.new_dict()?;
    let mut stream = doc.add_object(&dict)?;
    stream.write_stream_string(ops)?;
    Ok(stream)
}

fn invert(m: &Matrix) -> Option<Matrix> {
    let det = m.a * m.d - m.b * m.c;
    if det.abs() < f32::EPSILON {
        return None;
    }
    let a = m.d / det;
    let b = -m.b / det;
    let c = -m.c / det;
    let d = m.a / det;
    Some(Matrix {
        a,
        b,
        c,
        d,
        e: -m.e * a - m.f * c,
        f: -m.e * b - m.f * d,
    })
}

/// Bounding box of `rect` under `m`, normalised.
fn transform_rect(rect: &Rect, m: &Matrix) -> Rect {
    let corners = [
        (rect.x0, rect.y0),
        (rect.x1, rect.y0),
        (rect.x0, rect.y1),
        (rect.x1, rect.y1),
    ]
    .map(|(x, y)| (x * m.a + y * m.c + m.e, x * m.b + y * m.d + m.f));

    let mut out = Rect::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1);
    for (x, y) in &corners[1..] {
        out.x0 = out.x0.min(*x);
        out.y0 = out.y0.min(*y);
        out.x1 = out.x1.max(*x);
        out.y1 = out.y1.max(*y);
    }
    out
}

/// Bounding rectangle of a (possibly rotated) search hit.
fn quad_bounds(quad: &Quad) -> Rect {
    Rect {
        x0: quad.ul.x.min(quad.ll.x).min(quad.ur.x).min(quad.lr.x),
        y0: quad.ul.y.min(quad.ll.y).min(quad.ur.y).min(quad.lr.y),
        x1: quad.ul.x.max(quad.ll.x).max(quad.ur.x).max(quad.lr.x),
        y1: quad.ul.y.max(quad.ll.y).max(quad.ur.y).max(quad.lr.y),
    }
}

fn path_str<'p>(path: &'p Path, parameter: &str) -> RedactorResult<&'p str> {
    path.to_str().ok_or_else(|| RedactorError::InvalidInput {
        parameter: parameter.to_string(),
        reason: "Path contains invalid UTF-8".to_string(),
    })
}

impl ImageHandling {
    /// MuPDF's `PDF_REDACT_IMAGE_*` value.
    fn mupdf_method(self) -> i32 {
        match self {
            ImageHandling::Keep => 0,
            ImageHandling::Remove => 1,
            ImageHandling::Pixels => 2,
        }
    }
}

/// Raw redaction with explicit image handling.
///
/// `PdfPage::redact` always blanks image pixels, so `keep` and `remove` go
/// through `pdf_apply_redaction` on the thread's own MuPDF context.
mod ffi {
    use super::ImageHandling;
    use mupdf::pdf::PdfAnnotation;
    use mupdf::Context;

    #[repr(C)]
    struct ContextRaw {
        inner: *mut mupdf_sys::fz_context,
    }

    #[repr(C)]
    struct PdfAnnotRaw {
        inner: *mut mupdf_sys::pdf_annot,
    }

    /// Applies one redaction annotation, removing covered text and
    /// handling images per `images`. Returns whether MuPDF applied it.
    ///
    /// # Safety
    /// `annot` must still be attached to a loaded page and `ctx` must be
    /// the calling thread's context.
    pub unsafe fn apply_redaction(
        ctx: &Context,
        annot: &PdfAnnotation,
        images: ImageHandling,
    ) -> bool {
        let ctx_raw = std::mem::transmute::<&Context, &ContextRaw>(ctx);
        let annot_raw = std::mem::transmute::<&PdfAnnotation, &PdfAnnotRaw>(annot);
        if ctx_raw.inner.is_null() || annot_raw.inner.is_null() {
            return false;
        }

        let mut opts = mupdf_sys::pdf_redact_options {
            black_boxes: 0,
            image_method: images.mupdf_method() as _,
            ..std::mem::zeroed()
        };

        mupdf_sys::pdf_apply_redaction(ctx_raw.inner, annot_raw.inner, &mut opts) != 0
    }
}
