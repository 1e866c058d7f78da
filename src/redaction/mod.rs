//! Redaction application.
//!
//! [`RedactionApplicator`] hands a page's collected regions to the backend
//! in a single commit. The MuPDF backend in [`secure`] performs a true
//! redaction: glyphs under each region are removed from the content stream,
//! not just painted over.

pub mod secure;

pub use secure::{MupdfBackend, MupdfDocument, MupdfPage};

use serde::{Deserialize, Serialize};

use crate::document::RedactablePage;
use crate::error::RedactorResult;
use crate::geometry::RedactionRegion;

/// What happens to images overlapping a redaction region.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ImageHandling {
    /// Images pass through untouched.
    #[default]
    Keep,
    /// Images touching a region are removed entirely.
    Remove,
    /// Only the covered pixels are blanked.
    Pixels,
}

/// Options forwarded to the backend when committing redactions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplyOptions {
    pub images: ImageHandling,
    /// RGB fill, components in `0.0..=1.0`.
    pub fill: [f32; 3],
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            images: ImageHandling::Keep,
            fill: [1.0, 1.0, 1.0],
        }
    }
}

/// Commits a page's regions in one backend call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedactionApplicator {
    options: ApplyOptions,
}

impl RedactionApplicator {
    pub fn new(options: ApplyOptions) -> Self {
        Self { options }
    }

    /// Applies every region to the page.
    ///
    /// Returns `false` without touching the page when `regions` is empty.
    pub fn apply<P: RedactablePage>(
        &self,
        page: &mut P,
        regions: &[RedactionRegion],
    ) -> RedactorResult<bool> {
        if regions.is_empty() {
            return Ok(false);
        }

        let rects: Vec<_> = regions.iter().map(|region| region.rect).collect();
        page.apply_redactions(&rects, &self.options)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fake::FakePage;
    use crate::geometry::Rect;

    #[test]
    fn test_empty_regions_are_a_no_op() {
        let mut page = FakePage::new(600.0, 800.0);
        let changed = RedactionApplicator::default().apply(&mut page, &[]).unwrap();

        assert!(!changed);
        assert!(page.applied().is_empty());
    }

    #[test]
    fn test_single_commit_for_all_regions() {
        let mut page = FakePage::new(600.0, 800.0)
            .with_text("John Smith", 40.0, 114.0, 120.0, 126.0)
            .with_text("Non-refundable", 40.0, 320.0, 140.0, 332.0)
            .with_text("Page 1", 40.0, 700.0, 80.0, 712.0);
        let regions = vec![
            RedactionRegion {
                rule: "Agent".to_string(),
                rect: Rect::new(40.0, 100.0, 570.0, 150.0),
            },
            RedactionRegion {
                rule: "Fare Rules".to_string(),
                rect: Rect::new(40.0, 300.0, 570.0, 353.0),
            },
        ];

        let changed = RedactionApplicator::default()
            .apply(&mut page, &regions)
            .unwrap();

        assert!(changed);
        assert_eq!(page.applied().len(), 1);
        assert_eq!(page.applied()[0].len(), 2);
        assert_eq!(page.remaining_text(), ["Page 1"]);
    }

    #[test]
    fn test_image_handling_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            images: ImageHandling,
        }
        let parsed: Wrapper = toml::from_str(r#"images = "pixels""#).unwrap();
        assert_eq!(parsed.images, ImageHandling::Pixels);
        assert_eq!(ImageHandling::default(), ImageHandling::Keep);
    }
}
