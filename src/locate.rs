//! Literal anchor lookup on a page.

use crate::document::RedactablePage;
use crate::error::RedactorResult;
use crate::geometry::{Rect, TextOccurrence};

/// Finds literal anchor strings through a page's native text layer.
///
/// Matching is literal and case-sensitive, with no regex or fuzzy matching.
/// Occurrences keep the backend's text order, which is not necessarily
/// sorted by position.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLocator;

impl TextLocator {
    pub fn new() -> Self {
        Self
    }

    /// Returns every occurrence of `literal` on the page.
    ///
    /// An absent literal (or an empty one) yields an empty vector.
    pub fn find<P: RedactablePage>(
        &self,
        page: &P,
        literal: &str,
    ) -> RedactorResult<Vec<TextOccurrence>> {
        if literal.is_empty() {
            return Ok(Vec::new());
        }

        let hits = page.search(literal)?;
        tracing::trace!(literal, hits = hits.len(), "searched page");

        Ok(hits
            .into_iter()
            .map(|rect| TextOccurrence {
                text: literal.to_string(),
                rect,
            })
            .collect())
    }

    /// Searches several literals and merges the boxes, preserving the
    /// literal order and each literal's text order.
    pub fn find_any<P, S>(&self, page: &P, literals: &[S]) -> RedactorResult<Vec<Rect>>
    where
        P: RedactablePage,
        S: AsRef<str>,
    {
        let mut rects = Vec::new();
        for literal in literals {
            rects.extend(
                self.find(page, literal.as_ref())?
                    .into_iter()
                    .map(|occurrence| occurrence.rect),
            );
        }
        Ok(rects)
    }
}
