//! Block boundary inference.
//!
//! Given where a start anchor sits on the page, decide how far down the
//! sensitive block reaches. The left edge is always the anchor's left edge
//! and the right edge always stops `right_margin_offset` points short of the
//! page width, so marginalia survive. The bottom edge depends on the rule's
//! [`EndBoundary`] and is clamped to `page.height - page_bottom_inset`.
//!
//! When an end marker is missing the resolvers fall back to generous
//! estimates: redacting slightly too much is preferred over leaking a block.

use crate::config::RedactionConfig;
use crate::document::RedactablePage;
use crate::error::RedactorResult;
use crate::geometry::{Rect, RedactionRegion};
use crate::locate::TextLocator;
use crate::rules::{BlockRule, EndBoundary, EndPlacement, Fallback, OccurrenceMode};

/// Turns start-anchor occurrences into redaction regions.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryResolver<'a> {
    config: &'a RedactionConfig,
    locator: TextLocator,
}

impl<'a> BoundaryResolver<'a> {
    pub fn new(config: &'a RedactionConfig) -> Self {
        Self {
            config,
            locator: TextLocator::new(),
        }
    }

    /// Runs one rule against a page and returns every region it emits.
    ///
    /// End anchors are searched once per page, then filtered per start
    /// occurrence so each block only considers markers below its own start.
    pub fn resolve_page<P: RedactablePage>(
        &self,
        rule: &BlockRule,
        page: &P,
        page_rect: &Rect,
    ) -> RedactorResult<Vec<RedactionRegion>> {
        let starts = self.locator.find(page, &rule.start_anchor)?;
        if starts.is_empty() {
            tracing::info!(rule = %rule.name, anchor = %rule.start_anchor, "start anchor not found");
            return Ok(Vec::new());
        }

        let selected = match rule.occurrences {
            OccurrenceMode::First => &starts[..1],
            OccurrenceMode::Each => &starts[..],
        };

        let end_candidates = match &rule.end {
            EndBoundary::EndAnchorSearch { anchors, .. } => {
                self.locator.find_any(page, anchors)?
            }
            _ => Vec::new(),
        };

        Ok(selected
            .iter()
            .filter_map(|start| self.resolve(rule, &start.rect, &end_candidates, page_rect))
            .map(|rect| {
                tracing::debug!(rule = %rule.name, region = %rect, "adding redaction");
                RedactionRegion {
                    rule: rule.name.clone(),
                    rect,
                }
            })
            .collect())
    }

    /// Computes the region for a single start box.
    ///
    /// Returns `None` when the region would be degenerate: height at or
    /// below `min_region_height`, or no width left between the anchor and
    /// the right margin.
    pub fn resolve(
        &self,
        rule: &BlockRule,
        start: &Rect,
        end_candidates: &[Rect],
        page_rect: &Rect,
    ) -> Option<Rect> {
        let bottom = self.bottom_edge(rule, start, end_candidates, page_rect);
        let bottom = bottom.min(page_rect.height() - self.config.page_bottom_inset);

        let region = Rect::new(
            start.x0,
            start.y0,
            page_rect.width() - self.config.right_margin_offset,
            bottom,
        );

        if region.height() <= self.config.min_region_height {
            tracing::debug!(rule = %rule.name, region = %region, "skipping degenerate redaction");
            return None;
        }
        if region.width() <= 0.0 {
            tracing::debug!(rule = %rule.name, region = %region, "anchor lies inside the right margin");
            return None;
        }

        Some(region)
    }

    fn bottom_edge(
        &self,
        rule: &BlockRule,
        start: &Rect,
        end_candidates: &[Rect],
        page_rect: &Rect,
    ) -> f32 {
        match &rule.end {
            EndBoundary::FixedLineCount { lines } => start.y1 + self.config.lines_to_points(*lines),
            EndBoundary::FixedHeightAddition { height } => start.y1 + height,
            EndBoundary::EndAnchorSearch {
                placement,
                padding,
                fallback,
                ..
            } => {
                let below = end_candidates.iter().filter(|end| end.y0 > start.y0);
                let edge = match placement {
                    EndPlacement::Enclose => below.map(|end| end.y1).reduce(f32::max),
                    EndPlacement::StopBefore => below.map(|end| end.y0).reduce(f32::min),
                };

                match (edge, placement) {
                    (Some(edge), EndPlacement::Enclose) => edge + padding,
                    (Some(edge), EndPlacement::StopBefore) => edge - padding,
                    (None, _) => {
                        tracing::warn!(rule = %rule.name, fallback = ?fallback, "end marker not found below start, estimating");
                        match fallback {
                            Fallback::Lines { lines } => {
                                start.y1 + self.config.lines_to_points(*lines)
                            }
                            Fallback::PageBottom => {
                                page_rect.height() - self.config.right_margin_offset - padding
                            }
                        }
                    }
                }
            }
        }
    }
}
