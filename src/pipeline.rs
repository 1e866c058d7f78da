//! Per-page and per-document orchestration.

use std::path::{Path, PathBuf};

use crate::boundary::BoundaryResolver;
use crate::config::RedactionConfig;
use crate::document::{DocumentBackend, RedactableDocument, RedactablePage};
use crate::error::{RedactorError, RedactorResult};
use crate::geometry::RedactionRegion;
use crate::redaction::{MupdfBackend, RedactionApplicator};

/// Regions committed on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageReport {
    /// 0-based page index
    pub index: usize,
    pub regions: Vec<RedactionRegion>,
}

impl PageReport {
    pub fn modified(&self) -> bool {
        !self.regions.is_empty()
    }
}

/// Runs every configured rule on a page and commits the result once.
#[derive(Debug, Clone, Copy)]
pub struct PageProcessor<'a> {
    config: &'a RedactionConfig,
    resolver: BoundaryResolver<'a>,
    applicator: RedactionApplicator,
}

impl<'a> PageProcessor<'a> {
    pub fn new(config: &'a RedactionConfig) -> Self {
        Self {
            config,
            resolver: BoundaryResolver::new(config),
            applicator: RedactionApplicator::new(config.apply_options()),
        }
    }

    /// Collects regions from all rules in configured order.
    ///
    /// A rule whose anchor is missing contributes nothing; it never stops
    /// the remaining rules from running.
    pub fn collect<P: RedactablePage>(&self, page: &P) -> RedactorResult<Vec<RedactionRegion>> {
        let page_rect = page.bounds()?;
        let mut regions = Vec::new();
        for rule in &self.config.rules {
            regions.extend(self.resolver.resolve_page(rule, page, &page_rect)?);
        }
        Ok(regions)
    }

    /// Collects and applies. The applicator is invoked once with the full list.
    pub fn process<P: RedactablePage>(
        &self,
        page: &mut P,
        index: usize,
    ) -> RedactorResult<PageReport> {
        let regions = self.collect(page)?;

        if self.applicator.apply(page, &regions)? {
            tracing::info!(page = index + 1, count = regions.len(), "applied redactions");
        } else {
            tracing::info!(page = index + 1, "no sections identified for redaction");
        }

        Ok(PageReport { index, regions })
    }
}

/// Statistics about one processed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentReport {
    pub input: PathBuf,
    /// Set only when the redacted document was written.
    pub output: Option<PathBuf>,
    pub pages_processed: usize,
    pub pages_modified: usize,
    pub regions_applied: usize,
}

impl DocumentReport {
    /// Returns true if any redactions were applied.
    pub fn has_redactions(&self) -> bool {
        self.regions_applied > 0
    }
}

/// Processes documents one at a time, page by page.
///
/// The output is written only when at least one page changed; untouched
/// documents produce no artifact. The source file is never modified.
#[derive(Debug, Clone)]
pub struct DocumentPipeline<B> {
    backend: B,
    config: RedactionConfig,
}

impl DocumentPipeline<MupdfBackend> {
    /// Creates a pipeline backed by MuPDF.
    pub fn with_mupdf(config: RedactionConfig) -> Self {
        let backend = MupdfBackend::new().with_max_hits(config.max_hits);
        Self::new(backend, config)
    }
}

impl<B: DocumentBackend> DocumentPipeline<B> {
    pub fn new(backend: B, config: RedactionConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &RedactionConfig {
        &self.config
    }

    /// Redacts `input` into `output`.
    ///
    /// The opened document is dropped on every exit path, errors included.
    /// A failure midway leaves nothing on disk.
    pub fn process(&self, input: &Path, output: &Path) -> RedactorResult<DocumentReport> {
        if !input.exists() {
            return Err(RedactorError::Io {
                path: input.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Input file does not exist",
                ),
            });
        }
        if same_file(input, output) {
            return Err(RedactorError::InvalidInput {
                parameter: "output".to_string(),
                reason: "Output must differ from the input document".to_string(),
            });
        }

        let document = self.backend.open(input)?;
        let page_count = document.page_count()?;
        tracing::info!(
            file = %input.display(),
            pages = page_count,
            backend = self.backend.name(),
            "processing document"
        );

        let processor = PageProcessor::new(&self.config);
        let mut report = DocumentReport {
            input: input.to_path_buf(),
            pages_processed: page_count,
            ..Default::default()
        };

        for index in 0..page_count {
            let mut page = document.load_page(index)?;
            let page_report = processor.process(&mut page, index)?;

            if page_report.modified() {
                report.pages_modified += 1;
                report.regions_applied += page_report.regions.len();
            }
        }

        if report.has_redactions() {
            document.save_compacted(output)?;
            tracing::info!(output = %output.display(), "saved modified file");
            report.output = Some(output.to_path_buf());
        } else {
            tracing::info!(file = %input.display(), "no redactions applied, nothing written");
        }

        Ok(report)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fake::{FakeBackend, FakeDocument, FakePage};
    use crate::geometry::Rect;
    use crate::rules::{BlockRule, EndBoundary};
    use tempfile::TempDir;

    fn itinerary_page() -> FakePage {
        FakePage::new(600.0, 800.0)
            .with_text("Agent:", 40.0, 100.0, 80.0, 112.0)
            .with_text("Travel Desk Ltd", 90.0, 100.0, 200.0, 112.0)
            .with_text("Address:", 40.0, 130.0, 95.0, 145.0)
            .with_text("Fare rules:", 40.0, 288.0, 110.0, 300.0)
            .with_text("Non-refundable", 40.0, 310.0, 150.0, 322.0)
            .with_text("Links to comments:", 40.0, 388.0, 150.0, 400.0)
            .with_text("https://example.test/c/1", 160.0, 402.0, 300.0, 410.0)
    }

    fn plain_page() -> FakePage {
        FakePage::new(600.0, 800.0).with_text("Passenger: A. Traveller", 40.0, 80.0, 200.0, 92.0)
    }

    #[test]
    fn test_rules_run_in_order_and_commit_once() {
        let config = RedactionConfig::default();
        let mut page = itinerary_page();

        let report = PageProcessor::new(&config).process(&mut page, 0).unwrap();

        let rules: Vec<_> = report.regions.iter().map(|r| r.rule.as_str()).collect();
        assert_eq!(rules, ["Agent", "Fare Rules", "Links"]);
        assert_eq!(report.regions[0].rect, Rect::new(40.0, 100.0, 570.0, 150.0));
        assert_eq!(report.regions[1].rect.y1, 763.0);
        assert_eq!(report.regions[2].rect.y1, 412.0);
        assert_eq!(page.applied().len(), 1);
    }

    #[test]
    fn test_missing_anchor_does_not_block_other_rules() {
        let config = RedactionConfig::default();
        let page = FakePage::new(600.0, 800.0)
            .with_text("Links to comments:", 40.0, 388.0, 150.0, 400.0);

        let regions = PageProcessor::new(&config).collect(&page).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].rule, "Links");
    }

    #[test]
    fn test_page_without_anchors_is_untouched() {
        let config = RedactionConfig::default();
        let mut page = plain_page();

        let report = PageProcessor::new(&config).process(&mut page, 2).unwrap();
        assert!(!report.modified());
        assert_eq!(report.index, 2);
        assert!(page.applied().is_empty());
    }

    #[test]
    fn test_emitted_regions_respect_invariants() {
        let config = RedactionConfig {
            rules: vec![
                BlockRule::agent(),
                BlockRule::fare_rules(),
                BlockRule::fare_rules_fixed_lines(),
                BlockRule::links(),
            ],
            ..RedactionConfig::default()
        };
        let page = itinerary_page()
            .with_text("Agent:", 40.0, 790.0, 80.0, 798.0)
            .with_text("Fare rules:", 40.0, 795.0, 110.0, 805.0);

        let regions = PageProcessor::new(&config).collect(&page).unwrap();
        assert!(!regions.is_empty());
        for region in &regions {
            assert!(region.rect.y1 > region.rect.y0);
            assert!(region.height() > 0.1);
            assert_eq!(region.rect.x1, 570.0);
            assert!(region.rect.y1 <= 799.0);
        }
    }

    #[test]
    fn test_document_saved_only_when_redacted() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("ticket.pdf");
        let output = dir.path().join("ticket_redacted.pdf");
        std::fs::write(&input, b"%PDF").unwrap();

        let document = FakeDocument::new(vec![plain_page(), itinerary_page()]);
        let backend = FakeBackend::default().with_document("ticket.pdf", document.clone());
        let pipeline = DocumentPipeline::new(backend, RedactionConfig::default());

        let report = pipeline.process(&input, &output).unwrap();
        assert_eq!(report.pages_processed, 2);
        assert_eq!(report.pages_modified, 1);
        assert_eq!(report.regions_applied, 3);
        assert_eq!(report.output.as_deref(), Some(output.as_path()));
        assert_eq!(document.saved_to(), [output.clone()]);
        assert!(output.exists());
    }

    #[test]
    fn test_untouched_document_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("plain.pdf");
        let output = dir.path().join("plain_redacted.pdf");
        std::fs::write(&input, b"%PDF").unwrap();

        let document = FakeDocument::new(vec![plain_page(), plain_page()]);
        let backend = FakeBackend::default().with_document("plain.pdf", document.clone());

        let report = DocumentPipeline::new(backend, RedactionConfig::default())
            .process(&input, &output)
            .unwrap();

        assert!(!report.has_redactions());
        assert!(report.output.is_none());
        assert!(document.saved_to().is_empty());
        assert!(!output.exists());
    }

    #[test]
    fn test_rerun_on_redacted_pages_finds_no_sensitive_text() {
        let config = RedactionConfig::default();
        let processor = PageProcessor::new(&config);
        let mut page = itinerary_page();

        processor.process(&mut page, 0).unwrap();
        let remaining = page.remaining_text();
        assert!(!remaining.iter().any(|t| t == "Travel Desk Ltd"));
        assert!(!remaining.iter().any(|t| t == "Non-refundable"));
        assert!(remaining.iter().any(|t| t == "Agent:"));

        // Labels survive, so a second pass emits regions over already empty blocks.
        let second = processor.process(&mut page, 0).unwrap();
        assert!(second.modified());
        assert_eq!(page.remaining_text(), remaining);
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = TempDir::new().unwrap();
        let pipeline = DocumentPipeline::new(FakeBackend::default(), RedactionConfig::default());

        let err = pipeline
            .process(&dir.path().join("absent.pdf"), &dir.path().join("out.pdf"))
            .unwrap_err();
        assert!(matches!(err, RedactorError::Io { .. }));
    }

    #[test]
    fn test_output_must_differ_from_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("ticket.pdf");
        std::fs::write(&input, b"%PDF").unwrap();
        let backend = FakeBackend::default()
            .with_document("ticket.pdf", FakeDocument::new(vec![itinerary_page()]));

        let err = DocumentPipeline::new(backend, RedactionConfig::default())
            .process(&input, &input)
            .unwrap_err();
        assert!(matches!(err, RedactorError::InvalidInput { .. }));
    }

    #[test]
    fn test_search_failure_aborts_document_without_saving() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.pdf");
        let output = dir.path().join("broken_redacted.pdf");
        std::fs::write(&input, b"%PDF").unwrap();

        let document = FakeDocument::new(vec![itinerary_page(), itinerary_page().failing_search()]);
        let backend = FakeBackend::default().with_document("broken.pdf", document.clone());

        let result = DocumentPipeline::new(backend, RedactionConfig::default()).process(&input, &output);
        assert!(result.is_err());
        assert!(document.saved_to().is_empty());
        assert!(!output.exists());
    }

    #[test]
    fn test_save_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("ticket.pdf");
        std::fs::write(&input, b"%PDF").unwrap();

        let document = FakeDocument::new(vec![itinerary_page()]).failing_save();
        let backend = FakeBackend::default().with_document("ticket.pdf", document);

        let err = DocumentPipeline::new(backend, RedactionConfig::default())
            .process(&input, &dir.path().join("out.pdf"))
            .unwrap_err();
        assert!(matches!(err, RedactorError::Save { .. }));
    }

    #[test]
    fn test_fixed_line_preset_changes_fare_rules_only() {
        let config = RedactionConfig::preset(crate::config::Preset::LineEstimate);
        let page = itinerary_page();

        let regions = PageProcessor::new(&config).collect(&page).unwrap();
        assert_eq!(regions[1].rect.y1, 348.0);
        assert!(matches!(
            config.rules[1].end,
            EndBoundary::FixedLineCount { lines: 3 }
        ));
    }
}
