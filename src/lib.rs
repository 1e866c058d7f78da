//! Block redaction for itinerary and ticket PDFs.
//!
//! This library locates labeled blocks (agent contact details, fare rule
//! text, comment links) by searching for literal anchor strings, infers how
//! far each block extends, and securely removes the content underneath using
//! MuPDF's redaction API.
//!
//! # Features
//!
//! - **Secure Redaction**: Physically removes text from PDFs (not just visual overlay)
//! - **Boundary Heuristics**: End-marker search, line-count estimates, fixed heights
//! - **Configurable Rules**: Anchors, paddings and margins loaded from TOML
//! - **Batch Processing**: Per-document failure isolation over a directory
//!
//! # Architecture
//!
//! - [`locate`]: literal anchor search on a page
//! - [`boundary`]: block boundary inference
//! - [`redaction`]: applying regions, MuPDF backend
//! - [`pipeline`]: per-page and per-document orchestration
//! - [`batch`]: directory driver and output naming
//! - [`config`]: configuration surface
//! - [`error`]: error taxonomy
//!
//! # Quick Start
//!
//! ```no_run
//! use itinerary_redactor::{DocumentPipeline, RedactionConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = DocumentPipeline::with_mupdf(RedactionConfig::default());
//!
//! let report = pipeline.process(
//!     Path::new("itinerary.pdf"),
//!     Path::new("itinerary_redacted.pdf"),
//! )?;
//! println!("{} region(s) redacted", report.regions_applied);
//! # Ok(())
//! # }
//! ```
//!
//! # Examples
//!
//! ## Older fixed-height variant
//!
//! ```
//! use itinerary_redactor::config::Preset;
//! use itinerary_redactor::rules::EndBoundary;
//! use itinerary_redactor::RedactionConfig;
//!
//! let config = RedactionConfig::preset(Preset::LineEstimate);
//! assert_eq!(config.rules[1].end, EndBoundary::FixedLineCount { lines: 3 });
//! ```

pub mod batch;
pub mod boundary;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod locate;
pub mod pipeline;
pub mod redaction;
pub mod rules;
pub mod text;

pub use batch::{BatchReport, BatchRunner, DocumentOutcome};
pub use boundary::BoundaryResolver;
pub use config::{AppConfig, BatchConfig, Preset, RedactionConfig};
pub use document::{DocumentBackend, RedactableDocument, RedactablePage};
pub use error::{RedactorError, RedactorResult};
pub use geometry::{Rect, RedactionRegion, TextOccurrence};
pub use locate::TextLocator;
pub use pipeline::{DocumentPipeline, DocumentReport, PageProcessor, PageReport};
pub use redaction::{ApplyOptions, ImageHandling, MupdfBackend, RedactionApplicator};
pub use rules::{BlockRule, EndBoundary, EndPlacement, Fallback, OccurrenceMode};
pub use text::extract_text_from_pdf;
