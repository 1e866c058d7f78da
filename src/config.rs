//! Configuration loading.
//!
//! Every option has a default, so a missing or empty TOML file yields the
//! end-marker rule set writing from `input_pdfs/` into `output_pdfs/`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RedactorError, RedactorResult};
use crate::redaction::{ApplyOptions, ImageHandling};
use crate::rules::{default_rules, BlockRule, EndBoundary};

/// Points excluded from the right edge of every region.
pub const DEFAULT_RIGHT_MARGIN_OFFSET: f32 = 30.0;

/// Assumed line height used by line-count estimates.
pub const DEFAULT_ESTIMATED_LINE_HEIGHT: f32 = 16.0;

/// Regions this tall or shorter are discarded as noise.
pub const DEFAULT_MIN_REGION_HEIGHT: f32 = 0.1;

/// Distance kept between a region's bottom and the page's bottom edge.
pub const DEFAULT_PAGE_BOTTOM_INSET: f32 = 1.0;

/// Maximum search hits per literal per page.
pub const DEFAULT_MAX_HITS: u32 = 100;

pub const DEFAULT_SUFFIX: &str = "_redacted";
pub const DEFAULT_EXTENSION: &str = "pdf";

/// The two historical rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Fare rules estimated as three lines; images explicitly kept.
    LineEstimate,
    /// Fare rules bounded by stop headings.
    #[default]
    EndMarker,
}

/// Redaction heuristics and apply options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    pub right_margin_offset: f32,
    pub estimated_line_height: f32,
    pub min_region_height: f32,
    pub page_bottom_inset: f32,
    pub max_hits: u32,
    pub images: ImageHandling,
    /// RGB fill painted over each region, components in `0.0..=1.0`.
    pub fill: [f32; 3],
    /// Evaluated in order on every page.
    pub rules: Vec<BlockRule>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            right_margin_offset: DEFAULT_RIGHT_MARGIN_OFFSET,
            estimated_line_height: DEFAULT_ESTIMATED_LINE_HEIGHT,
            min_region_height: DEFAULT_MIN_REGION_HEIGHT,
            page_bottom_inset: DEFAULT_PAGE_BOTTOM_INSET,
            max_hits: DEFAULT_MAX_HITS,
            images: ImageHandling::default(),
            fill: [1.0, 1.0, 1.0],
            rules: default_rules(),
        }
    }
}

impl RedactionConfig {
    /// Builds the configuration of one historical variant.
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::EndMarker => Self::default(),
            Preset::LineEstimate => Self {
                images: ImageHandling::Keep,
                rules: vec![
                    BlockRule::agent(),
                    BlockRule::fare_rules_fixed_lines(),
                    BlockRule::links(),
                ],
                ..Self::default()
            },
        }
    }

    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            images: self.images,
            fill: self.fill,
        }
    }

    /// Rejects values that would make the heuristics meaningless.
    pub fn validate(&self) -> RedactorResult<()> {
        fn invalid(parameter: &str, reason: &str) -> RedactorError {
            RedactorError::InvalidInput {
                parameter: parameter.to_string(),
                reason: reason.to_string(),
            }
        }

        if !non_negative(self.right_margin_offset) {
            return Err(invalid("right_margin_offset", "must not be negative"));
        }
        if !positive(self.estimated_line_height) {
            return Err(invalid("estimated_line_height", "must be positive"));
        }
        if !non_negative(self.min_region_height) {
            return Err(invalid("min_region_height", "must not be negative"));
        }
        if !non_negative(self.page_bottom_inset) {
            return Err(invalid("page_bottom_inset", "must not be negative"));
        }
        if self.max_hits == 0 {
            return Err(invalid("max_hits", "must be at least 1"));
        }
        if self.fill.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(invalid("fill", "components must lie in 0.0..=1.0"));
        }
        if self.rules.is_empty() {
            return Err(invalid("rules", "at least one rule is required"));
        }

        for rule in &self.rules {
            if rule.start_anchor.is_empty() {
                return Err(invalid(
                    &format!("rules.{}.start_anchor", rule.name),
                    "anchor must not be empty",
                ));
            }
            match &rule.end {
                EndBoundary::EndAnchorSearch {
                    anchors, padding, ..
                } => {
                    if anchors.iter().any(String::is_empty) {
                        return Err(invalid(
                            &format!("rules.{}.end.anchors", rule.name),
                            "anchor must not be empty",
                        ));
                    }
                    if !non_negative(*padding) {
                        return Err(invalid(
                            &format!("rules.{}.end.padding", rule.name),
                            "must not be negative",
                        ));
                    }
                }
                EndBoundary::FixedHeightAddition { height } if !positive(*height) => {
                    return Err(invalid(
                        &format!("rules.{}.end.height", rule.name),
                        "must be positive",
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Number of points a line-count fallback or estimate spans.
    pub(crate) fn lines_to_points(&self, lines: u32) -> f32 {
        lines as f32 * self.estimated_line_height
    }
}

// NaN fails both checks.
fn non_negative(value: f32) -> bool {
    value >= 0.0
}

fn positive(value: f32) -> bool {
    value > 0.0
}

/// Directory traversal settings for batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Appended to the output file stem, never twice.
    pub suffix: String,
    /// Recognized document extension, compared case-insensitively.
    pub extension: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input_pdfs"),
            output_dir: PathBuf::from("output_pdfs"),
            suffix: DEFAULT_SUFFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub batch: BatchConfig,
    pub redaction: RedactionConfig,
}

impl AppConfig {
    /// Parses a TOML document.
    pub fn from_toml(contents: &str, origin: &Path) -> RedactorResult<Self> {
        let config: AppConfig = toml::from_str(contents).map_err(|e| RedactorError::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.redaction.validate()?;
        Ok(config)
    }

    /// Loads a TOML file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> RedactorResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| RedactorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents, path)
    }
}
