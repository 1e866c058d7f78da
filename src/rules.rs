//! Block detection rules.
//!
//! A [`BlockRule`] pairs a start anchor with an [`EndBoundary`] strategy.
//! Rules are independent of each other and carry no state between pages.

use serde::{Deserialize, Serialize};

/// Which start-anchor occurrences on a page a rule acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceMode {
    /// Only the first hit in text order.
    First,
    /// Every hit, each with its own region.
    #[default]
    Each,
}

/// Where the block ends relative to the end anchors found below the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndPlacement {
    /// Include the end anchors: lowest bottom edge plus padding.
    Enclose,
    /// Stop short of the end anchors: highest top edge minus padding.
    StopBefore,
}

/// Bottom edge used when no end anchor qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fallback {
    /// `start.y1 + lines * estimated_line_height`
    Lines { lines: u32 },
    /// `page.height - right_margin_offset - padding`
    PageBottom,
}

/// How a rule finds the bottom of its block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndBoundary {
    /// Fixed number of estimated lines below the start anchor.
    FixedLineCount { lines: u32 },
    /// Search for end anchors strictly below the start anchor.
    EndAnchorSearch {
        anchors: Vec<String>,
        placement: EndPlacement,
        #[serde(default)]
        padding: f32,
        fallback: Fallback,
    },
    /// Flat number of points added below the start anchor.
    FixedHeightAddition { height: f32 },
}

/// A named detection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRule {
    pub name: String,
    pub start_anchor: String,
    #[serde(default)]
    pub occurrences: OccurrenceMode,
    pub end: EndBoundary,
}

pub const AGENT_START: &str = "Agent:";
pub const AGENT_END: &str = "Address:";
pub const AGENT_BOTTOM_PADDING: f32 = 5.0;
pub const AGENT_FALLBACK_LINES: u32 = 5;

pub const FARE_RULES_START: &str = "Fare rules:";
pub const FARE_RULES_LINES: u32 = 3;
pub const FARE_RULES_STOPS: &[&str] = &["Restrictions:", "Endorsements:", "Fare:"];
pub const FARE_RULES_BOTTOM_PADDING: f32 = 7.0;

pub const LINKS_START: &str = "Links to comments:";
pub const LINKS_HEIGHT_ADDITION: f32 = 12.0;

impl BlockRule {
    /// Agent contact block, closed by the last "Address:" line below it.
    pub fn agent() -> Self {
        Self {
            name: "Agent".to_string(),
            start_anchor: AGENT_START.to_string(),
            occurrences: OccurrenceMode::First,
            end: EndBoundary::EndAnchorSearch {
                anchors: vec![AGENT_END.to_string()],
                placement: EndPlacement::Enclose,
                padding: AGENT_BOTTOM_PADDING,
                fallback: Fallback::Lines {
                    lines: AGENT_FALLBACK_LINES,
                },
            },
        }
    }

    /// Fare rules block bounded by the next stop heading.
    pub fn fare_rules() -> Self {
        Self {
            name: "Fare Rules".to_string(),
            start_anchor: FARE_RULES_START.to_string(),
            occurrences: OccurrenceMode::Each,
            end: EndBoundary::EndAnchorSearch {
                anchors: FARE_RULES_STOPS.iter().map(|s| s.to_string()).collect(),
                placement: EndPlacement::StopBefore,
                padding: FARE_RULES_BOTTOM_PADDING,
                fallback: Fallback::PageBottom,
            },
        }
    }

    /// Fare rules block estimated as a fixed number of lines.
    pub fn fare_rules_fixed_lines() -> Self {
        Self {
            end: EndBoundary::FixedLineCount {
                lines: FARE_RULES_LINES,
            },
            ..Self::fare_rules()
        }
    }

    /// "Links to comments" line plus a flat addition.
    pub fn links() -> Self {
        Self {
            name: "Links".to_string(),
            start_anchor: LINKS_START.to_string(),
            occurrences: OccurrenceMode::Each,
            end: EndBoundary::FixedHeightAddition {
                height: LINKS_HEIGHT_ADDITION,
            },
        }
    }
}

/// Agent, Fare Rules (end-marker driven), Links.
pub fn default_rules() -> Vec<BlockRule> {
    vec![
        BlockRule::agent(),
        BlockRule::fare_rules(),
        BlockRule::links(),
    ]
}
