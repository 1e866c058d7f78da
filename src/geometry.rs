//! Page-space geometry.
//!
//! Coordinates follow MuPDF's page space: points, origin at the top-left
//! corner, y growing downward.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// True when the two rectangles share interior area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({:.2}, {:.2}, {:.2}, {:.2})",
            self.x0, self.y0, self.x1, self.y1
        )
    }
}

/// A literal string found on a page together with its bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOccurrence {
    pub text: String,
    pub rect: Rect,
}

/// A region the pipeline intends to blank, tagged with the rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionRegion {
    pub rule: String,
    pub rect: Rect,
}

impl RedactionRegion {
    pub fn height(&self) -> f32 {
        self.rect.height()
    }
}
