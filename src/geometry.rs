//! Mapping a normalised placement onto native PDF coordinates.
//!
//! The resolver sees a raster of page 1 with its origin at the top-left and
//! answers in percent of that raster. PDF user space has its origin at the
//! bottom-left and is measured in points. Because the raster is produced at a
//! fixed magnification of the whole page, a percentage of the raster is the
//! same percentage of the page, so the scale factor drops out and only the
//! vertical flip and the centring offset remain:
//!
//! ```text
//! target_x = x/100 · W − text_width/2
//! target_y = H − y/100 · H
//! ```
//!
//! No clamping happens here: a suggestion near an edge can put the stamp
//! partly or fully off the page.

use crate::placement::PlacementSuggestion;
use serde::{Deserialize, Serialize};

/// Page 1 size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Whether the resolver's font size is used as-is.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum FontSizePolicy {
    /// Use the suggested size unchanged. (default)
    #[default]
    PassThrough,
    /// Clamp the suggested size into `[min, max]`.
    Clamp { min: f64, max: f64 },
}

impl FontSizePolicy {
    pub fn apply(&self, size: f64) -> f64 {
        match *self {
            FontSizePolicy::PassThrough => size,
            FontSizePolicy::Clamp { min, max } => size.clamp(min, max),
        }
    }
}

/// Where and how the stamp is drawn, in native PDF units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StampGeometry {
    /// Left end of the baseline.
    pub target_x: f64,
    /// Baseline height above the bottom edge.
    pub target_y: f64,
    pub font_size: f64,
    pub rotation_deg: f64,
    pub text_width: f64,
}

impl StampGeometry {
    /// Apply the placement to a page. `text_width` must already be measured
    /// at `placement.font_size` (after any size policy).
    pub fn compute(page: PageSize, placement: &PlacementSuggestion, text_width: f64) -> Self {
        Self {
            target_x: (placement.x / 100.0) * page.width - text_width / 2.0,
            target_y: page.height - (placement.y / 100.0) * page.height,
            font_size: placement.font_size,
            rotation_deg: placement.rotation,
            text_width,
        }
    }

    /// Text matrix `[a b c d e f]` rotating about the drawing origin.
    pub fn text_matrix(&self) -> [f64; 6] {
        let theta = self.rotation_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        [cos, sin, -sin, cos, self.target_x, self.target_y]
    }
}
