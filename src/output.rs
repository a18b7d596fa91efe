//! Result types returned by the stamping entry points.

use crate::geometry::{PageSize, StampGeometry};
use crate::placement::PlacementSuggestion;
use serde::{Deserialize, Serialize};

/// A successful run: the stamped document plus what went into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampOutput {
    /// Suggested download name, e.g. `FAST_manifest.pdf`.
    pub file_name: String,
    /// The stamped PDF. Skipped when serialising a run report.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub placement: PlacementSuggestion,
    pub page_size: PageSize,
    pub geometry: StampGeometry,
    pub stats: StampStats,
}

/// Sizes and timings of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StampStats {
    pub input_bytes: usize,
    pub output_bytes: usize,
    /// Raster sent to the resolver, in pixels.
    pub image_width: u32,
    pub image_height: u32,
    pub render_duration_ms: u64,
    pub resolve_duration_ms: u64,
    pub stamp_duration_ms: u64,
    pub total_duration_ms: u64,
}
