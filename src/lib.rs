//! # edgequake-pdfstamp
//!
//! Stamp "FAST" above the QR code on page 1 of a truck manifest, using a
//! Vision Language Model to find the code.
//!
//! ## Why this crate?
//!
//! Manifests come from many carriers and the QR code moves around. Rather
//! than hard-coding positions, this crate rasterises page 1, asks a VLM where
//! the code is, and draws the label into the original vector PDF. The model
//! answers in page percentages, so the same answer is valid at any render
//! scale; the only real work is mapping it back into PDF space.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    read a local file or download a URL; check media type
//!  ├─ 2. Render   rasterise page 1 at 2× via pdfium (spawn_blocking)
//!  ├─ 3. Encode   PNG bytes → base64 ImageData
//!  ├─ 4. Resolve  one VLM call → {x, y, fontSize, rotation, reasoning}
//!  └─ 5. Stamp    append one text object to page 1 with lopdf
//! ```
//!
//! The placement maps to PDF user space as
//! `target_x = x/100·W − text_width/2` and `target_y = H − y/100·H`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfstamp::{stamp_to_file, StampConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
//!     let config = StampConfig::default();
//!     let (path, output) = stamp_to_file("manifest.pdf", None, &config).await?;
//!     eprintln!("{} (x={}, y={})", path.display(), output.placement.x, output.placement.y);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfstamp` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdfstamp = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod font;
pub mod geometry;
pub mod icons;
pub mod output;
pub mod pipeline;
pub mod placement;
pub mod prompts;
pub mod run;
pub mod status;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{StampConfig, StampConfigBuilder, StampStyle};
pub use error::{PipelineStage, StampError};
pub use geometry::{FontSizePolicy, PageSize, StampGeometry};
pub use icons::{generate_icons, write_icons, IconAsset};
pub use output::{StampOutput, StampStats};
pub use pipeline::encode::RasterImage;
pub use pipeline::input::{stamped_file_name, InputDocument};
pub use pipeline::resolve::{PlacementResolver, StaticResolver, VisionResolver};
pub use pipeline::stamp::{stamp_first_page, StampedDocument};
pub use placement::{parse_placement, PlacementSuggestion};
pub use run::{preview_png, stamp, stamp_document, stamp_sync, stamp_to_file};
pub use status::{NoopStatusObserver, PipelineStatus, StatusObserver};
