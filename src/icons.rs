//! Packaging icons: a white lightning bolt on a rounded blue square.
//!
//! Not part of the stamping pipeline. The three sizes match what browser
//! extension stores ask for.
//!
//! Shapes are rasterised with 4×4 supersampling. The rounded corners are
//! quadratic curves with the square's corner as control point, which makes
//! the inside test closed-form: a point `(dx, dy)` away from the two edges of
//! a corner with radius `r` is inside when `√(dx/r) + √(dy/r) ≥ 1`.

use crate::error::StampError;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ICON_SIZES: [u32; 3] = [16, 48, 128];

const BACKGROUND: [u8; 3] = [0x25, 0x63, 0xeb];
const GLYPH: [u8; 3] = [0xff, 0xff, 0xff];
const SUBSAMPLES: u32 = 4;

/// Bolt outline in units of the padded glyph box (0–1 on both axes).
const BOLT: [(f64, f64); 6] = [
    (0.6, 0.0),
    (0.1, 0.55),
    (0.45, 0.55),
    (0.35, 1.0),
    (0.9, 0.45),
    (0.55, 0.45),
];

/// One rendered icon.
#[derive(Debug, Clone)]
pub struct IconAsset {
    pub size: u32,
    /// `icon{size}.png`
    pub file_name: String,
    pub png: Vec<u8>,
}

fn in_rounded_square(x: f64, y: f64, size: f64) -> bool {
    if !(0.0..=size).contains(&x) || !(0.0..=size).contains(&y) {
        return false;
    }
    let r = size * 0.2;
    let dx = x.min(size - x);
    let dy = y.min(size - y);
    if dx >= r || dy >= r {
        return true;
    }
    (dx / r).sqrt() + (dy / r).sqrt() >= 1.0
}

/// Even-odd point-in-polygon test.
fn in_polygon(x: f64, y: f64, points: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn bolt_outline(size: f64) -> Vec<(f64, f64)> {
    let padding = size * 0.25;
    let w = size - padding * 2.0;
    let h = size - padding * 2.0;
    BOLT.iter()
        .map(|&(u, v)| (padding + w * u, padding + h * v))
        .collect()
}

/// Rasterise one icon.
pub fn render_icon(size: u32) -> RgbaImage {
    let extent = size as f64;
    let bolt = bolt_outline(extent);
    let samples = (SUBSAMPLES * SUBSAMPLES) as f64;

    RgbaImage::from_fn(size, size, |px, py| {
        let mut rgb = [0.0f64; 3];
        let mut alpha = 0.0f64;
        for sy in 0..SUBSAMPLES {
            for sx in 0..SUBSAMPLES {
                let x = px as f64 + (sx as f64 + 0.5) / SUBSAMPLES as f64;
                let y = py as f64 + (sy as f64 + 0.5) / SUBSAMPLES as f64;
                let colour = if in_polygon(x, y, &bolt) {
                    GLYPH
                } else if in_rounded_square(x, y, extent) {
                    BACKGROUND
                } else {
                    continue;
                };
                for (acc, c) in rgb.iter_mut().zip(colour) {
                    *acc += c as f64;
                }
                alpha += 1.0;
            }
        }
        if alpha == 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        let [r, g, b] = rgb.map(|c| (c / alpha).round() as u8);
        Rgba([r, g, b, (alpha / samples * 255.0).round() as u8])
    })
}

/// Render the full icon set as PNGs.
pub fn generate_icons() -> Result<Vec<IconAsset>, StampError> {
    ICON_SIZES
        .iter()
        .map(|&size| {
            let mut png = Vec::new();
            render_icon(size)
                .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .map_err(|e| StampError::Internal(format!("icon{size}.png: {e}")))?;
            Ok(IconAsset {
                size,
                file_name: format!("icon{size}.png"),
                png,
            })
        })
        .collect()
}

/// Write the icon set into `dir`, creating it if needed.
pub fn write_icons(dir: &Path) -> Result<Vec<PathBuf>, StampError> {
    std::fs::create_dir_all(dir).map_err(|e| StampError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::with_capacity(ICON_SIZES.len());
    for icon in generate_icons()? {
        let path = dir.join(&icon.file_name);
        std::fs::write(&path, &icon.png).map_err(|e| StampError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;
        info!("Wrote {} ({} bytes)", path.display(), icon.png.len());
        written.push(path);
    }
    Ok(written)
}
