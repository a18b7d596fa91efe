//! Image encoding: `DynamicImage` → PNG bytes, and PNG → `ImageData`.
//!
//! PNG is chosen over JPEG because it is lossless: a QR code's module edges
//! are what the model looks for, and JPEG ringing blurs them.

use crate::error::StampError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// An encoded raster of page 1, as handed to the resolver.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RasterImage {
    /// Base64 PNG attachment for a vision request.
    ///
    /// `detail: "high"` keeps small QR codes legible on providers that tile
    /// images.
    pub fn to_image_data(&self) -> ImageData {
        let b64 = STANDARD.encode(&self.png);
        debug!("Encoded image → {} bytes base64", b64.len());
        ImageData::new(b64, "image/png").with_detail("high")
    }
}

/// Encode a rendered page as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<RasterImage, StampError> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| StampError::Render {
            detail: format!("PNG encoding failed: {}", e),
        })?;

    Ok(RasterImage {
        png,
        width: img.width(),
        height: img.height(),
    })
}
