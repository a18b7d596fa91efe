//! Rasterisation of page 1 via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with thread-local state and no async story;
//! rendering a page is pure CPU work. Running it on the blocking pool keeps
//! the Tokio workers free while the page renders.
//!
//! Every call binds its own [`Pdfium`] instance and parses its own document
//! from a shared copy of the input bytes, so concurrent runs never share
//! engine state. Both are dropped when the call returns, on every path.

use crate::engine;
use crate::error::StampError;
use crate::geometry::PageSize;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Page 1 rendered at a fixed magnification.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub image: DynamicImage,
    /// Page 1 size in points, as pdfium reports it.
    pub page_size: PageSize,
    pub scale: f32,
}

/// Rasterise page 1 of `bytes` at `scale`.
///
/// This runs inside `spawn_blocking` since pdfium operations are CPU-bound.
pub async fn render_first_page(bytes: Arc<Vec<u8>>, scale: f32) -> Result<RenderedPage, StampError> {
    tokio::task::spawn_blocking(move || render_first_page_blocking(&bytes, scale))
        .await
        .map_err(|e| StampError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of page rendering.
fn render_first_page_blocking(bytes: &[u8], scale: f32) -> Result<RenderedPage, StampError> {
    let pdfium = engine::bind()?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| StampError::Render {
            detail: format!("cannot parse document: {:?}", e),
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let page = pages.first().map_err(|e| StampError::Render {
        detail: format!("document has no page 1: {:?}", e),
    })?;

    let page_size = PageSize::new(page.width().value as f64, page.height().value as f64);

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| StampError::Render {
            detail: format!("{:?}", e),
        })?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page 1 ({:.1}×{:.1} pt) → {}x{} px at {}×",
        page_size.width,
        page_size.height,
        image.width(),
        image.height(),
        scale
    );

    Ok(RenderedPage {
        image,
        page_size,
        scale,
    })
}
