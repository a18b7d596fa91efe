//! Pipeline stages for stamping page 1 of a PDF.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the resolver can be swapped without touching the PDF code.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ resolve ──▶ stamp
//! (path/URL) (pdfium)   (PNG)     (VLM)      (lopdf)
//! ```
//!
//! 1. [`input`]: load the bytes and check the declared media type
//! 2. [`render`]: rasterise page 1; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`]: PNG-encode the raster for the resolver request
//! 4. [`resolve`]: ask the placement resolver; the only stage with
//!    model I/O
//! 5. [`stamp`]: draw the label on page 1 of a fresh copy of the input

pub mod encode;
pub mod input;
pub mod render;
pub mod resolve;
pub mod stamp;
