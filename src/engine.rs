//! One-time configuration of the pdfium rendering engine.
//!
//! pdfium is a shared library loaded at runtime. Where it lives is decided
//! once, at process start-up, and never changes afterwards; every render
//! call then binds its own [`Pdfium`] instance from that location, so no
//! document or bitmap is ever shared between runs.
//!
//! Resolution order (first match wins):
//!
//! 1. the path passed to [`configure`]
//! 2. `PDFIUM_LIB_PATH`: a library file, or a directory containing one
//! 3. the system library search path

use crate::error::StampError;
use pdfium_render::prelude::Pdfium;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use tracing::debug;

static LIBRARY_PATH: OnceCell<PathBuf> = OnceCell::new();

/// Pin the pdfium library location for the rest of the process.
///
/// Fails if a location was already configured.
pub fn configure(library: impl Into<PathBuf>) -> Result<(), StampError> {
    let library = library.into();
    LIBRARY_PATH.set(library).map_err(|rejected| {
        StampError::InvalidConfig(format!(
            "pdfium library already configured; refusing to switch to '{}'",
            rejected.display()
        ))
    })
}

/// The configured library location, if any.
pub fn configured_library() -> Option<&'static Path> {
    LIBRARY_PATH.get().map(PathBuf::as_path)
}

/// Turn a path that may name a directory into a library file path.
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

fn env_library() -> Option<PathBuf> {
    std::env::var_os("PDFIUM_LIB_PATH")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Bind a fresh pdfium instance.
pub fn bind() -> Result<Pdfium, StampError> {
    let explicit = configured_library()
        .map(Path::to_path_buf)
        .or_else(env_library);

    let bindings = match explicit {
        Some(path) => {
            let file = library_file(&path);
            debug!("Binding pdfium from {}", file.display());
            Pdfium::bind_to_library(&file).map_err(|e| {
                StampError::EngineUnavailable(format!("{}: {:?}", file.display(), e))
            })?
        }
        None => {
            debug!("Binding pdfium from the system library path");
            Pdfium::bind_to_system_library()
                .map_err(|e| StampError::EngineUnavailable(format!("{:?}", e)))?
        }
    };

    Ok(Pdfium::new(bindings))
}
