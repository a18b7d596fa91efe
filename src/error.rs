//! Error types for the edgequake-pdfstamp library.
//!
//! The pipeline has no partial results: a run either yields a stamped
//! document or a single [`StampError`]. Variants are grouped by the stage
//! that produces them so callers (and the status tracker) can tell a bad
//! upload from a flaky model call without string matching.

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PipelineStage {
    /// Resolving and validating the input document.
    Reading,
    /// Rasterising page 1 and asking the placement resolver.
    Analyzing,
    /// Editing the PDF.
    Stamping,
    /// Writing the stamped document somewhere.
    Output,
}

/// All fatal errors returned by the edgequake-pdfstamp library.
#[derive(Debug, Error)]
pub enum StampError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input does not declare itself as a PDF.
    #[error("'{name}' is not a PDF (declared media type: {media_type})")]
    InputValidation { name: String, media_type: String },

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Rasterisation errors ──────────────────────────────────────────────
    /// pdfium could not parse the buffer, page 1 is missing, or the bitmap
    /// could not be produced.
    #[error("Rasterisation of page 1 failed: {detail}")]
    Render { detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or pass --pdfium-lib to use an existing copy,\n\
or install pdfium where the system loader can find it.\n"
    )]
    EngineUnavailable(String),

    // ── Placement resolver errors ─────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The resolver call failed or returned nothing.
    #[error("Placement resolver failed: {detail}")]
    ExternalService { detail: String },

    /// The resolver answered, but not with a usable placement.
    #[error("Malformed placement response: {detail}")]
    MalformedResponse { detail: String },

    // ── Stamping errors ───────────────────────────────────────────────────
    /// The original buffer could not be parsed into an editable document.
    #[error("Failed to load PDF for stamping: {detail}")]
    Load { detail: String },

    /// The stamp font could not be attached to page 1 or lacks metrics.
    #[error("Failed to embed stamp font: {detail}")]
    FontEmbed { detail: String },

    /// The edited document could not be serialised.
    #[error("Failed to serialise stamped PDF: {detail}")]
    SaveFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StampError {
    /// The stage this error aborts.
    pub fn stage(&self) -> PipelineStage {
        match self {
            StampError::InputValidation { .. }
            | StampError::FileNotFound { .. }
            | StampError::PermissionDenied { .. }
            | StampError::DownloadFailed { .. }
            | StampError::DownloadTimeout { .. }
            | StampError::InvalidConfig(_) => PipelineStage::Reading,
            StampError::Render { .. }
            | StampError::EngineUnavailable(_)
            | StampError::ProviderNotConfigured { .. }
            | StampError::ExternalService { .. }
            | StampError::MalformedResponse { .. } => PipelineStage::Analyzing,
            StampError::Load { .. }
            | StampError::FontEmbed { .. }
            | StampError::SaveFailed { .. }
            | StampError::Internal(_) => PipelineStage::Stamping,
            StampError::OutputWriteFailed { .. } => PipelineStage::Output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_validation_display() {
        let e = StampError::InputValidation {
            name: "invoice.docx".into(),
            media_type: "application/msword".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("invoice.docx"), "got: {msg}");
        assert!(msg.contains("application/msword"), "got: {msg}");
    }

    #[test]
    fn malformed_response_display() {
        let e = StampError::MalformedResponse {
            detail: "missing field `rotation`".into(),
        };
        assert!(e.to_string().contains("rotation"));
    }

    #[test]
    fn stages_follow_taxonomy() {
        assert_eq!(
            StampError::InputValidation {
                name: "a".into(),
                media_type: "text/plain".into()
            }
            .stage(),
            PipelineStage::Reading
        );
        assert_eq!(
            StampError::Render { detail: "x".into() }.stage(),
            PipelineStage::Analyzing
        );
        assert_eq!(
            StampError::ExternalService { detail: "x".into() }.stage(),
            PipelineStage::Analyzing
        );
        assert_eq!(
            StampError::Load { detail: "x".into() }.stage(),
            PipelineStage::Stamping
        );
        assert_eq!(
            StampError::FontEmbed { detail: "x".into() }.stage(),
            PipelineStage::Stamping
        );
    }

    #[test]
    fn engine_unavailable_mentions_override() {
        let e = StampError::EngineUnavailable("dlopen failed".into());
        let msg = e.to_string();
        assert!(msg.contains("dlopen failed"));
        assert!(msg.contains("PDFIUM_LIB_PATH"));
    }
}
