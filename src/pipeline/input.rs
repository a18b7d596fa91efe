//! Input resolution: turn a path or URL into an in-memory [`InputDocument`].
//!
//! The pipeline works on bytes, never on files: the rasteriser and the
//! stamper each parse their own copy of the same immutable buffer, and the
//! original stays untouched so a failed run can be retried as-is.
//!
//! The only admission check is the *declared* media type: the extension of a
//! local file, or the `Content-Type` of a download. Structural problems are
//! left to the parsers, which report them as render or load errors.

use crate::error::StampError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// An input PDF as the pipeline sees it.
#[derive(Debug, Clone)]
pub struct InputDocument {
    /// Original file name (final path component only).
    pub file_name: String,
    /// Declared media type, without parameters.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Fail unless `media_type` is the PDF media type.
fn check_media_type(name: &str, media_type: &str) -> Result<(), StampError> {
    if media_type == PDF_MEDIA_TYPE {
        Ok(())
    } else {
        Err(StampError::InputValidation {
            name: name.to_string(),
            media_type: media_type.to_string(),
        })
    }
}

impl InputDocument {
    pub fn from_bytes(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: base_name(&file_name.into()),
            media_type: normalise_media_type(&media_type.into()),
            bytes,
        }
    }

    /// Reject anything that does not declare itself as a PDF.
    pub fn validate(&self) -> Result<(), StampError> {
        check_media_type(&self.file_name, &self.media_type)
    }
}

/// Name of the stamped download: `prefix` + original name.
pub fn stamped_file_name(original: &str, prefix: &str) -> String {
    format!("{prefix}{}", base_name(original))
}

fn base_name(name: &str) -> String {
    let trimmed = name.trim_end_matches(['/', '\\']);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("document.pdf")
        .to_string()
}

fn normalise_media_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn media_type_for_path(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Check what a local path declares before any of it is read.
///
/// URLs always pass here: their media type is only known from the response.
pub fn check_declared_type(input: &str) -> Result<(), StampError> {
    if is_url(input) {
        return Ok(());
    }
    let path = Path::new(input);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string());
    check_media_type(&name, &media_type_for_path(path))
}

/// Resolve a path or URL to an [`InputDocument`].
///
/// The result is not validated yet; call [`InputDocument::validate`].
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<InputDocument, StampError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input).await
    }
}

async fn read_local(path_str: &str) -> Result<InputDocument, StampError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(StampError::PermissionDenied { path });
        }
        Err(_) => return Err(StampError::FileNotFound { path }),
    };

    let media_type = media_type_for_path(&path);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    debug!(
        "Read local input {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        media_type
    );
    Ok(InputDocument::from_bytes(file_name, media_type, bytes))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<InputDocument, StampError> {
    info!("Downloading PDF from: {}", url);

    let mut builder = reqwest::Client::builder();
    if let Some(limit) = download_timeout(timeout_secs) {
        builder = builder.timeout(limit);
    }
    let client = builder
        .build()
        .map_err(|e| StampError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            StampError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            StampError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(StampError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let file_name = filename_from_url(url);
    let media_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| media_type_for_path(Path::new(&file_name)));

    let bytes = response
        .bytes()
        .await
        .map_err(|e| StampError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes ({})", bytes.len(), media_type);
    Ok(InputDocument::from_bytes(file_name, media_type, bytes.to_vec()))
}

/// Whole-request limit for a download; 0 means none.
fn download_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Extract a reasonable filename from the URL path.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn pdf_media_type_passes() {
        let doc = InputDocument::from_bytes("m.pdf", "application/pdf", vec![]);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn media_type_parameters_are_ignored() {
        let doc = InputDocument::from_bytes("m.pdf", "Application/PDF; charset=binary", vec![]);
        assert_eq!(doc.media_type, PDF_MEDIA_TYPE);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn declared_type_wins_over_content() {
        // Magic bytes say PDF, declaration says PNG: rejected.
        let doc = InputDocument::from_bytes("scan.png", "image/png", b"%PDF-1.7".to_vec());
        let err = doc.validate().unwrap_err();
        assert!(matches!(err, StampError::InputValidation { .. }));
    }

    #[test]
    fn extension_drives_local_media_type() {
        assert_eq!(media_type_for_path(Path::new("a/b/manifest.pdf")), PDF_MEDIA_TYPE);
        assert_ne!(media_type_for_path(Path::new("notes.txt")), PDF_MEDIA_TYPE);
        assert_eq!(
            media_type_for_path(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn stamped_name_prefixes_base_name() {
        assert_eq!(stamped_file_name("manifest.pdf", "FAST_"), "FAST_manifest.pdf");
        assert_eq!(
            stamped_file_name("/tmp/in/manifest 7.pdf", "FAST_"),
            "FAST_manifest 7.pdf"
        );
        assert_eq!(stamped_file_name("C:\\m\\x.pdf", "FAST_"), "FAST_x.pdf");
    }

    #[test]
    fn url_filename() {
        assert_eq!(filename_from_url("https://h.example/a/b/m.pdf?x=1"), "m.pdf");
        assert_eq!(filename_from_url("https://h.example/download"), "downloaded.pdf");
    }

    #[test]
    fn declared_type_is_checked_from_the_path_alone() {
        // Neither file exists; only the extension is consulted.
        assert!(check_declared_type("/nowhere/manifest.pdf").is_ok());
        assert!(check_declared_type("https://h.example/download").is_ok());
        let err = check_declared_type("/nowhere/manifest.docx").unwrap_err();
        assert!(matches!(err, StampError::InputValidation { ref name, .. } if name == "manifest.docx"));
    }

    #[test]
    fn zero_download_timeout_means_no_limit() {
        assert_eq!(download_timeout(0), None);
        assert_eq!(download_timeout(30), Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = resolve_input("/definitely/not/a/real/file.pdf", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, StampError::FileNotFound { .. }));
    }
}
