//! Stamping entry points.
//!
//! One run is strictly sequential: read → analyse → stamp. Each stage needs
//! the previous one's output, so there is nothing to overlap. A run either
//! returns a complete [`StampOutput`] or a single [`StampError`]; the
//! status observer sees `Error` then `Idle` in the second case, and nothing
//! produced before the failure is handed back.

use crate::config::StampConfig;
use crate::error::StampError;
use crate::output::{StampOutput, StampStats};
use crate::pipeline::input::{self, InputDocument};
use crate::pipeline::resolve::{PlacementResolver, VisionResolver};
use crate::pipeline::{encode, render, stamp};
use crate::status::{PipelineStatus, StatusTracker};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Stamp page 1 of a PDF file or URL.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Any failure aborts the run: a non-PDF input, a render failure, a failed
/// or malformed resolver reply, or a document that cannot be edited.
pub async fn stamp(
    input_str: impl AsRef<str>,
    config: &StampConfig,
) -> Result<StampOutput, StampError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting stamp: {}", input_str);

    let mut tracker = StatusTracker::new(config.status_observer.clone());
    if let Err(e) = input::check_declared_type(input_str) {
        return conclude(&mut tracker, Err(e));
    }
    tracker.advance(PipelineStatus::Reading);

    let result = async {
        let doc = input::resolve_input(input_str, config.download_timeout_secs).await?;
        // A download only declares its type once it arrives.
        doc.validate()?;
        run_stages(&mut tracker, &doc, config, total_start).await
    }
    .await;

    conclude(&mut tracker, result)
}

/// Stamp an in-memory document.
///
/// The declared media type is checked before anything else runs.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdfstamp::{stamp_document, InputDocument, StampConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("manifest.pdf")?;
/// let doc = InputDocument::from_bytes("manifest.pdf", "application/pdf", bytes);
/// let output = stamp_document(&doc, &StampConfig::default()).await?;
/// std::fs::write(&output.file_name, &output.bytes)?;
/// # Ok(())
/// # }
/// ```
pub async fn stamp_document(
    doc: &InputDocument,
    config: &StampConfig,
) -> Result<StampOutput, StampError> {
    let total_start = Instant::now();
    let mut tracker = StatusTracker::new(config.status_observer.clone());
    if let Err(e) = doc.validate() {
        return conclude(&mut tracker, Err(e));
    }
    tracker.advance(PipelineStatus::Reading);
    let result = run_stages(&mut tracker, doc, config, total_start).await;
    conclude(&mut tracker, result)
}

/// Stamp a PDF and write the result to disk.
///
/// Without `output_path` the file lands next to a local input (or in the
/// working directory for a URL) under the prefixed name. Uses atomic write
/// (temp file + rename) to prevent partial files.
pub async fn stamp_to_file(
    input_str: impl AsRef<str>,
    output_path: Option<&Path>,
    config: &StampConfig,
) -> Result<(PathBuf, StampOutput), StampError> {
    let input_str = input_str.as_ref();
    let output = stamp(input_str, config).await?;
    let path = match output_path {
        Some(p) => p.to_path_buf(),
        None => default_output_path(input_str, &output.file_name),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StampError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &output.bytes)
        .await
        .map_err(|e| StampError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|e| StampError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    info!("Wrote {} ({} bytes)", path.display(), output.bytes.len());
    Ok((path, output))
}

/// Synchronous wrapper around [`stamp`].
///
/// Creates a temporary tokio runtime internally.
pub fn stamp_sync(
    input_str: impl AsRef<str>,
    config: &StampConfig,
) -> Result<StampOutput, StampError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| StampError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(stamp(input_str, config))
}

/// Render page 1 of any PDF (typically a stamped output) to PNG bytes.
///
/// Does not require an LLM provider or API key.
pub async fn preview_png(bytes: &[u8], scale: f32) -> Result<Vec<u8>, StampError> {
    let rendered = render::render_first_page(Arc::new(bytes.to_vec()), scale).await?;
    Ok(encode::encode_png(&rendered.image)?.png)
}

/// Where [`stamp_to_file`] writes when no output path is given.
pub fn default_output_path(input_str: &str, file_name: &str) -> PathBuf {
    if input::is_url(input_str) {
        return PathBuf::from(file_name);
    }
    match Path::new(input_str).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => PathBuf::from(file_name),
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn conclude(
    tracker: &mut StatusTracker,
    result: Result<StampOutput, StampError>,
) -> Result<StampOutput, StampError> {
    match &result {
        Ok(_) => tracker.finish(),
        Err(e) => {
            warn!("Stamp aborted during {:?}: {}", e.stage(), e);
            tracker.fail(&e.to_string());
        }
    }
    result
}

async fn run_stages(
    tracker: &mut StatusTracker,
    doc: &InputDocument,
    config: &StampConfig,
    total_start: Instant,
) -> Result<StampOutput, StampError> {
    // ── Step 1: Input (declared type already checked) ────────────────────
    info!(
        "Input: {} ({} bytes, {})",
        doc.file_name,
        doc.bytes.len(),
        doc.media_type
    );
    let original = Arc::new(doc.bytes.clone());

    // ── Step 2: Rasterise page 1 ─────────────────────────────────────────
    tracker.advance(PipelineStatus::Analyzing);
    let resolver = build_resolver(config)?;

    let render_start = Instant::now();
    let rendered = render::render_first_page(Arc::clone(&original), config.render_scale).await?;
    let raster = encode::encode_png(&rendered.image)?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!(
        "Rendered page 1 → {}x{} px in {}ms",
        raster.width, raster.height, render_duration_ms
    );

    // ── Step 3: Ask the resolver ─────────────────────────────────────────
    let resolve_start = Instant::now();
    let placement = resolver.resolve(&raster).await?;
    let resolve_duration_ms = resolve_start.elapsed().as_millis() as u64;
    tracker.placement(&placement);
    if !placement.reasoning.is_empty() {
        debug!("Resolver reasoning: {}", placement.reasoning);
    }

    // ── Step 4: Stamp a fresh copy ───────────────────────────────────────
    tracker.advance(PipelineStatus::Stamping);
    let stamp_start = Instant::now();
    let stamped = {
        let original = Arc::clone(&original);
        let placement = placement.clone();
        let style = config.style.clone();
        tokio::task::spawn_blocking(move || stamp::stamp_first_page(&original, &placement, &style))
            .await
            .map_err(|e| StampError::Internal(format!("Stamp task panicked: {}", e)))??
    };
    let stamp_duration_ms = stamp_start.elapsed().as_millis() as u64;

    let stats = StampStats {
        input_bytes: original.len(),
        output_bytes: stamped.bytes.len(),
        image_width: raster.width,
        image_height: raster.height,
        render_duration_ms,
        resolve_duration_ms,
        stamp_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!("Stamp complete: {}ms total", stats.total_duration_ms);

    Ok(StampOutput {
        file_name: input::stamped_file_name(&doc.file_name, &config.output_prefix),
        bytes: stamped.bytes,
        placement,
        page_size: stamped.page_size,
        geometry: stamped.geometry,
        stats,
    })
}

/// Pick the resolver: a pre-built one, or a [`VisionResolver`] over the
/// resolved provider.
fn build_resolver(config: &StampConfig) -> Result<Arc<dyn PlacementResolver>, StampError> {
    if let Some(ref resolver) = config.resolver {
        return Ok(Arc::clone(resolver));
    }

    let provider = resolve_provider(config)?;
    let label = config.style.text.as_str();
    let mut resolver = VisionResolver::new(provider, label)
        .with_sampling(config.temperature, config.max_tokens)
        .with_timeout_secs(config.api_timeout_secs);
    if let Some(ref custom) = config.instruction {
        resolver = resolver.with_instruction(custom, label);
    }
    Ok(Arc::new(resolver))
}

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, StampError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        StampError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn default_model_for(provider_name: &str) -> &'static str {
    match provider_name {
        "gemini" => DEFAULT_GEMINI_MODEL,
        _ => DEFAULT_MODEL,
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`); the factory reads
///    the matching API key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **Gemini** when `GEMINI_API_KEY` is set, the service the manifest
///    workflow was built against.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
fn resolve_provider(config: &StampConfig) -> Result<Arc<dyn LLMProvider>, StampError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(default_model_for(name));
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
            return create_vision_provider("gemini", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| StampError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
