//! CLI binary for edgequake-pdfstamp.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `StampConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfstamp::{
    engine, preview_png, stamp_to_file, write_icons, FontSizePolicy, PipelineStatus,
    PlacementSuggestion, StampConfig, StaticResolver, StatusObserver,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI status observer using indicatif ──────────────────────────────────────

/// Terminal status display: one spinner whose prefix follows the pipeline
/// status, plus a log line when the placement arrives.
struct CliStatusObserver {
    bar: ProgressBar,
}

impl CliStatusObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Waiting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl StatusObserver for CliStatusObserver {
    fn on_status(&self, status: PipelineStatus) {
        let (prefix, msg) = match status {
            PipelineStatus::Reading => ("Reading", "loading PDF…"),
            PipelineStatus::Analyzing => ("Analyzing", "locating the QR code…"),
            PipelineStatus::Stamping => ("Stamping", "drawing the label…"),
            PipelineStatus::Done | PipelineStatus::Error | PipelineStatus::Idle => {
                self.bar.finish_and_clear();
                return;
            }
        };
        self.bar.set_prefix(prefix);
        self.bar.set_message(msg);
    }

    fn on_placement(&self, p: &PlacementSuggestion) {
        self.bar.println(format!(
            "  {} QR code found  {}",
            green("✓"),
            dim(&format!(
                "x={:.1}% y={:.1}% size={:.0} rot={:.1}°",
                p.x, p.y, p.font_size, p.rotation
            )),
        ));
    }

    fn on_error(&self, message: &str) {
        let first_line = message.lines().next().unwrap_or(message);
        self.bar.println(format!("  {} {}", red("✗"), red(first_line)));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Stamp next to the input (writes FAST_manifest.pdf)
  pdfstamp manifest.pdf

  # Choose the output path and keep a preview of page 1
  pdfstamp manifest.pdf -o out/stamped.pdf --preview out/page1.png

  # Use a specific model
  pdfstamp --provider gemini --model gemini-2.5-pro manifest.pdf

  # Keep the font size within the suggested band
  pdfstamp --clamp-font-size 70-110 manifest.pdf

  # Skip the model and place the label yourself
  pdfstamp --placement '{"x":50,"y":12,"fontSize":90,"rotation":0,"reasoning":"manual"}' manifest.pdf

  # Stamp a downloaded manifest and print a JSON report
  pdfstamp https://example.com/manifests/7781.pdf --json

  # Generate the packaging icons (icon16.png, icon48.png, icon128.png)
  pdfstamp --icons ./icons

COORDINATES:
  The model answers in percent of the page image, origin top-left:
    x  horizontal centre of the label   (0 = left edge,  100 = right edge)
    y  baseline of the label            (0 = top edge,   100 = bottom edge)
  No clamping is applied; extreme answers can put the label off the page.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (preferred when set)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
"#;

/// Stamp "FAST" above the QR code of a PDF manifest.
#[derive(Parser, Debug)]
#[command(
    name = "pdfstamp",
    version,
    about = "Stamp a label above the QR code on page 1 of a PDF",
    long_about = "Render page 1 of a PDF, ask a Vision Language Model where the QR code is, \
and draw a semi-transparent label centred above it. The original PDF is left untouched; \
the stamped copy is written next to it with a FAST_ prefix.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    #[arg(required_unless_present = "icons")]
    input: Option<String>,

    /// Write the stamped PDF here instead of next to the input.
    #[arg(short, long, env = "PDFSTAMP_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM model ID (e.g. gemini-2.5-pro, gpt-4.1).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Page 1 render scale sent to the model (0.5–4.0).
    #[arg(long, env = "PDFSTAMP_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// Clamp the suggested font size, e.g. 70-110.
    #[arg(long, env = "PDFSTAMP_CLAMP_FONT_SIZE", value_name = "MIN-MAX")]
    clamp_font_size: Option<String>,

    /// Use this placement JSON instead of asking the model.
    #[arg(long, env = "PDFSTAMP_PLACEMENT", value_name = "JSON")]
    placement: Option<String>,

    /// Path to a text file containing a custom placement instruction.
    #[arg(long, env = "PDFSTAMP_INSTRUCTION")]
    instruction: Option<PathBuf>,

    /// Also write page 1 of the stamped PDF as a PNG.
    #[arg(long, env = "PDFSTAMP_PREVIEW", value_name = "PNG")]
    preview: Option<PathBuf>,

    /// Print a JSON report (placement, geometry, stats) to stdout.
    #[arg(long, env = "PDFSTAMP_JSON")]
    json: bool,

    /// Disable the status spinner.
    #[arg(long, env = "PDFSTAMP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSTAMP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSTAMP_QUIET")]
    quiet: bool,

    /// Placement call timeout in seconds (0 = none).
    #[arg(long, env = "PDFSTAMP_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// HTTP download timeout in seconds (0 = none).
    #[arg(long, env = "PDFSTAMP_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Path to libpdfium (file or directory). Overrides PDFIUM_LIB_PATH.
    #[arg(long, env = "PDFSTAMP_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Write icon16.png, icon48.png and icon128.png into DIR and exit.
    #[arg(long, value_name = "DIR")]
    icons: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active;
    // the spinner provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Icons mode ───────────────────────────────────────────────────────
    if let Some(ref dir) = cli.icons {
        let written = write_icons(dir).context("Failed to write icons")?;
        if !cli.quiet {
            for path in &written {
                eprintln!("{} {}", green("✔"), path.display());
            }
        }
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("An input PDF path or URL is required")?;

    // ── PDF engine location (process-wide, set once) ─────────────────────
    if let Some(ref lib) = cli.pdfium_lib {
        engine::configure(lib).context("Failed to configure the PDF engine")?;
    }

    // ── Build config ─────────────────────────────────────────────────────
    let observer: Option<Arc<dyn StatusObserver>> = if show_progress {
        Some(CliStatusObserver::new() as Arc<dyn StatusObserver>)
    } else {
        None
    };

    let config = build_config(&cli, observer).await?;

    // ── Run ──────────────────────────────────────────────────────────────
    let (path, output) = stamp_to_file(&input, cli.output.as_deref(), &config)
        .await
        .context("Stamping failed")?;

    if let Some(ref preview) = cli.preview {
        let png = preview_png(&output.bytes, cli.scale)
            .await
            .context("Failed to render preview")?;
        tokio::fs::write(preview, png)
            .await
            .with_context(|| format!("Failed to write preview to {}", preview.display()))?;
    }

    if cli.json {
        let mut report = serde_json::to_value(&output).context("Failed to serialise output")?;
        report["path"] = serde_json::Value::String(path.display().to_string());
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {}  {}ms  →  {}",
            green("✔"),
            cyan(&output.file_name),
            output.stats.total_duration_ms,
            bold(&path.display().to_string()),
        );
        eprintln!(
            "   {}",
            dim(&format!(
                "label at ({:.1}, {:.1}) pt, {:.1} pt, on a {:.0}×{:.0} pt page",
                output.geometry.target_x,
                output.geometry.target_y,
                output.geometry.font_size,
                output.page_size.width,
                output.page_size.height,
            )),
        );
        if !output.placement.reasoning.is_empty() {
            eprintln!("   {}", dim(&output.placement.reasoning));
        }
    }

    Ok(())
}

/// Map CLI args to `StampConfig`.
async fn build_config(cli: &Cli, observer: Option<Arc<dyn StatusObserver>>) -> Result<StampConfig> {
    let mut builder = StampConfig::builder()
        .render_scale(cli.scale)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref range) = cli.clamp_font_size {
        builder = builder.font_size_policy(parse_clamp(range)?);
    }
    if let Some(ref json) = cli.placement {
        let resolver = StaticResolver::from_json(json).context("Invalid --placement")?;
        builder = builder.resolver(Arc::new(resolver));
    }
    if let Some(ref path) = cli.instruction {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read instruction from {:?}", path))?;
        builder = builder.instruction(text);
    }
    if let Some(obs) = observer {
        builder = builder.status_observer(obs);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--clamp-font-size` ("70-110") into a clamp policy.
fn parse_clamp(s: &str) -> Result<FontSizePolicy> {
    let (min, max) = s
        .split_once('-')
        .with_context(|| format!("Expected MIN-MAX, got '{s}'"))?;
    let min: f64 = min.trim().parse().context("Invalid minimum font size")?;
    let max: f64 = max.trim().parse().context("Invalid maximum font size")?;
    if min > max {
        anyhow::bail!("Invalid font size range '{s}': min must be <= max");
    }
    Ok(FontSizePolicy::Clamp { min, max })
}
