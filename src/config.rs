//! Configuration types for a stamping run.
//!
//! Every knob lives in [`StampConfig`], built via [`StampConfigBuilder`].
//! The defaults reproduce the stamp the manifest workflow expects: "FAST" in
//! Helvetica-Bold, blue, 85 % opaque, placed from a 2× raster of page 1.

use crate::error::StampError;
use crate::geometry::FontSizePolicy;
use crate::pipeline::resolve::PlacementResolver;
use crate::status::StatusObserver;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Text, colour and opacity of the stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampStyle {
    /// Literal label. Default: "FAST".
    pub text: String,
    /// Fill colour, each channel 0–1. Default: (0.1, 0.2, 0.8).
    pub color: [f64; 3],
    /// Fill and stroke alpha, 0–1. Default: 0.85.
    pub opacity: f64,
    /// Applied to the resolver's font size before measuring. Default: pass-through.
    pub font_size_policy: FontSizePolicy,
}

impl Default for StampStyle {
    fn default() -> Self {
        Self {
            text: "FAST".to_string(),
            color: [0.1, 0.2, 0.8],
            opacity: 0.85,
            font_size_policy: FontSizePolicy::default(),
        }
    }
}

/// Configuration for a stamping run.
///
/// # Example
/// ```rust
/// use edgequake_pdfstamp::StampConfig;
///
/// let config = StampConfig::builder()
///     .render_scale(2.0)
///     .model("gemini-2.5-pro")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct StampConfig {
    /// Magnification of page 1 when rasterising for the resolver. Default: 2.0.
    ///
    /// The resolver answers in percent of the image, so the scale does not
    /// enter the coordinate mapping; it only trades request size for detail.
    pub render_scale: f32,

    /// Label text, colour, opacity and font-size policy.
    pub style: StampStyle,

    /// LLM model identifier. If None, a provider default is used.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "anthropic").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed resolver. Takes precedence over every provider setting.
    pub resolver: Option<Arc<dyn PlacementResolver>>,

    /// Sampling temperature for the placement call. Default: 0.1.
    pub temperature: f32,

    /// Output token cap for the placement call. Default: 1024.
    pub max_tokens: usize,

    /// Custom instruction replacing the built-in placement prompt.
    pub instruction: Option<String>,

    /// Timeout for the placement call in seconds; 0 disables it. Default: 120.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds; 0 disables it. Default: 120.
    pub download_timeout_secs: u64,

    /// Prefix for the stamped file name. Default: "FAST_".
    pub output_prefix: String,

    /// Receives status transitions while the pipeline runs.
    pub status_observer: Option<Arc<dyn StatusObserver>>,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            render_scale: 2.0,
            style: StampStyle::default(),
            model: None,
            provider_name: None,
            provider: None,
            resolver: None,
            temperature: 0.1,
            max_tokens: 1024,
            instruction: None,
            api_timeout_secs: 120,
            download_timeout_secs: 120,
            output_prefix: "FAST_".to_string(),
            status_observer: None,
        }
    }
}

impl fmt::Debug for StampConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StampConfig")
            .field("render_scale", &self.render_scale)
            .field("style", &self.style)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("resolver", &self.resolver.as_ref().map(|_| "<dyn PlacementResolver>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("output_prefix", &self.output_prefix)
            .finish()
    }
}

impl StampConfig {
    /// Create a new builder for `StampConfig`.
    pub fn builder() -> StampConfigBuilder {
        StampConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`StampConfig`].
#[derive(Debug)]
pub struct StampConfigBuilder {
    config: StampConfig,
}

impl StampConfigBuilder {
    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale.clamp(0.5, 4.0);
        self
    }

    pub fn stamp_text(mut self, text: impl Into<String>) -> Self {
        self.config.style.text = text.into();
        self
    }

    pub fn color(mut self, r: f64, g: f64, b: f64) -> Self {
        self.config.style.color = [r, g, b];
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.config.style.opacity = opacity;
        self
    }

    pub fn font_size_policy(mut self, policy: FontSizePolicy) -> Self {
        self.config.style.font_size_policy = policy;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn PlacementResolver>) -> Self {
        self.config.resolver = Some(resolver);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn instruction(mut self, prompt: impl Into<String>) -> Self {
        self.config.instruction = Some(prompt.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.output_prefix = prefix.into();
        self
    }

    pub fn status_observer(mut self, observer: Arc<dyn StatusObserver>) -> Self {
        self.config.status_observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<StampConfig, StampError> {
        let c = &self.config;
        if !(0.5..=4.0).contains(&c.render_scale) {
            return Err(StampError::InvalidConfig(format!(
                "Render scale must be 0.5–4.0, got {}",
                c.render_scale
            )));
        }
        if c.style.text.trim().is_empty() {
            return Err(StampError::InvalidConfig("Stamp text must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&c.style.opacity) {
            return Err(StampError::InvalidConfig(format!(
                "Opacity must be 0–1, got {}",
                c.style.opacity
            )));
        }
        if c.style.color.iter().any(|ch| !(0.0..=1.0).contains(ch)) {
            return Err(StampError::InvalidConfig(format!(
                "Colour channels must be 0–1, got {:?}",
                c.style.color
            )));
        }
        if let FontSizePolicy::Clamp { min, max } = c.style.font_size_policy {
            if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
                return Err(StampError::InvalidConfig(format!(
                    "Font size clamp needs 0 < min ≤ max, got {min}–{max}"
                )));
            }
        }
        Ok(self.config)
    }
}
