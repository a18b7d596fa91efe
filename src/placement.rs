//! The placement suggestion returned by the resolver, and its local check.
//!
//! The resolver is a language model: it is asked for a strict JSON object but
//! nothing guarantees it delivers one. [`parse_placement`] is the only way a
//! reply becomes a [`PlacementSuggestion`], so a reply with a missing or
//! non-numeric field never reaches the stamper.

use crate::error::StampError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Where to draw the stamp, in normalised page coordinates.
///
/// `x`/`y` are percentages of the page image with the origin at the
/// top-left corner: `x` is the horizontal centre of the label, `y` its
/// baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementSuggestion {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "fontSize")]
    pub font_size: f64,
    /// Degrees, counter-clockwise.
    pub rotation: f64,
    /// Free-text rationale from the model. Informational only.
    #[serde(default)]
    pub reasoning: String,
}

impl PlacementSuggestion {
    pub fn new(x: f64, y: f64, font_size: f64, rotation: f64) -> Self {
        Self {
            x,
            y,
            font_size,
            rotation,
            reasoning: String::new(),
        }
    }
}

/// Wire shape with every field optional so missing fields can be named.
#[derive(Debug, Deserialize)]
struct RawPlacement {
    x: Option<serde_json::Value>,
    y: Option<serde_json::Value>,
    #[serde(rename = "fontSize", alias = "font_size")]
    font_size: Option<serde_json::Value>,
    rotation: Option<serde_json::Value>,
    reasoning: Option<String>,
}

static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json|JSON)?\s*\n(.*?)\n?```$").unwrap());

fn strip_json_fence(input: &str) -> &str {
    let trimmed = input.trim();
    match RE_JSON_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().trim(),
        None => trimmed,
    }
}

fn required_number(value: Option<serde_json::Value>, field: &str) -> Result<f64, StampError> {
    let value = value.ok_or_else(|| StampError::MalformedResponse {
        detail: format!("missing field `{field}`"),
    })?;
    let n = value.as_f64().ok_or_else(|| StampError::MalformedResponse {
        detail: format!("field `{field}` is not a number: {value}"),
    })?;
    if !n.is_finite() {
        return Err(StampError::MalformedResponse {
            detail: format!("field `{field}` is not finite"),
        });
    }
    Ok(n)
}

fn within_percent(n: f64, field: &str) -> Result<f64, StampError> {
    if (0.0..=100.0).contains(&n) {
        Ok(n)
    } else {
        Err(StampError::MalformedResponse {
            detail: format!("field `{field}` must be within 0–100, got {n}"),
        })
    }
}

/// Parse and validate a resolver reply.
///
/// Accepts a bare JSON object or one wrapped in a ```json fence. All four
/// numeric fields are required; `x` and `y` must lie in `[0, 100]`.
/// `fontSize` and `rotation` are not range-checked here.
pub fn parse_placement(text: &str) -> Result<PlacementSuggestion, StampError> {
    let body = strip_json_fence(text);
    if body.is_empty() {
        return Err(StampError::MalformedResponse {
            detail: "empty response body".into(),
        });
    }

    let raw: RawPlacement =
        serde_json::from_str(body).map_err(|e| StampError::MalformedResponse {
            detail: format!("not a JSON object: {e}"),
        })?;

    let x = within_percent(required_number(raw.x, "x")?, "x")?;
    let y = within_percent(required_number(raw.y, "y")?, "y")?;
    let font_size = required_number(raw.font_size, "fontSize")?;
    let rotation = required_number(raw.rotation, "rotation")?;

    let reasoning = raw.reasoning.unwrap_or_else(|| {
        warn!("Placement response has no `reasoning` field");
        String::new()
    });

    Ok(PlacementSuggestion {
        x,
        y,
        font_size,
        rotation,
        reasoning,
    })
}
