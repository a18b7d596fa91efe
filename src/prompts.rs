//! Instructions sent to the placement resolver.
//!
//! The model sees one image (page 1) and one instruction. The instruction
//! carries the whole contract: what to look for, where the label goes
//! relative to it, the coordinate frame, and the exact JSON shape the answer
//! must take. Keeping it here lets tests pin the contract without a model.
//!
//! Callers can override the instruction via
//! [`crate::config::StampConfigBuilder::instruction`]; the response shape is
//! appended either way so the parser's expectations never drift from the
//! prompt.

/// Default instruction for locating the QR code and placing the label.
///
/// `{label}` is replaced with the configured stamp text.
pub const DEFAULT_PLACEMENT_PROMPT: &str = r#"Analyze this document (a truck manifest).
Your task is to find the QR code and suggest where to place the word "{label}" in a large, bold font.

CRITICAL REQUIREMENTS:
1. The word "{label}" MUST be placed directly ABOVE the QR code.
2. The word "{label}" MUST be HORIZONTALLY CENTERED relative to the QR code.
3. Return (x, y) where x is the HORIZONTAL CENTER of the word and y is its BASELINE.
4. Coordinates are normalized from 0 to 100, where (0,0) is the TOP-LEFT corner of the image and (100,100) the BOTTOM-RIGHT.
5. Suggest a font size (typically 70-110) that keeps the word clearly visible and about as wide as the QR code, or slightly wider.
6. Provide a rotation in degrees if the document is slanted (usually 0)."#;

/// Response-shape declaration appended to every instruction.
pub const RESPONSE_SHAPE: &str = r#"

Respond with a single JSON object and nothing else, with exactly these fields:
{
  "x": number,          // horizontal center of the word, 0-100
  "y": number,          // baseline of the word, 0-100
  "fontSize": number,   // recommended font size
  "rotation": number,   // degrees
  "reasoning": string   // how the QR code was found and the placement chosen
}
All five fields are required."#;

/// Build the full instruction for one resolver call.
pub fn placement_instruction(custom: Option<&str>, label: &str) -> String {
    let body = match custom {
        Some(c) => c.to_string(),
        None => DEFAULT_PLACEMENT_PROMPT.replace("{label}", label),
    };
    format!("{body}{RESPONSE_SHAPE}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_the_label_and_frame() {
        let p = placement_instruction(None, "FAST");
        assert!(p.contains(r#"the word "FAST""#));
        assert!(p.contains("TOP-LEFT"));
        assert!(p.contains("70-110"));
        assert!(!p.contains("{label}"));
    }

    #[test]
    fn every_field_is_declared() {
        let p = placement_instruction(None, "FAST");
        for field in ["\"x\"", "\"y\"", "\"fontSize\"", "\"rotation\"", "\"reasoning\""] {
            assert!(p.contains(field), "missing {field}");
        }
    }

    #[test]
    fn custom_instruction_keeps_shape() {
        let p = placement_instruction(Some("Put it over the barcode."), "FAST");
        assert!(p.starts_with("Put it over the barcode."));
        assert!(p.ends_with("All five fields are required."));
        assert!(!p.contains("truck manifest"));
    }
}
