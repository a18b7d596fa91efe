//! Metrics for the stamp face.
//!
//! The stamp uses Helvetica-Bold, one of the PDF standard 14 fonts: every
//! conforming viewer ships it, so the document only needs a font dictionary
//! naming it. Centring still needs its advance widths, which come from the
//! Adobe AFM and are fixed for the WinAnsi printable range.

use crate::error::StampError;

/// Helvetica-Bold advance widths for bytes 32..=126, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

/// A standard-14 face the stamper knows how to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandardFont {
    #[default]
    HelveticaBold,
}

impl StandardFont {
    /// PostScript name written to `/BaseFont`.
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance width of one character in 1/1000 em, if the face covers it.
    pub fn advance(self, ch: char) -> Option<u16> {
        let code = u32::from(ch);
        if !(32..=126).contains(&code) {
            return None;
        }
        match self {
            StandardFont::HelveticaBold => Some(HELVETICA_BOLD_WIDTHS[(code - 32) as usize]),
        }
    }

    /// Rendered width of `text` at `size` points: the sum of advances,
    /// scaled. No kerning.
    pub fn text_width(self, text: &str, size: f64) -> Result<f64, StampError> {
        let mut units: u64 = 0;
        for ch in text.chars() {
            let advance = self.advance(ch).ok_or_else(|| StampError::FontEmbed {
                detail: format!(
                    "{} has no metrics for {ch:?} (U+{:04X})",
                    self.base_font(),
                    u32::from(ch)
                ),
            })?;
            units += u64::from(advance);
        }
        Ok(units as f64 * size / 1000.0)
    }
}
