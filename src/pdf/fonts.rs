// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Font metrics needed to place glyphs: horizontal widths, vertical extent,
//! and how string bytes map to character codes.
//!
//! Only simple (single-byte) fonts are decoded to text; composite Type0
//! fonts are tracked for spacing with their default width so surrounding
//! layout stays correct, but their runs are not searchable.

use lopdf::{Dictionary, Document, Object};

use crate::pdf::{number, resolve};

/// Vertical extent fallback when the font descriptor is absent, as em
/// fractions. Generous enough to cover ascenders and descenders of the
/// standard 14 fonts.
const DEFAULT_ASCENT: f64 = 0.880;
const DEFAULT_DESCENT: f64 = -0.220;

/// One decoded character code from a shown string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CodePoint {
    pub code: u32,
    /// `None` when the font's codes cannot be mapped to text.
    pub text: Option<char>,
    /// Bytes consumed from the string.
    pub len: usize,
}

/// Metrics and decoding behaviour for one font resource.
#[derive(Clone, Debug)]
pub struct Font {
    /// Composite (Type0) fonts consume two bytes per code.
    pub composite: bool,
    /// Em fractions from the font descriptor.
    pub ascent: f64,
    pub descent: f64,
    first_char: u32,
    widths: Vec<f64>,
    /// Fallback width in glyph-space units.
    default_width: f64,
    /// Glyph-space to text-space scale: 0.001 except for Type3 fonts,
    /// which carry their own FontMatrix.
    glyph_scale: f64,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            composite: false,
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            first_char: 0,
            widths: Vec::new(),
            default_width: 500.0,
            glyph_scale: 0.001,
        }
    }
}

impl Font {
    /// Read the metrics this engine needs out of a font dictionary.
    /// Anything missing falls back to conservative defaults rather than
    /// failing the whole page.
    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let mut font = Font::default();

        let subtype: &[u8] = match dict.get(b"Subtype") {
            Ok(Object::Name(name)) => name,
            _ => b"",
        };
        font.composite = subtype == b"Type0";

        // Fixed-pitch base fonts advance wider than the 500/1000 guess.
        if let Ok(Object::Name(base)) = dict.get(b"BaseFont")
            && String::from_utf8_lossy(base).contains("Courier")
        {
            font.default_width = 600.0;
        }

        if subtype == b"Type3"
            && let Some(matrix) = dict
                .get(b"FontMatrix")
                .ok()
                .and_then(|o| resolve(doc, o))
                .and_then(|o| o.as_array().ok())
            && let Some(scale) = matrix.first().and_then(number)
        {
            font.glyph_scale = scale;
        }

        if font.composite {
            font.default_width = descendant_default_width(doc, dict);
        } else if let Some(widths) = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
        {
            font.first_char = dict
                .get(b"FirstChar")
                .ok()
                .and_then(number)
                .unwrap_or(0.0) as u32;
            font.widths = widths.iter().filter_map(number).collect();
            // With an explicit width table, out-of-range codes fall back to
            // the descriptor's MissingWidth (0 when absent, per ISO 32000).
            font.default_width = 0.0;
        }

        if let Some(descriptor) = dict
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
        {
            if let Some(ascent) = descriptor.get(b"Ascent").ok().and_then(number)
                && ascent != 0.0
            {
                font.ascent = ascent / 1000.0;
            }
            if let Some(descent) = descriptor.get(b"Descent").ok().and_then(number)
                && descent != 0.0
            {
                font.descent = descent / 1000.0;
            }
            if let Some(missing) = descriptor.get(b"MissingWidth").ok().and_then(number) {
                font.default_width = missing;
            }
        }

        font
    }

    /// Horizontal advance of a code in text-space units (before font size).
    pub fn advance(&self, code: u32) -> f64 {
        let width = code
            .checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.default_width);
        width * self.glyph_scale
    }

    /// Split string bytes into character codes. Simple fonts decode one
    /// byte per code as Latin-1; composite fonts consume two bytes per
    /// code and yield no text.
    pub fn decode_string(&self, bytes: &[u8]) -> Vec<CodePoint> {
        if self.composite {
            bytes
                .chunks_exact(2)
                .map(|pair| CodePoint {
                    code: u32::from(pair[0]) << 8 | u32::from(pair[1]),
                    text: None,
                    len: 2,
                })
                .collect()
        } else {
            bytes
                .iter()
                .map(|b| CodePoint {
                    code: u32::from(*b),
                    text: Some(char::from(*b)),
                    len: 1,
                })
                .collect()
        }
    }
}

/// Default width of a composite font's descendant (DW, 1000 when absent),
/// already scaled to text space.
fn descendant_default_width(doc: &Document, dict: &Dictionary) -> f64 {
    dict.get(b"DescendantFonts")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .and_then(|fonts| fonts.first())
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .and_then(|d| d.get(b"DW").ok())
        .and_then(number)
        .unwrap_or(1000.0)
}
