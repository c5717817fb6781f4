// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Content stream interpreter.
//!
//! Walks a page's operations tracking the graphics and text state machines
//! and yields every shown glyph with its page-space ink box. This is the
//! single source of truth for both search (where is a keyword) and
//! redaction (which bytes of which operation produced the marked glyphs).
//!
//! Scope: the text and positioning operators of ISO 32000 §9 plus q/Q/cm.
//! Painting operators and Form XObjects are passed through untouched; text
//! nested inside Form XObjects is not interpreted.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::pdf::error::{Error, Result};
use crate::pdf::fonts::Font;
use crate::pdf::geom::{Matrix, Rect};
use crate::pdf::{number, resolve};

/// One positioned glyph inside a show operation.
#[derive(Clone, Debug)]
pub struct Glyph {
    /// Decoded character, `None` when the font is not decodable.
    pub text: Option<char>,
    /// Index of the string operand inside a TJ array (0 for Tj, ' and ").
    pub element: usize,
    /// Byte offset of the code inside that string operand.
    pub offset: usize,
    /// Bytes the code occupies.
    pub len: usize,
    /// Ink extent in page space.
    pub bbox: Rect,
    /// Adjustment (thousandths of text space) that reproduces this glyph's
    /// advance when it is dropped from a TJ array.
    pub tj_adjust: f64,
}

/// All glyphs produced by one text-showing operation.
#[derive(Clone, Debug)]
pub struct TextRun {
    /// Index of the operation in the decoded content stream.
    pub op_index: usize,
    pub glyphs: Vec<Glyph>,
}

/// Decoded operations of a page plus the glyph runs they produce.
pub struct PageContent {
    pub content: Content,
    pub runs: Vec<TextRun>,
}

#[derive(Clone)]
struct TextState {
    font: Option<Font>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    h_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Interpret a page's content streams into positioned text runs.
pub fn interpret_page(doc: &Document, page_id: ObjectId) -> Result<PageContent> {
    let data = doc.get_page_content(page_id).map_err(Error::Content)?;
    let content = Content::decode(&data).map_err(Error::Content)?;
    let fonts = page_fonts(doc, page_id);

    let mut runs = Vec::new();
    let mut ctm_stack: Vec<Matrix> = Vec::new();
    let mut ctm = Matrix::IDENTITY;
    let mut ts = TextState::default();
    let mut tm = Matrix::IDENTITY;
    let mut tlm = Matrix::IDENTITY;

    for (op_index, op) in content.operations.iter().enumerate() {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => ctm = ctm_stack.pop().unwrap_or(Matrix::IDENTITY),
            "cm" => {
                if let Some(m) = matrix_operand(operands) {
                    ctm = m.then(&ctm);
                }
            }
            "BT" => {
                tm = Matrix::IDENTITY;
                tlm = Matrix::IDENTITY;
            }
            "ET" => {}
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    ts.font = fonts.get(name.as_slice()).cloned();
                    if ts.font.is_none() {
                        log::warn!("font {:?} not found in page resources", name);
                    }
                }
                ts.size = operands.get(1).and_then(number).unwrap_or(0.0);
            }
            "Td" => {
                let tx = operands.first().and_then(number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(number).unwrap_or(0.0);
                tlm = Matrix::translate(tx, ty).then(&tlm);
                tm = tlm;
            }
            "TD" => {
                let tx = operands.first().and_then(number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(number).unwrap_or(0.0);
                ts.leading = -ty;
                tlm = Matrix::translate(tx, ty).then(&tlm);
                tm = tlm;
            }
            "Tm" => {
                if let Some(m) = matrix_operand(operands) {
                    tlm = m;
                    tm = m;
                }
            }
            "T*" => {
                tlm = Matrix::translate(0.0, -ts.leading).then(&tlm);
                tm = tlm;
            }
            "TL" => ts.leading = operands.first().and_then(number).unwrap_or(0.0),
            "Tc" => ts.char_spacing = operands.first().and_then(number).unwrap_or(0.0),
            "Tw" => ts.word_spacing = operands.first().and_then(number).unwrap_or(0.0),
            "Tz" => ts.h_scale = operands.first().and_then(number).unwrap_or(100.0) / 100.0,
            "Ts" => ts.rise = operands.first().and_then(number).unwrap_or(0.0),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let mut glyphs = Vec::new();
                    show_string(bytes, 0, &ts, &ctm, &mut tm, &mut glyphs);
                    runs.push(TextRun { op_index, glyphs });
                }
            }
            "'" => {
                tlm = Matrix::translate(0.0, -ts.leading).then(&tlm);
                tm = tlm;
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let mut glyphs = Vec::new();
                    show_string(bytes, 0, &ts, &ctm, &mut tm, &mut glyphs);
                    runs.push(TextRun { op_index, glyphs });
                }
            }
            "\"" => {
                ts.word_spacing = operands.first().and_then(number).unwrap_or(0.0);
                ts.char_spacing = operands.get(1).and_then(number).unwrap_or(0.0);
                tlm = Matrix::translate(0.0, -ts.leading).then(&tlm);
                tm = tlm;
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    let mut glyphs = Vec::new();
                    show_string(bytes, 0, &ts, &ctm, &mut tm, &mut glyphs);
                    runs.push(TextRun { op_index, glyphs });
                }
            }
            "TJ" => {
                if let Some(Object::Array(elements)) = operands.first() {
                    let mut glyphs = Vec::new();
                    for (element, item) in elements.iter().enumerate() {
                        match item {
                            Object::String(bytes, _) => {
                                show_string(bytes, element, &ts, &ctm, &mut tm, &mut glyphs);
                            }
                            other => {
                                if let Some(n) = number(other) {
                                    let tx = -n / 1000.0 * ts.size * ts.h_scale;
                                    tm = Matrix::translate(tx, 0.0).then(&tm);
                                }
                            }
                        }
                    }
                    runs.push(TextRun { op_index, glyphs });
                }
            }
            _ => {}
        }
    }

    Ok(PageContent { content, runs })
}

/// Show one string operand: emit a glyph per code and advance the text
/// matrix, per the displacement formula of ISO 32000 §9.4.4.
fn show_string(
    bytes: &[u8],
    element: usize,
    ts: &TextState,
    ctm: &Matrix,
    tm: &mut Matrix,
    glyphs: &mut Vec<Glyph>,
) {
    let Some(font) = &ts.font else {
        return;
    };

    let mut offset = 0usize;
    for cp in font.decode_string(bytes) {
        let w0 = font.advance(cp.code);
        let word = if !font.composite && cp.code == 32 {
            ts.word_spacing
        } else {
            0.0
        };
        let advance = (w0 * ts.size + ts.char_spacing + word) * ts.h_scale;

        let trm = Matrix::new(ts.size * ts.h_scale, 0.0, 0.0, ts.size, 0.0, ts.rise)
            .then(tm)
            .then(ctm);
        let corners = [
            trm.apply(0.0, font.descent),
            trm.apply(w0, font.descent),
            trm.apply(0.0, font.ascent),
            trm.apply(w0, font.ascent),
        ];
        let bbox = corners
            .iter()
            .skip(1)
            .fold(point_rect(corners[0]), |acc, p| {
                acc.union(&point_rect(*p))
            });

        let tj_adjust = if ts.size != 0.0 {
            -(advance * 1000.0) / (ts.size * ts.h_scale)
        } else {
            0.0
        };

        glyphs.push(Glyph {
            text: cp.text,
            element,
            offset,
            len: cp.len,
            bbox,
            tj_adjust,
        });

        *tm = Matrix::translate(advance, 0.0).then(tm);
        offset += cp.len;
    }
}

fn point_rect((x, y): (f64, f64)) -> Rect {
    Rect {
        x0: x,
        y0: y,
        x1: x,
        y1: y,
    }
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    Some(Matrix::new(
        number(&operands[0])?,
        number(&operands[1])?,
        number(&operands[2])?,
        number(&operands[3])?,
        number(&operands[4])?,
        number(&operands[5])?,
    ))
}

/// Fonts of a page's resources, keyed by resource name. Resources and the
/// entries inside them may be inherited or indirect.
fn page_fonts(doc: &Document, page_id: ObjectId) -> HashMap<Vec<u8>, Font> {
    let mut fonts = HashMap::new();
    let Some(resources) = page_attr(doc, page_id, b"Resources").and_then(|o| o.as_dict().ok())
    else {
        return fonts;
    };
    let Some(font_dict) = resources
        .get(b"Font")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
    else {
        return fonts;
    };
    for (name, entry) in font_dict.iter() {
        if let Some(dict) = resolve(doc, entry).and_then(|o| o.as_dict().ok()) {
            fonts.insert(name.clone(), Font::from_dict(doc, dict));
        }
    }
    fonts
}

/// Look up a page attribute, walking the Pages tree for inheritable ones.
fn page_attr<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    // Depth guard against malformed circular parent chains.
    for _ in 0..32 {
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        let parent = dict.get(b"Parent").ok()?;
        dict = resolve(doc, parent)?.as_dict().ok()?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testutil::single_page_pdf;

    fn runs_for(content: &str) -> Vec<TextRun> {
        let bytes = single_page_pdf(content);
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        interpret_page(&doc, page_id).unwrap().runs
    }

    fn text_of(run: &TextRun) -> String {
        run.glyphs.iter().filter_map(|g| g.text).collect()
    }

    #[test]
    fn simple_tj_produces_positioned_glyphs() {
        let runs = runs_for("BT /F1 12 Tf 72 720 Td (Hello) Tj ET");
        assert_eq!(runs.len(), 1);
        assert_eq!(text_of(&runs[0]), "Hello");

        // Default width 500/1000 at 12pt: 6pt per glyph starting at x=72.
        let first = &runs[0].glyphs[0];
        assert!((first.bbox.x0 - 72.0).abs() < 1e-6);
        assert!((first.bbox.x1 - 78.0).abs() < 1e-6);
        let last = &runs[0].glyphs[4];
        assert!((last.bbox.x0 - 96.0).abs() < 1e-6);
        // Baseline at 720, extent from descent to ascent.
        assert!(first.bbox.y0 < 720.0);
        assert!(first.bbox.y1 > 720.0);
    }

    #[test]
    fn td_positions_successive_lines() {
        let runs = runs_for("BT /F1 10 Tf 50 700 Td (One) Tj 0 -20 Td (Two) Tj ET");
        assert_eq!(runs.len(), 2);
        assert!((runs[0].glyphs[0].bbox.x0 - 50.0).abs() < 1e-6);
        assert!((runs[1].glyphs[0].bbox.x0 - 50.0).abs() < 1e-6);
        let y0 = runs[0].glyphs[0].bbox.y0;
        let y1 = runs[1].glyphs[0].bbox.y0;
        assert!((y0 - y1 - 20.0).abs() < 1e-6);
    }

    #[test]
    fn tj_array_numbers_move_following_text() {
        // -1000 in a TJ array advances by exactly one font size.
        let runs = runs_for("BT /F1 12 Tf 72 720 Td [(AB) -1000 (CD)] TJ ET");
        assert_eq!(runs.len(), 1);
        let glyphs = &runs[0].glyphs;
        assert_eq!(glyphs.len(), 4);
        // A at 72, B at 78, then 12pt gap on top of B's own advance.
        assert!((glyphs[2].bbox.x0 - (84.0 + 12.0)).abs() < 1e-6);
        assert_eq!(glyphs[2].element, 2);
        assert_eq!(glyphs[2].offset, 0);
    }

    #[test]
    fn consecutive_show_ops_are_separate_runs() {
        let runs = runs_for("BT /F1 12 Tf 72 720 Td (Hel) Tj (lo) Tj ET");
        assert_eq!(runs.len(), 2);
        assert_eq!(text_of(&runs[0]), "Hel");
        assert_eq!(text_of(&runs[1]), "lo");
        // The second op continues where the first left off.
        assert!((runs[1].glyphs[0].bbox.x0 - 90.0).abs() < 1e-6);
    }

    #[test]
    fn char_spacing_widens_advances() {
        let runs = runs_for("BT /F1 10 Tf 2 Tc 0 0 Td (AB) Tj ET");
        let glyphs = &runs[0].glyphs;
        // 5pt glyph + 2pt Tc.
        assert!((glyphs[1].bbox.x0 - 7.0).abs() < 1e-6);
    }

    #[test]
    fn text_without_font_yields_no_glyphs() {
        let runs = runs_for("BT 72 720 Td (Hello) Tj ET");
        assert_eq!(runs.len(), 1);
        assert!(runs[0].glyphs.is_empty());
    }

    #[test]
    fn tj_adjust_reproduces_advance() {
        let runs = runs_for("BT /F1 12 Tf 72 720 Td (AB) Tj ET");
        let g = &runs[0].glyphs[0];
        // Dropping the glyph and emitting tj_adjust must advance 6pt:
        // -n/1000 * size = 6.0 for n = -500.
        assert!((g.tj_adjust + 500.0).abs() < 1e-6);
    }

    #[test]
    fn quote_operator_advances_line_and_shows() {
        let runs = runs_for("BT /F1 12 Tf 14 TL 72 720 Td (One) Tj (Two) ' ET");
        assert_eq!(runs.len(), 2);
        let y_first = runs[0].glyphs[0].bbox.y0;
        let y_second = runs[1].glyphs[0].bbox.y0;
        assert!((y_first - y_second - 14.0).abs() < 1e-6);
        assert!((runs[1].glyphs[0].bbox.x0 - 72.0).abs() < 1e-6);
    }
}
