// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Redaction application.
//!
//! A mark is a page-space rectangle. Applying marks rewrites the page's
//! content stream so that every glyph whose center lies inside a mark is
//! gone from the text layer, then paints each mark as a solid black fill.
//! Surviving glyphs keep their exact positions: dropped glyphs are replaced
//! by TJ kerning adjustments equal to their advance.

use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};

use crate::pdf::error::{Error, Result};
use crate::pdf::geom::Rect;
use crate::pdf::interpret::{self, Glyph, TextRun};
use crate::pdf::number;

/// Apply redaction marks to one page. Returns the number of glyphs removed
/// from the text layer. With no marks the page is left untouched.
pub fn apply(doc: &mut Document, page_id: ObjectId, marks: &[Rect]) -> Result<usize> {
    if marks.is_empty() {
        return Ok(0);
    }

    let page = interpret::interpret_page(doc, page_id)?;

    // Decide, per run, which glyphs the marks swallow.
    let mut doomed: HashMap<usize, (&TextRun, Vec<bool>)> = HashMap::new();
    let mut removed = 0usize;
    for run in &page.runs {
        let flags: Vec<bool> = run
            .glyphs
            .iter()
            .map(|g| {
                let (cx, cy) = g.bbox.center();
                marks.iter().any(|m| m.contains(cx, cy))
            })
            .collect();
        let hits = flags.iter().filter(|f| **f).count();
        if hits > 0 {
            removed += hits;
            doomed.insert(run.op_index, (run, flags));
        }
    }

    // Rebuild the stream: original operations (rewritten where glyphs are
    // dropped) bracketed in q/Q, followed by the black fills.
    let mut ops = Vec::with_capacity(page.content.operations.len() + marks.len() * 2 + 4);
    ops.push(Operation::new("q", vec![]));
    for (op_index, op) in page.content.operations.iter().enumerate() {
        match doomed.get(&op_index) {
            Some((run, flags)) => rewrite_show_op(op, run, flags, &mut ops),
            None => ops.push(op.clone()),
        }
    }
    ops.push(Operation::new("Q", vec![]));

    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "rg",
        vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(0),
        ],
    ));
    for mark in marks {
        ops.push(Operation::new(
            "re",
            vec![
                Object::Real(mark.x0 as f32),
                Object::Real(mark.y0 as f32),
                Object::Real(mark.width() as f32),
                Object::Real(mark.height() as f32),
            ],
        ));
        ops.push(Operation::new("f", vec![]));
    }
    ops.push(Operation::new("Q", vec![]));

    let data = Content { operations: ops }.encode().map_err(Error::Content)?;
    doc.change_page_content(page_id, data)
        .map_err(Error::Content)?;
    Ok(removed)
}

/// Re-emit one text-showing operation without its doomed glyphs. The string
/// is rebuilt as a TJ array where every dropped glyph becomes an adjustment
/// reproducing its advance, so everything after it stays in place. The
/// state side effects of `'` and `"` are preserved as explicit operators.
fn rewrite_show_op(op: &Operation, run: &TextRun, flags: &[bool], out: &mut Vec<Operation>) {
    let operands = &op.operands;
    let elements: Vec<Object> = match op.operator.as_str() {
        "TJ" => match operands.first() {
            Some(Object::Array(items)) => items.clone(),
            _ => {
                out.push(op.clone());
                return;
            }
        },
        "Tj" => operands.first().cloned().into_iter().collect(),
        "'" => {
            out.push(Operation::new("T*", vec![]));
            operands.first().cloned().into_iter().collect()
        }
        "\"" => {
            if operands.len() < 3 {
                out.push(op.clone());
                return;
            }
            out.push(Operation::new("Tw", vec![operands[0].clone()]));
            out.push(Operation::new("Tc", vec![operands[1].clone()]));
            out.push(Operation::new("T*", vec![]));
            vec![operands[2].clone()]
        }
        _ => {
            out.push(op.clone());
            return;
        }
    };

    let mut items: Vec<Object> = Vec::with_capacity(elements.len());
    // Adjustment owed before the next emitted string.
    let mut pending = 0.0f64;

    let flush = |items: &mut Vec<Object>, pending: &mut f64| {
        if *pending != 0.0 {
            items.push(Object::Real(*pending as f32));
            *pending = 0.0;
        }
    };

    for (element, item) in elements.iter().enumerate() {
        match item {
            Object::String(bytes, format) => {
                let mut kept: Vec<u8> = Vec::new();
                let mut next_byte = 0usize;
                for (glyph, doomed) in glyphs_of_element(run, flags, element) {
                    // Bytes the decoder skipped stay with the glyph before them.
                    if glyph.offset > next_byte {
                        kept.extend_from_slice(&bytes[next_byte..glyph.offset]);
                    }
                    if doomed {
                        if !kept.is_empty() {
                            flush(&mut items, &mut pending);
                            items.push(Object::String(std::mem::take(&mut kept), format.clone()));
                        }
                        pending += glyph.tj_adjust;
                    } else {
                        kept.extend_from_slice(&bytes[glyph.offset..glyph.offset + glyph.len]);
                    }
                    next_byte = glyph.offset + glyph.len;
                }
                if next_byte < bytes.len() {
                    kept.extend_from_slice(&bytes[next_byte..]);
                }
                if !kept.is_empty() {
                    flush(&mut items, &mut pending);
                    items.push(Object::String(kept, format.clone()));
                }
            }
            other => {
                if let Some(n) = number(other) {
                    pending += n;
                } else {
                    flush(&mut items, &mut pending);
                    items.push(other.clone());
                }
            }
        }
    }
    flush(&mut items, &mut pending);

    out.push(Operation::new("TJ", vec![Object::Array(items)]));
}

/// Glyphs of one string element, paired with their doomed flag, in order.
fn glyphs_of_element<'a>(
    run: &'a TextRun,
    flags: &'a [bool],
    element: usize,
) -> impl Iterator<Item = (&'a Glyph, bool)> {
    run.glyphs
        .iter()
        .zip(flags.iter().copied())
        .filter(move |(g, _)| g.element == element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testutil::single_page_pdf;

    fn load(content: &str) -> (Document, ObjectId) {
        let bytes = single_page_pdf(content);
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        (doc, page_id)
    }

    fn page_text(doc: &Document, page_id: ObjectId) -> String {
        interpret::interpret_page(doc, page_id)
            .unwrap()
            .runs
            .iter()
            .map(|run| run.glyphs.iter().filter_map(|g| g.text).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn operators(doc: &Document, page_id: ObjectId) -> Vec<String> {
        let data = doc.get_page_content(page_id).unwrap();
        Content::decode(&data)
            .unwrap()
            .operations
            .iter()
            .map(|op| op.operator.clone())
            .collect()
    }

    #[test]
    fn no_marks_leaves_content_untouched() {
        let (mut doc, page_id) = load("BT /F1 12 Tf 72 720 Td (Hello) Tj ET");
        let before = doc.get_page_content(page_id).unwrap();
        let removed = apply(&mut doc, page_id, &[]).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(doc.get_page_content(page_id).unwrap(), before);
    }

    #[test]
    fn marked_glyphs_vanish_from_text_layer() {
        let (mut doc, page_id) = load("BT /F1 12 Tf 72 720 Td (Top Secret) Tj ET");
        // "Secret" occupies glyphs 4..10: x from 96 to 132 at 6pt/glyph.
        let mark = Rect::new(96.0, 717.0, 132.0, 731.0);

        let removed = apply(&mut doc, page_id, &[mark]).unwrap();

        assert_eq!(removed, 6);
        assert_eq!(page_text(&doc, page_id), "Top ");
    }

    #[test]
    fn surviving_glyphs_keep_their_positions() {
        let (mut doc, page_id) = load("BT /F1 12 Tf 72 720 Td (Top Secret End) Tj ET");
        let before = interpret::interpret_page(&doc, page_id).unwrap();
        // Mark "Secret" (glyphs 4..10), keep "Top " and " End".
        let mark = before.runs[0].glyphs[4..10]
            .iter()
            .map(|g| g.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap();

        apply(&mut doc, page_id, &[mark]).unwrap();

        let after = interpret::interpret_page(&doc, page_id).unwrap();
        let survivors: Vec<_> = after.runs[0].glyphs.iter().map(|g| g.bbox).collect();
        let expected: Vec<_> = before.runs[0]
            .glyphs
            .iter()
            .enumerate()
            .filter(|(i, _)| !(4..10).contains(i))
            .map(|(_, g)| g.bbox)
            .collect();
        assert_eq!(survivors.len(), expected.len());
        for (s, e) in survivors.iter().zip(expected.iter()) {
            assert!((s.x0 - e.x0).abs() < 1e-3, "{s:?} vs {e:?}");
            assert!((s.y0 - e.y0).abs() < 1e-3);
        }
    }

    #[test]
    fn black_fill_is_painted_per_mark() {
        let (mut doc, page_id) = load("BT /F1 12 Tf 72 720 Td (Hello) Tj ET");
        let marks = [
            Rect::new(72.0, 717.0, 90.0, 731.0),
            Rect::new(10.0, 10.0, 20.0, 20.0),
        ];

        apply(&mut doc, page_id, &marks).unwrap();

        let ops = operators(&doc, page_id);
        assert_eq!(ops.iter().filter(|o| o.as_str() == "re").count(), 2);
        assert_eq!(ops.iter().filter(|o| o.as_str() == "f").count(), 2);
        assert!(ops.contains(&"rg".to_string()));
        // Original content is bracketed so fill state cannot leak.
        assert_eq!(ops.first().map(String::as_str), Some("q"));
        assert_eq!(ops.last().map(String::as_str), Some("Q"));
    }

    #[test]
    fn quote_operator_keeps_line_advance_when_rewritten() {
        let (mut doc, page_id) = load(
            "BT /F1 12 Tf 14 TL 72 720 Td (One) Tj (Two) ' (Three) ' ET",
        );
        let before = interpret::interpret_page(&doc, page_id).unwrap();
        // Redact "Two" entirely; "Three" must stay on its own line.
        let mark = before.runs[1]
            .glyphs
            .iter()
            .map(|g| g.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap();

        apply(&mut doc, page_id, &[mark]).unwrap();

        let after = interpret::interpret_page(&doc, page_id).unwrap();
        let three_before = &before.runs[2].glyphs[0];
        let three_after = after
            .runs
            .iter()
            .flat_map(|r| r.glyphs.iter())
            .find(|g| g.text == Some('T'))
            .unwrap();
        assert!((three_after.bbox.x0 - three_before.bbox.x0).abs() < 1e-3);
        assert!((three_after.bbox.y0 - three_before.bbox.y0).abs() < 1e-3);
    }

    #[test]
    fn partial_removal_inside_tj_array_preserves_suffix() {
        let (mut doc, page_id) = load("BT /F1 12 Tf 72 720 Td [(AAsecret) -200 (BB)] TJ ET");
        let before = interpret::interpret_page(&doc, page_id).unwrap();
        let mark = before.runs[0].glyphs[2..8]
            .iter()
            .map(|g| g.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap();

        apply(&mut doc, page_id, &[mark]).unwrap();

        let after = interpret::interpret_page(&doc, page_id).unwrap();
        let text: String = after.runs[0].glyphs.iter().filter_map(|g| g.text).collect();
        assert_eq!(text, "AABB");
        // BB kept both its text and its position.
        let b_before = &before.runs[0].glyphs[8];
        let b_after = &after.runs[0].glyphs[2];
        assert!((b_after.bbox.x0 - b_before.bbox.x0).abs() < 1e-3);
    }
}
