// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Minimal PDF engine backing the redaction procedure.
//!
//! Built on `lopdf`. The surface is intentionally small: open a document,
//! get the positioned text of a page, search it for literal strings, apply
//! redaction marks (strip glyphs + paint black), save. Dropping a
//! [`Document`] releases everything it holds, so handles cannot leak
//! across error paths.

pub mod error;
pub mod fonts;
pub mod geom;
pub mod interpret;
pub mod redact;

use std::path::Path;

use lopdf::{Object, ObjectId};

use interpret::TextRun;

pub use error::Error;
pub use geom::Rect;

use error::Result;

/// An open PDF document.
#[derive(Debug)]
pub struct Document {
    inner: lopdf::Document,
    pages: Vec<ObjectId>,
}

impl Document {
    /// Load a document from disk. Fails on unreadable or structurally
    /// broken files.
    pub fn open(path: &Path) -> Result<Self> {
        let inner = lopdf::Document::load(path).map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let pages = inner.get_pages().into_values().collect();
        Ok(Self { inner, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Positioned text of one page (0-based).
    pub fn page_text(&self, index: usize) -> Result<PageText> {
        let page_id = self.page_id(index)?;
        let page = interpret::interpret_page(&self.inner, page_id)?;
        Ok(PageText { runs: page.runs })
    }

    /// Apply redaction marks to one page: glyphs under a mark are removed
    /// from the text layer and each mark is painted solid black. Returns
    /// the number of glyphs removed.
    pub fn redact(&mut self, index: usize, marks: &[Rect]) -> Result<usize> {
        let page_id = self.page_id(index)?;
        redact::apply(&mut self.inner, page_id, marks)
    }

    /// Write the document to `path`, overwriting any existing file.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.inner
            .save(path)
            .map_err(|source| Error::Save {
                path: path.to_path_buf(),
                source: lopdf::Error::IO(source),
            })?;
        Ok(())
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages
            .get(index)
            .copied()
            .ok_or(Error::PageOutOfRange(index))
    }
}

/// Positioned text runs of one page.
pub struct PageText {
    runs: Vec<TextRun>,
}

impl PageText {
    /// Literal, case-sensitive occurrences of `needle`, one rectangle per
    /// match. Matches are found within a single show operation; text split
    /// across separate operations is not matched.
    pub fn find(&self, needle: &str) -> Vec<Rect> {
        let mut out = Vec::new();
        if needle.is_empty() {
            return out;
        }
        let needle_chars = needle.chars().count();
        for run in &self.runs {
            if run.glyphs.is_empty() || run.glyphs.iter().any(|g| g.text.is_none()) {
                continue;
            }
            let text: String = run.glyphs.iter().filter_map(|g| g.text).collect();
            for (byte_pos, _) in text.match_indices(needle) {
                let start = text[..byte_pos].chars().count();
                if let Some(rect) = run.glyphs[start..start + needle_chars]
                    .iter()
                    .map(|g| g.bbox)
                    .reduce(|a, b| a.union(&b))
                {
                    out.push(rect);
                }
            }
        }
        out
    }

    /// Extractable text, one line per show operation. Used by tests and
    /// diagnostics; undecodable runs contribute nothing.
    #[allow(dead_code)]
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|run| run.glyphs.iter().filter_map(|g| g.text).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Follow a reference one level; `None` when it dangles.
pub(crate) fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        _ => Some(obj),
    }
}

/// Numeric operand, integer or real.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Fixture builders for engine and procedure tests: minimal documents
/// assembled object by object with `lopdf`.
#[cfg(test)]
pub(crate) mod testutil {
    use lopdf::{Object, Stream, dictionary};

    /// One page, standard letter media box, Helvetica as /F1.
    pub(crate) fn single_page_pdf(content: &str) -> Vec<u8> {
        multi_page_pdf(&[content])
    }

    /// One page per content string, sharing a single /F1 Helvetica.
    pub(crate) fn multi_page_pdf(contents: &[&str]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ];

        let mut page_ids = Vec::new();
        for content in contents {
            let stream = Stream::new(dictionary! {}, content.as_bytes().to_vec());
            let content_id = doc.add_object(stream);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "MediaBox" => media_box.clone(),
                "Contents" => Object::Reference(content_id),
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => Object::Reference(font_id) },
                },
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_ids.len() as i64),
        });

        for page_id in &page_ids {
            if let Ok(page) = doc.get_object_mut(*page_id)
                && let Ok(dict) = page.as_dict_mut()
            {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}
