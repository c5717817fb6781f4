// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! The redaction procedure: one input file in, one sanitized copy out.
//!
//! Responsibilities:
//! - Search every page for literal, case-sensitive keyword occurrences.
//! - Black out each occurrence and strip it from the text layer.
//! - Write the result as `<stem>_redacted<ext>` into the output folder.
//!
//! The document handle lives on the stack of this function, so it is
//! released on every exit path, success or failure.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::pdf;
use crate::utils::redacted_file_name;

/// Redact all occurrences of `keywords` in the PDF at `input` and save the
/// result into `output_dir`, returning the output path. An existing file
/// of the same name is overwritten. Keywords without occurrences are
/// silently skipped.
pub fn redact_file(input: &Path, keywords: &[String], output_dir: &Path) -> Result<PathBuf> {
    let mut doc =
        pdf::Document::open(input).with_context(|| format!("Failed to open {:?}", input))?;

    let mut occurrences = 0usize;
    for page in 0..doc.page_count() {
        let text = doc
            .page_text(page)
            .with_context(|| format!("Failed to read page {} of {:?}", page + 1, input))?;

        let mut marks = Vec::new();
        for keyword in keywords {
            marks.extend(text.find(keyword));
        }

        if !marks.is_empty() {
            occurrences += marks.len();
            doc.redact(page, &marks)
                .with_context(|| format!("Failed to redact page {} of {:?}", page + 1, input))?;
        }
    }
    log::info!("{}: {} occurrence(s) redacted", input.display(), occurrences);

    let output = output_dir.join(redacted_file_name(input));
    doc.save(&output)
        .with_context(|| format!("Failed to save redacted copy {:?}", output))?;
    Ok(output)
}
