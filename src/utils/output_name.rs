// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Output file naming for redacted copies.

use std::ffi::{OsStr, OsString};
use std::path::Path;

/// File name for the redacted copy of `input`: the literal `_redacted`
/// suffix goes before the final extension, so `report.pdf` becomes
/// `report_redacted.pdf` and `v1.2.report.pdf` becomes
/// `v1.2.report_redacted.pdf`. Extensionless names just get the suffix.
pub fn redacted_file_name(input: &Path) -> OsString {
    let stem = input.file_stem().unwrap_or_else(|| OsStr::new("document"));
    let mut name = stem.to_os_string();
    name.push("_redacted");
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}
