// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Typed errors for the PDF engine.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load document {path:?}: {source}")]
    Load {
        path: PathBuf,
        source: lopdf::Error,
    },

    #[error("page {0} does not exist")]
    PageOutOfRange(usize),

    #[error("malformed content stream: {0}")]
    Content(lopdf::Error),

    #[error("failed to save document {path:?}: {source}")]
    Save {
        path: PathBuf,
        source: lopdf::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
