// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for examcrop.

use thiserror::Error;

/// Top-level error type for all examcrop operations.
///
/// Only structural problems with the whole input propagate to callers of the
/// document-level APIs. Per-region failures are logged and skipped there.
#[derive(Debug, Error)]
pub enum ExamCropError {
    // -- Layout input --
    #[error("layout data has no page list (`pdf_info` missing)")]
    MissingPageList,

    #[error("malformed layout data: {0}")]
    Layout(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Source document --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("clip rectangle on page {page} has zero area")]
    DegenerateClip { page: usize },

    #[error("rasterization failed: {0}")]
    RenderError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ExamCropError>;
