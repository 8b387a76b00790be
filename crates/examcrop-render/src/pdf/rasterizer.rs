// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterizer abstraction over an opened source document.

use examcrop_core::PageSize;
use examcrop_core::error::Result;

use crate::crop::clip::ClipRect;

/// An opened document that can render rectangular page areas.
///
/// Implementations are used sequentially: one handle serves all regions of one
/// document in turn. Callers that want parallelism open one handle per worker.
pub trait PageRasterizer {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Size of the 0-indexed `page` in points, as the page is displayed.
    fn page_size(&self, page: usize) -> Result<PageSize>;

    /// Render only `clip` of the 0-indexed `page` at `zoom` pixels per point,
    /// returning PNG-encoded bytes.
    fn render_clip(&self, page: usize, clip: &ClipRect, zoom: f32) -> Result<Vec<u8>>;
}
