// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: the rasterizer seam and the poppler-backed source document.

pub mod rasterizer;
pub mod source;

pub use rasterizer::PageRasterizer;
pub use source::PdfSource;
