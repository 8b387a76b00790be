// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// examcrop-render: rasterizes detected question regions into images.
//
// Provides the PDF source handle (page count and geometry via `lopdf`, clipped
// rendering via poppler's `pdftoppm`), the rasterizer trait it implements, and
// the region cropper that drives it.

pub mod crop;
pub mod pdf;

pub use crop::clip::ClipRect;
pub use crop::cropper::{RegionCropper, crop_pdf};
pub use pdf::rasterizer::PageRasterizer;
pub use pdf::source::PdfSource;
