// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop module: clip rectangles, image encoding, and the region cropper.

pub mod clip;
pub mod cropper;
pub mod encode;

pub use clip::ClipRect;
pub use cropper::{RegionCropper, crop_pdf};
