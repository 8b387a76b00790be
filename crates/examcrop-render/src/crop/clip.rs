// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Clip rectangles: a region's bbox grown by padding and clamped to its page.

use examcrop_core::{BBox, PageSize};

/// Page area to rasterize, in points. Always satisfies
/// `0 <= x0 <= x1 <= page width` and `0 <= y0 <= y1 <= page height` when built
/// with [`ClipRect::from_region`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl ClipRect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Expand `bbox` by `padding` on every side and clamp it to `page`.
    ///
    /// Negative padding shrinks the box; a box shrunk past itself collapses to
    /// zero width or height rather than inverting.
    pub fn from_region(bbox: &BBox, padding: f32, page: PageSize) -> Self {
        let max_x = page.width.max(0.0);
        let max_y = page.height.max(0.0);

        let x0 = clamp(bbox.x0 - padding, max_x);
        let y0 = clamp(bbox.y0 - padding, max_y);
        let x1 = clamp(bbox.x1 + padding, max_x).max(x0);
        let y1 = clamp(bbox.y1 + padding, max_y).max(y0);

        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Whether the rectangle has no area to render.
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Pixel rectangle `(x, y, width, height)` at `zoom`, covering every pixel
    /// the clip touches. `None` for an empty clip.
    pub fn pixel_rect(&self, zoom: f32) -> Option<(u32, u32, u32, u32)> {
        if self.is_empty() || !(zoom > 0.0) {
            return None;
        }
        let x = (self.x0 * zoom).floor() as u32;
        let y = (self.y0 * zoom).floor() as u32;
        let right = (self.x1 * zoom).ceil() as u32;
        let bottom = (self.y1 * zoom).ceil() as u32;
        let width = right.saturating_sub(x);
        let height = bottom.saturating_sub(y);
        (width > 0 && height > 0).then_some((x, y, width, height))
    }
}

/// Clamp into `[0, max]`; NaN collapses to 0.
fn clamp(value: f32, max: f32) -> f32 {
    value.max(0.0).min(max)
}
