// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Column splitter for two-column exam pages.
//
// Layout engines emit blocks in an order that interleaves both columns, so a
// sequential walk over the raw order would glue left-column text onto
// right-column questions. Each page is bisected at its horizontal midpoint and
// every column is re-sorted top to bottom.
//
// Pages with three or more real columns are not supported: everything left of
// the midpoint lands in one column.

use examcrop_core::LayoutBlock;

/// Partition one page's blocks into at most two reading columns, left first.
///
/// Blocks without a bounding box are dropped. Empty columns are omitted, so an
/// empty page yields an empty `Vec`.
pub fn split_columns(blocks: &[LayoutBlock], page_width: f32) -> Vec<Vec<&LayoutBlock>> {
    let mid_x = page_width / 2.0;
    let mut left = Vec::new();
    let mut right = Vec::new();

    for block in blocks {
        let Some(bbox) = block.bbox else { continue };
        if bbox.center_x() <= mid_x {
            left.push(block);
        } else {
            right.push(block);
        }
    }

    let mut columns = Vec::with_capacity(2);
    for mut column in [left, right] {
        if column.is_empty() {
            continue;
        }
        column.sort_by(|a, b| top_of(a).total_cmp(&top_of(b)));
        columns.push(column);
    }
    columns
}

fn top_of(block: &LayoutBlock) -> f32 {
    block.bbox.map_or(0.0, |b| b.y0)
}
