// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cross-page merge: flag questions with more than one region and order the
// final list by question number.

use std::collections::HashMap;

use examcrop_core::QuestionRegion;

/// Mark every region of a repeated question number as page-spanning and sort
/// by question number.
///
/// Regions are not geometrically combined, since each page has its own
/// coordinate space. The sort is stable, so repeated numbers keep their page
/// order.
pub fn merge_cross_page(mut regions: Vec<QuestionRegion>) -> Vec<QuestionRegion> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for region in &regions {
        *counts.entry(region.question_number).or_default() += 1;
    }

    for region in regions.iter_mut() {
        if counts.get(&region.question_number).copied().unwrap_or(0) > 1 {
            region.spans_page = true;
        }
    }

    regions.sort_by_key(|r| r.question_number);
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use examcrop_core::BBox;

    fn region(number: u32, page: usize) -> QuestionRegion {
        QuestionRegion {
            question_number: number,
            page_index: page,
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
            text_preview: String::new(),
            spans_page: false,
            group: None,
        }
    }

    #[test]
    fn repeated_numbers_span_pages() {
        let regions = vec![region(12, 1), region(11, 1), region(12, 2), region(13, 2)];
        let merged = merge_cross_page(regions);

        let summary: Vec<(u32, usize, bool)> = merged
            .iter()
            .map(|r| (r.question_number, r.page_index, r.spans_page))
            .collect();
        assert_eq!(
            summary,
            vec![(11, 1, false), (12, 1, true), (12, 2, true), (13, 2, false)]
        );
    }

    #[test]
    fn regions_are_never_combined() {
        let regions = vec![region(5, 0), region(5, 1)];
        let merged = merge_cross_page(regions);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(merge_cross_page(Vec::new()).is_empty());
    }
}
