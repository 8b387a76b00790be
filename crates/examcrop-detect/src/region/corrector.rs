// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Duplicate question number correction.
//
// Layout engines sometimes split a two-digit marker across blocks: "34." comes
// out as a block ending in "3" followed by a block starting with "4.". The
// second block then opens a spurious question 4, usually next to questions
// 32, 33 and 35 on a late page. The last digit survives the split, so a
// misplaced duplicate is relabelled to an unused number with the same last
// digit inside the window of its same-page neighbours.

use std::collections::{BTreeSet, HashMap, HashSet};

use examcrop_core::{DetectorConfig, QuestionRegion};
use tracing::{info, warn};

/// Slack around the neighbour range within which a duplicate is considered in place.
const PLAUSIBLE_SLACK: u32 = 3;

/// Slack around the neighbour range searched for a replacement number.
const SEARCH_SLACK: u32 = 2;

/// Relabel duplicated question numbers that do not fit their page context.
///
/// Regions are never added or removed and only `question_number` changes.
/// Every relabel keeps the last decimal digit and picks a number no other
/// region uses. When several candidates qualify the smallest one wins. A
/// duplicate that cannot be placed keeps its number and is logged.
pub fn correct_duplicates(
    mut regions: Vec<QuestionRegion>,
    config: &DetectorConfig,
) -> Vec<QuestionRegion> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for region in &regions {
        *counts.entry(region.question_number).or_default() += 1;
    }
    let duplicates: HashSet<u32> = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(number, _)| *number)
        .collect();

    if duplicates.is_empty() {
        return regions;
    }

    let mut used: HashSet<u32> = counts.keys().copied().collect();

    // Neighbour context is taken from the uncorrected numbering.
    let mut neighbours_by_page: HashMap<usize, BTreeSet<u32>> = HashMap::new();
    for region in &regions {
        if !duplicates.contains(&region.question_number) {
            neighbours_by_page
                .entry(region.page_index)
                .or_default()
                .insert(region.question_number);
        }
    }

    for region in regions.iter_mut() {
        let original = region.question_number;
        if !duplicates.contains(&original) {
            continue;
        }

        let Some(neighbours) = neighbours_by_page.get(&region.page_index) else {
            warn!(
                question = original,
                page = region.page_index,
                "Duplicate question number has no same-page context; keeping it"
            );
            continue;
        };
        let (Some(&lowest), Some(&highest)) = (neighbours.first(), neighbours.last()) else {
            continue;
        };

        let plausible_lo = lowest.saturating_sub(PLAUSIBLE_SLACK);
        let plausible_hi = highest + PLAUSIBLE_SLACK;
        if (plausible_lo..=plausible_hi).contains(&original) {
            continue;
        }

        let search_lo = lowest.saturating_sub(SEARCH_SLACK).max(config.min_question);
        let search_hi = (highest + SEARCH_SLACK).min(config.max_question);
        let replacement = (search_lo..=search_hi)
            .find(|candidate| !used.contains(candidate) && candidate % 10 == original % 10);

        match replacement {
            Some(number) => {
                info!(
                    from = original,
                    to = number,
                    page = region.page_index,
                    ?neighbours,
                    "Relabelled misplaced duplicate question"
                );
                region.question_number = number;
                used.insert(number);
            }
            None => warn!(
                question = original,
                page = region.page_index,
                ?neighbours,
                "Could not resolve duplicate question number; keeping it"
            ),
        }
    }

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
            bbox: BBox::new(0.0, number as f32, 10.0, number as f32 + 5.0),
            text_preview: format!("{number}."),
            spans_page: false,
            group: None,
        }
    }

    fn numbers(regions: &[QuestionRegion]) -> Vec<(u32, usize)> {
        regions
            .iter()
            .map(|r| (r.question_number, r.page_index))
            .collect()
    }

    #[test]
    fn split_digit_duplicate_is_relabelled() {
        let regions = vec![
            region(1, 0),
            region(2, 0),
            region(3, 0),
            region(4, 0),
            region(5, 0),
            region(32, 3),
            region(33, 3),
            region(4, 3),
            region(35, 3),
        ];
        let fixed = correct_duplicates(regions.clone(), &DetectorConfig::default());

        assert_eq!(
            numbers(&fixed),
            vec![
                (1, 0),
                (2, 0),
                (3, 0),
                (4, 0),
                (5, 0),
                (32, 3),
                (33, 3),
                (34, 3),
                (35, 3),
            ]
        );
        // Geometry and preview are untouched.
        assert_eq!(fixed[7].bbox, regions[7].bbox);
        assert_eq!(fixed[7].text_preview, regions[7].text_preview);
    }

    #[test]
    fn no_duplicates_returns_input_unchanged() {
        let regions = vec![region(1, 0), region(2, 0), region(40, 5)];
        let fixed = correct_duplicates(regions.clone(), &DetectorConfig::default());
        assert_eq!(fixed, regions);
    }

    #[test]
    fn duplicate_without_neighbours_is_kept() {
        let regions = vec![region(1, 0), region(2, 0), region(2, 1)];
        let fixed = correct_duplicates(regions, &DetectorConfig::default());
        assert_eq!(numbers(&fixed), vec![(1, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn unresolvable_duplicate_keeps_its_number() {
        // The search window 30..=35 holds no number ending in 7.
        let regions = vec![
            region(6, 0),
            region(7, 0),
            region(8, 0),
            region(32, 4),
            region(7, 4),
            region(33, 4),
        ];
        let fixed = correct_duplicates(regions, &DetectorConfig::default());
        assert_eq!(fixed[4].question_number, 7);
    }

    #[test]
    fn smallest_candidate_wins_and_is_then_used() {
        // Two misplaced 4s on a page with neighbours 20..=40: candidates ending
        // in 4 are 24 and 34 (14 is below the window).
        let regions = vec![
            region(3, 0),
            region(4, 0),
            region(5, 0),
            region(20, 2),
            region(4, 2),
            region(4, 2),
            region(40, 2),
        ];
        let fixed = correct_duplicates(regions, &DetectorConfig::default());
        assert_eq!(fixed[4].question_number, 24);
        assert_eq!(fixed[5].question_number, 34);
    }

    #[test]
    fn relabels_preserve_last_digit() {
        let regions = vec![
            region(1, 0),
            region(2, 0),
            region(3, 0),
            region(6, 0),
            region(7, 0),
            region(8, 0),
            region(3, 5),
            region(6, 5),
            region(41, 5),
            region(42, 5),
            region(44, 5),
            region(45, 5),
        ];
        let original = numbers(&regions);
        let fixed = correct_duplicates(regions, &DetectorConfig::default());
        for ((before, _), after) in original.iter().zip(&fixed) {
            assert_eq!(before % 10, after.question_number % 10);
        }
        assert_eq!(fixed[6].question_number, 43);
        assert_eq!(fixed[7].question_number, 46);
    }

    #[test]
    fn search_respects_max_question() {
        let config = DetectorConfig {
            max_question: 45,
            ..DetectorConfig::default()
        };
        let regions = vec![
            region(6, 0),
            region(7, 0),
            region(43, 5),
            region(44, 5),
            region(45, 5),
            region(7, 5),
        ];
        // 47 would match the last digit but lies above max_question.
        let fixed = correct_duplicates(regions, &config);
        assert_eq!(fixed[5].question_number, 7);
    }
}
