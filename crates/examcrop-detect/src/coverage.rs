// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Coverage check of detected question numbers against an expected total.

use std::collections::BTreeSet;

use examcrop_core::QuestionRegion;
use serde::Serialize;
use tracing::warn;

/// Which expected questions were found, which were missed, and which numbers
/// were detected outside `1..=expected_total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub expected_total: u32,
    /// Distinct detected numbers, ascending.
    pub detected: Vec<u32>,
    pub missing: Vec<u32>,
    pub extra: Vec<u32>,
}

impl CoverageReport {
    pub fn evaluate(regions: &[QuestionRegion], expected_total: u32) -> Self {
        let detected: BTreeSet<u32> = regions.iter().map(|r| r.question_number).collect();
        let missing: Vec<u32> = (1..=expected_total)
            .filter(|n| !detected.contains(n))
            .collect();
        let extra: Vec<u32> = detected
            .iter()
            .copied()
            .filter(|n| !(1..=expected_total).contains(n))
            .collect();

        for number in &missing {
            warn!(question = number, "Expected question not detected");
        }

        Self {
            expected_total,
            detected: detected.into_iter().collect(),
            missing,
            extra,
        }
    }

    /// Every expected question was found and nothing else.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }

    /// Fraction of expected questions detected, in `0.0..=1.0`.
    pub fn detection_rate(&self) -> f32 {
        if self.expected_total == 0 {
            return 1.0;
        }
        let found = self.expected_total as usize - self.missing.len();
        found as f32 / self.expected_total as f32
    }
}
