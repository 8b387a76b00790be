// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// examcrop-detect: turns per-page layout blocks into per-question regions.
//
// Pages are split into reading columns, each column is walked once to open and
// close regions on question markers, and the pooled regions are then repaired
// (digit-split numbering) and flagged when a question spans pages.

pub mod coverage;
pub mod detector;
pub mod layout;
pub mod region;

// Re-export the primary entry points so callers can use `examcrop_detect::QuestionDetector` etc.
pub use coverage::CoverageReport;
pub use detector::QuestionDetector;
pub use layout::parse_middle_json;
