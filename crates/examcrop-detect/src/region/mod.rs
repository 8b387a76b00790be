// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region stages: column split, marker matching, per-column building,
// duplicate correction, and cross-page flagging.

pub mod builder;
pub mod columns;
pub mod corrector;
pub mod merger;
pub mod patterns;

pub use builder::RegionBuilder;
pub use columns::split_columns;
pub use corrector::correct_duplicates;
pub use merger::merge_cross_page;
