// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document-level question detection.

use examcrop_core::error::Result;
use examcrop_core::{DetectorConfig, LayoutDocument, LayoutPage, QuestionRegion};
use tracing::{debug, info, instrument, warn};

use crate::layout::parse_middle_json;
use crate::region::{RegionBuilder, correct_duplicates, merge_cross_page, split_columns};

/// Detects question regions across all pages of one exam document.
///
/// Detection holds no state between calls: the same input always produces the
/// same regions, and one detector may be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct QuestionDetector {
    config: DetectorConfig,
}

impl QuestionDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect, correct, and order the regions of a whole document.
    ///
    /// An empty result means no question marker was found anywhere.
    #[instrument(skip_all, fields(pages = document.pages.len()))]
    pub fn detect(&self, document: &LayoutDocument) -> Vec<QuestionRegion> {
        let mut regions = Vec::new();
        let mut carry_over: Option<u32> = None;

        for page in &document.pages {
            let page_regions = self.detect_page(page, carry_over);
            if let Some(last) = page_regions.iter().map(|r| r.question_number).max() {
                carry_over = Some(last);
            }
            regions.extend(page_regions);
        }

        let regions = merge_cross_page(correct_duplicates(regions, &self.config));

        if regions.is_empty() {
            warn!("No question regions detected");
        } else {
            info!(regions = regions.len(), "Detected question regions");
        }
        regions
    }

    /// Detect the raw (uncorrected) regions of one page.
    ///
    /// `carry_over` is the previous page's highest question number and only
    /// applies to the page's first column.
    pub fn detect_page(&self, page: &LayoutPage, carry_over: Option<u32>) -> Vec<QuestionRegion> {
        let columns = split_columns(&page.blocks, page.width);
        let mut regions = Vec::new();

        for (position, column) in columns.iter().enumerate() {
            let carry = if position == 0 { carry_over } else { None };
            regions.extend(RegionBuilder::build(&self.config, page.index, carry, column));
        }

        debug!(
            page = page.index,
            columns = columns.len(),
            regions = regions.len(),
            "Page processed"
        );
        regions
    }

    /// Parse a MinerU `middle_json` document and detect its regions.
    pub fn detect_middle_json(&self, text: &str) -> Result<Vec<QuestionRegion>> {
        let document = parse_middle_json(text, &self.config)?;
        Ok(self.detect(&document))
    }
}
