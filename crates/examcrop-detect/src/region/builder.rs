// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sequential region builder: walks one reading column and cuts it into
// question regions at every question marker.

use examcrop_core::{BBox, DetectorConfig, GroupRange, LayoutBlock, QuestionRegion, preview};
use tracing::debug;

use super::patterns::{QuestionStart, is_section_header, match_question_start};

/// Preview attached to blocks attributed to the previous page's last question.
pub const CONTINUATION_PREVIEW: &str = "(continuation from previous page)";

/// The question currently accumulating blocks.
#[derive(Debug)]
struct OpenRegion {
    number: u32,
    group: Option<GroupRange>,
    bboxes: Vec<BBox>,
    text: String,
}

/// Builds question regions for a single column of one page.
///
/// Blocks seen before the first marker are buffered. When the first marker
/// arrives they are either attributed to `carry_over` (the last question of
/// the previous page, when no section header was seen) as a separate
/// page-spanning region, or prepended to the new question as shared context.
///
/// ```ignore
/// let mut builder = RegionBuilder::new(&config, page_index, carry_over);
/// for block in column {
///     builder.push(block);
/// }
/// let regions = builder.finish();
/// ```
#[derive(Debug)]
pub struct RegionBuilder<'a> {
    config: &'a DetectorConfig,
    page_index: usize,
    carry_over: Option<u32>,
    current: Option<OpenRegion>,
    pre_question: Vec<BBox>,
    saw_section_header: bool,
    regions: Vec<QuestionRegion>,
}

impl<'a> RegionBuilder<'a> {
    /// `carry_over` must be `None` for every column except a page's first.
    pub fn new(config: &'a DetectorConfig, page_index: usize, carry_over: Option<u32>) -> Self {
        Self {
            config,
            page_index,
            carry_over,
            current: None,
            pre_question: Vec::new(),
            saw_section_header: false,
            regions: Vec::new(),
        }
    }

    /// Build every region of `column` in one call.
    pub fn build(
        config: &'a DetectorConfig,
        page_index: usize,
        carry_over: Option<u32>,
        column: &[&LayoutBlock],
    ) -> Vec<QuestionRegion> {
        let mut builder = Self::new(config, page_index, carry_over);
        for block in column {
            builder.push(block);
        }
        builder.finish()
    }

    /// Feed the next block in column order.
    pub fn push(&mut self, block: &LayoutBlock) {
        let Some(bbox) = block.bbox else { return };

        let Some(text) = block.usable_text() else {
            self.append_bbox(bbox);
            return;
        };

        if is_section_header(text) {
            debug!(page = self.page_index, header = text, "Skipping section header");
            self.saw_section_header = true;
            return;
        }

        match match_question_start(text, self.config) {
            Some(start) if self.current.as_ref().map(|c| c.number) != Some(start.number) => {
                self.start_question(start, bbox, text);
            }
            // Same number as the open region: a repeated header, keep accumulating.
            _ => self.append_continuation(bbox, text),
        }
    }

    /// Close the open region, if any, and return everything built so far.
    pub fn finish(mut self) -> Vec<QuestionRegion> {
        self.close_current();
        if !self.pre_question.is_empty() {
            debug!(
                page = self.page_index,
                blocks = self.pre_question.len(),
                "Column ended before any question marker; leading blocks unassigned"
            );
        }
        self.regions
    }

    fn append_bbox(&mut self, bbox: BBox) {
        match self.current.as_mut() {
            Some(open) => open.bboxes.push(bbox),
            None => self.pre_question.push(bbox),
        }
    }

    fn append_continuation(&mut self, bbox: BBox, text: &str) {
        match self.current.as_mut() {
            Some(open) => {
                open.bboxes.push(bbox);
                open.text.push(' ');
                open.text.push_str(text);
            }
            None => self.pre_question.push(bbox),
        }
    }

    fn start_question(&mut self, start: QuestionStart, bbox: BBox, text: &str) {
        self.close_current();

        let mut bboxes = Vec::new();
        if !self.pre_question.is_empty() {
            let leading = std::mem::take(&mut self.pre_question);
            match self.carry_over {
                Some(carry) if !self.saw_section_header => {
                    debug!(
                        page = self.page_index,
                        question = carry,
                        blocks = leading.len(),
                        "Attributing leading blocks to previous page's question"
                    );
                    if let Some(union) = BBox::union_all(&leading) {
                        self.regions.push(QuestionRegion {
                            question_number: carry,
                            page_index: self.page_index,
                            bbox: union,
                            text_preview: CONTINUATION_PREVIEW.to_string(),
                            spans_page: true,
                            group: None,
                        });
                    }
                }
                _ => bboxes = leading,
            }
        }
        bboxes.push(bbox);

        self.current = Some(OpenRegion {
            number: start.number,
            group: start.group,
            bboxes,
            text: text.to_string(),
        });
    }

    fn close_current(&mut self) {
        let Some(open) = self.current.take() else {
            return;
        };
        let Some(bbox) = BBox::union_all(&open.bboxes) else {
            return;
        };
        self.regions.push(QuestionRegion {
            question_number: open.number,
            page_index: self.page_index,
            bbox,
            text_preview: preview(&open.text),
            spans_page: false,
            group: open.group,
        });
    }
}
