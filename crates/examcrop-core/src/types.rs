// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: page geometry, layout input, question regions, and crops.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle in page points, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) * 0.5
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Coordinate-wise union of every box, or `None` for an empty input.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a BBox>) -> Option<Self> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BBox>, b| match acc {
                Some(u) => Some(u.union(b)),
                None => Some(*b),
            })
    }

    /// Whether `other` lies entirely inside `self` (edges inclusive).
    pub fn contains(&self, other: &Self) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

// ---------------------------------------------------------------------------
// Layout input
// ---------------------------------------------------------------------------

/// One text element reported by the layout-analysis engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    /// `None` for malformed blocks; those never reach a region.
    pub bbox: Option<BBox>,
    /// Extracted text, possibly empty.
    #[serde(default)]
    pub text: String,
    /// False for figures, tables and other non-text content.
    #[serde(default = "default_true")]
    pub is_text: bool,
}

fn default_true() -> bool {
    true
}

impl LayoutBlock {
    pub fn text(bbox: BBox, text: impl Into<String>) -> Self {
        Self {
            bbox: Some(bbox),
            text: text.into(),
            is_text: true,
        }
    }

    /// A non-text block (figure, table, rule) that still occupies space.
    pub fn graphic(bbox: BBox) -> Self {
        Self {
            bbox: Some(bbox),
            text: String::new(),
            is_text: false,
        }
    }

    /// Trimmed text, or `None` when the block carries nothing readable.
    pub fn usable_text(&self) -> Option<&str> {
        if !self.is_text {
            return None;
        }
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Blocks of a single page, in the engine's reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<LayoutBlock>,
}

/// Layout output for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub pages: Vec<LayoutPage>,
}

// ---------------------------------------------------------------------------
// Detection output
// ---------------------------------------------------------------------------

/// Inclusive numeric range of a group question marker such as `[41~42]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRange {
    pub first: u32,
    pub last: u32,
}

impl std::fmt::Display for GroupRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}~{}", self.first, self.last)
    }
}

/// Area of one page attributed to one exam question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRegion {
    pub question_number: u32,
    pub page_index: usize,
    /// Union of every block assigned to the region.
    pub bbox: BBox,
    /// First characters of the region's text.
    pub text_preview: String,
    /// The question has regions on more than one page.
    pub spans_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupRange>,
}

/// Maximum length of [`QuestionRegion::text_preview`], in characters.
pub const PREVIEW_CHARS: usize = 80;

/// Truncate `text` to [`PREVIEW_CHARS`] characters on a char boundary.
pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

// ---------------------------------------------------------------------------
// Cropping output
// ---------------------------------------------------------------------------

/// Where a cropped image lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropImage {
    /// Written to disk under the configured output directory.
    File(PathBuf),
    /// Encoded image bytes kept in memory.
    Bytes(Vec<u8>),
}

/// One rasterized question region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CroppedQuestion {
    pub question_number: u32,
    pub image: CropImage,
    pub width: u32,
    pub height: u32,
    pub source_page: usize,
}

/// Wall-clock timings of one end-to-end run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropMetrics {
    pub detection_ms: u64,
    pub crop_ms: u64,
    pub total_ms: u64,
    pub dpi: u32,
}

/// Result of cropping a whole exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CroppedExam {
    pub title: String,
    pub questions: Vec<CroppedQuestion>,
    pub total_questions: usize,
    pub metrics: CropMetrics,
}

impl CroppedExam {
    pub fn new(
        title: impl Into<String>,
        questions: Vec<CroppedQuestion>,
        metrics: CropMetrics,
    ) -> Self {
        Self {
            title: title.into(),
            total_questions: questions.len(),
            questions,
            metrics,
        }
    }

    /// No question was detected or cropped.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
