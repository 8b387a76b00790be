// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Caller-supplied configuration for detection and cropping.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ExamCropError, Result};

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Settings for the question detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Smallest question number accepted from a marker.
    pub min_question: u32,
    /// Largest question number accepted from a marker.
    pub max_question: u32,
    /// Page width in points used when the layout omits `page_size`.
    pub default_page_width: f32,
    /// Page height in points used when the layout omits `page_size`.
    pub default_page_height: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_question: 1,
            max_question: 50,
            default_page_width: 842.0,
            default_page_height: 1191.0,
        }
    }
}

impl DetectorConfig {
    /// Whether `number` lies inside `[min_question, max_question]`.
    pub fn accepts(&self, number: u32) -> bool {
        (self.min_question..=self.max_question).contains(&number)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_question == 0 {
            return Err(ExamCropError::InvalidConfig(
                "min_question must be at least 1".into(),
            ));
        }
        if self.min_question > self.max_question {
            return Err(ExamCropError::InvalidConfig(format!(
                "min_question {} exceeds max_question {}",
                self.min_question, self.max_question
            )));
        }
        if self.default_page_width <= 0.0 || self.default_page_height <= 0.0 {
            return Err(ExamCropError::InvalidConfig(
                "default page dimensions must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Encoding of the cropped question images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CropFormat {
    #[default]
    Png,
    Jpeg {
        quality: u8,
    },
}

impl CropFormat {
    /// File extension used when persisting crops.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

/// Settings for the region cropper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Output resolution.
    pub dpi: u32,
    /// Margin added around every region, in PDF points.
    pub padding: f32,
    /// Where to write image files. `None` keeps crops in memory only.
    pub output_dir: Option<PathBuf>,
    pub format: CropFormat,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            padding: 5.0,
            output_dir: None,
            format: CropFormat::Png,
        }
    }
}

impl CropConfig {
    /// Rasterization scale factor from PDF points to pixels.
    pub fn zoom(&self) -> f32 {
        self.dpi as f32 / POINTS_PER_INCH
    }

    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(ExamCropError::InvalidConfig("dpi must be positive".into()));
        }
        if !self.padding.is_finite() {
            return Err(ExamCropError::InvalidConfig(
                "padding must be a finite number".into(),
            ));
        }
        if let CropFormat::Jpeg { quality } = self.format
            && !(1..=100).contains(&quality)
        {
            return Err(ExamCropError::InvalidConfig(format!(
                "JPEG quality must be within 1..=100, got {}",
                quality
            )));
        }
        Ok(())
    }
}

/// Combined settings, as loaded from a JSON config file by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamCropConfig {
    pub detector: DetectorConfig,
    pub crop: CropConfig,
}

impl ExamCropConfig {
    /// Parse a JSON document. Missing sections and fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.crop.validate()
    }
}
