// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region cropper: rasterizes every question region of a document.

use std::collections::HashSet;
use std::path::Path;

use examcrop_core::error::{ExamCropError, Result};
use examcrop_core::{CropConfig, CropImage, CroppedQuestion, QuestionRegion};
use tracing::{debug, info, instrument, warn};

use super::clip::ClipRect;
use super::encode;
use crate::pdf::rasterizer::PageRasterizer;
use crate::pdf::source::PdfSource;

/// Crops question regions out of an opened document.
#[derive(Debug, Clone, Default)]
pub struct RegionCropper {
    config: CropConfig,
}

impl RegionCropper {
    pub fn new(config: CropConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Crop every region, skipping the ones that fail.
    ///
    /// A region on a missing page, with an empty clip, or whose rendering fails
    /// is logged and left out; the remaining regions are still cropped. Only an
    /// unusable output directory fails the whole call.
    #[instrument(skip_all, fields(regions = regions.len(), pages = source.page_count()))]
    pub fn crop_regions<R>(
        &self,
        source: &R,
        regions: &[QuestionRegion],
    ) -> Result<Vec<CroppedQuestion>>
    where
        R: PageRasterizer + ?Sized,
    {
        if let Some(dir) = &self.config.output_dir {
            std::fs::create_dir_all(dir)?;
        }

        let mut taken = HashSet::new();
        let mut cropped = Vec::with_capacity(regions.len());
        for region in regions {
            match self.crop_with_names(source, region, &mut taken) {
                Ok(question) => cropped.push(question),
                Err(err) => warn!(
                    question = region.question_number,
                    page = region.page_index,
                    %err,
                    "Skipping question crop"
                ),
            }
        }

        info!(
            cropped = cropped.len(),
            skipped = regions.len() - cropped.len(),
            dpi = self.config.dpi,
            "Cropped question images"
        );
        Ok(cropped)
    }

    /// Crop a single region.
    pub fn crop_region<R>(&self, source: &R, region: &QuestionRegion) -> Result<CroppedQuestion>
    where
        R: PageRasterizer + ?Sized,
    {
        self.crop_with_names(source, region, &mut HashSet::new())
    }

    /// `taken` holds the file names already written by this batch.
    fn crop_with_names<R>(
        &self,
        source: &R,
        region: &QuestionRegion,
        taken: &mut HashSet<String>,
    ) -> Result<CroppedQuestion>
    where
        R: PageRasterizer + ?Sized,
    {
        let page = region.page_index;
        let page_count = source.page_count();
        if page >= page_count {
            return Err(ExamCropError::PageOutOfRange { page, page_count });
        }

        let page_size = source.page_size(page)?;
        let clip = ClipRect::from_region(&region.bbox, self.config.padding, page_size);
        if clip.is_empty() {
            return Err(ExamCropError::DegenerateClip { page });
        }

        let rendered = source.render_clip(page, &clip, self.config.zoom())?;
        let crop = encode::finish(rendered, self.config.format)?;

        let image = match &self.config.output_dir {
            Some(dir) => {
                let name = unique_file_name(region, self.config.format.extension(), taken);
                let path = dir.join(name);
                std::fs::write(&path, &crop.bytes)?;
                debug!(
                    question = region.question_number,
                    path = %path.display(),
                    "Saved question crop"
                );
                CropImage::File(path)
            }
            None => CropImage::Bytes(crop.bytes),
        };

        Ok(CroppedQuestion {
            question_number: region.question_number,
            image,
            width: crop.width,
            height: crop.height,
            source_page: page,
        })
    }
}

/// Deterministic file name for a region's crop: `q07.png`, or `q07_p3.png`
/// when the question spans pages.
pub fn file_name(region: &QuestionRegion, extension: &str) -> String {
    format!("{}.{}", file_stem(region), extension)
}

fn file_stem(region: &QuestionRegion) -> String {
    if region.spans_page {
        format!("q{:02}_p{}", region.question_number, region.page_index)
    } else {
        format!("q{:02}", region.question_number)
    }
}

/// [`file_name`], suffixed `_1`, `_2`, ... when an earlier region of the batch
/// already took it (same number twice on one page). Records the chosen name.
fn unique_file_name(
    region: &QuestionRegion,
    extension: &str,
    taken: &mut HashSet<String>,
) -> String {
    let stem = file_stem(region);
    let mut name = format!("{stem}.{extension}");
    let mut suffix = 1;
    while taken.contains(&name) {
        name = format!("{stem}_{suffix}.{extension}");
        suffix += 1;
    }
    taken.insert(name.clone());
    name
}

/// Open `pdf_path`, crop every region, and release the document.
#[instrument(skip_all, fields(path = %pdf_path.as_ref().display()))]
pub fn crop_pdf(
    pdf_path: impl AsRef<Path>,
    regions: &[QuestionRegion],
    config: &CropConfig,
) -> Result<Vec<CroppedQuestion>> {
    let cropper = RegionCropper::new(config.clone())?;
    let source = PdfSource::open(pdf_path)?;
    cropper.crop_regions(&source, regions)
}
