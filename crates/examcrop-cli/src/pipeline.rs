// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end pipeline: layout JSON + exam PDF in, cropped questions out.

use std::path::Path;
use std::time::Instant;

use examcrop_core::error::Result;
use examcrop_core::{CropMetrics, CroppedExam, ExamCropConfig};
use examcrop_detect::{CoverageReport, QuestionDetector};
use examcrop_render::{PageRasterizer, PdfSource, RegionCropper};
use tracing::{info, instrument, warn};

/// Detect questions in `layout_json` and crop them out of `source`.
///
/// Zero detected questions is not an error: the exam comes back empty. With
/// `expected` set, detection coverage against `1..=expected` is logged.
#[instrument(skip_all, fields(title))]
pub fn run<R>(
    title: &str,
    layout_json: &str,
    source: &R,
    config: &ExamCropConfig,
    expected: Option<u32>,
) -> Result<CroppedExam>
where
    R: PageRasterizer + ?Sized,
{
    let started = Instant::now();
    let detector = QuestionDetector::new(config.detector.clone())?;
    let cropper = RegionCropper::new(config.crop.clone())?;

    let regions = detector.detect_middle_json(layout_json)?;
    let detected = Instant::now();

    if let Some(total) = expected {
        let report = CoverageReport::evaluate(&regions, total);
        info!(
            expected = total,
            missing = report.missing.len(),
            extra = report.extra.len(),
            rate = report.detection_rate(),
            "Detection coverage"
        );
    }

    if regions.is_empty() {
        warn!(title, "No question regions detected");
        let metrics = CropMetrics {
            detection_ms: elapsed_ms(started, detected),
            crop_ms: 0,
            total_ms: elapsed_ms(started, detected),
            dpi: config.crop.dpi,
        };
        return Ok(CroppedExam::new(title, Vec::new(), metrics));
    }

    info!(
        regions = regions.len(),
        dpi = config.crop.dpi,
        "Cropping question images"
    );
    let questions = cropper.crop_regions(source, &regions)?;
    let finished = Instant::now();

    let metrics = CropMetrics {
        detection_ms: elapsed_ms(started, detected),
        crop_ms: elapsed_ms(detected, finished),
        total_ms: elapsed_ms(started, finished),
        dpi: config.crop.dpi,
    };
    info!(
        questions = questions.len(),
        total_ms = metrics.total_ms,
        "Pipeline complete"
    );
    Ok(CroppedExam::new(title, questions, metrics))
}

/// Read the layout file, open the PDF, and run the pipeline. The exam title
/// is the PDF's file stem.
pub fn crop_exam(
    layout_path: &Path,
    pdf_path: &Path,
    config: &ExamCropConfig,
    expected: Option<u32>,
) -> Result<CroppedExam> {
    let layout_json = std::fs::read_to_string(layout_path)?;
    let title = pdf_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source = PdfSource::open(pdf_path)?;
    run(&title, &layout_json, &source, config, expected)
}

fn elapsed_ms(from: Instant, to: Instant) -> u64 {
    to.duration_since(from).as_millis() as u64
}
