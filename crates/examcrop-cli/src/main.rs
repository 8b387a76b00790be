// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// examcrop — command-line entry point.
//
// `examcrop detect` prints the detected question regions of a MinerU layout
// file. `examcrop crop` also rasterizes every region out of the exam PDF and
// prints the resulting `CroppedExam`. JSON goes to stdout, logs to stderr.

mod pipeline;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use examcrop_core::error::Result;
use examcrop_core::{CropFormat, ExamCropConfig};
use examcrop_detect::QuestionDetector;
use serde::Serialize;
use tracing::error;

const DEFAULT_OUTPUT_DIR: &str = "output/cropped";

#[derive(Debug, Parser)]
#[command(name = "examcrop", version, about = "Detect and crop exam questions")]
struct Cli {
    /// JSON configuration file; command-line flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Detect question regions in a layout file.
    Detect {
        /// MinerU middle_json file.
        layout: PathBuf,
        #[arg(long)]
        min_question: Option<u32>,
        #[arg(long)]
        max_question: Option<u32>,
    },
    /// Detect question regions and crop them out of the exam PDF.
    Crop {
        /// MinerU middle_json file.
        layout: PathBuf,
        /// The exam PDF the layout was produced from.
        pdf: PathBuf,
        /// Directory for the cropped images.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        dpi: Option<u32>,
        /// Padding around each region, in points.
        #[arg(long)]
        padding: Option<f32>,
        /// Encode crops as JPEG at this quality instead of PNG.
        #[arg(long, value_name = "Q")]
        jpeg_quality: Option<u8>,
        /// Expected question count; logs which numbers were missed.
        #[arg(long, value_name = "N")]
        expected: Option<u32>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "examcrop failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Detect {
            layout,
            min_question,
            max_question,
        } => {
            if let Some(min) = min_question {
                config.detector.min_question = min;
            }
            if let Some(max) = max_question {
                config.detector.max_question = max;
            }
            let detector = QuestionDetector::new(config.detector)?;
            let regions = detector.detect_middle_json(&std::fs::read_to_string(layout)?)?;
            print_json(&regions)
        }
        Command::Crop {
            layout,
            pdf,
            out,
            dpi,
            padding,
            jpeg_quality,
            expected,
        } => {
            if let Some(dpi) = dpi {
                config.crop.dpi = dpi;
            }
            if let Some(padding) = padding {
                config.crop.padding = padding;
            }
            if let Some(quality) = jpeg_quality {
                config.crop.format = CropFormat::Jpeg { quality };
            }
            config.crop.output_dir = out
                .or(config.crop.output_dir)
                .or_else(|| Some(PathBuf::from(DEFAULT_OUTPUT_DIR)));
            config.validate()?;

            let exam = pipeline::crop_exam(&layout, &pdf, &config, expected)?;
            print_json(&exam)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ExamCropConfig> {
    match path {
        Some(path) => ExamCropConfig::from_json(&std::fs::read_to_string(path)?),
        None => Ok(ExamCropConfig::default()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
