// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Final encoding of rendered crops, using the `image` crate.

use std::io::Cursor;

use examcrop_core::CropFormat;
use examcrop_core::error::{ExamCropError, Result};
use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::debug;

/// An encoded crop together with its pixel dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedCrop {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Turn a rendered PNG into the configured output format.
///
/// PNG output passes the rendered bytes through untouched and only reads the
/// header for dimensions. JPEG output decodes and re-encodes.
pub fn finish(rendered: Vec<u8>, format: CropFormat) -> Result<EncodedCrop> {
    match format {
        CropFormat::Png => {
            let (width, height) = dimensions(&rendered)?;
            Ok(EncodedCrop {
                bytes: rendered,
                width,
                height,
            })
        }
        CropFormat::Jpeg { quality } => {
            let image = image::load_from_memory_with_format(&rendered, ImageFormat::Png)
                .map_err(|err| {
                    ExamCropError::ImageError(format!("failed to decode rendered clip: {}", err))
                })?;
            let bytes = to_jpeg_bytes(&image, quality)?;
            debug!(
                png_bytes = rendered.len(),
                jpeg_bytes = bytes.len(),
                quality,
                "Re-encoded clip as JPEG"
            );
            Ok(EncodedCrop {
                bytes,
                width: image.width(),
                height: image.height(),
            })
        }
    }
}

/// Read pixel dimensions from an encoded image header without decoding pixels.
pub fn dimensions(data: &[u8]) -> Result<(u32, u32)> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| ExamCropError::ImageError(format!("unreadable image data: {}", err)))?
        .into_dimensions()
        .map_err(|err| ExamCropError::ImageError(format!("failed to read dimensions: {}", err)))
}

/// Encode an image as PNG bytes.
pub fn to_png_bytes(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| ExamCropError::ImageError(format!("PNG encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Encode an image as JPEG bytes with the given quality (1-100).
fn to_jpeg_bytes(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let rgb = image.to_rgb8();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| ExamCropError::ImageError(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}
