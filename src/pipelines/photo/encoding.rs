// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding of captured frames and decoding for display
//!
//! Encoding runs on the GStreamer streaming thread that delivers the photo
//! frame; decoding runs on a blocking worker once the bytes reach the UI side.

use crate::backends::camera::types::{CameraFrame, EncodedPhoto};
use crate::errors::PhotoError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::debug;

/// Encode an RGBA frame as baseline JPEG
///
/// Alpha is dropped; JPEG has no alpha channel.
pub fn encode_jpeg(frame: &CameraFrame, quality: u8) -> Result<EncodedPhoto, PhotoError> {
    let pixels = frame.packed_rgba();
    let rgba = RgbaImage::from_raw(frame.width, frame.height, pixels).ok_or_else(|| {
        PhotoError::EncodingFailed(format!(
            "frame buffer too small for {}x{}",
            frame.width, frame.height
        ))
    })?;
    let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut data = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut data, quality.clamp(1, 100));
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(PhotoError::from)?;

    debug!(
        width = frame.width,
        height = frame.height,
        quality,
        size = data.len(),
        "Encoded photo"
    );

    Ok(EncodedPhoto {
        data,
        width: frame.width,
        height: frame.height,
    })
}

/// Decode JPEG bytes into an RGBA bitmap
pub fn decode_jpeg(data: &[u8]) -> Result<RgbaImage, PhotoError> {
    let image = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
        .map_err(|e| PhotoError::DecodingFailed(e.to_string()))?;
    Ok(image.to_rgba8())
}
