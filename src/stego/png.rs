//! PNG decoding and encoding for cover images.

use std::io::Cursor;

use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use log::debug;

use super::CoverImage;
use crate::error::{Error, Result};

/// Decodes a PNG into an RGBA cover.
///
/// Every PNG is normalized to 8-bit RGBA so capacity and bit order only
/// depend on the dimensions.
pub fn decode(bytes: &[u8]) -> Result<CoverImage> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!("decoded {width}x{height} PNG");

    CoverImage::new(width, height, 4, rgba.into_raw())
}

/// Encodes a cover losslessly as PNG.
pub fn encode(cover: &CoverImage) -> Result<Vec<u8>> {
    let (width, height) = (cover.width(), cover.height());
    let samples = cover.samples().to_vec();
    let mismatch = || Error::Image("pixel buffer does not match dimensions".into());

    let image = match cover.channels() {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        2 => GrayAlphaImage::from_raw(width, height, samples).map(DynamicImage::ImageLumaA8),
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        _ => RgbaImage::from_raw(width, height, samples).map(DynamicImage::ImageRgba8),
    }
    .ok_or_else(mismatch)?;

    let mut out = Vec::new();
    image.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}
