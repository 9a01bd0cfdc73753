// THEORY:
// A `PixelBuffer` is an already-decoded single-frame bitmap: interleaved bytes,
// `channels` per pixel (3 = RGB, 4 = RGBA), `width * height` pixels in row-major
// order. Construction is the only place the buffer is validated:
//   1. channels must be 3 or 4, otherwise `UnsupportedFormat`;
//   2. data.len() must equal width * height * channels, otherwise
//      `DimensionMismatch`.
// After that every chunk of `channels` bytes is a pixel, so conversion is a
// plain walk over `chunks_exact`.
//
// Conversion replaces R, G and B with one intensity and copies alpha unchanged.
// Two intensities are offered (see `Pixel`): the unweighted average, which is the
// default, and Rec. 601 luma. Both truncate.
//
// Decoding image files is the caller's business. The `image` helpers at the
// bottom only move between `PixelBuffer` and `DynamicImage`, and write PNGs.

use crate::core_modules::errors::{ComputeError, ComputeResult};
use crate::core_modules::pixel::pixel::{Byte, Bytes, Pixel, RGB_CHANNELS, RGBA_CHANNELS};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use std::path::Path;

/// How the three colour channels collapse into one intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GrayscaleMethod {
    /// (R + G + B) / 3
    #[default]
    Average,
    /// 0.299 R + 0.587 G + 0.114 B
    Luma,
}

/// Interleaved RGB or RGBA bytes with their dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    #[cfg_attr(feature = "serde", serde(rename = "pixelBuffer"))]
    data: Bytes,
}

impl PixelBuffer {
    /// Validates the channel count, then the buffer length.
    pub fn new(width: u32, height: u32, channels: u32, data: Bytes) -> ComputeResult<Self> {
        let channels = match channels as usize {
            RGB_CHANNELS | RGBA_CHANNELS => channels as u8,
            _ => {
                return Err(ComputeError::UnsupportedFormat(format!(
                    "{} channels per pixel (expected 3 or 4)",
                    channels
                )));
            }
        };

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(channels as usize))
            .ok_or_else(|| {
                ComputeError::DimensionMismatch(format!(
                    "{}x{}x{} does not fit in memory",
                    width, height, channels
                ))
            })?;
        if data.len() != expected {
            return Err(ComputeError::DimensionMismatch(format!(
                "buffer holds {} bytes but {}x{}x{} requires {}",
                data.len(),
                width,
                height,
                channels,
                expected
            )));
        }

        Ok(PixelBuffer { width, height, channels, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.channels as usize == RGBA_CHANNELS
    }

    pub fn as_bytes(&self) -> &[Byte] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.data
            .chunks_exact(self.channels as usize)
            .filter_map(|chunk| Pixel::try_from(chunk).ok())
    }

    /// Wraps a decoded image, keeping alpha only if the source has it.
    pub fn from_dynamic_image(image: &DynamicImage) -> Self {
        let (width, height, channels, data) = if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            (rgba.width(), rgba.height(), RGBA_CHANNELS as u8, rgba.into_raw())
        } else {
            let rgb = image.to_rgb8();
            (rgb.width(), rgb.height(), RGB_CHANNELS as u8, rgb.into_raw())
        };
        PixelBuffer { width, height, channels, data }
    }

    pub fn into_dynamic_image(self) -> ComputeResult<DynamicImage> {
        let (width, height) = (self.width, self.height);
        let image = if self.has_alpha() {
            RgbaImage::from_raw(width, height, self.data).map(DynamicImage::ImageRgba8)
        } else {
            RgbImage::from_raw(width, height, self.data).map(DynamicImage::ImageRgb8)
        };
        image.ok_or_else(|| {
            ComputeError::DimensionMismatch(format!("buffer does not fill a {}x{} image", width, height))
        })
    }

    /// Encodes the buffer as a PNG at `path`.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(std::io::BufWriter::new(output));
        let color = if self.has_alpha() {
            ExtendedColorType::Rgba8
        } else {
            ExtendedColorType::Rgb8
        };
        encoder.write_image(&self.data, self.width, self.height, color)?;
        Ok(())
    }
}

/// Average-method conversion.
pub fn to_grayscale(buffer: &PixelBuffer) -> PixelBuffer {
    to_grayscale_with(buffer, GrayscaleMethod::Average)
}

pub fn to_grayscale_with(buffer: &PixelBuffer, method: GrayscaleMethod) -> PixelBuffer {
    let mut data = Vec::with_capacity(buffer.data.len());
    for pixel in buffer.pixels() {
        let intensity = match method {
            GrayscaleMethod::Average => pixel.average(),
            GrayscaleMethod::Luma => pixel.luma(),
        };
        pixel.with_intensity(intensity).write_to(&mut data);
    }

    PixelBuffer {
        width: buffer.width,
        height: buffer.height,
        channels: buffer.channels,
        data,
    }
}

/// Validates raw parts and converts them.
pub fn grayscale_of(
    data: Bytes,
    width: u32,
    height: u32,
    channels: u32,
    method: GrayscaleMethod,
) -> ComputeResult<PixelBuffer> {
    let buffer = PixelBuffer::new(width, height, channels, data)?;
    Ok(to_grayscale_with(&buffer, method))
}
