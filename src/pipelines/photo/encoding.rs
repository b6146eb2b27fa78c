// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! - JPEG (with quality control, alpha dropped)
//! - PNG (lossless, alpha kept)

use super::buffer::PixelBuffer;
use crate::constants::DEFAULT_JPEG_QUALITY;
use crate::errors::PhotoError;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    #[default]
    Jpeg,
    /// PNG format (lossless compression)
    Png,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
        }
    }

    /// MIME type sent along with the encoded bytes
    pub fn mime_type(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "image/jpeg",
            EncodingFormat::Png => "image/png",
        }
    }
}

/// Compressed image bytes plus their type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Photo encoder with a fixed format and quality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: u8,
}

impl PhotoEncoder {
    /// Create an encoder; JPEG quality is clamped to 1-100
    pub fn new(format: EncodingFormat, quality: u8) -> Self {
        Self {
            format,
            quality: quality.clamp(1, 100),
        }
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a pixel buffer
    pub fn encode(&self, buffer: &PixelBuffer) -> Result<EncodedImage, PhotoError> {
        let data = match self.format {
            EncodingFormat::Jpeg => Self::encode_jpeg(buffer, self.quality)?,
            EncodingFormat::Png => Self::encode_png(buffer)?,
        };

        debug!(
            size = data.len(),
            format = ?self.format,
            width = buffer.width(),
            height = buffer.height(),
            "Encoding complete"
        );

        Ok(EncodedImage {
            data,
            format: self.format,
            width: buffer.width(),
            height: buffer.height(),
        })
    }

    /// Encode image as JPEG
    fn encode_jpeg(buffer: &PixelBuffer, quality: u8) -> Result<Vec<u8>, PhotoError> {
        let rgb = buffer.to_rgb_image().ok_or_else(|| {
            PhotoError::EncodingFailed("pixel buffer does not match its dimensions".into())
        })?;

        let mut out = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
            .encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| PhotoError::EncodingFailed(format!("JPEG encoding failed: {}", e)))?;

        Ok(out)
    }

    /// Encode image as PNG
    fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, PhotoError> {
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(
                buffer.as_bytes(),
                buffer.width(),
                buffer.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| PhotoError::EncodingFailed(format!("PNG encoding failed: {}", e)))?;

        Ok(out)
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new(EncodingFormat::Jpeg, DEFAULT_JPEG_QUALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extensions() {
        assert_eq!(EncodingFormat::Jpeg.extension(), "jpg");
        assert_eq!(EncodingFormat::Png.extension(), "png");
        assert_eq!(EncodingFormat::Jpeg.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(PhotoEncoder::new(EncodingFormat::Jpeg, 0).quality(), 1);
        assert_eq!(PhotoEncoder::new(EncodingFormat::Jpeg, 200).quality(), 100);
        assert_eq!(PhotoEncoder::default().quality(), 92);
    }

    #[test]
    fn test_jpeg_output_decodes() {
        let buffer = PixelBuffer::new(16, 8);
        let encoded = PhotoEncoder::default().encode(&buffer).unwrap();
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&encoded.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn test_png_keeps_pixels() {
        let buffer = PixelBuffer::from_pixels(&[vec![[1, 2, 3, 4], [5, 6, 7, 8]]]).unwrap();
        let encoded = PhotoEncoder::new(EncodingFormat::Png, 100)
            .encode(&buffer)
            .unwrap();

        let decoded = image::load_from_memory(&encoded.data).unwrap().to_rgba8();
        assert_eq!(decoded.into_raw(), buffer.into_bytes());
    }
}
