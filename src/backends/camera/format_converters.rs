// SPDX-License-Identifier: GPL-3.0-only

//! Pixel format converters for raw V4L2 buffers
//!
//! All converters produce tightly packed RGBA with opaque alpha.

use image::ImageFormat;

/// Raw formats the V4L2 backend negotiates, in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    /// Packed 4:2:2 YUV (Y0 U Y1 V)
    Yuyv,
    /// Motion JPEG, one JPEG image per buffer
    Mjpeg,
}

impl RawFormat {
    pub const ALL: [RawFormat; 2] = [RawFormat::Yuyv, RawFormat::Mjpeg];

    pub fn fourcc(&self) -> [u8; 4] {
        match self {
            RawFormat::Yuyv => *b"YUYV",
            RawFormat::Mjpeg => *b"MJPG",
        }
    }

    pub fn from_fourcc(repr: [u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.fourcc() == repr)
    }

    /// Convert one buffer to RGBA
    pub fn to_rgba(&self, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, String> {
        match self {
            RawFormat::Yuyv => Ok(yuyv_to_rgba(data, width, height)),
            RawFormat::Mjpeg => mjpeg_to_rgba(data, width, height),
        }
    }
}

/// Convert YUYV (YUY2) to RGBA
///
/// Two pixels share one U/V pair. Short buffers leave the tail black.
pub fn yuyv_to_rgba(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let pixel_count = (width as usize) * (height as usize);
    let mut rgba = Vec::with_capacity(pixel_count * 4);

    'outer: for chunk in data.chunks_exact(4) {
        let y0 = chunk[0] as f32;
        let u = chunk[1] as f32 - 128.0;
        let y1 = chunk[2] as f32;
        let v = chunk[3] as f32 - 128.0;

        // BT.601
        for y in [y0, y1] {
            if rgba.len() >= pixel_count * 4 {
                break 'outer;
            }
            rgba.push((y + 1.402 * v).clamp(0.0, 255.0) as u8);
            rgba.push((y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8);
            rgba.push((y + 1.772 * u).clamp(0.0, 255.0) as u8);
            rgba.push(255);
        }
    }

    while rgba.len() < pixel_count * 4 {
        rgba.extend_from_slice(&[0, 0, 0, 255]);
    }

    rgba
}

/// Decode an MJPEG buffer to RGBA
///
/// Fails if the decoded size differs from the negotiated one.
pub fn mjpeg_to_rgba(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, String> {
    let image = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
        .map_err(|e| format!("MJPEG decode failed: {}", e))?;
    let rgba = image.to_rgba8();

    if rgba.width() != width || rgba.height() != height {
        return Err(format!(
            "MJPEG frame is {}x{}, expected {}x{}",
            rgba.width(),
            rgba.height(),
            width,
            height
        ));
    }

    Ok(rgba.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_grey() {
        // Y=128 with neutral chroma is mid grey
        let data = [128, 128, 128, 128];
        let rgba = yuyv_to_rgba(&data, 2, 1);
        assert_eq!(rgba, vec![128, 128, 128, 255, 128, 128, 128, 255]);
    }

    #[test]
    fn test_yuyv_short_buffer_is_padded() {
        let rgba = yuyv_to_rgba(&[], 2, 2);
        assert_eq!(rgba.len(), 16);
        assert!(rgba.chunks(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_fourcc_lookup() {
        assert_eq!(RawFormat::from_fourcc(*b"MJPG"), Some(RawFormat::Mjpeg));
        assert_eq!(RawFormat::from_fourcc(*b"NV12"), None);
    }

    #[test]
    fn test_mjpeg_round_trip_size_check() {
        let img = image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]));
        let mut jpeg = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        assert_eq!(mjpeg_to_rgba(&jpeg, 4, 2).unwrap().len(), 32);
        assert!(mjpeg_to_rgba(&jpeg, 8, 8).is_err());
    }
}
