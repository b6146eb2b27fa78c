// SPDX-License-Identifier: GPL-3.0-only

//! RGBA pixel buffer for a single capture

use crate::constants::{DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH};
use image::RgbImage;

/// One RGBA pixel
pub type Rgba = [u8; 4];

/// Tightly packed RGBA buffer, `width * height * 4` bytes
///
/// The length invariant is enforced by every constructor, so pixel views
/// never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Transparent black buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Buffer used when the frame source reports no intrinsic size
    pub fn fallback() -> Self {
        Self::new(DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT)
    }

    /// Wrap RGBA bytes; `None` if the length does not match the dimensions
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Build from rows of pixels; `None` if rows are ragged
    pub fn from_pixels(rows: &[Vec<Rgba>]) -> Option<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.len()) as u32;
        if rows.iter().any(|r| r.len() as u32 != width) {
            return None;
        }
        let data = rows.iter().flatten().flatten().copied().collect();
        Self::from_rgba(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn pixels(&self) -> &[Rgba] {
        bytemuck::cast_slice(self.data.as_slice())
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        bytemuck::cast_slice_mut(self.data.as_mut_slice())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels()[y as usize * self.width as usize + x as usize]
    }

    /// Mirror left to right in place
    pub fn mirror_horizontal(&mut self) {
        let width = self.width as usize;
        if width == 0 {
            return;
        }
        for row in self.pixels_mut().chunks_exact_mut(width) {
            row.reverse();
        }
    }

    /// Drop the alpha channel for encoders without alpha support
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        let rgb: Vec<u8> = self
            .pixels()
            .iter()
            .flat_map(|&[r, g, b, _]| [r, g, b])
            .collect();
        RgbImage::from_raw(self.width, self.height, rgb)
    }
}
