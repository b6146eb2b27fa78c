// SPDX-License-Identifier: GPL-3.0-only

//! Contrast, brightness and saturation adjustment
//!
//! The transform is per pixel and stateless. Channels are worked on in the
//! normalised `[0, 1]` range:
//!
//! 1. Saturation: the pixel's HSL saturation is scaled, keeping its
//!    lightness `(max + min) / 2`.
//! 2. Contrast is applied around `0.5`, then brightness as a plain multiplier.
//! 3. Channels are clamped and rounded back to `[0, 255]`. Alpha is copied.

use super::buffer::{PixelBuffer, Rgba};
use crate::constants::SATURATION_EPSILON;
use serde::{Deserialize, Serialize};

/// Colour adjustment multipliers, `1.0` meaning unchanged
///
/// Multipliers missing from a serialized value take their default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParameters {
    contrast: f32,
    brightness: f32,
    saturation: f32,
}

impl FilterParameters {
    pub const IDENTITY: FilterParameters = FilterParameters {
        contrast: 1.0,
        brightness: 1.0,
        saturation: 1.0,
    };

    /// Validate and build; every multiplier must be positive and finite
    pub fn new(contrast: f32, brightness: f32, saturation: f32) -> Result<Self, String> {
        for (name, value) in [
            ("contrast", contrast),
            ("brightness", brightness),
            ("saturation", saturation),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be a positive number, got {}", name, value));
            }
        }
        Ok(Self {
            contrast,
            brightness,
            saturation,
        })
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Check values loaded from configuration
    pub fn validate(&self) -> Result<(), String> {
        Self::new(self.contrast, self.brightness, self.saturation).map(|_| ())
    }
}

impl Default for FilterParameters {
    /// The tuning used for body photos
    fn default() -> Self {
        Self {
            contrast: 1.4,
            brightness: 0.9,
            saturation: 1.3,
        }
    }
}

/// Adjust a single pixel
pub fn adjust_pixel(pixel: Rgba, params: &FilterParameters) -> Rgba {
    let [r, g, b, a] = pixel;
    let mut channels = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];

    if params.saturation != 1.0 {
        saturate(&mut channels, params.saturation);
    }

    let mut out = [0u8; 4];
    for (dst, c) in out.iter_mut().zip(channels) {
        let c = ((c - 0.5) * params.contrast + 0.5) * params.brightness;
        *dst = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    out[3] = a;
    out
}

/// Scale HSL saturation by `factor`, keeping lightness
///
/// Greys and near-black/near-white pixels have no usable saturation and are
/// left alone.
fn saturate(channels: &mut [f32; 3], factor: f32) {
    let max = channels.iter().copied().fold(f32::MIN, f32::max);
    let min = channels.iter().copied().fold(f32::MAX, f32::min);
    let lightness = (max + min) / 2.0;
    let spread = max - min;

    let denominator = if lightness < 0.5 {
        2.0 * lightness
    } else {
        2.0 * (1.0 - lightness)
    };
    if spread <= SATURATION_EPSILON || denominator <= SATURATION_EPSILON {
        return;
    }

    let current = spread / denominator;
    let target = (current * factor).clamp(0.0, 1.0);
    let scale = target / current;

    for c in channels.iter_mut() {
        *c = lightness + (*c - lightness) * scale;
    }
}

/// Apply the filter to every pixel of `buffer` in place
pub fn apply_filter(buffer: &mut PixelBuffer, params: &FilterParameters) {
    if params.is_identity() {
        return;
    }
    for pixel in buffer.pixels_mut() {
        *pixel = adjust_pixel(*pixel, params);
    }
}
