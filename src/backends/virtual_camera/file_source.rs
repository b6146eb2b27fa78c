// SPDX-License-Identifier: GPL-3.0-only

//! Frame sources for the virtual camera
//!
//! Still images are decoded once and served as every frame of the stream.

use crate::backends::camera::types::{BackendResult, CameraFrame};
use crate::errors::CameraAccessError;
use std::path::Path;
use tracing::debug;

/// Load an image file as an RGBA frame
pub fn load_image_as_frame(path: &Path) -> BackendResult<CameraFrame> {
    if !path.exists() {
        return Err(CameraAccessError::NotFound);
    }

    let image = image::open(path).map_err(|e| {
        CameraAccessError::Unknown(format!("failed to load {}: {}", path.display(), e))
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    debug!(path = %path.display(), width, height, "Image loaded as virtual frame");

    Ok(CameraFrame::from_rgba(width, height, rgba.into_raw()))
}

/// Horizontal colour ramp with a vertical brightness ramp
///
/// Asymmetric left to right, so mirrored captures are easy to tell apart.
pub fn test_pattern(width: u32, height: u32) -> CameraFrame {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let fx = x as f32 / width.max(2).saturating_sub(1) as f32;
            let fy = y as f32 / height.max(2).saturating_sub(1) as f32;
            data.push((fx * 255.0) as u8);
            data.push((fy * 255.0) as u8);
            data.push(((1.0 - fx) * 128.0) as u8);
            data.push(255);
        }
    }
    CameraFrame::from_rgba(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_image_as_frame(Path::new("/nonexistent/body.jpg")).unwrap_err();
        assert_eq!(err, CameraAccessError::NotFound);
    }

    #[test]
    fn test_pattern_is_not_symmetric() {
        let frame = test_pattern(4, 2);
        assert_eq!(frame.data.len(), 32);
        assert_ne!(&frame.data[0..4], &frame.data[12..16]);
    }
}
