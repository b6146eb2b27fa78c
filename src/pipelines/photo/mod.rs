// SPDX-License-Identifier: GPL-3.0-only

//! Photo capture pipeline
//!
//! ```text
//! CameraSession → Capture → Mirror (front) → Colour filter → Encoding → Disk / Upload
//!                                                                ↓
//!                                                     stream released
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Capture**: Read the current frame into a fresh pixel buffer
//! 2. **Mirror**: Front camera frames are flipped to match the preview
//! 3. **Filter**: Optional contrast/brightness/saturation adjustment
//! 4. **Encoding**: JPEG at a fixed quality, or PNG
//! 5. **Disk I/O**: Save under a generated name (async)

pub mod buffer;
pub mod capture;
pub mod encoding;
pub mod filter;

pub use buffer::PixelBuffer;
pub use capture::PhotoCapture;
pub use encoding::{EncodedImage, EncodingFormat, PhotoEncoder};
pub use filter::{FilterParameters, adjust_pixel, apply_filter};

use crate::backends::camera::CameraSession;
use crate::config::Config;
use crate::errors::PhotoError;
use std::path::PathBuf;
use tracing::info;

/// Complete photo capture pipeline
///
/// Holds the filter and encoder settings applied to every capture.
#[derive(Debug, Clone)]
pub struct PhotoPipeline {
    filter: Option<FilterParameters>,
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    /// Unfiltered JPEG captures at the default quality
    pub fn new() -> Self {
        Self {
            filter: None,
            encoder: PhotoEncoder::default(),
        }
    }

    /// Pipeline with explicit settings
    pub fn with_config(filter: Option<FilterParameters>, encoder: PhotoEncoder) -> Self {
        Self { filter, encoder }
    }

    /// Pipeline configured from user settings
    pub fn from_config(config: &Config) -> Self {
        Self {
            filter: config.filter_enabled.then_some(config.filter),
            encoder: PhotoEncoder::new(config.output_format, config.jpeg_quality),
        }
    }

    pub fn filter(&self) -> Option<&FilterParameters> {
        self.filter.as_ref()
    }

    pub fn encoder(&self) -> &PhotoEncoder {
        &self.encoder
    }

    /// Replace the filter; `None` disables filtering
    pub fn set_filter(&mut self, filter: Option<FilterParameters>) {
        self.filter = filter;
    }

    /// Capture one photo from the session (synchronous)
    pub fn capture(&self, session: &mut CameraSession) -> Result<EncodedImage, PhotoError> {
        PhotoCapture::capture(session, self.filter.as_ref(), &self.encoder)
    }

    /// Capture and save a photo asynchronously
    ///
    /// The session is consumed: capture ends its stream either way.
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Path to saved photo
    /// * `Err(PhotoError)` - Capture, encoding or save failure
    pub async fn capture_and_save(
        &self,
        mut session: CameraSession,
        output_dir: PathBuf,
    ) -> Result<PathBuf, PhotoError> {
        let pipeline = self.clone();
        let encoded = tokio::task::spawn_blocking(move || pipeline.capture(&mut session))
            .await
            .map_err(|e| PhotoError::CaptureFailed(format!("Capture task error: {}", e)))??;

        let path = crate::storage::save_photo(encoded, output_dir).await?;
        info!(path = %path.display(), "Photo saved");
        Ok(path)
    }
}

impl Default for PhotoPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_respects_filter_toggle() {
        let mut config = Config::default();
        config.filter_enabled = false;
        assert!(PhotoPipeline::from_config(&config).filter().is_none());

        config.filter_enabled = true;
        assert_eq!(
            PhotoPipeline::from_config(&config).filter(),
            Some(&config.filter)
        );
    }
}
