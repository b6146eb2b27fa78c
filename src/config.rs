// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON at `<config dir>/bodysnap/config.json`. Missing fields take
//! their defaults, so older files keep loading.

use crate::backends::camera::{CameraBackendType, Facing};
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CAPTURE_HEIGHT, DEFAULT_CAPTURE_WIDTH,
    DEFAULT_JPEG_QUALITY, DEFAULT_SAVE_FOLDER, DEFAULT_UPLOAD_ENDPOINT,
};
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::{EncodingFormat, FilterParameters};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera backend to use (V4L2 or virtual)
    pub backend: CameraBackendType,
    /// Image served by the virtual backend (test pattern when unset)
    pub virtual_source: Option<PathBuf>,
    /// Lens facing requested when none is given
    pub default_facing: Facing,
    /// Device node used for the front camera (e.g. /dev/video0)
    pub user_device: Option<String>,
    /// Device node used for the back camera
    pub environment_device: Option<String>,
    /// Requested capture resolution
    pub capture_width: u32,
    pub capture_height: u32,
    /// Apply the colour filter to captures
    pub filter_enabled: bool,
    /// Colour filter multipliers
    pub filter: FilterParameters,
    /// Output image format
    pub output_format: EncodingFormat,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Upload endpoint URL
    pub upload_endpoint: String,
    /// Folder under the pictures directory for saved photos
    pub save_folder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: CameraBackendType::default(),
            virtual_source: None,
            default_facing: Facing::User,
            user_device: None,
            environment_device: None,
            capture_width: DEFAULT_CAPTURE_WIDTH,
            capture_height: DEFAULT_CAPTURE_HEIGHT,
            filter_enabled: true,
            filter: FilterParameters::default(),
            output_format: EncodingFormat::Jpeg,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            upload_endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            save_folder: DEFAULT_SAVE_FOLDER.to_string(),
        }
    }
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory on this system, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Config = serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Write to the default location and return the path used
    pub fn save(&self) -> AppResult<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("No configuration directory available".into()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write pretty JSON to `path`, creating the parent directory
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> AppResult<()> {
        self.filter.validate().map_err(AppError::Config)?;
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(AppError::Config(format!(
                "jpeg_quality must be 1-100, got {}",
                self.jpeg_quality
            )));
        }
        if self.capture_width == 0 || self.capture_height == 0 {
            return Err(AppError::Config("capture resolution must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"jpeg_quality": 80}"#).unwrap();
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.default_facing, Facing::User);
        assert_eq!(config.filter, FilterParameters::default());
    }

    #[test]
    fn test_partial_filter_uses_default_multipliers() {
        let config: Config =
            serde_json::from_str(r#"{"filter": {"contrast": 1.2}}"#).unwrap();
        let defaults = FilterParameters::default();
        assert_eq!(config.filter.contrast(), 1.2);
        assert_eq!(config.filter.brightness(), defaults.brightness());
        assert_eq!(config.filter.saturation(), defaults.saturation());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        let mut config = Config::default();
        config.filter = serde_json::from_str(
            r#"{"contrast": 0.0, "brightness": 1.0, "saturation": 1.0}"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }
}
