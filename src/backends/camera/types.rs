// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use crate::errors::CameraAccessError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, CameraAccessError>;

/// Which way the lens faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Front camera, pointing at the user
    #[default]
    User,
    /// Back camera, pointing away from the user
    Environment,
}

impl Facing {
    /// The other lens
    pub fn toggled(self) -> Self {
        match self {
            Facing::User => Facing::Environment,
            Facing::Environment => Facing::User,
        }
    }

    /// Front camera frames are mirrored so the photo matches the preview
    pub fn is_mirrored(self) -> bool {
        matches!(self, Facing::User)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Facing::User => "user",
            Facing::Environment => "environment",
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "front" => Ok(Facing::User),
            "environment" | "back" | "rear" => Ok(Facing::Environment),
            other => Err(format!("unknown facing '{}'", other)),
        }
    }
}

/// Camera backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CameraBackendType {
    /// Kernel V4L2 capture devices
    #[default]
    V4l2,
    /// Still image or test pattern served as a stream
    Virtual,
}

impl std::fmt::Display for CameraBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraBackendType::V4l2 => write!(f, "V4L2"),
            CameraBackendType::Virtual => write!(f, "virtual"),
        }
    }
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    /// Device node (e.g. /dev/video0) or virtual source description
    pub path: String,
    /// Guessed lens facing, if the device name gives it away
    pub facing: Option<Facing>,
}

/// A single RGBA frame read from a stream
///
/// `width`/`height` may be zero when the source has not reported its size yet.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Wrap RGBA bytes as a frame
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            captured_at: Instant::now(),
        }
    }

    /// Whether the source reported an intrinsic size
    pub fn has_size(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}
