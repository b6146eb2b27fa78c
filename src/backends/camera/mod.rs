// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │   Caller (CLI, ...) │
//! └──────────┬──────────┘
//!            │ owns
//!            ▼
//! ┌─────────────────────┐
//! │    CameraSession    │  ← at most one live stream, released on drop
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  MediaDevices trait │  ← open_stream(facing)
//! └──────────┬──────────┘
//!            │
//!       ┌────┴─────┐
//!       ▼          ▼
//!   ┌──────┐  ┌─────────┐
//!   │ V4L2 │  │ Virtual │
//!   └──────┘  └─────────┘
//! ```

pub mod format_converters;
pub mod session;
pub mod types;
pub mod v4l2;

pub use session::CameraSession;
pub use types::*;

use crate::backends::virtual_camera::{VirtualBackend, VirtualSource};
use crate::config::Config;

/// Device media capability
///
/// Negotiates a live stream for a lens facing. Implementations never retry on
/// their own; every failure is reported to the caller.
pub trait MediaDevices: Send + Sync {
    /// Enumerate capture devices visible to this backend
    fn enumerate_cameras(&self) -> BackendResult<Vec<CameraDevice>>;

    /// Open a live stream for the requested facing
    fn open_stream(&self, facing: Facing) -> BackendResult<Box<dyn VideoStream>>;

    /// Get the backend type identifier
    fn backend_type(&self) -> CameraBackendType;
}

/// A live video frame source
pub trait VideoStream: Send {
    /// Device this stream was opened on
    fn device(&self) -> &CameraDevice;

    /// Read the most recent frame
    fn read_frame(&mut self) -> BackendResult<CameraFrame>;

    /// Stop all capture on this stream. Safe to call more than once.
    fn stop(&mut self);

    /// Whether frames can still be read
    fn is_live(&self) -> bool;
}

/// Build the backend selected by the configuration
///
/// `source` overrides the configuration with a virtual camera serving that
/// image file.
pub fn get_backend(config: &Config, source: Option<std::path::PathBuf>) -> Box<dyn MediaDevices> {
    if let Some(path) = source {
        return Box::new(VirtualBackend::new(VirtualSource::ImageFile(path)));
    }

    match config.backend {
        CameraBackendType::V4l2 => Box::new(v4l2::V4l2Backend::from_config(config)),
        CameraBackendType::Virtual => Box::new(VirtualBackend::new(match &config.virtual_source {
            Some(path) => VirtualSource::ImageFile(path.clone()),
            None => VirtualSource::TestPattern {
                width: config.capture_width,
                height: config.capture_height,
            },
        })),
    }
}
