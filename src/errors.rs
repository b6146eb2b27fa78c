// SPDX-License-Identifier: GPL-3.0-only

//! Error types for capture, filtering and upload preparation

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera access errors
    Camera(CameraAccessError),
    /// Photo capture errors
    Photo(PhotoError),
    /// Upload errors
    Upload(UploadError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Reasons a camera stream could not be opened
///
/// None of these are retried automatically. A busy device may be retried by
/// calling `request_access` again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraAccessError {
    /// The host has no video capture capability at all
    Unsupported,
    /// The user or OS refused access to the device
    PermissionDenied,
    /// No device matches the requested facing
    NotFound,
    /// The device is opened by another process
    Busy,
    /// Anything the backend could not classify
    Unknown(String),
}

impl CameraAccessError {
    /// Stable reason string reported to callers
    pub fn reason(&self) -> &'static str {
        match self {
            CameraAccessError::Unsupported => "capability-unsupported",
            CameraAccessError::PermissionDenied => "permission-denied",
            CameraAccessError::NotFound => "device-not-found",
            CameraAccessError::Busy => "device-busy",
            CameraAccessError::Unknown(_) => "unknown-device-error",
        }
    }

    /// Classify an I/O error raised while opening or configuring a device
    pub fn from_io(err: &std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(libc::EACCES) | Some(libc::EPERM) => CameraAccessError::PermissionDenied,
            Some(libc::ENOENT) | Some(libc::ENODEV) | Some(libc::ENXIO) => {
                CameraAccessError::NotFound
            }
            Some(libc::EBUSY) => CameraAccessError::Busy,
            _ => match err.kind() {
                std::io::ErrorKind::PermissionDenied => CameraAccessError::PermissionDenied,
                std::io::ErrorKind::NotFound => CameraAccessError::NotFound,
                _ => CameraAccessError::Unknown(err.to_string()),
            },
        }
    }
}

/// Photo capture errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// No live frame source to capture from
    NoFrameAvailable,
    /// Reading the frame failed
    CaptureFailed(String),
    /// Encoding failed
    EncodingFailed(String),
    /// Save failed
    SaveFailed(String),
}

impl PhotoError {
    pub fn reason(&self) -> &'static str {
        match self {
            PhotoError::NoFrameAvailable => "no-frame-available",
            PhotoError::CaptureFailed(_) => "capture-failed",
            PhotoError::EncodingFailed(_) => "encoding-failed",
            PhotoError::SaveFailed(_) => "save-failed",
        }
    }
}

/// Upload errors
///
/// Anything past payload preparation is opaque to the caller: transport
/// failures and server-reported errors both end up here as a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The endpoint rejected the request (HTTP 400)
    Rejected(String),
    /// The endpoint failed (HTTP 5xx or unexpected status)
    Server(String),
    /// The request never completed
    Network(String),
    /// The response body was not the expected JSON
    InvalidResponse(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Photo(e) => write!(f, "Photo error: {}", e),
            AppError::Upload(e) => write!(f, "Upload error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraAccessError::Unsupported => write!(f, "Camera capture is not supported here"),
            CameraAccessError::PermissionDenied => write!(f, "Camera permission denied"),
            CameraAccessError::NotFound => write!(f, "No camera found"),
            CameraAccessError::Busy => write!(f, "Camera is in use by another application"),
            CameraAccessError::Unknown(msg) => write!(f, "Camera error: {}", msg),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            PhotoError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Rejected(msg) => write!(f, "Upload rejected: {}", msg),
            UploadError::Server(msg) => write!(f, "Server error: {}", msg),
            UploadError::Network(msg) => write!(f, "Network error: {}", msg),
            UploadError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraAccessError {}
impl std::error::Error for PhotoError {}
impl std::error::Error for UploadError {}

impl From<CameraAccessError> for AppError {
    fn from(err: CameraAccessError) -> Self {
        AppError::Camera(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Photo(err)
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::Upload(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for PhotoError {
    fn from(err: std::io::Error) -> Self {
        PhotoError::SaveFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_camera_reasons_are_distinct() {
        let reasons = [
            CameraAccessError::Unsupported.reason(),
            CameraAccessError::PermissionDenied.reason(),
            CameraAccessError::NotFound.reason(),
            CameraAccessError::Busy.reason(),
            CameraAccessError::Unknown("x".into()).reason(),
        ];
        for (i, a) in reasons.iter().enumerate() {
            for b in &reasons[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_io_error_classification() {
        let busy = io::Error::from_raw_os_error(libc::EBUSY);
        assert_eq!(CameraAccessError::from_io(&busy), CameraAccessError::Busy);

        let denied = io::Error::from_raw_os_error(libc::EACCES);
        assert_eq!(
            CameraAccessError::from_io(&denied),
            CameraAccessError::PermissionDenied
        );

        let missing = io::Error::from_raw_os_error(libc::ENOENT);
        assert_eq!(CameraAccessError::from_io(&missing), CameraAccessError::NotFound);

        let other = io::Error::other("ioctl exploded");
        assert_eq!(CameraAccessError::from_io(&other).reason(), "unknown-device-error");
    }
}
