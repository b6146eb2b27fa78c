// SPDX-License-Identifier: GPL-3.0-only

//! Bodysnap - body photo capture and upload preparation
//!
//! Captures a single photo from a camera, mirrors front camera shots,
//! applies an optional contrast/brightness/saturation filter, encodes the
//! result and packages it for the upload endpoint.
//!
//! # Architecture
//!
//! - [`backends`]: Camera access (V4L2 and virtual backends, owned sessions)
//! - [`pipelines`]: Photo capture, colour filter and encoding
//! - [`upload`]: Multipart payload preparation and the upload client
//! - [`config`]: User configuration handling
//! - [`storage`]: Saving photos to disk
//!
//! # Example
//!
//! ```ignore
//! let backend = bodysnap::backends::camera::get_backend(&config, None);
//! let mut session = CameraSession::new(backend);
//! session.request_access(Facing::User)?;
//! let photo = PhotoPipeline::from_config(&config).capture(&mut session)?;
//! let payload = UploadPayload::new(photo, "user-42", ImageCategory::Front);
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;
pub mod upload;

// Re-export commonly used types
pub use backends::camera::{CameraSession, Facing};
pub use config::Config;
pub use errors::{AppError, AppResult, CameraAccessError, PhotoError, UploadError};
pub use pipelines::photo::{EncodedImage, FilterParameters, PhotoPipeline, PixelBuffer};
pub use upload::{ImageCategory, UploadPayload};
