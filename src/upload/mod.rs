// SPDX-License-Identifier: GPL-3.0-only

//! Upload preparation and transport
//!
//! - [`payload`]: file naming and `multipart/form-data` encoding (no I/O)
//! - [`client`]: one-shot POST to the upload endpoint

pub mod client;
pub mod payload;

pub use client::{UploadClient, UploadReceipt};
pub use payload::{ImageCategory, MultipartBody, UploadPayload, generate_filename};
