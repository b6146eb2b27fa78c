// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 camera backend
//!
//! Enumerates `/dev/video*` capture nodes and streams frames from them with
//! memory-mapped buffers. V4L2 has no notion of lens facing, so the facing of
//! a device comes from the configuration or is guessed from its card name.

mod capture_thread;

pub use capture_thread::V4l2Stream;

use super::types::*;
use super::{MediaDevices, VideoStream};
use crate::config::Config;
use crate::constants::V4L2_SYSFS_CLASS;
use crate::errors::CameraAccessError;
use std::path::Path;
use tracing::{debug, info};
use v4l::capability::Flags;
use v4l::prelude::*;

/// V4L2 backend settings
#[derive(Debug, Clone)]
pub struct V4l2Backend {
    /// Explicit device node for the front camera
    user_device: Option<String>,
    /// Explicit device node for the back camera
    environment_device: Option<String>,
    /// Requested capture resolution
    width: u32,
    height: u32,
}

impl V4l2Backend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            user_device: None,
            environment_device: None,
            width,
            height,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            user_device: config.user_device.clone(),
            environment_device: config.environment_device.clone(),
            width: config.capture_width,
            height: config.capture_height,
        }
    }

    fn configured_path(&self, facing: Facing) -> Option<&str> {
        match facing {
            Facing::User => self.user_device.as_deref(),
            Facing::Environment => self.environment_device.as_deref(),
        }
    }

    /// Query every `/dev/video*` node
    ///
    /// Returns the capture devices plus the reason the first unreadable node
    /// could not be opened.
    fn probe_nodes(&self) -> BackendResult<(Vec<CameraDevice>, Option<CameraAccessError>)> {
        if !Path::new(V4L2_SYSFS_CLASS).exists() {
            return Err(CameraAccessError::Unsupported);
        }

        let entries = std::fs::read_dir("/dev").map_err(|e| CameraAccessError::from_io(&e))?;
        let mut nodes: Vec<(u32, String)> = entries
            .flatten()
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                let index = name.strip_prefix("video")?.parse::<u32>().ok()?;
                Some((index, e.path().to_string_lossy().to_string()))
            })
            .collect();
        nodes.sort();

        let mut cameras = Vec::new();
        let mut skipped = None;
        for (_, path) in nodes {
            let caps = match Device::with_path(&path).and_then(|dev| dev.query_caps()) {
                Ok(caps) => caps,
                Err(e) => {
                    debug!(path = %path, error = %e, "Skipping unreadable video node");
                    skipped.get_or_insert_with(|| CameraAccessError::from_io(&e));
                    continue;
                }
            };

            if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
                debug!(path = %path, card = %caps.card, "Skipping non-capture video node");
                continue;
            }

            cameras.push(CameraDevice {
                facing: guess_facing(&caps.card),
                name: caps.card,
                path,
            });
        }

        debug!(count = cameras.len(), "V4L2 cameras enumerated");
        Ok((cameras, skipped))
    }
}

impl MediaDevices for V4l2Backend {
    fn enumerate_cameras(&self) -> BackendResult<Vec<CameraDevice>> {
        let (cameras, skipped) = self.probe_nodes()?;
        if cameras.is_empty() {
            let reason = missing_device_reason(skipped);
            if reason != CameraAccessError::NotFound {
                return Err(reason);
            }
        }
        Ok(cameras)
    }

    fn open_stream(&self, facing: Facing) -> BackendResult<Box<dyn VideoStream>> {
        let device = match self.configured_path(facing) {
            Some(path) => CameraDevice {
                name: path.to_string(),
                path: path.to_string(),
                facing: Some(facing),
            },
            None => {
                let (cameras, skipped) = self.probe_nodes()?;
                select_device(&cameras, facing)
                    .cloned()
                    .ok_or_else(|| missing_device_reason(skipped))?
            }
        };

        info!(
            device = %device.name,
            path = %device.path,
            %facing,
            width = self.width,
            height = self.height,
            "Opening V4L2 stream"
        );

        let stream = V4l2Stream::open(device, self.width, self.height)?;
        Ok(Box::new(stream))
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::V4l2
    }
}

/// Guess lens facing from a V4L2 card name
pub fn guess_facing(card: &str) -> Option<Facing> {
    let card = card.to_ascii_lowercase();
    if ["front", "user", "selfie"].iter().any(|k| card.contains(k)) {
        Some(Facing::User)
    } else if ["back", "rear", "environment", "world"]
        .iter()
        .any(|k| card.contains(k))
    {
        Some(Facing::Environment)
    } else {
        None
    }
}

/// Pick the device serving `facing`
///
/// Devices whose name gives their facing away win. Otherwise a single camera
/// serves both facings; with several unlabelled cameras the first is taken as
/// the front one and the last as the back one.
pub fn select_device(cameras: &[CameraDevice], facing: Facing) -> Option<&CameraDevice> {
    if let Some(device) = cameras.iter().find(|c| c.facing == Some(facing)) {
        return Some(device);
    }
    if cameras.len() == 1 {
        return cameras.first();
    }

    let mut unlabelled = cameras.iter().filter(|c| c.facing.is_none());
    match facing {
        Facing::User => unlabelled.next(),
        Facing::Environment => {
            let candidates: Vec<_> = unlabelled.collect();
            if candidates.len() > 1 {
                candidates.last().copied()
            } else {
                None
            }
        }
    }
}

/// Reason to report when no device serves the requested facing
///
/// Nodes that exist but could not be opened for lack of permission or
/// because another process holds them explain the absence better than
/// `NotFound`.
pub fn missing_device_reason(skipped: Option<CameraAccessError>) -> CameraAccessError {
    match skipped {
        Some(reason @ (CameraAccessError::PermissionDenied | CameraAccessError::Busy)) => reason,
        _ => CameraAccessError::NotFound,
    }
}
