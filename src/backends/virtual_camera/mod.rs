// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera backend
//!
//! Serves a still image or a generated test pattern as a live stream. Used for
//! headless runs (`--source`) and for exercising capture without hardware.
//! A virtual backend can also be told to fail every open with a given reason.

pub mod file_source;

use crate::backends::camera::types::*;
use crate::backends::camera::{MediaDevices, VideoStream};
use crate::errors::CameraAccessError;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// What a virtual stream shows
#[derive(Debug, Clone)]
pub enum VirtualSource {
    /// Image file decoded on open
    ImageFile(PathBuf),
    /// Generated gradient
    TestPattern { width: u32, height: u32 },
    /// A fixed frame
    Frame(CameraFrame),
}

/// Backend serving a virtual source
#[derive(Debug, Clone)]
pub struct VirtualBackend {
    source: VirtualSource,
    /// Only serve this facing; other facings report `NotFound`
    facing: Option<Facing>,
    /// Fail every open with this reason
    fail_with: Option<CameraAccessError>,
    /// Streams currently live across all clones of this backend
    live_streams: Arc<AtomicUsize>,
}

impl VirtualBackend {
    pub fn new(source: VirtualSource) -> Self {
        Self {
            source,
            facing: None,
            fail_with: None,
            live_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Restrict the backend to a single lens facing
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = Some(facing);
        self
    }

    /// Simulate a host whose camera access always fails
    pub fn failing(reason: CameraAccessError) -> Self {
        Self {
            fail_with: Some(reason),
            ..Self::new(VirtualSource::TestPattern {
                width: 0,
                height: 0,
            })
        }
    }

    /// Number of streams opened from this backend that are still live
    pub fn live_streams(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }

    fn device(&self) -> CameraDevice {
        let path = match &self.source {
            VirtualSource::ImageFile(path) => path.display().to_string(),
            VirtualSource::TestPattern { width, height } => {
                format!("test-pattern:{}x{}", width, height)
            }
            VirtualSource::Frame(frame) => format!("frame:{}x{}", frame.width, frame.height),
        };
        CameraDevice {
            name: "Virtual Camera".to_string(),
            path,
            facing: self.facing,
        }
    }
}

impl MediaDevices for VirtualBackend {
    fn enumerate_cameras(&self) -> BackendResult<Vec<CameraDevice>> {
        match &self.fail_with {
            Some(CameraAccessError::NotFound) => Ok(Vec::new()),
            Some(e) => Err(e.clone()),
            None => Ok(vec![self.device()]),
        }
    }

    fn open_stream(&self, facing: Facing) -> BackendResult<Box<dyn VideoStream>> {
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        if self.facing.is_some_and(|f| f != facing) {
            return Err(CameraAccessError::NotFound);
        }

        let frame = match &self.source {
            VirtualSource::ImageFile(path) => file_source::load_image_as_frame(path)?,
            VirtualSource::TestPattern { width, height } => {
                file_source::test_pattern(*width, *height)
            }
            VirtualSource::Frame(frame) => frame.clone(),
        };

        self.live_streams.fetch_add(1, Ordering::SeqCst);
        debug!(%facing, width = frame.width, height = frame.height, "Virtual stream opened");

        Ok(Box::new(VirtualStream {
            device: self.device(),
            frame,
            live_streams: Arc::clone(&self.live_streams),
            live: true,
        }))
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::Virtual
    }
}

/// Stream that returns the same frame until stopped
pub struct VirtualStream {
    device: CameraDevice,
    frame: CameraFrame,
    live_streams: Arc<AtomicUsize>,
    live: bool,
}

impl VideoStream for VirtualStream {
    fn device(&self) -> &CameraDevice {
        &self.device
    }

    fn read_frame(&mut self) -> BackendResult<CameraFrame> {
        if !self.live {
            return Err(CameraAccessError::Unknown("stream is not running".into()));
        }
        let mut frame = self.frame.clone();
        frame.captured_at = std::time::Instant::now();
        Ok(frame)
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.live_streams.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for VirtualStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_stop_tracks_live_streams() {
        let backend = VirtualBackend::new(VirtualSource::TestPattern {
            width: 8,
            height: 4,
        });
        let mut stream = backend.open_stream(Facing::User).unwrap();
        assert_eq!(backend.live_streams(), 1);

        let frame = stream.read_frame().unwrap();
        assert_eq!((frame.width, frame.height), (8, 4));

        stream.stop();
        stream.stop();
        assert_eq!(backend.live_streams(), 0);
        assert!(stream.read_frame().is_err());
    }

    #[test]
    fn test_facing_restriction() {
        let backend = VirtualBackend::new(VirtualSource::TestPattern {
            width: 2,
            height: 2,
        })
        .with_facing(Facing::User);
        assert!(backend.open_stream(Facing::User).is_ok());
        assert_eq!(
            backend.open_stream(Facing::Environment).err(),
            Some(CameraAccessError::NotFound)
        );
    }

    #[test]
    fn test_failing_backend() {
        let backend = VirtualBackend::failing(CameraAccessError::Busy);
        assert_eq!(
            backend.open_stream(Facing::User).err(),
            Some(CameraAccessError::Busy)
        );
        assert_eq!(backend.live_streams(), 0);
    }
}
