// SPDX-License-Identifier: GPL-3.0-only

//! Camera session lifecycle
//!
//! A `CameraSession` owns at most one live stream. Opening a new stream always
//! stops the previous one first, so stream lifetimes never overlap. Dropping
//! the session releases whatever is open.

use super::types::*;
use super::{MediaDevices, VideoStream};
use tracing::{debug, info, warn};

/// Explicitly owned camera stream handle
pub struct CameraSession {
    devices: Box<dyn MediaDevices>,
    facing: Facing,
    stream: Option<Box<dyn VideoStream>>,
}

impl CameraSession {
    /// Create a session with no open stream
    pub fn new(devices: Box<dyn MediaDevices>) -> Self {
        Self::with_facing(devices, Facing::default())
    }

    /// Create a session that will prefer `facing`
    pub fn with_facing(devices: Box<dyn MediaDevices>, facing: Facing) -> Self {
        info!(backend = %devices.backend_type(), %facing, "Creating camera session");
        Self {
            devices,
            facing,
            stream: None,
        }
    }

    /// Currently desired lens facing
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Whether a live stream is open
    pub fn is_active(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_live())
    }

    /// Device of the open stream, if any
    pub fn current_device(&self) -> Option<&CameraDevice> {
        self.stream.as_ref().map(|s| s.device())
    }

    /// Backend this session opens streams on
    pub fn devices(&self) -> &dyn MediaDevices {
        self.devices.as_ref()
    }

    /// Open a stream for `facing`
    ///
    /// Any open stream is stopped before the new one is requested. On failure
    /// no stream is open and the reason is returned as-is; nothing is retried.
    pub fn request_access(&mut self, facing: Facing) -> BackendResult<()> {
        self.release();
        self.facing = facing;

        match self.devices.open_stream(facing) {
            Ok(stream) => {
                info!(%facing, device = %stream.device().name, "Camera stream opened");
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                warn!(%facing, reason = e.reason(), error = %e, "Camera access failed");
                Err(e)
            }
        }
    }

    /// Stop the open stream, if any
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            debug!(device = %stream.device().name, "Releasing camera stream");
            stream.stop();
        }
    }

    /// Flip the desired facing and open a stream for it
    pub fn toggle_orientation(&mut self) -> BackendResult<()> {
        let facing = self.facing.toggled();
        self.request_access(facing)
    }

    /// The live frame source, if one is open
    pub fn frame_source(&mut self) -> Option<&mut dyn VideoStream> {
        match self.stream.as_deref_mut() {
            Some(stream) if stream.is_live() => Some(stream),
            _ => None,
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("backend_type", &self.devices.backend_type())
            .field("facing", &self.facing)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CameraAccessError;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Log {
        live: usize,
        max_live: usize,
        opened: Vec<Facing>,
        stopped: usize,
    }

    struct FakeDevices {
        log: Arc<Mutex<Log>>,
        fail_with: Option<CameraAccessError>,
    }

    struct FakeStream {
        log: Arc<Mutex<Log>>,
        device: CameraDevice,
        live: bool,
    }

    impl MediaDevices for FakeDevices {
        fn enumerate_cameras(&self) -> BackendResult<Vec<CameraDevice>> {
            Ok(Vec::new())
        }

        fn open_stream(&self, facing: Facing) -> BackendResult<Box<dyn VideoStream>> {
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            let mut log = self.log.lock().unwrap();
            log.live += 1;
            log.max_live = log.max_live.max(log.live);
            log.opened.push(facing);
            Ok(Box::new(FakeStream {
                log: Arc::clone(&self.log),
                device: CameraDevice {
                    name: format!("fake-{}", facing),
                    path: "fake".into(),
                    facing: Some(facing),
                },
                live: true,
            }))
        }

        fn backend_type(&self) -> CameraBackendType {
            CameraBackendType::Virtual
        }
    }

    impl VideoStream for FakeStream {
        fn device(&self) -> &CameraDevice {
            &self.device
        }

        fn read_frame(&mut self) -> BackendResult<CameraFrame> {
            Ok(CameraFrame::from_rgba(1, 1, vec![0, 0, 0, 255]))
        }

        fn stop(&mut self) {
            if self.live {
                self.live = false;
                let mut log = self.log.lock().unwrap();
                log.live -= 1;
                log.stopped += 1;
            }
        }

        fn is_live(&self) -> bool {
            self.live
        }
    }

    fn session(fail_with: Option<CameraAccessError>) -> (CameraSession, Arc<Mutex<Log>>) {
        let log = Arc::new(Mutex::new(Log::default()));
        let devices = FakeDevices {
            log: Arc::clone(&log),
            fail_with,
        };
        (CameraSession::new(Box::new(devices)), log)
    }

    #[test]
    fn test_request_access_stops_previous_stream_first() {
        let (mut session, log) = session(None);
        session.request_access(Facing::User).unwrap();
        session.request_access(Facing::Environment).unwrap();
        session.request_access(Facing::User).unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.max_live, 1);
        assert_eq!(log.live, 1);
        assert_eq!(log.stopped, 2);
    }

    #[test]
    fn test_release_is_idempotent() {
        let (mut session, log) = session(None);
        session.request_access(Facing::User).unwrap();
        session.release();
        session.release();

        assert!(!session.is_active());
        assert!(session.frame_source().is_none());
        assert_eq!(log.lock().unwrap().live, 0);
        assert_eq!(log.lock().unwrap().stopped, 1);
    }

    #[test]
    fn test_release_without_stream() {
        let (mut session, log) = session(None);
        session.release();
        assert_eq!(log.lock().unwrap().stopped, 0);
    }

    #[test]
    fn test_toggle_orientation_flips_facing() {
        let (mut session, log) = session(None);
        assert_eq!(session.facing(), Facing::User);
        session.toggle_orientation().unwrap();
        assert_eq!(session.facing(), Facing::Environment);
        session.toggle_orientation().unwrap();
        assert_eq!(session.facing(), Facing::User);

        let log = log.lock().unwrap();
        assert_eq!(log.opened, vec![Facing::Environment, Facing::User]);
        assert_eq!(log.max_live, 1);
    }

    #[test]
    fn test_failure_leaves_no_stream() {
        let (mut session, _) = session(Some(CameraAccessError::NotFound));
        let err = session.request_access(Facing::Environment).unwrap_err();
        assert_eq!(err.reason(), "device-not-found");
        assert!(!session.is_active());
        assert!(session.current_device().is_none());
    }

    #[test]
    fn test_drop_releases_stream() {
        let (mut session, log) = session(None);
        session.request_access(Facing::User).unwrap();
        drop(session);
        assert_eq!(log.lock().unwrap().live, 0);
    }
}
