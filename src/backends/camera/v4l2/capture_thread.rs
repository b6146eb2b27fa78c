// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 capture thread
//!
//! The device is opened, configured and streamed from a dedicated thread. The
//! thread reports the outcome of the open through a channel, then keeps the
//! most recent converted frame in a shared slot until it is told to stop.

use crate::backends::camera::VideoStream;
use crate::backends::camera::format_converters::RawFormat;
use crate::backends::camera::types::*;
use crate::constants::{
    DEQUEUE_RETRY_DELAY, FIRST_FRAME_TIMEOUT, MAX_DEQUEUE_ERRORS, V4L2_BUFFER_COUNT,
    WARMUP_FRAMES,
};
use crate::errors::CameraAccessError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

/// Latest frame plus how many frames have been seen
#[derive(Default)]
struct FrameSlot {
    frame: Option<CameraFrame>,
    sequence: u32,
    /// Set when the capture thread gave up on the device
    failure: Option<CameraAccessError>,
}

/// Negotiated stream parameters
#[derive(Debug, Clone, Copy)]
struct Negotiated {
    width: u32,
    height: u32,
    format: RawFormat,
}

/// Live V4L2 stream backed by a capture thread
pub struct V4l2Stream {
    device: CameraDevice,
    stop_signal: Arc<AtomicBool>,
    slot: Arc<Mutex<FrameSlot>>,
    handle: Option<JoinHandle<()>>,
}

impl V4l2Stream {
    /// Open `device` and start streaming
    ///
    /// Blocks until the device is configured and streaming, or has failed.
    pub fn open(device: CameraDevice, width: u32, height: u32) -> BackendResult<Self> {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let slot = Arc::new(Mutex::new(FrameSlot::default()));
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = {
            let path = device.path.clone();
            let stop_signal = Arc::clone(&stop_signal);
            let slot = Arc::clone(&slot);
            thread::Builder::new()
                .name("v4l2-capture".into())
                .spawn(move || capture_loop(path, width, height, stop_signal, slot, ready_tx))
                .map_err(|e| CameraAccessError::Unknown(e.to_string()))?
        };

        match ready_rx.recv() {
            Ok(Ok(negotiated)) => {
                info!(
                    path = %device.path,
                    width = negotiated.width,
                    height = negotiated.height,
                    format = ?negotiated.format,
                    "V4L2 stream started"
                );
                Ok(Self {
                    device,
                    stop_signal,
                    slot,
                    handle: Some(handle),
                })
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(CameraAccessError::Unknown(
                    "capture thread exited before reporting".into(),
                ))
            }
        }
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, FrameSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl VideoStream for V4l2Stream {
    fn device(&self) -> &CameraDevice {
        &self.device
    }

    fn read_frame(&mut self) -> BackendResult<CameraFrame> {
        let start = Instant::now();
        loop {
            if let Some(failure) = self.lock_slot().failure.clone() {
                return Err(failure);
            }
            if !self.is_live() {
                return Err(CameraAccessError::Unknown("stream is not running".into()));
            }

            {
                let slot = self.lock_slot();
                if slot.sequence > WARMUP_FRAMES
                    && let Some(frame) = slot.frame.as_ref()
                {
                    return Ok(frame.clone());
                }
            }

            if start.elapsed() > FIRST_FRAME_TIMEOUT {
                // Settle for an early frame over nothing
                return self.lock_slot().frame.clone().ok_or_else(|| {
                    CameraAccessError::Unknown("timed out waiting for a frame".into())
                });
            }

            thread::sleep(Duration::from_millis(16));
        }
    }

    fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!(path = %self.device.path, "V4L2 capture thread panicked");
            }
            debug!(path = %self.device.path, "V4L2 stream stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|h| !h.is_finished() && !self.stop_signal.load(Ordering::SeqCst))
    }
}

impl Drop for V4l2Stream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Open the device and negotiate the first raw format it accepts
fn open_device(path: &str, width: u32, height: u32) -> BackendResult<(Device, Negotiated)> {
    let dev = Device::with_path(path).map_err(|e| CameraAccessError::from_io(&e))?;

    for raw in RawFormat::ALL {
        let requested = Format::new(width, height, FourCC::new(&raw.fourcc()));
        let actual = dev
            .set_format(&requested)
            .map_err(|e| CameraAccessError::from_io(&e))?;

        if let Some(format) = RawFormat::from_fourcc(actual.fourcc.repr) {
            return Ok((
                dev,
                Negotiated {
                    width: actual.width,
                    height: actual.height,
                    format,
                },
            ));
        }
        debug!(path, requested = ?raw, actual = ?actual.fourcc, "Format not accepted");
    }

    Err(CameraAccessError::Unknown(
        "device offers neither YUYV nor MJPEG".into(),
    ))
}

fn capture_loop(
    path: String,
    width: u32,
    height: u32,
    stop_signal: Arc<AtomicBool>,
    slot: Arc<Mutex<FrameSlot>>,
    ready: mpsc::Sender<BackendResult<Negotiated>>,
) {
    let (dev, negotiated) = match open_device(&path, width, height) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    let mut stream = match Stream::with_buffers(&dev, Type::VideoCapture, V4L2_BUFFER_COUNT) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(CameraAccessError::from_io(&e)));
            return;
        }
    };

    if ready.send(Ok(negotiated)).is_err() {
        return;
    }

    let mut consecutive_errors = 0;
    while !stop_signal.load(Ordering::SeqCst) {
        let (buf, meta) = match stream.next() {
            Ok(frame) => {
                consecutive_errors = 0;
                frame
            }
            Err(e) => {
                consecutive_errors += 1;
                if let Some(failure) = dequeue_failure(&e, consecutive_errors) {
                    error!(path = %path, error = %e, "V4L2 device lost, stopping capture");
                    let mut slot = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    slot.failure = Some(failure);
                    slot.frame = None;
                    break;
                }
                warn!(
                    path = %path,
                    error = %e,
                    attempt = consecutive_errors,
                    "Failed to dequeue frame"
                );
                thread::sleep(DEQUEUE_RETRY_DELAY);
                continue;
            }
        };

        let used = (meta.bytesused as usize).min(buf.len());
        let rgba = match negotiated
            .format
            .to_rgba(&buf[..used], negotiated.width, negotiated.height)
        {
            Ok(rgba) => rgba,
            Err(e) => {
                debug!(path = %path, error = %e, "Dropping undecodable frame");
                continue;
            }
        };

        let frame = CameraFrame::from_rgba(negotiated.width, negotiated.height, rgba);
        let mut slot = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.frame = Some(frame);
        slot.sequence = slot.sequence.saturating_add(1);
    }

    debug!(path = %path, "Capture loop exiting");
}

/// Decide whether a dequeue error ends the stream
///
/// A vanished device or an I/O error is fatal at once; anything else is
/// retried up to `MAX_DEQUEUE_ERRORS` times in a row.
fn dequeue_failure(err: &std::io::Error, consecutive: u32) -> Option<CameraAccessError> {
    let fatal = matches!(
        err.raw_os_error(),
        Some(libc::ENODEV) | Some(libc::ENXIO) | Some(libc::EIO)
    );
    (fatal || consecutive >= MAX_DEQUEUE_ERRORS).then(|| CameraAccessError::from_io(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_unplugged_device_is_fatal() {
        let err = io::Error::from_raw_os_error(libc::ENODEV);
        assert_eq!(dequeue_failure(&err, 1), Some(CameraAccessError::NotFound));
    }

    #[test]
    fn test_io_error_is_fatal() {
        let err = io::Error::from_raw_os_error(libc::EIO);
        assert!(matches!(
            dequeue_failure(&err, 1),
            Some(CameraAccessError::Unknown(_))
        ));
    }

    #[test]
    fn test_transient_errors_retried_until_limit() {
        let err = io::Error::from_raw_os_error(libc::EAGAIN);
        for attempt in 1..MAX_DEQUEUE_ERRORS {
            assert_eq!(dequeue_failure(&err, attempt), None);
        }
        assert!(dequeue_failure(&err, MAX_DEQUEUE_ERRORS).is_some());
    }

    #[test]
    fn test_recorded_failure_is_returned_by_read() {
        let slot = Arc::new(Mutex::new(FrameSlot {
            frame: None,
            sequence: WARMUP_FRAMES + 1,
            failure: Some(CameraAccessError::NotFound),
        }));
        let mut stream = V4l2Stream {
            device: CameraDevice {
                name: "gone".into(),
                path: "/dev/video9".into(),
                facing: None,
            },
            stop_signal: Arc::new(AtomicBool::new(false)),
            slot,
            handle: Some(thread::spawn(|| {})),
        };

        assert_eq!(stream.read_frame().unwrap_err(), CameraAccessError::NotFound);
        stream.stop();
        assert!(!stream.is_live());
    }
}
