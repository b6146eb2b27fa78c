// SPDX-License-Identifier: GPL-3.0-only

//! One-shot photo capture
//!
//! Reads the current frame of a session's stream, mirrors it for the front
//! camera, optionally filters it, encodes it, and stops the stream. There is
//! no continuous mode: every capture attempt on a live stream ends it.

use super::buffer::PixelBuffer;
use super::encoding::{EncodedImage, PhotoEncoder};
use super::filter::{FilterParameters, apply_filter};
use crate::backends::camera::{CameraFrame, CameraSession, Facing};
use crate::errors::PhotoError;
use tracing::{debug, info, warn};

/// Photo capture handler
pub struct PhotoCapture;

impl PhotoCapture {
    /// Capture one photo from the session's live stream
    ///
    /// Fails with `NoFrameAvailable` before doing anything if the session has
    /// no live stream. Otherwise the stream is released once the frame read
    /// returns, so read and encoding failures also leave no stream open.
    pub fn capture(
        session: &mut CameraSession,
        filter: Option<&FilterParameters>,
        encoder: &PhotoEncoder,
    ) -> Result<EncodedImage, PhotoError> {
        let facing = session.facing();
        let source = session.frame_source().ok_or(PhotoError::NoFrameAvailable)?;

        info!(device = %source.device().name, %facing, "Capturing photo");

        let frame = source.read_frame();

        // One read per stream: whatever the outcome, the stream is done
        session.release();

        let frame = frame.map_err(|e| PhotoError::CaptureFailed(e.to_string()))?;
        let buffer = Self::render(&frame, facing, filter);
        let encoded = encoder.encode(&buffer)?;

        info!(
            width = encoded.width,
            height = encoded.height,
            size = encoded.data.len(),
            "Photo captured"
        );
        Ok(encoded)
    }

    /// Turn a frame into the pixel buffer that gets encoded
    ///
    /// The buffer has the frame's native size, or the fallback size when the
    /// frame reports none. Front camera frames are mirrored before filtering.
    pub fn render(
        frame: &CameraFrame,
        facing: Facing,
        filter: Option<&FilterParameters>,
    ) -> PixelBuffer {
        let mut buffer = Self::frame_to_buffer(frame);

        if facing.is_mirrored() {
            buffer.mirror_horizontal();
        }

        if let Some(params) = filter {
            debug!(?params, "Applying colour filter");
            apply_filter(&mut buffer, params);
        }

        buffer
    }

    fn frame_to_buffer(frame: &CameraFrame) -> PixelBuffer {
        if !frame.has_size() {
            warn!("Frame source reported no size, using fallback resolution");
            return PixelBuffer::fallback();
        }

        PixelBuffer::from_rgba(frame.width, frame.height, frame.data.to_vec()).unwrap_or_else(
            || {
                warn!(
                    width = frame.width,
                    height = frame.height,
                    len = frame.data.len(),
                    "Frame data does not match its size, capturing a blank frame"
                );
                PixelBuffer::new(frame.width, frame.height)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_camera::{VirtualBackend, VirtualSource};

    fn frame() -> CameraFrame {
        CameraFrame::from_rgba(
            3,
            2,
            vec![
                10, 0, 0, 255, 20, 0, 0, 255, 30, 0, 0, 255, //
                40, 0, 0, 255, 50, 0, 0, 255, 60, 0, 0, 255,
            ],
        )
    }

    #[test]
    fn test_front_capture_is_mirror_of_back_capture() {
        let front = PhotoCapture::render(&frame(), Facing::User, None);
        let mut back = PhotoCapture::render(&frame(), Facing::Environment, None);
        back.mirror_horizontal();
        assert_eq!(front, back);
        assert_eq!(front.pixel(0, 0)[0], 30);
    }

    #[test]
    fn test_mirror_happens_before_filter() {
        let params = FilterParameters::default();
        let front = PhotoCapture::render(&frame(), Facing::User, Some(&params));
        let mut back = PhotoCapture::render(&frame(), Facing::Environment, Some(&params));
        back.mirror_horizontal();
        assert_eq!(front, back);
    }

    #[test]
    fn test_zero_size_frame_uses_fallback() {
        let frame = CameraFrame::from_rgba(0, 0, Vec::new());
        let buffer = PhotoCapture::render(&frame, Facing::Environment, None);
        assert_eq!(buffer.dimensions(), (640, 480));
    }

    #[test]
    fn test_native_resolution_kept() {
        let buffer = PhotoCapture::render(&frame(), Facing::Environment, None);
        assert_eq!(buffer.dimensions(), (3, 2));
    }

    #[test]
    fn test_capture_without_stream_fails() {
        let backend = VirtualBackend::new(VirtualSource::Frame(frame()));
        let mut session = CameraSession::new(Box::new(backend));

        let err = PhotoCapture::capture(&mut session, None, &PhotoEncoder::default()).unwrap_err();
        assert_eq!(err, PhotoError::NoFrameAvailable);
        assert!(!session.is_active());
    }

    #[test]
    fn test_capture_stops_stream() {
        let backend = VirtualBackend::new(VirtualSource::Frame(frame()));
        let probe = backend.clone();
        let mut session = CameraSession::new(Box::new(backend));
        session.request_access(Facing::Environment).unwrap();
        assert_eq!(probe.live_streams(), 1);

        let encoded = PhotoCapture::capture(&mut session, None, &PhotoEncoder::default()).unwrap();
        assert_eq!((encoded.width, encoded.height), (3, 2));
        assert!(!session.is_active());
        assert_eq!(probe.live_streams(), 0);

        // A second capture needs a fresh stream
        assert_eq!(
            PhotoCapture::capture(&mut session, None, &PhotoEncoder::default()).unwrap_err(),
            PhotoError::NoFrameAvailable
        );
    }

    #[test]
    fn test_encode_failure_still_stops_stream() {
        // JPEG cannot hold images wider than 65535 pixels
        let wide = CameraFrame::from_rgba(70_000, 1, vec![128; 70_000 * 4]);
        let backend = VirtualBackend::new(VirtualSource::Frame(wide));
        let probe = backend.clone();
        let mut session = CameraSession::new(Box::new(backend));
        session.request_access(Facing::Environment).unwrap();

        let err = PhotoCapture::capture(&mut session, None, &PhotoEncoder::default()).unwrap_err();
        assert!(matches!(err, PhotoError::EncodingFailed(_)));
        assert!(!session.is_active());
        assert_eq!(probe.live_streams(), 0);
    }
}
