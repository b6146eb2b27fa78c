// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Buffer size used when a frame source reports no intrinsic size
pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// JPEG quality factor for captured photos (0-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Resolution requested from V4L2 devices unless configured otherwise
pub const DEFAULT_CAPTURE_WIDTH: u32 = 1280;
pub const DEFAULT_CAPTURE_HEIGHT: u32 = 720;

/// Number of mmap buffers queued on a V4L2 stream
pub const V4L2_BUFFER_COUNT: u32 = 4;

/// How long `read_frame` waits for the first frame of a fresh stream
pub const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Frames discarded after stream start while auto-exposure settles
pub const WARMUP_FRAMES: u32 = 5;

/// Consecutive dequeue failures after which a V4L2 stream gives up
pub const MAX_DEQUEUE_ERRORS: u32 = 10;

/// Pause between dequeue retries
pub const DEQUEUE_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Sysfs class directory present when the kernel has V4L2 support
pub const V4L2_SYSFS_CLASS: &str = "/sys/class/video4linux";

/// Default folder name for saving photos
pub const DEFAULT_SAVE_FOLDER: &str = "Bodysnap";

/// Configuration directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "bodysnap";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default upload endpoint
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "http://localhost:3000/api/upload";

/// Timeout for a single upload request
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Multipart field names expected by the upload endpoint
pub mod fields {
    pub const FILE: &str = "file";
    pub const USER_ID: &str = "userId";
    pub const CATEGORY: &str = "type";
}

/// Tolerance below which the saturation step treats a pixel as achromatic
pub const SATURATION_EPSILON: f32 = 1e-6;
