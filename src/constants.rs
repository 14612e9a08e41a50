// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Zoom bounds and gesture scaling
pub mod zoom {
    /// Lower zoom bound; never configurable
    pub const MIN_FACTOR: f64 = 1.0;

    /// Default upper zoom bound (overridable in the user config)
    pub const DEFAULT_MAX_FACTOR: f64 = 5.0;

    /// Factor reached at the top of a hardware `ZOOM_ABSOLUTE` range
    ///
    /// The control range is mapped linearly onto `1.0..=HARDWARE_MAX_FACTOR`.
    pub const HARDWARE_MAX_FACTOR: f64 = 10.0;

    /// Maximum factor when the device has no zoom control and frames are cropped instead
    pub const DIGITAL_MAX_FACTOR: f64 = 10.0;

    /// Pinch scale applied per mouse wheel notch
    pub const WHEEL_STEP: f64 = 1.1;
}

/// Focus indicator animation
pub mod focus_ring {
    use super::Duration;

    /// Ring scale when it first appears
    pub const START_SCALE: f32 = 2.2;

    /// Ring scale once the animation settles
    pub const END_SCALE: f32 = 1.25;

    /// Duration of the scale-down and fade-in
    pub const ANIMATION: Duration = Duration::from_millis(400);

    /// How long the settled ring stays visible before it is hidden
    pub const HOLD: Duration = Duration::from_millis(800);

    /// Base ring diameter in logical pixels (before scaling)
    pub const DIAMETER: f32 = 64.0;

    /// Ring stroke width
    pub const BORDER_WIDTH: f32 = 2.0;

    /// Frame tick interval while the ring is animating (~60 FPS)
    pub const TICK_MILLIS: u64 = 16;
}

/// Touch and pointer gesture thresholds
pub mod gestures {
    /// Maximum pointer travel (logical pixels) for a press/release to still count as a tap
    pub const TAP_SLOP: f32 = 8.0;

    /// Smallest finger distance used as a pinch reference, avoids division blowups
    pub const MIN_PINCH_DISTANCE: f32 = 1.0;
}

/// UI layout constants
pub mod ui {
    /// Shutter control outer diameter
    pub const SHUTTER_DIAMETER: f32 = 100.0;

    /// Shutter ring border width
    pub const SHUTTER_BORDER_WIDTH: f32 = 10.0;

    /// Distance from the bottom edge of the window to the shutter centre
    pub const SHUTTER_CENTER_FROM_BOTTOM: f32 = 100.0;

    /// Status line text size
    pub const STATUS_TEXT_SIZE: u16 = 14;

    /// Status line background transparency (0.0 = transparent, 1.0 = opaque)
    pub const STATUS_BACKGROUND_ALPHA: f32 = 0.6;

    /// Minimum window width
    pub const MIN_WINDOW_WIDTH: f32 = 360.0;

    /// Minimum window height
    pub const MIN_WINDOW_HEIGHT: f32 = 480.0;
}

/// GStreamer pipeline tuning
pub mod pipeline {
    /// appsink max-buffers for the preview branch
    pub const MAX_BUFFERS: u32 = 2;

    /// Preview frame channel capacity (frames beyond this are dropped)
    pub const PREVIEW_CHANNEL_CAPACITY: usize = 4;

    /// Seconds to wait for the pipeline to reach PLAYING
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// Seconds to wait for the pipeline to reach NULL
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Log per-frame statistics every N frames
    pub const FRAME_LOG_INTERVAL: u64 = 120;
}

/// Photo encoding
pub mod photo {
    /// JPEG quality for captured stills (0-100)
    pub const JPEG_QUALITY: u8 = 92;
}

/// Application metadata
pub mod app_info {
    /// RDNN application identifier
    pub const APP_ID: &str = "io.github.cosmic_utils.viewfinder";

    /// Project repository
    pub const REPOSITORY: &str = "https://github.com/cosmic-utils/viewfinder";

    /// Marker file present inside a Flatpak sandbox
    pub const FLATPAK_INFO_PATH: &str = "/.flatpak-info";

    /// Application version derived from git at build time
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Whether we run inside a Flatpak sandbox
    pub fn is_flatpak() -> bool {
        std::path::Path::new(FLATPAK_INFO_PATH).exists()
    }

    /// "Flatpak" or "Native"
    pub fn runtime_environment() -> &'static str {
        if is_flatpak() { "Flatpak" } else { "Native" }
    }
}
