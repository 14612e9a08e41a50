// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! The capture stack is split along the same seams as the platform APIs it
//! wraps, so that the session manager and the gesture controllers can be
//! exercised against fakes.
//!
//! ```text
//! ┌───────────────────────┐
//! │   UI Layer (App)      │
//! └───┬───────────┬───────┘
//!     │           │ gestures
//!     ▼           ▼
//! ┌────────────┐ ┌─────────────────────────┐
//! │ Capture    │ │ ZoomController          │
//! │ Session    │ │ FocusController         │
//! │ Manager    │ └───────────┬─────────────┘
//! └───┬────────┘             │ lock_for_configuration()
//!     │                      ▼
//!     │ CameraBackend   ┌──────────────┐
//!     ├───────────────► │CaptureDevice │  ← V4L2 node
//!     │                 └──────────────┘
//!     ▼
//! ┌──────────────────┐  ┌──────────────┐
//! │ CaptureSession   │─►│ PhotoOutput  │  ← GStreamer tee branch
//! └──────────────────┘  └──────────────┘
//! ```

pub mod device;
pub mod focus_controller;
pub mod manager;
pub mod registry;
pub mod session;
pub mod types;
pub mod v4l2_controls;
pub mod zoom_controller;

pub use device::V4l2Device;
pub use focus_controller::{FocusController, FocusRequest};
pub use manager::{CaptureSessionManager, PreviewSurface};
pub use registry::V4l2Backend;
pub use types::*;
pub use zoom_controller::{ZoomController, ZoomState};

use crate::errors::{LockError, PhotoError};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Source of capture devices and session building blocks
///
/// A backend hands out the default device, wraps it in a session input, and
/// creates sessions and photo outputs. It never owns a running session; that
/// is the job of [`CaptureSessionManager`].
pub trait CameraBackend: Send + Sync + 'static {
    /// Session type produced by this backend
    type Session: CaptureSession;

    /// The system default video capture device, if any
    fn default_device(&self) -> Option<Arc<dyn CaptureDevice>>;

    /// Construct a session input reading from `device`
    ///
    /// Fails when the device node is gone or access to it was revoked.
    fn device_input(
        &self,
        device: &Arc<dyn CaptureDevice>,
    ) -> BackendResult<<Self::Session as CaptureSession>::Input>;

    /// Create an empty, stopped session
    fn new_session(&self) -> BackendResult<Self::Session>;

    /// Create a detached photo output
    fn photo_output(&self) -> BackendResult<<Self::Session as CaptureSession>::Output>;
}

/// A camera pipeline connecting one input to a preview and optional outputs
pub trait CaptureSession: Send {
    /// Device input type accepted by this session
    type Input: Send;
    /// Photo output type accepted by this session
    type Output: PhotoOutput + Clone + 'static;

    /// Whether `input` may be added
    fn can_add_input(&self, input: &Self::Input) -> bool;

    /// Add the input; callers check [`can_add_input`](Self::can_add_input) first
    fn add_input(&mut self, input: Self::Input) -> BackendResult<()>;

    /// Whether `output` may be added
    fn can_add_output(&self, output: &Self::Output) -> bool;

    /// Add the output; callers check [`can_add_output`](Self::can_add_output) first
    fn add_output(&mut self, output: Self::Output) -> BackendResult<()>;

    /// Detach an output; pending captures on it fail
    fn remove_output(&mut self, output: &Self::Output);

    /// Take the preview frame stream (available once per session)
    fn take_preview_frames(&mut self) -> Option<FrameReceiver>;

    /// Start streaming; idempotent
    fn start_running(&mut self) -> BackendResult<()>;

    /// Stop streaming; idempotent
    fn stop_running(&mut self);

    fn is_running(&self) -> bool;
}

/// A physical capture device and its capabilities
pub trait CaptureDevice: Send + Sync {
    /// Human readable device name
    fn name(&self) -> &str;

    /// Device node path (e.g. `/dev/video0`)
    fn path(&self) -> &str;

    /// Largest zoom factor the device can realise
    fn max_zoom_factor(&self) -> f64;

    /// Zoom factor last applied to the device
    fn zoom_factor(&self) -> f64;

    fn zoom_mode(&self) -> ZoomMode;

    fn is_focus_point_of_interest_supported(&self) -> bool;

    fn is_exposure_point_of_interest_supported(&self) -> bool;

    fn is_auto_focus_range_restriction_supported(&self) -> bool;

    /// Acquire exclusive configuration access
    ///
    /// The returned guard releases the lock when dropped, so the lock is
    /// released on every path out of a configuration block. Never blocks: a
    /// held lock yields [`LockError::Busy`].
    fn lock_for_configuration(&self) -> Result<Box<dyn DeviceConfiguration + '_>, LockError>;
}

/// Scoped exclusive access to a device's configuration
///
/// Only obtainable from [`CaptureDevice::lock_for_configuration`].
pub trait DeviceConfiguration {
    fn set_zoom_factor(&mut self, factor: f64) -> BackendResult<()>;

    fn set_focus_point_of_interest(&mut self, point: NormalizedPoint) -> BackendResult<()>;

    fn set_focus_mode(&mut self, mode: FocusMode) -> BackendResult<()>;

    fn set_exposure_point_of_interest(&mut self, point: NormalizedPoint) -> BackendResult<()>;

    fn set_exposure_mode(&mut self, mode: ExposureMode) -> BackendResult<()>;
}

/// Still image sink attached to a session
pub trait PhotoOutput: Send + Sync {
    /// Request a capture
    ///
    /// The receiver completes exactly once, with the encoded photo or an
    /// error. A dropped sender means the capture was abandoned.
    fn capture_photo(
        &self,
        settings: PhotoSettings,
    ) -> oneshot::Receiver<Result<EncodedPhoto, PhotoError>>;

    /// Whether the output is attached to a session
    fn is_attached(&self) -> bool;
}
