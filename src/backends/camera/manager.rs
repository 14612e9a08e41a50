// SPDX-License-Identifier: GPL-3.0-only

//! Capture session lifecycle manager
//!
//! The manager owns the one capture session of the application. Nothing else
//! can reach the session directly: callers start and stop it, and borrow the
//! running device or photo output, both of which are only handed out while the
//! session is running.

use super::types::*;
use super::{CameraBackend, CaptureDevice, CaptureSession, PhotoOutput};
use crate::errors::CaptureError;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Live preview bound to a running session
#[derive(Debug)]
pub struct PreviewSurface {
    /// Frame stream; `None` when the session already handed it out
    pub frames: Option<FrameReceiver>,
    /// How frames are scaled into the display surface
    pub gravity: VideoGravity,
}

/// Session state, present only after a successful start
struct ActiveSession<S: CaptureSession> {
    session: S,
    device: Arc<dyn CaptureDevice>,
    output: Option<S::Output>,
}

/// Capture session manager
///
/// Generic over the backend so the same lifecycle runs against V4L2/GStreamer
/// and against test doubles.
pub struct CaptureSessionManager<B: CameraBackend> {
    backend: B,
    active: Option<ActiveSession<B::Session>>,
}

impl<B: CameraBackend> CaptureSessionManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build and start the session
    ///
    /// Selects the default device, wraps it in an input, adds input and photo
    /// output when the session accepts them, binds an aspect-fill preview, and
    /// starts streaming. A refused input or output is logged and setup carries
    /// on; the session runs with whatever it accepted.
    pub fn start_session(&mut self) -> Result<PreviewSurface, CaptureError> {
        if self.is_running() {
            warn!("Capture session already running; restarting");
            self.stop_session();
        }

        let device = self.backend.default_device().ok_or_else(|| {
            error!("No default video capture device");
            CaptureError::DeviceUnavailable
        })?;
        info!(device = %device.name(), path = %device.path(), "Starting capture session");

        let input = self.backend.device_input(&device).map_err(|e| {
            error!(device = %device.name(), error = %e, "Failed to create device input");
            CaptureError::InputConstruction(e)
        })?;

        let mut session = self.backend.new_session().map_err(|e| {
            error!(error = %e, "Failed to create capture session");
            CaptureError::SessionStart(e)
        })?;

        if session.can_add_input(&input) {
            if let Err(e) = session.add_input(input) {
                warn!(error = %e, "Session rejected device input");
            }
        } else {
            warn!("Session cannot accept device input");
        }

        let output = match self.backend.photo_output() {
            Ok(output) if session.can_add_output(&output) => {
                match session.add_output(output.clone()) {
                    Ok(()) => Some(output),
                    Err(e) => {
                        warn!(error = %e, "Session rejected photo output");
                        None
                    }
                }
            }
            Ok(_) => {
                warn!("Session cannot accept photo output");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to create photo output");
                None
            }
        };

        let surface = PreviewSurface {
            frames: session.take_preview_frames(),
            gravity: VideoGravity::ResizeAspectFill,
        };

        session.start_running().map_err(|e| {
            error!(error = %e, "Failed to start capture session");
            CaptureError::SessionStart(e)
        })?;

        info!(
            device = %device.name(),
            photo_output = output.is_some(),
            "Capture session started"
        );

        self.active = Some(ActiveSession {
            session,
            device,
            output,
        });

        Ok(surface)
    }

    /// Stop streaming, detach the photo output and release the device
    ///
    /// Safe to call when nothing is running.
    pub fn stop_session(&mut self) {
        let Some(mut active) = self.active.take() else {
            debug!("No capture session to stop");
            return;
        };

        active.session.stop_running();
        if let Some(output) = active.output.take() {
            active.session.remove_output(&output);
        }
        info!(device = %active.device.name(), "Capture session stopped");
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.session.is_running())
    }

    /// Device of the running session
    pub fn running_device(&self) -> Option<Arc<dyn CaptureDevice>> {
        self.active
            .as_ref()
            .filter(|active| active.session.is_running())
            .map(|active| Arc::clone(&active.device))
    }

    /// Attached photo output of the running session
    pub fn photo_output(&self) -> Option<<B::Session as CaptureSession>::Output> {
        self.active
            .as_ref()
            .filter(|active| active.session.is_running())
            .and_then(|active| active.output.clone())
            .filter(|output| output.is_attached())
    }
}

impl<B: CameraBackend> Drop for CaptureSessionManager<B> {
    fn drop(&mut self) {
        self.stop_session();
    }
}

impl<B: CameraBackend> std::fmt::Debug for CaptureSessionManager<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSessionManager")
            .field("running", &self.is_running())
            .field(
                "device",
                &self.active.as_ref().map(|active| active.device.name().to_string()),
            )
            .finish()
    }
}
