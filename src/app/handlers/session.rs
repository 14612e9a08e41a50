// SPDX-License-Identifier: GPL-3.0-only

//! Permission gate, session start and preview frame handlers

use crate::app::state::{AppModel, Message, SetupState};
use crate::backends::camera::types::CameraFrame;
use crate::backends::permission::{GateDecision, refusal_error};
use crate::errors::CaptureError;
use cosmic::Task;
use cosmic::widget::image::Handle;
use std::sync::Arc;
use tracing::{debug, info, warn};

impl AppModel {
    // =========================================================================
    // Permission
    // =========================================================================

    /// Run the permission gate; starts the session when already authorized
    pub(crate) fn check_permission(&mut self) -> Task<cosmic::Action<Message>> {
        match self.permission.check_and_request_permission() {
            GateDecision::Granted => {
                self.start_session();
                Task::none()
            }
            GateDecision::Pending(request) => {
                self.setup = SetupState::WaitingForPermission;
                Task::perform(request, |granted| {
                    cosmic::Action::App(Message::PermissionResolved(granted))
                })
            }
            GateDecision::Refused(status) => {
                self.fail_setup(refusal_error(status));
                Task::none()
            }
        }
    }

    pub(crate) fn handle_permission_resolved(
        &mut self,
        granted: bool,
    ) -> Task<cosmic::Action<Message>> {
        if granted {
            info!("Camera access granted");
            self.start_session();
        } else {
            info!("Camera access not granted");
            self.fail_setup(CaptureError::PermissionDenied);
        }
        Task::none()
    }

    // =========================================================================
    // Session
    // =========================================================================

    fn start_session(&mut self) {
        self.setup = SetupState::Starting;
        match self.session.start_session() {
            Ok(surface) => {
                self.preview_gravity = surface.gravity;
                self.preview.replace(surface.frames);
                let device = self.session.running_device();
                self.zoom.sync_with_device(device.as_deref());
                self.setup = SetupState::Running;
                self.status = None;
            }
            Err(e) => self.fail_setup(e),
        }
    }

    fn fail_setup(&mut self, error: CaptureError) {
        warn!(error = %error, "Camera setup ended");
        self.setup = SetupState::Failed;
        self.status = Some(error.into());
    }

    // =========================================================================
    // Preview
    // =========================================================================

    pub(crate) fn handle_preview_frame(
        &mut self,
        frame: Arc<CameraFrame>,
    ) -> Task<cosmic::Action<Message>> {
        // Late frames after the still replaced the preview
        if self.still.is_some() {
            return Task::none();
        }
        self.preview_handle = Some(Handle::from_rgba(
            frame.width,
            frame.height,
            frame.packed_rgba(),
        ));
        Task::none()
    }

    pub(crate) fn handle_preview_ended(
        &mut self,
        generation: u64,
    ) -> Task<cosmic::Action<Message>> {
        if generation == self.preview.generation && self.session.is_running() {
            warn!(generation, "Preview stream ended while the session is running");
        } else {
            debug!(generation, "Preview stream ended");
        }
        Task::none()
    }
}
