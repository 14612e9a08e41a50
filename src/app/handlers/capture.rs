// SPDX-License-Identifier: GPL-3.0-only

//! Shutter handlers

use crate::app::state::{AppModel, Message};
use crate::errors::PhotoError;
use crate::pipelines::photo::{CaptureOutcome, CapturedImage};
use cosmic::Task;
use cosmic::widget::image::Handle;
use tracing::info;

impl AppModel {
    pub(crate) fn handle_capture(&mut self) -> Task<cosmic::Action<Message>> {
        let output = self.session.photo_output();
        let Some(request) = self.capture.capture(output.as_ref()) else {
            return Task::none();
        };

        self.status = None;
        Task::perform(request, |result| {
            cosmic::Action::App(Message::CaptureFinished(result))
        })
    }

    pub(crate) fn handle_capture_finished(
        &mut self,
        result: Result<CapturedImage, PhotoError>,
    ) -> Task<cosmic::Action<Message>> {
        match self.capture.finish(result, &mut self.session) {
            CaptureOutcome::Still(image) => {
                info!(
                    width = image.width,
                    height = image.height,
                    bytes = image.encoded.len(),
                    "Showing captured still"
                );
                self.still = Some(Handle::from_rgba(image.width, image.height, image.rgba));
                self.preview_handle = None;
                self.focus_ring = None;
                self.zoom.on_gesture_end();
            }
            CaptureOutcome::Failed(e) => {
                self.status = Some(e.into());
            }
            CaptureOutcome::Ignored => {}
        }
        Task::none()
    }
}
