// SPDX-License-Identifier: GPL-3.0-only

//! Main application view
//!
//! Layers, bottom to top: preview, gesture input, focus ring, shutter,
//! status line. The captured still covers all of them once shown.

use crate::app::focus_ring::FocusRingOverlay;
use crate::app::gesture_area::GestureArea;
use crate::app::state::{AppModel, Message, SetupState};
use crate::constants::ui;
use crate::errors::{AppError, CaptureError};
use crate::fl;
use crate::pipelines::photo::CaptureLifecycle;
use cosmic::Element;
use cosmic::iced::{Background, Color, Length};
use cosmic::widget;

impl AppModel {
    /// Build the main application view
    pub fn view(&self) -> Element<'_, Message> {
        if let Some(still) = self.still.as_ref() {
            let still = widget::image(still.clone())
                .content_fit(self.preview_gravity.content_fit())
                .width(Length::Fill)
                .height(Length::Fill);
            return black_background(still.into());
        }

        let preview: Element<'_, Message> = match self.preview_handle.as_ref() {
            Some(handle) => widget::image(handle.clone())
                .content_fit(self.preview_gravity.content_fit())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => widget::Space::new(Length::Fill, Length::Fill).into(),
        };

        let gestures = GestureArea::new(self.setup == SetupState::Running);
        let focus_ring = FocusRingOverlay::new(self.focus_ring.map(|ring| ring.animation));

        let shutter_area = widget::column()
            .push(widget::Space::new(Length::Fill, Length::Fill))
            .push(self.build_shutter_button())
            .push(widget::Space::new(
                Length::Fill,
                Length::Fixed(ui::SHUTTER_CENTER_FROM_BOTTOM - ui::SHUTTER_DIAMETER / 2.0),
            ))
            .width(Length::Fill)
            .height(Length::Fill);

        let mut layers = cosmic::iced::widget::stack![preview, gestures, focus_ring, shutter_area]
            .width(Length::Fill)
            .height(Length::Fill);

        if let Some(status) = self.status_text() {
            layers = layers.push(build_status_line(status));
        }

        black_background(layers.into())
    }

    /// Text for the status line, if anything needs saying
    pub(crate) fn status_text(&self) -> Option<String> {
        if let Some(error) = self.status.as_ref() {
            return Some(error_text(error));
        }

        match self.setup {
            SetupState::WaitingForPermission => Some(fl!("waiting-for-permission")),
            SetupState::Starting => Some(fl!("starting-camera")),
            SetupState::Running if self.capture.lifecycle() == CaptureLifecycle::Capturing => {
                Some(fl!("capturing"))
            }
            SetupState::Running | SetupState::Failed => None,
        }
    }
}

fn error_text(error: &AppError) -> String {
    match error {
        AppError::Capture(CaptureError::PermissionDenied) => fl!("permission-denied"),
        AppError::Capture(CaptureError::PermissionRestricted) => fl!("permission-restricted"),
        AppError::Capture(CaptureError::DeviceUnavailable) => fl!("no-camera"),
        AppError::Capture(CaptureError::InputConstruction(e)) => {
            fl!("camera-open-failed", error = e.to_string())
        }
        AppError::Capture(CaptureError::SessionStart(e)) => {
            fl!("session-start-failed", error = e.to_string())
        }
        AppError::Photo(e) => fl!("capture-failed", error = e.to_string()),
        other => other.to_string(),
    }
}

fn build_status_line(text: String) -> Element<'static, Message> {
    let label = widget::container(widget::text(text).size(ui::STATUS_TEXT_SIZE))
        .padding([6, 12])
        .style(|_theme| widget::container::Style {
            background: Some(Background::Color(Color::from_rgba(
                0.0,
                0.0,
                0.0,
                ui::STATUS_BACKGROUND_ALPHA,
            ))),
            text_color: Some(Color::WHITE),
            border: cosmic::iced::Border {
                radius: 8.0.into(),
                ..Default::default()
            },
            ..Default::default()
        });

    widget::container(label)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding([16, 16])
        .into()
}

fn black_background(content: Element<'_, Message>) -> Element<'_, Message> {
    widget::container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_theme| widget::container::Style {
            background: Some(Background::Color(Color::BLACK)),
            ..Default::default()
        })
        .into()
}
