// SPDX-License-Identifier: GPL-3.0-only

//! Shutter control

use crate::app::state::{AppModel, Message};
use crate::constants::ui;
use crate::pipelines::photo::CaptureLifecycle;
use cosmic::Element;
use cosmic::iced::{Background, Border, Color, Length};
use cosmic::widget;

impl AppModel {
    /// Whether a shutter press would start a capture
    pub(crate) fn shutter_enabled(&self) -> bool {
        self.capture.lifecycle() == CaptureLifecycle::Previewing && self.session.is_running()
    }

    /// Build the shutter: a white ring with a transparent centre
    ///
    /// The ring is inert while a capture is in flight or no session runs.
    pub fn build_shutter_button(&self) -> Element<'_, Message> {
        let enabled = self.shutter_enabled();
        let ring_color = if enabled {
            Color::WHITE
        } else {
            Color::from_rgba(1.0, 1.0, 1.0, 0.4)
        };

        let ring = widget::container(widget::Space::new(
            Length::Fixed(ui::SHUTTER_DIAMETER),
            Length::Fixed(ui::SHUTTER_DIAMETER),
        ))
        .style(move |_theme| widget::container::Style {
            background: Some(Background::Color(Color::TRANSPARENT)),
            border: Border {
                color: ring_color,
                width: ui::SHUTTER_BORDER_WIDTH,
                radius: (ui::SHUTTER_DIAMETER / 2.0).into(),
            },
            ..Default::default()
        });

        let button = widget::button::custom(ring)
            .padding(0)
            .width(Length::Fixed(ui::SHUTTER_DIAMETER))
            .height(Length::Fixed(ui::SHUTTER_DIAMETER))
            .class(cosmic::theme::Button::Text);

        let button = if enabled {
            button.on_press(Message::Capture)
        } else {
            button
        };

        widget::container(button)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }
}
