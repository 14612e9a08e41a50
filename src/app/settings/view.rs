// SPDX-License-Identifier: GPL-3.0-only

//! Settings drawer view

use crate::app::state::{AppModel, ContextPage, Message};
use crate::config::AppTheme;
use crate::constants::{app_info, zoom};
use crate::fl;
use cosmic::Element;
use cosmic::app::context_drawer;
use cosmic::iced::{Alignment, Length};
use cosmic::widget;

impl AppModel {
    /// Create the settings view for the context drawer
    ///
    /// Shows the theme choice and the zoom limit.
    pub fn settings_view(&self) -> context_drawer::ContextDrawer<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let theme_index = match self.config.app_theme {
            AppTheme::System => 0,
            AppTheme::Dark => 1,
            AppTheme::Light => 2,
        };
        let theme_dropdown =
            widget::dropdown(&self.theme_options, Some(theme_index), Message::SetAppTheme);

        let max_zoom = self.config.zoom_limit();
        let zoom_slider = widget::slider(
            zoom::MIN_FACTOR..=zoom::HARDWARE_MAX_FACTOR,
            max_zoom.min(zoom::HARDWARE_MAX_FACTOR),
            Message::SetMaxZoom,
        )
        .step(0.5)
        .width(Length::Fill);

        let version_info = format!(
            "Version {} ({})",
            app_info::version(),
            app_info::runtime_environment()
        );

        let settings_column: Element<'_, Message> = widget::column()
            .push(
                widget::text(fl!("appearance"))
                    .size(16)
                    .font(cosmic::font::bold()),
            )
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(theme_dropdown)
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(
                widget::row()
                    .push(
                        widget::text(fl!("max-zoom"))
                            .size(16)
                            .font(cosmic::font::bold()),
                    )
                    .push(widget::horizontal_space().width(Length::Fill))
                    .push(widget::text(fl!(
                        "max-zoom-value",
                        factor = format!("{:.1}", max_zoom)
                    )))
                    .align_y(Alignment::Center),
            )
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(zoom_slider)
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(
                widget::text(version_info)
                    .size(12)
                    .class(cosmic::theme::Text::Accent),
            )
            .spacing(0)
            .into();

        context_drawer::context_drawer(
            settings_column,
            Message::ToggleContextPage(ContextPage::Settings),
        )
        .title(fl!("settings"))
    }
}
