// SPDX-License-Identifier: GPL-3.0-only

//! Context drawer, link and settings handlers

use crate::app::state::{AppModel, ContextPage, Message};
use crate::config::{AppTheme, Config};
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use tracing::{error, info};

impl AppModel {
    pub(crate) fn handle_launch_url(&self, url: String) -> Task<cosmic::Action<Message>> {
        if let Err(err) = open::that_detached(&url) {
            error!(url = %url, error = %err, "Failed to open URL");
        }
        Task::none()
    }

    pub(crate) fn handle_toggle_context_page(
        &mut self,
        context_page: ContextPage,
    ) -> Task<cosmic::Action<Message>> {
        if self.context_page == context_page {
            self.core.window.show_context = !self.core.window.show_context;
        } else {
            self.context_page = context_page;
            self.core.window.show_context = true;
        }
        Task::none()
    }

    pub(crate) fn handle_update_config(&mut self, config: Config) -> Task<cosmic::Action<Message>> {
        info!("UpdateConfig received");
        let theme_changed = config.app_theme != self.config.app_theme;
        self.config = config;
        self.apply_zoom_limit();

        if theme_changed {
            cosmic::command::set_theme(self.config.app_theme.theme())
        } else {
            Task::none()
        }
    }

    pub(crate) fn handle_set_app_theme(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        let app_theme = match index {
            0 => AppTheme::System,
            1 => AppTheme::Dark,
            2 => AppTheme::Light,
            _ => return Task::none(),
        };

        info!(?app_theme, "Setting application theme");
        self.config.app_theme = app_theme;
        self.save_config();

        cosmic::command::set_theme(app_theme.theme())
    }

    pub(crate) fn handle_set_max_zoom(&mut self, factor: f64) -> Task<cosmic::Action<Message>> {
        info!(factor, "Setting zoom limit");
        self.config.max_zoom_factor = factor;
        self.apply_zoom_limit();
        self.save_config();
        Task::none()
    }

    /// Apply the configured cap, pulling a running device back under it
    fn apply_zoom_limit(&mut self) {
        self.zoom.set_max_factor(self.config.zoom_limit());
        if let Some(device) = self.session.running_device() {
            self.zoom.sync_with_device(Some(device.as_ref()));
        }
    }

    fn save_config(&self) {
        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, "Failed to save settings");
        }
    }
}
