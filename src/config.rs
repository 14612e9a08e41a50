// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{app_info, zoom};
use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use cosmic::{Theme, theme};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Application theme preference
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum AppTheme {
    /// Follow system theme (dark or light based on system setting)
    #[default]
    System,
    /// Always use dark theme
    Dark,
    /// Always use light theme
    Light,
}

impl AppTheme {
    /// Get the COSMIC theme for this app theme preference
    pub fn theme(&self) -> Theme {
        match self {
            Self::Dark => {
                let mut theme = theme::system_dark();
                theme.theme_type.prefer_dark(Some(true));
                theme
            }
            Self::Light => {
                let mut theme = theme::system_light();
                theme.theme_type.prefer_dark(Some(false));
                theme
            }
            Self::System => theme::system_preference(),
        }
    }
}

#[derive(Debug, Clone, CosmicConfigEntry, PartialEq, Serialize, Deserialize)]
#[version = 1]
pub struct Config {
    /// Application theme preference (System, Dark, Light)
    pub app_theme: AppTheme,
    /// Upper zoom bound; the device limit still applies on top of it
    pub max_zoom_factor: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_theme: AppTheme::default(),
            max_zoom_factor: zoom::DEFAULT_MAX_FACTOR,
        }
    }
}

impl Config {
    /// Load the config and its handler, falling back to defaults on error
    pub fn load_with_handler() -> (Option<cosmic_config::Config>, Self) {
        match cosmic_config::Config::new(app_info::APP_ID, Self::VERSION) {
            Ok(handler) => {
                let config = match Self::get_entry(&handler) {
                    Ok(config) => config,
                    Err((errors, config)) => {
                        error!(?errors, "Errors loading config");
                        config
                    }
                };
                (Some(handler), config)
            }
            Err(err) => {
                error!(%err, "Failed to create config handler");
                (None, Self::default())
            }
        }
    }

    pub fn load() -> Self {
        Self::load_with_handler().1
    }

    /// Configured maximum, sanitised to `[MIN_FACTOR, ∞)`
    pub fn zoom_limit(&self) -> f64 {
        if self.max_zoom_factor.is_finite() {
            self.max_zoom_factor.max(zoom::MIN_FACTOR)
        } else {
            zoom::DEFAULT_MAX_FACTOR
        }
    }
}
