// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use viewfinder::Config;
use viewfinder::config::AppTheme;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.app_theme, AppTheme::System);
    assert_eq!(
        config.max_zoom_factor, 5.0,
        "Default zoom limit should be 5x"
    );
}

#[test]
fn test_zoom_limit_is_sanitised() {
    let mut config = Config::default();

    config.max_zoom_factor = 0.25;
    assert_eq!(config.zoom_limit(), 1.0, "Limit never drops below 1x");

    config.max_zoom_factor = f64::INFINITY;
    assert_eq!(config.zoom_limit(), 5.0, "Non-finite limits fall back");

    config.max_zoom_factor = 8.0;
    assert_eq!(config.zoom_limit(), 8.0);
}

#[test]
fn test_config_serializes() {
    let config = Config {
        app_theme: AppTheme::Dark,
        max_zoom_factor: 3.0,
    };
    let json = serde_json::to_string(&config).expect("serialize");
    let back: Config = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, config);
}
