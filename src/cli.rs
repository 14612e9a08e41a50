// SPDX-License-Identifier: GPL-3.0-only

//! `viewfinder info`: report the default camera without opening a window

use serde::Serialize;
use viewfinder::backends::camera::{CameraBackend, CaptureDevice, V4l2Backend, ZoomMode};
use viewfinder::backends::permission::{
    AuthorizationStatus, PermissionAuthority, PortalAuthority,
};
use viewfinder::config::Config;
use viewfinder::constants::{app_info, zoom};

/// Everything `info` prints
#[derive(Debug, Serialize)]
pub struct DeviceReport {
    pub version: &'static str,
    pub runtime: &'static str,
    pub authorization: AuthorizationStatus,
    pub device: Option<DeviceSummary>,
}

#[derive(Debug, Serialize)]
pub struct DeviceSummary {
    pub name: String,
    pub path: String,
    pub zoom_mode: String,
    pub min_zoom_factor: f64,
    /// Effective limit: the smaller of the device and configured maxima
    pub max_zoom_factor: f64,
    pub device_max_zoom_factor: f64,
    pub focus_point_of_interest: bool,
    pub exposure_point_of_interest: bool,
    pub auto_focus_range_restriction: bool,
}

impl DeviceSummary {
    fn from_device(device: &dyn CaptureDevice, configured_max: f64) -> Self {
        let device_max = device.max_zoom_factor();
        Self {
            name: device.name().to_string(),
            path: device.path().to_string(),
            zoom_mode: match device.zoom_mode() {
                ZoomMode::Hardware => "hardware".to_string(),
                ZoomMode::Digital => "digital".to_string(),
            },
            min_zoom_factor: zoom::MIN_FACTOR,
            max_zoom_factor: configured_max.min(device_max).max(zoom::MIN_FACTOR),
            device_max_zoom_factor: device_max,
            focus_point_of_interest: device.is_focus_point_of_interest_supported(),
            exposure_point_of_interest: device.is_exposure_point_of_interest_supported(),
            auto_focus_range_restriction: device.is_auto_focus_range_restriction_supported(),
        }
    }
}

/// Print the default camera report
pub fn print_info(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let authorization = PortalAuthority::new().authorization_status();
    let configured_max = Config::load().max_zoom_factor;
    let device = V4l2Backend::new()
        .default_device()
        .map(|device| DeviceSummary::from_device(device.as_ref(), configured_max));

    let report = DeviceReport {
        version: app_info::version(),
        runtime: app_info::runtime_environment(),
        authorization,
        device,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("viewfinder {} ({})", report.version, report.runtime);
    println!("Camera access: {}", report.authorization);
    println!();

    let Some(device) = report.device else {
        println!("No camera found.");
        return Ok(());
    };

    let yes_no = |supported: bool| if supported { "yes" } else { "no" };
    println!("  {}", device.name);
    println!("      Path: {}", device.path);
    println!(
        "      Zoom: {:.1}x - {:.1}x ({}, device max {:.1}x)",
        device.min_zoom_factor,
        device.max_zoom_factor,
        device.zoom_mode,
        device.device_max_zoom_factor
    );
    println!(
        "      Focus point of interest: {}",
        yes_no(device.focus_point_of_interest)
    );
    println!(
        "      Exposure point of interest: {}",
        yes_no(device.exposure_point_of_interest)
    );
    println!(
        "      Auto-focus range restriction: {}",
        yes_no(device.auto_focus_range_restriction)
    );

    Ok(())
}
