// SPDX-License-Identifier: GPL-3.0-only

//! Tap-to-focus controller
//!
//! Screen taps arrive in the preview's coordinate space, which is upright
//! portrait. The sensor is mounted in landscape, so the point is rotated into
//! device space before it reaches the camera:
//!
//! ```text
//! nx = y / H
//! ny = 1 - x / W
//! ```

use super::CaptureDevice;
use super::types::{ExposureMode, FocusMode, NormalizedPoint};
use tracing::{debug, warn};

/// Result of a tap, used to place the focus ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusRequest {
    /// Point of interest in device space
    pub normalized_point: NormalizedPoint,
    /// Tap location in preview coordinates
    pub screen_point: (f32, f32),
}

#[derive(Debug, Clone, Default)]
pub struct FocusController {
    last_point: Option<NormalizedPoint>,
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a preview-space point into the device's normalized space
    ///
    /// Returns `None` for an empty surface or a non-finite tap.
    pub fn normalize(screen: (f32, f32), size: (f32, f32)) -> Option<NormalizedPoint> {
        let (x, y) = screen;
        let (width, height) = size;
        if !(width > 0.0 && height > 0.0) || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let nx = f64::from(y) / f64::from(height);
        let ny = 1.0 - f64::from(x) / f64::from(width);
        Some(NormalizedPoint::new(nx, ny))
    }

    /// Point most recently sent to a device
    pub fn last_point(&self) -> Option<NormalizedPoint> {
        self.last_point
    }

    /// Handle a tap on the preview
    ///
    /// Focus and exposure are each configured only if the device supports a
    /// point of interest for them. A request is returned whenever the tap maps
    /// to a valid point, so the ring is shown even when the device ignores it.
    pub fn on_tap(
        &mut self,
        screen: (f32, f32),
        size: (f32, f32),
        device: Option<&dyn CaptureDevice>,
    ) -> Option<FocusRequest> {
        let normalized_point = Self::normalize(screen, size)?;
        let request = FocusRequest {
            normalized_point,
            screen_point: screen,
        };

        let Some(device) = device else {
            debug!("Tap with no active device");
            return Some(request);
        };

        let focus = device.is_focus_point_of_interest_supported();
        let exposure = device.is_exposure_point_of_interest_supported();
        if !focus && !exposure {
            debug!(device = %device.name(), "Device has no point of interest support");
            return Some(request);
        }

        let mut config = match device.lock_for_configuration() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to lock device for focus");
                return Some(request);
            }
        };

        if focus {
            let applied = config
                .set_focus_point_of_interest(normalized_point)
                .and_then(|()| config.set_focus_mode(FocusMode::AutoFocus));
            match applied {
                Ok(()) => self.last_point = Some(normalized_point),
                Err(e) => warn!(error = %e, "Failed to apply focus point"),
            }
        }

        if exposure {
            let applied = config
                .set_exposure_point_of_interest(normalized_point)
                .and_then(|()| config.set_exposure_mode(ExposureMode::ContinuousAutoExposure));
            if let Err(e) = applied {
                warn!(error = %e, "Failed to apply exposure point");
            }
        }

        debug!(
            x = normalized_point.x,
            y = normalized_point.y,
            focus,
            exposure,
            "Point of interest set"
        );
        Some(request)
    }
}
