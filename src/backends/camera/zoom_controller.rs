// SPDX-License-Identifier: GPL-3.0-only

//! Pinch-to-zoom controller
//!
//! Zoom is relative to the factor captured when a pinch begins, so a second
//! pinch continues from where the first one left off instead of snapping back.

use super::CaptureDevice;
use crate::constants::zoom;
use crate::errors::AppError;
use tracing::{debug, trace, warn};

/// Zoom bookkeeping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    /// Factor last successfully applied to the device
    pub current_factor: f64,
    pub min_factor: f64,
    /// Application-level cap, before the device limit is applied
    pub max_factor: f64,
    /// Factor captured at gesture begin; `None` outside a gesture
    pub gesture_baseline: Option<f64>,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            current_factor: zoom::MIN_FACTOR,
            min_factor: zoom::MIN_FACTOR,
            max_factor: zoom::DEFAULT_MAX_FACTOR,
            gesture_baseline: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ZoomController {
    state: ZoomState,
}

impl ZoomController {
    pub fn new(max_factor: f64) -> Self {
        let mut controller = Self::default();
        controller.set_max_factor(max_factor);
        controller
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    pub fn current_factor(&self) -> f64 {
        self.state.current_factor
    }

    pub fn is_gesture_active(&self) -> bool {
        self.state.gesture_baseline.is_some()
    }

    /// Change the application cap; values below the minimum are raised to it
    ///
    /// The current factor is pulled down to the new cap. Callers with a
    /// running device follow up with [`sync_with_device`](Self::sync_with_device)
    /// so the device matches.
    pub fn set_max_factor(&mut self, max_factor: f64) {
        self.state.max_factor = if max_factor.is_finite() {
            max_factor.max(self.state.min_factor)
        } else {
            zoom::DEFAULT_MAX_FACTOR
        };
        self.state.current_factor = self
            .state
            .current_factor
            .clamp(self.state.min_factor, self.state.max_factor);
    }

    /// Effective upper bound for `device`
    pub fn effective_max(&self, device: &dyn CaptureDevice) -> f64 {
        self.state
            .max_factor
            .min(device.max_zoom_factor())
            .max(self.state.min_factor)
    }

    /// Clamp a raw factor into `[min, min(max, device max)]`
    pub fn clamp_factor(&self, factor: f64, device: &dyn CaptureDevice) -> f64 {
        factor.clamp(self.state.min_factor, self.effective_max(device))
    }

    /// Adopt the device's zoom factor, pulling it into bounds first
    ///
    /// A device left outside the bounds (another application zoomed it, or
    /// the cap was lowered) is moved back inside under the configuration
    /// lock. Without a device the state falls back to the minimum. Returns
    /// the factor now tracked.
    pub fn sync_with_device(&mut self, device: Option<&dyn CaptureDevice>) -> f64 {
        let Some(device) = device else {
            self.state.current_factor = self.state.min_factor;
            self.state.gesture_baseline = None;
            return self.state.current_factor;
        };

        let reported = device.zoom_factor();
        let factor = if reported.is_finite() {
            self.clamp_factor(reported, device)
        } else {
            self.state.min_factor
        };
        if factor != reported {
            debug!(reported, factor, "Device zoom outside bounds");
            if let Err(e) = apply(device, factor) {
                warn!(error = %e, factor, "Failed to pull device zoom into bounds");
            }
        }
        self.state.current_factor = factor;
        factor
    }

    /// Pinch began: capture the baseline from the device
    pub fn on_gesture_begin(&mut self, device: Option<&dyn CaptureDevice>) {
        if device.is_none() {
            debug!("Zoom gesture began with no active device");
            return;
        }
        let baseline = self.sync_with_device(device);
        self.state.gesture_baseline = Some(baseline);
        debug!(baseline, "Zoom gesture began");
    }

    /// Pinch changed by `scale` relative to its starting distance
    ///
    /// Returns the factor now applied to the device, or `None` when nothing
    /// changed. Lock or apply failures leave the factor as it was.
    pub fn on_gesture_update(
        &mut self,
        scale: f64,
        device: Option<&dyn CaptureDevice>,
    ) -> Option<f64> {
        let Some(device) = device else {
            debug!("Zoom gesture update with no active device");
            return None;
        };
        if !scale.is_finite() || scale <= 0.0 {
            debug!(scale, "Ignoring invalid pinch scale");
            return None;
        }

        // An update without a begin (e.g. wheel zoom) starts from the device factor
        let baseline = *self
            .state
            .gesture_baseline
            .get_or_insert_with(|| device.zoom_factor());
        let factor = self.clamp_factor(baseline * scale, device);

        if let Err(e) = apply(device, factor) {
            warn!(error = %e, factor, "Failed to apply zoom");
            return None;
        }

        trace!(baseline, scale, factor, "Zoom applied");
        self.state.current_factor = factor;
        Some(factor)
    }

    /// Pinch ended; the next gesture captures a fresh baseline
    pub fn on_gesture_end(&mut self) {
        if let Some(baseline) = self.state.gesture_baseline.take() {
            debug!(
                baseline,
                factor = self.state.current_factor,
                "Zoom gesture ended"
            );
        }
    }

    /// One-shot relative zoom, used for wheel input
    pub fn zoom_by(&mut self, scale: f64, device: Option<&dyn CaptureDevice>) -> Option<f64> {
        self.on_gesture_begin(device);
        let applied = self.on_gesture_update(scale, device);
        self.on_gesture_end();
        applied
    }
}

/// Set `factor` on the device inside one configuration block
fn apply(device: &dyn CaptureDevice, factor: f64) -> Result<(), AppError> {
    let mut config = device.lock_for_configuration()?;
    config.set_zoom_factor(factor)?;
    Ok(())
}
