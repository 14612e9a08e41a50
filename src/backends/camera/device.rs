// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 capture device and its configuration lock
//!
//! Capabilities are probed once when the device is discovered. Configuration
//! happens through [`V4l2Configuration`], a guard that owns both the exclusive
//! lock and a read/write descriptor on the node; dropping it releases both.
//!
//! V4L2 has no focus/exposure region control, so points of interest only
//! switch the driver into the matching auto mode (single-shot AF, spot
//! metering) over the full frame.

use super::types::{BackendResult, ExposureMode, FocusMode, NormalizedPoint, ZoomMode};
use super::v4l2_controls::{self, ControlInfo};
use super::{CaptureDevice, DeviceConfiguration};
use crate::constants::zoom;
use crate::errors::LockError;
use std::fs::{File, OpenOptions};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};
use tracing::{debug, info};

/// Controls probed on the device node
#[derive(Debug, Clone, Default)]
pub struct V4l2Capabilities {
    /// `ZOOM_ABSOLUTE` range, if the driver zooms
    pub zoom: Option<ControlInfo>,
    /// Continuous AF toggle
    pub focus_auto: bool,
    /// Single-shot AF trigger
    pub auto_focus_start: bool,
    /// AF search range restriction
    pub auto_focus_range: bool,
    /// Auto exposure mode menu
    pub exposure_auto: bool,
    /// Metering mode menu
    pub exposure_metering: bool,
}

impl V4l2Capabilities {
    /// Probe the camera class controls on an opened node
    pub fn probe(file: &File) -> Self {
        let has = |id| v4l2_controls::available_control(file, id).is_some();

        Self {
            zoom: v4l2_controls::available_control(file, v4l2_controls::V4L2_CID_ZOOM_ABSOLUTE)
                .filter(|info| info.maximum > info.minimum),
            focus_auto: has(v4l2_controls::V4L2_CID_FOCUS_AUTO),
            auto_focus_start: has(v4l2_controls::V4L2_CID_AUTO_FOCUS_START),
            auto_focus_range: has(v4l2_controls::V4L2_CID_AUTO_FOCUS_RANGE),
            exposure_auto: has(v4l2_controls::V4L2_CID_EXPOSURE_AUTO),
            exposure_metering: has(v4l2_controls::V4L2_CID_EXPOSURE_METERING),
        }
    }
}

/// A V4L2 video capture node
pub struct V4l2Device {
    name: String,
    path: String,
    driver: String,
    capabilities: V4l2Capabilities,
    /// Current zoom factor as `f64` bits; read from GStreamer streaming threads
    zoom_bits: AtomicU64,
    config_lock: Mutex<()>,
}

impl V4l2Device {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        driver: impl Into<String>,
        capabilities: V4l2Capabilities,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            driver: driver.into(),
            capabilities,
            zoom_bits: AtomicU64::new(zoom::MIN_FACTOR.to_bits()),
            config_lock: Mutex::new(()),
        }
    }

    /// Driver name (e.g. `uvcvideo`)
    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn capabilities(&self) -> &V4l2Capabilities {
        &self.capabilities
    }

    /// Read the current hardware zoom into the cached factor
    ///
    /// Called once after discovery so a camera that was left zoomed by another
    /// application starts from its real factor.
    pub fn sync_zoom_from_hardware(&self) {
        let Some(info) = &self.capabilities.zoom else {
            return;
        };
        let Ok(file) = File::open(&self.path) else {
            return;
        };
        if let Some(raw) = v4l2_controls::get_control(&file, info.id) {
            let factor = factor_from_control(info, raw);
            self.zoom_bits.store(factor.to_bits(), Ordering::Release);
            debug!(path = %self.path, raw, factor, "Synced zoom from hardware");
        }
    }
}

/// Map a `ZOOM_ABSOLUTE` value onto a zoom factor in `1.0..=HARDWARE_MAX_FACTOR`
pub fn factor_from_control(info: &ControlInfo, raw: i32) -> f64 {
    zoom::MIN_FACTOR + info.fraction_of(raw) * (zoom::HARDWARE_MAX_FACTOR - zoom::MIN_FACTOR)
}

/// Map a zoom factor onto a `ZOOM_ABSOLUTE` value
pub fn control_from_factor(info: &ControlInfo, factor: f64) -> i32 {
    let fraction = (factor - zoom::MIN_FACTOR) / (zoom::HARDWARE_MAX_FACTOR - zoom::MIN_FACTOR);
    info.value_at(fraction)
}

impl CaptureDevice for V4l2Device {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn max_zoom_factor(&self) -> f64 {
        match self.capabilities.zoom {
            Some(_) => zoom::HARDWARE_MAX_FACTOR,
            None => zoom::DIGITAL_MAX_FACTOR,
        }
    }

    fn zoom_factor(&self) -> f64 {
        f64::from_bits(self.zoom_bits.load(Ordering::Acquire))
    }

    fn zoom_mode(&self) -> ZoomMode {
        match self.capabilities.zoom {
            Some(_) => ZoomMode::Hardware,
            None => ZoomMode::Digital,
        }
    }

    fn is_focus_point_of_interest_supported(&self) -> bool {
        self.capabilities.auto_focus_start || self.capabilities.focus_auto
    }

    fn is_exposure_point_of_interest_supported(&self) -> bool {
        self.capabilities.exposure_metering
    }

    fn is_auto_focus_range_restriction_supported(&self) -> bool {
        self.capabilities.auto_focus_range
    }

    fn lock_for_configuration(&self) -> Result<Box<dyn DeviceConfiguration + '_>, LockError> {
        let guard = match self.config_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(LockError::Busy),
            // A panic inside a previous block leaves nothing half-applied we track
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let file = OpenOptions::new().read(true).write(true).open(&self.path)?;

        Ok(Box::new(V4l2Configuration {
            device: self,
            file,
            _guard: guard,
        }))
    }
}

/// Exclusive configuration access to a [`V4l2Device`]
pub struct V4l2Configuration<'a> {
    device: &'a V4l2Device,
    file: File,
    _guard: MutexGuard<'a, ()>,
}

impl V4l2Configuration<'_> {
    fn set(&self, control_id: u32, value: i32) -> BackendResult<()> {
        v4l2_controls::set_control(&self.file, control_id, value)
    }
}

impl DeviceConfiguration for V4l2Configuration<'_> {
    fn set_zoom_factor(&mut self, factor: f64) -> BackendResult<()> {
        if let Some(info) = &self.device.capabilities.zoom {
            let raw = control_from_factor(info, factor);
            self.set(info.id, raw)?;
            debug!(factor, raw, "Applied hardware zoom");
        }
        // Digital zoom is applied by the session while copying frames
        self.device
            .zoom_bits
            .store(factor.to_bits(), Ordering::Release);
        Ok(())
    }

    fn set_focus_point_of_interest(&mut self, point: NormalizedPoint) -> BackendResult<()> {
        debug!(x = point.x, y = point.y, "Focus point of interest");
        Ok(())
    }

    fn set_focus_mode(&mut self, mode: FocusMode) -> BackendResult<()> {
        let caps = &self.device.capabilities;
        match mode {
            FocusMode::AutoFocus if caps.auto_focus_start => {
                if caps.focus_auto {
                    self.set(v4l2_controls::V4L2_CID_FOCUS_AUTO, 0)?;
                }
                self.set(v4l2_controls::V4L2_CID_AUTO_FOCUS_START, 1)?;
            }
            // UVC has no trigger; restarting continuous AF makes it search again
            FocusMode::AutoFocus if caps.focus_auto => {
                self.set(v4l2_controls::V4L2_CID_FOCUS_AUTO, 0)?;
                self.set(v4l2_controls::V4L2_CID_FOCUS_AUTO, 1)?;
            }
            FocusMode::AutoFocus => {
                debug!(?mode, "Focus mode not supported by device");
                return Ok(());
            }
        }
        info!(device = %self.device.name, ?mode, "Focus mode applied");
        Ok(())
    }

    fn set_exposure_point_of_interest(&mut self, point: NormalizedPoint) -> BackendResult<()> {
        if self.device.capabilities.exposure_metering {
            self.set(
                v4l2_controls::V4L2_CID_EXPOSURE_METERING,
                v4l2_controls::V4L2_EXPOSURE_METERING_SPOT,
            )?;
        }
        debug!(x = point.x, y = point.y, "Exposure point of interest");
        Ok(())
    }

    fn set_exposure_mode(&mut self, mode: ExposureMode) -> BackendResult<()> {
        if !self.device.capabilities.exposure_auto {
            debug!(?mode, "Exposure mode not supported by device");
            return Ok(());
        }
        let value = match mode {
            ExposureMode::ContinuousAutoExposure => v4l2_controls::V4L2_EXPOSURE_APERTURE_PRIORITY,
        };
        self.set(v4l2_controls::V4L2_CID_EXPOSURE_AUTO, value)
    }
}
