// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 camera control interface
//!
//! Raw `VIDIOC_QUERYCTRL` / `VIDIOC_G_CTRL` / `VIDIOC_S_CTRL` wrappers for the
//! zoom, focus and metering controls. All functions take an already opened
//! device file so a configuration block issues every ioctl through the one
//! descriptor it holds.
//!
//! Inspired by [cameractrls](https://github.com/soyersoyer/cameractrls).

use super::types::{BackendError, BackendResult};
use std::fs::File;
use std::os::unix::io::AsRawFd;
use tracing::{debug, warn};

// ===== V4L2 Control Class Bases =====
const V4L2_CTRL_CLASS_CAMERA: u32 = 0x009a0000;
const V4L2_CID_CAMERA_CLASS_BASE: u32 = V4L2_CTRL_CLASS_CAMERA | 0x900;

// ===== V4L2 Control IDs (Camera Class) =====

/// Exposure mode: Auto, Manual, Shutter Priority, Aperture Priority
pub const V4L2_CID_EXPOSURE_AUTO: u32 = V4L2_CID_CAMERA_CLASS_BASE + 1;
/// Continuous auto focus enable
pub const V4L2_CID_FOCUS_AUTO: u32 = V4L2_CID_CAMERA_CLASS_BASE + 12;
/// Absolute zoom position
pub const V4L2_CID_ZOOM_ABSOLUTE: u32 = V4L2_CID_CAMERA_CLASS_BASE + 13;
/// Exposure metering mode
pub const V4L2_CID_EXPOSURE_METERING: u32 = V4L2_CID_CAMERA_CLASS_BASE + 25;
/// Trigger a single auto focus run (button control)
pub const V4L2_CID_AUTO_FOCUS_START: u32 = V4L2_CID_CAMERA_CLASS_BASE + 28;
/// Restrict the auto focus search range (menu control)
pub const V4L2_CID_AUTO_FOCUS_RANGE: u32 = V4L2_CID_CAMERA_CLASS_BASE + 31;

// ===== V4L2 Exposure Auto Menu Values =====

/// Auto exposure time, manual iris (the auto mode UVC cameras implement)
pub const V4L2_EXPOSURE_APERTURE_PRIORITY: i32 = 3;

// ===== V4L2 Exposure Metering Menu Values =====

/// Spot metering on the point of interest
pub const V4L2_EXPOSURE_METERING_SPOT: i32 = 2;

// ===== V4L2 Control Types =====
const V4L2_CTRL_TYPE_INTEGER: u32 = 1;
const V4L2_CTRL_TYPE_BOOLEAN: u32 = 2;
const V4L2_CTRL_TYPE_MENU: u32 = 3;
const V4L2_CTRL_TYPE_BUTTON: u32 = 4;

// ===== V4L2 Control Flags =====
const V4L2_CTRL_FLAG_DISABLED: u32 = 0x0001;
const V4L2_CTRL_FLAG_INACTIVE: u32 = 0x0010;

// ===== V4L2 ioctl Numbers =====
// Calculated as: (dir << 30) | (size << 16) | ('V' << 8) | nr
// where dir: 2=READ, 1=WRITE, 3=READ|WRITE

/// Get control value (v4l2_control: 8 bytes)
const VIDIOC_G_CTRL: libc::c_ulong = 0xC008561B;
/// Set control value (v4l2_control: 8 bytes)
const VIDIOC_S_CTRL: libc::c_ulong = 0xC008561C;
/// Query control info (v4l2_queryctrl: 68 bytes)
const VIDIOC_QUERYCTRL: libc::c_ulong = 0xC0445624;

// ===== V4L2 ioctl Structures =====

#[repr(C)]
struct V4l2Control {
    id: u32,
    value: i32,
}

#[repr(C)]
struct V4l2Queryctrl {
    id: u32,
    ctrl_type: u32,
    name: [u8; 32],
    minimum: i32,
    maximum: i32,
    step: i32,
    default_value: i32,
    flags: u32,
    reserved: [u32; 2],
}

// ===== Public Types =====

/// Information about a V4L2 control
#[derive(Debug, Clone)]
pub struct ControlInfo {
    pub id: u32,
    pub name: String,
    pub ctrl_type: ControlType,
    pub minimum: i32,
    pub maximum: i32,
    pub step: i32,
    pub default_value: i32,
    pub flags: u32,
}

/// V4L2 control type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlType {
    Integer,
    Boolean,
    Menu,
    Button,
    Unknown(u32),
}

impl From<u32> for ControlType {
    fn from(value: u32) -> Self {
        match value {
            V4L2_CTRL_TYPE_INTEGER => ControlType::Integer,
            V4L2_CTRL_TYPE_BOOLEAN => ControlType::Boolean,
            V4L2_CTRL_TYPE_MENU => ControlType::Menu,
            V4L2_CTRL_TYPE_BUTTON => ControlType::Button,
            other => ControlType::Unknown(other),
        }
    }
}

impl ControlInfo {
    /// Check if control is disabled
    pub fn is_disabled(&self) -> bool {
        self.flags & V4L2_CTRL_FLAG_DISABLED != 0
    }

    /// Check if control is inactive (value cannot be changed right now)
    pub fn is_inactive(&self) -> bool {
        self.flags & V4L2_CTRL_FLAG_INACTIVE != 0
    }

    /// Map a fraction in `[0, 1]` onto the control range, snapped to `step`
    pub fn value_at(&self, fraction: f64) -> i32 {
        let fraction = fraction.clamp(0.0, 1.0);
        let span = (self.maximum as i64 - self.minimum as i64) as f64;
        let mut offset = (span * fraction).round() as i64;
        if self.step > 1 {
            let step = self.step as i64;
            offset = (offset + step / 2) / step * step;
        }
        (self.minimum as i64 + offset).clamp(self.minimum as i64, self.maximum as i64) as i32
    }

    /// Position of `value` within the control range as a fraction in `[0, 1]`
    pub fn fraction_of(&self, value: i32) -> f64 {
        let span = self.maximum as f64 - self.minimum as f64;
        if span <= 0.0 {
            return 0.0;
        }
        ((value as f64 - self.minimum as f64) / span).clamp(0.0, 1.0)
    }
}

/// Extract a null-terminated string from a fixed-size byte array
fn extract_name(bytes: &[u8; 32]) -> String {
    let name_len = bytes.iter().position(|&c| c == 0).unwrap_or(32);
    String::from_utf8_lossy(&bytes[..name_len]).to_string()
}

// ===== Public Functions =====

/// Query if a control exists and get its information
pub fn query_control(file: &File, control_id: u32) -> Option<ControlInfo> {
    let mut qctrl = V4l2Queryctrl {
        id: control_id,
        ctrl_type: 0,
        name: [0; 32],
        minimum: 0,
        maximum: 0,
        step: 0,
        default_value: 0,
        flags: 0,
        reserved: [0; 2],
    };

    // SAFETY: qctrl matches the kernel's struct v4l2_queryctrl layout and outlives the call
    let result = unsafe {
        libc::ioctl(
            file.as_raw_fd(),
            VIDIOC_QUERYCTRL,
            &mut qctrl as *mut V4l2Queryctrl,
        )
    };

    if result < 0 {
        return None;
    }

    Some(ControlInfo {
        id: qctrl.id,
        name: extract_name(&qctrl.name),
        ctrl_type: qctrl.ctrl_type.into(),
        minimum: qctrl.minimum,
        maximum: qctrl.maximum,
        step: qctrl.step,
        default_value: qctrl.default_value,
        flags: qctrl.flags,
    })
}

/// Query a control, treating disabled controls as absent
pub fn available_control(file: &File, control_id: u32) -> Option<ControlInfo> {
    query_control(file, control_id).filter(|info| !info.is_disabled())
}

/// Get current value of a control
pub fn get_control(file: &File, control_id: u32) -> Option<i32> {
    let mut ctrl = V4l2Control {
        id: control_id,
        value: 0,
    };

    // SAFETY: ctrl matches struct v4l2_control and outlives the call
    let result =
        unsafe { libc::ioctl(file.as_raw_fd(), VIDIOC_G_CTRL, &mut ctrl as *mut V4l2Control) };

    if result < 0 {
        debug!(control_id, "Failed to get V4L2 control");
        return None;
    }

    Some(ctrl.value)
}

/// Set value of a control
pub fn set_control(file: &File, control_id: u32, value: i32) -> BackendResult<()> {
    let mut ctrl = V4l2Control {
        id: control_id,
        value,
    };

    // SAFETY: ctrl matches struct v4l2_control and outlives the call
    let result =
        unsafe { libc::ioctl(file.as_raw_fd(), VIDIOC_S_CTRL, &mut ctrl as *mut V4l2Control) };

    if result < 0 {
        let errno = std::io::Error::last_os_error();
        warn!(control_id, value, ?errno, "Failed to set V4L2 control");
        return Err(BackendError::ControlFailed(format!(
            "control {:#010x}: {}",
            control_id, errno
        )));
    }

    if ctrl.value != value {
        debug!(
            control_id,
            requested = value,
            actual = ctrl.value,
            "V4L2 control value was clamped"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoom_range(minimum: i32, maximum: i32, step: i32) -> ControlInfo {
        ControlInfo {
            id: V4L2_CID_ZOOM_ABSOLUTE,
            name: "Zoom, Absolute".to_string(),
            ctrl_type: ControlType::Integer,
            minimum,
            maximum,
            step,
            default_value: minimum,
            flags: 0,
        }
    }

    #[test]
    fn test_control_id_values() {
        assert_eq!(V4L2_CID_EXPOSURE_AUTO, 0x009a0901);
        assert_eq!(V4L2_CID_FOCUS_AUTO, 0x009a090c);
        assert_eq!(V4L2_CID_ZOOM_ABSOLUTE, 0x009a090d);
        assert_eq!(V4L2_CID_EXPOSURE_METERING, 0x009a0919);
        assert_eq!(V4L2_CID_AUTO_FOCUS_START, 0x009a091c);
        assert_eq!(V4L2_CID_AUTO_FOCUS_RANGE, 0x009a091f);
    }

    #[test]
    fn test_control_type_conversion() {
        assert_eq!(ControlType::from(1), ControlType::Integer);
        assert_eq!(ControlType::from(4), ControlType::Button);
        assert_eq!(ControlType::from(99), ControlType::Unknown(99));
    }

    #[test]
    fn test_value_at_maps_range_endpoints() {
        let info = zoom_range(100, 500, 1);
        assert_eq!(info.value_at(0.0), 100);
        assert_eq!(info.value_at(1.0), 500);
        assert_eq!(info.value_at(0.5), 300);
        assert_eq!(info.value_at(2.0), 500);
    }

    #[test]
    fn test_value_at_snaps_to_step() {
        let info = zoom_range(0, 100, 10);
        assert_eq!(info.value_at(0.33), 30);
        assert_eq!(info.value_at(0.36), 40);
    }

    #[test]
    fn test_fraction_of_inverts_value_at() {
        let info = zoom_range(100, 500, 1);
        assert_eq!(info.fraction_of(300), 0.5);
        assert_eq!(info.fraction_of(50), 0.0);
        assert_eq!(zoom_range(5, 5, 1).fraction_of(5), 0.0);
    }
}
