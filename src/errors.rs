// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the viewfinder
//!
//! None of these are fatal to the process: session setup errors end the setup
//! flow and are shown in the status line, configuration lock errors drop a
//! single zoom/focus update, and photo errors leave the live preview running.

use crate::backends::camera::types::BackendError;
use std::fmt;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Session setup errors
    Capture(CaptureError),
    /// Device configuration lock errors
    Lock(LockError),
    /// Photo capture errors
    Photo(PhotoError),
    /// A device control could not be applied
    Backend(BackendError),
}

/// Errors that end the session setup flow
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// The user refused camera access
    PermissionDenied,
    /// Camera access is blocked by policy or the permission service is missing
    PermissionRestricted,
    /// No default video capture device exists
    DeviceUnavailable,
    /// The device input could not be constructed (missing device, revoked access)
    InputConstruction(BackendError),
    /// The capture session could not be created or started
    SessionStart(BackendError),
}

/// Exclusive device configuration lock errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// Another configuration block holds the lock
    Busy,
    /// The device node disappeared
    Disconnected,
    /// Opening the device for configuration failed
    Io(String),
}

/// Photo capture errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// The session is not running or the photo output is detached
    NotRunning,
    /// The output produced no frame
    CaptureFailed(String),
    /// Encoding the frame to JPEG failed
    EncodingFailed(String),
    /// Decoding the JPEG for display failed
    DecodingFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Capture(e) => write!(f, "Capture session error: {}", e),
            AppError::Lock(e) => write!(f, "Device configuration error: {}", e),
            AppError::Photo(e) => write!(f, "Photo error: {}", e),
            AppError::Backend(e) => write!(f, "Device error: {}", e),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::PermissionDenied => write!(f, "Camera permission denied"),
            CaptureError::PermissionRestricted => write!(f, "Camera permission restricted"),
            CaptureError::DeviceUnavailable => write!(f, "No video capture device available"),
            CaptureError::InputConstruction(e) => {
                write!(f, "Failed to create device input: {}", e)
            }
            CaptureError::SessionStart(e) => write!(f, "Failed to start capture session: {}", e),
        }
    }
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Busy => write!(f, "Device configuration is locked"),
            LockError::Disconnected => write!(f, "Device disconnected"),
            LockError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::NotRunning => write!(f, "Capture session is not running"),
            PhotoError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            PhotoError::DecodingFailed(msg) => write!(f, "Decoding failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for LockError {}
impl std::error::Error for PhotoError {}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::InputConstruction(e) | CaptureError::SessionStart(e) => Some(e),
            _ => None,
        }
    }
}

// Conversions from sub-errors to AppError
impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<LockError> for AppError {
    fn from(err: LockError) -> Self {
        AppError::Lock(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Photo(err)
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Backend(err)
    }
}

impl From<std::io::Error> for LockError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => LockError::Disconnected,
            _ => LockError::Io(err.to_string()),
        }
    }
}

impl From<image::ImageError> for PhotoError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decoding(e) => PhotoError::DecodingFailed(e.to_string()),
            other => PhotoError::EncodingFailed(other.to_string()),
        }
    }
}
