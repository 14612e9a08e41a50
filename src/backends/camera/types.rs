// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera backends

use gstreamer::buffer::{MappedBuffer, Readable};
use std::sync::Arc;
use std::time::Instant;

/// Frame data storage - either pre-copied bytes or zero-copy GStreamer buffer
///
/// The `Mapped` variant keeps the GStreamer buffer mapped and alive until all
/// references are dropped.
#[derive(Clone)]
pub enum FrameData {
    /// Pre-copied bytes (cropped frames, tests)
    Copied(Arc<[u8]>),
    /// Zero-copy mapped GStreamer buffer
    Mapped(Arc<MappedBuffer<Readable>>),
}

impl FrameData {
    /// Create FrameData from a mapped GStreamer buffer (zero-copy)
    pub fn from_mapped_buffer(buffer: MappedBuffer<Readable>) -> Self {
        FrameData::Mapped(Arc::new(buffer))
    }

    pub fn len(&self) -> usize {
        match self {
            FrameData::Copied(data) => data.len(),
            FrameData::Mapped(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for FrameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameData::Copied(data) => write!(f, "FrameData::Copied({} bytes)", data.len()),
            FrameData::Mapped(buf) => write!(f, "FrameData::Mapped({} bytes)", buf.len()),
        }
    }
}

impl AsRef<[u8]> for FrameData {
    fn as_ref(&self) -> &[u8] {
        match self {
            FrameData::Copied(data) => data.as_ref(),
            FrameData::Mapped(buf) => buf.as_slice(),
        }
    }
}

impl std::ops::Deref for FrameData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_ref()
    }
}

/// A single RGBA preview frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: FrameData,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// When the frame left the pipeline
    pub captured_at: Instant,
}

impl CameraFrame {
    const BYTES_PER_PIXEL: usize = 4;

    /// Build a tightly packed RGBA frame from owned bytes
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: FrameData::Copied(Arc::from(pixels)),
            stride: width * Self::BYTES_PER_PIXEL as u32,
            captured_at: Instant::now(),
        }
    }

    /// Copy the pixels into a tightly packed RGBA buffer (stride padding removed)
    pub fn packed_rgba(&self) -> Vec<u8> {
        let row_len = self.width as usize * Self::BYTES_PER_PIXEL;
        let stride = self.stride as usize;
        let data: &[u8] = &self.data;

        if stride == row_len {
            let len = row_len * self.height as usize;
            return data[..len.min(data.len())].to_vec();
        }

        let mut packed = Vec::with_capacity(row_len * self.height as usize);
        for row in data.chunks(stride).take(self.height as usize) {
            packed.extend_from_slice(&row[..row_len.min(row.len())]);
        }
        packed
    }

    /// Crop the centre `1/factor` region (digital zoom)
    ///
    /// Factors at or below 1.0 return the frame unchanged. The result is not
    /// rescaled; the display surface stretches it back to fill its bounds.
    pub fn crop_center(&self, factor: f64) -> CameraFrame {
        if !factor.is_finite() || factor <= 1.0 || self.width == 0 || self.height == 0 {
            return self.clone();
        }

        let crop_w = ((self.width as f64 / factor).round() as u32).clamp(1, self.width);
        let crop_h = ((self.height as f64 / factor).round() as u32).clamp(1, self.height);
        let x0 = ((self.width - crop_w) / 2) as usize;
        let y0 = ((self.height - crop_h) / 2) as usize;

        let bpp = Self::BYTES_PER_PIXEL;
        let stride = self.stride as usize;
        let data: &[u8] = &self.data;
        let mut cropped = Vec::with_capacity(crop_w as usize * crop_h as usize * bpp);
        for row in y0..y0 + crop_h as usize {
            let start = row * stride + x0 * bpp;
            let end = start + crop_w as usize * bpp;
            if end > data.len() {
                break;
            }
            cropped.extend_from_slice(&data[start..end]);
        }

        CameraFrame {
            width: crop_w,
            height: crop_h,
            data: FrameData::Copied(Arc::from(cropped)),
            stride: crop_w * bpp as u32,
            captured_at: self.captured_at,
        }
    }
}

/// Frame receiver type for preview streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

/// A point in sensor-orientation space, both axes in `[0, 1]`
///
/// `(0, 0)` is the top-left of the sensor in its native (landscape) orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Create a point, clamping both coordinates into `[0, 1]`
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }

    pub const CENTER: NormalizedPoint = NormalizedPoint { x: 0.5, y: 0.5 };
}

impl std::fmt::Display for NormalizedPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Focus behaviour requested from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    /// Focus once at the point of interest, then hold
    AutoFocus,
}

/// Exposure behaviour requested from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureMode {
    /// Continuously meter and adjust exposure
    ContinuousAutoExposure,
}

/// How a device realises its zoom factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomMode {
    /// Driver zoom control (`V4L2_CID_ZOOM_ABSOLUTE`)
    Hardware,
    /// Centre crop of every frame
    Digital,
}

impl std::fmt::Display for ZoomMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoomMode::Hardware => write!(f, "hardware"),
            ZoomMode::Digital => write!(f, "digital"),
        }
    }
}

/// How the preview is scaled into the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoGravity {
    /// Preserve aspect ratio and fill the bounds, cropping overflow
    #[default]
    ResizeAspectFill,
}

impl VideoGravity {
    /// Equivalent image content fit
    pub fn content_fit(&self) -> cosmic::iced::ContentFit {
        match self {
            VideoGravity::ResizeAspectFill => cosmic::iced::ContentFit::Cover,
        }
    }
}

/// Per-capture settings
///
/// Flash, HDR and output format are not configurable; captures are always JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoSettings {
    /// JPEG quality (0-100)
    pub jpeg_quality: u8,
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: crate::constants::photo::JPEG_QUALITY,
        }
    }
}

/// A captured photo in its file data representation
#[derive(Debug, Clone)]
pub struct EncodedPhoto {
    /// JPEG bytes
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Backend error types
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Backend is not available on this system (GStreamer init failed, plugin missing)
    NotAvailable(String),
    /// Failed to initialize the pipeline or device input
    InitializationFailed(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// The session refused an input or output
    Rejected(String),
    /// A device control could not be applied
    ControlFailed(String),
    /// General I/O error
    IoError(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::Rejected(msg) => write!(f, "Rejected by session: {}", msg),
            BackendError::ControlFailed(msg) => write!(f, "Control failed: {}", msg),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => BackendError::DeviceNotFound(err.to_string()),
            _ => BackendError::IoError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> CameraFrame {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        CameraFrame::from_rgba(width, height, pixels)
    }

    #[test]
    fn test_packed_rgba_strips_padding() {
        // 2x2 frame with 4 bytes of padding per row
        let data: Vec<u8> = vec![
            1, 1, 1, 1, 2, 2, 2, 2, 0, 0, 0, 0, //
            3, 3, 3, 3, 4, 4, 4, 4, 0, 0, 0, 0,
        ];
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: FrameData::Copied(Arc::from(data)),
            stride: 12,
            captured_at: Instant::now(),
        };

        let packed = frame.packed_rgba();
        assert_eq!(packed.len(), 16);
        assert_eq!(&packed[8..12], &[3, 3, 3, 3]);
    }

    #[test]
    fn test_crop_center_halves_dimensions() {
        let frame = gradient(8, 4);
        let cropped = frame.crop_center(2.0);

        assert_eq!((cropped.width, cropped.height), (4, 2));
        // First pixel of the crop is (2, 1) in the source
        assert_eq!(&cropped.data[..4], &[2, 1, 0, 255]);
        assert_eq!(cropped.data.len(), 4 * 2 * 4);
    }

    #[test]
    fn test_crop_center_ignores_unit_factor() {
        let frame = gradient(4, 4);
        let same = frame.crop_center(1.0);
        assert_eq!((same.width, same.height), (4, 4));

        let same = frame.crop_center(f64::NAN);
        assert_eq!((same.width, same.height), (4, 4));
    }

    #[test]
    fn test_normalized_point_clamps() {
        let p = NormalizedPoint::new(-0.5, 1.5);
        assert_eq!(p, NormalizedPoint { x: 0.0, y: 1.0 });
    }

    #[test]
    fn test_default_gravity_is_aspect_fill() {
        assert_eq!(
            VideoGravity::default().content_fit(),
            cosmic::iced::ContentFit::Cover
        );
    }
}
