// SPDX-License-Identifier: GPL-3.0-only

//! Default capture device discovery
//!
//! Scans `/dev/video*`, keeps nodes that report `VIDEO_CAPTURE`, and picks the
//! lowest-numbered one. Metadata nodes that UVC drivers create alongside each
//! camera are skipped because they lack the capture capability.

use super::device::{V4l2Capabilities, V4l2Device};
use super::session::{GstCaptureSession, GstDeviceInput, GstPhotoOutput};
use super::types::*;
use super::{CameraBackend, CaptureDevice};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use v4l::capability::Flags;

/// A video capture node found during the scan
#[derive(Debug, Clone)]
pub struct DiscoveredNode {
    pub path: PathBuf,
    pub card: String,
    pub driver: String,
    pub bus: String,
}

/// Numeric suffix of a `/dev/videoN` path
fn node_index(path: &Path) -> Option<u32> {
    path.file_name()?
        .to_str()?
        .strip_prefix("video")?
        .parse()
        .ok()
}

/// All `/dev/video*` paths ordered by node number
pub fn video_nodes() -> Vec<PathBuf> {
    let mut nodes: Vec<(u32, PathBuf)> = std::fs::read_dir("/dev")
        .into_iter()
        .flatten()
        .flatten()
        .map(|entry| entry.path())
        .filter_map(|path| node_index(&path).map(|index| (index, path)))
        .collect();
    nodes.sort_by_key(|(index, _)| *index);
    nodes.into_iter().map(|(_, path)| path).collect()
}

/// Video capture nodes, in node order
pub fn capture_nodes() -> Vec<DiscoveredNode> {
    video_nodes()
        .into_iter()
        .filter_map(|path| {
            let dev = v4l::Device::with_path(&path).ok()?;
            let caps = dev.query_caps().ok()?;
            if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
                debug!(path = %path.display(), "Skipping node without video capture");
                return None;
            }
            Some(DiscoveredNode {
                path,
                card: caps.card,
                driver: caps.driver,
                bus: caps.bus,
            })
        })
        .collect()
}

/// V4L2 device discovery feeding GStreamer sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct V4l2Backend;

impl V4l2Backend {
    pub fn new() -> Self {
        Self
    }

    /// Open and probe a discovered node
    pub fn open_device(node: &DiscoveredNode) -> V4l2Device {
        let capabilities = match File::open(&node.path) {
            Ok(file) => V4l2Capabilities::probe(&file),
            Err(e) => {
                debug!(path = %node.path.display(), error = %e, "Cannot probe controls");
                V4l2Capabilities::default()
            }
        };

        let device = V4l2Device::new(
            node.card.clone(),
            node.path.to_string_lossy(),
            node.driver.clone(),
            capabilities,
        );
        device.sync_zoom_from_hardware();
        device
    }
}

impl CameraBackend for V4l2Backend {
    type Session = GstCaptureSession;

    fn default_device(&self) -> Option<Arc<dyn CaptureDevice>> {
        let node = capture_nodes().into_iter().next()?;
        let device = Self::open_device(&node);

        info!(
            name = %device.name(),
            path = %device.path(),
            driver = %device.driver(),
            bus = %node.bus,
            zoom = %device.zoom_mode(),
            "Default capture device"
        );

        Some(Arc::new(device))
    }

    fn device_input(&self, device: &Arc<dyn CaptureDevice>) -> BackendResult<GstDeviceInput> {
        GstDeviceInput::new(Arc::clone(device))
    }

    fn new_session(&self) -> BackendResult<GstCaptureSession> {
        GstCaptureSession::new()
    }

    fn photo_output(&self) -> BackendResult<GstPhotoOutput> {
        GstPhotoOutput::new()
    }
}
