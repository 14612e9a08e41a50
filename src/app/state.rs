// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::app::focus_ring::FocusRingAnimation;
use crate::app::gestures::GestureEvent;
use crate::backends::camera::types::{CameraFrame, FrameReceiver, VideoGravity};
use crate::backends::camera::{
    CaptureSessionManager, FocusController, V4l2Backend, ZoomController,
};
use crate::backends::permission::{PermissionGate, PortalAuthority};
use crate::config::Config;
use crate::errors::{AppError, PhotoError};
use crate::pipelines::photo::{CapturedImage, PhotoCaptureCoordinator};
use cosmic::cosmic_config;
use cosmic::widget::about::About;
use cosmic::widget::image::Handle;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Where session setup stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetupState {
    /// The permission prompt is open
    #[default]
    WaitingForPermission,
    /// Building the session
    Starting,
    /// Preview is live (or the still is shown)
    Running,
    /// Setup ended; the status line says why
    Failed,
}

/// Frame stream handed from the session to the preview subscription
///
/// The subscription takes the receiver out once; a new generation number
/// restarts the subscription for a new session.
#[derive(Debug, Clone, Default)]
pub struct PreviewChannel {
    pub generation: u64,
    pub receiver: Arc<Mutex<Option<FrameReceiver>>>,
}

impl PreviewChannel {
    /// Install a receiver from a freshly started session
    pub fn replace(&mut self, receiver: Option<FrameReceiver>) {
        self.generation = self.generation.wrapping_add(1);
        self.receiver = Arc::new(Mutex::new(receiver));
    }

    pub fn take(&self) -> Option<FrameReceiver> {
        self.receiver
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

/// Focus ring and its tick chain
#[derive(Debug, Clone, Copy)]
pub struct FocusRingState {
    pub animation: FocusRingAnimation,
    /// Ticks from older rings carry a stale id and are dropped
    pub id: u64,
    pub last_tick: Instant,
}

/// The application model stores app-specific state used to describe its interface and
/// drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    pub context_page: ContextPage,
    /// The about page for this app.
    pub about: About,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Configuration handler for saving settings
    pub config_handler: Option<cosmic_config::Config>,
    /// Theme dropdown labels
    pub theme_options: Vec<String>,

    pub permission: PermissionGate<PortalAuthority>,
    pub setup: SetupState,
    /// Owner of the one capture session
    pub session: CaptureSessionManager<V4l2Backend>,
    pub preview: PreviewChannel,
    pub preview_gravity: VideoGravity,
    /// Latest preview frame, ready to draw
    pub preview_handle: Option<Handle>,

    pub zoom: ZoomController,
    pub focus: FocusController,
    pub focus_ring: Option<FocusRingState>,
    pub next_focus_ring_id: u64,

    pub capture: PhotoCaptureCoordinator,
    /// Captured still, replacing the preview once set
    pub still: Option<Handle>,

    /// Error shown in the status line
    pub status: Option<AppError>,
}

/// The context page to display in the context drawer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    About,
    Settings,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== UI Navigation =====
    /// Open external URL (repository, etc.)
    LaunchUrl(String),
    /// Toggle context drawer page (About, Settings)
    ToggleContextPage(ContextPage),

    // ===== Session Setup =====
    /// Answer from the permission prompt
    PermissionResolved(bool),

    // ===== Preview =====
    /// New frame from the preview stream
    PreviewFrame(Arc<CameraFrame>),
    /// The preview stream closed
    PreviewEnded(u64),

    // ===== Gestures =====
    /// Pinch, tap or wheel over the preview
    Gesture(GestureEvent),
    /// Animation tick for the focus ring with the given id
    FocusRingTick(u64),

    // ===== Capture =====
    /// Shutter pressed
    Capture,
    /// Photo output answered
    CaptureFinished(Result<CapturedImage, PhotoError>),

    // ===== Settings =====
    /// Configuration changed on disk
    UpdateConfig(Config),
    /// Theme dropdown changed
    SetAppTheme(usize),
    /// Zoom limit slider changed
    SetMaxZoom(f64),
}
