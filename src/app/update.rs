// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function acts as a dispatcher, while specific handlers
//! are implemented in the `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::session`: Permission gate, session start, preview frames
//! - `handlers::gestures`: Pinch-to-zoom, tap-to-focus, focus ring ticks
//! - `handlers::capture`: Shutter and capture completion
//! - `handlers::ui`: Context drawer, links, settings

use crate::app::state::{AppModel, Message};
use cosmic::Task;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            // ===== UI Navigation =====
            Message::LaunchUrl(url) => self.handle_launch_url(url),
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),

            // ===== Session Setup =====
            Message::PermissionResolved(granted) => self.handle_permission_resolved(granted),

            // ===== Preview =====
            Message::PreviewFrame(frame) => self.handle_preview_frame(frame),
            Message::PreviewEnded(generation) => self.handle_preview_ended(generation),

            // ===== Gestures =====
            Message::Gesture(event) => self.handle_gesture(event),
            Message::FocusRingTick(id) => self.handle_focus_ring_tick(id),

            // ===== Capture =====
            Message::Capture => self.handle_capture(),
            Message::CaptureFinished(result) => self.handle_capture_finished(result),

            // ===== Settings =====
            Message::UpdateConfig(config) => self.handle_update_config(config),
            Message::SetAppTheme(index) => self.handle_set_app_theme(index),
            Message::SetMaxZoom(factor) => self.handle_set_max_zoom(factor),
        }
    }
}
