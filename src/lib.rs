// SPDX-License-Identifier: GPL-3.0-only

//! Viewfinder - a full-screen camera viewfinder for the COSMIC desktop
//!
//! Shows a live preview from the default camera, zooms with pinch or the
//! mouse wheel, focuses where the preview is tapped, and captures a single
//! still that replaces the preview.
//!
//! # Architecture
//!
//! - [`app`]: Orchestrator, gestures and UI
//! - [`backends`]: Camera backend abstraction, session manager, zoom and
//!   focus controllers, permission gate
//! - [`pipelines`]: Photo capture coordination and JPEG encoding
//! - [`config`]: User configuration handling
//! - [`errors`]: Error types
//!
//! The controllers and the session manager are generic over the traits in
//! [`backends::camera`], so they can be driven without hardware.

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod i18n;
pub mod pipelines;

// Re-export commonly used types
pub use app::{AppModel, Message};
pub use config::Config;
