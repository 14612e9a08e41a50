// SPDX-License-Identifier: GPL-3.0-only

//! Platform backends
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │               App Layer                │
//! └──────────┬──────────────────┬──────────┘
//!            │                  │
//! ┌──────────┴─────────┐ ┌──────┴─────────────────┐
//! │     Permission     │ │        Camera          │
//! │ (portal / devnode) │ │ (V4L2 + GStreamer)     │
//! └────────────────────┘ └────────────────────────┘
//! ```
//!
//! - [`permission`]: camera authorization and the gate in front of setup
//! - [`camera`]: device discovery, configuration and the capture session

pub mod camera;
pub mod permission;
