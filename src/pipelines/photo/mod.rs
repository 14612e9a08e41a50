// SPDX-License-Identifier: GPL-3.0-only

//! Still photo pipeline
//!
//! ```text
//! photo appsink → encode_jpeg → oneshot → decode_jpeg → still image
//!  (streaming thread)                      (blocking worker)
//! ```
//!
//! The live preview keeps running while a capture is in flight; it only stops
//! once a photo has been decoded and is ready to replace it.

pub mod capture;
pub mod encoding;

pub use capture::{CaptureLifecycle, CaptureOutcome, CapturedImage, PhotoCaptureCoordinator};
pub use encoding::{decode_jpeg, encode_jpeg};
