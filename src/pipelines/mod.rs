// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines
//!
//! - [`photo`]: single-shot capture, JPEG encoding and decoding

pub mod photo;
