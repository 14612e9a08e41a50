// SPDX-License-Identifier: GPL-3.0-only

//! Single-shot photo capture
//!
//! ```text
//! Previewing ──capture()──▶ Capturing ──finish(Ok)──▶ DisplayingStill
//!     ▲                         │
//!     └───────finish(Err)───────┘
//! ```
//!
//! The request future only talks to the photo output and the decoder; all
//! state transitions happen in [`PhotoCaptureCoordinator::finish`], which the
//! application calls from its update loop.

use super::encoding;
use crate::backends::camera::types::{EncodedPhoto, PhotoSettings};
use crate::backends::camera::{CameraBackend, CaptureSessionManager, PhotoOutput};
use crate::errors::PhotoError;
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

/// Where the capture flow currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureLifecycle {
    /// Live preview, shutter armed
    #[default]
    Previewing,
    /// A request is in flight
    Capturing,
    /// The still replaced the preview; terminal
    DisplayingStill,
}

/// A captured photo: the JPEG bytes plus the bitmap decoded from them
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub encoded: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA pixels
    pub rgba: Vec<u8>,
}

/// What [`PhotoCaptureCoordinator::finish`] decided
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    /// Show this still in place of the preview
    Still(CapturedImage),
    /// The capture failed and the preview keeps running
    Failed(PhotoError),
    /// The result arrived outside a capture and was dropped
    Ignored,
}

#[derive(Debug, Default)]
pub struct PhotoCaptureCoordinator {
    lifecycle: CaptureLifecycle,
}

impl PhotoCaptureCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> CaptureLifecycle {
        self.lifecycle
    }

    /// Issue a capture request
    ///
    /// Returns `None`, and leaves the lifecycle alone, unless the preview is
    /// live and an attached output exists. The returned future resolves once
    /// the output delivers the photo and it has been decoded.
    pub fn capture<O>(
        &mut self,
        output: Option<&O>,
    ) -> Option<BoxFuture<'static, Result<CapturedImage, PhotoError>>>
    where
        O: PhotoOutput + ?Sized,
    {
        if self.lifecycle != CaptureLifecycle::Previewing {
            debug!(lifecycle = ?self.lifecycle, "Shutter ignored");
            return None;
        }
        let Some(output) = output.filter(|output| output.is_attached()) else {
            debug!("Shutter ignored: no attached photo output");
            return None;
        };

        info!("Capturing photo");
        self.lifecycle = CaptureLifecycle::Capturing;
        let receiver = output.capture_photo(PhotoSettings::default());

        Some(receive(receiver).boxed())
    }

    /// Apply a capture result
    ///
    /// Success stops the session and makes the still terminal. Failure returns
    /// to the live preview.
    pub fn finish<B: CameraBackend>(
        &mut self,
        result: Result<CapturedImage, PhotoError>,
        manager: &mut CaptureSessionManager<B>,
    ) -> CaptureOutcome {
        if self.lifecycle != CaptureLifecycle::Capturing {
            debug!(lifecycle = ?self.lifecycle, "Dropping capture result outside a capture");
            return CaptureOutcome::Ignored;
        }

        match result {
            Ok(image) => {
                info!(width = image.width, height = image.height, "Photo captured");
                manager.stop_session();
                self.lifecycle = CaptureLifecycle::DisplayingStill;
                CaptureOutcome::Still(image)
            }
            Err(e) => {
                error!(error = %e, "Photo capture failed");
                self.lifecycle = CaptureLifecycle::Previewing;
                CaptureOutcome::Failed(e)
            }
        }
    }
}

/// Wait for the output, then decode
async fn receive(
    receiver: oneshot::Receiver<Result<EncodedPhoto, PhotoError>>,
) -> Result<CapturedImage, PhotoError> {
    let photo = receiver.await.map_err(|_| {
        PhotoError::CaptureFailed("photo output dropped the request".to_string())
    })??;
    decode(photo).await
}

/// Decode on a blocking worker
async fn decode(photo: EncodedPhoto) -> Result<CapturedImage, PhotoError> {
    tokio::task::spawn_blocking(move || {
        let bitmap = encoding::decode_jpeg(&photo.data)?;
        let (width, height) = bitmap.dimensions();
        Ok(CapturedImage {
            encoded: photo.data,
            width,
            height,
            rgba: bitmap.into_raw(),
        })
    })
    .await
    .map_err(|e| PhotoError::DecodingFailed(format!("decode task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Output that answers every request with a fixed result
    struct CannedOutput {
        attached: bool,
        result: Option<Result<EncodedPhoto, PhotoError>>,
    }

    impl PhotoOutput for CannedOutput {
        fn capture_photo(
            &self,
            _settings: PhotoSettings,
        ) -> oneshot::Receiver<Result<EncodedPhoto, PhotoError>> {
            let (tx, rx) = oneshot::channel();
            if let Some(result) = self.result.clone() {
                let _ = tx.send(result);
            }
            rx
        }

        fn is_attached(&self) -> bool {
            self.attached
        }
    }

    #[test]
    fn test_capture_requires_output() {
        let mut coordinator = PhotoCaptureCoordinator::new();
        assert!(coordinator.capture::<CannedOutput>(None).is_none());
        assert_eq!(coordinator.lifecycle(), CaptureLifecycle::Previewing);
    }

    #[test]
    fn test_capture_requires_attached_output() {
        let mut coordinator = PhotoCaptureCoordinator::new();
        let output = CannedOutput {
            attached: false,
            result: None,
        };
        assert!(coordinator.capture(Some(&output)).is_none());
        assert_eq!(coordinator.lifecycle(), CaptureLifecycle::Previewing);
    }

    #[test]
    fn test_second_tap_while_capturing_is_ignored() {
        let mut coordinator = PhotoCaptureCoordinator::new();
        let output = CannedOutput {
            attached: true,
            result: None,
        };
        assert!(coordinator.capture(Some(&output)).is_some());
        assert_eq!(coordinator.lifecycle(), CaptureLifecycle::Capturing);
        assert!(coordinator.capture(Some(&output)).is_none());
    }

    #[tokio::test]
    async fn test_dropped_request_is_capture_failure() {
        let mut coordinator = PhotoCaptureCoordinator::new();
        let output = CannedOutput {
            attached: true,
            result: None,
        };
        let future = coordinator.capture(Some(&output)).unwrap();
        assert!(matches!(future.await, Err(PhotoError::CaptureFailed(_))));
    }

    #[tokio::test]
    async fn test_output_error_is_passed_through() {
        let mut coordinator = PhotoCaptureCoordinator::new();
        let output = CannedOutput {
            attached: true,
            result: Some(Err(PhotoError::EncodingFailed("boom".into()))),
        };
        let future = coordinator.capture(Some(&output)).unwrap();
        assert_eq!(
            future.await.unwrap_err(),
            PhotoError::EncodingFailed("boom".into())
        );
    }

    #[tokio::test]
    async fn test_capture_decodes_bitmap() {
        let frame = crate::backends::camera::types::CameraFrame::from_rgba(
            6,
            4,
            vec![180; 6 * 4 * 4],
        );
        let photo = encoding::encode_jpeg(&frame, 92).unwrap();
        let mut coordinator = PhotoCaptureCoordinator::new();
        let output = CannedOutput {
            attached: true,
            result: Some(Ok(photo.clone())),
        };

        let image = coordinator.capture(Some(&output)).unwrap().await.unwrap();
        assert_eq!((image.width, image.height), (6, 4));
        assert_eq!(image.rgba.len(), 6 * 4 * 4);
        assert_eq!(image.encoded, photo.data);
    }
}
