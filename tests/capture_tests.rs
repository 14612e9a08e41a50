// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for single-shot photo capture

mod common;

use common::{CannedPhoto, FakeBackend, FakeDevice, FakeOutput};
use std::sync::Arc;
use viewfinder::backends::camera::CaptureSessionManager;
use viewfinder::errors::PhotoError;
use viewfinder::pipelines::photo::{CaptureLifecycle, CaptureOutcome, PhotoCaptureCoordinator};

fn running_manager(answer: CannedPhoto) -> CaptureSessionManager<FakeBackend> {
    let mut backend = FakeBackend::with_device(Arc::new(FakeDevice::new(4.0)));
    backend.answer = answer;
    let mut manager = CaptureSessionManager::new(backend);
    manager.start_session().expect("session starts");
    manager
}

#[tokio::test]
async fn test_successful_capture_shows_still_and_stops_session() {
    let mut manager = running_manager(CannedPhoto::Jpeg);
    let mut coordinator = PhotoCaptureCoordinator::new();

    let output = manager.photo_output();
    let request = coordinator.capture(output.as_ref()).expect("capture issued");
    assert_eq!(coordinator.lifecycle(), CaptureLifecycle::Capturing);

    let result = request.await;
    let CaptureOutcome::Still(image) = coordinator.finish(result, &mut manager) else {
        panic!("expected a still");
    };

    assert_eq!((image.width, image.height), (4, 2));
    assert_eq!(image.rgba.len(), 4 * 2 * 4);
    assert!(image.encoded.starts_with(&[0xFF, 0xD8]));
    assert_eq!(coordinator.lifecycle(), CaptureLifecycle::DisplayingStill);
    assert!(!manager.is_running());
}

#[tokio::test]
async fn test_second_tap_after_still_is_noop() {
    let mut manager = running_manager(CannedPhoto::Jpeg);
    let mut coordinator = PhotoCaptureCoordinator::new();

    let output = manager.photo_output().unwrap();
    let result = coordinator.capture(Some(&output)).unwrap().await;
    coordinator.finish(result, &mut manager);

    assert!(coordinator.capture(Some(&output)).is_none());
    assert!(coordinator.capture(manager.photo_output().as_ref()).is_none());
    assert_eq!(output.request_count(), 1);
    assert_eq!(coordinator.lifecycle(), CaptureLifecycle::DisplayingStill);
}

#[tokio::test]
async fn test_tap_while_capturing_is_noop() {
    let mut manager = running_manager(CannedPhoto::Jpeg);
    let mut coordinator = PhotoCaptureCoordinator::new();
    let output = manager.photo_output().unwrap();

    let first = coordinator.capture(Some(&output));
    assert!(first.is_some());
    assert!(coordinator.capture(Some(&output)).is_none());
    assert_eq!(output.request_count(), 1);

    let result = first.unwrap().await;
    assert!(matches!(
        coordinator.finish(result, &mut manager),
        CaptureOutcome::Still(_)
    ));
}

#[tokio::test]
async fn test_failed_capture_returns_to_preview() {
    let failure = PhotoError::CaptureFailed("sensor timeout".into());
    let mut manager = running_manager(CannedPhoto::Error(failure.clone()));
    let mut coordinator = PhotoCaptureCoordinator::new();

    let output = manager.photo_output();
    let result = coordinator.capture(output.as_ref()).unwrap().await;
    let outcome = coordinator.finish(result, &mut manager);

    assert!(matches!(outcome, CaptureOutcome::Failed(e) if e == failure));
    assert_eq!(coordinator.lifecycle(), CaptureLifecycle::Previewing);
    assert!(manager.is_running());

    // Shutter is armed again
    assert!(coordinator.capture(manager.photo_output().as_ref()).is_some());
}

#[tokio::test]
async fn test_abandoned_request_is_a_failure() {
    let mut manager = running_manager(CannedPhoto::Abandon);
    let mut coordinator = PhotoCaptureCoordinator::new();

    let output = manager.photo_output();
    let result = coordinator.capture(output.as_ref()).unwrap().await;

    assert!(matches!(result, Err(PhotoError::CaptureFailed(_))));
    assert!(matches!(
        coordinator.finish(result, &mut manager),
        CaptureOutcome::Failed(_)
    ));
    assert_eq!(coordinator.lifecycle(), CaptureLifecycle::Previewing);
}

#[test]
fn test_capture_without_output_is_noop() {
    let mut coordinator = PhotoCaptureCoordinator::new();

    assert!(coordinator.capture::<FakeOutput>(None).is_none());

    let detached = FakeOutput::new(CannedPhoto::Jpeg);
    assert!(coordinator.capture(Some(&detached)).is_none());
    assert_eq!(detached.request_count(), 0);
    assert_eq!(coordinator.lifecycle(), CaptureLifecycle::Previewing);
}

#[test]
fn test_stopped_session_hands_out_no_output() {
    let mut manager = running_manager(CannedPhoto::Jpeg);
    let mut coordinator = PhotoCaptureCoordinator::new();

    manager.stop_session();

    assert!(coordinator.capture(manager.photo_output().as_ref()).is_none());
    assert_eq!(coordinator.lifecycle(), CaptureLifecycle::Previewing);
}

#[test]
fn test_stray_result_is_ignored() {
    let mut manager = running_manager(CannedPhoto::Jpeg);
    let mut coordinator = PhotoCaptureCoordinator::new();

    let outcome = coordinator.finish(Err(PhotoError::NotRunning), &mut manager);

    assert!(matches!(outcome, CaptureOutcome::Ignored));
    assert!(manager.is_running());
}
