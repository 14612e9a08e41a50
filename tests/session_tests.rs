// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture session lifecycle

mod common;

use common::{FakeBackend, FakeDevice};
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use viewfinder::backends::camera::CaptureSessionManager;
use viewfinder::backends::camera::types::{CameraFrame, VideoGravity};
use viewfinder::backends::camera::PhotoOutput;
use viewfinder::errors::CaptureError;

#[test]
fn test_start_runs_session_with_aspect_fill_preview() {
    let device = Arc::new(FakeDevice::new(4.0));
    let mut manager = CaptureSessionManager::new(FakeBackend::with_device(device));

    let surface = manager.start_session().expect("session starts");

    assert!(manager.is_running());
    assert_eq!(surface.gravity, VideoGravity::ResizeAspectFill);
    assert!(surface.frames.is_some());
    assert_eq!(manager.running_device().unwrap().name(), "Fake Camera");
    assert!(manager.photo_output().unwrap().is_attached());

    let log = &manager.backend().log;
    assert_eq!(log.inputs.load(Ordering::SeqCst), 1);
    assert_eq!(log.outputs.load(Ordering::SeqCst), 1);
    assert_eq!(log.starts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_preview_frames_flow_to_surface() {
    let device = Arc::new(FakeDevice::new(4.0));
    let mut manager = CaptureSessionManager::new(FakeBackend::with_device(device));
    let surface = manager.start_session().unwrap();

    let mut sender = manager
        .backend()
        .frame_sender
        .lock()
        .unwrap()
        .take()
        .unwrap();
    sender
        .try_send(CameraFrame::from_rgba(2, 2, vec![0; 16]))
        .unwrap();
    drop(sender);

    let frames: Vec<_> = futures::executor::block_on(surface.frames.unwrap().collect());
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].width, 2);
}

#[test]
fn test_missing_device_fails_setup() {
    let mut manager = CaptureSessionManager::new(FakeBackend::without_device());

    let err = manager.start_session().unwrap_err();

    assert!(matches!(err, CaptureError::DeviceUnavailable));
    assert!(!manager.is_running());
    assert!(manager.running_device().is_none());
    assert_eq!(manager.backend().log.starts.load(Ordering::SeqCst), 0);
}

#[test]
fn test_input_failure_fails_setup() {
    let mut backend = FakeBackend::with_device(Arc::new(FakeDevice::new(4.0)));
    backend.fail_input = true;
    let mut manager = CaptureSessionManager::new(backend);

    let err = manager.start_session().unwrap_err();

    assert!(matches!(err, CaptureError::InputConstruction(_)));
    assert!(!manager.is_running());
}

#[test]
fn test_start_failure_fails_setup() {
    let mut backend = FakeBackend::with_device(Arc::new(FakeDevice::new(4.0)));
    backend.fail_start = true;
    let mut manager = CaptureSessionManager::new(backend);

    let err = manager.start_session().unwrap_err();

    assert!(matches!(err, CaptureError::SessionStart(_)));
    assert!(manager.photo_output().is_none());
}

#[test]
fn test_refused_output_still_runs_preview() {
    let mut backend = FakeBackend::with_device(Arc::new(FakeDevice::new(4.0)));
    backend.refuse_output = true;
    let mut manager = CaptureSessionManager::new(backend);

    manager.start_session().expect("preview runs without photo output");

    assert!(manager.is_running());
    assert!(manager.photo_output().is_none());
    assert_eq!(manager.backend().log.outputs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_refused_input_is_not_fatal() {
    let mut backend = FakeBackend::with_device(Arc::new(FakeDevice::new(4.0)));
    backend.refuse_input = true;
    let mut manager = CaptureSessionManager::new(backend);

    manager.start_session().expect("setup carries on");

    assert!(manager.is_running());
    assert_eq!(manager.backend().log.inputs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_stop_detaches_output_and_is_idempotent() {
    let mut manager =
        CaptureSessionManager::new(FakeBackend::with_device(Arc::new(FakeDevice::new(4.0))));
    manager.start_session().unwrap();
    let output = manager.photo_output().unwrap();

    manager.stop_session();
    manager.stop_session();

    assert!(!manager.is_running());
    assert!(!output.is_attached());
    assert!(manager.running_device().is_none());
    assert!(manager.photo_output().is_none());
    assert_eq!(manager.backend().log.stops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_restart_replaces_running_session() {
    let mut manager =
        CaptureSessionManager::new(FakeBackend::with_device(Arc::new(FakeDevice::new(4.0))));
    manager.start_session().unwrap();
    manager.start_session().unwrap();

    let log = &manager.backend().log;
    assert_eq!(log.starts.load(Ordering::SeqCst), 2);
    assert_eq!(log.stops.load(Ordering::SeqCst), 1);
    assert!(manager.is_running());
}
