// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests driving the controllers from raw pointer input

mod common;

use common::FakeDevice;
use cosmic::iced::{Point, Size};
use viewfinder::app::gestures::{GestureEvent, GestureRecognizer, PointerId};
use viewfinder::backends::camera::{CaptureDevice, FocusController, ZoomController};

const SURFACE: Size = Size {
    width: 400.0,
    height: 800.0,
};

/// Route one gesture the way the application does
fn dispatch(
    event: GestureEvent,
    device: &FakeDevice,
    zoom: &mut ZoomController,
    focus: &mut FocusController,
) {
    let device: Option<&dyn CaptureDevice> = Some(device);
    match event {
        GestureEvent::PinchBegan => zoom.on_gesture_begin(device),
        GestureEvent::PinchChanged(scale) => {
            zoom.on_gesture_update(scale, device);
        }
        GestureEvent::PinchEnded => zoom.on_gesture_end(),
        GestureEvent::WheelZoom(scale) => {
            zoom.zoom_by(scale, device);
        }
        GestureEvent::Tap { position, surface } => {
            focus.on_tap(
                (position.x, position.y),
                (surface.width, surface.height),
                device,
            );
        }
    }
}

#[test]
fn test_two_finger_spread_zooms_device() {
    let device = FakeDevice::new(10.0);
    let mut zoom = ZoomController::new(5.0);
    let mut focus = FocusController::new();
    let mut recognizer = GestureRecognizer::new();

    let a = PointerId::Finger(1);
    let b = PointerId::Finger(2);
    let events = [
        recognizer.pointer_pressed(a, Point::new(100.0, 400.0)),
        recognizer.pointer_pressed(b, Point::new(200.0, 400.0)),
        recognizer.pointer_moved(b, Point::new(300.0, 400.0)),
        recognizer.pointer_moved(a, Point::new(0.0, 400.0)),
        recognizer.pointer_released(b, Point::new(300.0, 400.0), SURFACE),
        recognizer.pointer_released(a, Point::new(0.0, 400.0), SURFACE),
    ];

    for event in events.into_iter().flatten() {
        dispatch(event, &device, &mut zoom, &mut focus);
    }

    // Spread went from 100 to 300
    assert_eq!(zoom.current_factor(), 3.0);
    assert_eq!(device.log().zoom_factor, 3.0);
    assert!(!zoom.is_gesture_active());
    assert!(device.log().focus_point.is_none());
}

#[test]
fn test_tap_focuses_without_zooming() {
    let device = FakeDevice::new(10.0);
    let mut zoom = ZoomController::new(5.0);
    let mut focus = FocusController::new();
    let mut recognizer = GestureRecognizer::new();

    let events = [
        recognizer.pointer_pressed(PointerId::Mouse, Point::new(100.0, 200.0)),
        recognizer.pointer_moved(PointerId::Mouse, Point::new(102.0, 201.0)),
        recognizer.pointer_released(PointerId::Mouse, Point::new(102.0, 201.0), SURFACE),
    ];

    for event in events.into_iter().flatten() {
        dispatch(event, &device, &mut zoom, &mut focus);
    }

    let point = device.log().focus_point.expect("focus point set");
    assert!((point.x - 201.0 / 800.0).abs() < 1e-6);
    assert!((point.y - (1.0 - 102.0 / 400.0)).abs() < 1e-6);
    assert_eq!(zoom.current_factor(), 1.0);
}

#[test]
fn test_drag_is_not_a_tap() {
    let device = FakeDevice::new(10.0);
    let mut zoom = ZoomController::new(5.0);
    let mut focus = FocusController::new();
    let mut recognizer = GestureRecognizer::new();

    let events = [
        recognizer.pointer_pressed(PointerId::Mouse, Point::new(100.0, 200.0)),
        recognizer.pointer_moved(PointerId::Mouse, Point::new(180.0, 260.0)),
        recognizer.pointer_released(PointerId::Mouse, Point::new(180.0, 260.0), SURFACE),
    ];

    for event in events.into_iter().flatten() {
        dispatch(event, &device, &mut zoom, &mut focus);
    }

    assert!(device.log().focus_point.is_none());
    assert!(focus.last_point().is_none());
}

#[test]
fn test_wheel_notches_zoom_in_and_out() {
    let device = FakeDevice::new(10.0);
    let mut zoom = ZoomController::new(5.0);
    let mut focus = FocusController::new();
    let mut recognizer = GestureRecognizer::new();

    for _ in 0..3 {
        let event = recognizer.wheel(1.0).expect("wheel zooms");
        dispatch(event, &device, &mut zoom, &mut focus);
    }
    assert!((zoom.current_factor() - 1.1_f64.powi(3)).abs() < 1e-9);

    for _ in 0..10 {
        let event = recognizer.wheel(-1.0).expect("wheel zooms");
        dispatch(event, &device, &mut zoom, &mut focus);
    }
    assert_eq!(zoom.current_factor(), 1.0);
    assert!(device.log().focus_point.is_none());
}
