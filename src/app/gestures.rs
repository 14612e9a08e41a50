// SPDX-License-Identifier: GPL-3.0-only

//! Pinch and tap recognition
//!
//! Raw pointer events go in, gesture events come out. Positions are relative
//! to the preview surface. Pinch scales are relative to the finger distance at
//! the moment the second finger landed, which is what the zoom controller
//! multiplies its baseline by.

use crate::constants::{gestures, zoom};
use cosmic::iced::{Point, Size};
use std::collections::HashMap;

/// Which pointer an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Finger(u64),
}

/// Recognized gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Single press and release without moving beyond the slop
    Tap { position: Point, surface: Size },
    PinchBegan,
    /// Current distance over starting distance
    PinchChanged(f64),
    PinchEnded,
    /// Discrete zoom step from a scroll wheel
    WheelZoom(f64),
}

/// The two fingers a pinch is measured between
#[derive(Debug, Clone, Copy)]
struct Pinch {
    pair: (PointerId, PointerId),
    start_distance: f32,
}

impl Pinch {
    fn involves(&self, id: PointerId) -> bool {
        self.pair.0 == id || self.pair.1 == id
    }
}

#[derive(Debug, Default)]
pub struct GestureRecognizer {
    pointers: HashMap<PointerId, Point>,
    /// Pointer and press position of a tap candidate
    tap_candidate: Option<(PointerId, Point)>,
    pinch: Option<Pinch>,
}

fn distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    /// Distance between two tracked pointers
    fn spread(&self, (a, b): (PointerId, PointerId)) -> Option<f32> {
        Some(distance(*self.pointers.get(&a)?, *self.pointers.get(&b)?))
    }

    pub fn pointer_pressed(&mut self, id: PointerId, position: Point) -> Option<GestureEvent> {
        self.pointers.insert(id, position);

        match self.pointers.len() {
            1 => {
                self.tap_candidate = Some((id, position));
                None
            }
            2 if !self.is_pinching() => {
                self.tap_candidate = None;
                let other = self.pointers.keys().copied().find(|&other| other != id)?;
                let pair = (other, id);
                let start_distance = self.spread(pair)?;
                if start_distance < gestures::MIN_PINCH_DISTANCE {
                    return None;
                }
                self.pinch = Some(Pinch {
                    pair,
                    start_distance,
                });
                Some(GestureEvent::PinchBegan)
            }
            _ => {
                self.tap_candidate = None;
                None
            }
        }
    }

    pub fn pointer_moved(&mut self, id: PointerId, position: Point) -> Option<GestureEvent> {
        let tracked = self.pointers.get_mut(&id)?;
        *tracked = position;

        if let Some((tap_id, origin)) = self.tap_candidate
            && tap_id == id
            && distance(origin, position) > gestures::TAP_SLOP
        {
            self.tap_candidate = None;
        }

        // Extra fingers ride along without moving the scale
        let pinch = self.pinch.filter(|pinch| pinch.involves(id))?;
        let spread = self.spread(pinch.pair)?;
        Some(GestureEvent::PinchChanged(f64::from(spread / pinch.start_distance)))
    }

    pub fn pointer_released(
        &mut self,
        id: PointerId,
        position: Point,
        surface: Size,
    ) -> Option<GestureEvent> {
        self.pointers.remove(&id)?;

        if self.end_pinch_with(id) {
            self.tap_candidate = None;
            return Some(GestureEvent::PinchEnded);
        }

        match self.tap_candidate.take() {
            Some((tap_id, origin))
                if tap_id == id && distance(origin, position) <= gestures::TAP_SLOP =>
            {
                Some(GestureEvent::Tap { position, surface })
            }
            _ => None,
        }
    }

    /// A pointer vanished without a release (touch cancelled, window left)
    pub fn pointer_lost(&mut self, id: PointerId) -> Option<GestureEvent> {
        self.pointers.remove(&id)?;
        if matches!(self.tap_candidate, Some((tap_id, _)) if tap_id == id) {
            self.tap_candidate = None;
        }
        self.end_pinch_with(id).then_some(GestureEvent::PinchEnded)
    }

    /// End the pinch if `id` was one of its two fingers
    fn end_pinch_with(&mut self, id: PointerId) -> bool {
        self.pinch.take_if(|pinch| pinch.involves(id)).is_some()
    }

    /// Scroll by `notches`; positive zooms in
    pub fn wheel(&mut self, notches: f32) -> Option<GestureEvent> {
        if notches == 0.0 || !notches.is_finite() || self.is_pinching() {
            return None;
        }
        Some(GestureEvent::WheelZoom(zoom::WHEEL_STEP.powf(f64::from(notches))))
    }
}
