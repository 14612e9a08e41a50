// SPDX-License-Identifier: GPL-3.0-only

//! Pinch-to-zoom and tap-to-focus handlers
//!
//! Both controllers receive the device of the running session, or nothing at
//! all when no session runs; they turn a missing device into a no-op.

use super::delay_task;
use crate::app::focus_ring::FocusRingAnimation;
use crate::app::gestures::GestureEvent;
use crate::app::state::{AppModel, FocusRingState, Message};
use crate::constants::focus_ring;
use cosmic::Task;
use cosmic::iced::{Point, Size};
use std::time::Instant;
use tracing::debug;

impl AppModel {
    pub(crate) fn handle_gesture(&mut self, event: GestureEvent) -> Task<cosmic::Action<Message>> {
        // Gestures stop mattering once the still is shown
        if self.still.is_some() {
            return Task::none();
        }

        let device = self.session.running_device();
        let device = device.as_deref();

        match event {
            GestureEvent::PinchBegan => {
                self.zoom.on_gesture_begin(device);
                Task::none()
            }
            GestureEvent::PinchChanged(scale) => {
                self.zoom.on_gesture_update(scale, device);
                Task::none()
            }
            GestureEvent::PinchEnded => {
                self.zoom.on_gesture_end();
                Task::none()
            }
            GestureEvent::WheelZoom(scale) => {
                self.zoom.zoom_by(scale, device);
                Task::none()
            }
            GestureEvent::Tap { position, surface } => self.handle_tap(position, surface),
        }
    }

    fn handle_tap(&mut self, position: Point, surface: Size) -> Task<cosmic::Action<Message>> {
        let device = self.session.running_device();
        let Some(request) = self.focus.on_tap(
            (position.x, position.y),
            (surface.width, surface.height),
            device.as_deref(),
        ) else {
            debug!(?surface, "Tap on an empty surface");
            return Task::none();
        };

        let (x, y) = request.screen_point;
        let id = self.next_focus_ring_id;
        self.next_focus_ring_id = self.next_focus_ring_id.wrapping_add(1);
        self.focus_ring = Some(FocusRingState {
            animation: FocusRingAnimation::new(Point::new(x, y)),
            id,
            last_tick: Instant::now(),
        });

        delay_task(focus_ring::TICK_MILLIS, Message::FocusRingTick(id))
    }

    pub(crate) fn handle_focus_ring_tick(&mut self, id: u64) -> Task<cosmic::Action<Message>> {
        let Some(ring) = self.focus_ring.as_mut().filter(|ring| ring.id == id) else {
            return Task::none();
        };

        let now = Instant::now();
        ring.animation.advance(now.duration_since(ring.last_tick));
        ring.last_tick = now;

        if ring.animation.is_finished() {
            self.focus_ring = None;
            return Task::none();
        }
        delay_task(focus_ring::TICK_MILLIS, Message::FocusRingTick(id))
    }
}
