// SPDX-License-Identifier: GPL-3.0-only

//! Transparent widget turning pointer input over the preview into gestures
//!
//! Touch fingers and the left mouse button feed the recognizer kept in the
//! widget tree; the wheel stands in for pinch on desktops.

use crate::app::gestures::{GestureRecognizer, PointerId};
use crate::app::state::Message;
use cosmic::iced::advanced::widget::{Tree, tree};
use cosmic::iced::advanced::{Clipboard, Layout, Shell, Widget, layout, mouse, renderer};
use cosmic::iced::event::Status;
use cosmic::iced::{Element, Event, Length, Point, Rectangle, Size, touch};
use cosmic::{Renderer, Theme};

/// Pixels per wheel notch for trackpads reporting pixel deltas
const PIXELS_PER_NOTCH: f32 = 50.0;

pub struct GestureArea {
    enabled: bool,
}

impl GestureArea {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

/// Position relative to the widget origin
fn local(bounds: Rectangle, position: Point) -> Point {
    Point::new(position.x - bounds.x, position.y - bounds.y)
}

impl Widget<Message, Theme, Renderer> for GestureArea {
    fn tag(&self) -> tree::Tag {
        tree::Tag::of::<GestureRecognizer>()
    }

    fn state(&self) -> tree::State {
        tree::State::new(GestureRecognizer::new())
    }

    fn size(&self) -> Size<Length> {
        Size::new(Length::Fill, Length::Fill)
    }

    fn layout(
        &self,
        _tree: &mut Tree,
        _renderer: &Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        layout::Node::new(limits.max())
    }

    fn draw(
        &self,
        _tree: &Tree,
        _renderer: &mut Renderer,
        _theme: &Theme,
        _style: &renderer::Style,
        _layout: Layout<'_>,
        _cursor: mouse::Cursor,
        _viewport: &Rectangle,
    ) {
    }

    fn on_event(
        &mut self,
        tree: &mut Tree,
        event: Event,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        _renderer: &Renderer,
        _clipboard: &mut dyn Clipboard,
        shell: &mut Shell<'_, Message>,
        _viewport: &Rectangle,
    ) -> Status {
        if !self.enabled {
            return Status::Ignored;
        }

        let bounds = layout.bounds();
        let recognizer = tree.state.downcast_mut::<GestureRecognizer>();

        let gesture = match event {
            Event::Touch(touch::Event::FingerPressed { id, position }) => {
                if !bounds.contains(position) {
                    return Status::Ignored;
                }
                recognizer.pointer_pressed(PointerId::Finger(id.0), local(bounds, position))
            }
            Event::Touch(touch::Event::FingerMoved { id, position }) => {
                recognizer.pointer_moved(PointerId::Finger(id.0), local(bounds, position))
            }
            Event::Touch(touch::Event::FingerLifted { id, position }) => recognizer
                .pointer_released(
                    PointerId::Finger(id.0),
                    local(bounds, position),
                    bounds.size(),
                ),
            Event::Touch(touch::Event::FingerLost { id, .. }) => {
                recognizer.pointer_lost(PointerId::Finger(id.0))
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let Some(position) = cursor.position_in(bounds) else {
                    return Status::Ignored;
                };
                recognizer.pointer_pressed(PointerId::Mouse, position)
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) => {
                recognizer.pointer_moved(PointerId::Mouse, local(bounds, position))
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                match cursor.position() {
                    Some(position) => recognizer.pointer_released(
                        PointerId::Mouse,
                        local(bounds, position),
                        bounds.size(),
                    ),
                    None => recognizer.pointer_lost(PointerId::Mouse),
                }
            }
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if !cursor.is_over(bounds) {
                    return Status::Ignored;
                }
                let notches = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y,
                    mouse::ScrollDelta::Pixels { y, .. } => y / PIXELS_PER_NOTCH,
                };
                recognizer.wheel(notches)
            }
            _ => None,
        };

        match gesture {
            Some(gesture) => {
                shell.publish(Message::Gesture(gesture));
                Status::Captured
            }
            None => Status::Ignored,
        }
    }

    fn mouse_interaction(
        &self,
        _tree: &Tree,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        _viewport: &Rectangle,
        _renderer: &Renderer,
    ) -> mouse::Interaction {
        if self.enabled && cursor.is_over(layout.bounds()) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

impl<'a> From<GestureArea> for Element<'a, Message, Theme, Renderer> {
    fn from(widget: GestureArea) -> Self {
        Element::new(widget)
    }
}
