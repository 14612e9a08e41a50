// SPDX-License-Identifier: GPL-3.0-only

//! Tap-to-focus ring
//!
//! The ring appears at the tap, shrinks from 2.2x to 1.25x of its base size
//! while fading in over 0.40s, holds, then disappears. It is purely cosmetic
//! and has no effect on the device.

use crate::app::state::Message;
use crate::constants::focus_ring;
use cosmic::iced::advanced::widget::Tree;
use cosmic::iced::advanced::{Layout, Widget, layout, mouse, renderer};
use cosmic::iced::{Border, Color, Element, Length, Point, Rectangle, Size};
use cosmic::{Renderer, Theme};
use std::time::Duration;

/// Ring colour, before opacity
const RING_COLOR: Color = Color {
    r: 1.0,
    g: 0.84,
    b: 0.0,
    a: 1.0,
};

/// One ring, from tap to disappearance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusRingAnimation {
    /// Tap position relative to the preview surface
    center: Point,
    elapsed: Duration,
}

impl FocusRingAnimation {
    pub fn new(center: Point) -> Self {
        Self {
            center,
            elapsed: Duration::ZERO,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Advance the animation clock
    pub fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Animation progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f32() / focus_ring::ANIMATION.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn scale(&self) -> f32 {
        let t = self.progress();
        focus_ring::START_SCALE + (focus_ring::END_SCALE - focus_ring::START_SCALE) * t
    }

    pub fn opacity(&self) -> f32 {
        self.progress()
    }

    /// Whether the ring has been on screen for its full lifetime
    pub fn is_finished(&self) -> bool {
        self.elapsed >= focus_ring::ANIMATION + focus_ring::HOLD
    }

    /// Ring bounds relative to the surface
    pub fn bounds(&self) -> Rectangle {
        let diameter = focus_ring::DIAMETER * self.scale();
        Rectangle {
            x: self.center.x - diameter / 2.0,
            y: self.center.y - diameter / 2.0,
            width: diameter,
            height: diameter,
        }
    }
}

/// Overlay drawing the ring on top of the preview
pub struct FocusRingOverlay {
    ring: Option<FocusRingAnimation>,
}

impl FocusRingOverlay {
    pub fn new(ring: Option<FocusRingAnimation>) -> Self {
        Self { ring }
    }
}

impl Widget<Message, Theme, Renderer> for FocusRingOverlay {
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
        renderer: &mut Renderer,
        _theme: &Theme,
        _style: &renderer::Style,
        layout: Layout<'_>,
        _cursor: mouse::Cursor,
        _viewport: &Rectangle,
    ) {
        use cosmic::iced::advanced::Renderer as _;

        let Some(ring) = self.ring.filter(|ring| !ring.is_finished()) else {
            return;
        };

        let bounds = layout.bounds();
        let local = ring.bounds();
        let ring_bounds = Rectangle {
            x: bounds.x + local.x,
            y: bounds.y + local.y,
            ..local
        };

        renderer.fill_quad(
            renderer::Quad {
                bounds: ring_bounds,
                border: Border {
                    color: Color {
                        a: ring.opacity(),
                        ..RING_COLOR
                    },
                    width: focus_ring::BORDER_WIDTH,
                    radius: (ring_bounds.width / 2.0).into(),
                },
                shadow: Default::default(),
            },
            Color::TRANSPARENT,
        );
    }
}

impl<'a> From<FocusRingOverlay> for Element<'a, Message, Theme, Renderer> {
    fn from(widget: FocusRingOverlay) -> Self {
        Element::new(widget)
    }
}
