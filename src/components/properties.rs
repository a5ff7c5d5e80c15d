//! Externally settable entity properties and layout strategies.
//!
//! [`Properties`] is written only by the dispatcher on the render thread and
//! read by layout and rendering on the same thread.

use crate::components::color::Color;
use crate::components::geometry::{Rect, Vec2};
use serde::Serialize;

/// Snapshot of all externally settable properties of an entity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Properties {
    /// Base background colour (no hover/active tint).
    pub bg_color: Color,
    pub fg_color: Color,
    /// Background colour while hovered. `None` disables the hover fade.
    pub hover_color: Option<Color>,
    /// Background colour while pressed.
    pub active_color: Option<Color>,
    pub size: Vec2,
    pub text: String,
    pub tooltip: Option<String>,
    pub visible: bool,
    pub enabled: bool,
    pub selected: bool,
    pub collapsed: bool,
    /// Rectangle computed by the last layout pass.
    pub bounds: Rect,
}

impl Default for Properties {
    fn default() -> Self {
        Properties {
            bg_color: Color::TRANSPARENT,
            fg_color: Color::WHITE,
            hover_color: None,
            active_color: None,
            size: Vec2::ZERO,
            text: String::new(),
            tooltip: None,
            visible: true,
            enabled: true,
            selected: false,
            collapsed: false,
            bounds: Rect::default(),
        }
    }
}

/// How an entity sizes itself inside the space its parent offers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LayoutStrategy {
    /// Use the entity's `size` property.
    Fixed,
    /// Take the full available width, keep the `size` height.
    FillWidth,
    /// Take all available space.
    Fill,
}

impl LayoutStrategy {
    /// Resolve a size for `available` space; never larger than `available`.
    pub fn resolve(self, available: Vec2, own: Vec2) -> Vec2 {
        let size = match self {
            LayoutStrategy::Fixed => own,
            LayoutStrategy::FillWidth => Vec2::new(available.x, own.y),
            LayoutStrategy::Fill => available,
        };
        Vec2::new(size.x.min(available.x), size.y.min(available.y))
    }
}
