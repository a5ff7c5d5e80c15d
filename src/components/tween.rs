//! Animation state for interpolated visual properties.
//!
//! This module provides the data side of the animation engine:
//! - [`Easing`] – easing curves mapping normalized time to progress
//! - [`AnimValue`] – the values that can be interpolated (scalar, vector, colour)
//! - [`AnimationState`] – one transition per animatable property of an entity
//!
//! See [`crate::systems::tween`] for the engine that starts, advances and
//! samples these states.

use crate::components::color::Color;
use crate::components::geometry::Vec2;

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(Copy, Clone, Debug)]
pub enum Easing {
    /// Constant speed (no easing).
    Linear,
    /// Starts slow, accelerates (quadratic).
    QuadIn,
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Slow start and end (quadratic).
    QuadInOut,
    /// Starts slow, accelerates (cubic).
    CubicIn,
    /// Starts fast, decelerates (cubic).
    CubicOut,
    /// Slow start and end (cubic).
    CubicInOut,
    /// Caller-supplied curve. Endpoints are pinned to 0 and 1.
    Custom(fn(f32) -> f32),
}

impl Default for Easing {
    fn default() -> Self {
        Easing::QuadOut
    }
}

impl Easing {
    /// Parse a config name such as `quad_out`.
    pub fn from_name(name: &str) -> Option<Easing> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" => Some(Easing::Linear),
            "quad_in" => Some(Easing::QuadIn),
            "quad_out" => Some(Easing::QuadOut),
            "quad_in_out" => Some(Easing::QuadInOut),
            "cubic_in" => Some(Easing::CubicIn),
            "cubic_out" => Some(Easing::CubicOut),
            "cubic_in_out" => Some(Easing::CubicInOut),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::QuadIn => "quad_in",
            Easing::QuadOut => "quad_out",
            Easing::QuadInOut => "quad_in_out",
            Easing::CubicIn => "cubic_in",
            Easing::CubicOut => "cubic_out",
            Easing::CubicInOut => "cubic_in_out",
            Easing::Custom(_) => "custom",
        }
    }
}

/// A value the animation engine can interpolate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AnimValue {
    Scalar(f32),
    Vec2(Vec2),
    Color(Color),
}

impl AnimValue {
    /// Interpolate toward `to`. Values of different kinds do not blend;
    /// the result is `to` as soon as `t > 0`.
    pub fn lerp(self, to: AnimValue, t: f32) -> AnimValue {
        match (self, to) {
            (AnimValue::Scalar(a), AnimValue::Scalar(b)) => AnimValue::Scalar(a + (b - a) * t),
            (AnimValue::Vec2(a), AnimValue::Vec2(b)) => AnimValue::Vec2(a.lerp(b, t)),
            (AnimValue::Color(a), AnimValue::Color(b)) => AnimValue::Color(a.lerp(b, t)),
            (from, to) => {
                if t > 0.0 {
                    to
                } else {
                    from
                }
            }
        }
    }

    pub fn same_kind(&self, other: &AnimValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            AnimValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            AnimValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Color> for AnimValue {
    fn from(c: Color) -> Self {
        AnimValue::Color(c)
    }
}

impl From<f32> for AnimValue {
    fn from(v: f32) -> Self {
        AnimValue::Scalar(v)
    }
}

impl From<Vec2> for AnimValue {
    fn from(v: Vec2) -> Self {
        AnimValue::Vec2(v)
    }
}

/// One transition of one animatable property.
///
/// Times are world-time seconds. While `animating` is false, `current`
/// equals `end`.
#[derive(Copy, Clone, Debug)]
pub struct AnimationState {
    /// World time the transition started at.
    pub start_time: f32,
    /// Duration in seconds.
    pub duration: f32,
    /// Value rendered at `start_time`.
    pub start: AnimValue,
    /// Target value.
    pub end: AnimValue,
    /// Last sampled value.
    pub current: AnimValue,
    /// Whether the transition is still running.
    pub animating: bool,
    /// Easing function to use.
    pub easing: Easing,
}

impl AnimationState {
    /// Settled state holding `value`, with no transition running.
    pub fn settled(value: AnimValue) -> Self {
        AnimationState {
            start_time: 0.0,
            duration: 0.0,
            start: value,
            end: value,
            current: value,
            animating: false,
            easing: Easing::default(),
        }
    }
}
