//! Plain data owned by UI entities.
//!
//! This module groups the value types that entities carry and that commands
//! transport. None of these types do any synchronization themselves; the
//! queues and locks live in [`crate::systems`].
//!
//! Submodules overview:
//! - [`color`] – RGBA colour value and blending
//! - [`command`] – type tags and commands queued for the render thread
//! - [`entityid`] – process-unique entity identity
//! - [`geometry`] – 2D vector and rectangle
//! - [`interaction`] – hover/active/focus bitmask and click records
//! - [`payload`] – command payloads and collaborator records
//! - [`properties`] – externally settable properties and layout strategies
//! - [`tween`] – easing curves and per-property animation state

pub mod color;
pub mod command;
pub mod entityid;
pub mod geometry;
pub mod interaction;
pub mod payload;
pub mod properties;
pub mod tween;
