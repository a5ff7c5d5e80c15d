//! Substrate systems.
//!
//! This module groups the per-frame machinery that moves data from
//! background producers into entity state and back out as events.
//!
//! Submodules overview
//! - [`dispatcher`] – resolve drained commands to handlers, count outcomes
//! - [`frame`] – own the widgets and run tick, layout and build each frame
//! - [`interaction`] – hit-test sampling, level/edge bits and interaction events
//! - [`monitor`] – cooperative background threads with close-once shutdown
//! - [`queue`] – bounded per-entity command queue with drop-newest policy
//! - [`subscription`] – filtered event streams and the owner-level subscriber
//! - [`tween`] – easing curves and the per-entity animation table

pub mod dispatcher;
pub mod frame;
pub mod interaction;
pub mod monitor;
pub mod queue;
pub mod subscription;
pub mod tween;
