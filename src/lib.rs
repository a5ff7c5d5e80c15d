//! syncframe library.
//!
//! Concurrent state-synchronisation substrate for immediate-mode UIs:
//! background workers send typed commands to entity-owned bounded queues,
//! the render thread drains and applies them once per frame, animates
//! property transitions, samples interaction edges and fans events out to
//! filtered subscribers.
//!
//! - [`components`] – plain data: tags, payloads, properties, colours
//! - [`entity`] – the composed entity and its builder
//! - [`error`] – payload and construction errors
//! - [`events`] – event records routed through the bus
//! - [`resources`] – shared services: bus, config, drag-drop, clock
//! - [`systems`] – queue, dispatcher, animation, interaction, monitors, frame loop
//! - [`widgets`] – concrete entities driven by the frame loop

pub mod components;
pub mod entity;
pub mod error;
pub mod events;
pub mod resources;
pub mod systems;
pub mod widgets;
