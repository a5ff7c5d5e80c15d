//! Long-lived shared services.
//!
//! This module groups the objects created once by the application root and
//! passed to entity constructors through [`context::AppContext`]. Each
//! submodule documents the semantics and intended usage of its resource(s).
//!
//! Overview
//! - `context` – bundle of shared services cloned into every entity
//! - `dragdrop` – the single in-flight drag-and-drop payload
//! - `eventbus` – event type to subscriber channel routing
//! - `metadata` – pull-based audio metadata cache for row formatting
//! - `syncconfig` – queue sizes, drain caps and animation defaults from INI
//! - `worldtime` – frame clock and delta
pub mod context;
pub mod dragdrop;
pub mod eventbus;
pub mod metadata;
pub mod syncconfig;
pub mod worldtime;
