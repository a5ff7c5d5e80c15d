//! Event records exchanged through the [`EventBus`](crate::resources::eventbus::EventBus).
//!
//! Events provide a decoupled way for entities to react to changes in
//! unrelated entities and background workers without holding references to
//! each other. An [`Event`] is immutable once built: its fields are private
//! and every subscriber receives its own copy.
//!
//! Submodules:
//! - [`interaction`] – hover/active/focus edges and clicks emitted by entities
//! - [`preset`] – preset parser completion notifications
//! - [`scan`] – directory scan lifecycle notifications
//! - [`storage`] – storage location activation and list changes
pub mod interaction;
pub mod preset;
pub mod scan;
pub mod storage;

use crate::components::entityid::EntityId;
use interaction::InteractionEvent;
use preset::PresetEvent;
use scan::ScanEvent;
use storage::StorageEvent;
use std::fmt;

/// Discriminator used to route events to subscribers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    HoverIn,
    HoverOut,
    ActiveIn,
    ActiveOut,
    FocusIn,
    FocusOut,
    Click,
    DoubleClick,
    ScanStarted,
    ScanProgress,
    ScanCompleted,
    ScanFailed,
    StorageActivated,
    StorageListChanged,
    PresetLoaded,
    PresetFailed,
    Custom(&'static str),
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Custom(name) => write!(f, "custom:{name}"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventData {
    None,
    Interaction(InteractionEvent),
    Scan(ScanEvent),
    Storage(StorageEvent),
    Preset(PresetEvent),
    Text(String),
}

/// Immutable event record.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    kind: EventType,
    source: Option<EntityId>,
    data: EventData,
}

impl Event {
    pub fn new(kind: EventType, data: EventData) -> Self {
        Event {
            kind,
            source: None,
            data,
        }
    }

    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn event_type(&self) -> EventType {
        self.kind
    }

    /// Entity that emitted the event, if any.
    pub fn source(&self) -> Option<EntityId> {
        self.source
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let id = EntityId(7);
        let ev = Event::new(EventType::Custom("ping"), EventData::Text("x".into())).with_source(id);
        assert_eq!(ev.event_type(), EventType::Custom("ping"));
        assert_eq!(ev.source(), Some(id));
        assert_eq!(ev.data(), &EventData::Text("x".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(EventType::ScanCompleted.to_string(), "ScanCompleted");
        assert_eq!(EventType::Custom("tick").to_string(), "custom:tick");
    }
}
