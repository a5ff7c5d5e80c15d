use crate::components::entityid::EntityId;
use crate::components::payload::StorageLocation;
use crate::events::{Event, EventData, EventType};

/// Storage location notifications.
///
/// `StorageActivated` is published when the user picks a location;
/// `StorageListChanged` when the drive monitor delivers a new list.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageEvent {
    pub location: Option<StorageLocation>,
    pub count: usize,
}

impl StorageEvent {
    pub fn activated(source: EntityId, location: StorageLocation) -> Event {
        Event::new(
            EventType::StorageActivated,
            EventData::Storage(StorageEvent {
                location: Some(location),
                count: 1,
            }),
        )
        .with_source(source)
    }

    pub fn list_changed(source: EntityId, count: usize) -> Event {
        Event::new(
            EventType::StorageListChanged,
            EventData::Storage(StorageEvent {
                location: None,
                count,
            }),
        )
        .with_source(source)
    }
}
