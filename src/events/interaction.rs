//! Interaction events emitted by the per-frame interaction state machine.
//!
//! One [`InteractionEvent`] is published for every edge bit and every click
//! detected in a frame. See [`crate::systems::interaction`].

use crate::components::entityid::EntityId;
use crate::components::interaction::{InteractionState, MouseButton};
use crate::events::{Event, EventData, EventType};

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionEvent {
    /// Entity whose hit-test region produced the event.
    pub entity: EntityId,
    /// Full interaction state (levels and edges) of the frame.
    pub state: InteractionState,
    /// Button for click events.
    pub button: Option<MouseButton>,
    /// Entity-specific context, e.g. the row under the cursor.
    pub context: Option<String>,
}

impl InteractionEvent {
    pub fn into_event(self, kind: EventType) -> Event {
        let source = self.entity;
        Event::new(kind, EventData::Interaction(self)).with_source(source)
    }
}
