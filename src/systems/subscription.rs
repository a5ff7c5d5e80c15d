//! Consumer-side subscription helpers.
//!
//! - [`FilteredSubscription`] – one bounded channel subscribed to several
//!   event types for a single owner, drained once per frame.
//! - [`EventSubscriber`] – owner-level component wrapping a lazily created
//!   filtered subscription; composed into any entity that listens to the bus
//!   and released by the entity's `destroy()`.

use crate::components::command::Command;
use crate::components::entityid::EntityId;
use crate::events::{Event, EventType};
use crate::resources::eventbus::EventBus;
use crate::systems::queue::CommandSender;
use crossbeam_channel::{Receiver, Sender, bounded};
use smallvec::SmallVec;
use std::sync::Arc;

/// Several event types multiplexed into one ordered channel.
///
/// Unsubscribes from the bus on [`close`](Self::close) or drop.
pub struct FilteredSubscription {
    bus: Arc<EventBus>,
    owner: EntityId,
    types: SmallVec<[EventType; 8]>,
    tx: Sender<Event>,
    rx: Receiver<Event>,
    closed: bool,
}

impl FilteredSubscription {
    pub fn new(bus: Arc<EventBus>, owner: EntityId, types: &[EventType], capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        let mut unique: SmallVec<[EventType; 8]> = SmallVec::new();
        for t in types {
            if !unique.contains(t) {
                unique.push(*t);
            }
        }
        bus.subscribe_multiple(&unique, owner, tx.clone());
        FilteredSubscription {
            bus,
            owner,
            types: unique,
            tx,
            rx,
            closed: false,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn types(&self) -> &[EventType] {
        &self.types
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Start routing `kind` into this channel too.
    pub fn add_type(&mut self, kind: EventType) {
        if self.closed || self.types.contains(&kind) {
            return;
        }
        self.bus.subscribe(kind, self.owner, self.tx.clone());
        self.types.push(kind);
    }

    /// Stop routing `kind`. Events of that type already queued stay queued.
    pub fn remove_type(&mut self, kind: EventType) {
        if let Some(pos) = self.types.iter().position(|t| *t == kind) {
            self.bus.unsubscribe(kind, self.owner);
            self.types.remove(pos);
        }
    }

    /// Events waiting in the channel.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Pop up to `max` events in publish order and hand each to `f`.
    pub fn drain(&self, max: usize, mut f: impl FnMut(Event)) -> usize {
        let mut n = 0;
        while n < max {
            let Ok(ev) = self.rx.try_recv() else {
                break;
            };
            f(ev);
            n += 1;
        }
        n
    }

    /// Drain up to `max` events, translating each into a command for `sender`.
    ///
    /// Events `translate` maps to `None` are discarded.
    pub fn drain_into(
        &self,
        sender: &CommandSender,
        max: usize,
        mut translate: impl FnMut(&Event) -> Option<Command>,
    ) -> usize {
        self.drain(max, |ev| {
            if let Some(cmd) = translate(&ev) {
                sender.send_update(cmd);
            }
        })
    }

    /// Remove every routing entry of this subscription. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        for kind in &self.types {
            self.bus.unsubscribe(*kind, self.owner);
        }
        self.closed = true;
    }
}

impl Drop for FilteredSubscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Owned-events helper composed into entities.
pub struct EventSubscriber {
    bus: Arc<EventBus>,
    owner: EntityId,
    capacity: usize,
    stream: Option<FilteredSubscription>,
}

impl EventSubscriber {
    pub fn new(bus: Arc<EventBus>, owner: EntityId, capacity: usize) -> Self {
        EventSubscriber {
            bus,
            owner,
            capacity,
            stream: None,
        }
    }

    /// Listen to more event types on the owner's single stream.
    pub fn listen(&mut self, types: &[EventType]) {
        match self.stream.as_mut() {
            Some(stream) => {
                for t in types {
                    stream.add_type(*t);
                }
            }
            None => {
                self.stream = Some(FilteredSubscription::new(
                    self.bus.clone(),
                    self.owner,
                    types,
                    self.capacity,
                ));
            }
        }
    }

    pub fn stop_listening(&mut self, kind: EventType) {
        if let Some(stream) = self.stream.as_mut() {
            stream.remove_type(kind);
        }
    }

    pub fn is_listening(&self, kind: EventType) -> bool {
        self.stream
            .as_ref()
            .is_some_and(|s| s.types().contains(&kind))
    }

    pub fn drain_into(
        &self,
        sender: &CommandSender,
        max: usize,
        translate: impl FnMut(&Event) -> Option<Command>,
    ) -> usize {
        match self.stream.as_ref() {
            Some(stream) => stream.drain_into(sender, max, translate),
            None => 0,
        }
    }

    /// Release every subscription of the owner.
    pub fn destroy(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
        }
        self.bus.unsubscribe_all(self.owner);
    }
}
