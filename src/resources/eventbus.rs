//! Process-wide event bus.
//!
//! The [`EventBus`] maps an [`EventType`] to the delivery channels of every
//! owner subscribed to it. It is shared through [`AppContext`] as an `Arc`
//! and may be used from any thread.
//!
//! Locking:
//! - the registry lock covers register/unregister and the enumeration step
//!   of `publish`; it is never held while sending.
//! - every subscription has its own delivery slot guarded by a small
//!   read-write lock. `publish` sends while holding the slot's read lock,
//!   and `unsubscribe` takes the slot's write lock after removing the
//!   routing entry. Once `unsubscribe` returns, a publish either delivered
//!   before it or will not deliver at all.
//!
//! Delivery is `try_send`: a full subscriber channel loses that one event
//! (logged and counted) without affecting other subscribers.
//!
//! [`AppContext`]: crate::resources::context::AppContext

use crate::components::entityid::EntityId;
use crate::events::{Event, EventType};
use crossbeam_channel::{Sender, TrySendError};
use log::{debug, warn};
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

struct SlotInner {
    sender: Option<Sender<Event>>,
    types: FxHashSet<EventType>,
}

/// Delivery endpoint of one subscription.
struct Slot {
    owner: EntityId,
    inner: RwLock<SlotInner>,
}

impl Slot {
    fn new(owner: EntityId, types: &[EventType], sender: Sender<Event>) -> Arc<Slot> {
        Arc::new(Slot {
            owner,
            inner: RwLock::new(SlotInner {
                sender: Some(sender),
                types: types.iter().copied().collect(),
            }),
        })
    }

    /// Stop routing `kind` through this slot. Waits for in-flight sends.
    fn retire_type(&self, kind: EventType) {
        let mut inner = self.inner.write();
        inner.types.remove(&kind);
        if inner.types.is_empty() {
            inner.sender = None;
        }
    }

    fn close(&self) {
        let mut inner = self.inner.write();
        inner.types.clear();
        inner.sender = None;
    }
}

type Routes = SmallVec<[Arc<Slot>; 4]>;

/// Counters readable from any thread.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BusStats {
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
}

#[derive(Default)]
pub struct EventBus {
    registry: RwLock<FxHashMap<EventType, Routes>>,
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `owner` to one event type.
    ///
    /// An existing subscription of `owner` to `kind` is replaced.
    pub fn subscribe(&self, kind: EventType, owner: EntityId, sender: Sender<Event>) {
        self.subscribe_multiple(&[kind], owner, sender);
    }

    /// Subscribe `owner` to several event types sharing one channel.
    ///
    /// Events of all listed types arrive on `sender` in publish order.
    pub fn subscribe_multiple(&self, kinds: &[EventType], owner: EntityId, sender: Sender<Event>) {
        let slot = Slot::new(owner, kinds, sender);
        let mut replaced: SmallVec<[(EventType, Arc<Slot>); 4]> = SmallVec::new();
        {
            let mut registry = self.registry.write();
            for kind in kinds {
                let routes = registry.entry(*kind).or_default();
                if let Some(pos) = routes.iter().position(|s| s.owner == owner) {
                    replaced.push((*kind, routes.remove(pos)));
                }
                routes.push(slot.clone());
            }
        }
        for (kind, old) in replaced {
            if !Arc::ptr_eq(&old, &slot) {
                debug!("eventbus: {} re-subscribed to {}, replacing old route", owner, kind);
                old.retire_type(kind);
            }
        }
    }

    /// Remove the routing entry for (`owner`, `kind`).
    ///
    /// After this returns no further `kind` events are enqueued for `owner`.
    pub fn unsubscribe(&self, kind: EventType, owner: EntityId) {
        let removed = {
            let mut registry = self.registry.write();
            let Some(routes) = registry.get_mut(&kind) else {
                return;
            };
            let removed = routes
                .iter()
                .position(|s| s.owner == owner)
                .map(|pos| routes.remove(pos));
            if routes.is_empty() {
                registry.remove(&kind);
            }
            removed
        };
        if let Some(slot) = removed {
            slot.retire_type(kind);
            debug!("eventbus: {} unsubscribed from {}", owner, kind);
        }
    }

    /// Remove every routing entry of `owner`.
    pub fn unsubscribe_all(&self, owner: EntityId) {
        let mut removed: Vec<Arc<Slot>> = Vec::new();
        {
            let mut registry = self.registry.write();
            registry.retain(|_, routes| {
                routes.retain(|s| {
                    if s.owner == owner {
                        removed.push(s.clone());
                        false
                    } else {
                        true
                    }
                });
                !routes.is_empty()
            });
        }
        for slot in &removed {
            slot.close();
        }
        if !removed.is_empty() {
            debug!("eventbus: {} unsubscribed from all ({} routes)", owner, removed.len());
        }
    }

    /// Deliver a copy of `event` to every subscriber of its type.
    ///
    /// Never blocks. Returns the number of subscribers that received it.
    pub fn publish(&self, event: Event) -> usize {
        let kind = event.event_type();
        self.published.fetch_add(1, Ordering::Relaxed);
        let routes: Routes = match self.registry.read().get(&kind) {
            Some(routes) => routes.clone(),
            None => return 0,
        };

        let mut delivered = 0;
        for slot in routes {
            let inner = slot.inner.read();
            if !inner.types.contains(&kind) {
                continue;
            }
            let Some(sender) = inner.sender.as_ref() else {
                continue;
            };
            match sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "eventbus: channel of {} is full, dropping {} event",
                        slot.owner, kind
                    );
                }
                Err(TrySendError::Disconnected(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        "eventbus: receiver of {} is gone, dropping {} event",
                        slot.owner, kind
                    );
                }
            }
        }
        self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
        delivered
    }

    /// Number of owners currently routed for `kind`.
    pub fn subscriber_count(&self, kind: EventType) -> usize {
        self.registry.read().get(&kind).map_or(0, |r| r.len())
    }

    pub fn is_subscribed(&self, kind: EventType, owner: EntityId) -> bool {
        self.registry
            .read()
            .get(&kind)
            .is_some_and(|r| r.iter().any(|s| s.owner == owner))
    }

    pub fn stats(&self) -> BusStats {
        BusStats {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}
