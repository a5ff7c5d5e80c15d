//! Drag-and-drop payload store.
//!
//! Holds at most one in-flight drag. Owned by [`AppContext`] instead of being
//! a process-wide global so each application instance (and each test) gets
//! its own.
//!
//! [`AppContext`]: crate::resources::context::AppContext

use crate::components::entityid::EntityId;
use crate::components::payload::Payload;
use log::debug;
use parking_lot::Mutex;

#[derive(Clone, Debug, PartialEq)]
pub struct DragPayload {
    pub source: EntityId,
    pub payload: Payload,
}

#[derive(Default)]
pub struct DragDropStore {
    current: Mutex<Option<DragPayload>>,
}

impl DragDropStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag, replacing any drag still in flight.
    pub fn begin(&self, source: EntityId, payload: Payload) {
        let mut current = self.current.lock();
        if let Some(prev) = current.as_ref() {
            debug!("dragdrop: drag from {} replaced by {}", prev.source, source);
        }
        *current = Some(DragPayload { source, payload });
    }

    pub fn peek(&self) -> Option<DragPayload> {
        self.current.lock().clone()
    }

    /// Complete the drop, taking the payload out.
    pub fn take(&self) -> Option<DragPayload> {
        self.current.lock().take()
    }

    pub fn cancel(&self) {
        self.current.lock().take();
    }

    pub fn is_dragging(&self) -> bool {
        self.current.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_take() {
        let store = DragDropStore::new();
        assert!(!store.is_dragging());
        store.begin(EntityId(1), Payload::from("/a.wav"));
        assert!(store.is_dragging());
        assert_eq!(store.peek().unwrap().source, EntityId(1));

        let taken = store.take().unwrap();
        assert_eq!(taken.payload, Payload::from("/a.wav"));
        assert!(store.take().is_none());
    }

    #[test]
    fn test_begin_replaces() {
        let store = DragDropStore::new();
        store.begin(EntityId(1), Payload::Index(0));
        store.begin(EntityId(2), Payload::Index(5));
        assert_eq!(store.take().unwrap().source, EntityId(2));
    }

    #[test]
    fn test_cancel() {
        let store = DragDropStore::new();
        store.begin(EntityId(1), Payload::None);
        store.cancel();
        assert!(store.peek().is_none());
    }
}
