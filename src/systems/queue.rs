//! Per-entity bounded command queue.
//!
//! [`CommandQueue`] is the single-consumer side owned by the entity and
//! drained on the render thread. [`CommandSender`] is the cloneable,
//! `Send` producer side handed to background workers.
//!
//! Drop policy: when the queue is at capacity the *incoming* command is
//! dropped. Producers never block and never receive an error; the drop is
//! logged with the entity identity and the command tag and counted.

use crate::components::command::Command;
use crate::components::entityid::EntityId;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use log::warn;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub(crate) struct Counters {
    pub(crate) sent: AtomicU64,
    pub(crate) dropped: AtomicU64,
    pub(crate) applied: AtomicU64,
    pub(crate) unhandled: AtomicU64,
    pub(crate) malformed: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Snapshot of an entity's queue counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Commands accepted into the queue.
    pub sent: u64,
    /// Commands rejected because the queue was full or closed.
    pub dropped: u64,
    /// Commands a handler applied successfully.
    pub applied: u64,
    /// Commands no handler claimed.
    pub unhandled: u64,
    /// Commands whose payload did not match their tag.
    pub malformed: u64,
}

/// Producer handle for one entity's queue.
#[derive(Clone)]
pub struct CommandSender {
    owner: EntityId,
    tx: Sender<Command>,
    counters: Arc<Counters>,
}

impl CommandSender {
    /// Queue `cmd` for the owner. Never blocks; drops when full.
    pub fn send_update(&self, cmd: Command) {
        match self.tx.try_send(cmd) {
            Ok(()) => Counters::bump(&self.counters.sent),
            Err(TrySendError::Full(cmd)) => {
                Counters::bump(&self.counters.dropped);
                warn!(
                    "queue of {} is full, dropping '{}' command",
                    self.owner, cmd.tag
                );
            }
            Err(TrySendError::Disconnected(cmd)) => {
                Counters::bump(&self.counters.dropped);
                warn!(
                    "{} is destroyed, dropping '{}' command",
                    self.owner, cmd.tag
                );
            }
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Dropped-command count, as seen by producers.
    pub fn dropped(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }
}

/// Consumer side of an entity's command queue.
pub struct CommandQueue {
    owner: EntityId,
    capacity: usize,
    rx: Option<Receiver<Command>>,
    sender: CommandSender,
}

impl CommandQueue {
    /// Create a queue holding at most `capacity` commands. `capacity` must be > 0.
    pub fn new(owner: EntityId, capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        CommandQueue {
            owner,
            capacity,
            rx: Some(rx),
            sender: CommandSender {
                owner,
                tx,
                counters: Arc::new(Counters::default()),
            },
        }
    }

    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Commands currently waiting.
    pub fn len(&self) -> usize {
        self.rx.as_ref().map_or(0, |rx| rx.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.rx.is_none()
    }

    /// Pop the next command without blocking.
    pub fn try_next(&self) -> Option<Command> {
        self.rx.as_ref().and_then(|rx| rx.try_recv().ok())
    }

    /// Drop the receiving end. Later sends are dropped as `Disconnected`.
    pub fn close(&mut self) {
        self.rx.take();
    }

    pub(crate) fn counters(&self) -> &Counters {
        &self.sender.counters
    }

    pub fn stats(&self) -> QueueStats {
        let c = self.counters();
        QueueStats {
            sent: c.sent.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
            applied: c.applied.load(Ordering::Relaxed),
            unhandled: c.unhandled.load(Ordering::Relaxed),
            malformed: c.malformed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let queue = CommandQueue::new(EntityId(1), 4);
        let tx = queue.sender();
        tx.send_update(Command::text("a"));
        tx.send_update(Command::text("b"));
        assert_eq!(queue.try_next(), Some(Command::text("a")));
        assert_eq!(queue.try_next(), Some(Command::text("b")));
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn test_full_queue_drops_incoming() {
        let queue = CommandQueue::new(EntityId(1), 2);
        let tx = queue.sender();
        tx.send_update(Command::text("a"));
        tx.send_update(Command::text("b"));
        tx.send_update(Command::text("c"));

        assert_eq!(queue.len(), 2);
        assert_eq!(tx.dropped(), 1);
        assert_eq!(queue.try_next(), Some(Command::text("a")));
        assert_eq!(queue.try_next(), Some(Command::text("b")));
        let stats = queue.stats();
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_closed_queue_drops() {
        let mut queue = CommandQueue::new(EntityId(1), 2);
        let tx = queue.sender();
        queue.close();
        tx.send_update(Command::text("late"));
        assert!(queue.is_closed());
        assert_eq!(queue.try_next(), None);
        assert_eq!(queue.stats().dropped, 1);
    }

    #[test]
    fn test_sender_from_other_thread() {
        let queue = CommandQueue::new(EntityId(1), 16);
        let tx = queue.sender();
        std::thread::spawn(move || {
            for i in 0..10 {
                tx.send_update(Command::text(i.to_string()));
            }
        })
        .join()
        .unwrap();
        assert_eq!(queue.len(), 10);
    }
}
