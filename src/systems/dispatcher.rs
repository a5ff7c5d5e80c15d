//! Per-frame command dispatch.
//!
//! [`process_updates`] drains up to `max_per_frame` commands from an entity's
//! [`CommandQueue`] in FIFO order and resolves each one:
//! 1. the handler registered for the command's tag, if any;
//! 2. otherwise the legacy handler, if one is installed (it may report the
//!    command as applied, not handled, or malformed);
//! 3. otherwise the command is logged as unhandled and discarded.
//!
//! Commands left over after the cap stay queued, in order, for the next
//! frame. A handler that rejects its payload leaves the entity untouched
//! beyond that field; the mismatch is logged and counted.

use crate::components::command::{Command, TypeTag};
use crate::components::payload::Payload;
use crate::error::PayloadError;
use crate::systems::queue::{CommandQueue, Counters};
use log::{debug, warn};
use rustc_hash::FxHashMap;

/// Handler for one tag. Receives the entity state and the payload.
pub type Handler<S> = Box<dyn FnMut(&mut S, &Payload) -> Result<(), PayloadError>>;

/// Catch-all handler from the older single-function wiring.
pub type LegacyHandler<S> = Box<dyn FnMut(&mut S, &Command) -> Handled>;

/// Verdict of a legacy handler. `Malformed` means the tag was recognised but
/// its payload had the wrong shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Handled {
    Yes,
    No,
    Malformed(PayloadError),
}

impl Handled {
    /// Map a payload accessor result onto a verdict.
    pub fn from_result(r: Result<(), PayloadError>) -> Handled {
        match r {
            Ok(()) => Handled::Yes,
            Err(e) => Handled::Malformed(e),
        }
    }
}

/// Result of dispatching one command.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Applied,
    Malformed(PayloadError),
    Unhandled,
}

pub struct Dispatcher<S> {
    handlers: FxHashMap<TypeTag, Handler<S>>,
    legacy: Option<LegacyHandler<S>>,
}

impl<S> Default for Dispatcher<S> {
    fn default() -> Self {
        Dispatcher {
            handlers: FxHashMap::default(),
            legacy: None,
        }
    }
}

impl<S> Dispatcher<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `tag`, replacing any earlier one.
    pub fn register<F>(&mut self, tag: TypeTag, handler: F)
    where
        F: FnMut(&mut S, &Payload) -> Result<(), PayloadError> + 'static,
    {
        if self.handlers.insert(tag.clone(), Box::new(handler)).is_some() {
            debug!("dispatcher: handler for '{}' replaced", tag);
        }
    }

    pub fn set_legacy<F>(&mut self, handler: F)
    where
        F: FnMut(&mut S, &Command) -> Handled + 'static,
    {
        self.legacy = Some(Box::new(handler));
    }

    pub fn is_registered(&self, tag: &TypeTag) -> bool {
        self.handlers.contains_key(tag)
    }

    /// True when neither per-tag nor legacy handlers exist.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.legacy.is_none()
    }

    pub fn dispatch(&mut self, state: &mut S, cmd: &Command) -> Outcome {
        if let Some(handler) = self.handlers.get_mut(&cmd.tag) {
            return match handler(state, &cmd.data) {
                Ok(()) => Outcome::Applied,
                Err(e) => Outcome::Malformed(e),
            };
        }
        match self.legacy.as_mut() {
            Some(legacy) => match legacy(state, cmd) {
                Handled::Yes => Outcome::Applied,
                Handled::No => Outcome::Unhandled,
                Handled::Malformed(e) => Outcome::Malformed(e),
            },
            None => Outcome::Unhandled,
        }
    }
}

/// Drain and apply up to `max_per_frame` commands. Returns how many were taken.
///
/// With no handlers at all the queue is still drained (commands discarded),
/// so an unwired entity never accumulates memory.
pub fn process_updates<S>(
    queue: &CommandQueue,
    dispatcher: &mut Dispatcher<S>,
    state: &mut S,
    max_per_frame: usize,
) -> usize {
    let owner = queue.owner();
    let counters: &Counters = queue.counters();
    let pure_drain = dispatcher.is_empty();
    let mut taken = 0;

    while taken < max_per_frame {
        let Some(cmd) = queue.try_next() else {
            break;
        };
        taken += 1;
        if pure_drain {
            Counters::bump(&counters.unhandled);
            continue;
        }
        match dispatcher.dispatch(state, &cmd) {
            Outcome::Applied => Counters::bump(&counters.applied),
            Outcome::Malformed(e) => {
                Counters::bump(&counters.malformed);
                warn!("{}: ignoring '{}' command: {}", owner, cmd.tag, e);
            }
            Outcome::Unhandled => {
                Counters::bump(&counters.unhandled);
                debug!("{}: unhandled '{}' command", owner, cmd.tag);
            }
        }
    }

    if pure_drain && taken > 0 {
        debug!("{}: no handlers, discarded {} commands", owner, taken);
    }
    if taken == max_per_frame && !queue.is_empty() {
        warn!(
            "{}: hit per-frame cap of {} commands, {} still queued",
            owner,
            max_per_frame,
            queue.len()
        );
    }
    taken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entityid::EntityId;

    #[derive(Default)]
    struct Label {
        text: String,
        count: i64,
        legacy_seen: Vec<String>,
    }

    fn label_dispatcher() -> Dispatcher<Label> {
        let mut d = Dispatcher::new();
        d.register(TypeTag::Text, |s: &mut Label, p: &Payload| {
            s.text = p.as_text()?.to_string();
            Ok(())
        });
        d.register(TypeTag::Local("count"), |s: &mut Label, p: &Payload| {
            s.count = p.as_int()?;
            Ok(())
        });
        d
    }

    // ==================== RESOLUTION TESTS ====================

    #[test]
    fn test_registered_handler_applies() {
        let mut d = label_dispatcher();
        let mut s = Label::default();
        assert_eq!(d.dispatch(&mut s, &Command::text("hi")), Outcome::Applied);
        assert_eq!(s.text, "hi");
    }

    #[test]
    fn test_malformed_payload_leaves_state_untouched() {
        let mut d = label_dispatcher();
        let mut s = Label {
            text: "keep".into(),
            count: 3,
            ..Default::default()
        };
        let out = d.dispatch(&mut s, &Command::new(TypeTag::Text, Payload::Int(1)));
        assert!(matches!(out, Outcome::Malformed(_)));
        assert_eq!(s.text, "keep");
        assert_eq!(s.count, 3);
    }

    #[test]
    fn test_legacy_fallback() {
        let mut d = label_dispatcher();
        d.set_legacy(|s: &mut Label, cmd: &Command| {
            if cmd.tag == TypeTag::Tooltip {
                s.legacy_seen.push(cmd.tag.to_string());
                Handled::Yes
            } else {
                Handled::No
            }
        });
        let mut s = Label::default();
        assert_eq!(
            d.dispatch(&mut s, &Command::new(TypeTag::Tooltip, "tip")),
            Outcome::Applied
        );
        assert_eq!(
            d.dispatch(&mut s, &Command::action(TypeTag::Collapsed)),
            Outcome::Unhandled
        );
        // registered tags never reach the legacy handler
        d.dispatch(&mut s, &Command::text("x"));
        assert_eq!(s.legacy_seen, vec!["tooltip".to_string()]);
    }

    #[test]
    fn test_legacy_malformed_counts_as_malformed() {
        let queue = CommandQueue::new(EntityId(1), 8);
        let tx = queue.sender();
        tx.send_update(Command::new(TypeTag::Tooltip, Payload::Int(3)));
        tx.send_update(Command::new(TypeTag::Tooltip, "tip"));
        let mut d: Dispatcher<Label> = Dispatcher::new();
        d.set_legacy(|s: &mut Label, cmd: &Command| {
            Handled::from_result(cmd.data.as_text().map(|t| s.legacy_seen.push(t.to_string())))
        });
        let mut s = Label::default();
        process_updates(&queue, &mut d, &mut s, 8);
        let stats = queue.stats();
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.unhandled, 0);
        assert_eq!(s.legacy_seen, vec!["tip".to_string()]);
    }

    #[test]
    fn test_unknown_tag_unhandled() {
        let mut d = label_dispatcher();
        let mut s = Label::default();
        let cmd = Command::new(TypeTag::from_name("nope"), Payload::None);
        assert_eq!(d.dispatch(&mut s, &cmd), Outcome::Unhandled);
    }

    #[test]
    fn test_register_replaces() {
        let mut d = label_dispatcher();
        d.register(TypeTag::Text, |s: &mut Label, _p: &Payload| {
            s.text = "replaced".into();
            Ok(())
        });
        let mut s = Label::default();
        d.dispatch(&mut s, &Command::text("x"));
        assert_eq!(s.text, "replaced");
    }

    // ==================== DRAIN TESTS ====================

    #[test]
    fn test_process_updates_respects_cap_and_order() {
        let queue = CommandQueue::new(EntityId(1), 16);
        let tx = queue.sender();
        for t in ["a", "b", "c", "d", "e"] {
            tx.send_update(Command::text(t));
        }
        let mut d = label_dispatcher();
        let mut s = Label::default();

        assert_eq!(process_updates(&queue, &mut d, &mut s, 2), 2);
        assert_eq!(s.text, "b");
        assert_eq!(queue.len(), 3);
        assert_eq!(process_updates(&queue, &mut d, &mut s, 2), 2);
        assert_eq!(s.text, "d");
        assert_eq!(process_updates(&queue, &mut d, &mut s, 2), 1);
        assert_eq!(s.text, "e");
        assert_eq!(process_updates(&queue, &mut d, &mut s, 2), 0);
        assert_eq!(queue.stats().applied, 5);
    }

    #[test]
    fn test_pure_drain_without_handlers() {
        let queue = CommandQueue::new(EntityId(1), 8);
        let tx = queue.sender();
        for _ in 0..3 {
            tx.send_update(Command::text("x"));
        }
        let mut d: Dispatcher<Label> = Dispatcher::new();
        let mut s = Label::default();
        assert_eq!(process_updates(&queue, &mut d, &mut s, 10), 3);
        assert!(queue.is_empty());
        assert!(s.text.is_empty());
        assert_eq!(queue.stats().unhandled, 3);
    }

    #[test]
    fn test_counters_classify_outcomes() {
        let queue = CommandQueue::new(EntityId(1), 8);
        let tx = queue.sender();
        tx.send_update(Command::text("ok"));
        tx.send_update(Command::new(TypeTag::Text, Payload::Bool(true)));
        tx.send_update(Command::action(TypeTag::Visible));
        let mut d = label_dispatcher();
        let mut s = Label::default();
        process_updates(&queue, &mut d, &mut s, 8);
        let stats = queue.stats();
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.unhandled, 1);
    }
}
