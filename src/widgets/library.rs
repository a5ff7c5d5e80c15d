//! Sample library tree.
//!
//! Fed from three places:
//! - the directory scanner, which publishes scan lifecycle events and sends
//!   the finished tree as `SetTree`;
//! - a search worker sending flat `SetRows` result sets;
//! - `StorageActivated` events, which re-root the tree.
//!
//! Scan events for a root other than the current one are stale and ignored.
//! The check runs when the status command is applied, so a re-root queued
//! earlier in the same frame is already in effect.

use crate::components::command::{Command, TypeTag};
use crate::components::entityid::EntityId;
use crate::components::geometry::{Rect, Vec2};
use crate::components::interaction::InteractionState;
use crate::components::payload::{Payload, Row, ScanStatus, TreeNode};
use crate::components::properties::LayoutStrategy;
use crate::entity::{Entity, EntityState};
use crate::error::{BuildError, PayloadError};
use crate::events::{Event, EventData, EventType};
use crate::resources::context::AppContext;
use crate::systems::interaction::HitTest;
use crate::systems::queue::CommandSender;
use crate::widgets::{RenderSnapshot, Widget, settle};
use log::debug;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SCAN_STATUS: TypeTag = TypeTag::Local("scan_status");
pub const SET_ROOT: TypeTag = TypeTag::Local("set_root");
pub const SELECT: TypeTag = TypeTag::Local("select");
pub const TOGGLE: TypeTag = TypeTag::Local("toggle");

const LISTENS: [EventType; 5] = [
    EventType::ScanStarted,
    EventType::ScanProgress,
    EventType::ScanCompleted,
    EventType::ScanFailed,
    EventType::StorageActivated,
];

#[derive(Debug, Default)]
pub struct LibraryState {
    pub root: Option<PathBuf>,
    pub tree: Option<Arc<TreeNode>>,
    /// Search results; shown instead of the tree while set.
    pub results: Option<Arc<Vec<Row>>>,
    pub status: String,
    pub selected: Option<usize>,
    pub collapsed: FxHashSet<PathBuf>,
    pub drags: u32,
}

/// One visible line of the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub depth: usize,
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

fn flatten(node: &TreeNode, depth: usize, collapsed: &FxHashSet<PathBuf>, out: &mut Vec<Entry>) {
    out.push(Entry {
        depth,
        name: node.name.clone(),
        path: node.path.clone(),
        is_dir: node.is_dir,
    });
    if node.is_dir && !collapsed.contains(&node.path) {
        for child in &node.children {
            flatten(child, depth + 1, collapsed, out);
        }
    }
}

impl LibraryState {
    pub fn entries(&self) -> Vec<Entry> {
        let mut out = Vec::new();
        if let Some(rows) = &self.results {
            out.extend(rows.iter().map(|r| Entry {
                depth: 0,
                name: r.name.clone(),
                path: r.path.clone(),
                is_dir: false,
            }));
        } else if let Some(tree) = &self.tree {
            flatten(tree, 0, &self.collapsed, &mut out);
        }
        out
    }

    fn accepts_scan_of(&self, path: &Path) -> bool {
        self.root.as_deref().is_none_or(|root| root == path)
    }
}

fn translate(ev: &Event) -> Option<Command> {
    match (ev.event_type(), ev.data()) {
        (EventType::StorageActivated, EventData::Storage(s)) => {
            let loc = s.location.as_ref()?;
            Some(Command::new(
                SET_ROOT,
                loc.mount.to_string_lossy().into_owned(),
            ))
        }
        (kind, EventData::Scan(scan)) => {
            let text = match kind {
                EventType::ScanStarted => format!("Scanning {}", scan.path.display()),
                EventType::ScanProgress => format!("Scanning: {} files", scan.files),
                EventType::ScanCompleted => format!("{} files", scan.files),
                EventType::ScanFailed => format!(
                    "Scan failed: {}",
                    scan.error.as_deref().unwrap_or("unknown error")
                ),
                _ => return None,
            };
            Some(Command::new(
                SCAN_STATUS,
                Payload::Scan(Arc::new(ScanStatus {
                    root: scan.path.clone(),
                    text,
                })),
            ))
        }
        _ => None,
    }
}

pub struct LibraryTree {
    entity: Entity<LibraryState>,
}

impl LibraryTree {
    pub fn new(ctx: &AppContext) -> Result<Self, BuildError> {
        let mut entity = Entity::builder("library", ctx, LibraryState::default())
            .with_layout(LayoutStrategy::Fill)
            .build()?;

        entity.on(TypeTag::SetTree, |s: &mut EntityState<LibraryState>, p: &Payload| {
            let tree = p.as_tree()?;
            s.local.status = format!("{} files", tree.file_count());
            s.local.tree = Some(tree);
            s.local.results = None;
            s.local.selected = None;
            Ok(())
        });
        entity.on(TypeTag::SetRows, |s: &mut EntityState<LibraryState>, p: &Payload| {
            let rows = p.as_rows()?;
            s.local.results = if rows.is_empty() { None } else { Some(rows) };
            s.local.selected = None;
            Ok(())
        });
        entity.on(SCAN_STATUS, |s: &mut EntityState<LibraryState>, p: &Payload| {
            let scan = p.as_scan()?;
            if !s.local.accepts_scan_of(&scan.root) {
                debug!("{}: stale scan status for {}", s.id, scan.root.display());
                return Ok(());
            }
            s.local.status = scan.text.clone();
            Ok(())
        });
        entity.on(SET_ROOT, |s: &mut EntityState<LibraryState>, p: &Payload| {
            let root = PathBuf::from(p.as_text()?);
            s.local.status = format!("Waiting for scan of {}", root.display());
            s.local.root = Some(root);
            s.local.tree = None;
            s.local.results = None;
            s.local.selected = None;
            Ok(())
        });
        entity.on(SELECT, |s: &mut EntityState<LibraryState>, p: &Payload| {
            let index = p.as_index()?;
            let len = s.local.entries().len();
            if index >= len {
                return Err(PayloadError::Invalid(format!(
                    "row {} out of range ({} rows)",
                    index, len
                )));
            }
            s.local.selected = Some(index);
            Ok(())
        });
        entity.on(TOGGLE, |s: &mut EntityState<LibraryState>, p: &Payload| {
            let path = PathBuf::from(p.as_text()?);
            if !s.local.collapsed.remove(&path) {
                s.local.collapsed.insert(path);
            }
            s.local.selected = None;
            Ok(())
        });

        entity.listen(&LISTENS);
        Ok(LibraryTree { entity })
    }

    pub fn state(&self) -> &LibraryState {
        self.entity.local()
    }

    pub fn entity(&self) -> &Entity<LibraryState> {
        &self.entity
    }

    fn selected_entry(&self) -> Option<Entry> {
        let state = self.entity.local();
        let index = state.selected?;
        state.entries().into_iter().nth(index)
    }
}

impl Widget for LibraryTree {
    fn id(&self) -> EntityId {
        self.entity.id()
    }

    fn name(&self) -> &str {
        self.entity.name()
    }

    fn sender(&self) -> CommandSender {
        self.entity.sender()
    }

    fn tick(&mut self, now: f32) {
        self.entity.drain_events(translate);
        settle(&mut self.entity, now);
    }

    fn layout(&mut self, origin: Vec2, available: Vec2) -> Rect {
        self.entity.layout(origin, available)
    }

    fn build(&mut self, hit: &dyn HitTest) {
        let selected = self.selected_entry();
        let context = selected.as_ref().map(|e| e.name.as_str());
        let frame = self.entity.update_interaction(hit, context);

        // pressing on a selected file starts dragging it
        if let Some(entry) = selected {
            let drag = &self.entity.context().drag_drop;
            if frame.state.contains(InteractionState::ACTIVE_IN) && !entry.is_dir && !drag.is_dragging()
            {
                drag.begin(
                    self.entity.id(),
                    Payload::Text(entry.path.to_string_lossy().into_owned()),
                );
                self.entity.local_mut().drags += 1;
            }
        }
    }

    fn snapshot(&self) -> RenderSnapshot {
        let state = self.entity.local();
        let rows = state
            .entries()
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let marker = if Some(i) == state.selected { ">" } else { " " };
                let suffix = if e.is_dir { "/" } else { "" };
                format!("{}{}{}{}", marker, "  ".repeat(e.depth), e.name, suffix)
            })
            .collect();
        RenderSnapshot::of(&self.entity, "library")
            .with_status(state.status.clone())
            .with_rows(rows)
    }

    fn destroy(&mut self) {
        self.entity.destroy();
    }
}
