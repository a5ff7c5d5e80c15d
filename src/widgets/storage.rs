//! Storage location list.
//!
//! The drive monitor replaces the full list with `SetLocations`; selecting
//! a row publishes `StorageActivated` so the library can re-root.

use crate::components::command::TypeTag;
use crate::components::entityid::EntityId;
use crate::components::geometry::{Rect, Vec2};
use crate::components::payload::{Payload, StorageLocation};
use crate::components::properties::LayoutStrategy;
use crate::entity::{Entity, EntityState};
use crate::error::{BuildError, PayloadError};
use crate::events::storage::StorageEvent;
use crate::resources::context::AppContext;
use crate::systems::interaction::HitTest;
use crate::systems::monitor::{DriveProbe, spawn_drive_monitor};
use crate::systems::queue::CommandSender;
use crate::widgets::{RenderSnapshot, Widget, settle};
use log::info;
use std::sync::Arc;

pub const SELECT: TypeTag = TypeTag::Local("select");

#[derive(Debug, Default)]
pub struct StorageState {
    pub locations: Arc<Vec<StorageLocation>>,
    pub selected: Option<usize>,
}

impl StorageState {
    pub fn selected_location(&self) -> Option<&StorageLocation> {
        self.selected.and_then(|i| self.locations.get(i))
    }
}

pub struct StorageList {
    entity: Entity<StorageState>,
}

impl StorageList {
    pub fn new(ctx: &AppContext) -> Result<Self, BuildError> {
        let mut entity = Entity::builder("storage", ctx, StorageState::default())
            .with_layout(LayoutStrategy::FillWidth)
            .with_size(Vec2::new(0.0, 120.0))
            .build()?;

        entity.on(TypeTag::SetLocations, |s: &mut EntityState<StorageState>, p: &Payload| {
            let locations = p.as_locations()?;
            if *locations == *s.local.locations {
                return Ok(());
            }
            // keep the selection on the same mount if it survived
            let keep = s
                .local
                .selected_location()
                .and_then(|cur| locations.iter().position(|l| l.mount == cur.mount));
            s.local.selected = keep;
            s.local.locations = locations;
            let count = s.local.locations.len();
            info!("{}: {} storage locations", s.id, count);
            s.publish(StorageEvent::list_changed(s.id, count));
            Ok(())
        });
        entity.on(SELECT, |s: &mut EntityState<StorageState>, p: &Payload| {
            let index = p.as_index()?;
            let Some(loc) = s.local.locations.get(index).cloned() else {
                return Err(PayloadError::Invalid(format!(
                    "location {} out of range ({} known)",
                    index,
                    s.local.locations.len()
                )));
            };
            s.local.selected = Some(index);
            s.publish(StorageEvent::activated(s.id, loc));
            Ok(())
        });

        Ok(StorageList { entity })
    }

    /// Poll `probe` every `period` on a background thread for the lifetime of
    /// this widget.
    pub fn with_drive_monitor(
        mut self,
        probe: impl DriveProbe,
        period: std::time::Duration,
    ) -> std::io::Result<Self> {
        let monitor = spawn_drive_monitor(probe, self.entity.sender(), period)?;
        self.entity.attach_monitor(monitor);
        Ok(self)
    }

    pub fn state(&self) -> &StorageState {
        self.entity.local()
    }

    pub fn entity(&self) -> &Entity<StorageState> {
        &self.entity
    }
}

impl Widget for StorageList {
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
        settle(&mut self.entity, now);
    }

    fn layout(&mut self, origin: Vec2, available: Vec2) -> Rect {
        self.entity.layout(origin, available)
    }

    fn build(&mut self, hit: &dyn HitTest) {
        let name = self
            .entity
            .local()
            .selected_location()
            .map(|l| l.name.clone());
        self.entity.update_interaction(hit, name.as_deref());
    }

    fn snapshot(&self) -> RenderSnapshot {
        let state = self.entity.local();
        let rows = state
            .locations
            .iter()
            .enumerate()
            .map(|(i, l)| {
                let marker = if Some(i) == state.selected { ">" } else { " " };
                let kind = if l.removable { " (removable)" } else { "" };
                format!("{}{} {}{}", marker, l.name, l.mount.display(), kind)
            })
            .collect();
        RenderSnapshot::of(&self.entity, "storage")
            .with_status(format!("{} locations", state.locations.len()))
            .with_rows(rows)
    }

    fn destroy(&mut self) {
        self.entity.destroy();
    }
}
