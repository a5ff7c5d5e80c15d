//! Preset list.
//!
//! Wired through a single legacy handler rather than per-tag handlers: the
//! preset parser delivers `SetPreset`, failures arrive as `PresetFailed`
//! events. Row text includes sample durations pulled from a
//! [`MetadataSource`]; missing entries are requested and shown as pending
//! until the decoder fills them in.

use crate::components::command::{Command, TypeTag};
use crate::components::entityid::EntityId;
use crate::components::geometry::{Rect, Vec2};
use crate::components::payload::{Payload, Preset};
use crate::components::properties::LayoutStrategy;
use crate::entity::{Entity, EntityState};
use crate::error::BuildError;
use crate::events::{Event, EventData, EventType};
use crate::resources::context::AppContext;
use crate::resources::metadata::MetadataSource;
use crate::systems::dispatcher::Handled;
use crate::systems::interaction::HitTest;
use crate::systems::queue::CommandSender;
use crate::widgets::{RenderSnapshot, Widget, settle};
use std::sync::Arc;

pub const PRESET_FAILED: TypeTag = TypeTag::Local("preset_failed");
pub const CLEAR: TypeTag = TypeTag::Local("clear");

#[derive(Debug, Default)]
pub struct PresetState {
    pub presets: Vec<Arc<Preset>>,
    pub status: String,
}

fn apply(s: &mut EntityState<PresetState>, cmd: &Command) -> Handled {
    match &cmd.tag {
        TypeTag::SetPreset => Handled::from_result(cmd.data.as_preset().map(|preset| {
            s.local.status = format!("Loaded {}", preset.name);
            match s.local.presets.iter().position(|p| p.path == preset.path) {
                Some(i) => s.local.presets[i] = preset,
                None => s.local.presets.push(preset),
            }
        })),
        tag if *tag == PRESET_FAILED => Handled::from_result(
            cmd.data
                .as_text()
                .map(|msg| s.local.status = msg.to_string()),
        ),
        tag if *tag == CLEAR => {
            s.local.presets.clear();
            s.local.status.clear();
            Handled::Yes
        }
        _ => Handled::No,
    }
}

fn translate(ev: &Event) -> Option<Command> {
    let EventData::Preset(pe) = ev.data() else {
        return None;
    };
    match ev.event_type() {
        EventType::PresetLoaded => pe
            .preset
            .clone()
            .map(|p| Command::new(TypeTag::SetPreset, Payload::Preset(p))),
        EventType::PresetFailed => Some(Command::new(
            PRESET_FAILED,
            format!(
                "Failed to load {}: {}",
                pe.path.display(),
                pe.error.as_deref().unwrap_or("unknown error")
            ),
        )),
        _ => None,
    }
}

pub struct PresetList {
    entity: Entity<PresetState>,
    metadata: Arc<dyn MetadataSource>,
}

impl PresetList {
    pub fn new(ctx: &AppContext, metadata: Arc<dyn MetadataSource>) -> Result<Self, BuildError> {
        let mut entity = Entity::builder("presets", ctx, PresetState::default())
            .with_layout(LayoutStrategy::Fill)
            .without_default_handlers()
            .build()?;
        entity.on_legacy(apply);
        entity.listen(&[EventType::PresetLoaded, EventType::PresetFailed]);
        Ok(PresetList { entity, metadata })
    }

    pub fn state(&self) -> &PresetState {
        self.entity.local()
    }

    pub fn entity(&self) -> &Entity<PresetState> {
        &self.entity
    }

    /// One line per preset: name, sample count and known total duration.
    pub fn rows(&self) -> Vec<String> {
        self.entity
            .local()
            .presets
            .iter()
            .map(|p| {
                let mut total = 0.0;
                let mut pending = 0;
                for sample in &p.samples {
                    match self.metadata.snapshot(sample) {
                        Some(meta) => total += meta.duration_secs,
                        None => {
                            self.metadata.request(sample);
                            pending += 1;
                        }
                    }
                }
                if pending > 0 {
                    format!("{} ({} samples, {:.1}s + {} pending)", p.name, p.samples.len(), total, pending)
                } else {
                    format!("{} ({} samples, {:.1}s)", p.name, p.samples.len(), total)
                }
            })
            .collect()
    }
}

impl Widget for PresetList {
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
        self.entity.update_interaction(hit, None);
    }

    fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::of(&self.entity, "presets")
            .with_status(self.entity.local().status.clone())
            .with_rows(self.rows())
    }

    fn destroy(&mut self) {
        self.entity.destroy();
    }
}
