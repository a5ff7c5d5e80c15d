//! Widgets built on [`Entity`](crate::entity::Entity).
//!
//! Each widget owns one entity, registers its own command handlers and,
//! when it needs bus events, listens for them and translates them into
//! commands on its own queue. The [`FrameLoop`](crate::systems::frame::FrameLoop)
//! drives widgets only through the [`Widget`] trait.
//!
//! Submodules overview
//! - [`button`] – clickable label publishing click events
//! - [`library`] – sample library tree fed by the directory scanner
//! - [`presets`] – preset list fed by the preset parser and metadata cache
//! - [`storage`] – storage locations fed by the drive monitor
pub mod button;
pub mod library;
pub mod presets;
pub mod storage;

use crate::components::color::Color;
use crate::components::entityid::EntityId;
use crate::components::geometry::{Rect, Vec2};
use crate::components::properties::Properties;
use crate::entity::Entity;
use crate::systems::interaction::HitTest;
use crate::systems::queue::{CommandSender, QueueStats};
use serde::Serialize;

pub trait Widget {
    fn id(&self) -> EntityId;
    fn name(&self) -> &str;
    /// Producer handle for background workers targeting this widget.
    fn sender(&self) -> CommandSender;
    /// Drain events, apply commands and advance animations to `now`.
    fn tick(&mut self, now: f32);
    fn layout(&mut self, origin: Vec2, available: Vec2) -> Rect;
    /// Submit the widget and sample its interaction through `hit`.
    fn build(&mut self, hit: &dyn HitTest);
    fn snapshot(&self) -> RenderSnapshot;
    fn destroy(&mut self);
}

/// Serialisable view of what a widget would render this frame.
#[derive(Clone, Debug, Serialize)]
pub struct RenderSnapshot {
    pub id: EntityId,
    pub name: String,
    pub kind: &'static str,
    pub props: Properties,
    /// Background as rendered, including any running fade.
    pub bg_color: Color,
    pub hovered: bool,
    pub status: Option<String>,
    pub rows: Vec<String>,
    pub queue: QueueStats,
}

impl RenderSnapshot {
    pub fn of<W: 'static>(entity: &Entity<W>, kind: &'static str) -> Self {
        RenderSnapshot {
            id: entity.id(),
            name: entity.name().to_string(),
            kind,
            props: entity.props().clone(),
            bg_color: entity.bg_color(),
            hovered: entity.state().is_hovered(),
            status: None,
            rows: Vec::new(),
            queue: entity.stats(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_rows(mut self, rows: Vec<String>) -> Self {
        self.rows = rows;
        self
    }
}

/// Apply queued commands and step animations; shared by every widget tick.
pub(crate) fn settle<W: 'static>(entity: &mut Entity<W>, now: f32) {
    entity.process_updates();
    entity.process_animations(now);
}
