//! Frame loop.
//!
//! Owns the widget list and the [`WorldTime`] clock and runs each frame in a
//! fixed order for every widget: tick (events, commands, animations), then
//! layout, then build (render submission and interaction sampling). Widgets
//! are stacked vertically inside the viewport.

use crate::components::entityid::EntityId;
use crate::components::geometry::Vec2;
use crate::resources::worldtime::WorldTime;
use crate::systems::interaction::HitSample;
use crate::widgets::{RenderSnapshot, Widget};
use log::{debug, info};

/// Supplies the hit-test result for each widget in a headless frame.
pub trait HitSource {
    fn hit_for(&mut self, widget: EntityId, name: &str) -> HitSample;
}

impl<F> HitSource for F
where
    F: FnMut(EntityId, &str) -> HitSample,
{
    fn hit_for(&mut self, widget: EntityId, name: &str) -> HitSample {
        self(widget, name)
    }
}

/// Nothing hovered, nothing pressed.
pub struct NoInput;

impl HitSource for NoInput {
    fn hit_for(&mut self, _widget: EntityId, _name: &str) -> HitSample {
        HitSample::idle()
    }
}

pub struct FrameLoop {
    widgets: Vec<Box<dyn Widget>>,
    time: WorldTime,
    viewport: Vec2,
    shut_down: bool,
}

impl FrameLoop {
    pub fn new(viewport: Vec2) -> Self {
        FrameLoop {
            widgets: Vec::new(),
            time: WorldTime::default(),
            viewport,
            shut_down: false,
        }
    }

    pub fn with_time(mut self, time: WorldTime) -> Self {
        self.time = time;
        self
    }

    pub fn add(&mut self, widget: Box<dyn Widget>) -> EntityId {
        let id = widget.id();
        debug!("frame: added {} '{}'", id, widget.name());
        self.widgets.push(widget);
        id
    }

    pub fn time(&self) -> &WorldTime {
        &self.time
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn widget(&self, id: EntityId) -> Option<&dyn Widget> {
        self.widgets.iter().find(|w| w.id() == id).map(|w| &**w)
    }

    /// Run one frame of `dt` unscaled seconds.
    pub fn run_frame(&mut self, dt: f32, hits: &mut dyn HitSource) {
        if self.shut_down {
            return;
        }
        self.time.advance(dt);
        let now = self.time.elapsed;

        for w in &mut self.widgets {
            w.tick(now);
        }

        let mut y = 0.0;
        for w in &mut self.widgets {
            let available = Vec2::new(self.viewport.x, (self.viewport.y - y).max(0.0));
            let bounds = w.layout(Vec2::new(0.0, y), available);
            y += bounds.size.y;
        }

        for w in &mut self.widgets {
            let hit = hits.hit_for(w.id(), w.name());
            w.build(&hit);
        }
    }

    pub fn snapshot(&self) -> Vec<RenderSnapshot> {
        self.widgets.iter().map(|w| w.snapshot()).collect()
    }

    /// Destroy every widget. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        for w in &mut self.widgets {
            w.destroy();
        }
        info!(
            "frame loop stopped after {} frames, {} widgets destroyed",
            self.time.frame_count,
            self.widgets.len()
        );
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
