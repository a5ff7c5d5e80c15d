use crate::components::color::Color;
use crate::components::entityid::EntityId;
use crate::components::geometry::{Rect, Vec2};
use crate::components::interaction::MouseButton;
use crate::components::properties::LayoutStrategy;
use crate::entity::Entity;
use crate::error::BuildError;
use crate::resources::context::AppContext;
use crate::systems::interaction::HitTest;
use crate::systems::queue::CommandSender;
use crate::widgets::{RenderSnapshot, Widget, settle};

#[derive(Debug, Default)]
pub struct ButtonState {
    pub clicks: u32,
}

/// A label with a hover fade that publishes `Click` events.
pub struct Button {
    entity: Entity<ButtonState>,
}

impl Button {
    pub fn new(ctx: &AppContext, label: &str, size: Vec2) -> Result<Self, BuildError> {
        let entity = Entity::builder(format!("button:{}", label), ctx, ButtonState::default())
            .with_layout(LayoutStrategy::Fixed)
            .with_text(label)
            .with_size(size)
            .with_bg_color(Color::from_rgba8(48, 48, 56, 255))
            .with_hover_color(Color::from_rgba8(72, 72, 96, 255))
            .with_active_color(Color::from_rgba8(96, 96, 140, 255))
            .build()?;
        Ok(Button { entity })
    }

    pub fn clicks(&self) -> u32 {
        self.entity.local().clicks
    }

    pub fn entity(&self) -> &Entity<ButtonState> {
        &self.entity
    }
}

impl Widget for Button {
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
        let text = self.entity.props().text.clone();
        let frame = self.entity.update_interaction(hit, Some(&text));
        let left = frame
            .clicks
            .iter()
            .filter(|c| c.button == MouseButton::Left)
            .count() as u32;
        self.entity.local_mut().clicks += left;
    }

    fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::of(&self.entity, "button")
    }

    fn destroy(&mut self) {
        self.entity.destroy();
    }
}
