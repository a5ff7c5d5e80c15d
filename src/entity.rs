//! Entity composition.
//!
//! An [`Entity`] bundles the pieces every UI entity in this crate is made
//! of: a bounded [`CommandQueue`], a [`Dispatcher`] over its
//! [`EntityState`], an [`AnimationEngine`], an [`InteractionMachine`] and an
//! [`EventSubscriber`]. Widgets wrap an `Entity<W>` where `W` is their own
//! local state and register extra handlers on top of the defaults.
//!
//! # Frame contract
//!
//! On the render thread, once per frame and in this order:
//! 1. [`Entity::drain_events`] – bus events are turned into commands on the
//!    entity's own queue.
//! 2. [`Entity::process_updates`] – up to `max_per_frame` commands applied.
//! 3. [`Entity::process_animations`] – running transitions advanced.
//! 4. [`Entity::layout`] and rendering.
//! 5. [`Entity::update_interaction`] – right after the hit-test region was
//!    submitted.
//!
//! Any other thread may only call [`CommandSender::send_update`] on a cloned
//! [`Entity::sender`] or publish on the bus.

use crate::components::color::Color;
use crate::components::command::{Command, TypeTag};
use crate::components::entityid::EntityId;
use crate::components::geometry::{Rect, Vec2};
use crate::components::interaction::InteractionState;
use crate::components::payload::Payload;
use crate::components::properties::{LayoutStrategy, Properties};
use crate::components::tween::{AnimValue, Easing};
use crate::error::{BuildError, PayloadError};
use crate::events::{Event, EventType};
use crate::resources::context::AppContext;
use crate::systems::dispatcher::{Dispatcher, Handled, process_updates};
use crate::systems::interaction::{FrameInteraction, HitTest, InteractionMachine, interaction_events};
use crate::systems::monitor::PeriodicMonitor;
use crate::systems::queue::{CommandQueue, CommandSender, QueueStats};
use crate::systems::subscription::EventSubscriber;
use crate::systems::tween::AnimationEngine;
use log::{debug, info, warn};
use std::sync::Arc;

/// Everything a command handler may touch.
pub struct EntityState<W> {
    pub id: EntityId,
    pub props: Properties,
    /// Shared so render-side readers on other threads can sample values.
    pub anims: Arc<AnimationEngine>,
    /// Level bits from the most recent interaction sample.
    pub levels: InteractionState,
    /// Time of the last `process_animations` call, in seconds.
    pub now: f32,
    pub ctx: AppContext,
    pub local: W,
    /// Duration and easing of the background fade; `None` snaps instead.
    fade: Option<(f32, Easing)>,
}

impl<W> EntityState<W> {
    /// Background colour as currently rendered.
    pub fn bg_color(&self) -> Color {
        self.anims
            .current(&TypeTag::BgColor)
            .and_then(|v| v.as_color())
            .unwrap_or(self.props.bg_color)
    }

    pub fn is_hovered(&self) -> bool {
        self.levels.contains(InteractionState::HOVERED)
    }

    /// Colour the background should head toward given the current levels.
    fn bg_target(&self) -> Color {
        let p = &self.props;
        if self.levels.contains(InteractionState::ACTIVE) {
            if let Some(c) = p.active_color {
                return c;
            }
        }
        if self.is_hovered() {
            if let Some(c) = p.hover_color {
                return c;
            }
        }
        p.bg_color
    }

    /// Move the rendered background toward [`Self::bg_target`].
    fn sync_bg(&self) {
        let target = AnimValue::from(self.bg_target());
        match self.fade {
            Some((duration, easing)) => {
                self.anims
                    .start(TypeTag::BgColor, target, duration, Some(easing), self.now);
            }
            None => self.anims.set_value(TypeTag::BgColor, target),
        }
    }

    /// Publish `event` on the shared bus with this entity as source.
    pub fn publish(&self, event: Event) -> usize {
        self.ctx.bus.publish(event.with_source(self.id))
    }
}

fn optional_color(p: &Payload) -> Result<Option<Color>, PayloadError> {
    match p {
        Payload::None => Ok(None),
        other => other.as_color().map(Some),
    }
}

/// Install the handlers for every well-known property tag.
fn install_property_handlers<W: 'static>(d: &mut Dispatcher<EntityState<W>>) {
    d.register(TypeTag::BgColor, |s: &mut EntityState<W>, p: &Payload| {
        let c = p.as_color()?;
        s.props.bg_color = c;
        // while tinted the hover/active colour stays on screen; the new base
        // shows up on the next out-edge
        if s.bg_target() == c {
            s.anims.set_value(TypeTag::BgColor, c.into());
        }
        Ok(())
    });
    d.register(TypeTag::FgColor, |s: &mut EntityState<W>, p: &Payload| {
        s.props.fg_color = p.as_color()?;
        Ok(())
    });
    d.register(TypeTag::HoverColor, |s: &mut EntityState<W>, p: &Payload| {
        s.props.hover_color = optional_color(p)?;
        s.sync_bg();
        Ok(())
    });
    d.register(TypeTag::ActiveColor, |s: &mut EntityState<W>, p: &Payload| {
        s.props.active_color = optional_color(p)?;
        s.sync_bg();
        Ok(())
    });
    d.register(TypeTag::Size, |s: &mut EntityState<W>, p: &Payload| {
        let size = p.as_size()?;
        if size.x < 0.0 || size.y < 0.0 {
            return Err(PayloadError::Invalid(format!(
                "negative size {}x{}",
                size.x, size.y
            )));
        }
        s.props.size = size;
        Ok(())
    });
    d.register(TypeTag::Text, |s: &mut EntityState<W>, p: &Payload| {
        s.props.text = p.as_text()?.to_string();
        Ok(())
    });
    d.register(TypeTag::Tooltip, |s: &mut EntityState<W>, p: &Payload| {
        s.props.tooltip = match p {
            Payload::None => None,
            other => Some(other.as_text()?.to_string()),
        };
        Ok(())
    });
    d.register(TypeTag::Visible, |s: &mut EntityState<W>, p: &Payload| {
        s.props.visible = p.as_bool()?;
        Ok(())
    });
    d.register(TypeTag::Enabled, |s: &mut EntityState<W>, p: &Payload| {
        s.props.enabled = p.as_bool()?;
        Ok(())
    });
    d.register(TypeTag::Selected, |s: &mut EntityState<W>, p: &Payload| {
        s.props.selected = p.as_bool()?;
        Ok(())
    });
    d.register(TypeTag::Collapsed, |s: &mut EntityState<W>, p: &Payload| {
        s.props.collapsed = p.as_bool()?;
        Ok(())
    });
}

pub struct Entity<W> {
    name: String,
    queue: CommandQueue,
    dispatcher: Dispatcher<EntityState<W>>,
    state: EntityState<W>,
    interaction: InteractionMachine,
    subscriber: EventSubscriber,
    layout: LayoutStrategy,
    max_per_frame: usize,
    monitors: Vec<PeriodicMonitor>,
    destroyed: bool,
}

impl<W: 'static> Entity<W> {
    pub fn builder(name: impl Into<String>, ctx: &AppContext, local: W) -> EntityBuilder<W> {
        EntityBuilder::new(name, ctx, local)
    }

    pub fn id(&self) -> EntityId {
        self.state.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Producer handle for background workers.
    pub fn sender(&self) -> CommandSender {
        self.queue.sender()
    }

    /// Queue a command for this entity. Never blocks.
    pub fn send_update(&self, cmd: Command) {
        self.queue.sender().send_update(cmd);
    }

    pub fn state(&self) -> &EntityState<W> {
        &self.state
    }

    pub fn props(&self) -> &Properties {
        &self.state.props
    }

    pub fn local(&self) -> &W {
        &self.state.local
    }

    pub fn local_mut(&mut self) -> &mut W {
        &mut self.state.local
    }

    pub fn context(&self) -> &AppContext {
        &self.state.ctx
    }

    pub fn animations(&self) -> Arc<AnimationEngine> {
        self.state.anims.clone()
    }

    pub fn layout_strategy(&self) -> LayoutStrategy {
        self.layout
    }

    /// Register or replace the handler for `tag`.
    pub fn on<F>(&mut self, tag: TypeTag, handler: F)
    where
        F: FnMut(&mut EntityState<W>, &Payload) -> Result<(), PayloadError> + 'static,
    {
        self.dispatcher.register(tag, handler);
    }

    /// Install the catch-all handler for tags without a registered handler.
    pub fn on_legacy<F>(&mut self, handler: F)
    where
        F: FnMut(&mut EntityState<W>, &Command) -> Handled + 'static,
    {
        self.dispatcher.set_legacy(handler);
    }

    /// Route bus events of `types` into this entity's subscription.
    pub fn listen(&mut self, types: &[EventType]) {
        if self.destroyed {
            warn!("{} '{}': listen after destroy ignored", self.id(), self.name);
            return;
        }
        self.subscriber.listen(types);
    }

    pub fn is_listening(&self, kind: EventType) -> bool {
        self.subscriber.is_listening(kind)
    }

    /// Translate pending bus events into commands on this entity's queue.
    pub fn drain_events(&self, translate: impl FnMut(&Event) -> Option<Command>) -> usize {
        if self.destroyed {
            return 0;
        }
        self.subscriber
            .drain_into(&self.queue.sender(), self.max_per_frame, translate)
    }

    /// Apply up to `max_per_frame` queued commands in FIFO order.
    pub fn process_updates(&mut self) -> usize {
        if self.destroyed {
            debug!("{} '{}': process_updates after destroy", self.id(), self.name);
            return 0;
        }
        process_updates(
            &self.queue,
            &mut self.dispatcher,
            &mut self.state,
            self.max_per_frame,
        )
    }

    /// Advance running transitions to `now`. Returns how many still run.
    pub fn process_animations(&mut self, now: f32) -> usize {
        self.state.now = now;
        self.state.anims.process(now)
    }

    /// Compute bounds inside the space offered at `origin`.
    ///
    /// Invisible entities take no space.
    pub fn layout(&mut self, origin: Vec2, available: Vec2) -> Rect {
        let size = if self.state.props.visible {
            self.layout.resolve(available, self.state.props.size)
        } else {
            Vec2::ZERO
        };
        let bounds = Rect { pos: origin, size };
        self.state.props.bounds = bounds;
        bounds
    }

    /// Sample the hit test of the item just submitted.
    ///
    /// Drives the background hover/active fade and publishes one event per
    /// edge and per click. `context` is attached to the events (a row name,
    /// for example).
    pub fn update_interaction(
        &mut self,
        probe: &dyn HitTest,
        context: Option<&str>,
    ) -> FrameInteraction {
        if self.destroyed {
            return FrameInteraction::default();
        }
        let enabled = self.state.props.enabled && self.state.props.visible;
        let frame = self.interaction.sample(probe, enabled);
        self.state.levels = frame.state.levels();

        let changed = frame.state.intersects(
            InteractionState::HOVER_IN
                | InteractionState::HOVER_OUT
                | InteractionState::ACTIVE_IN
                | InteractionState::ACTIVE_OUT,
        );
        if changed {
            self.state.sync_bg();
        }

        for ev in interaction_events(self.id(), &frame, context) {
            self.state.ctx.bus.publish(ev);
        }
        frame
    }

    pub fn levels(&self) -> InteractionState {
        self.interaction.levels()
    }

    /// Background colour as currently rendered.
    pub fn bg_color(&self) -> Color {
        self.state.bg_color()
    }

    /// Hand a background monitor to this entity; it is stopped by `destroy`.
    pub fn attach_monitor(&mut self, monitor: PeriodicMonitor) {
        if self.destroyed {
            warn!("{} '{}': monitor attached after destroy", self.id(), self.name);
            return;
        }
        self.monitors.push(monitor);
    }

    pub fn monitors_running(&self) -> usize {
        self.monitors.iter().filter(|m| m.is_running()).count()
    }

    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Tear the entity down: close the inbound queue, release every bus
    /// subscription, stop and join owned monitors.
    ///
    /// Sends after this are dropped and logged. Safe to call twice.
    pub fn destroy(&mut self) {
        if !self.teardown() {
            debug!("{} '{}': already destroyed", self.id(), self.name);
        }
    }
}

impl<W> Entity<W> {
    /// Shared by `destroy` and `Drop`. Returns false if already torn down.
    fn teardown(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.queue.close();
        self.subscriber.destroy();
        for monitor in &mut self.monitors {
            monitor.shutdown();
        }
        self.monitors.clear();
        info!("{} '{}' destroyed", self.state.id, self.name);
        true
    }
}

impl<W> Drop for Entity<W> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Validating constructor for [`Entity`].
pub struct EntityBuilder<W> {
    name: String,
    ctx: AppContext,
    local: W,
    capacity: usize,
    max_per_frame: usize,
    layout: Option<LayoutStrategy>,
    props: Properties,
    hover_animation: bool,
    default_handlers: bool,
}

impl<W: 'static> EntityBuilder<W> {
    /// Capacities and frame cap start from the context's config.
    pub fn new(name: impl Into<String>, ctx: &AppContext, local: W) -> Self {
        EntityBuilder {
            name: name.into(),
            ctx: ctx.clone(),
            local,
            capacity: ctx.config.queue_capacity,
            max_per_frame: ctx.config.max_per_frame,
            layout: None,
            props: Properties::default(),
            hover_animation: true,
            default_handlers: true,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_max_per_frame(mut self, max: usize) -> Self {
        self.max_per_frame = max;
        self
    }

    pub fn with_layout(mut self, layout: LayoutStrategy) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_props(mut self, props: Properties) -> Self {
        self.props = props;
        self
    }

    pub fn with_bg_color(mut self, color: Color) -> Self {
        self.props.bg_color = color;
        self
    }

    pub fn with_hover_color(mut self, color: Color) -> Self {
        self.props.hover_color = Some(color);
        self
    }

    pub fn with_active_color(mut self, color: Color) -> Self {
        self.props.active_color = Some(color);
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.props.size = size;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.props.text = text.into();
        self
    }

    pub fn without_hover_animation(mut self) -> Self {
        self.hover_animation = false;
        self
    }

    /// Skip the property handlers; the entity then only drains its queue
    /// until handlers are registered.
    pub fn without_default_handlers(mut self) -> Self {
        self.default_handlers = false;
        self
    }

    pub fn build(self) -> Result<Entity<W>, BuildError> {
        let layout = self
            .layout
            .ok_or_else(|| BuildError::MissingLayout(self.name.clone()))?;
        if self.capacity == 0 {
            return Err(BuildError::ZeroCapacity(self.name));
        }
        if self.max_per_frame == 0 {
            return Err(BuildError::ZeroFrameCap(self.name));
        }

        let id = EntityId::next();
        let anims = Arc::new(AnimationEngine::new());
        anims.set_value(TypeTag::BgColor, self.props.bg_color.into());

        let mut dispatcher = Dispatcher::new();
        if self.default_handlers {
            install_property_handlers(&mut dispatcher);
        }

        let subscriber = EventSubscriber::new(
            self.ctx.bus.clone(),
            id,
            self.ctx.config.channel_capacity,
        );
        let fade = self.hover_animation.then(|| {
            (
                self.ctx.config.hover_duration.as_secs_f32(),
                self.ctx.config.hover_easing,
            )
        });
        debug!(
            "{} '{}' built (queue {}, cap {}/frame)",
            id, self.name, self.capacity, self.max_per_frame
        );

        Ok(Entity {
            queue: CommandQueue::new(id, self.capacity),
            name: self.name,
            dispatcher,
            state: EntityState {
                id,
                props: self.props,
                anims,
                levels: InteractionState::empty(),
                now: 0.0,
                ctx: self.ctx,
                local: self.local,
                fade,
            },
            interaction: InteractionMachine::new(),
            subscriber,
            layout,
            max_per_frame: self.max_per_frame,
            monitors: Vec::new(),
            destroyed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventData;
    use crate::events::scan::ScanEvent;
    use crate::systems::interaction::HitSample;
    use crate::systems::monitor::PeriodicMonitor;
    use std::time::Duration;

    const RED: Color = Color::RED;
    const BLUE: Color = Color::BLUE;

    fn entity(ctx: &AppContext) -> Entity<()> {
        Entity::builder("test", ctx, ())
            .with_layout(LayoutStrategy::Fixed)
            .with_bg_color(RED)
            .with_hover_color(BLUE)
            .build()
            .unwrap()
    }

    fn color_close(a: Color, b: Color) -> bool {
        let d = |x: f32, y: f32| (x - y).abs() < 1e-4;
        d(a.r, b.r) && d(a.g, b.g) && d(a.b, b.b) && d(a.a, b.a)
    }

    // ==================== BUILD TESTS ====================

    #[test]
    fn test_build_requires_layout() {
        let ctx = AppContext::default();
        let err = Entity::builder("nolayout", &ctx, ()).build().err();
        assert_eq!(err, Some(BuildError::MissingLayout("nolayout".into())));
    }

    #[test]
    fn test_build_rejects_zero_capacity_and_cap() {
        let ctx = AppContext::default();
        let e = Entity::builder("q", &ctx, ())
            .with_layout(LayoutStrategy::Fill)
            .with_capacity(0)
            .build();
        assert!(matches!(e, Err(BuildError::ZeroCapacity(_))));
        let e = Entity::builder("c", &ctx, ())
            .with_layout(LayoutStrategy::Fill)
            .with_max_per_frame(0)
            .build();
        assert!(matches!(e, Err(BuildError::ZeroFrameCap(_))));
    }

    #[test]
    fn test_ids_are_unique() {
        let ctx = AppContext::default();
        let a = entity(&ctx);
        let b = entity(&ctx);
        assert_ne!(a.id(), b.id());
    }

    // ==================== UPDATE TESTS ====================

    #[test]
    fn test_capacity_two_keeps_first_two() {
        let ctx = AppContext::default();
        let mut e = Entity::builder("label", &ctx, ())
            .with_layout(LayoutStrategy::Fixed)
            .with_capacity(2)
            .build()
            .unwrap();
        e.send_update(Command::text("a"));
        e.send_update(Command::text("b"));
        e.send_update(Command::text("c"));
        assert_eq!(e.process_updates(), 2);
        assert_eq!(e.props().text, "b");
        let stats = e.stats();
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_default_handlers_cover_properties() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        e.send_update(Command::new(TypeTag::Tooltip, "tip"));
        e.send_update(Command::visible(false));
        e.send_update(Command::new(TypeTag::Selected, true));
        e.send_update(Command::size(Vec2::new(10.0, 4.0)));
        e.send_update(Command::new(TypeTag::HoverColor, Payload::None));
        e.process_updates();
        let p = e.props();
        assert_eq!(p.tooltip.as_deref(), Some("tip"));
        assert!(!p.visible);
        assert!(p.selected);
        assert_eq!(p.size, Vec2::new(10.0, 4.0));
        assert_eq!(p.hover_color, None);
    }

    #[test]
    fn test_malformed_payload_counted() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        e.send_update(Command::new(TypeTag::Visible, "yes"));
        e.send_update(Command::size(Vec2::new(-1.0, 2.0)));
        e.process_updates();
        assert!(e.props().visible);
        assert_eq!(e.props().size, Vec2::ZERO);
        assert_eq!(e.stats().malformed, 2);
    }

    #[test]
    fn test_bare_entity_pure_drains() {
        let ctx = AppContext::default();
        let mut e = Entity::builder("bare", &ctx, ())
            .with_layout(LayoutStrategy::Fixed)
            .without_default_handlers()
            .build()
            .unwrap();
        e.send_update(Command::text("ignored"));
        assert_eq!(e.process_updates(), 1);
        assert_eq!(e.pending(), 0);
        assert!(e.props().text.is_empty());
    }

    #[test]
    fn test_local_handler_touches_widget_state() {
        let ctx = AppContext::default();
        let mut e = Entity::builder("counter", &ctx, 0i64)
            .with_layout(LayoutStrategy::Fixed)
            .build()
            .unwrap();
        e.on(TypeTag::Local("add"), |s: &mut EntityState<i64>, p: &Payload| {
            s.local += p.as_int()?;
            Ok(())
        });
        e.send_update(Command::new(TypeTag::Local("add"), Payload::Int(3)));
        e.send_update(Command::new(TypeTag::Local("add"), Payload::Int(4)));
        e.process_updates();
        assert_eq!(*e.local(), 7);
    }

    // ==================== HOVER TESTS ====================

    #[test]
    fn test_hover_fades_toward_hover_color_and_back() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        let dur = ctx.config.hover_duration.as_secs_f32();

        e.process_animations(0.0);
        e.update_interaction(&HitSample::hovered(), None);
        assert!(e.animations().is_animating(&TypeTag::BgColor));
        e.process_animations(dur);
        assert!(color_close(e.bg_color(), BLUE));

        e.process_animations(dur + 0.01);
        e.update_interaction(&HitSample::idle(), None);
        e.process_animations(2.0 * dur + 0.02);
        assert!(color_close(e.bg_color(), RED));
    }

    #[test]
    fn test_sustained_hover_does_not_restart() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        e.process_animations(0.0);
        e.update_interaction(&HitSample::hovered(), None);
        let first = e.animations().state(&TypeTag::BgColor).unwrap();
        e.process_animations(0.05);
        e.update_interaction(&HitSample::hovered(), None);
        let again = e.animations().state(&TypeTag::BgColor).unwrap();
        assert_eq!(first.start_time, again.start_time);
    }

    #[test]
    fn test_bg_color_while_hovered_applies_on_hover_out() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        e.process_animations(0.0);
        e.update_interaction(&HitSample::hovered(), None);
        e.process_animations(1.0);
        e.send_update(Command::bg_color(Color::GREEN));
        e.process_updates();
        assert!(color_close(e.bg_color(), BLUE));
        e.update_interaction(&HitSample::idle(), None);
        e.process_animations(3.0);
        assert!(color_close(e.bg_color(), Color::GREEN));
    }

    #[test]
    fn test_without_hover_animation_snaps_on_edges() {
        let ctx = AppContext::default();
        let mut e = Entity::builder("snap", &ctx, ())
            .with_layout(LayoutStrategy::Fixed)
            .with_bg_color(RED)
            .with_hover_color(BLUE)
            .without_hover_animation()
            .build()
            .unwrap();
        e.update_interaction(&HitSample::hovered(), None);
        assert!(!e.animations().is_animating(&TypeTag::BgColor));
        assert_eq!(e.bg_color(), BLUE);

        e.send_update(Command::bg_color(Color::GREEN));
        e.process_updates();
        assert_eq!(e.bg_color(), BLUE);
        e.update_interaction(&HitSample::idle(), None);
        e.process_animations(5.0);
        assert_eq!(e.props().bg_color, Color::GREEN);
        assert_eq!(e.bg_color(), Color::GREEN);
    }

    #[test]
    fn test_clearing_hover_color_while_hovered_returns_to_base() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        e.process_animations(0.0);
        e.update_interaction(&HitSample::hovered(), None);
        e.process_animations(1.0);
        assert!(color_close(e.bg_color(), BLUE));

        e.send_update(Command::new(TypeTag::HoverColor, Payload::None));
        e.process_updates();
        e.update_interaction(&HitSample::idle(), None);
        e.process_animations(5.0);
        assert_eq!(e.bg_color(), RED);
    }

    #[test]
    fn test_changing_hover_color_while_hovered_retargets() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        e.process_animations(0.0);
        e.update_interaction(&HitSample::hovered(), None);
        e.process_animations(1.0);
        e.send_update(Command::new(TypeTag::HoverColor, Color::GREEN));
        e.process_updates();
        assert!(e.animations().is_animating(&TypeTag::BgColor));
        e.process_animations(5.0);
        assert_eq!(e.bg_color(), Color::GREEN);

        // unhovered: a new hover colour leaves the base on screen
        e.update_interaction(&HitSample::idle(), None);
        e.process_animations(10.0);
        e.send_update(Command::new(TypeTag::HoverColor, BLUE));
        e.process_updates();
        assert!(!e.animations().is_animating(&TypeTag::BgColor));
        assert_eq!(e.bg_color(), RED);
    }

    #[test]
    fn test_active_color_set_while_pressed_retargets() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        e.process_animations(0.0);
        e.update_interaction(&HitSample::pressed(), None);
        e.process_animations(1.0);
        assert!(color_close(e.bg_color(), BLUE));

        e.send_update(Command::new(TypeTag::ActiveColor, Color::GREEN));
        e.process_updates();
        e.process_animations(5.0);
        assert_eq!(e.bg_color(), Color::GREEN);

        e.send_update(Command::new(TypeTag::ActiveColor, Payload::None));
        e.process_updates();
        e.process_animations(10.0);
        assert_eq!(e.bg_color(), BLUE);
    }

    #[test]
    fn test_drop_releases_subscriptions() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        e.listen(&[EventType::ScanStarted]);
        assert_eq!(ctx.bus.subscriber_count(EventType::ScanStarted), 1);
        let tx = e.sender();
        drop(e);
        assert_eq!(ctx.bus.subscriber_count(EventType::ScanStarted), 0);
        tx.send_update(Command::text("late"));
        assert_eq!(tx.dropped(), 1);
    }

    #[test]
    fn test_bg_color_snaps_when_idle() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        e.send_update(Command::bg_color(Color::GREEN));
        e.process_updates();
        assert_eq!(e.bg_color(), Color::GREEN);
    }

    #[test]
    fn test_disabled_entity_emits_no_clicks() {
        let ctx = AppContext::default();
        let bus = ctx.bus.clone();
        let queue = CommandQueue::new(EntityId(999_001), 8);
        let mut watch = crate::systems::subscription::FilteredSubscription::new(
            bus,
            queue.owner(),
            &[EventType::Click, EventType::HoverIn],
            8,
        );
        let mut e = entity(&ctx);
        e.send_update(Command::enabled(false));
        e.process_updates();
        e.update_interaction(&HitSample::hovered().with_click(crate::components::interaction::MouseButton::Left), None);
        assert_eq!(watch.pending(), 0);
        watch.close();
    }

    #[test]
    fn test_interaction_events_published_with_source() {
        let ctx = AppContext::default();
        let sub = crate::systems::subscription::FilteredSubscription::new(
            ctx.bus.clone(),
            EntityId(999_002),
            &[EventType::HoverIn],
            8,
        );
        let mut e = entity(&ctx);
        e.update_interaction(&HitSample::hovered(), Some("row"));
        let mut sources = Vec::new();
        sub.drain(8, |ev| sources.push(ev.source()));
        assert_eq!(sources, vec![Some(e.id())]);
    }

    // ==================== LAYOUT TESTS ====================

    #[test]
    fn test_layout_fill_width_and_invisible() {
        let ctx = AppContext::default();
        let mut e = Entity::builder("row", &ctx, ())
            .with_layout(LayoutStrategy::FillWidth)
            .with_size(Vec2::new(10.0, 20.0))
            .build()
            .unwrap();
        let r = e.layout(Vec2::new(5.0, 5.0), Vec2::new(300.0, 100.0));
        assert_eq!(r.size, Vec2::new(300.0, 20.0));
        assert_eq!(e.props().bounds, r);
        e.send_update(Command::visible(false));
        e.process_updates();
        assert_eq!(e.layout(Vec2::ZERO, Vec2::new(300.0, 100.0)).size, Vec2::ZERO);
    }

    // ==================== LIFECYCLE TESTS ====================

    #[test]
    fn test_destroy_closes_queue_and_unsubscribes() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        e.listen(&[EventType::ScanStarted, EventType::ScanCompleted]);
        assert_eq!(ctx.bus.subscriber_count(EventType::ScanStarted), 1);
        let tx = e.sender();
        e.destroy();
        e.destroy();
        assert!(e.is_destroyed());
        assert_eq!(ctx.bus.subscriber_count(EventType::ScanStarted), 0);
        assert_eq!(ctx.bus.subscriber_count(EventType::ScanCompleted), 0);
        tx.send_update(Command::text("late"));
        assert_eq!(e.stats().dropped, 1);
        assert_eq!(e.process_updates(), 0);
    }

    #[test]
    fn test_destroy_stops_monitors() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        let tx = e.sender();
        let m = PeriodicMonitor::spawn("entity-test", Duration::from_millis(1), move || {
            tx.send_update(Command::text("tick"));
        })
        .unwrap();
        e.attach_monitor(m);
        assert_eq!(e.monitors_running(), 1);
        e.destroy();
        assert_eq!(e.monitors_running(), 0);
    }

    #[test]
    fn test_drain_events_feeds_queue() {
        let ctx = AppContext::default();
        let mut e = entity(&ctx);
        e.listen(&[EventType::ScanCompleted]);
        ctx.bus.publish(ScanEvent::completed("/lib", 12));
        let n = e.drain_events(|ev| match ev.data() {
            EventData::Scan(s) => Some(Command::text(format!("{} files", s.files))),
            _ => None,
        });
        assert_eq!(n, 1);
        e.process_updates();
        assert_eq!(e.props().text, "12 files");
    }
}
