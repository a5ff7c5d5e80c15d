//! Per-frame interaction state machine.
//!
//! After an entity's hit-test region has been submitted to the renderer,
//! [`InteractionMachine::sample`] reads the three level predicates (hovered,
//! active, focused) from a [`HitTest`] source, diffs them against the
//! previous frame's levels to derive edge bits, and collects clicks.
//! [`interaction_events`] turns the result into bus events.
//!
//! Only level bits carry over between frames; edges exist for exactly one
//! sample.

use crate::components::entityid::EntityId;
use crate::components::interaction::{Click, InteractionState, MouseButton};
use crate::events::interaction::InteractionEvent;
use crate::events::{Event, EventType};
use arrayvec::ArrayVec;
use smallvec::SmallVec;

/// Platform hit-test predicates for the most recently submitted item.
pub trait HitTest {
    fn is_hovered(&self) -> bool;
    fn is_active(&self) -> bool;
    fn is_focused(&self) -> bool;
    /// Released-click on the item this frame.
    fn is_clicked(&self, button: MouseButton) -> bool;
    fn is_double_clicked(&self, button: MouseButton) -> bool;
}

/// Plain-data [`HitTest`] for headless frames and tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HitSample {
    pub hovered: bool,
    pub active: bool,
    pub focused: bool,
    pub clicked: Option<MouseButton>,
    pub double_clicked: Option<MouseButton>,
}

impl HitSample {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn hovered() -> Self {
        HitSample {
            hovered: true,
            ..Self::default()
        }
    }

    pub fn pressed() -> Self {
        HitSample {
            hovered: true,
            active: true,
            ..Self::default()
        }
    }

    pub fn with_focus(mut self) -> Self {
        self.focused = true;
        self
    }

    pub fn with_click(mut self, button: MouseButton) -> Self {
        self.clicked = Some(button);
        self
    }

    pub fn with_double_click(mut self, button: MouseButton) -> Self {
        self.double_clicked = Some(button);
        self
    }
}

impl HitTest for HitSample {
    fn is_hovered(&self) -> bool {
        self.hovered
    }
    fn is_active(&self) -> bool {
        self.active
    }
    fn is_focused(&self) -> bool {
        self.focused
    }
    fn is_clicked(&self, button: MouseButton) -> bool {
        self.clicked == Some(button)
    }
    fn is_double_clicked(&self, button: MouseButton) -> bool {
        self.double_clicked == Some(button)
    }
}

#[cfg(feature = "imgui")]
fn imgui_button(button: MouseButton) -> imgui::MouseButton {
    match button {
        MouseButton::Left => imgui::MouseButton::Left,
        MouseButton::Right => imgui::MouseButton::Right,
        MouseButton::Middle => imgui::MouseButton::Middle,
    }
}

/// Reads the predicates of the last item submitted through `ui`.
#[cfg(feature = "imgui")]
impl HitTest for imgui::Ui {
    fn is_hovered(&self) -> bool {
        self.is_item_hovered()
    }
    fn is_active(&self) -> bool {
        self.is_item_active()
    }
    fn is_focused(&self) -> bool {
        self.is_item_focused()
    }
    fn is_clicked(&self, button: MouseButton) -> bool {
        self.is_item_clicked_with_button(imgui_button(button))
    }
    fn is_double_clicked(&self, button: MouseButton) -> bool {
        self.is_item_hovered() && self.is_mouse_double_clicked(imgui_button(button))
    }
}

/// Result of one frame's sample.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameInteraction {
    pub state: InteractionState,
    pub clicks: ArrayVec<Click, 3>,
}

impl FrameInteraction {
    pub fn hover_in(&self) -> bool {
        self.state.contains(InteractionState::HOVER_IN)
    }

    pub fn hover_out(&self) -> bool {
        self.state.contains(InteractionState::HOVER_OUT)
    }
}

#[derive(Debug, Default)]
pub struct InteractionMachine {
    previous: InteractionState,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample `probe` for this frame.
    ///
    /// A disabled entity samples as idle, so it emits the matching out-edges
    /// once and then nothing.
    pub fn sample(&mut self, probe: &dyn HitTest, enabled: bool) -> FrameInteraction {
        let mut levels = InteractionState::empty();
        let mut clicks = ArrayVec::new();
        if enabled {
            levels.set(InteractionState::HOVERED, probe.is_hovered());
            levels.set(InteractionState::ACTIVE, probe.is_active());
            levels.set(InteractionState::FOCUSED, probe.is_focused());
            for button in MouseButton::ALL {
                if probe.is_double_clicked(button) {
                    clicks.push(Click {
                        button,
                        double: true,
                    });
                } else if probe.is_clicked(button) {
                    clicks.push(Click {
                        button,
                        double: false,
                    });
                }
            }
        }
        let state = InteractionState::from_levels(self.previous, levels);
        self.previous = state.levels();
        FrameInteraction { state, clicks }
    }

    /// Level bits from the last sample.
    pub fn levels(&self) -> InteractionState {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = InteractionState::empty();
    }
}

const EDGE_EVENTS: [(InteractionState, EventType); 6] = [
    (InteractionState::HOVER_IN, EventType::HoverIn),
    (InteractionState::HOVER_OUT, EventType::HoverOut),
    (InteractionState::ACTIVE_IN, EventType::ActiveIn),
    (InteractionState::ACTIVE_OUT, EventType::ActiveOut),
    (InteractionState::FOCUS_IN, EventType::FocusIn),
    (InteractionState::FOCUS_OUT, EventType::FocusOut),
];

/// One event per edge bit and per click of `frame`, edges first.
pub fn interaction_events(
    entity: EntityId,
    frame: &FrameInteraction,
    context: Option<&str>,
) -> SmallVec<[Event; 4]> {
    let mut out = SmallVec::new();
    let base = InteractionEvent {
        entity,
        state: frame.state,
        button: None,
        context: context.map(str::to_string),
    };
    for (bit, kind) in EDGE_EVENTS {
        if frame.state.contains(bit) {
            out.push(base.clone().into_event(kind));
        }
    }
    for click in &frame.clicks {
        let kind = if click.double {
            EventType::DoubleClick
        } else {
            EventType::Click
        };
        let ev = InteractionEvent {
            button: Some(click.button),
            ..base.clone()
        };
        out.push(ev.into_event(kind));
    }
    out
}
