//! Hover/active/focus interaction bitmask.
//!
//! Level bits (`HOVERED`, `ACTIVE`, `FOCUSED`) describe the state sampled
//! this frame. Edge bits (`*_IN`, `*_OUT`) are only set in the frame in which
//! the matching level bit changed.

use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct InteractionState: u16 {
        const HOVERED    = 1 << 0;
        const HOVER_IN   = 1 << 1;
        const HOVER_OUT  = 1 << 2;
        const ACTIVE     = 1 << 3;
        const ACTIVE_IN  = 1 << 4;
        const ACTIVE_OUT = 1 << 5;
        const FOCUSED    = 1 << 6;
        const FOCUS_IN   = 1 << 7;
        const FOCUS_OUT  = 1 << 8;

        const LEVELS = Self::HOVERED.bits() | Self::ACTIVE.bits() | Self::FOCUSED.bits();
        const EDGES = Self::HOVER_IN.bits()
            | Self::HOVER_OUT.bits()
            | Self::ACTIVE_IN.bits()
            | Self::ACTIVE_OUT.bits()
            | Self::FOCUS_IN.bits()
            | Self::FOCUS_OUT.bits();
    }
}

/// (level, in-edge, out-edge) triples.
const LEVEL_EDGES: [(InteractionState, InteractionState, InteractionState); 3] = [
    (
        InteractionState::HOVERED,
        InteractionState::HOVER_IN,
        InteractionState::HOVER_OUT,
    ),
    (
        InteractionState::ACTIVE,
        InteractionState::ACTIVE_IN,
        InteractionState::ACTIVE_OUT,
    ),
    (
        InteractionState::FOCUSED,
        InteractionState::FOCUS_IN,
        InteractionState::FOCUS_OUT,
    ),
];

impl InteractionState {
    /// Combine this frame's levels with the edges relative to `previous`.
    ///
    /// Only the level bits of either argument are considered.
    pub fn from_levels(previous: InteractionState, levels: InteractionState) -> InteractionState {
        let prev = previous & Self::LEVELS;
        let now = levels & Self::LEVELS;
        let changed = prev ^ now;
        let mut out = now;
        for (level, rise, fall) in LEVEL_EDGES {
            if changed.contains(level) {
                out |= if now.contains(level) { rise } else { fall };
            }
        }
        out
    }

    pub fn levels(self) -> InteractionState {
        self & Self::LEVELS
    }

    pub fn edges(self) -> InteractionState {
        self & Self::EDGES
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];
}

/// A click detected in one frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Click {
    pub button: MouseButton,
    pub double: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_edge() {
        let s = InteractionState::from_levels(InteractionState::empty(), InteractionState::HOVERED);
        assert!(s.contains(InteractionState::HOVERED | InteractionState::HOVER_IN));
        assert!(!s.contains(InteractionState::HOVER_OUT));
    }

    #[test]
    fn test_falling_edge() {
        let s = InteractionState::from_levels(InteractionState::HOVERED, InteractionState::empty());
        assert_eq!(s, InteractionState::HOVER_OUT);
    }

    #[test]
    fn test_sustained_level_has_no_edge() {
        let prev = InteractionState::HOVERED | InteractionState::HOVER_IN;
        let s = InteractionState::from_levels(prev, InteractionState::HOVERED);
        assert_eq!(s, InteractionState::HOVERED);
        assert!(s.edges().is_empty());
    }

    #[test]
    fn test_independent_levels() {
        let prev = InteractionState::HOVERED | InteractionState::FOCUSED;
        let now = InteractionState::HOVERED | InteractionState::ACTIVE;
        let s = InteractionState::from_levels(prev, now);
        assert!(s.contains(InteractionState::ACTIVE_IN));
        assert!(s.contains(InteractionState::FOCUS_OUT));
        assert!(!s.contains(InteractionState::HOVER_IN));
        assert_eq!(s.levels(), now);
    }
}
