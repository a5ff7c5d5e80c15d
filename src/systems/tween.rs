//! Animation engine.
//!
//! [`AnimationEngine`] keeps one [`AnimationState`] per animated property
//! (keyed by [`TypeTag`]) and produces one interpolated sample per frame:
//! - [`AnimationEngine::start`] – begin or retarget a transition
//! - [`AnimationEngine::process`] – advance every running transition to `now`
//! - [`AnimationEngine::current`] – read the last sampled value
//!
//! The table sits behind its own read-write lock, scoped to animation
//! bookkeeping only, so reads from the render path never contend with the
//! entity's other properties. Times are world-time seconds, see
//! [`WorldTime`](crate::resources::worldtime::WorldTime).

use crate::components::command::TypeTag;
use crate::components::tween::{AnimValue, AnimationState, Easing};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Apply an easing function to a normalized time value.
///
/// The input `t` is clamped to [0.0, 1.0] and transformed according to the
/// easing curve.
pub fn ease(e: Easing, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::Linear => t,
        Easing::QuadIn => t * t,
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        Easing::CubicIn => t * t * t,
        Easing::CubicOut => {
            let p = t - 1.0;
            p * p * p + 1.0
        }
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let p = 2.0 * t - 2.0;
                0.5 * p * p * p + 1.0
            }
        }
        Easing::Custom(f) => {
            if t <= 0.0 {
                0.0
            } else if t >= 1.0 {
                1.0
            } else {
                f(t)
            }
        }
    }
}

/// Normalized progress of `st` at `now`, clamped to [0.0, 1.0].
fn progress(st: &AnimationState, now: f32) -> f32 {
    if st.duration <= 0.0 {
        return 1.0;
    }
    ((now - st.start_time) / st.duration).clamp(0.0, 1.0)
}

/// Interpolated value of `st` at `now`, without mutating it.
fn sample(st: &AnimationState, now: f32) -> AnimValue {
    if !st.animating {
        return st.current;
    }
    let p = progress(st, now);
    if p >= 1.0 {
        st.end
    } else {
        st.start.lerp(st.end, ease(st.easing, p))
    }
}

#[derive(Default)]
pub struct AnimationEngine {
    table: RwLock<FxHashMap<TypeTag, AnimationState>>,
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base value of `tag`, cancelling any running transition.
    pub fn set_value(&self, tag: TypeTag, value: AnimValue) {
        self.table
            .write()
            .insert(tag, AnimationState::settled(value));
    }

    /// Transition `tag` toward `target` over `duration` seconds from `now`.
    ///
    /// - Already running toward `target`: nothing changes, returns `false`.
    /// - Running toward something else, or settled: the value rendered at
    ///   `now` becomes the new start value.
    /// - No value recorded yet, or `duration <= 0`: snaps to `target`.
    ///
    /// `easing` defaults to [`Easing::QuadOut`]. Returns whether a new
    /// transition began.
    pub fn start(
        &self,
        tag: TypeTag,
        target: AnimValue,
        duration: f32,
        easing: Option<Easing>,
        now: f32,
    ) -> bool {
        let mut table = self.table.write();
        let Some(st) = table.get_mut(&tag) else {
            table.insert(tag, AnimationState::settled(target));
            return false;
        };
        if st.animating && st.end == target {
            return false;
        }
        if !st.animating && st.current == target {
            return false;
        }
        if duration <= 0.0 || !st.current.same_kind(&target) {
            *st = AnimationState::settled(target);
            return false;
        }
        let from = sample(st, now);
        *st = AnimationState {
            start_time: now,
            duration,
            start: from,
            end: target,
            current: from,
            animating: true,
            easing: easing.unwrap_or_default(),
        };
        true
    }

    /// Advance all running transitions to `now`. Returns how many are still running.
    ///
    /// A transition whose progress reaches 1.0 lands exactly on its end value.
    pub fn process(&self, now: f32) -> usize {
        let mut table = self.table.write();
        let mut running = 0;
        for st in table.values_mut() {
            if !st.animating {
                continue;
            }
            if progress(st, now) >= 1.0 {
                st.current = st.end;
                st.animating = false;
            } else {
                st.current = sample(st, now);
                running += 1;
            }
        }
        running
    }

    /// Last sampled value of `tag`.
    pub fn current(&self, tag: &TypeTag) -> Option<AnimValue> {
        self.table.read().get(tag).map(|st| st.current)
    }

    /// Value `tag` would have at `now`, without advancing anything.
    pub fn value_at(&self, tag: &TypeTag, now: f32) -> Option<AnimValue> {
        self.table.read().get(tag).map(|st| sample(st, now))
    }

    pub fn state(&self, tag: &TypeTag) -> Option<AnimationState> {
        self.table.read().get(tag).copied()
    }

    pub fn is_animating(&self, tag: &TypeTag) -> bool {
        self.table.read().get(tag).is_some_and(|st| st.animating)
    }

    pub fn any_animating(&self) -> bool {
        self.table.read().values().any(|st| st.animating)
    }

    pub fn remove(&self, tag: &TypeTag) -> Option<AnimationState> {
        self.table.write().remove(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::color::Color;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
    ];

    fn engine_with_black() -> AnimationEngine {
        let engine = AnimationEngine::new();
        engine.set_value(TypeTag::BgColor, Color::BLACK.into());
        engine
    }

    fn red_channel(engine: &AnimationEngine) -> f32 {
        engine
            .current(&TypeTag::BgColor)
            .and_then(|v| v.as_color())
            .unwrap()
            .r
    }

    // ==================== EASING FUNCTION TESTS ====================

    #[test]
    fn test_ease_endpoints() {
        for easing in ALL {
            assert!(approx_eq(ease(easing, 0.0), 0.0), "{:?} at 0", easing);
            assert!(approx_eq(ease(easing, 1.0), 1.0), "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_ease_clamps_input() {
        for easing in ALL {
            assert!(approx_eq(ease(easing, -0.5), 0.0), "{:?} below 0", easing);
            assert!(approx_eq(ease(easing, 1.5), 1.0), "{:?} above 1", easing);
        }
    }

    #[test]
    fn test_ease_known_values() {
        assert!(approx_eq(ease(Easing::Linear, 0.25), 0.25));
        assert!(approx_eq(ease(Easing::QuadIn, 0.5), 0.25));
        assert!(approx_eq(ease(Easing::QuadOut, 0.5), 0.75));
        assert!(approx_eq(ease(Easing::QuadInOut, 0.75), 0.875));
        assert!(approx_eq(ease(Easing::CubicIn, 0.5), 0.125));
        assert!(approx_eq(ease(Easing::CubicOut, 0.5), 0.875));
        assert!(approx_eq(ease(Easing::CubicInOut, 0.75), 0.9375));
    }

    #[test]
    fn test_ease_monotonicity() {
        for easing in ALL {
            let mut prev = ease(easing, 0.0);
            for i in 1..=100 {
                let t = i as f32 / 100.0;
                let curr = ease(easing, t);
                assert!(curr >= prev - EPSILON, "{:?} not monotonic at {}", easing, t);
                prev = curr;
            }
        }
    }

    #[test]
    fn test_ease_custom_pins_endpoints() {
        fn overshoot(t: f32) -> f32 {
            t * 1.5 + 0.2
        }
        assert!(approx_eq(ease(Easing::Custom(overshoot), 0.0), 0.0));
        assert!(approx_eq(ease(Easing::Custom(overshoot), 1.0), 1.0));
        assert!(approx_eq(ease(Easing::Custom(overshoot), 0.5), 0.95));
    }

    // ==================== ENGINE TESTS ====================

    #[test]
    fn test_linear_midpoint_and_exact_arrival() {
        let engine = engine_with_black();
        assert!(engine.start(TypeTag::BgColor, Color::RED.into(), 0.2, Some(Easing::Linear), 0.0));

        engine.process(0.1);
        assert!(approx_eq(red_channel(&engine), 0.5));
        assert!(engine.is_animating(&TypeTag::BgColor));

        engine.process(0.25);
        assert_eq!(engine.current(&TypeTag::BgColor), Some(Color::RED.into()));
        assert!(!engine.is_animating(&TypeTag::BgColor));
    }

    #[test]
    fn test_default_easing_is_quad_out() {
        let engine = engine_with_black();
        engine.start(TypeTag::BgColor, Color::RED.into(), 1.0, None, 0.0);
        engine.process(0.5);
        assert!(approx_eq(red_channel(&engine), 0.75));
    }

    #[test]
    fn test_sample_at_start_is_value_at_call_time() {
        let engine = engine_with_black();
        engine.start(TypeTag::BgColor, Color::RED.into(), 1.0, Some(Easing::Linear), 2.0);
        assert_eq!(
            engine.value_at(&TypeTag::BgColor, 2.0),
            Some(Color::BLACK.into())
        );
    }

    #[test]
    fn test_same_target_does_not_reset_progress() {
        let engine = engine_with_black();
        engine.start(TypeTag::BgColor, Color::RED.into(), 1.0, Some(Easing::Linear), 0.0);
        engine.process(0.5);
        assert!(!engine.start(TypeTag::BgColor, Color::RED.into(), 1.0, Some(Easing::Linear), 0.5));

        let st = engine.state(&TypeTag::BgColor).unwrap();
        assert!(approx_eq(st.start_time, 0.0));
        engine.process(1.0);
        assert_eq!(engine.current(&TypeTag::BgColor), Some(Color::RED.into()));
    }

    #[test]
    fn test_retarget_starts_from_rendered_value() {
        let engine = engine_with_black();
        engine.start(TypeTag::BgColor, Color::RED.into(), 1.0, Some(Easing::Linear), 0.0);
        engine.process(0.5);
        // hover-out right after hover-in: reverse from the half-blended colour
        assert!(engine.start(TypeTag::BgColor, Color::BLACK.into(), 1.0, Some(Easing::Linear), 0.5));

        let st = engine.state(&TypeTag::BgColor).unwrap();
        assert!(approx_eq(st.start.as_color().unwrap().r, 0.5));
        assert!(approx_eq(st.start_time, 0.5));
        assert!(approx_eq(red_channel(&engine), 0.5));

        engine.process(1.0);
        assert!(approx_eq(red_channel(&engine), 0.25));
        engine.process(1.5);
        assert_eq!(engine.current(&TypeTag::BgColor), Some(Color::BLACK.into()));
    }

    #[test]
    fn test_start_without_base_snaps() {
        let engine = AnimationEngine::new();
        assert!(!engine.start(TypeTag::Size, AnimValue::Scalar(4.0), 1.0, None, 0.0));
        assert_eq!(engine.current(&TypeTag::Size), Some(AnimValue::Scalar(4.0)));
        assert!(!engine.any_animating());
    }

    #[test]
    fn test_zero_duration_snaps() {
        let engine = engine_with_black();
        assert!(!engine.start(TypeTag::BgColor, Color::RED.into(), 0.0, None, 1.0));
        assert_eq!(engine.current(&TypeTag::BgColor), Some(Color::RED.into()));
        assert!(!engine.is_animating(&TypeTag::BgColor));
    }

    #[test]
    fn test_target_equal_to_settled_value_is_noop() {
        let engine = engine_with_black();
        assert!(!engine.start(TypeTag::BgColor, Color::BLACK.into(), 1.0, None, 0.0));
        assert!(!engine.any_animating());
    }

    #[test]
    fn test_set_value_cancels() {
        let engine = engine_with_black();
        engine.start(TypeTag::BgColor, Color::RED.into(), 1.0, None, 0.0);
        engine.set_value(TypeTag::BgColor, Color::BLUE.into());
        assert!(!engine.is_animating(&TypeTag::BgColor));
        assert_eq!(engine.current(&TypeTag::BgColor), Some(Color::BLUE.into()));
    }

    #[test]
    fn test_process_counts_running() {
        let engine = engine_with_black();
        engine.set_value(TypeTag::Size, AnimValue::Scalar(0.0));
        engine.start(TypeTag::BgColor, Color::RED.into(), 1.0, None, 0.0);
        engine.start(TypeTag::Size, AnimValue::Scalar(10.0), 2.0, None, 0.0);
        assert_eq!(engine.process(0.5), 2);
        assert_eq!(engine.process(1.5), 1);
        assert_eq!(engine.process(2.5), 0);
        assert_eq!(engine.current(&TypeTag::Size), Some(AnimValue::Scalar(10.0)));
    }

    #[test]
    fn test_concurrent_reads_while_processing() {
        use std::sync::Arc;
        let engine = Arc::new(engine_with_black());
        engine.start(TypeTag::BgColor, Color::WHITE.into(), 1.0, Some(Easing::Linear), 0.0);
        let reader = {
            let engine = engine.clone();
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    let c = engine.current(&TypeTag::BgColor).and_then(|v| v.as_color()).unwrap();
                    // never partially written: all channels move together
                    assert!(approx_eq(c.r, c.g) && approx_eq(c.g, c.b));
                }
            })
        };
        for i in 0..=100 {
            engine.process(i as f32 / 100.0);
        }
        reader.join().unwrap();
        assert_eq!(engine.current(&TypeTag::BgColor), Some(Color::WHITE.into()));
    }
}
