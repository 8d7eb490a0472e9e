//! Tweens driven by next-frame callbacks.
//!
//! An [`Animation`] is a two-state machine. [`Animation::evaluate`] is a pure
//! step from a timestamp to `(value, done)`; whoever owns the animation decides
//! whether to enroll for another frame based on `done`.

use std::f32::consts::PI;
use std::time::Duration;

use arbor_geometry::{Color, EdgeInsets, Point, Size};

/// Linear interpolation between two values of the same type.
pub trait Lerp {
    fn lerp(&self, target: &Self, fraction: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction
    }
}

impl Lerp for Point {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Point::new(
            self.x.lerp(&target.x, fraction),
            self.y.lerp(&target.y, fraction),
        )
    }
}

impl Lerp for Size {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Size::new(
            self.width.lerp(&target.width, fraction),
            self.height.lerp(&target.height, fraction),
        )
    }
}

impl Lerp for EdgeInsets {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        EdgeInsets::lerp(*self, *target, fraction)
    }
}

impl Lerp for Color {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Color(
            self.0.lerp(&target.0, fraction),
            self.1.lerp(&target.1, fraction),
            self.2.lerp(&target.2, fraction),
            self.3.lerp(&target.3, fraction),
        )
    }
}

/// Easing curves mapping linear progress in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Curve {
    #[default]
    Linear,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
}

impl Curve {
    pub fn transform(&self, t: f32) -> f32 {
        match self {
            Curve::Linear => t,
            Curve::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Curve::EaseOutSine => (t * PI / 2.0).sin(),
            Curve::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Curve::EaseInQuad => t * t,
            Curve::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Curve::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Curve::EaseInCubic => t * t * t,
            Curve::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Curve::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Curve::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Curve::EaseOutBounce => bounce_out(t),
            Curve::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Linear progress of `now` through `[start, start + duration]`, clamped.
pub fn progress(start: Duration, duration: Duration, now: Duration) -> f32 {
    if now <= start {
        return if duration.is_zero() { 1.0 } else { 0.0 };
    }
    let elapsed = now - start;
    if elapsed >= duration {
        return 1.0;
    }
    elapsed.as_secs_f32() / duration.as_secs_f32()
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnimationState<T> {
    Idle {
        value: T,
    },
    Running {
        from: T,
        to: T,
        start: Duration,
        duration: Duration,
        curve: Curve,
    },
}

/// A value that tweens towards a target over `duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation<T> {
    duration: Duration,
    curve: Curve,
    state: AnimationState<T>,
}

impl<T: Lerp + Clone> Animation<T> {
    pub fn new(value: T, duration: Duration, curve: Curve) -> Self {
        Self {
            duration,
            curve,
            state: AnimationState::Idle { value },
        }
    }

    pub fn state(&self) -> &AnimationState<T> {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, AnimationState::Running { .. })
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn set_curve(&mut self, curve: Curve) {
        self.curve = curve;
    }

    /// Where the animation ends up.
    pub fn target(&self) -> &T {
        match &self.state {
            AnimationState::Idle { value } => value,
            AnimationState::Running { to, .. } => to,
        }
    }

    /// Value at `now` and whether the tween has finished. Does not change state.
    pub fn evaluate(&self, now: Duration) -> (T, bool) {
        match &self.state {
            AnimationState::Idle { value } => (value.clone(), true),
            AnimationState::Running {
                from,
                to,
                start,
                duration,
                curve,
            } => {
                let t = progress(*start, *duration, now);
                if t <= 0.0 {
                    (from.clone(), false)
                } else if t >= 1.0 {
                    (to.clone(), true)
                } else {
                    (from.lerp(to, curve.transform(t)), false)
                }
            }
        }
    }

    /// Starts tweening from the value at `now` towards `to`.
    pub fn start(&mut self, now: Duration, to: T) {
        let (from, _) = self.evaluate(now);
        self.state = AnimationState::Running {
            from,
            to,
            start: now,
            duration: self.duration,
            curve: self.curve,
        };
    }

    /// Jumps to `value` without tweening.
    pub fn set(&mut self, value: T) {
        self.state = AnimationState::Idle { value };
    }

    /// Evaluates at `now` and settles into `Idle` once finished.
    pub fn advance(&mut self, now: Duration) -> (T, bool) {
        let (value, done) = self.evaluate(now);
        if done && self.is_running() {
            self.state = AnimationState::Idle {
                value: value.clone(),
            };
        }
        (value, done)
    }
}

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
