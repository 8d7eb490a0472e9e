use std::time::Duration;

use arbor_geometry::{Color, EdgeInsets};

use super::*;

const ALL_CURVES: [Curve; 13] = [
    Curve::Linear,
    Curve::EaseInSine,
    Curve::EaseOutSine,
    Curve::EaseInOutSine,
    Curve::EaseInQuad,
    Curve::EaseOutQuad,
    Curve::EaseInOutQuad,
    Curve::EaseInCubic,
    Curve::EaseOutCubic,
    Curve::EaseInOutCubic,
    Curve::EaseInBounce,
    Curve::EaseOutBounce,
    Curve::EaseInOutBounce,
];

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn curves_start_at_zero_and_end_at_one() {
    for curve in ALL_CURVES {
        assert_close(curve.transform(0.0), 0.0);
        assert_close(curve.transform(1.0), 1.0);
    }
}

#[test]
fn curve_midpoints() {
    assert_close(Curve::Linear.transform(0.25), 0.25);
    assert_close(Curve::EaseInSine.transform(0.5), 1.0 - (PI / 4.0).cos());
    assert_close(Curve::EaseOutQuad.transform(0.5), 0.75);
    assert_close(Curve::EaseInOutCubic.transform(0.5), 0.5);
    assert_close(Curve::EaseOutBounce.transform(0.5), 0.765625);
    assert_close(Curve::EaseInBounce.transform(0.5), 1.0 - 0.765625);
}

#[test]
fn idle_animation_is_done() {
    let animation = Animation::new(2.0_f32, ms(100), Curve::Linear);
    assert_eq!(animation.evaluate(ms(5)), (2.0, true));
    assert!(!animation.is_running());
}

#[test]
fn running_animation_follows_progress() {
    let mut animation = Animation::new(0.0_f32, ms(1000), Curve::Linear);
    animation.start(ms(1000), 1.0);

    assert_eq!(animation.evaluate(ms(1000)), (0.0, false));
    let (value, done) = animation.evaluate(ms(1500));
    assert_close(value, 0.5);
    assert!(!done);
    assert_eq!(animation.evaluate(ms(2000)), (1.0, true));
    assert_eq!(animation.evaluate(ms(9000)), (1.0, true));
    assert!(animation.is_running(), "evaluate does not change state");

    assert_eq!(animation.advance(ms(2000)), (1.0, true));
    assert_eq!(animation.state(), &AnimationState::Idle { value: 1.0 });
}

#[test]
fn retargeting_starts_from_the_current_value() {
    let mut animation = Animation::new(0.0_f32, ms(100), Curve::Linear);
    animation.start(ms(0), 1.0);
    animation.start(ms(50), 0.0);

    assert_eq!(animation.target(), &0.0);
    match animation.state() {
        AnimationState::Running { from, start, .. } => {
            assert_close(*from, 0.5);
            assert_eq!(*start, ms(50));
        }
        state => panic!("expected a running animation, got {state:?}"),
    }
}

#[test]
fn zero_duration_finishes_immediately() {
    let mut animation = Animation::new(0.0_f32, Duration::ZERO, Curve::EaseInSine);
    animation.start(ms(10), 4.0);
    assert_eq!(animation.evaluate(ms(10)), (4.0, true));
}

#[test]
fn progress_is_clamped() {
    assert_eq!(progress(ms(100), ms(100), ms(50)), 0.0);
    assert_eq!(progress(ms(100), ms(100), ms(300)), 1.0);
    assert_close(progress(ms(100), ms(100), ms(125)), 0.25);
}

#[test]
fn geometric_values_interpolate() {
    let insets = EdgeInsets::all(0.0).lerp(&EdgeInsets::all(10.0), 0.5);
    assert_eq!(insets, EdgeInsets::all(5.0));

    let color = Color::BLACK.lerp(&Color::WHITE, 0.25);
    assert_close(color.r(), 0.25);
    assert_close(color.a(), 1.0);
}
