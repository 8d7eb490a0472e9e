//! Implicitly animated widgets: changing the target property tweens towards
//! it over the following frames.

use std::rc::Rc;
use std::time::Duration;

use arbor_geometry::EdgeInsets;
use log::trace;

use crate::animation::{Animation, Curve};
use crate::context::BuildContext;
use crate::element::ElementId;
use crate::framework::Framework;
use crate::key::Key;
use crate::widget::{State, StatefulWidget, Widget, WidgetKind, WidgetRef};
use crate::widgets::{Opacity, Padding};

type Step<S> = fn(&mut S, Duration) -> bool;

/// Enrolls a next-frame callback that advances the state's animation with
/// `step` and keeps re-enrolling until `step` reports completion.
fn enroll<S: State>(cx: &mut BuildContext<'_>, step: Step<S>) {
    let element = cx.element();
    cx.add_next_frame_callback(move |framework, now| tick(framework, element, now, step));
}

fn tick<S: State>(framework: &mut Framework, element: ElementId, now: Duration, step: Step<S>) {
    match framework.set_state::<S, _>(element, |state| step(state, now)) {
        Ok(true) => trace!("animation on {element:?} settled"),
        Ok(false) => framework.add_next_frame_callback(move |framework, now| {
            tick(framework, element, now, step)
        }),
        Err(err) => trace!("animation stopped: {err}"),
    }
}

/// Fades its child to `opacity` whenever `opacity` changes.
#[derive(Debug, Clone)]
pub struct AnimatedOpacity {
    pub key: Option<Key>,
    pub opacity: f32,
    pub duration: Duration,
    pub curve: Curve,
    pub child: Option<WidgetRef>,
}

impl AnimatedOpacity {
    pub fn new(opacity: f32, duration: Duration) -> Self {
        Self {
            key: None,
            opacity,
            duration,
            curve: Curve::Linear,
            child: None,
        }
    }

    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_child(mut self, child: WidgetRef) -> Self {
        self.child = Some(child);
        self
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl Widget for AnimatedOpacity {
    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Stateful(self)
    }
}

impl StatefulWidget for AnimatedOpacity {
    type State = AnimatedOpacityState;

    fn create_state(&self) -> AnimatedOpacityState {
        AnimatedOpacityState {
            animation: Animation::new(self.opacity, self.duration, self.curve),
            ticking: false,
            current: self.opacity,
        }
    }
}

pub struct AnimatedOpacityState {
    animation: Animation<f32>,
    ticking: bool,
    current: f32,
}

impl AnimatedOpacityState {
    /// Opacity the child was last built with.
    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_running()
    }

    fn step(&mut self, now: Duration) -> bool {
        let (value, done) = self.animation.advance(now);
        self.current = value;
        self.ticking = !done;
        done
    }
}

impl State for AnimatedOpacityState {
    type Widget = AnimatedOpacity;

    fn did_update_widget(
        &mut self,
        _old: &AnimatedOpacity,
        widget: &AnimatedOpacity,
        cx: &mut BuildContext<'_>,
    ) {
        self.animation.set_duration(widget.duration);
        self.animation.set_curve(widget.curve);
        if *self.animation.target() == widget.opacity {
            return;
        }
        self.animation.start(cx.now(), widget.opacity);
        if !self.ticking {
            self.ticking = true;
            enroll::<Self>(cx, Self::step);
        }
    }

    fn build(&mut self, widget: &AnimatedOpacity, _cx: &mut BuildContext<'_>) -> WidgetRef {
        let mut opacity = Opacity::new(self.current);
        opacity.child = widget.child.clone();
        Rc::new(opacity)
    }
}

/// Tweens its child's padding to `padding` whenever `padding` changes.
#[derive(Debug, Clone)]
pub struct AnimatedPadding {
    pub key: Option<Key>,
    pub padding: EdgeInsets,
    pub duration: Duration,
    pub curve: Curve,
    pub child: Option<WidgetRef>,
}

impl AnimatedPadding {
    pub fn new(padding: EdgeInsets, duration: Duration) -> Self {
        Self {
            key: None,
            padding,
            duration,
            curve: Curve::Linear,
            child: None,
        }
    }

    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_child(mut self, child: WidgetRef) -> Self {
        self.child = Some(child);
        self
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl Widget for AnimatedPadding {
    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Stateful(self)
    }
}

impl StatefulWidget for AnimatedPadding {
    type State = AnimatedPaddingState;

    fn create_state(&self) -> AnimatedPaddingState {
        AnimatedPaddingState {
            animation: Animation::new(self.padding, self.duration, self.curve),
            ticking: false,
            current: self.padding,
        }
    }
}

pub struct AnimatedPaddingState {
    animation: Animation<EdgeInsets>,
    ticking: bool,
    current: EdgeInsets,
}

impl AnimatedPaddingState {
    pub fn current(&self) -> EdgeInsets {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_running()
    }

    fn step(&mut self, now: Duration) -> bool {
        let (value, done) = self.animation.advance(now);
        self.current = value;
        self.ticking = !done;
        done
    }
}

impl State for AnimatedPaddingState {
    type Widget = AnimatedPadding;

    fn did_update_widget(
        &mut self,
        _old: &AnimatedPadding,
        widget: &AnimatedPadding,
        cx: &mut BuildContext<'_>,
    ) {
        self.animation.set_duration(widget.duration);
        self.animation.set_curve(widget.curve);
        if *self.animation.target() == widget.padding {
            return;
        }
        self.animation.start(cx.now(), widget.padding);
        if !self.ticking {
            self.ticking = true;
            enroll::<Self>(cx, Self::step);
        }
    }

    fn build(&mut self, widget: &AnimatedPadding, _cx: &mut BuildContext<'_>) -> WidgetRef {
        let mut padding = Padding::new(self.current);
        padding.child = widget.child.clone();
        Rc::new(padding)
    }
}
