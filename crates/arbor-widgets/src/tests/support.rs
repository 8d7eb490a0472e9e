//! Widgets and helpers shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use arbor_geometry::{Color, Size};

use crate::widgets::{ColoredBox, Flex};
use crate::{
    BuildContext, ElementId, Framework, Key, State, StatefulWidget, View, Widget, WidgetKind,
    WidgetRef,
};

thread_local! {
    static EVENTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn record(event: impl Into<String>) {
    EVENTS.with(|events| events.borrow_mut().push(event.into()));
}

pub(crate) fn take_events() -> Vec<String> {
    EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
}

pub(crate) const VIEW_SIZE: Size = Size::new(200.0, 100.0);

pub(crate) fn color_box() -> WidgetRef {
    Rc::new(ColoredBox::new(Color::WHITE))
}

pub(crate) fn keyed_box(key: i64) -> WidgetRef {
    Rc::new(ColoredBox::new(Color::rgb(key as f32 / 10.0, 0.0, 0.0)).with_key(key))
}

pub(crate) fn keyed_row(keys: &[i64]) -> WidgetRef {
    Rc::new(Flex::row(keys.iter().map(|key| keyed_box(*key)).collect()))
}

/// Mounts `child` under a sized root view and builds it.
pub(crate) fn mount(framework: &mut Framework, child: WidgetRef) -> ElementId {
    let root = framework.mount_root(Rc::new(View::new(child).with_size(VIEW_SIZE)));
    framework.build_scope();
    root
}

/// Replaces the root view's child and runs the build and unmount phases.
pub(crate) fn remount(framework: &mut Framework, child: WidgetRef) {
    framework.mount_root(Rc::new(View::new(child).with_size(VIEW_SIZE)));
    framework.build_scope();
    framework.finalize_tree();
}

/// Runs one full frame pass without a host.
pub(crate) fn pump(framework: &mut Framework) {
    framework.build_scope();
    let pipeline = framework.pipeline_mut();
    pipeline.flush_layout();
    pipeline.flush_compositing_bits();
    pipeline.flush_paint();
    framework.finalize_tree();
}

pub(crate) fn first_child(framework: &Framework, id: ElementId) -> ElementId {
    framework.children(id)[0]
}

/// Stateful widget that records its lifecycle and counts its builds.
#[derive(Debug, Clone)]
pub(crate) struct Tracked {
    pub key: Option<Key>,
    pub name: &'static str,
    pub child: Option<WidgetRef>,
}

impl Tracked {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            key: None,
            name,
            child: None,
        }
    }

    pub(crate) fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn with_child(mut self, child: WidgetRef) -> Self {
        self.child = Some(child);
        self
    }
}

impl Widget for Tracked {
    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Stateful(self)
    }
}

impl StatefulWidget for Tracked {
    type State = TrackedState;

    fn create_state(&self) -> TrackedState {
        TrackedState {
            name: self.name,
            builds: 0,
            value: 0,
        }
    }
}

pub(crate) struct TrackedState {
    pub name: &'static str,
    pub builds: usize,
    pub value: i32,
}

impl State for TrackedState {
    type Widget = Tracked;

    fn init_state(&mut self, _widget: &Tracked, _cx: &mut BuildContext<'_>) {
        record(format!("init {}", self.name));
    }

    fn did_update_widget(&mut self, _old: &Tracked, _widget: &Tracked, _cx: &mut BuildContext<'_>) {
        record(format!("update {}", self.name));
    }

    fn activate(&mut self) {
        record(format!("activate {}", self.name));
    }

    fn deactivate(&mut self) {
        record(format!("deactivate {}", self.name));
    }

    fn dispose(&mut self) {
        record(format!("dispose {}", self.name));
    }

    fn build(&mut self, widget: &Tracked, _cx: &mut BuildContext<'_>) -> WidgetRef {
        self.builds += 1;
        record(format!("build {}", self.name));
        let mut body = ColoredBox::new(Color::WHITE);
        body.child = widget.child.clone();
        Rc::new(body)
    }
}
