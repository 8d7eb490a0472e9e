use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use arbor_geometry::{Point, Size};
use arbor_render::{HitTestBehavior, Invalidation, LayoutCx, RenderObject};

use crate::framework::Framework;
use crate::key::Key;
use crate::widget::{RenderObjectWidget, Widget, WidgetChildren, WidgetKind, WidgetRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
    Scroll,
}

/// A pointer event in root coordinates.
///
/// Copies share one consumed flag, so a handler that consumes the event stops
/// delivery to the listeners behind it.
#[derive(Clone, Debug)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: Point,
    /// Scroll amount for [`PointerEventKind::Scroll`]; zero otherwise.
    pub scroll_delta: Point,
    pub time: Duration,
    consumed: Rc<Cell<bool>>,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, position: Point, time: Duration) -> Self {
        Self {
            kind,
            position,
            scroll_delta: Point::ZERO,
            time,
            consumed: Rc::new(Cell::new(false)),
        }
    }

    pub fn scroll(position: Point, delta: Point, time: Duration) -> Self {
        Self {
            scroll_delta: delta,
            ..Self::new(PointerEventKind::Scroll, position, time)
        }
    }

    pub fn consume(&self) {
        self.consumed.set(true);
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.get()
    }
}

/// Called with the framework, the event, and the pointer position in the
/// listener's local space. Handlers may mutate state and schedule work but
/// never build or lay out synchronously.
pub type PointerHandler = Rc<dyn Fn(&mut Framework, &PointerEvent, Point)>;

/// Render object that marks a hit-testable region carrying a pointer handler.
pub struct RenderPointerListener {
    handler: PointerHandler,
    behavior: HitTestBehavior,
}

impl RenderPointerListener {
    pub fn new(handler: PointerHandler, behavior: HitTestBehavior) -> Self {
        Self { handler, behavior }
    }

    pub fn handler(&self) -> PointerHandler {
        Rc::clone(&self.handler)
    }

    pub fn set_handler(&mut self, handler: PointerHandler) {
        self.handler = handler;
    }

    pub fn set_behavior(&mut self, behavior: HitTestBehavior) -> Invalidation {
        self.behavior = behavior;
        Invalidation::NONE
    }
}

impl fmt::Debug for RenderPointerListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPointerListener")
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

impl RenderObject for RenderPointerListener {
    fn perform_layout(&mut self, cx: &mut LayoutCx<'_>) -> Size {
        let constraints = cx.constraints();
        match cx.first_child() {
            Some(child) => {
                let size = cx.layout_child(child, constraints, true);
                cx.position_child(child, Point::ZERO);
                size
            }
            None => constraints.biggest(),
        }
    }

    fn hit_test_behavior(&self) -> HitTestBehavior {
        self.behavior
    }
}

/// Delivers pointer events that land on its child (or, when opaque, on its
/// own bounds) to `handler`.
#[derive(Clone)]
pub struct PointerListener {
    pub key: Option<Key>,
    pub behavior: HitTestBehavior,
    pub handler: PointerHandler,
    pub child: Option<WidgetRef>,
}

impl PointerListener {
    pub fn new(handler: impl Fn(&mut Framework, &PointerEvent, Point) + 'static) -> Self {
        Self {
            key: None,
            behavior: HitTestBehavior::DeferToChild,
            handler: Rc::new(handler),
            child: None,
        }
    }

    pub fn with_behavior(mut self, behavior: HitTestBehavior) -> Self {
        self.behavior = behavior;
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

impl fmt::Debug for PointerListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerListener")
            .field("key", &self.key)
            .field("behavior", &self.behavior)
            .field("child", &self.child)
            .finish_non_exhaustive()
    }
}

impl Widget for PointerListener {
    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Render(self)
    }
}

impl RenderObjectWidget for PointerListener {
    type Render = RenderPointerListener;

    fn create_render_object(&self) -> RenderPointerListener {
        RenderPointerListener::new(Rc::clone(&self.handler), self.behavior)
    }

    fn update_render_object(&self, render: &mut RenderPointerListener) -> Invalidation {
        render.set_handler(Rc::clone(&self.handler));
        render.set_behavior(self.behavior)
    }

    fn children(&self) -> WidgetChildren<'_> {
        WidgetChildren::Single(self.child.as_ref())
    }
}
