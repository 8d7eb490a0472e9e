//! Widget configuration values and the per-kind capability traits.
//!
//! A widget is an immutable description rebuilt every frame. What an element
//! does with it is decided by [`Widget::kind`], which hands back the widget as
//! exactly one capability: it builds a child, holds state, forwards a child,
//! owns a render object, or roots a pipeline.

use std::any::{type_name, Any};
use std::fmt;
use std::rc::Rc;

use arbor_render::{AsAny, Invalidation, ParentData, RenderObject};

use crate::context::BuildContext;
use crate::key::Key;
use crate::view::View;

pub type WidgetRef = Rc<dyn Widget>;

pub trait Widget: AsAny + fmt::Debug {
    fn key(&self) -> Option<&Key> {
        None
    }

    fn kind(&self) -> WidgetKind<'_>;

    fn debug_name(&self) -> &'static str {
        let full = std::any::type_name_of_val(self);
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// The capability a widget exposes to its element.
pub enum WidgetKind<'a> {
    Stateless(&'a dyn StatelessWidget),
    Stateful(&'a dyn DynStatefulWidget),
    Proxy(&'a dyn ProxyWidget),
    Render(&'a dyn DynRenderObjectWidget),
    View(&'a View),
}

/// Whether an element configured by `old` can be reconfigured with `new`:
/// same concrete type and same key.
pub fn can_update(old: &dyn Widget, new: &dyn Widget) -> bool {
    Any::type_id(old.as_any()) == Any::type_id(new.as_any()) && old.key() == new.key()
}

pub(crate) fn downcast_widget<W: Widget>(widget: &dyn Widget) -> &W {
    match widget.as_any().downcast_ref::<W>() {
        Some(widget) => widget,
        None => panic!("{} is not a {}", widget.debug_name(), type_name::<W>()),
    }
}

pub trait StatelessWidget {
    fn build(&self, cx: &mut BuildContext<'_>) -> WidgetRef;
}

/// A widget whose element keeps a [`State`] across rebuilds.
pub trait StatefulWidget: Widget + Sized {
    type State: State<Widget = Self>;

    fn create_state(&self) -> Self::State;
}

/// Long-lived companion of a stateful element.
///
/// The element owns the state; the widget passed to each hook is the element's
/// current configuration.
pub trait State: 'static {
    type Widget: StatefulWidget<State = Self>;

    fn init_state(&mut self, _widget: &Self::Widget, _cx: &mut BuildContext<'_>) {}

    fn did_update_widget(
        &mut self,
        _old: &Self::Widget,
        _widget: &Self::Widget,
        _cx: &mut BuildContext<'_>,
    ) {
    }

    fn activate(&mut self) {}

    fn deactivate(&mut self) {}

    fn dispose(&mut self) {}

    fn build(&mut self, widget: &Self::Widget, cx: &mut BuildContext<'_>) -> WidgetRef;
}

pub trait DynStatefulWidget {
    fn create_state_boxed(&self) -> Box<dyn AnyState>;
}

impl<W: StatefulWidget> DynStatefulWidget for W {
    fn create_state_boxed(&self) -> Box<dyn AnyState> {
        Box::new(self.create_state())
    }
}

/// Type-erased [`State`], driven by the element with `dyn Widget` configurations.
pub trait AnyState: AsAny {
    fn init_state_dyn(&mut self, widget: &dyn Widget, cx: &mut BuildContext<'_>);
    fn did_update_widget_dyn(
        &mut self,
        old: &dyn Widget,
        widget: &dyn Widget,
        cx: &mut BuildContext<'_>,
    );
    fn activate_dyn(&mut self);
    fn deactivate_dyn(&mut self);
    fn dispose_dyn(&mut self);
    fn build_dyn(&mut self, widget: &dyn Widget, cx: &mut BuildContext<'_>) -> WidgetRef;
}

impl<S: State> AnyState for S {
    fn init_state_dyn(&mut self, widget: &dyn Widget, cx: &mut BuildContext<'_>) {
        self.init_state(downcast_widget::<S::Widget>(widget), cx);
    }

    fn did_update_widget_dyn(
        &mut self,
        old: &dyn Widget,
        widget: &dyn Widget,
        cx: &mut BuildContext<'_>,
    ) {
        self.did_update_widget(
            downcast_widget::<S::Widget>(old),
            downcast_widget::<S::Widget>(widget),
            cx,
        );
    }

    fn activate_dyn(&mut self) {
        self.activate();
    }

    fn deactivate_dyn(&mut self) {
        self.deactivate();
    }

    fn dispose_dyn(&mut self) {
        self.dispose();
    }

    fn build_dyn(&mut self, widget: &dyn Widget, cx: &mut BuildContext<'_>) -> WidgetRef {
        self.build(downcast_widget::<S::Widget>(widget), cx)
    }
}

/// A widget that wraps exactly one child and optionally decorates the parent
/// data of the render objects below it.
pub trait ProxyWidget {
    fn child(&self) -> &WidgetRef;

    /// Writes this widget's parent data. Returns whether anything changed.
    fn apply_parent_data(&self, _data: &mut ParentData) -> bool {
        false
    }
}

/// Child widgets of a render-object widget. The variant fixes the element's
/// shape for its whole life: leaf, single child, or child list.
pub enum WidgetChildren<'a> {
    None,
    Single(Option<&'a WidgetRef>),
    Many(&'a [WidgetRef]),
}

pub trait RenderObjectWidget: Widget {
    type Render: RenderObject;

    fn create_render_object(&self) -> Self::Render;

    /// Copies this configuration onto an existing render object, reporting
    /// which pipeline stages the change invalidates.
    fn update_render_object(&self, render: &mut Self::Render) -> Invalidation;

    fn children(&self) -> WidgetChildren<'_> {
        WidgetChildren::None
    }
}

pub trait DynRenderObjectWidget {
    fn create_render_boxed(&self) -> Box<dyn RenderObject>;
    fn update_render_dyn(&self, render: &mut dyn RenderObject) -> Invalidation;
    fn child_widgets(&self) -> WidgetChildren<'_>;
}

impl<W: RenderObjectWidget> DynRenderObjectWidget for W {
    fn create_render_boxed(&self) -> Box<dyn RenderObject> {
        Box::new(self.create_render_object())
    }

    fn update_render_dyn(&self, render: &mut dyn RenderObject) -> Invalidation {
        let name = render.debug_name();
        match render.as_any_mut().downcast_mut::<W::Render>() {
            Some(render) => self.update_render_object(render),
            None => panic!(
                "{} cannot update a {name}; expected {}",
                self.debug_name(),
                type_name::<W::Render>()
            ),
        }
    }

    fn child_widgets(&self) -> WidgetChildren<'_> {
        self.children()
    }
}

#[cfg(test)]
#[path = "tests/widget_tests.rs"]
mod tests;
