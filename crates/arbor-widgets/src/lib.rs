//! Widget and element layer of Arbor.
//!
//! Widgets are immutable descriptions; elements are the persistent nodes
//! reconciled against them each build. Elements that own render objects keep
//! the render trees of [`arbor_render`] in step with the widget tree.

pub mod animation;
mod build_owner;
mod context;
mod element;
mod framework;
mod key;
mod reconcile;
mod view;
mod widget;
pub mod widgets;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

pub(crate) mod collections {
    pub(crate) use arbor_render::collections::map::{HashMap, HashSet};
}

pub use build_owner::BuildOwner;
pub use context::BuildContext;
pub use element::{ElementError, ElementId, ElementStats, Lifecycle, Slot};
pub use framework::Framework;
pub use key::{GlobalKey, Key};
pub use view::View;
pub use widget::{
    can_update, AnyState, DynRenderObjectWidget, DynStatefulWidget, ProxyWidget,
    RenderObjectWidget, State, StatefulWidget, StatelessWidget, Widget, WidgetChildren,
    WidgetKind, WidgetRef,
};

pub use arbor_geometry as geometry;
pub use arbor_render as render;

pub mod prelude {
    pub use crate::animation::{Animation, Curve, Lerp};
    pub use crate::widgets::*;
    pub use crate::{
        BuildContext, Framework, GlobalKey, Key, State, StatefulWidget, StatelessWidget, View,
        Widget, WidgetKind, WidgetRef,
    };
    pub use arbor_geometry::prelude::*;
}
