use arbor_geometry::{Axis, CrossAxisAlignment, MainAxisAlignment, MainAxisSize};
use arbor_render::objects::RenderFlex;
use arbor_render::{FlexFit, Invalidation, ParentData};

use crate::key::Key;
use crate::widget::{
    ProxyWidget, RenderObjectWidget, Widget, WidgetChildren, WidgetKind, WidgetRef,
};

/// Lays children out in a row or a column.
#[derive(Debug, Clone)]
pub struct Flex {
    pub key: Option<Key>,
    pub direction: Axis,
    pub main_axis_alignment: MainAxisAlignment,
    pub main_axis_size: MainAxisSize,
    pub cross_axis_alignment: CrossAxisAlignment,
    pub children: Vec<WidgetRef>,
}

impl Flex {
    pub fn new(direction: Axis, children: Vec<WidgetRef>) -> Self {
        Self {
            key: None,
            direction,
            main_axis_alignment: MainAxisAlignment::Start,
            main_axis_size: MainAxisSize::Max,
            cross_axis_alignment: CrossAxisAlignment::Start,
            children,
        }
    }

    pub fn row(children: Vec<WidgetRef>) -> Self {
        Self::new(Axis::Horizontal, children)
    }

    pub fn column(children: Vec<WidgetRef>) -> Self {
        Self::new(Axis::Vertical, children)
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn main_axis_alignment(mut self, alignment: MainAxisAlignment) -> Self {
        self.main_axis_alignment = alignment;
        self
    }

    pub fn main_axis_size(mut self, size: MainAxisSize) -> Self {
        self.main_axis_size = size;
        self
    }

    pub fn cross_axis_alignment(mut self, alignment: CrossAxisAlignment) -> Self {
        self.cross_axis_alignment = alignment;
        self
    }
}

impl Widget for Flex {
    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Render(self)
    }
}

impl RenderObjectWidget for Flex {
    type Render = RenderFlex;

    fn create_render_object(&self) -> RenderFlex {
        let mut render = RenderFlex::new(self.direction);
        self.update_render_object(&mut render);
        render
    }

    fn update_render_object(&self, render: &mut RenderFlex) -> Invalidation {
        render.set_direction(self.direction)
            | render.set_main_axis_alignment(self.main_axis_alignment)
            | render.set_main_axis_size(self.main_axis_size)
            | render.set_cross_axis_alignment(self.cross_axis_alignment)
    }

    fn children(&self) -> WidgetChildren<'_> {
        WidgetChildren::Many(&self.children)
    }
}

/// Gives its child a share of a [`Flex`]'s free space.
///
/// Writes `flex` and `fit` into the parent data of the nearest render object
/// below it; the enclosing flex re-lays out when either changes.
#[derive(Debug, Clone)]
pub struct Flexible {
    pub key: Option<Key>,
    pub flex: u32,
    pub fit: FlexFit,
    pub child: WidgetRef,
}

impl Flexible {
    pub fn new(flex: u32, child: WidgetRef) -> Self {
        Self {
            key: None,
            flex,
            fit: FlexFit::Loose,
            child,
        }
    }

    /// A flexible child that must fill its share.
    pub fn expanded(flex: u32, child: WidgetRef) -> Self {
        Self {
            fit: FlexFit::Tight,
            ..Self::new(flex, child)
        }
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl Widget for Flexible {
    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Proxy(self)
    }
}

impl ProxyWidget for Flexible {
    fn child(&self) -> &WidgetRef {
        &self.child
    }

    fn apply_parent_data(&self, data: &mut ParentData) -> bool {
        if data.flex == self.flex && data.fit == self.fit {
            return false;
        }
        data.flex = self.flex;
        data.fit = self.fit;
        true
    }
}
