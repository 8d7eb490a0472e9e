use arbor_geometry::{Color, Constraints, EdgeInsets, Size};
use arbor_render::objects::{
    RenderClipRect, RenderColoredBox, RenderConstrainedBox, RenderFill, RenderOpacity,
    RenderPadding,
};
use arbor_render::Invalidation;

use crate::key::Key;
use crate::widget::{RenderObjectWidget, Widget, WidgetChildren, WidgetKind, WidgetRef};

/// Implements [`Widget`] for a render-object widget with `key` and
/// `child` fields, plus the `with_key`/`with_child` builders.
macro_rules! single_child_render_widget {
    ($name:ident) => {
        impl $name {
            pub fn with_key(mut self, key: impl Into<Key>) -> Self {
                self.key = Some(key.into());
                self
            }

            pub fn with_child(mut self, child: WidgetRef) -> Self {
                self.child = Some(child);
                self
            }
        }

        impl Widget for $name {
            fn key(&self) -> Option<&Key> {
                self.key.as_ref()
            }

            fn kind(&self) -> WidgetKind<'_> {
                WidgetKind::Render(self)
            }
        }
    };
}

/// Paints a color behind its child. Without a child it takes the smallest
/// size its constraints allow.
#[derive(Debug, Clone)]
pub struct ColoredBox {
    pub key: Option<Key>,
    pub color: Color,
    pub child: Option<WidgetRef>,
}

impl ColoredBox {
    pub fn new(color: Color) -> Self {
        Self {
            key: None,
            color,
            child: None,
        }
    }
}

single_child_render_widget!(ColoredBox);

impl RenderObjectWidget for ColoredBox {
    type Render = RenderColoredBox;

    fn create_render_object(&self) -> RenderColoredBox {
        RenderColoredBox::new(self.color)
    }

    fn update_render_object(&self, render: &mut RenderColoredBox) -> Invalidation {
        render.set_color(self.color)
    }

    fn children(&self) -> WidgetChildren<'_> {
        WidgetChildren::Single(self.child.as_ref())
    }
}

/// Fills all the space it is given.
#[derive(Debug, Clone)]
pub struct Fill {
    pub key: Option<Key>,
    pub color: Color,
}

impl Fill {
    pub fn new(color: Color) -> Self {
        Self { key: None, color }
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl Widget for Fill {
    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Render(self)
    }
}

impl RenderObjectWidget for Fill {
    type Render = RenderFill;

    fn create_render_object(&self) -> RenderFill {
        RenderFill::new(self.color)
    }

    fn update_render_object(&self, render: &mut RenderFill) -> Invalidation {
        render.set_color(self.color)
    }
}

#[derive(Debug, Clone)]
pub struct Padding {
    pub key: Option<Key>,
    pub padding: EdgeInsets,
    pub child: Option<WidgetRef>,
}

impl Padding {
    pub fn new(padding: EdgeInsets) -> Self {
        Self {
            key: None,
            padding,
            child: None,
        }
    }
}

single_child_render_widget!(Padding);

impl RenderObjectWidget for Padding {
    type Render = RenderPadding;

    fn create_render_object(&self) -> RenderPadding {
        RenderPadding::new(self.padding)
    }

    fn update_render_object(&self, render: &mut RenderPadding) -> Invalidation {
        render.set_padding(self.padding)
    }

    fn children(&self) -> WidgetChildren<'_> {
        WidgetChildren::Single(self.child.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct ConstrainedBox {
    pub key: Option<Key>,
    pub constraints: Constraints,
    pub child: Option<WidgetRef>,
}

impl ConstrainedBox {
    pub fn new(constraints: Constraints) -> Self {
        Self {
            key: None,
            constraints,
            child: None,
        }
    }
}

single_child_render_widget!(ConstrainedBox);

impl RenderObjectWidget for ConstrainedBox {
    type Render = RenderConstrainedBox;

    fn create_render_object(&self) -> RenderConstrainedBox {
        RenderConstrainedBox::new(self.constraints)
    }

    fn update_render_object(&self, render: &mut RenderConstrainedBox) -> Invalidation {
        render.set_additional_constraints(self.constraints)
    }

    fn children(&self) -> WidgetChildren<'_> {
        WidgetChildren::Single(self.child.as_ref())
    }
}

/// Forces a width, a height, or both on its child.
#[derive(Debug, Clone)]
pub struct SizedBox {
    pub key: Option<Key>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub child: Option<WidgetRef>,
}

impl SizedBox {
    pub fn new(width: Option<f32>, height: Option<f32>) -> Self {
        Self {
            key: None,
            width,
            height,
            child: None,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(Some(size.width), Some(size.height))
    }

    fn constraints(&self) -> Constraints {
        Constraints::tight_or_unbounded(self.width, self.height)
    }
}

single_child_render_widget!(SizedBox);

impl RenderObjectWidget for SizedBox {
    type Render = RenderConstrainedBox;

    fn create_render_object(&self) -> RenderConstrainedBox {
        RenderConstrainedBox::new(self.constraints())
    }

    fn update_render_object(&self, render: &mut RenderConstrainedBox) -> Invalidation {
        render.set_additional_constraints(self.constraints())
    }

    fn children(&self) -> WidgetChildren<'_> {
        WidgetChildren::Single(self.child.as_ref())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClipRect {
    pub key: Option<Key>,
    pub child: Option<WidgetRef>,
}

impl ClipRect {
    pub fn new() -> Self {
        Self::default()
    }
}

single_child_render_widget!(ClipRect);

impl RenderObjectWidget for ClipRect {
    type Render = RenderClipRect;

    fn create_render_object(&self) -> RenderClipRect {
        RenderClipRect::new()
    }

    fn update_render_object(&self, _render: &mut RenderClipRect) -> Invalidation {
        Invalidation::NONE
    }

    fn children(&self) -> WidgetChildren<'_> {
        WidgetChildren::Single(self.child.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct Opacity {
    pub key: Option<Key>,
    pub opacity: f32,
    pub child: Option<WidgetRef>,
}

impl Opacity {
    pub fn new(opacity: f32) -> Self {
        Self {
            key: None,
            opacity,
            child: None,
        }
    }
}

single_child_render_widget!(Opacity);

impl RenderObjectWidget for Opacity {
    type Render = RenderOpacity;

    fn create_render_object(&self) -> RenderOpacity {
        RenderOpacity::new(self.opacity)
    }

    fn update_render_object(&self, render: &mut RenderOpacity) -> Invalidation {
        render.set_opacity(self.opacity)
    }

    fn children(&self) -> WidgetChildren<'_> {
        WidgetChildren::Single(self.child.as_ref())
    }
}
