//! The render-object contract and the per-node data a parent keeps about its children.

use std::any::Any;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use arbor_geometry::{Point, Size};

use crate::renderer::PaintCx;
use crate::tree::LayoutCx;

/// Object-safe access to the concrete type behind a trait object.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A node that sizes itself from incoming constraints and records paint commands.
///
/// Render objects never hold references to their parent or children. Structure
/// lives in the [`RenderTree`](crate::RenderTree); a render object only sees its
/// children through the [`LayoutCx`] and [`PaintCx`] handed to it.
pub trait RenderObject: AsAny {
    /// Computes this node's size. The returned size must satisfy `cx.constraints()`.
    ///
    /// Children are laid out with [`LayoutCx::layout_child`] and positioned with
    /// [`LayoutCx::position_child`].
    fn perform_layout(&mut self, cx: &mut LayoutCx<'_>) -> Size;

    /// Records this node's paint commands in local coordinates.
    fn perform_paint(&mut self, cx: &mut PaintCx<'_>) {
        cx.paint_children();
    }

    /// True when the size depends on the incoming constraints alone.
    fn sized_by_parent(&self) -> bool {
        false
    }

    fn is_repaint_boundary(&self) -> bool {
        false
    }

    fn always_needs_compositing(&self) -> bool {
        false
    }

    fn hit_test_behavior(&self) -> HitTestBehavior {
        HitTestBehavior::DeferToChild
    }

    fn debug_name(&self) -> &'static str {
        let full = std::any::type_name_of_val(self);
        full.rsplit("::").next().unwrap_or(full)
    }
}

impl fmt::Debug for dyn RenderObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.debug_name())
    }
}

/// How a node takes part in hit testing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HitTestBehavior {
    /// Hit only when a child is hit.
    #[default]
    DeferToChild,
    /// Hit whenever the position is inside the bounds, even if no child is.
    Opaque,
    /// Recorded whenever the position is inside the bounds, but only reports a
    /// hit to the parent when a child is hit.
    Translucent,
}

/// How a flexible child fills the space it is allotted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FlexFit {
    /// The child must fill its allotted main-axis extent.
    Tight,
    /// The child may be smaller than its allotted extent.
    #[default]
    Loose,
}

/// Data a parent stores on each of its children.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ParentData {
    /// Position of the child's origin in the parent's coordinate space.
    pub offset: Point,
    /// Flex factor; zero means the child is not flexible.
    pub flex: u32,
    pub fit: FlexFit,
}

/// Pipeline stages a render-object mutation invalidates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Invalidation(u8);

impl Invalidation {
    pub const NONE: Self = Self(0);
    pub const LAYOUT: Self = Self(1 << 0);
    pub const PAINT: Self = Self(1 << 1);
    pub const COMPOSITING: Self = Self(1 << 2);

    pub const fn empty() -> Self {
        Self::NONE
    }

    /// Returns whether all bits in `other` are present in `self`.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `stage` when `changed` holds, nothing otherwise.
    pub const fn when(changed: bool, stage: Self) -> Self {
        if changed {
            stage
        } else {
            Self::NONE
        }
    }
}

impl Default for Invalidation {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Debug for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invalidation")
            .field("layout", &self.contains(Self::LAYOUT))
            .field("paint", &self.contains(Self::PAINT))
            .field("compositing", &self.contains(Self::COMPOSITING))
            .finish()
    }
}

impl BitOr for Invalidation {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Invalidation {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
