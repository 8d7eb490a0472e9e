//! Pure math/data for layout and painting in Arbor
//!
//! Points, sizes, rectangles, insets, colors, and the box constraints that
//! flow down the render tree during layout.

mod axis;
mod color;
mod constraints;
mod geometry;

pub use axis::*;
pub use color::*;
pub use constraints::*;
pub use geometry::*;

pub mod prelude {
    pub use crate::axis::{Axis, CrossAxisAlignment, MainAxisAlignment, MainAxisSize};
    pub use crate::color::Color;
    pub use crate::constraints::Constraints;
    pub use crate::geometry::{EdgeInsets, Point, Rect, Size};
}
