use arbor_geometry::{Point, Size};

use crate::object::RenderObject;
use crate::renderer::PaintCx;
use crate::tree::LayoutCx;

/// Clips its child's painting to its own bounds.
#[derive(Debug, Default)]
pub struct RenderClipRect;

impl RenderClipRect {
    pub fn new() -> Self {
        Self
    }
}

impl RenderObject for RenderClipRect {
    fn perform_layout(&mut self, cx: &mut LayoutCx<'_>) -> Size {
        let constraints = cx.constraints();
        match cx.first_child() {
            Some(child) => {
                let size = cx.layout_child(child, constraints, true);
                cx.position_child(child, Point::ZERO);
                size
            }
            None => constraints.smallest(),
        }
    }

    fn perform_paint(&mut self, cx: &mut PaintCx<'_>) {
        let bounds = cx.bounds();
        cx.with_clip(bounds, |cx| cx.paint_children());
    }
}
