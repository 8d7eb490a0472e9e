use arbor_geometry::{Point, Size};

use crate::object::RenderObject;
use crate::renderer::PaintCx;
use crate::tree::LayoutCx;

/// Root of a pipeline's render tree. Occupies the whole surface it is given.
#[derive(Debug, Default)]
pub struct RenderView;

impl RenderView {
    pub fn new() -> Self {
        Self
    }
}

impl RenderObject for RenderView {
    fn perform_layout(&mut self, cx: &mut LayoutCx<'_>) -> Size {
        let constraints = cx.constraints();
        let Some(child) = cx.first_child() else {
            return constraints.smallest();
        };
        if constraints.is_tight() {
            cx.layout_child(child, constraints, false);
            cx.position_child(child, Point::ZERO);
            constraints.smallest()
        } else {
            let size = cx.layout_child(child, constraints, true);
            cx.position_child(child, Point::ZERO);
            constraints.constrain(size)
        }
    }

    fn perform_paint(&mut self, cx: &mut PaintCx<'_>) {
        cx.paint_children();
    }

    fn is_repaint_boundary(&self) -> bool {
        true
    }
}
