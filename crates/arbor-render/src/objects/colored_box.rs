use arbor_geometry::{Color, Point, Size};

use crate::object::{Invalidation, RenderObject};
use crate::renderer::PaintCx;
use crate::tree::LayoutCx;

/// Fills its bounds with a color, then paints its child on top.
#[derive(Debug)]
pub struct RenderColoredBox {
    color: Color,
}

impl RenderColoredBox {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) -> Invalidation {
        let changed = self.color != color;
        self.color = color;
        Invalidation::when(changed, Invalidation::PAINT)
    }
}

impl RenderObject for RenderColoredBox {
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
        if !self.color.is_transparent() {
            cx.fill_rect(cx.bounds(), self.color);
        }
        cx.paint_children();
    }
}
