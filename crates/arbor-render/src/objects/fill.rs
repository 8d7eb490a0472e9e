use arbor_geometry::{Color, Size};

use crate::object::{HitTestBehavior, Invalidation, RenderObject};
use crate::renderer::PaintCx;
use crate::tree::LayoutCx;

/// Childless leaf that takes the smallest size it is allowed and paints one color.
///
/// Its size depends on the constraints alone, so it is always its own
/// relayout boundary.
#[derive(Debug)]
pub struct RenderFill {
    color: Color,
}

impl RenderFill {
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

impl RenderObject for RenderFill {
    fn perform_layout(&mut self, cx: &mut LayoutCx<'_>) -> Size {
        cx.constraints().smallest()
    }

    fn perform_paint(&mut self, cx: &mut PaintCx<'_>) {
        cx.fill(self.color);
    }

    fn sized_by_parent(&self) -> bool {
        true
    }

    fn hit_test_behavior(&self) -> HitTestBehavior {
        HitTestBehavior::Opaque
    }
}
