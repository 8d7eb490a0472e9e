use arbor_geometry::{Point, Size};

use crate::object::{Invalidation, RenderObject};
use crate::renderer::PaintCx;
use crate::tree::LayoutCx;

/// Paints its child with partial opacity.
///
/// Fully transparent children are skipped and fully opaque ones are painted
/// directly; only intermediate values need a layer.
#[derive(Debug)]
pub struct RenderOpacity {
    opacity: f32,
}

impl RenderOpacity {
    pub fn new(opacity: f32) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) -> Invalidation {
        let opacity = opacity.clamp(0.0, 1.0);
        if self.opacity == opacity {
            return Invalidation::NONE;
        }
        let was_layered = self.always_needs_compositing();
        self.opacity = opacity;
        Invalidation::PAINT
            | Invalidation::when(
                was_layered != self.always_needs_compositing(),
                Invalidation::COMPOSITING,
            )
    }
}

impl RenderObject for RenderOpacity {
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
        if self.opacity <= 0.0 {
            return;
        }
        if self.opacity >= 1.0 {
            cx.paint_children();
            return;
        }
        let alpha = self.opacity;
        cx.with_opacity(alpha, |cx| cx.paint_children());
    }

    fn always_needs_compositing(&self) -> bool {
        self.opacity > 0.0 && self.opacity < 1.0
    }
}
