use arbor_geometry::{EdgeInsets, Size};

use crate::object::{Invalidation, RenderObject};
use crate::tree::LayoutCx;

/// Insets its child by fixed amounts on each edge.
#[derive(Debug)]
pub struct RenderPadding {
    padding: EdgeInsets,
}

impl RenderPadding {
    pub fn new(padding: EdgeInsets) -> Self {
        Self { padding }
    }

    pub fn padding(&self) -> EdgeInsets {
        self.padding
    }

    pub fn set_padding(&mut self, padding: EdgeInsets) -> Invalidation {
        let changed = self.padding != padding;
        self.padding = padding;
        Invalidation::when(changed, Invalidation::LAYOUT)
    }
}

impl RenderObject for RenderPadding {
    fn perform_layout(&mut self, cx: &mut LayoutCx<'_>) -> Size {
        let constraints = cx.constraints();
        let Some(child) = cx.first_child() else {
            return constraints.constrain(Size::ZERO.expand(self.padding));
        };
        let child_size = cx.layout_child(child, constraints.deflate(self.padding), true);
        cx.position_child(child, self.padding.top_left());
        constraints.constrain(child_size.expand(self.padding))
    }
}
