use arbor_geometry::{Constraints, Point, Size};

use crate::object::{Invalidation, RenderObject};
use crate::tree::LayoutCx;

/// Imposes additional constraints on its child, clamped into the incoming ones.
#[derive(Debug)]
pub struct RenderConstrainedBox {
    additional: Constraints,
}

impl RenderConstrainedBox {
    pub fn new(additional: Constraints) -> Self {
        Self { additional }
    }

    pub fn additional_constraints(&self) -> Constraints {
        self.additional
    }

    pub fn set_additional_constraints(&mut self, additional: Constraints) -> Invalidation {
        let changed = self.additional != additional;
        self.additional = additional;
        Invalidation::when(changed, Invalidation::LAYOUT)
    }
}

impl RenderObject for RenderConstrainedBox {
    fn perform_layout(&mut self, cx: &mut LayoutCx<'_>) -> Size {
        let constraints = self.additional.enforce(cx.constraints());
        match cx.first_child() {
            Some(child) => {
                let size = cx.layout_child(child, constraints, true);
                cx.position_child(child, Point::ZERO);
                size
            }
            None => constraints.constrain(Size::ZERO),
        }
    }
}
