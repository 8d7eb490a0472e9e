use arbor_geometry::{Axis, Constraints, CrossAxisAlignment, MainAxisAlignment, MainAxisSize, Size};
use log::warn;
use smallvec::SmallVec;

use crate::object::{FlexFit, Invalidation, RenderObject};
use crate::tree::{LayoutCx, RenderId};

const OVERFLOW_TOLERANCE: f32 = 1e-3;

/// Lays children out in a line, sharing leftover main-axis space between
/// children with a non-zero flex factor.
///
/// Layout runs in two passes:
/// 1. Inflexible children are measured with an unbounded main axis.
/// 2. The remaining space is split in proportion to the flex factors. A child
///    with [`FlexFit::Tight`] must fill its share; a loose one may be smaller.
///
/// When the main axis is unbounded, flex factors are ignored and every child
/// is measured like an inflexible one.
#[derive(Debug)]
pub struct RenderFlex {
    direction: Axis,
    main_axis_alignment: MainAxisAlignment,
    main_axis_size: MainAxisSize,
    cross_axis_alignment: CrossAxisAlignment,
}

impl RenderFlex {
    pub fn new(direction: Axis) -> Self {
        Self {
            direction,
            main_axis_alignment: MainAxisAlignment::Start,
            main_axis_size: MainAxisSize::Max,
            cross_axis_alignment: CrossAxisAlignment::Start,
        }
    }

    pub fn direction(&self) -> Axis {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Axis) -> Invalidation {
        let changed = self.direction != direction;
        self.direction = direction;
        Invalidation::when(changed, Invalidation::LAYOUT)
    }

    pub fn set_main_axis_alignment(&mut self, alignment: MainAxisAlignment) -> Invalidation {
        let changed = self.main_axis_alignment != alignment;
        self.main_axis_alignment = alignment;
        Invalidation::when(changed, Invalidation::LAYOUT)
    }

    pub fn set_main_axis_size(&mut self, size: MainAxisSize) -> Invalidation {
        let changed = self.main_axis_size != size;
        self.main_axis_size = size;
        Invalidation::when(changed, Invalidation::LAYOUT)
    }

    pub fn set_cross_axis_alignment(&mut self, alignment: CrossAxisAlignment) -> Invalidation {
        let changed = self.cross_axis_alignment != alignment;
        self.cross_axis_alignment = alignment;
        Invalidation::when(changed, Invalidation::LAYOUT)
    }

    fn pack(&self, min_main: f32, max_main: f32, min_cross: f32, max_cross: f32) -> Constraints {
        match self.direction {
            Axis::Horizontal => Constraints::new(min_main, max_main, min_cross, max_cross),
            Axis::Vertical => Constraints::new(min_cross, max_cross, min_main, max_main),
        }
    }

    fn cross_bounds(&self, constraints: Constraints) -> (f32, f32) {
        match self.direction {
            Axis::Horizontal => (constraints.min_height, constraints.max_height),
            Axis::Vertical => (constraints.min_width, constraints.max_width),
        }
    }

    fn main_bounds(&self, constraints: Constraints) -> (f32, f32) {
        match self.direction {
            Axis::Horizontal => (constraints.min_width, constraints.max_width),
            Axis::Vertical => (constraints.min_height, constraints.max_height),
        }
    }

    fn child_cross_bounds(&self, max_cross: f32) -> (f32, f32) {
        if self.cross_axis_alignment == CrossAxisAlignment::Stretch && max_cross.is_finite() {
            (max_cross, max_cross)
        } else {
            (0.0, max_cross)
        }
    }
}

impl RenderObject for RenderFlex {
    fn perform_layout(&mut self, cx: &mut LayoutCx<'_>) -> Size {
        let constraints = cx.constraints();
        let axis = self.direction;
        let (min_main, max_main) = self.main_bounds(constraints);
        let (min_cross, max_cross) = self.cross_bounds(constraints);
        let (child_min_cross, child_max_cross) = self.child_cross_bounds(max_cross);
        let main_bounded = max_main.is_finite();

        let children = cx.children();
        let mut sizes: SmallVec<[Size; 8]> = SmallVec::from_elem(Size::ZERO, children.len());
        let mut flexible: SmallVec<[(usize, RenderId); 8]> = SmallVec::new();
        let mut total_flex = 0u32;
        let mut allocated = 0.0f32;

        let inflexible = self.pack(0.0, f32::INFINITY, child_min_cross, child_max_cross);
        for (index, child) in children.iter().copied().enumerate() {
            let flex = cx.parent_data(child).flex;
            if flex > 0 && main_bounded {
                total_flex += flex;
                flexible.push((index, child));
                continue;
            }
            let size = cx.layout_child(child, inflexible, true);
            allocated += axis.main(size);
            sizes[index] = size;
        }

        if !flexible.is_empty() {
            let free = (max_main - allocated).max(0.0);
            let space_per_flex = free / total_flex as f32;
            for (index, child) in flexible {
                let data = cx.parent_data(child);
                let extent = space_per_flex * data.flex as f32;
                let min_extent = match data.fit {
                    FlexFit::Tight => extent,
                    FlexFit::Loose => 0.0,
                };
                let child_constraints =
                    self.pack(min_extent, extent, child_min_cross, child_max_cross);
                let size = cx.layout_child(child, child_constraints, true);
                allocated += axis.main(size);
                sizes[index] = size;
            }
        }

        let ideal_main = if self.main_axis_size == MainAxisSize::Max && main_bounded {
            max_main
        } else {
            allocated
        };
        let main = ideal_main.clamp(min_main, max_main);
        let widest_cross = sizes.iter().map(|size| axis.cross(*size)).fold(0.0, f32::max);
        let stretch = self.cross_axis_alignment == CrossAxisAlignment::Stretch;
        let cross = if stretch && max_cross.is_finite() {
            max_cross
        } else {
            widest_cross.clamp(min_cross, max_cross)
        };
        let overflow = allocated - main;
        if overflow > OVERFLOW_TOLERANCE {
            warn!(
                "{} overflowed its main axis by {overflow} ({} children)",
                self.debug_name(),
                children.len()
            );
        }

        let main_sizes: SmallVec<[f32; 8]> = sizes.iter().map(|size| axis.main(*size)).collect();
        let mut positions: SmallVec<[f32; 8]> = SmallVec::from_elem(0.0, children.len());
        let alignment = if overflow > OVERFLOW_TOLERANCE {
            MainAxisAlignment::Start
        } else {
            self.main_axis_alignment
        };
        alignment.arrange(main, &main_sizes, &mut positions);

        for ((child, size), position) in children.iter().zip(&sizes).zip(&positions) {
            let cross_offset = self.cross_axis_alignment.align(cross, axis.cross(*size));
            cx.position_child(*child, axis.pack_point(*position, cross_offset));
        }

        axis.pack_size(main, cross)
    }
}
