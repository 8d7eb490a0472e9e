//! Axes and the alignment policies used by linear (flex) layouts

use crate::geometry::{Point, Size};

/// Represents the main axis of a flex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Main axis runs left to right, cross axis top to bottom.
    Horizontal,
    /// Main axis runs top to bottom, cross axis left to right.
    Vertical,
}

impl Axis {
    /// Returns the opposite axis.
    #[inline]
    pub fn cross_axis(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Axis::Horizontal)
    }

    /// Extent of `size` along this axis.
    #[inline]
    pub fn main(self, size: Size) -> f32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    /// Extent of `size` across this axis.
    #[inline]
    pub fn cross(self, size: Size) -> f32 {
        self.cross_axis().main(size)
    }

    /// Builds a size from main and cross extents.
    pub fn pack_size(self, main: f32, cross: f32) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }

    /// Builds a point from main and cross offsets.
    pub fn pack_point(self, main: f32, cross: f32) -> Point {
        match self {
            Axis::Horizontal => Point::new(main, cross),
            Axis::Vertical => Point::new(cross, main),
        }
    }
}

/// How children are distributed along the main axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MainAxisAlignment {
    /// Place children consecutively starting from the leading edge.
    #[default]
    Start,
    /// Place children so the last child touches the trailing edge.
    End,
    /// Place children so they are centered as a block.
    Center,
    /// Distribute the remaining space evenly between children.
    SpaceBetween,
    /// Half-size gaps at both ends, full gaps between children.
    SpaceAround,
    /// Equal gaps before, between, and after the children.
    SpaceEvenly,
}

impl MainAxisAlignment {
    /// Writes the leading main-axis offset of every child into `out_positions`.
    pub fn arrange(&self, total_size: f32, sizes: &[f32], out_positions: &mut [f32]) {
        debug_assert_eq!(sizes.len(), out_positions.len());
        if sizes.is_empty() {
            return;
        }

        let remaining = (total_size - sizes.iter().copied().sum::<f32>()).max(0.0);
        let count = sizes.len() as f32;
        let (start, gap) = match *self {
            MainAxisAlignment::Start => (0.0, 0.0),
            MainAxisAlignment::End => (remaining, 0.0),
            MainAxisAlignment::Center => (remaining / 2.0, 0.0),
            MainAxisAlignment::SpaceBetween if sizes.len() > 1 => {
                (0.0, remaining / (count - 1.0))
            }
            MainAxisAlignment::SpaceBetween => (0.0, 0.0),
            MainAxisAlignment::SpaceAround => {
                let gap = remaining / count;
                (gap / 2.0, gap)
            }
            MainAxisAlignment::SpaceEvenly => {
                let gap = remaining / (count + 1.0);
                (gap, gap)
            }
        };

        let mut cursor = start;
        for (size, position) in sizes.iter().zip(out_positions.iter_mut()) {
            *position = cursor;
            cursor += size + gap;
        }
    }
}

/// How much main-axis space a flex container occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MainAxisSize {
    /// Shrink-wrap the children.
    Min,
    /// Take all the incoming main-axis space when it is bounded.
    #[default]
    Max,
}

/// How children are placed across the main axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CrossAxisAlignment {
    #[default]
    Start,
    End,
    Center,
    /// Force children to fill the cross axis.
    Stretch,
}

impl CrossAxisAlignment {
    /// Cross-axis offset of a child of extent `child` inside `available`.
    pub fn align(&self, available: f32, child: f32) -> f32 {
        match self {
            CrossAxisAlignment::Start | CrossAxisAlignment::Stretch => 0.0,
            CrossAxisAlignment::Center => ((available - child) / 2.0).max(0.0),
            CrossAxisAlignment::End => (available - child).max(0.0),
        }
    }
}

#[cfg(test)]
#[path = "tests/axis_tests.rs"]
mod tests;
