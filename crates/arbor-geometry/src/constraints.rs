//! Box constraints passed from parent to child during layout

use std::fmt;

use crate::geometry::{EdgeInsets, Size};

/// Minimum and maximum extents a child may take on each axis.
///
/// A constraint set is *normalized* when `0 <= min <= max` holds on both
/// axes and no bound is NaN. `max` may be infinite; `min` may not.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraints {
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Constraints {
    pub const fn new(min_width: f32, max_width: f32, min_height: f32, max_height: f32) -> Self {
        Self {
            min_width,
            max_width,
            min_height,
            max_height,
        }
    }

    /// Creates constraints with exact width and height.
    pub fn tight(width: f32, height: f32) -> Self {
        Self {
            min_width: width,
            max_width: width,
            min_height: height,
            max_height: height,
        }
    }

    /// Creates constraints that only admit `size`.
    pub fn tight_for(size: Size) -> Self {
        Self::tight(size.width, size.height)
    }

    /// Creates constraints with loose bounds (min = 0, max = given values).
    pub fn loose(max_width: f32, max_height: f32) -> Self {
        Self {
            min_width: 0.0,
            max_width,
            min_height: 0.0,
            max_height,
        }
    }

    /// Creates unbounded constraints with zero minimums.
    pub fn unbounded() -> Self {
        Self::loose(f32::INFINITY, f32::INFINITY)
    }

    /// Tight on every axis for which a value is given, unconstrained otherwise.
    pub fn tight_or_unbounded(width: Option<f32>, height: Option<f32>) -> Self {
        let (min_width, max_width) = match width {
            Some(w) => (w, w),
            None => (0.0, f32::INFINITY),
        };
        let (min_height, max_height) = match height {
            Some(h) => (h, h),
            None => (0.0, f32::INFINITY),
        };
        Self {
            min_width,
            max_width,
            min_height,
            max_height,
        }
    }

    pub fn min(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    pub fn max(&self) -> Size {
        Size::new(self.max_width, self.max_height)
    }

    /// Returns true when both axes satisfy `0 <= min <= max` with no NaN bound.
    pub fn is_normalized(&self) -> bool {
        let axis = |min: f32, max: f32| {
            !max.is_nan() && min.is_finite() && min >= 0.0 && min <= max
        };
        axis(self.min_width, self.max_width) && axis(self.min_height, self.max_height)
    }

    /// Returns true if these constraints have a single size that satisfies them.
    pub fn is_tight(&self) -> bool {
        self.has_tight_width() && self.has_tight_height()
    }

    /// Returns true if all bounds are finite.
    pub fn is_bounded(&self) -> bool {
        self.max_width.is_finite() && self.max_height.is_finite()
    }

    #[inline]
    pub fn has_bounded_width(&self) -> bool {
        self.max_width.is_finite()
    }

    #[inline]
    pub fn has_bounded_height(&self) -> bool {
        self.max_height.is_finite()
    }

    #[inline]
    pub fn has_tight_width(&self) -> bool {
        self.min_width == self.max_width
    }

    #[inline]
    pub fn has_tight_height(&self) -> bool {
        self.min_height == self.max_height
    }

    /// Returns true if `size` satisfies these constraints on both axes.
    pub fn contains(&self, size: Size) -> bool {
        size.width >= self.min_width
            && size.width <= self.max_width
            && size.height >= self.min_height
            && size.height <= self.max_height
    }

    /// Clamps `size` into these constraints.
    pub fn constrain(&self, size: Size) -> Size {
        Size::new(
            size.width.clamp(self.min_width, self.max_width),
            size.height.clamp(self.min_height, self.max_height),
        )
    }

    /// The largest admissible size, falling back to the minimum on unbounded axes.
    pub fn biggest(&self) -> Size {
        let width = if self.has_bounded_width() {
            self.max_width
        } else {
            self.min_width
        };
        let height = if self.has_bounded_height() {
            self.max_height
        } else {
            self.min_height
        };
        Size::new(width, height)
    }

    pub fn smallest(&self) -> Size {
        self.min()
    }

    /// Clamps every bound of `self` into `outer`, producing constraints that
    /// respect both.
    pub fn enforce(&self, outer: Constraints) -> Constraints {
        Constraints {
            min_width: self.min_width.clamp(outer.min_width, outer.max_width),
            max_width: self.max_width.clamp(outer.min_width, outer.max_width),
            min_height: self.min_height.clamp(outer.min_height, outer.max_height),
            max_height: self.max_height.clamp(outer.min_height, outer.max_height),
        }
    }

    /// Shrinks the constraints by the given insets. Minimums never drop
    /// below zero and maximums never drop below the new minimums.
    pub fn deflate(&self, insets: EdgeInsets) -> Constraints {
        let horizontal = insets.horizontal_sum();
        let vertical = insets.vertical_sum();
        let min_width = (self.min_width - horizontal).max(0.0);
        let min_height = (self.min_height - vertical).max(0.0);
        Constraints {
            min_width,
            max_width: (self.max_width - horizontal).max(min_width),
            min_height,
            max_height: (self.max_height - vertical).max(min_height),
        }
    }

    /// Creates new constraints with loosened minimums (min = 0).
    pub fn loosen(self) -> Self {
        Self {
            min_width: 0.0,
            min_height: 0.0,
            ..self
        }
    }

    /// Tightens the width to `width` clamped into the current width range.
    pub fn tighten_width(self, width: f32) -> Self {
        let width = width.clamp(self.min_width, self.max_width);
        Self {
            min_width: width,
            max_width: width,
            ..self
        }
    }

    /// Tightens the height to `height` clamped into the current height range.
    pub fn tighten_height(self, height: f32) -> Self {
        let height = height.clamp(self.min_height, self.max_height);
        Self {
            min_height: height,
            max_height: height,
            ..self
        }
    }

    pub fn copy_with_width(self, min_width: f32, max_width: f32) -> Self {
        Self {
            min_width,
            max_width,
            ..self
        }
    }

    pub fn copy_with_height(self, min_height: f32, max_height: f32) -> Self {
        Self {
            min_height,
            max_height,
            ..self
        }
    }
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Constraints(w: {}..={}, h: {}..={})",
            self.min_width, self.max_width, self.min_height, self.max_height
        )
    }
}

#[cfg(test)]
#[path = "tests/constraints_tests.rs"]
mod tests;
