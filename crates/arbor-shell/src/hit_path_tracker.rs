//! Pointer capture.
//!
//! The render objects hit on `Down` receive the following `Move`, `Up` and
//! `Cancel` events even when the pointer leaves them. Only their ids are
//! kept; local positions are recomputed from the current layout on every
//! dispatch, so a target that moved since `Down` still sees coordinates in
//! its own space.

use arbor_geometry::Point;
use arbor_render::collections::map::HashMap;
use arbor_render::{RenderId, RenderTree};

/// Identifies one pointer. Only the primary pointer is delivered today.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PointerId(pub u32);

impl PointerId {
    pub const PRIMARY: PointerId = PointerId(0);
}

/// Render objects hit on `Down`, front to back, per pointer.
#[derive(Default)]
pub(crate) struct HitPathTracker {
    paths: HashMap<PointerId, Vec<RenderId>>,
}

impl HitPathTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_hit_path(&mut self, pointer: PointerId, targets: Vec<RenderId>) {
        self.paths.insert(pointer, targets);
    }

    pub(crate) fn has_path(&self, pointer: PointerId) -> bool {
        self.paths.contains_key(&pointer)
    }

    pub(crate) fn remove_path(&mut self, pointer: PointerId) -> Option<Vec<RenderId>> {
        self.paths.remove(&pointer)
    }

    pub(crate) fn clear(&mut self) {
        self.paths.clear();
    }

    /// Targets still attached to `tree`, each with `position` mapped into its
    /// current local space.
    pub(crate) fn resolve(
        &self,
        pointer: PointerId,
        tree: &RenderTree,
        position: Point,
    ) -> Vec<(RenderId, Point)> {
        let Some(targets) = self.paths.get(&pointer) else {
            return Vec::new();
        };
        targets
            .iter()
            .filter_map(|target| {
                local_position(tree, *target, position).map(|local| (*target, local))
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Maps a root-space `position` into `id`'s coordinate space, or `None` when
/// `id` is gone or detached.
pub(crate) fn local_position(tree: &RenderTree, id: RenderId, position: Point) -> Option<Point> {
    if !tree.is_attached(id) {
        return None;
    }
    let mut origin = Point::ZERO;
    let mut current = Some(id);
    while let Some(node) = current {
        origin += tree.offset(node);
        current = tree.parent(node);
    }
    Some(position - origin)
}

#[cfg(test)]
#[path = "tests/hit_path_tracker_tests.rs"]
mod tests;
