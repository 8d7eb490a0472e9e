use std::time::Duration;

use arbor_render::FrameCallbacks;

use crate::element::ElementId;
use crate::framework::Framework;

/// Handed to `build` and the state hooks. Identifies the element being built
/// and gives access to the frame clock and next-frame scheduling.
pub struct BuildContext<'a> {
    pub(crate) element: ElementId,
    pub(crate) now: Duration,
    pub(crate) callbacks: &'a mut FrameCallbacks<Framework>,
    pub(crate) build_requests: &'a mut Vec<ElementId>,
}

impl BuildContext<'_> {
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Timestamp of the frame being built.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Runs `callback` at the start of the next frame, before that frame builds.
    pub fn add_next_frame_callback(
        &mut self,
        callback: impl FnOnce(&mut Framework, Duration) + 'static,
    ) {
        self.callbacks.add(callback);
    }

    /// Marks another element dirty. Takes effect once the current build
    /// returns; a deeper element still rebuilds within the same build scope.
    pub fn mark_needs_build(&mut self, element: ElementId) {
        self.build_requests.push(element);
    }
}
