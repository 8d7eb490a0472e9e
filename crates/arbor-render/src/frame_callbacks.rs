//! Double-buffered one-shot callbacks for the next frame.

use std::time::Duration;

pub type FrameCallback<Cx> = Box<dyn FnOnce(&mut Cx, Duration)>;

/// Callbacks registered while a frame's batch runs land in the other buffer
/// and fire on the following frame.
pub struct FrameCallbacks<Cx: ?Sized> {
    pending: Vec<FrameCallback<Cx>>,
    spare: Vec<FrameCallback<Cx>>,
}

impl<Cx: ?Sized> Default for FrameCallbacks<Cx> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            spare: Vec::new(),
        }
    }
}

impl<Cx: ?Sized> FrameCallbacks<Cx> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, callback: impl FnOnce(&mut Cx, Duration) + 'static) {
        self.pending.push(Box::new(callback));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Takes the batch to run this frame, leaving an empty buffer for new registrations.
    pub fn swap(&mut self) -> Vec<FrameCallback<Cx>> {
        let next = std::mem::take(&mut self.spare);
        std::mem::replace(&mut self.pending, next)
    }

    /// Hands a drained batch back so its allocation is reused.
    pub fn recycle(&mut self, mut batch: Vec<FrameCallback<Cx>>) {
        batch.clear();
        if batch.capacity() > self.spare.capacity() {
            self.spare = batch;
        }
    }
}

#[cfg(test)]
#[path = "tests/frame_callbacks_tests.rs"]
mod tests;
