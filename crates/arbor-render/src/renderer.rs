//! Per-node paint cache.
//!
//! Every render object records into its own display list in local
//! coordinates. Parents compose children by invoking their cached handles, so a
//! clean subtree is "repainted" by handing back the handle it already has.

use arbor_geometry::{Color, Point, Rect, Size};
use log::trace;

use crate::collections::map::HashMap;
use crate::display_list::{DisplayListBuilder, DisplayListHandle, DrawCommand};
use crate::tree::{RenderChildren, RenderId, RenderTree};

#[derive(Default)]
pub struct Renderer {
    cache: HashMap<RenderId, DisplayListHandle>,
    recordings: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the display list for `id`, re-recording it only when the node
    /// needs paint or has never been recorded.
    pub fn paint(&mut self, tree: &mut RenderTree, id: RenderId) -> DisplayListHandle {
        let node = tree.node_mut(id);
        if !node.needs_paint() {
            if let Some(cached) = self.cache.get(&id) {
                return cached.clone();
            }
        }
        node.clear_needs_paint();
        let size = node.size();

        let mut object = tree.take_object(id);
        trace!("recording {} ({id:?})", object.debug_name());
        let list = {
            let mut cx = PaintCx {
                tree: &mut *tree,
                renderer: &mut *self,
                id,
                size,
                builder: DisplayListBuilder::new(),
            };
            object.perform_paint(&mut cx);
            cx.builder.finish()
        };
        tree.restore_object(id, object);

        self.recordings += 1;
        self.cache.insert(id, list.clone());
        list
    }

    pub fn cached(&self, id: RenderId) -> Option<&DisplayListHandle> {
        self.cache.get(&id)
    }

    /// Drops the cached list of a disposed node.
    pub fn evict(&mut self, id: RenderId) {
        self.cache.remove(&id);
    }

    /// Number of recordings made so far.
    pub fn recordings(&self) -> u64 {
        self.recordings
    }
}

/// Recording scope handed to [`RenderObject::perform_paint`](crate::RenderObject::perform_paint).
pub struct PaintCx<'a> {
    tree: &'a mut RenderTree,
    renderer: &'a mut Renderer,
    id: RenderId,
    size: Size,
    builder: DisplayListBuilder,
}

impl PaintCx<'_> {
    pub fn id(&self) -> RenderId {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size)
    }

    pub fn children(&self) -> RenderChildren {
        self.tree.children(self.id)
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.builder.fill_rect(rect, color);
    }

    pub fn fill(&mut self, color: Color) {
        self.builder.fill(color);
    }

    /// Paints `child` at the offset its parent assigned during layout.
    pub fn paint_child(&mut self, child: RenderId) {
        let offset = self.tree.offset(child);
        let list = self.renderer.paint(self.tree, child);
        self.builder.invoke_at(offset, list);
    }

    pub fn paint_children(&mut self) {
        for child in self.children() {
            self.paint_child(child);
        }
    }

    pub fn with_translation(&mut self, by: Point, f: impl FnOnce(&mut Self)) {
        self.builder.push(DrawCommand::Save);
        self.builder.push(DrawCommand::Translate(by));
        f(self);
        self.builder.push(DrawCommand::Restore);
    }

    pub fn with_clip(&mut self, rect: Rect, f: impl FnOnce(&mut Self)) {
        self.builder.push(DrawCommand::Save);
        self.builder.push(DrawCommand::ClipRect(rect));
        f(self);
        self.builder.push(DrawCommand::Restore);
    }

    pub fn with_opacity(&mut self, alpha: f32, f: impl FnOnce(&mut Self)) {
        self.builder.push(DrawCommand::SaveLayer { alpha });
        f(self);
        self.builder.push(DrawCommand::Restore);
    }
}

#[cfg(test)]
#[path = "tests/renderer_tests.rs"]
mod tests;
