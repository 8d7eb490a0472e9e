//! Pipeline owner: drives layout, compositing bits, and paint for one render tree.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use arbor_geometry::{Constraints, Point};
use log::debug;

use crate::display_list::DisplayListHandle;
use crate::hit_test::HitTestResult;
use crate::object::RenderObject;
use crate::renderer::Renderer;
use crate::tree::{RenderId, RenderTree};

static NEXT_PIPELINE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`PipelineOwner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineId(u64);

impl PipelineId {
    fn next() -> Self {
        Self(NEXT_PIPELINE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipeline#{}", self.0)
    }
}

/// Counts of work done by the most recent flushes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub layout_passes: usize,
    pub boundaries_laid_out: usize,
    pub paint_roots: usize,
}

/// Owns one render tree, its paint cache, and any adopted child pipelines.
pub struct PipelineOwner {
    id: PipelineId,
    tree: RenderTree,
    renderer: Renderer,
    children: Vec<PipelineOwner>,
    last_paint: Option<DisplayListHandle>,
    layout_back: Vec<RenderId>,
    stats: FlushStats,
}

impl Default for PipelineOwner {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineOwner {
    pub fn new() -> Self {
        Self {
            id: PipelineId::next(),
            tree: RenderTree::new(),
            renderer: Renderer::new(),
            children: Vec::new(),
            last_paint: None,
            layout_back: Vec::new(),
            stats: FlushStats::default(),
        }
    }

    pub fn id(&self) -> PipelineId {
        self.id
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut RenderTree {
        &mut self.tree
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    /// Adds a detached render object to this pipeline's tree.
    pub fn create(&mut self, object: Box<dyn RenderObject>) -> RenderId {
        self.tree.insert_boxed(object)
    }

    /// Removes a render object from the tree and drops its cached paint.
    pub fn dispose(&mut self, id: RenderId) {
        self.renderer.evict(id);
        self.tree.remove(id);
    }

    pub fn root_node(&self) -> Option<RenderId> {
        self.tree.root()
    }

    pub fn set_root_node(&mut self, root: Option<RenderId>) {
        self.tree.set_root(root);
    }

    pub fn set_root_constraints(&mut self, constraints: Constraints) {
        self.tree.set_root_constraints(constraints);
    }

    /// Installs the hook fired when this pipeline or any adopted child needs a frame.
    pub fn set_on_need_visual_update(&mut self, hook: Option<Rc<dyn Fn()>>) {
        for child in &mut self.children {
            child.set_on_need_visual_update(hook.clone());
        }
        self.tree.set_on_need_visual_update(hook);
    }

    pub fn request_visual_update(&mut self) {
        self.tree.request_visual_update();
    }

    /// True when this pipeline or a descendant pipeline has pending work.
    pub fn needs_visual_update(&self) -> bool {
        self.tree.visual_update_requested()
            || self.children.iter().any(PipelineOwner::needs_visual_update)
    }

    /// Adopts `child` so that flushes on `self` also flush it.
    pub fn adopt_child(&mut self, mut child: PipelineOwner) -> PipelineId {
        let id = child.id;
        debug!("{} adopts {}", self.id, id);
        child.set_on_need_visual_update(self.tree.visual_update_hook());
        if child.tree.visual_update_requested() {
            self.tree.request_visual_update();
        }
        self.children.push(child);
        id
    }

    /// Detaches a directly adopted child pipeline.
    pub fn drop_child(&mut self, id: PipelineId) -> Option<PipelineOwner> {
        let index = self.children.iter().position(|child| child.id == id)?;
        let mut child = self.children.remove(index);
        child.set_on_need_visual_update(None);
        Some(child)
    }

    pub fn children(&self) -> &[PipelineOwner] {
        &self.children
    }

    /// Finds this pipeline or a descendant by id.
    pub fn find(&self, id: PipelineId) -> Option<&PipelineOwner> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: PipelineId) -> Option<&mut PipelineOwner> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Lays out every queued relayout boundary, shallowest first, then flushes
    /// adopted pipelines.
    pub fn flush_layout(&mut self) {
        let mut passes = 0;
        let mut laid_out = 0;
        loop {
            let mut dirty = std::mem::replace(
                &mut self.tree.nodes_needing_layout,
                std::mem::take(&mut self.layout_back),
            );
            if dirty.is_empty() {
                self.layout_back = dirty;
                break;
            }
            passes += 1;
            let tree = &self.tree;
            dirty.retain(|id| tree.contains(*id));
            dirty.sort_by_key(|id| tree.depth(*id));

            let mut index = 0;
            while index < dirty.len() {
                if self.tree.should_merge_dirty_nodes {
                    self.tree.should_merge_dirty_nodes = false;
                    if !self.tree.nodes_needing_layout.is_empty() {
                        // Hand the unprocessed tail back so it is re-sorted
                        // together with the newly dirtied nodes.
                        self.tree.nodes_needing_layout.extend(dirty.drain(index..));
                        break;
                    }
                }
                let id = dirty[index];
                if self.tree.needs_layout(id) && self.tree.is_attached(id) {
                    self.tree.layout_without_resize(id);
                    laid_out += 1;
                }
                index += 1;
            }
            self.tree.should_merge_dirty_nodes = false;
            dirty.clear();
            self.layout_back = dirty;
        }
        self.stats.layout_passes = passes;
        self.stats.boundaries_laid_out = laid_out;
        if laid_out > 0 {
            debug!("{}: laid out {laid_out} boundaries in {passes} passes", self.id);
        }

        for child in &mut self.children {
            child.flush_layout();
        }
    }

    /// Recomputes compositing flags for queued nodes, shallowest first.
    pub fn flush_compositing_bits(&mut self) {
        let mut dirty = std::mem::take(&mut self.tree.nodes_needing_compositing_bits_update);
        let tree = &self.tree;
        dirty.retain(|id| tree.contains(*id));
        dirty.sort_by_key(|id| tree.depth(*id));
        for id in dirty {
            if self.tree.is_attached(id) {
                self.tree.update_compositing_bits(id);
            }
        }

        for child in &mut self.children {
            child.flush_compositing_bits();
        }
    }

    /// Re-records dirty nodes deepest first, then the root. Returns the root's
    /// display list.
    pub fn flush_paint(&mut self) -> Option<DisplayListHandle> {
        let mut dirty = std::mem::take(&mut self.tree.nodes_needing_paint);
        let tree = &self.tree;
        dirty.retain(|id| tree.contains(*id));
        dirty.sort_by_key(|id| std::cmp::Reverse(tree.depth(*id)));

        let mut painted = 0;
        for id in dirty {
            if self.tree.needs_paint(id) && self.tree.is_attached(id) {
                self.renderer.paint(&mut self.tree, id);
                painted += 1;
            }
        }
        self.stats.paint_roots = painted;

        if let Some(root) = self.tree.root() {
            self.last_paint = Some(self.renderer.paint(&mut self.tree, root));
        }
        self.tree.clear_visual_update_request();

        for child in &mut self.children {
            child.flush_paint();
        }
        self.last_paint.clone()
    }

    /// Display list produced by the most recent paint flush.
    pub fn last_paint(&self) -> Option<&DisplayListHandle> {
        self.last_paint.as_ref()
    }

    pub fn hit_test(&self, position: Point) -> HitTestResult {
        self.tree.hit_test(position)
    }

    /// Indented outline of this pipeline's render tree and its children.
    pub fn dump_tree(&self) -> String {
        let mut out = format!("{}\n", self.id);
        out.push_str(&self.tree.dump());
        for child in &self.children {
            out.push_str(&child.dump_tree());
        }
        out
    }
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
