//! Render-object arena and the layout protocol.
//!
//! Nodes live in a slot map and refer to each other by [`RenderId`]. Parent
//! pointers are plain ids used for upward invalidation walks; ownership of the
//! render objects stays with the arena.

use std::fmt::{self, Write as _};
use std::rc::Rc;

use arbor_geometry::{Constraints, Point, Size};
use log::trace;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::collections::map::HashSet;
use crate::object::{Invalidation, ParentData, RenderObject};

new_key_type! {
    /// Handle to a node in a [`RenderTree`].
    pub struct RenderId;
}

/// Child list of a render node, in paint order.
pub type RenderChildren = SmallVec<[RenderId; 4]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    Missing {
        id: RenderId,
    },
    TypeMismatch {
        id: RenderId,
        expected: &'static str,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::Missing { id } => write!(f, "render object {id:?} missing"),
            TreeError::TypeMismatch { id, expected } => {
                write!(f, "render object {id:?} is not a {expected}")
            }
        }
    }
}

impl std::error::Error for TreeError {}

pub(crate) struct RenderNode {
    object: Option<Box<dyn RenderObject>>,
    name: &'static str,
    parent: Option<RenderId>,
    first_child: Option<RenderId>,
    last_child: Option<RenderId>,
    prev_sibling: Option<RenderId>,
    next_sibling: Option<RenderId>,
    child_count: usize,
    depth: usize,
    attached: bool,
    constraints: Option<Constraints>,
    size: Size,
    relayout_boundary: Option<RenderId>,
    needs_layout: bool,
    needs_paint: bool,
    needs_compositing_bits_update: bool,
    needs_compositing: bool,
    sized_by_parent: bool,
    repaint_boundary: bool,
    always_needs_compositing: bool,
    parent_data: ParentData,
}

impl RenderNode {
    fn new(object: Box<dyn RenderObject>) -> Self {
        let repaint_boundary = object.is_repaint_boundary();
        let always_needs_compositing = object.always_needs_compositing();
        Self {
            name: object.debug_name(),
            sized_by_parent: object.sized_by_parent(),
            object: Some(object),
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            child_count: 0,
            depth: 0,
            attached: false,
            constraints: None,
            size: Size::ZERO,
            relayout_boundary: None,
            needs_layout: true,
            needs_paint: true,
            needs_compositing_bits_update: false,
            needs_compositing: repaint_boundary || always_needs_compositing,
            repaint_boundary,
            always_needs_compositing,
            parent_data: ParentData::default(),
        }
    }

    pub(crate) fn size(&self) -> Size {
        self.size
    }

    pub(crate) fn needs_paint(&self) -> bool {
        self.needs_paint
    }

    pub(crate) fn clear_needs_paint(&mut self) {
        self.needs_paint = false;
    }
}

/// Arena of render objects plus the dirty worklists of the pipeline that owns it.
pub struct RenderTree {
    nodes: SlotMap<RenderId, RenderNode>,
    root: Option<RenderId>,
    pub(crate) nodes_needing_layout: Vec<RenderId>,
    pub(crate) nodes_needing_paint: Vec<RenderId>,
    pub(crate) nodes_needing_compositing_bits_update: Vec<RenderId>,
    /// Set after a layout callback may have dirtied nodes under the boundary
    /// currently being laid out.
    pub(crate) should_merge_dirty_nodes: bool,
    visual_update_requested: bool,
    on_need_visual_update: Option<Rc<dyn Fn()>>,
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTree {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            nodes_needing_layout: Vec::new(),
            nodes_needing_paint: Vec::new(),
            nodes_needing_compositing_bits_update: Vec::new(),
            should_merge_dirty_nodes: false,
            visual_update_requested: false,
            on_need_visual_update: None,
        }
    }

    pub(crate) fn node(&self, id: RenderId) -> &RenderNode {
        match self.nodes.get(id) {
            Some(node) => node,
            None => panic!("render object {id:?} does not exist"),
        }
    }

    pub(crate) fn node_mut(&mut self, id: RenderId) -> &mut RenderNode {
        match self.nodes.get_mut(id) {
            Some(node) => node,
            None => panic!("render object {id:?} does not exist"),
        }
    }

    /// Adds a detached node to the arena.
    pub fn insert(&mut self, object: impl RenderObject) -> RenderId {
        self.insert_boxed(Box::new(object))
    }

    pub fn insert_boxed(&mut self, object: Box<dyn RenderObject>) -> RenderId {
        let id = self.nodes.insert(RenderNode::new(object));
        trace!("created {} ({id:?})", self.node(id).name);
        id
    }

    /// Disposes a node. Any remaining children are orphaned, not disposed.
    pub fn remove(&mut self, id: RenderId) -> Option<Box<dyn RenderObject>> {
        let node = self.nodes.remove(id)?;
        trace!("disposed {} ({id:?})", node.name);
        if let Some(parent) = node.parent {
            self.splice_out(parent, node.prev_sibling, node.next_sibling);
            self.mark_needs_layout(parent);
        }
        let mut next = node.first_child;
        while let Some(child) = next {
            let Some(child_node) = self.nodes.get_mut(child) else {
                break;
            };
            next = child_node.next_sibling;
            child_node.parent = None;
            child_node.prev_sibling = None;
            child_node.next_sibling = None;
        }
        if self.root == Some(id) {
            self.root = None;
        }
        node.object
    }

    pub fn contains(&self, id: RenderId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<RenderId> {
        self.root
    }

    pub fn get(&self, id: RenderId) -> Option<&dyn RenderObject> {
        self.nodes.get(id).and_then(|node| node.object.as_deref())
    }

    /// Typed read access to a render object.
    pub fn object<T: RenderObject>(&self, id: RenderId) -> Result<&T, TreeError> {
        let node = self.nodes.get(id).ok_or(TreeError::Missing { id })?;
        node.object
            .as_deref()
            .and_then(|object| object.as_any().downcast_ref::<T>())
            .ok_or(TreeError::TypeMismatch {
                id,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Mutates a render object through `f` and applies the invalidation it reports.
    pub fn update_dyn(
        &mut self,
        id: RenderId,
        f: impl FnOnce(&mut dyn RenderObject) -> Invalidation,
    ) -> Result<(), TreeError> {
        let node = self.nodes.get_mut(id).ok_or(TreeError::Missing { id })?;
        let name = node.name;
        let object = match node.object.as_deref_mut() {
            Some(object) => object,
            None => panic!("{name} ({id:?}) was mutated while being laid out or painted"),
        };
        let invalidation = f(object);
        self.refresh_flags(id);
        self.apply_invalidation(id, invalidation);
        Ok(())
    }

    /// Typed variant of [`RenderTree::update_dyn`].
    pub fn update<T: RenderObject>(
        &mut self,
        id: RenderId,
        f: impl FnOnce(&mut T) -> Invalidation,
    ) -> Result<(), TreeError> {
        let mut result = Ok(());
        self.update_dyn(id, |object| match object.as_any_mut().downcast_mut::<T>() {
            Some(object) => f(object),
            None => {
                result = Err(TreeError::TypeMismatch {
                    id,
                    expected: std::any::type_name::<T>(),
                });
                Invalidation::NONE
            }
        })?;
        result
    }

    pub fn apply_invalidation(&mut self, id: RenderId, invalidation: Invalidation) {
        if invalidation.contains(Invalidation::LAYOUT) {
            self.mark_needs_layout(id);
        }
        if invalidation.contains(Invalidation::COMPOSITING) {
            self.mark_needs_compositing_bits_update(id);
        }
        if invalidation.contains(Invalidation::PAINT) {
            self.mark_needs_paint(id);
        }
    }

    fn refresh_flags(&mut self, id: RenderId) {
        let node = self.node_mut(id);
        if let Some(object) = node.object.as_deref() {
            node.sized_by_parent = object.sized_by_parent();
            node.repaint_boundary = object.is_repaint_boundary();
            node.always_needs_compositing = object.always_needs_compositing();
        }
    }

    pub fn debug_name(&self, id: RenderId) -> Option<&'static str> {
        self.nodes.get(id).map(|node| node.name)
    }

    pub fn parent(&self, id: RenderId) -> Option<RenderId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Children of `id` in paint order.
    pub fn children(&self, id: RenderId) -> RenderChildren {
        self.child_iter(id).collect()
    }

    /// Walks the children of `id` without collecting them. Reversible, so
    /// hit testing can visit the last-painted child first.
    pub fn child_iter(&self, id: RenderId) -> ChildIter<'_> {
        match self.nodes.get(id) {
            Some(node) => ChildIter {
                tree: self,
                front: node.first_child,
                back: node.last_child,
                remaining: node.child_count,
            },
            None => ChildIter {
                tree: self,
                front: None,
                back: None,
                remaining: 0,
            },
        }
    }

    pub fn child_count(&self, id: RenderId) -> usize {
        self.nodes.get(id).map_or(0, |node| node.child_count)
    }

    pub fn first_child(&self, id: RenderId) -> Option<RenderId> {
        self.nodes.get(id).and_then(|node| node.first_child)
    }

    pub fn next_sibling(&self, id: RenderId) -> Option<RenderId> {
        self.nodes.get(id).and_then(|node| node.next_sibling)
    }

    pub fn prev_sibling(&self, id: RenderId) -> Option<RenderId> {
        self.nodes.get(id).and_then(|node| node.prev_sibling)
    }

    pub fn depth(&self, id: RenderId) -> Option<usize> {
        self.nodes.get(id).map(|node| node.depth)
    }

    pub fn size(&self, id: RenderId) -> Option<Size> {
        self.nodes.get(id).map(|node| node.size)
    }

    pub fn constraints(&self, id: RenderId) -> Option<Constraints> {
        self.nodes.get(id).and_then(|node| node.constraints)
    }

    pub fn parent_data(&self, id: RenderId) -> Option<ParentData> {
        self.nodes.get(id).map(|node| node.parent_data)
    }

    /// Offset of the node's origin in its parent's coordinate space.
    pub fn offset(&self, id: RenderId) -> Point {
        self.nodes
            .get(id)
            .map_or(Point::ZERO, |node| node.parent_data.offset)
    }

    pub fn relayout_boundary(&self, id: RenderId) -> Option<RenderId> {
        self.nodes.get(id).and_then(|node| node.relayout_boundary)
    }

    pub fn needs_layout(&self, id: RenderId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.needs_layout)
    }

    pub fn needs_paint(&self, id: RenderId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.needs_paint)
    }

    pub fn needs_compositing(&self, id: RenderId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.needs_compositing)
    }

    pub fn is_attached(&self, id: RenderId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.attached)
    }

    /// Render objects currently queued for layout, in insertion order.
    pub fn layout_worklist(&self) -> &[RenderId] {
        &self.nodes_needing_layout
    }

    pub fn paint_worklist(&self) -> &[RenderId] {
        &self.nodes_needing_paint
    }

    /// Rewrites a node's parent data. When `f` reports a change, the parent is
    /// marked for layout.
    pub fn update_parent_data(&mut self, id: RenderId, f: impl FnOnce(&mut ParentData) -> bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if f(&mut node.parent_data) {
            if let Some(parent) = node.parent {
                self.mark_needs_layout(parent);
            }
        }
    }

    pub fn set_on_need_visual_update(&mut self, hook: Option<Rc<dyn Fn()>>) {
        self.on_need_visual_update = hook;
    }

    pub(crate) fn visual_update_hook(&self) -> Option<Rc<dyn Fn()>> {
        self.on_need_visual_update.clone()
    }

    /// Asks the host for a frame. The hook fires once until the next paint flush.
    pub fn request_visual_update(&mut self) {
        if self.visual_update_requested {
            return;
        }
        self.visual_update_requested = true;
        if let Some(hook) = &self.on_need_visual_update {
            hook();
        }
    }

    pub fn visual_update_requested(&self) -> bool {
        self.visual_update_requested
    }

    pub(crate) fn clear_visual_update_request(&mut self) {
        self.visual_update_requested = false;
    }

    /// Makes `root` the root of this tree and schedules its first layout and paint.
    pub fn set_root(&mut self, root: Option<RenderId>) {
        if let Some(old) = self.root.take() {
            if Some(old) != root {
                self.detach_subtree(old);
            }
        }
        let Some(root) = root else {
            return;
        };
        let node = self.node(root);
        assert!(
            node.parent.is_none(),
            "{} ({root:?}) cannot become a root while it has a parent",
            node.name
        );
        self.root = Some(root);
        self.redepth(root, 0);
        self.attach_subtree(root);

        let node = self.node_mut(root);
        node.relayout_boundary = Some(root);
        node.needs_layout = false;
        node.needs_paint = false;
        self.mark_needs_layout(root);
        self.mark_needs_compositing_bits_update(root);
        self.mark_needs_paint(root);
    }

    /// Sets the constraints the root is laid out with, marking it for layout
    /// when they change.
    pub fn set_root_constraints(&mut self, constraints: Constraints) {
        assert!(
            constraints.is_normalized(),
            "root constraints {constraints} are malformed"
        );
        let Some(root) = self.root else {
            return;
        };
        let node = self.node_mut(root);
        if node.constraints != Some(constraints) {
            node.constraints = Some(constraints);
            self.mark_needs_layout(root);
        }
    }

    /// Inserts `child` into `parent`'s child list right after `after`, or first
    /// when `after` is `None`.
    pub fn insert_child(&mut self, parent: RenderId, child: RenderId, after: Option<RenderId>) {
        assert_ne!(parent, child, "{parent:?} cannot be its own child");
        let child_node = self.node(child);
        assert!(
            child_node.parent.is_none() && self.root != Some(child),
            "{} ({child:?}) already has a parent",
            child_node.name
        );
        self.link_after(parent, child, after);
        self.node_mut(child).parent = Some(parent);
        self.adopt(parent, child);
    }

    pub fn remove_child(&mut self, parent: RenderId, child: RenderId) {
        let child_node = self.node(child);
        assert_eq!(
            child_node.parent,
            Some(parent),
            "{} ({child:?}) is not a child of {parent:?}",
            child_node.name
        );
        self.unlink(parent, child);
        self.clean_relayout_boundary(child);
        self.node_mut(child).parent = None;
        if self.node(child).attached {
            self.detach_subtree(child);
        }
        self.mark_needs_layout(parent);
        self.mark_needs_compositing_bits_update(parent);
    }

    /// Moves an existing child so it directly follows `after`.
    pub fn move_child(&mut self, parent: RenderId, child: RenderId, after: Option<RenderId>) {
        assert_ne!(after, Some(child), "{child:?} cannot be moved after itself");
        if self.node(child).parent != Some(parent) {
            panic!("{child:?} is not a child of {parent:?}");
        }
        if self.node(child).prev_sibling == after {
            return;
        }
        self.unlink(parent, child);
        self.link_after(parent, child, after);
        self.mark_needs_layout(parent);
    }

    /// Splices `child` into `parent`'s sibling chain right after `after`.
    fn link_after(&mut self, parent: RenderId, child: RenderId, after: Option<RenderId>) {
        let next = match after {
            None => self.node(parent).first_child,
            Some(after) => {
                let after_node = self.node(after);
                if after_node.parent != Some(parent) {
                    panic!("{after:?} is not a child of {parent:?}");
                }
                after_node.next_sibling
            }
        };
        let child_node = self.node_mut(child);
        child_node.prev_sibling = after;
        child_node.next_sibling = next;
        match after {
            Some(after) => self.node_mut(after).next_sibling = Some(child),
            None => self.node_mut(parent).first_child = Some(child),
        }
        match next {
            Some(next) => self.node_mut(next).prev_sibling = Some(child),
            None => self.node_mut(parent).last_child = Some(child),
        }
        self.node_mut(parent).child_count += 1;
    }

    fn unlink(&mut self, parent: RenderId, child: RenderId) {
        let child_node = self.node_mut(child);
        let prev = child_node.prev_sibling.take();
        let next = child_node.next_sibling.take();
        self.splice_out(parent, prev, next);
    }

    /// Joins the neighbours of a child that left `parent`'s sibling chain.
    fn splice_out(&mut self, parent: RenderId, prev: Option<RenderId>, next: Option<RenderId>) {
        match prev.and_then(|prev| self.nodes.get_mut(prev)) {
            Some(prev_node) => prev_node.next_sibling = next,
            None => {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    parent_node.first_child = next;
                }
            }
        }
        match next.and_then(|next| self.nodes.get_mut(next)) {
            Some(next_node) => next_node.prev_sibling = prev,
            None => {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    parent_node.last_child = prev;
                }
            }
        }
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.child_count = parent_node.child_count.saturating_sub(1);
        }
    }

    fn adopt(&mut self, parent: RenderId, child: RenderId) {
        self.mark_needs_layout(parent);
        self.mark_needs_compositing_bits_update(parent);
        let depth = self.node(parent).depth + 1;
        self.redepth(child, depth);
        if self.node(parent).attached {
            self.attach_subtree(child);
        }
    }

    fn redepth(&mut self, id: RenderId, depth: usize) {
        let mut stack: SmallVec<[(RenderId, usize); 16]> = SmallVec::new();
        stack.push((id, depth));
        while let Some((current, depth)) = stack.pop() {
            let node = self.node_mut(current);
            if node.depth == depth && current != id {
                continue;
            }
            node.depth = depth;
            stack.extend(self.child_iter(current).map(|child| (child, depth + 1)));
        }
    }

    fn attach_subtree(&mut self, id: RenderId) {
        let mut stack: SmallVec<[RenderId; 16]> = SmallVec::new();
        let mut attached = Vec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            let node = self.node_mut(current);
            node.attached = true;
            stack.extend(self.child_iter(current));
            attached.push(current);
        }
        // Pending work recorded while detached is re-queued on this tree.
        for current in attached {
            let node = self.node_mut(current);
            if node.needs_layout && node.relayout_boundary.is_some() {
                node.needs_layout = false;
                self.mark_needs_layout(current);
            }
            let node = self.node_mut(current);
            if node.needs_compositing_bits_update {
                node.needs_compositing_bits_update = false;
                self.mark_needs_compositing_bits_update(current);
            }
            let node = self.node_mut(current);
            if node.needs_paint {
                node.needs_paint = false;
                self.mark_needs_paint(current);
            }
        }
    }

    fn detach_subtree(&mut self, id: RenderId) {
        let mut stack: SmallVec<[RenderId; 16]> = SmallVec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            let node = self.node_mut(current);
            node.attached = false;
            stack.extend(self.child_iter(current));
        }
    }

    /// Marks `id` as needing layout and queues the nearest relayout boundary.
    pub fn mark_needs_layout(&mut self, id: RenderId) {
        let mut current = id;
        loop {
            let Some(node) = self.nodes.get_mut(current) else {
                return;
            };
            if node.needs_layout {
                return;
            }
            node.needs_layout = true;
            if node.relayout_boundary == Some(current) {
                if node.attached {
                    trace!("queued relayout boundary {} ({current:?})", node.name);
                    self.nodes_needing_layout.push(current);
                    self.request_visual_update();
                }
                return;
            }
            // Either layout never ran here or the size depends on the parent.
            match node.parent {
                Some(parent) => current = parent,
                None => return,
            }
        }
    }

    /// Marks `id` and every ancestor as needing paint.
    pub fn mark_needs_paint(&mut self, id: RenderId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.needs_paint {
            node.needs_paint = true;
            if node.attached {
                self.nodes_needing_paint.push(id);
            }
        }
        let mut top = id;
        let mut parent = self.node(id).parent;
        while let Some(current) = parent {
            let node = self.node_mut(current);
            node.needs_paint = true;
            parent = node.parent;
            top = current;
        }
        if self.node(top).attached {
            self.request_visual_update();
        }
    }

    pub fn mark_needs_compositing_bits_update(&mut self, id: RenderId) {
        let mut current = id;
        loop {
            let Some(node) = self.nodes.get_mut(current) else {
                return;
            };
            if node.needs_compositing_bits_update {
                return;
            }
            node.needs_compositing_bits_update = true;
            let repaint_boundary = node.repaint_boundary;
            let attached = node.attached;
            if let Some(parent) = node.parent {
                let parent_node = self.node(parent);
                if parent_node.needs_compositing_bits_update {
                    return;
                }
                if !repaint_boundary && !parent_node.repaint_boundary {
                    current = parent;
                    continue;
                }
            }
            if attached {
                self.nodes_needing_compositing_bits_update.push(current);
            }
            return;
        }
    }

    /// Recomputes `needs_compositing` for `id` and its pending descendants.
    pub(crate) fn update_compositing_bits(&mut self, id: RenderId) {
        let node = self.node(id);
        if !node.needs_compositing_bits_update {
            return;
        }
        let old = node.needs_compositing;
        let children = self.children(id);
        let mut needs_compositing = false;
        for child in children {
            self.update_compositing_bits(child);
            needs_compositing |= self.node(child).needs_compositing;
        }
        let node = self.node_mut(id);
        needs_compositing |= node.repaint_boundary || node.always_needs_compositing;
        node.needs_compositing = needs_compositing;
        node.needs_compositing_bits_update = false;
        if old != needs_compositing {
            self.mark_needs_paint(id);
        }
    }

    /// Lays out `id` under `constraints` and returns its size.
    ///
    /// Skips the node's own layout when it is clean and the constraints are
    /// unchanged. Panics when the constraints are malformed or the node returns
    /// a size outside them.
    pub fn layout(
        &mut self,
        id: RenderId,
        constraints: Constraints,
        parent_uses_size: bool,
    ) -> Size {
        let node = self.node(id);
        assert!(
            constraints.is_normalized(),
            "constraints {constraints} given to {} ({id:?}) are malformed",
            node.name
        );
        let boundary = if !parent_uses_size || node.sized_by_parent || constraints.is_tight() {
            id
        } else {
            match node.parent {
                None => id,
                Some(parent) => match self.node(parent).relayout_boundary {
                    Some(boundary) => boundary,
                    None => panic!(
                        "{} ({id:?}) laid out by {parent:?} which has no relayout boundary",
                        node.name
                    ),
                },
            }
        };

        let node = self.node_mut(id);
        if !node.needs_layout && node.constraints == Some(constraints) {
            let size = node.size;
            if node.relayout_boundary != Some(boundary) {
                node.relayout_boundary = Some(boundary);
                self.propagate_relayout_boundary(id);
            }
            return size;
        }

        node.constraints = Some(constraints);
        let changed = node.relayout_boundary.is_some_and(|old| old != boundary);
        if changed {
            self.clean_relayout_boundaries_below(id);
        }
        self.node_mut(id).relayout_boundary = Some(boundary);

        let size = self.run_perform_layout(id, constraints);
        self.finish_layout(id, constraints, size);
        size
    }

    /// Re-runs layout on a relayout boundary with its stored constraints.
    pub(crate) fn layout_without_resize(&mut self, id: RenderId) {
        let node = self.node(id);
        let constraints = match node.constraints {
            Some(constraints) => constraints,
            None => panic!(
                "{} ({id:?}) was queued for layout before receiving constraints",
                node.name
            ),
        };
        trace!("relayout from boundary {} ({id:?})", node.name);
        let size = self.run_perform_layout(id, constraints);
        self.finish_layout(id, constraints, size);
    }

    fn run_perform_layout(&mut self, id: RenderId, constraints: Constraints) -> Size {
        let mut object = self.take_object(id);
        let size = {
            let mut cx = LayoutCx {
                tree: self,
                id,
                constraints,
            };
            object.perform_layout(&mut cx)
        };
        self.restore_object(id, object);
        size
    }

    fn finish_layout(&mut self, id: RenderId, constraints: Constraints, size: Size) {
        let node = self.node_mut(id);
        assert!(
            size.is_finite() && constraints.contains(size),
            "{} ({id:?}) violated constraints {constraints}: returned size {size}",
            node.name
        );
        node.size = size;
        node.needs_layout = false;
        self.mark_needs_paint(id);
    }

    pub(crate) fn take_object(&mut self, id: RenderId) -> Box<dyn RenderObject> {
        let node = self.node_mut(id);
        match node.object.take() {
            Some(object) => object,
            None => panic!(
                "{} ({id:?}) re-entered while already being laid out or painted",
                node.name
            ),
        }
    }

    pub(crate) fn restore_object(&mut self, id: RenderId, object: Box<dyn RenderObject>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.object = Some(object);
        }
    }

    fn propagate_relayout_boundary(&mut self, id: RenderId) {
        let mut stack = self.children(id);
        while let Some(child) = stack.pop() {
            let parent_boundary = self
                .node(child)
                .parent
                .and_then(|parent| self.node(parent).relayout_boundary);
            let node = self.node_mut(child);
            if node.relayout_boundary == Some(child) {
                continue;
            }
            if node.relayout_boundary != parent_boundary {
                node.relayout_boundary = parent_boundary;
                stack.extend(self.child_iter(child));
            }
        }
    }

    fn clean_relayout_boundary(&mut self, id: RenderId) {
        let node = self.node_mut(id);
        if node.relayout_boundary != Some(id) {
            node.relayout_boundary = None;
            self.clean_relayout_boundaries_below(id);
        }
    }

    fn clean_relayout_boundaries_below(&mut self, id: RenderId) {
        let mut stack = self.children(id);
        while let Some(child) = stack.pop() {
            let node = self.node_mut(child);
            if node.relayout_boundary != Some(child) {
                node.relayout_boundary = None;
                stack.extend(self.child_iter(child));
            }
        }
    }

    /// Indented outline of the tree below the root.
    pub fn dump(&self) -> String {
        match self.root {
            Some(root) => self.dump_subtree(root),
            None => String::new(),
        }
    }

    pub fn dump_subtree(&self, id: RenderId) -> String {
        let mut out = String::new();
        let mut visited = HashSet::default();
        self.dump_node(id, 0, &mut out, &mut visited);
        out
    }

    fn dump_node(
        &self,
        id: RenderId,
        depth: usize,
        out: &mut String,
        visited: &mut HashSet<RenderId>,
    ) {
        assert!(visited.insert(id), "render tree contains a cycle through {id:?}");
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}{} {}", node.name, node.size);
        let offset = node.parent_data.offset;
        if offset != Point::ZERO {
            let _ = write!(out, " at {offset}");
        }
        if node.relayout_boundary == Some(id) {
            out.push_str(" [boundary]");
        }
        if node.needs_layout {
            out.push_str(" [needs-layout]");
        }
        if node.needs_paint {
            out.push_str(" [needs-paint]");
        }
        out.push('\n');
        for child in self.child_iter(id) {
            self.dump_node(child, depth + 1, out, visited);
        }
    }
}

/// Iterator over a node's children, from [`RenderTree::child_iter`].
pub struct ChildIter<'a> {
    tree: &'a RenderTree,
    front: Option<RenderId>,
    back: Option<RenderId>,
    remaining: usize,
}

impl Iterator for ChildIter<'_> {
    type Item = RenderId;

    fn next(&mut self) -> Option<RenderId> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        self.remaining -= 1;
        self.front = self.tree.next_sibling(id);
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for ChildIter<'_> {
    fn next_back(&mut self) -> Option<RenderId> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        self.remaining -= 1;
        self.back = self.tree.prev_sibling(id);
        Some(id)
    }
}

impl ExactSizeIterator for ChildIter<'_> {}

/// What a render object sees of the tree while it lays itself out.
pub struct LayoutCx<'a> {
    tree: &'a mut RenderTree,
    id: RenderId,
    constraints: Constraints,
}

impl LayoutCx<'_> {
    pub fn id(&self) -> RenderId {
        self.id
    }

    pub fn constraints(&self) -> Constraints {
        self.constraints
    }

    pub fn children(&self) -> RenderChildren {
        self.tree.children(self.id)
    }

    pub fn first_child(&self) -> Option<RenderId> {
        self.tree.first_child(self.id)
    }

    pub fn child_count(&self) -> usize {
        self.tree.child_count(self.id)
    }

    pub fn parent_data(&self, child: RenderId) -> ParentData {
        self.tree.node(child).parent_data
    }

    /// Lays out one of this node's children.
    pub fn layout_child(
        &mut self,
        child: RenderId,
        constraints: Constraints,
        parent_uses_size: bool,
    ) -> Size {
        let parent = self.tree.node(child).parent;
        assert_eq!(
            parent,
            Some(self.id),
            "{child:?} laid out by {:?} which is not its parent",
            self.id
        );
        self.tree.layout(child, constraints, parent_uses_size)
    }

    /// Places a child's origin in this node's coordinate space.
    pub fn position_child(&mut self, child: RenderId, offset: Point) {
        self.tree.node_mut(child).parent_data.offset = offset;
    }

    /// Runs `f` with full tree access. Nodes it dirties are merged into the
    /// layout batch currently being flushed.
    pub fn invoke_layout_callback<R>(&mut self, f: impl FnOnce(&mut RenderTree) -> R) -> R {
        let result = f(self.tree);
        self.tree.should_merge_dirty_nodes = true;
        result
    }
}

#[cfg(test)]
#[path = "tests/tree_tests.rs"]
mod tests;
