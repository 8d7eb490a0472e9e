//! The element tree and the owners it drives.

use std::fmt::Write as _;
use std::rc::Rc;
use std::time::Duration;

use arbor_render::{FrameCallbacks, PipelineId, PipelineOwner, RenderId, RenderTree};
use log::trace;
use slotmap::SlotMap;

use crate::build_owner::BuildOwner;
use crate::collections::HashMap;
use crate::element::{
    ElementError, ElementId, ElementKind, ElementNode, ElementStats, Lifecycle, Slot,
};
use crate::key::GlobalKey;
use crate::widget::{State, WidgetKind, WidgetRef};

/// Context object tying together the element arena, the build owner, the
/// root pipeline owner, and the next-frame callbacks of one top-level view.
pub struct Framework {
    pub(crate) elements: SlotMap<ElementId, ElementNode>,
    pub(crate) global_keys: HashMap<GlobalKey, ElementId>,
    pub(crate) build_owner: BuildOwner,
    pub(crate) pipeline: PipelineOwner,
    pub(crate) callbacks: FrameCallbacks<Framework>,
    pub(crate) now: Duration,
    pub(crate) root: Option<ElementId>,
    pub(crate) stats: ElementStats,
}

impl Default for Framework {
    fn default() -> Self {
        Self::new()
    }
}

impl Framework {
    pub fn new() -> Self {
        Self {
            elements: SlotMap::with_key(),
            global_keys: HashMap::default(),
            build_owner: BuildOwner::default(),
            pipeline: PipelineOwner::new(),
            callbacks: FrameCallbacks::new(),
            now: Duration::ZERO,
            root: None,
            stats: ElementStats::default(),
        }
    }

    pub fn pipeline(&self) -> &PipelineOwner {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut PipelineOwner {
        &mut self.pipeline
    }

    /// Timestamp of the current (or most recent) frame.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn stats(&self) -> ElementStats {
        self.stats
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Mounts `view` as the root element, or reconciles it against the
    /// existing root. The widget must be a [`View`](crate::View).
    pub fn mount_root(&mut self, view: WidgetRef) -> ElementId {
        assert!(
            matches!(view.kind(), WidgetKind::View(_)),
            "root widget {} is not a View",
            view.debug_name()
        );
        let root = self.reconcile_child(None, self.root, view, Slot::FIRST);
        self.root = Some(root);
        root
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Lifecycle of `id`; unmounted elements report [`Lifecycle::Defunct`].
    pub fn lifecycle(&self, id: ElementId) -> Lifecycle {
        self.elements
            .get(id)
            .map_or(Lifecycle::Defunct, |node| node.lifecycle)
    }

    pub fn is_dirty(&self, id: ElementId) -> bool {
        self.elements.get(id).is_some_and(|node| node.dirty)
    }

    pub fn widget(&self, id: ElementId) -> Option<&WidgetRef> {
        self.elements.get(id).map(|node| &node.widget)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.elements
            .get(id)
            .map_or_else(Vec::new, |node| node.kind.children())
    }

    pub fn depth(&self, id: ElementId) -> Option<usize> {
        self.elements.get(id).map(|node| node.depth)
    }

    pub fn slot(&self, id: ElementId) -> Option<Slot> {
        self.elements.get(id).map(|node| node.slot)
    }

    /// Element currently registered for `key`.
    pub fn element_for_global_key(&self, key: GlobalKey) -> Option<ElementId> {
        self.global_keys.get(&key).copied()
    }

    /// The render object backing `id`: its own, or the first one below it for
    /// components. Paired with the pipeline whose tree holds it.
    pub fn render_object(&self, id: ElementId) -> Option<(PipelineId, RenderId)> {
        let mut current = id;
        loop {
            let node = self.elements.get(current)?;
            match &node.kind {
                ElementKind::Component { child, .. } => current = (*child)?,
                kind => return kind.render().map(|render| (node.pipeline, render)),
            }
        }
    }

    /// Pipeline owner whose tree holds the render objects of `id`'s subtree.
    pub fn pipeline_of(&self, id: ElementId) -> Option<&PipelineOwner> {
        let pipeline = self.elements.get(id)?.pipeline;
        self.pipeline.find(pipeline)
    }

    /// Read access to a stateful element's state.
    pub fn with_state<S: State, R>(
        &self,
        id: ElementId,
        f: impl FnOnce(&S) -> R,
    ) -> Result<R, ElementError> {
        let node = self.elements.get(id).ok_or(ElementError::Missing { id })?;
        let ElementKind::Component {
            state: Some(state), ..
        } = &node.kind
        else {
            return Err(ElementError::NotStateful { id });
        };
        let state = (**state)
            .as_any()
            .downcast_ref::<S>()
            .ok_or(ElementError::StateMismatch {
                id,
                expected: std::any::type_name::<S>(),
            })?;
        Ok(f(state))
    }

    /// Mutates a stateful element's state and marks it for rebuild.
    pub fn set_state<S: State, R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut S) -> R,
    ) -> Result<R, ElementError> {
        let node = self.elements.get_mut(id).ok_or(ElementError::Missing { id })?;
        let ElementKind::Component {
            state: Some(state), ..
        } = &mut node.kind
        else {
            return Err(ElementError::NotStateful { id });
        };
        let state = (**state)
            .as_any_mut()
            .downcast_mut::<S>()
            .ok_or(ElementError::StateMismatch {
                id,
                expected: std::any::type_name::<S>(),
            })?;
        let result = f(state);
        self.mark_needs_build(id);
        Ok(result)
    }

    /// Queues `callback` for the start of the next frame and asks the host
    /// for that frame.
    pub fn add_next_frame_callback(
        &mut self,
        callback: impl FnOnce(&mut Framework, Duration) + 'static,
    ) {
        self.callbacks.add(callback);
        self.pipeline.request_visual_update();
    }

    pub fn has_frame_callbacks(&self) -> bool {
        !self.callbacks.is_empty()
    }

    /// Invokes the callbacks registered before this call. Callbacks they
    /// register run on the following frame.
    pub fn run_frame_callbacks(&mut self, now: Duration) {
        self.now = now;
        let mut batch = self.callbacks.swap();
        if !batch.is_empty() {
            trace!("running {} frame callbacks", batch.len());
        }
        for callback in batch.drain(..) {
            callback(self, now);
        }
        self.callbacks.recycle(batch);
    }

    /// Indented outline of the element tree.
    pub fn dump_element_tree(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.dump_element(root, 0, &mut out);
        }
        out
    }

    fn dump_element(&self, id: ElementId, indent: usize, out: &mut String) {
        let Some(node) = self.elements.get(id) else {
            return;
        };
        let _ = write!(
            out,
            "{}{} {}",
            "  ".repeat(indent),
            node.kind.name(),
            node.widget.debug_name()
        );
        if let Some(key) = node.widget.key() {
            let _ = write!(out, " {key}");
        }
        if node.dirty {
            out.push_str(" [dirty]");
        }
        if node.lifecycle != Lifecycle::Active {
            let _ = write!(out, " [{:?}]", node.lifecycle);
        }
        out.push('\n');
        for child in node.kind.children() {
            self.dump_element(child, indent + 1, out);
        }
    }

    pub(crate) fn node(&self, id: ElementId) -> &ElementNode {
        match self.elements.get(id) {
            Some(node) => node,
            None => panic!("element {id:?} is defunct or was never mounted"),
        }
    }

    pub(crate) fn node_mut(&mut self, id: ElementId) -> &mut ElementNode {
        match self.elements.get_mut(id) {
            Some(node) => node,
            None => panic!("element {id:?} is defunct or was never mounted"),
        }
    }

    pub(crate) fn owner_mut(&mut self, pipeline: PipelineId) -> &mut PipelineOwner {
        let root = self.pipeline.id();
        match self.pipeline.find_mut(pipeline) {
            Some(owner) => owner,
            None => panic!("{pipeline} is not part of {root}"),
        }
    }

    pub(crate) fn tree_mut(&mut self, pipeline: PipelineId) -> &mut RenderTree {
        self.owner_mut(pipeline).tree_mut()
    }

    pub(crate) fn tree(&self, pipeline: PipelineId) -> &RenderTree {
        match self.pipeline.find(pipeline) {
            Some(owner) => owner.tree(),
            None => panic!("{pipeline} is not part of {}", self.pipeline.id()),
        }
    }

    pub(crate) fn register_global_key(&mut self, id: ElementId, widget: &WidgetRef) {
        let Some(key) = widget.key().and_then(|key| key.global()) else {
            return;
        };
        if let Some(previous) = self.global_keys.insert(key, id) {
            if previous != id && self.lifecycle(previous) == Lifecycle::Active {
                log::warn!(
                    "{key:?} moved from active element {previous:?} to {id:?}; global keys must be unique"
                );
            }
        }
    }

    pub(crate) fn unregister_global_key(&mut self, id: ElementId, widget: &WidgetRef) {
        let Some(key) = widget.key().and_then(|key| key.global()) else {
            return;
        };
        if self.global_keys.get(&key) == Some(&id) {
            self.global_keys.remove(&key);
        }
    }

    pub(crate) fn shared_widget(&self, id: ElementId) -> WidgetRef {
        Rc::clone(&self.node(id).widget)
    }
}
