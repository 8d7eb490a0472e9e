//! Reconciliation: matching freshly built widgets against live elements and
//! keeping the render trees in step.
//!
//! Elements never own each other through pointers; parents hold child ids and
//! children hold a parent id used for upward walks. Render objects are
//! inserted into the nearest ancestor render element's object when an element
//! attaches, and removed again when it deactivates.

use std::rc::Rc;

use arbor_geometry::Constraints;
use arbor_render::objects::RenderView;
use arbor_render::{PipelineId, PipelineOwner, RenderId};
use log::trace;
use smallvec::SmallVec;

use crate::collections::{HashMap, HashSet};
use crate::context::BuildContext;
use crate::element::{ElementId, ElementKind, ElementNode, Lifecycle, Slot};
use crate::framework::Framework;
use crate::key::{GlobalKey, Key};
use crate::view::View;
use crate::widget::{
    can_update, DynRenderObjectWidget, ProxyWidget, WidgetChildren, WidgetKind, WidgetRef,
};

impl Framework {
    /// Reconciles one child position of `parent`.
    ///
    /// With no widget the old child is deactivated. With no old child a new
    /// element is inflated. An old child whose widget is the same instance is
    /// kept as is; one that [`can_update`] the new widget is updated in place;
    /// anything else is replaced.
    pub(crate) fn update_child(
        &mut self,
        parent: ElementId,
        child: Option<ElementId>,
        widget: Option<WidgetRef>,
        slot: Slot,
    ) -> Option<ElementId> {
        match widget {
            Some(widget) => Some(self.reconcile_child(Some(parent), child, widget, slot)),
            None => {
                if let Some(child) = child {
                    self.deactivate_child(child);
                }
                None
            }
        }
    }

    pub(crate) fn reconcile_child(
        &mut self,
        parent: Option<ElementId>,
        child: Option<ElementId>,
        widget: WidgetRef,
        slot: Slot,
    ) -> ElementId {
        if let Some(child) = child {
            let current = self.shared_widget(child);
            if Rc::ptr_eq(&current, &widget) {
                if self.node(child).slot != slot {
                    self.update_slot_for_child(child, slot);
                }
                return child;
            }
            if can_update(&*current, &*widget) {
                if self.node(child).slot != slot {
                    self.update_slot_for_child(child, slot);
                }
                self.update(child, widget);
                return child;
            }
            self.deactivate_child(child);
        }
        self.inflate(parent, widget, slot)
    }

    /// Reconciles a child list against `widgets`, returning the new child
    /// list in widget order.
    ///
    /// Matching children at both ends are reconciled positionally. In the
    /// middle, keyed old children are matched by key and keyless ones are
    /// dropped. Old children that a global-key retake took away while this
    /// runs are skipped.
    pub(crate) fn update_children(
        &mut self,
        parent: ElementId,
        old: Vec<ElementId>,
        widgets: &[WidgetRef],
    ) -> Vec<ElementId> {
        let mut new_top = 0;
        let mut old_top = 0;
        let mut new_bottom = widgets.len();
        let mut old_bottom = old.len();
        let mut children = Vec::with_capacity(widgets.len());
        let mut previous: Option<ElementId> = None;

        // Matching prefix.
        while old_top < old_bottom && new_top < new_bottom {
            let old_child = old[old_top];
            let widget = &widgets[new_top];
            if self.is_forgotten(parent, old_child)
                || !can_update(&*self.node(old_child).widget, &**widget)
            {
                break;
            }
            let child = self.reconcile_child(
                Some(parent),
                Some(old_child),
                Rc::clone(widget),
                Slot::new(new_top, previous),
            );
            children.push(child);
            previous = Some(child);
            new_top += 1;
            old_top += 1;
        }

        // Matching suffix. Reconciled later, in order.
        while old_top < old_bottom && new_top < new_bottom {
            let old_child = old[old_bottom - 1];
            let widget = &widgets[new_bottom - 1];
            if self.is_forgotten(parent, old_child)
                || !can_update(&*self.node(old_child).widget, &**widget)
            {
                break;
            }
            old_bottom -= 1;
            new_bottom -= 1;
        }

        let has_old_middle = old_top < old_bottom;
        let mut keyed: HashMap<Key, ElementId> = HashMap::default();
        while old_top < old_bottom {
            let old_child = old[old_top];
            old_top += 1;
            if self.is_forgotten(parent, old_child) {
                continue;
            }
            match self.node(old_child).widget.key().cloned() {
                Some(key) => {
                    if let Some(duplicate) = keyed.insert(key.clone(), old_child) {
                        panic!(
                            "duplicate key {key} on children {duplicate:?} and {old_child:?} of {parent:?}"
                        );
                    }
                }
                None => self.deactivate_child(old_child),
            }
        }

        while new_top < new_bottom {
            let widget = &widgets[new_top];
            let mut old_child = None;
            if has_old_middle {
                if let Some(key) = widget.key() {
                    if let Some(&candidate) = keyed.get(key) {
                        if !self.is_forgotten(parent, candidate)
                            && can_update(&*self.node(candidate).widget, &**widget)
                        {
                            keyed.remove(key);
                            old_child = Some(candidate);
                        }
                    }
                }
            }
            let child = self.reconcile_child(
                Some(parent),
                old_child,
                Rc::clone(widget),
                Slot::new(new_top, previous),
            );
            children.push(child);
            previous = Some(child);
            new_top += 1;
        }

        // Replay the suffix now that everything before it is in place.
        new_bottom = widgets.len();
        old_bottom = old.len();
        while old_top < old_bottom && new_top < new_bottom {
            let child = self.reconcile_child(
                Some(parent),
                Some(old[old_top]),
                Rc::clone(&widgets[new_top]),
                Slot::new(new_top, previous),
            );
            children.push(child);
            previous = Some(child);
            new_top += 1;
            old_top += 1;
        }

        for (_, old_child) in keyed {
            if !self.is_forgotten(parent, old_child) {
                self.deactivate_child(old_child);
            }
        }
        children
    }

    fn is_forgotten(&self, parent: ElementId, child: ElementId) -> bool {
        match &self.node(parent).kind {
            ElementKind::MultiChildRender { forgotten, .. } => forgotten.contains(&child),
            _ => false,
        }
    }

    fn inflate(&mut self, parent: Option<ElementId>, widget: WidgetRef, slot: Slot) -> ElementId {
        if let Some(key) = widget.key().and_then(Key::global) {
            if let Some(element) = self.retake_inactive_element(key, &widget) {
                trace!("{key:?} moves {element:?} under {parent:?}");
                self.activate_with_parent(element, parent, slot);
                return self.reconcile_child(parent, Some(element), widget, slot);
            }
        }
        self.mount_new(parent, widget, slot)
    }

    fn retake_inactive_element(&mut self, key: GlobalKey, widget: &WidgetRef) -> Option<ElementId> {
        let element = *self.global_keys.get(&key)?;
        let node = self.elements.get(element)?;
        if !can_update(&*node.widget, &**widget) {
            return None;
        }
        if let Some(parent) = node.parent {
            self.forget_child(parent, element);
            self.deactivate_child(element);
        }
        if !self.build_owner.inactive.swap_remove(&element) {
            return None;
        }
        Some(element)
    }

    fn forget_child(&mut self, parent: ElementId, child: ElementId) {
        match &mut self.node_mut(parent).kind {
            ElementKind::Component { child: current, .. }
            | ElementKind::SingleChildRender { child: current, .. }
            | ElementKind::View { child: current, .. } => {
                if *current == Some(child) {
                    *current = None;
                }
            }
            ElementKind::MultiChildRender {
                children, forgotten, ..
            } => {
                children.retain(|c| *c != child);
                forgotten.insert(child);
            }
            ElementKind::LeafRender { .. } => {}
        }
    }

    /// Depth and pipeline a child of `parent` is created with.
    fn child_position(&self, parent: Option<ElementId>) -> (usize, PipelineId) {
        match parent {
            Some(parent) => {
                let node = self.node(parent);
                (node.depth + 1, node.pipeline)
            }
            None => (0, self.pipeline.id()),
        }
    }

    /// Pipeline that holds `node`'s place in its parent's render tree.
    fn home_pipeline(node: &ElementNode) -> PipelineId {
        match node.kind {
            ElementKind::View {
                enclosing: Some(enclosing),
                ..
            } => enclosing,
            _ => node.pipeline,
        }
    }

    fn mount_new(&mut self, parent: Option<ElementId>, widget: WidgetRef, slot: Slot) -> ElementId {
        let (depth, pipeline) = self.child_position(parent);
        let id = self.elements.insert(ElementNode {
            widget: Rc::clone(&widget),
            parent,
            depth,
            slot,
            lifecycle: Lifecycle::Initial,
            dirty: false,
            in_dirty_list: false,
            pipeline,
            kind: ElementKind::Component {
                child: None,
                state: None,
            },
        });
        self.stats.created += 1;
        trace!("mounting {} ({id:?}) at depth {depth}", widget.debug_name());
        self.register_global_key(id, &widget);
        self.node_mut(id).lifecycle = Lifecycle::Active;

        match widget.kind() {
            WidgetKind::Stateless(_) | WidgetKind::Proxy(_) => self.rebuild(id),
            WidgetKind::Stateful(stateful) => {
                let mut state = stateful.create_state_boxed();
                let mut cx = BuildContext {
                    element: id,
                    now: self.now,
                    callbacks: &mut self.callbacks,
                    build_requests: &mut self.build_owner.build_requests,
                };
                state.init_state_dyn(&*widget, &mut cx);
                self.node_mut(id).kind = ElementKind::Component {
                    child: None,
                    state: Some(state),
                };
                self.flush_build_requests();
                self.rebuild(id);
            }
            WidgetKind::Render(render_widget) => self.mount_render(id, render_widget, slot),
            WidgetKind::View(view) => self.mount_view(id, parent, view),
        }
        id
    }

    fn mount_render(&mut self, id: ElementId, widget: &dyn DynRenderObjectWidget, slot: Slot) {
        let pipeline = self.node(id).pipeline;
        let render = self.owner_mut(pipeline).create(widget.create_render_boxed());
        self.node_mut(id).kind = match widget.child_widgets() {
            WidgetChildren::None => ElementKind::LeafRender { render },
            WidgetChildren::Single(_) => ElementKind::SingleChildRender {
                render,
                child: None,
            },
            WidgetChildren::Many(_) => ElementKind::MultiChildRender {
                render,
                children: Vec::new(),
                forgotten: HashSet::default(),
            },
        };
        self.attach_render_object(id, slot);

        match widget.child_widgets() {
            WidgetChildren::None => {}
            WidgetChildren::Single(child) => {
                let child = self.update_child(id, None, child.cloned(), Slot::FIRST);
                self.set_single_child(id, child);
            }
            WidgetChildren::Many(widgets) => {
                let mut children = Vec::with_capacity(widgets.len());
                let mut previous = None;
                for (index, widget) in widgets.iter().enumerate() {
                    let child = self.inflate(Some(id), Rc::clone(widget), Slot::new(index, previous));
                    children.push(child);
                    previous = Some(child);
                }
                self.set_child_list(id, children);
            }
        }
    }

    fn mount_view(&mut self, id: ElementId, parent: Option<ElementId>, view: &View) {
        let render;
        let enclosing = if parent.is_some() {
            let Some(size) = view.size else {
                panic!("nested View ({id:?}) needs a size");
            };
            let mut owner = PipelineOwner::new();
            render = owner.create(Box::new(RenderView::new()));
            owner.set_root_node(Some(render));
            owner.set_root_constraints(Constraints::tight_for(size));
            let enclosing = self.node(id).pipeline;
            let nested = self.owner_mut(enclosing).adopt_child(owner);
            self.node_mut(id).pipeline = nested;
            Some(enclosing)
        } else {
            let owner = &mut self.pipeline;
            render = owner.create(Box::new(RenderView::new()));
            owner.set_root_node(Some(render));
            if let Some(size) = view.size {
                owner.set_root_constraints(Constraints::tight_for(size));
            }
            None
        };
        self.node_mut(id).kind = ElementKind::View {
            render,
            child: None,
            enclosing,
        };
        let child = self.update_child(id, None, view.child.clone(), Slot::FIRST);
        self.set_single_child(id, child);
    }

    /// Builds a component element and reconciles its single child.
    pub(crate) fn rebuild(&mut self, id: ElementId) {
        let widget = self.shared_widget(id);
        if !matches!(self.node(id).kind, ElementKind::Component { .. }) {
            self.node_mut(id).dirty = false;
            return;
        }
        let built = self.build_component(id, &widget);
        self.flush_build_requests();

        let node = self.node_mut(id);
        node.dirty = false;
        let slot = node.slot;
        let child = match &node.kind {
            ElementKind::Component { child, .. } => *child,
            _ => None,
        };
        self.stats.rebuilt += 1;
        let child = self.reconcile_child(Some(id), child, built, slot);
        self.set_single_child(id, Some(child));
    }

    fn build_component(&mut self, id: ElementId, widget: &WidgetRef) -> WidgetRef {
        let mut cx = BuildContext {
            element: id,
            now: self.now,
            callbacks: &mut self.callbacks,
            build_requests: &mut self.build_owner.build_requests,
        };
        match widget.kind() {
            WidgetKind::Stateless(stateless) => stateless.build(&mut cx),
            WidgetKind::Proxy(proxy) => Rc::clone(proxy.child()),
            WidgetKind::Stateful(_) => {
                let state = match self.elements.get_mut(id).map(|node| &mut node.kind) {
                    Some(ElementKind::Component {
                        state: Some(state), ..
                    }) => state,
                    _ => panic!("{} ({id:?}) lost its state", widget.debug_name()),
                };
                state.build_dyn(&**widget, &mut cx)
            }
            WidgetKind::Render(_) | WidgetKind::View(_) => {
                panic!("{} ({id:?}) is not a component", widget.debug_name())
            }
        }
    }

    /// Reconfigures `id` with `widget`, which [`can_update`] its current one.
    fn update(&mut self, id: ElementId, widget: WidgetRef) {
        let old = std::mem::replace(&mut self.node_mut(id).widget, Rc::clone(&widget));
        self.stats.updated += 1;
        match widget.kind() {
            WidgetKind::Stateless(_) => self.rebuild(id),
            WidgetKind::Stateful(_) => {
                let mut cx = BuildContext {
                    element: id,
                    now: self.now,
                    callbacks: &mut self.callbacks,
                    build_requests: &mut self.build_owner.build_requests,
                };
                if let Some(ElementKind::Component {
                    state: Some(state), ..
                }) = self.elements.get_mut(id).map(|node| &mut node.kind)
                {
                    state.did_update_widget_dyn(&*old, &*widget, &mut cx);
                }
                self.flush_build_requests();
                self.rebuild(id);
            }
            WidgetKind::Proxy(proxy) => {
                self.apply_parent_data_below(id, proxy);
                self.rebuild(id);
            }
            WidgetKind::Render(render_widget) => {
                let node = self.node(id);
                let pipeline = node.pipeline;
                if let Some(render) = node.kind.render() {
                    let result = self
                        .tree_mut(pipeline)
                        .update_dyn(render, |object| render_widget.update_render_dyn(object));
                    if let Err(err) = result {
                        panic!("{} ({id:?}): {err}", widget.debug_name());
                    }
                }
                self.update_render_children(id, render_widget);
                self.node_mut(id).dirty = false;
            }
            WidgetKind::View(view) => self.update_view(id, view),
        }
    }

    fn update_render_children(&mut self, id: ElementId, widget: &dyn DynRenderObjectWidget) {
        match widget.child_widgets() {
            WidgetChildren::None => {}
            WidgetChildren::Single(child) => {
                let old = match &self.node(id).kind {
                    ElementKind::SingleChildRender { child, .. } => *child,
                    other => panic!("{} ({id:?}) cannot take a single child", other.name()),
                };
                let child = self.update_child(id, old, child.cloned(), Slot::FIRST);
                self.set_single_child(id, child);
            }
            WidgetChildren::Many(widgets) => {
                let old = match &mut self.node_mut(id).kind {
                    ElementKind::MultiChildRender { children, .. } => std::mem::take(children),
                    other => panic!("{} ({id:?}) cannot take a child list", other.name()),
                };
                let children = self.update_children(id, old, widgets);
                if let ElementKind::MultiChildRender {
                    children: current,
                    forgotten,
                    ..
                } = &mut self.node_mut(id).kind
                {
                    *current = children;
                    forgotten.clear();
                }
            }
        }
    }

    fn update_view(&mut self, id: ElementId, view: &View) {
        let node = self.node(id);
        let pipeline = node.pipeline;
        let (child, enclosing) = match &node.kind {
            ElementKind::View {
                child, enclosing, ..
            } => (*child, *enclosing),
            other => panic!("{} ({id:?}) is not a view", other.name()),
        };
        match (enclosing, view.size) {
            (Some(_), None) => panic!("nested View ({id:?}) needs a size"),
            (_, Some(size)) => self
                .owner_mut(pipeline)
                .set_root_constraints(Constraints::tight_for(size)),
            (None, None) => {}
        }
        let child = self.update_child(id, child, view.child.clone(), Slot::FIRST);
        self.set_single_child(id, child);
    }

    fn apply_parent_data_below(&mut self, id: ElementId, proxy: &dyn ProxyWidget) {
        let Some((pipeline, render)) = self.render_object(id) else {
            return;
        };
        self.tree_mut(pipeline)
            .update_parent_data(render, |data| proxy.apply_parent_data(data));
    }

    fn set_single_child(&mut self, id: ElementId, new_child: Option<ElementId>) {
        match &mut self.node_mut(id).kind {
            ElementKind::Component { child, .. }
            | ElementKind::SingleChildRender { child, .. }
            | ElementKind::View { child, .. } => *child = new_child,
            other => panic!("{} ({id:?}) has no single child", other.name()),
        }
    }

    fn set_child_list(&mut self, id: ElementId, new_children: Vec<ElementId>) {
        match &mut self.node_mut(id).kind {
            ElementKind::MultiChildRender { children, .. } => *children = new_children,
            other => panic!("{} ({id:?}) has no child list", other.name()),
        }
    }

    fn redepth(&mut self, id: ElementId, depth: usize) {
        let mut stack: SmallVec<[(ElementId, usize); 16]> = SmallVec::new();
        stack.push((id, depth));
        while let Some((current, depth)) = stack.pop() {
            let node = self.node_mut(current);
            if node.depth == depth && current != id {
                continue;
            }
            node.depth = depth;
            stack.extend(node.kind.children().into_iter().map(|child| (child, depth + 1)));
        }
    }

    fn activate_with_parent(&mut self, id: ElementId, parent: Option<ElementId>, slot: Slot) {
        let (depth, pipeline) = self.child_position(parent);
        let node = self.node_mut(id);
        let home = Self::home_pipeline(node);
        assert_eq!(
            home,
            pipeline,
            "{} ({id:?}) cannot move from {home} to {pipeline}",
            node.widget.debug_name()
        );
        node.parent = parent;
        self.redepth(id, depth);
        self.activate_recursively(id);
        self.attach_render_object(id, slot);
    }

    fn activate_recursively(&mut self, id: ElementId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node_mut(current);
            node.lifecycle = Lifecycle::Active;
            let stateful = match &mut node.kind {
                ElementKind::Component {
                    state: Some(state), ..
                } => {
                    state.activate_dyn();
                    true
                }
                _ => false,
            };
            stack.extend(node.kind.children());
            if stateful {
                self.mark_needs_build(current);
            }
        }
    }

    /// Removes `child` from the live tree. It stays mounted in the inactive
    /// set until [`Framework::finalize_tree`] runs or a global key retakes it.
    pub(crate) fn deactivate_child(&mut self, child: ElementId) {
        self.node_mut(child).parent = None;
        self.detach_render_object(child);
        self.build_owner.inactive.insert(child);
        let mut stack = vec![child];
        while let Some(current) = stack.pop() {
            let node = self.node_mut(current);
            stack.extend(node.kind.children());
            if node.lifecycle != Lifecycle::Active {
                continue;
            }
            node.lifecycle = Lifecycle::Inactive;
            node.dirty = false;
            if let ElementKind::Component {
                state: Some(state), ..
            } = &mut node.kind
            {
                state.deactivate_dyn();
            }
            self.stats.deactivated += 1;
        }
        trace!("deactivated {child:?}");
    }

    pub(crate) fn unmount_subtree(&mut self, id: ElementId) {
        let Some(node) = self.elements.get(id) else {
            return;
        };
        for child in node.kind.children() {
            self.unmount_subtree(child);
        }
        self.unmount(id);
    }

    fn unmount(&mut self, id: ElementId) {
        let Some(node) = self.elements.remove(id) else {
            return;
        };
        self.stats.unmounted += 1;
        self.unregister_global_key(id, &node.widget);
        trace!("unmounted {} ({id:?})", node.widget.debug_name());
        match node.kind {
            ElementKind::Component { state, .. } => {
                if let Some(mut state) = state {
                    state.dispose_dyn();
                }
            }
            ElementKind::LeafRender { render }
            | ElementKind::SingleChildRender { render, .. }
            | ElementKind::MultiChildRender { render, .. } => {
                self.owner_mut(node.pipeline).dispose(render);
            }
            ElementKind::View {
                enclosing: Some(enclosing),
                ..
            } => {
                self.owner_mut(enclosing).drop_child(node.pipeline);
            }
            ElementKind::View {
                render,
                enclosing: None,
                ..
            } => {
                let owner = &mut self.pipeline;
                if owner.root_node() == Some(render) {
                    owner.set_root_node(None);
                }
                owner.dispose(render);
            }
        }
    }

    /// Inserts the render objects of `id`'s subtree into the ancestor render
    /// object at `slot`.
    fn attach_render_object(&mut self, id: ElementId, slot: Slot) {
        let node = self.node_mut(id);
        node.slot = slot;
        let (child, render) = match &node.kind {
            ElementKind::Component { child, .. } => (*child, None),
            ElementKind::View { .. } => (None, None),
            kind => (None, kind.render()),
        };
        if let Some(child) = child {
            self.attach_render_object(child, slot);
        }
        if let Some(render) = render {
            self.insert_render_child(id, render, slot);
        }
    }

    fn insert_render_child(&mut self, id: ElementId, render: RenderId, slot: Slot) {
        let Some((ancestor, parent_render)) = self.ancestor_render_element(id) else {
            return;
        };
        let pipeline = self.node(id).pipeline;
        let after = self.render_sibling_before(ancestor, parent_render, pipeline, slot);
        let proxies = self.proxies_between(id, ancestor);
        let tree = self.tree_mut(pipeline);
        tree.insert_child(parent_render, render, after);
        for widget in proxies {
            if let WidgetKind::Proxy(proxy) = widget.kind() {
                tree.update_parent_data(render, |data| proxy.apply_parent_data(data));
            }
        }
    }

    fn detach_render_object(&mut self, id: ElementId) {
        let node = self.node(id);
        let pipeline = node.pipeline;
        match &node.kind {
            ElementKind::Component { child, .. } => {
                if let Some(child) = *child {
                    self.detach_render_object(child);
                }
            }
            ElementKind::View { .. } => {}
            kind => {
                if let Some(render) = kind.render() {
                    let tree = self.tree_mut(pipeline);
                    if let Some(parent) = tree.parent(render) {
                        tree.remove_child(parent, render);
                    }
                }
            }
        }
    }

    fn update_slot_for_child(&mut self, id: ElementId, slot: Slot) {
        let node = self.node_mut(id);
        node.slot = slot;
        match &node.kind {
            ElementKind::Component { child, .. } => {
                if let Some(child) = *child {
                    self.update_slot_for_child(child, slot);
                }
            }
            ElementKind::View { .. } => {}
            kind => {
                if let Some(render) = kind.render() {
                    self.move_render_child(id, render, slot);
                }
            }
        }
    }

    fn move_render_child(&mut self, id: ElementId, render: RenderId, slot: Slot) {
        let Some((ancestor, parent_render)) = self.ancestor_render_element(id) else {
            return;
        };
        if !matches!(self.node(ancestor).kind, ElementKind::MultiChildRender { .. }) {
            return;
        }
        let pipeline = self.node(id).pipeline;
        if self.tree(pipeline).parent(render) != Some(parent_render) {
            return;
        }
        let after = self.render_sibling_before(ancestor, parent_render, pipeline, slot);
        if after == Some(render) {
            return;
        }
        self.tree_mut(pipeline).move_child(parent_render, render, after);
    }

    /// Nearest ancestor element that owns a render object, with that object.
    fn ancestor_render_element(&self, id: ElementId) -> Option<(ElementId, RenderId)> {
        let mut current = self.node(id).parent;
        while let Some(ancestor) = current {
            let node = self.node(ancestor);
            if let Some(render) = node.kind.render() {
                return Some((ancestor, render));
            }
            current = node.parent;
        }
        None
    }

    /// Render object that a child at `slot` goes right after, resolved
    /// through the slot's previous siblings. `None` means first.
    fn render_sibling_before(
        &self,
        ancestor: ElementId,
        parent_render: RenderId,
        pipeline: PipelineId,
        slot: Slot,
    ) -> Option<RenderId> {
        if !matches!(self.node(ancestor).kind, ElementKind::MultiChildRender { .. }) {
            return None;
        }
        let tree = self.tree(pipeline);
        let mut previous = slot.previous;
        while let Some(sibling) = previous {
            if let Some((_, render)) = self.render_object(sibling) {
                if tree.parent(render) == Some(parent_render) {
                    return Some(render);
                }
            }
            previous = self.elements.get(sibling).and_then(|node| node.slot.previous);
        }
        None
    }

    /// Proxy widgets between `id` and `ancestor`, outermost first.
    fn proxies_between(&self, id: ElementId, ancestor: ElementId) -> Vec<WidgetRef> {
        let mut proxies = Vec::new();
        let mut current = self.node(id).parent;
        while let Some(element) = current {
            if element == ancestor {
                break;
            }
            let node = self.node(element);
            if matches!(node.widget.kind(), WidgetKind::Proxy(_)) {
                proxies.push(Rc::clone(&node.widget));
            }
            current = node.parent;
        }
        proxies.reverse();
        proxies
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
