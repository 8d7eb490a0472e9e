//! Dirty-element scheduling and end-of-frame unmounting.

use std::cmp::Reverse;
use std::rc::Rc;

use indexmap::IndexSet;
use log::{debug, trace};
use rustc_hash::FxBuildHasher;

use crate::element::{ElementId, Lifecycle};
use crate::framework::Framework;

/// Bookkeeping for elements waiting to be rebuilt or unmounted.
#[derive(Default)]
pub struct BuildOwner {
    pub(crate) dirty: Vec<ElementId>,
    pub(crate) inactive: IndexSet<ElementId, FxBuildHasher>,
    pub(crate) dirty_needs_resort: bool,
    /// Raised when the scheduled hook has fired and the host has not built yet.
    pub(crate) build_scheduled: bool,
    pub(crate) building: bool,
    /// Elements marked from inside a build, applied when that build returns.
    pub(crate) build_requests: Vec<ElementId>,
    on_build_scheduled: Option<Rc<dyn Fn()>>,
}

impl BuildOwner {
    pub fn dirty_elements(&self) -> &[ElementId] {
        &self.dirty
    }

    pub fn inactive_len(&self) -> usize {
        self.inactive.len()
    }

    pub fn is_building(&self) -> bool {
        self.building
    }
}

impl Framework {
    /// Installs the hook fired the first time an element goes dirty after a
    /// build scope.
    pub fn set_on_build_scheduled(&mut self, hook: Option<Rc<dyn Fn()>>) {
        self.build_owner.on_build_scheduled = hook;
    }

    pub fn build_owner(&self) -> &BuildOwner {
        &self.build_owner
    }

    /// Marks an active element for rebuild in the next build scope. A no-op
    /// for elements that are missing or not active.
    pub fn mark_needs_build(&mut self, id: ElementId) {
        let Some(node) = self.elements.get_mut(id) else {
            return;
        };
        if node.lifecycle != Lifecycle::Active || node.dirty {
            return;
        }
        node.dirty = true;
        self.schedule_build_for(id);
    }

    pub(crate) fn schedule_build_for(&mut self, id: ElementId) {
        let node = self.node_mut(id);
        if node.in_dirty_list {
            self.build_owner.dirty_needs_resort = true;
            return;
        }
        node.in_dirty_list = true;
        let owner = &mut self.build_owner;
        if !owner.build_scheduled && !owner.building {
            owner.build_scheduled = true;
            if let Some(hook) = &owner.on_build_scheduled {
                hook();
            }
        }
        owner.dirty.push(id);
    }

    /// Runs `callback` and then rebuilds every dirty element, shallowest first.
    pub fn build_scope_with(&mut self, callback: impl FnOnce(&mut Framework)) {
        callback(self);
        self.build_scope();
    }

    /// Rebuilds every dirty element, shallowest first. Elements dirtied by a
    /// rebuild are merged into the same pass.
    pub fn build_scope(&mut self) {
        if self.build_owner.dirty.is_empty() {
            self.build_owner.build_scheduled = false;
            return;
        }
        assert!(
            !self.build_owner.building,
            "build scope entered while already building"
        );
        self.build_owner.building = true;
        self.sort_dirty_elements();

        let mut index = 0;
        let mut dirty_count = self.build_owner.dirty.len();
        let mut rebuilt = 0;
        while index < dirty_count {
            let id = self.build_owner.dirty[index];
            if self.rebuild_if_dirty(id) {
                rebuilt += 1;
            }
            index += 1;
            if dirty_count < self.build_owner.dirty.len() || self.build_owner.dirty_needs_resort {
                self.sort_dirty_elements();
                dirty_count = self.build_owner.dirty.len();
                while index > 0 && self.is_dirty(self.build_owner.dirty[index - 1]) {
                    index -= 1;
                }
            }
        }

        for id in std::mem::take(&mut self.build_owner.dirty) {
            if let Some(node) = self.elements.get_mut(id) {
                node.in_dirty_list = false;
                node.dirty = false;
            }
        }
        self.build_owner.building = false;
        self.build_owner.build_scheduled = false;
        debug!("build scope rebuilt {rebuilt} elements");
    }

    fn sort_dirty_elements(&mut self) {
        let elements = &self.elements;
        self.build_owner
            .dirty
            .sort_by_key(|id| elements.get(*id).map(|node| (node.depth, node.dirty)));
        self.build_owner.dirty_needs_resort = false;
    }

    fn rebuild_if_dirty(&mut self, id: ElementId) -> bool {
        let Some(node) = self.elements.get(id) else {
            return false;
        };
        if node.lifecycle != Lifecycle::Active || !node.dirty {
            trace!("skipping rebuild of {id:?}");
            return false;
        }
        self.rebuild(id);
        true
    }

    /// Applies `mark_needs_build` calls made through a [`BuildContext`](crate::BuildContext).
    pub(crate) fn flush_build_requests(&mut self) {
        if self.build_owner.build_requests.is_empty() {
            return;
        }
        for id in std::mem::take(&mut self.build_owner.build_requests) {
            self.mark_needs_build(id);
        }
    }

    /// Unmounts every element still inactive at the end of the frame,
    /// deepest first.
    pub fn finalize_tree(&mut self) {
        if self.build_owner.inactive.is_empty() {
            return;
        }
        let mut inactive: Vec<ElementId> = self.build_owner.inactive.drain(..).collect();
        let elements = &self.elements;
        inactive.sort_by_key(|id| Reverse(elements.get(*id).map(|node| node.depth)));
        let count = inactive.len();
        for id in inactive {
            if self.elements.contains_key(id) {
                self.unmount_subtree(id);
            }
        }
        debug!("finalized {count} inactive subtrees");
    }
}

#[cfg(test)]
#[path = "tests/build_owner_tests.rs"]
mod tests;
