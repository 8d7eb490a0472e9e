use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use arbor_geometry::{Constraints, Point, Size};
use arbor_render::{
    DisplayListHandle, PipelineId, PipelineOwner, RenderId, RenderTree, ScenePrimitive,
};
use arbor_widgets::widgets::{PointerEvent, PointerEventKind, PointerHandler, RenderPointerListener};
use arbor_widgets::{ElementId, Framework, View, WidgetRef};
use log::{debug, trace};
use web_time::Instant;

use crate::frame_stats::{FrameStats, FrameTracker};
use crate::hit_path_tracker::{HitPathTracker, PointerId};

/// Development options for debugging and performance monitoring.
///
/// Dumps go to the `log` facade at debug level once per frame.
#[derive(Clone, Debug, Default)]
pub struct DevOptions {
    /// Log the render tree of every pipeline after paint.
    pub dump_render_tree: bool,
    /// Log the element tree after the build phase.
    pub dump_element_tree: bool,
    /// Log per-phase timings and the rolling frame rate.
    pub log_frame_timing: bool,
}

/// Wall time spent in each phase of one frame pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameTimings {
    pub callbacks: Duration,
    pub build: Duration,
    pub layout: Duration,
    pub compositing: Duration,
    pub paint: Duration,
    pub finalize: Duration,
}

impl FrameTimings {
    pub fn total(&self) -> Duration {
        self.callbacks + self.build + self.layout + self.compositing + self.paint + self.finalize
    }
}

/// Output of [`Shell::deliver_frame`].
#[derive(Clone, Debug)]
pub struct Frame {
    /// Display list of the root view.
    pub display_list: Option<DisplayListHandle>,
    /// Display lists of nested views, parents before children.
    pub nested: Vec<(PipelineId, DisplayListHandle)>,
    pub timings: FrameTimings,
}

impl Frame {
    /// The root view's commands resolved into absolute fills.
    pub fn primitives(&self) -> Vec<ScenePrimitive> {
        self.display_list
            .as_ref()
            .map(|list| list.flatten())
            .unwrap_or_default()
    }
}

/// Edge-triggered "please schedule a frame" signal shared with the build
/// owner and pipeline hooks.
#[derive(Default)]
struct FrameRequest {
    requested: Cell<bool>,
    in_frame: Cell<bool>,
    hook: RefCell<Option<Rc<dyn Fn()>>>,
}

impl FrameRequest {
    fn request(&self) {
        if self.requested.get() {
            return;
        }
        self.requested.set(true);
        if self.in_frame.get() {
            return;
        }
        let hook = self.hook.borrow().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

/// Drives one top-level view: owns the element tree, its build owner, and
/// the root pipeline owner.
pub struct Shell {
    framework: Framework,
    request: Rc<FrameRequest>,
    pending_root: Option<WidgetRef>,
    hit_path_tracker: HitPathTracker,
    frame_tracker: FrameTracker,
    dev_options: DevOptions,
}

impl Shell {
    /// Mounts `child` under a root [`View`]. Nothing is laid out until the
    /// first [`deliver_frame`](Self::deliver_frame).
    pub fn new(child: WidgetRef) -> Self {
        let mut framework = Framework::new();
        let request = Rc::new(FrameRequest::default());
        let hook: Rc<dyn Fn()> = {
            let request = Rc::clone(&request);
            Rc::new(move || request.request())
        };
        framework.set_on_build_scheduled(Some(Rc::clone(&hook)));
        framework.pipeline_mut().set_on_need_visual_update(Some(hook));
        framework.build_scope_with(|framework| {
            framework.mount_root(Rc::new(View::new(child)));
        });
        request.requested.set(true);

        Self {
            framework,
            request,
            pending_root: None,
            hit_path_tracker: HitPathTracker::new(),
            frame_tracker: FrameTracker::new(),
            dev_options: DevOptions::default(),
        }
    }

    pub fn framework(&self) -> &Framework {
        &self.framework
    }

    pub fn framework_mut(&mut self) -> &mut Framework {
        &mut self.framework
    }

    pub fn root_element(&self) -> Option<ElementId> {
        self.framework.root()
    }

    pub fn pipeline(&self) -> &PipelineOwner {
        self.framework.pipeline()
    }

    pub fn set_dev_options(&mut self, options: DevOptions) {
        self.dev_options = options;
    }

    pub fn dev_options(&self) -> &DevOptions {
        &self.dev_options
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.frame_tracker.stats()
    }

    /// Installs the hook fired when the shell goes from idle to needing a
    /// frame. It fires at most once until the next frame is delivered.
    pub fn set_on_frame_requested(&mut self, hook: Option<Rc<dyn Fn()>>) {
        *self.request.hook.borrow_mut() = hook;
    }

    /// True when a frame would do any work.
    pub fn needs_frame(&self) -> bool {
        self.request.requested.get() || self.has_pending_work()
    }

    fn has_pending_work(&self) -> bool {
        self.pending_root.is_some()
            || self.framework.has_frame_callbacks()
            || !self.framework.build_owner().dirty_elements().is_empty()
            || self.framework.pipeline().needs_visual_update()
    }

    /// Replaces the root view's child on the next frame.
    pub fn set_root_widget(&mut self, child: WidgetRef) {
        self.pending_root = Some(child);
        self.request.request();
    }

    /// Runs one frame pass at `size` and returns what it painted.
    ///
    /// # Panics
    ///
    /// When a previous frame pass did not run to completion.
    pub fn deliver_frame(&mut self, size: Size, now: Duration) -> Frame {
        assert!(
            !self.request.in_frame.get(),
            "deliver_frame re-entered while a frame pass is in progress"
        );
        self.request.in_frame.set(true);
        let started = Instant::now();
        let stats_before = self.framework.stats();
        let mut timings = FrameTimings::default();

        self.framework
            .pipeline_mut()
            .set_root_constraints(Constraints::tight_for(size));

        let mark = Instant::now();
        self.framework.run_frame_callbacks(now);
        timings.callbacks = mark.elapsed();

        let mark = Instant::now();
        if let Some(child) = self.pending_root.take() {
            self.framework.mount_root(Rc::new(View::new(child)));
        }
        self.framework.build_scope();
        timings.build = mark.elapsed();
        if self.dev_options.dump_element_tree {
            debug!("element tree:\n{}", self.framework.dump_element_tree());
        }

        let pipeline = self.framework.pipeline_mut();
        let mark = Instant::now();
        pipeline.flush_layout();
        timings.layout = mark.elapsed();

        let mark = Instant::now();
        pipeline.flush_compositing_bits();
        timings.compositing = mark.elapsed();

        let mark = Instant::now();
        let display_list = pipeline.flush_paint();
        timings.paint = mark.elapsed();
        if self.dev_options.dump_render_tree {
            debug!("render tree:\n{}", self.framework.pipeline().dump_tree());
        }

        let mark = Instant::now();
        self.framework.finalize_tree();
        timings.finalize = mark.elapsed();

        let mut nested = Vec::new();
        collect_nested(self.framework.pipeline(), &mut nested);

        let rebuilds = self.framework.stats().rebuilt - stats_before.rebuilt;
        self.frame_tracker
            .record_frame(started, started.elapsed(), rebuilds);
        if self.dev_options.log_frame_timing {
            debug!(
                "frame at {now:?}: {timings:?}, {rebuilds} rebuilds, {}",
                self.frame_tracker.stats().display()
            );
        }

        self.request.in_frame.set(false);
        self.request.requested.set(false);
        if self.has_pending_work() {
            trace!("work pending after frame; requesting another");
            self.request.request();
        }

        Frame {
            display_list,
            nested,
            timings,
        }
    }

    /// Dispatches a pointer event to the pointer listeners under it, front
    /// to back, stopping once a handler consumes it. Returns whether any
    /// listener received the event.
    ///
    /// Listeners hit by `Down` keep receiving `Move`, `Up`, and `Cancel`
    /// until the pointer is released. Handlers may schedule work but the
    /// effects only show up in the next frame.
    pub fn deliver_pointer(&mut self, event: PointerEvent) -> bool {
        let pointer = PointerId::PRIMARY;
        let tree = self.framework.pipeline().tree();
        let targets = match event.kind {
            PointerEventKind::Down => {
                let hits = hit_test(tree, event.position);
                self.hit_path_tracker
                    .add_hit_path(pointer, hits.iter().map(|(id, _)| *id).collect());
                hits
            }
            PointerEventKind::Move if self.hit_path_tracker.has_path(pointer) => {
                self.hit_path_tracker.resolve(pointer, tree, event.position)
            }
            PointerEventKind::Move | PointerEventKind::Scroll => hit_test(tree, event.position),
            PointerEventKind::Up | PointerEventKind::Cancel => {
                let targets = self.hit_path_tracker.resolve(pointer, tree, event.position);
                self.hit_path_tracker.remove_path(pointer);
                targets
            }
        };

        let handlers: Vec<(PointerHandler, Point)> = targets
            .into_iter()
            .filter_map(|(id, local)| {
                let listener = tree.object::<RenderPointerListener>(id).ok()?;
                Some((listener.handler(), local))
            })
            .collect();
        if handlers.is_empty() {
            return false;
        }
        trace!("{:?} pointer event to {} listeners", event.kind, handlers.len());
        for (handler, local) in handlers {
            handler(&mut self.framework, &event, local);
            if event.is_consumed() {
                break;
            }
        }
        true
    }

    /// Drops every captured pointer path, e.g. when the host window loses focus.
    pub fn cancel_gestures(&mut self) {
        self.hit_path_tracker.clear();
    }
}

fn hit_test(tree: &RenderTree, position: Point) -> Vec<(RenderId, Point)> {
    tree.hit_test(position)
        .entries()
        .iter()
        .map(|entry| (entry.target, entry.local_position))
        .collect()
}

fn collect_nested(owner: &PipelineOwner, out: &mut Vec<(PipelineId, DisplayListHandle)>) {
    for child in owner.children() {
        if let Some(list) = child.last_paint() {
            out.push((child.id(), Rc::clone(list)));
        }
        collect_nested(child, out);
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
