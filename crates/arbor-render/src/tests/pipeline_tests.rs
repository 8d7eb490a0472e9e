use super::*;
use crate::objects::{RenderFill, RenderOpacity, RenderView};
use crate::renderer::PaintCx;
use crate::tree::LayoutCx;
use crate::Invalidation;
use arbor_geometry::{Color, Size};
use std::cell::{Cell, RefCell};

type Log = Rc<RefCell<Vec<&'static str>>>;

/// Lays out children as independent boundaries and records every layout and paint.
struct Logger {
    name: &'static str,
    log: Log,
    dirty_on_layout: Option<RenderId>,
}

impl Logger {
    fn boxed(name: &'static str, log: &Log) -> Box<dyn RenderObject> {
        Box::new(Logger {
            name,
            log: Rc::clone(log),
            dirty_on_layout: None,
        })
    }
}

impl RenderObject for Logger {
    fn perform_layout(&mut self, cx: &mut LayoutCx<'_>) -> Size {
        self.log.borrow_mut().push(self.name);
        if let Some(target) = self.dirty_on_layout.take() {
            cx.invoke_layout_callback(|tree| tree.mark_needs_layout(target));
        }
        let inner = cx.constraints().loosen();
        for child in cx.children() {
            cx.layout_child(child, inner, false);
        }
        cx.constraints().biggest()
    }

    fn perform_paint(&mut self, cx: &mut PaintCx<'_>) {
        self.log.borrow_mut().push(self.name);
        cx.paint_children();
    }
}

fn attach(owner: &mut PipelineOwner, parent: RenderId, child: RenderId) {
    let after = owner.tree().children(parent).last().copied();
    owner.tree_mut().insert_child(parent, child, after);
}

fn frame(owner: &mut PipelineOwner) -> Option<DisplayListHandle> {
    owner.flush_layout();
    owner.flush_compositing_bits();
    owner.flush_paint()
}

#[test]
fn nodes_dirtied_by_a_layout_callback_merge_into_the_current_batch() {
    let log: Log = Rc::default();
    let mut owner = PipelineOwner::new();
    let root = owner.create(Logger::boxed("root", &log));
    let a = owner.create(Logger::boxed("a", &log));
    let b = owner.create(Logger::boxed("b", &log));
    let mid = owner.create(Logger::boxed("mid", &log));
    let c = owner.create(Logger::boxed("c", &log));
    attach(&mut owner, root, a);
    attach(&mut owner, root, b);
    attach(&mut owner, root, mid);
    attach(&mut owner, mid, c);
    owner.set_root_node(Some(root));
    owner.set_root_constraints(Constraints::tight(100.0, 100.0));
    owner.flush_layout();
    log.borrow_mut().clear();

    owner
        .tree_mut()
        .update::<Logger>(a, |logger| {
            logger.dirty_on_layout = Some(b);
            Invalidation::LAYOUT
        })
        .expect("a exists");
    owner.tree_mut().mark_needs_layout(c);
    owner.flush_layout();

    // b is shallower than c, so it runs before c even though it was
    // dirtied after the batch started.
    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    assert_eq!(owner.stats().layout_passes, 2);
    assert_eq!(owner.stats().boundaries_laid_out, 3);
    assert!(owner.tree().layout_worklist().is_empty());
}

#[test]
fn layout_flush_skips_boundaries_already_laid_out_by_an_ancestor() {
    let log: Log = Rc::default();
    let mut owner = PipelineOwner::new();
    let root = owner.create(Logger::boxed("root", &log));
    let child = owner.create(Logger::boxed("child", &log));
    attach(&mut owner, root, child);
    owner.set_root_node(Some(root));
    owner.set_root_constraints(Constraints::tight(100.0, 100.0));
    owner.flush_layout();
    log.borrow_mut().clear();

    owner.tree_mut().mark_needs_layout(child);
    owner.set_root_constraints(Constraints::tight(50.0, 50.0));
    owner.flush_layout();

    assert_eq!(*log.borrow(), vec!["root", "child"]);
    assert_eq!(owner.stats().boundaries_laid_out, 1);
}

#[test]
fn paint_flush_records_deepest_nodes_first() {
    let log: Log = Rc::default();
    let mut owner = PipelineOwner::new();
    let root = owner.create(Logger::boxed("root", &log));
    let mid = owner.create(Logger::boxed("mid", &log));
    let leaf = owner.create(Logger::boxed("leaf", &log));
    attach(&mut owner, root, mid);
    attach(&mut owner, mid, leaf);
    owner.set_root_node(Some(root));
    owner.set_root_constraints(Constraints::tight(100.0, 100.0));
    frame(&mut owner);
    log.borrow_mut().clear();

    let tree = owner.tree_mut();
    tree.mark_needs_paint(root);
    tree.mark_needs_paint(mid);
    tree.mark_needs_paint(leaf);
    frame(&mut owner);

    assert_eq!(*log.borrow(), vec!["leaf", "mid", "root"]);
    assert_eq!(owner.stats().paint_roots, 3);
}

#[test]
fn clean_frame_reuses_the_root_list() {
    let mut owner = PipelineOwner::new();
    let view = owner.create(Box::new(RenderView::new()));
    let fill = owner.create(Box::new(RenderFill::new(Color::RED)));
    attach(&mut owner, view, fill);
    owner.set_root_node(Some(view));
    owner.set_root_constraints(Constraints::tight(100.0, 100.0));

    let first = frame(&mut owner).expect("root painted");
    let recordings = owner.renderer().recordings();
    let second = frame(&mut owner).expect("root painted");

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(owner.renderer().recordings(), recordings);
    assert!(!owner.needs_visual_update());
}

#[test]
fn compositing_bits_follow_opacity_layers() {
    let mut owner = PipelineOwner::new();
    let view = owner.create(Box::new(RenderView::new()));
    let opacity = owner.create(Box::new(RenderOpacity::new(1.0)));
    let fill = owner.create(Box::new(RenderFill::new(Color::RED)));
    attach(&mut owner, view, opacity);
    attach(&mut owner, opacity, fill);
    owner.set_root_node(Some(view));
    owner.set_root_constraints(Constraints::tight(100.0, 100.0));
    frame(&mut owner);
    assert!(owner.tree().needs_compositing(view));
    assert!(!owner.tree().needs_compositing(opacity));

    owner
        .tree_mut()
        .update::<RenderOpacity>(opacity, |opacity| opacity.set_opacity(0.5))
        .expect("opacity exists");
    owner.flush_compositing_bits();
    assert!(owner.tree().needs_compositing(opacity));
}

#[test]
fn adopted_pipelines_flush_with_their_parent() {
    let requests = Rc::new(Cell::new(0));
    let mut parent = PipelineOwner::new();
    let counter = Rc::clone(&requests);
    parent.set_on_need_visual_update(Some(Rc::new(move || counter.set(counter.get() + 1))));

    let mut nested = PipelineOwner::new();
    let nested_root = nested.create(Box::new(RenderView::new()));
    nested.set_root_node(Some(nested_root));
    nested.set_root_constraints(Constraints::tight(10.0, 10.0));
    let nested_id = parent.adopt_child(nested);
    assert_eq!(requests.get(), 1);
    assert!(parent.needs_visual_update());

    parent.flush_layout();
    parent.flush_compositing_bits();
    parent.flush_paint();
    let nested = parent.find(nested_id).expect("nested pipeline adopted");
    assert_eq!(nested.tree().size(nested_root), Some(Size::new(10.0, 10.0)));
    assert!(nested.last_paint().is_some());
    assert!(!parent.needs_visual_update());

    parent
        .find_mut(nested_id)
        .expect("nested pipeline adopted")
        .tree_mut()
        .mark_needs_paint(nested_root);
    assert_eq!(requests.get(), 2);

    let dropped = parent.drop_child(nested_id).expect("nested pipeline adopted");
    assert_eq!(dropped.id(), nested_id);
    assert!(parent.children().is_empty());
}

#[test]
fn disposing_a_node_evicts_its_cached_paint() {
    let mut owner = PipelineOwner::new();
    let view = owner.create(Box::new(RenderView::new()));
    let fill = owner.create(Box::new(RenderFill::new(Color::RED)));
    attach(&mut owner, view, fill);
    owner.set_root_node(Some(view));
    owner.set_root_constraints(Constraints::tight(100.0, 100.0));
    frame(&mut owner);
    assert!(owner.renderer().cached(fill).is_some());

    owner.tree_mut().remove_child(view, fill);
    owner.dispose(fill);

    assert!(owner.renderer().cached(fill).is_none());
    assert!(!owner.tree().contains(fill));
    let list = frame(&mut owner).expect("root painted");
    assert!(list.flatten().is_empty());
}

#[test]
fn dump_tree_names_the_pipeline_and_its_nodes() {
    let mut owner = PipelineOwner::new();
    let view = owner.create(Box::new(RenderView::new()));
    owner.set_root_node(Some(view));
    owner.set_root_constraints(Constraints::tight(8.0, 8.0));
    frame(&mut owner);

    let dump = owner.dump_tree();
    assert!(dump.starts_with(&owner.id().to_string()));
    assert!(dump.contains("RenderView 8x8 [boundary]"));
}
