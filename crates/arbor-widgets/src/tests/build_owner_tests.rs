use std::cell::Cell;
use std::rc::Rc;

use crate::test_support::{first_child, mount, take_events, Tracked};
use crate::widgets::Flex;
use crate::{ElementId, Framework, WidgetRef};

fn two_tracked(framework: &mut Framework) -> (ElementId, ElementId) {
    let row: WidgetRef = Rc::new(Flex::row(vec![
        Rc::new(Tracked::new("a")),
        Rc::new(Tracked::new("b")),
    ]));
    let root = mount(framework, row);
    let children = framework.children(first_child(framework, root));
    (children[0], children[1])
}

#[test]
fn mark_needs_build_ignores_unknown_elements() {
    let mut framework = Framework::new();
    framework.mark_needs_build(ElementId::default());
    assert!(framework.build_owner().dirty_elements().is_empty());
    assert!(!framework.is_dirty(ElementId::default()));
}

#[test]
fn marking_twice_lists_the_element_once() {
    let mut framework = Framework::new();
    let (a, _) = two_tracked(&mut framework);
    framework.mark_needs_build(a);
    framework.mark_needs_build(a);
    assert_eq!(framework.build_owner().dirty_elements(), &[a]);
}

#[test]
fn build_scheduled_hook_is_edge_triggered() {
    let mut framework = Framework::new();
    let (a, b) = two_tracked(&mut framework);
    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    framework.set_on_build_scheduled(Some(Rc::new(move || counter.set(counter.get() + 1))));

    framework.mark_needs_build(a);
    framework.mark_needs_build(b);
    assert_eq!(fired.get(), 1);

    framework.build_scope();
    assert!(!framework.is_dirty(a));
    assert!(!framework.is_dirty(b));

    framework.mark_needs_build(b);
    assert_eq!(fired.get(), 2);
}

#[test]
fn build_scope_clears_the_dirty_list() {
    let mut framework = Framework::new();
    let (a, b) = two_tracked(&mut framework);
    take_events();
    framework.mark_needs_build(a);
    framework.mark_needs_build(b);
    framework.build_scope();

    assert_eq!(take_events(), vec!["build a", "build b"]);
    assert!(framework.build_owner().dirty_elements().is_empty());
    assert!(!framework.build_owner().is_building());
}

#[test]
fn build_scope_with_runs_the_callback_first() {
    let mut framework = Framework::new();
    let (a, _) = two_tracked(&mut framework);
    take_events();
    framework.build_scope_with(|framework| {
        framework.mark_needs_build(a);
        assert!(!framework.build_owner().is_building());
    });
    assert_eq!(take_events(), vec!["build a"]);
}

#[test]
fn finalize_without_inactive_elements_is_a_no_op() {
    let mut framework = Framework::new();
    two_tracked(&mut framework);
    let unmounted = framework.stats().unmounted;
    framework.finalize_tree();
    assert_eq!(framework.stats().unmounted, unmounted);
    assert_eq!(framework.build_owner().inactive_len(), 0);
}
