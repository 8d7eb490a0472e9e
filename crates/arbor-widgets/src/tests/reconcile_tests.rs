use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use arbor_geometry::{Color, EdgeInsets, Size};
use arbor_render::{FlexFit, RenderId};

use crate::test_support::{
    color_box, first_child, keyed_row, mount, pump, remount, take_events, Tracked, TrackedState,
};
use crate::widgets::{
    AnimatedOpacityState, Builder, ColoredBox, Fill, Flex, Flexible, KeyedSubtree, Padding,
};
use crate::{ElementError, ElementId, Framework, GlobalKey, Lifecycle, View, WidgetRef};

fn render_of(framework: &Framework, id: ElementId) -> RenderId {
    framework
        .render_object(id)
        .map(|(_, render)| render)
        .expect("element has a render object")
}

fn render_children(framework: &Framework, id: ElementId) -> Vec<RenderId> {
    framework
        .pipeline()
        .tree()
        .children(render_of(framework, id))
        .to_vec()
}

#[test]
fn mount_builds_matching_render_tree() {
    let mut framework = Framework::new();
    let root = mount(&mut framework, keyed_row(&[1, 2, 3]));
    let row = first_child(&framework, root);
    let children = framework.children(row);

    assert_eq!(children.len(), 3);
    assert_eq!(framework.depth(row), Some(1));
    assert_eq!(framework.depth(children[2]), Some(2));
    assert_eq!(framework.stats().created, 5);

    let expected: Vec<RenderId> = children.iter().map(|c| render_of(&framework, *c)).collect();
    assert_eq!(render_children(&framework, row), expected);
    assert_eq!(
        framework.pipeline().tree().parent(render_of(&framework, row)),
        Some(render_of(&framework, root))
    );
    assert_eq!(framework.pipeline().root_node(), Some(render_of(&framework, root)));
}

#[test]
fn identical_widget_instance_is_not_revisited() {
    let mut framework = Framework::new();
    let row = keyed_row(&[1, 2]);
    mount(&mut framework, Rc::clone(&row));
    let before = framework.stats();

    remount(&mut framework, row);

    let after = framework.stats();
    assert_eq!(after.updated - before.updated, 1, "only the root view updates");
    assert_eq!(after.created, before.created);
}

#[test]
fn keyed_permutation_reuses_every_element() {
    let mut framework = Framework::new();
    let root = mount(&mut framework, keyed_row(&[1, 2, 3, 4, 5]));
    let row = first_child(&framework, root);
    let before = framework.children(row);
    let created = framework.stats().created;

    remount(&mut framework, keyed_row(&[5, 3, 1, 4, 2]));

    let after = framework.children(row);
    assert_eq!(framework.stats().created, created);
    assert_eq!(after, vec![before[4], before[2], before[0], before[3], before[1]]);

    let renders: Vec<RenderId> = after.iter().map(|c| render_of(&framework, *c)).collect();
    assert_eq!(render_children(&framework, row), renders);

    for (index, child) in after.iter().enumerate() {
        let slot = framework.slot(*child).unwrap();
        assert_eq!(slot.index, index);
        assert_eq!(slot.previous, index.checked_sub(1).map(|i| after[i]));
    }
}

#[test]
fn long_keyed_reversal_moves_every_render_object() {
    let keys: Vec<i64> = (0..2_000).collect();
    let reversed: Vec<i64> = keys.iter().rev().copied().collect();
    let mut framework = Framework::new();
    let root = mount(&mut framework, keyed_row(&keys));
    let row = first_child(&framework, root);
    let before = framework.children(row);
    let created = framework.stats().created;

    remount(&mut framework, keyed_row(&reversed));
    pump(&mut framework);

    let after = framework.children(row);
    assert_eq!(framework.stats().created, created);
    assert_eq!(framework.stats().unmounted, 0);
    let mut expected = before.clone();
    expected.reverse();
    assert_eq!(after, expected);
    let renders: Vec<RenderId> = after.iter().map(|c| render_of(&framework, *c)).collect();
    assert_eq!(render_children(&framework, row), renders);
}

/// Best of three mount-then-reverse passes over `count` keyed children.
fn mount_and_reverse_time(count: i64) -> Duration {
    let keys: Vec<i64> = (0..count).collect();
    let reversed: Vec<i64> = keys.iter().rev().copied().collect();
    let mut best = Duration::MAX;
    for _ in 0..3 {
        let forward_row = keyed_row(&keys);
        let reversed_row = keyed_row(&reversed);
        let mut framework = Framework::new();
        let started = Instant::now();
        mount(&mut framework, forward_row);
        remount(&mut framework, reversed_row);
        best = best.min(started.elapsed());
    }
    best
}

#[test]
fn keyed_reversal_cost_grows_linearly() {
    let small = mount_and_reverse_time(1_000);
    let large = mount_and_reverse_time(8_000);
    // Eight times the children; quadratic child bookkeeping lands near 64x.
    assert!(
        large < small * 24,
        "8000 children took {large:?} against {small:?} for 1000"
    );
}

#[test]
fn middle_insertion_and_removal() {
    let mut framework = Framework::new();
    let root = mount(&mut framework, keyed_row(&[1, 2, 3]));
    let row = first_child(&framework, root);
    let before = framework.children(row);
    let created = framework.stats().created;

    framework.mount_root(Rc::new(
        View::new(keyed_row(&[1, 4, 2])).with_size(Size::new(200.0, 100.0)),
    ));
    framework.build_scope();

    let after = framework.children(row);
    assert_eq!(framework.stats().created, created + 1);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[1]);
    assert_eq!(framework.lifecycle(before[2]), Lifecycle::Inactive);
    assert_eq!(framework.build_owner().inactive_len(), 1);

    let old_render = render_of(&framework, before[2]);
    assert_eq!(framework.pipeline().tree().parent(old_render), None);
    assert_eq!(render_children(&framework, row).len(), 3);

    framework.finalize_tree();
    assert_eq!(framework.lifecycle(before[2]), Lifecycle::Defunct);
    assert!(!framework.contains(before[2]));
    assert!(!framework.pipeline().tree().contains(old_render));
}

#[test]
fn unkeyed_children_update_by_position() {
    let mut framework = Framework::new();
    let root = mount(&mut framework, Rc::new(Flex::row(vec![color_box(), color_box()])));
    let row = first_child(&framework, root);
    let before = framework.children(row);

    remount(
        &mut framework,
        Rc::new(Flex::row(vec![color_box(), color_box(), color_box()])),
    );

    let after = framework.children(row);
    assert_eq!(after.len(), 3);
    assert_eq!(&after[..2], &before[..]);
}

#[test]
fn widget_type_change_replaces_the_element() {
    let mut framework = Framework::new();
    let padded = |child: WidgetRef| -> WidgetRef {
        Rc::new(Padding::new(EdgeInsets::all(4.0)).with_child(child))
    };
    let root = mount(&mut framework, padded(color_box()));
    let padding = first_child(&framework, root);
    let old_child = first_child(&framework, padding);

    remount(&mut framework, padded(Rc::new(Fill::new(Color::RED))));

    assert_eq!(first_child(&framework, root), padding);
    let new_child = first_child(&framework, padding);
    assert_ne!(new_child, old_child);
    assert!(!framework.contains(old_child));
    assert_eq!(render_children(&framework, padding), vec![render_of(&framework, new_child)]);
}

#[test]
#[should_panic(expected = "duplicate key")]
fn duplicate_sibling_keys_panic() {
    let mut framework = Framework::new();
    mount(&mut framework, keyed_row(&[1, 1]));
    remount(&mut framework, keyed_row(&[2]));
}

fn two_slots(key: GlobalKey, left: bool) -> WidgetRef {
    let slot = |occupied: bool| -> WidgetRef {
        let mut padding = Padding::new(EdgeInsets::all(2.0));
        if occupied {
            padding.child = Some(Rc::new(Tracked::new("moved").with_key(key)));
        }
        Rc::new(padding)
    };
    Rc::new(Flex::row(vec![slot(left), slot(!left)]))
}

#[test]
fn global_key_moves_state_to_a_later_parent() {
    let mut framework = Framework::new();
    let key = GlobalKey::new();
    let root = mount(&mut framework, two_slots(key, true));
    let element = framework.element_for_global_key(key).unwrap();
    framework
        .set_state::<TrackedState, _>(element, |state| state.value = 7)
        .unwrap();
    framework.build_scope();
    take_events();

    remount(&mut framework, two_slots(key, false));

    let row = first_child(&framework, root);
    let right = framework.children(row)[1];
    assert_eq!(framework.element_for_global_key(key), Some(element));
    assert_eq!(framework.parent(element), Some(right));
    assert_eq!(framework.lifecycle(element), Lifecycle::Active);
    assert_eq!(
        take_events(),
        vec!["deactivate moved", "activate moved", "update moved", "build moved"]
    );
    assert_eq!(
        framework.with_state::<TrackedState, _>(element, |state| state.value),
        Ok(7)
    );

    let body = first_child(&framework, element);
    assert_eq!(render_children(&framework, right), vec![render_of(&framework, body)]);
}

#[test]
fn global_key_moves_state_to_an_earlier_parent() {
    let mut framework = Framework::new();
    let key = GlobalKey::new();
    let root = mount(&mut framework, two_slots(key, false));
    let element = framework.element_for_global_key(key).unwrap();
    take_events();

    remount(&mut framework, two_slots(key, true));

    let row = first_child(&framework, root);
    let (left, right) = (framework.children(row)[0], framework.children(row)[1]);
    assert_eq!(framework.parent(element), Some(left));
    assert!(framework.children(right).is_empty());
    assert_eq!(
        take_events(),
        vec!["deactivate moved", "activate moved", "update moved", "build moved"]
    );
}

#[test]
fn global_key_retake_out_of_a_child_list_redepths() {
    let mut framework = Framework::new();
    let key = GlobalKey::new();
    let tracked = || -> WidgetRef { Rc::new(Tracked::new("moved").with_key(key)) };
    let root = mount(&mut framework, Rc::new(Flex::row(vec![tracked(), color_box()])));
    let element = framework.element_for_global_key(key).unwrap();
    let row = first_child(&framework, root);
    let sibling = framework.children(row)[1];
    assert_eq!(framework.depth(element), Some(2));

    remount(
        &mut framework,
        Rc::new(Flex::row(vec![
            Rc::new(Padding::new(EdgeInsets::all(1.0)).with_child(tracked())),
            color_box(),
        ])),
    );

    let children = framework.children(row);
    let padding = children[0];
    assert_eq!(children[1], sibling);
    assert_eq!(framework.parent(element), Some(padding));
    assert_eq!(framework.depth(element), Some(3));
    assert_eq!(framework.depth(first_child(&framework, element)), Some(4));
    assert_eq!(
        render_children(&framework, row),
        vec![render_of(&framework, padding), render_of(&framework, sibling)]
    );
    assert_eq!(
        render_children(&framework, padding),
        vec![render_of(&framework, element)]
    );
}

#[test]
#[should_panic(expected = "cannot move from")]
fn global_key_cannot_cross_pipelines() {
    let mut framework = Framework::new();
    let key = GlobalKey::new();
    let layout = |inside: bool| -> WidgetRef {
        let tracked: WidgetRef = Rc::new(Tracked::new("moved").with_key(key));
        let mut view = View::empty().with_size(Size::new(20.0, 20.0));
        let mut padding = Padding::new(EdgeInsets::ZERO);
        if inside {
            view.child = Some(tracked);
        } else {
            padding.child = Some(tracked);
        }
        Rc::new(Flex::row(vec![Rc::new(view), Rc::new(padding)]))
    };
    mount(&mut framework, layout(true));
    remount(&mut framework, layout(false));
}

#[test]
fn state_survives_rebuilds() {
    let mut framework = Framework::new();
    let root = mount(&mut framework, Rc::new(Tracked::new("a")));
    let element = first_child(&framework, root);
    framework
        .set_state::<TrackedState, _>(element, |state| state.value = 3)
        .unwrap();
    assert!(framework.is_dirty(element));
    framework.build_scope();

    remount(&mut framework, Rc::new(Tracked::new("a")));

    assert_eq!(first_child(&framework, root), element);
    let (value, builds) = framework
        .with_state::<TrackedState, _>(element, |state| (state.value, state.builds))
        .unwrap();
    assert_eq!(value, 3);
    assert_eq!(builds, 3);
}

#[test]
fn removed_state_is_deactivated_then_disposed() {
    let mut framework = Framework::new();
    let outer: WidgetRef = Rc::new(Tracked::new("outer").with_child(Rc::new(Tracked::new("inner"))));
    let root = mount(&mut framework, outer);
    let element = first_child(&framework, root);
    take_events();

    framework.mount_root(Rc::new(View::new(color_box()).with_size(Size::new(10.0, 10.0))));
    framework.build_scope();
    assert_eq!(framework.lifecycle(element), Lifecycle::Inactive);
    assert_eq!(take_events(), vec!["deactivate outer", "deactivate inner"]);

    framework.finalize_tree();
    assert_eq!(framework.lifecycle(element), Lifecycle::Defunct);
    assert_eq!(take_events(), vec!["dispose inner", "dispose outer"]);
}

#[test]
fn keyed_subtree_keeps_identity_across_reorder() {
    let mut framework = Framework::new();
    let row = |order: [&'static str; 2]| -> WidgetRef {
        Rc::new(Flex::row(
            order
                .iter()
                .map(|name| {
                    Rc::new(KeyedSubtree::new(*name, Rc::new(Tracked::new(*name)))) as WidgetRef
                })
                .collect(),
        ))
    };
    let root = mount(&mut framework, row(["a", "b"]));
    let row_element = first_child(&framework, root);
    let before = framework.children(row_element);
    take_events();

    remount(&mut framework, row(["b", "a"]));

    assert_eq!(framework.children(row_element), vec![before[1], before[0]]);
    let events = take_events();
    assert!(!events.iter().any(|event| event.starts_with("init")));
}

#[test]
fn set_state_reports_errors() {
    let mut framework = Framework::new();
    let root = mount(&mut framework, Rc::new(Tracked::new("a")));
    let element = first_child(&framework, root);

    assert_eq!(
        framework.set_state::<TrackedState, _>(root, |_| ()),
        Err(ElementError::NotStateful { id: root })
    );
    assert!(matches!(
        framework.with_state::<AnimatedOpacityState, _>(element, |_| ()),
        Err(ElementError::StateMismatch { id, .. }) if id == element
    ));

    remount(&mut framework, color_box());
    assert_eq!(
        framework.set_state::<TrackedState, _>(element, |_| ()),
        Err(ElementError::Missing { id: element })
    );
}

#[test]
fn nested_view_owns_a_child_pipeline() {
    let mut framework = Framework::new();
    let nested: WidgetRef = Rc::new(View::new(color_box()).with_size(Size::new(50.0, 40.0)));
    let root = mount(
        &mut framework,
        Rc::new(Padding::new(EdgeInsets::all(5.0)).with_child(nested)),
    );
    let padding = first_child(&framework, root);
    let view = first_child(&framework, padding);
    let body = first_child(&framework, view);

    let nested_id = framework.pipeline_of(body).unwrap().id();
    assert_ne!(nested_id, framework.pipeline().id());
    assert_eq!(framework.pipeline().children().len(), 1);
    assert!(render_children(&framework, padding).is_empty());

    pump(&mut framework);
    let (pipeline, render) = framework.render_object(body).unwrap();
    assert_eq!(pipeline, nested_id);
    let owner = framework.pipeline().find(pipeline).unwrap();
    assert_eq!(owner.tree().size(render), Some(Size::new(50.0, 40.0)));

    remount(&mut framework, color_box());
    assert!(framework.pipeline().children().is_empty());
    assert!(!framework.contains(body));
}

#[test]
#[should_panic(expected = "needs a size")]
fn nested_view_without_size_panics() {
    let mut framework = Framework::new();
    mount(
        &mut framework,
        Rc::new(Padding::new(EdgeInsets::ZERO).with_child(Rc::new(View::new(color_box())))),
    );
}

#[test]
fn flexible_writes_parent_data() {
    let mut framework = Framework::new();
    let row = |flex: u32| -> WidgetRef {
        Rc::new(Flex::row(vec![
            Rc::new(Flexible::expanded(flex, color_box())),
            Rc::new(Flexible::expanded(1, color_box())),
        ]))
    };
    let root = mount(&mut framework, row(1));
    let row_element = first_child(&framework, root);
    let first = framework.children(row_element)[0];
    let render = render_of(&framework, first);

    let data = framework.pipeline().tree().parent_data(render).unwrap();
    assert_eq!((data.flex, data.fit), (1, FlexFit::Tight));
    pump(&mut framework);
    assert_eq!(framework.pipeline().tree().size(render).unwrap().width, 100.0);

    remount(&mut framework, row(3));
    assert_eq!(framework.pipeline().tree().parent_data(render).unwrap().flex, 3);
    pump(&mut framework);
    assert_eq!(framework.pipeline().tree().size(render).unwrap().width, 150.0);
}

#[test]
fn render_properties_update_in_place() {
    let mut framework = Framework::new();
    let root = mount(&mut framework, Rc::new(ColoredBox::new(Color::RED)));
    let element = first_child(&framework, root);
    let render = render_of(&framework, element);
    pump(&mut framework);

    remount(&mut framework, Rc::new(ColoredBox::new(Color::BLUE)));

    assert_eq!(first_child(&framework, root), element);
    let tree = framework.pipeline().tree();
    assert!(tree.needs_paint(render));
    assert!(!tree.needs_layout(render));
}

thread_local! {
    static MARK_TARGET: Cell<Option<ElementId>> = const { Cell::new(None) };
}

#[test]
fn build_scope_rebuilds_shallowest_first() {
    let mut framework = Framework::new();
    let outer: WidgetRef = Rc::new(Tracked::new("outer").with_child(Rc::new(Tracked::new("inner"))));
    let root = mount(&mut framework, outer);
    let outer_element = first_child(&framework, root);
    let inner_element = first_child(&framework, first_child(&framework, outer_element));
    take_events();

    framework.mark_needs_build(inner_element);
    framework.mark_needs_build(outer_element);
    framework.build_scope();

    assert_eq!(take_events(), vec!["build outer", "build inner"]);
}

#[test]
fn elements_dirtied_during_a_build_join_the_same_scope() {
    let mut framework = Framework::new();
    let builder: WidgetRef = Rc::new(Builder::new(|cx| {
        if let Some(target) = MARK_TARGET.with(Cell::take) {
            cx.mark_needs_build(target);
        }
        color_box()
    }));
    let root = mount(&mut framework, Rc::new(Tracked::new("top").with_child(builder)));
    let top = first_child(&framework, root);
    let builder_element = first_child(&framework, first_child(&framework, top));
    take_events();

    MARK_TARGET.with(|target| target.set(Some(top)));
    framework.mark_needs_build(builder_element);
    framework.build_scope();

    assert_eq!(take_events(), vec!["build top"]);
    assert!(!framework.is_dirty(top));
    assert!(framework.build_owner().dirty_elements().is_empty());
}

#[test]
fn element_tree_dump_lists_kinds_and_keys() {
    let mut framework = Framework::new();
    mount(&mut framework, keyed_row(&[7]));
    let dump = framework.dump_element_tree();
    assert!(dump.contains("ViewElement View"));
    assert!(dump.contains("  MultiChildRenderElement Flex"));
    assert!(dump.contains("    SingleChildRenderElement ColoredBox [7]"));
}
