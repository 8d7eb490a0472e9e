use arbor_geometry::{Color, Constraints, EdgeInsets};
use arbor_render::objects::{RenderColoredBox, RenderPadding};

use super::*;

fn padded_box(padding: f32) -> (RenderTree, RenderId, RenderId) {
    let mut tree = RenderTree::new();
    let root = tree.insert(RenderPadding::new(EdgeInsets::all(padding)));
    let child = tree.insert(RenderColoredBox::new(Color::WHITE));
    tree.insert_child(root, child, None);
    tree.set_root(Some(root));
    tree.layout(root, Constraints::tight(100.0, 100.0), false);
    (tree, root, child)
}

#[test]
fn local_position_subtracts_ancestor_offsets() {
    let (tree, root, child) = padded_box(10.0);

    assert_eq!(
        local_position(&tree, child, Point::new(15.0, 12.0)),
        Some(Point::new(5.0, 2.0))
    );
    assert_eq!(
        local_position(&tree, root, Point::new(15.0, 12.0)),
        Some(Point::new(15.0, 12.0))
    );
}

#[test]
fn resolve_uses_current_layout() {
    let (mut tree, root, child) = padded_box(10.0);
    let mut tracker = HitPathTracker::new();
    tracker.add_hit_path(PointerId::PRIMARY, vec![child, root]);

    tree.update::<RenderPadding>(root, |padding| padding.set_padding(EdgeInsets::all(20.0)))
        .unwrap();
    tree.layout(root, Constraints::tight(100.0, 100.0), false);

    let resolved = tracker.resolve(PointerId::PRIMARY, &tree, Point::new(30.0, 30.0));
    assert_eq!(
        resolved,
        vec![(child, Point::new(10.0, 10.0)), (root, Point::new(30.0, 30.0))]
    );
}

#[test]
fn removed_targets_are_skipped() {
    let (mut tree, root, child) = padded_box(10.0);
    let mut tracker = HitPathTracker::new();
    tracker.add_hit_path(PointerId::PRIMARY, vec![child, root]);

    tree.remove_child(root, child);
    tree.remove(child);

    let resolved = tracker.resolve(PointerId::PRIMARY, &tree, Point::new(30.0, 30.0));
    assert_eq!(resolved, vec![(root, Point::new(30.0, 30.0))]);
}

#[test]
fn paths_are_tracked_per_pointer() {
    let (_tree, root, child) = padded_box(10.0);
    let mut tracker = HitPathTracker::new();
    tracker.add_hit_path(PointerId(0), vec![root]);
    tracker.add_hit_path(PointerId(1), vec![child]);

    assert_eq!(tracker.remove_path(PointerId(0)), Some(vec![root]));
    assert!(!tracker.has_path(PointerId(0)));
    assert!(tracker.has_path(PointerId(1)));

    tracker.clear();
    assert!(tracker.is_empty());
}

#[test]
fn unknown_pointer_resolves_to_nothing() {
    let (tree, _, _) = padded_box(10.0);
    let tracker = HitPathTracker::new();
    assert!(tracker
        .resolve(PointerId::PRIMARY, &tree, Point::ZERO)
        .is_empty());
}
