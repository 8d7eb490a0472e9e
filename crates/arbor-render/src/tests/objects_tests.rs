use super::*;
use crate::{DrawCommand, FlexFit, Invalidation, RenderId, RenderObject, RenderTree, Renderer};
use arbor_geometry::{
    Axis, Color, Constraints, CrossAxisAlignment, EdgeInsets, MainAxisAlignment, MainAxisSize,
    Point, Rect, Size,
};

fn flex_row(factors: &[u32], fit: FlexFit) -> (RenderTree, RenderId, Vec<RenderId>) {
    let mut tree = RenderTree::new();
    let row = tree.insert(RenderFlex::new(Axis::Horizontal));
    let mut children = Vec::new();
    let mut previous = None;
    for &flex in factors {
        let child = tree.insert(RenderFill::new(Color::RED));
        tree.insert_child(row, child, previous);
        tree.update_parent_data(child, |data| {
            data.flex = flex;
            data.fit = fit;
            true
        });
        previous = Some(child);
        children.push(child);
    }
    tree.set_root(Some(row));
    (tree, row, children)
}

fn widths(tree: &RenderTree, ids: &[RenderId]) -> Vec<f32> {
    ids.iter()
        .map(|id| tree.size(*id).map_or(-1.0, |size| size.width))
        .collect()
}

#[test]
fn flex_splits_free_space_by_factor() {
    let (mut tree, row, children) = flex_row(&[2, 1, 1], FlexFit::Tight);
    let size = tree.layout(row, Constraints::tight(200.0, 50.0), false);

    assert_eq!(size, Size::new(200.0, 50.0));
    assert_eq!(widths(&tree, &children), vec![100.0, 50.0, 50.0]);
    assert_eq!(tree.offset(children[1]), Point::new(100.0, 0.0));
    assert_eq!(tree.offset(children[2]), Point::new(150.0, 0.0));
}

#[test]
fn flex_three_one_one_gives_three_fifths_to_the_first() {
    let (mut tree, row, children) = flex_row(&[3, 1, 1], FlexFit::Tight);
    tree.layout(row, Constraints::tight(200.0, 50.0), false);
    assert_eq!(widths(&tree, &children), vec![120.0, 40.0, 40.0]);
}

#[test]
fn loose_flex_children_may_stay_small() {
    let (mut tree, row, children) = flex_row(&[1, 1], FlexFit::Loose);
    tree.layout(row, Constraints::tight(200.0, 50.0), false);
    assert_eq!(widths(&tree, &children), vec![0.0, 0.0]);
}

#[test]
fn inflexible_children_are_measured_before_flexible_ones() {
    let mut tree = RenderTree::new();
    let row = tree.insert(RenderFlex::new(Axis::Horizontal));
    let fixed = tree.insert(RenderConstrainedBox::new(Constraints::tight(40.0, 10.0)));
    let flexible = tree.insert(RenderFill::new(Color::BLUE));
    tree.insert_child(row, fixed, None);
    tree.insert_child(row, flexible, Some(fixed));
    tree.update_parent_data(flexible, |data| {
        data.flex = 1;
        data.fit = FlexFit::Tight;
        true
    });
    tree.set_root(Some(row));
    tree.layout(row, Constraints::tight(200.0, 50.0), false);

    assert_eq!(tree.size(fixed), Some(Size::new(40.0, 10.0)));
    assert_eq!(tree.size(flexible), Some(Size::new(160.0, 0.0)));
    assert_eq!(tree.offset(flexible), Point::new(40.0, 0.0));
}

#[test]
fn column_centers_and_stretches() {
    let mut tree = RenderTree::new();
    let mut column = RenderFlex::new(Axis::Vertical);
    let _ = column.set_main_axis_alignment(MainAxisAlignment::Center);
    let _ = column.set_cross_axis_alignment(CrossAxisAlignment::Stretch);
    let column = tree.insert(column);
    let child = tree.insert(RenderConstrainedBox::new(Constraints::new(
        0.0,
        f32::INFINITY,
        20.0,
        20.0,
    )));
    tree.insert_child(column, child, None);
    tree.set_root(Some(column));
    tree.layout(column, Constraints::tight(100.0, 100.0), false);

    assert_eq!(tree.size(child), Some(Size::new(100.0, 20.0)));
    assert_eq!(tree.offset(child), Point::new(0.0, 40.0));
}

#[test]
fn min_main_axis_size_shrink_wraps() {
    let mut tree = RenderTree::new();
    let mut row = RenderFlex::new(Axis::Horizontal);
    let _ = row.set_main_axis_size(MainAxisSize::Min);
    let row = tree.insert(row);
    let child = tree.insert(RenderConstrainedBox::new(Constraints::tight(30.0, 10.0)));
    tree.insert_child(row, child, None);
    tree.set_root(Some(row));

    let size = tree.layout(row, Constraints::loose(200.0, 50.0), false);
    assert_eq!(size, Size::new(30.0, 10.0));
}

#[test]
fn padding_deflates_and_offsets_its_child() {
    let mut tree = RenderTree::new();
    let padding = tree.insert(RenderPadding::new(EdgeInsets::all(10.0)));
    let fill = tree.insert(RenderFill::new(Color::GREEN));
    tree.insert_child(padding, fill, None);
    tree.set_root(Some(padding));
    tree.layout(padding, Constraints::tight(100.0, 100.0), false);

    assert_eq!(tree.size(fill), Some(Size::new(80.0, 80.0)));
    assert_eq!(tree.offset(fill), Point::new(10.0, 10.0));
}

#[test]
fn constrained_box_respects_incoming_constraints() {
    let mut tree = RenderTree::new();
    let sized = tree.insert(RenderConstrainedBox::new(Constraints::tight(50.0, 50.0)));
    tree.set_root(Some(sized));

    assert_eq!(
        tree.layout(sized, Constraints::loose(200.0, 200.0), false),
        Size::new(50.0, 50.0)
    );
    assert_eq!(
        tree.layout(sized, Constraints::loose(30.0, 30.0), false),
        Size::new(30.0, 30.0)
    );
}

#[test]
fn view_under_tight_constraints_isolates_its_child() {
    let mut tree = RenderTree::new();
    let view = tree.insert(RenderView::new());
    let child = tree.insert(RenderColoredBox::new(Color::WHITE));
    tree.insert_child(view, child, None);
    tree.set_root(Some(view));
    tree.layout(view, Constraints::tight(320.0, 240.0), false);

    assert_eq!(tree.size(view), Some(Size::new(320.0, 240.0)));
    assert_eq!(tree.size(child), Some(Size::new(320.0, 240.0)));
    assert_eq!(tree.relayout_boundary(child), Some(child));
}

#[test]
fn opacity_requests_compositing_only_when_layering_changes() {
    let mut opacity = RenderOpacity::new(1.0);
    assert!(!opacity.always_needs_compositing());

    let change = opacity.set_opacity(0.5);
    assert!(change.contains(Invalidation::PAINT | Invalidation::COMPOSITING));
    assert!(opacity.always_needs_compositing());

    let change = opacity.set_opacity(0.7);
    assert_eq!(change, Invalidation::PAINT);
    assert_eq!(opacity.set_opacity(0.7), Invalidation::NONE);
}

#[test]
fn translucent_opacity_paints_a_layer_and_zero_paints_nothing() {
    let mut tree = RenderTree::new();
    let opacity = tree.insert(RenderOpacity::new(0.5));
    let fill = tree.insert(RenderFill::new(Color::RED));
    tree.insert_child(opacity, fill, None);
    tree.set_root(Some(opacity));
    tree.layout(opacity, Constraints::tight(10.0, 10.0), false);

    let mut renderer = Renderer::new();
    let list = renderer.paint(&mut tree, opacity);
    assert_eq!(list.commands()[0], DrawCommand::SaveLayer { alpha: 0.5 });
    assert_eq!(list.flatten()[0].opacity, 0.5);

    tree.update::<RenderOpacity>(opacity, |opacity| opacity.set_opacity(0.0))
        .expect("opacity exists");
    assert!(renderer.paint(&mut tree, opacity).is_empty());
}

#[test]
fn clip_rect_limits_child_paint_to_bounds() {
    let mut tree = RenderTree::new();
    let clip = tree.insert(RenderClipRect::new());
    let fill = tree.insert(RenderFill::new(Color::RED));
    tree.insert_child(clip, fill, None);
    tree.set_root(Some(clip));
    tree.layout(clip, Constraints::tight(10.0, 20.0), false);

    let mut renderer = Renderer::new();
    let primitives = renderer.paint(&mut tree, clip).flatten();
    assert_eq!(primitives.len(), 1);
    assert_eq!(primitives[0].visible_rect(), Rect::new(0.0, 0.0, 10.0, 20.0));
}
