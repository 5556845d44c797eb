/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Layer position and overflow propagation (§4.11 "`updatePosition` walks
//! the layer tree, stacking each layer's absolute location through its
//! non-layered ancestors, then stable-sorts children by z-index and unions
//! overflow bottom-up").

use app_units::Au;
use euclid::default::{Point2D, Rect, Size2D, Vector2D};

use crate::box_tree::layer::{LayerId, LayerTree};
use crate::box_tree::{BoxId, BoxTree};
use crate::geom::PxRect;
use crate::style::Position;

fn offset_from_layered_ancestor(tree: &BoxTree, owner: BoxId) -> Vector2D<Au> {
    let frame = &tree.get(owner).header.frame;
    let mut offset = Vector2D::new(frame.x, frame.y);
    let mut current = tree.get(owner).header.parent;
    while let Some(parent) = current {
        let b = tree.get(parent);
        if b.header.layer.is_some() {
            break;
        }
        offset.x += b.header.frame.x;
        offset.y += b.header.frame.y;
        current = b.header.parent;
    }
    offset
}

fn border_box_rect(tree: &BoxTree, owner: BoxId, absolute: Vector2D<Au>) -> PxRect {
    let frame = &tree.get(owner).header.frame;
    Rect::new(Point2D::new(absolute.x.to_f32_px(), absolute.y.to_f32_px()), Size2D::new(frame.width.to_f32_px().max(0.0), frame.height.to_f32_px().max(0.0)))
}

/// Recomputes `layer_id`'s absolute location from its parent layer plus the
/// chain of non-layered box ancestors between them, then recurses into its
/// children and unions their overflow into its own (§4.11). Fixed-position
/// and column-flow children do not contribute to the parent's overflow,
/// since they scroll or paginate independently.
pub fn update_position(tree: &BoxTree, layers: &LayerTree, layer_id: LayerId) {
    let (owner, parent_location) = {
        let layer = layers.get(layer_id);
        let parent_location = layer.parent.map(|p| {
            let p = layers.get(p);
            Vector2D::new(p.absolute_location.x, p.absolute_location.y)
        });
        (layer.owner, parent_location.unwrap_or_else(Vector2D::zero))
    };

    let offset = offset_from_layered_ancestor(tree, owner);
    let absolute = parent_location + offset;
    layers.get_mut(layer_id).absolute_location = Point2D::new(absolute.x, absolute.y);

    let mut overflow = border_box_rect(tree, owner, absolute);

    layers.sort_children_by_z_index(layer_id);
    let children = layers.get(layer_id).children.clone();
    for child in children {
        update_position(tree, layers, child);
        let child_layer = layers.get(child);
        let child_owner_style = &tree.get(child_layer.owner).header.style;
        let is_column_flow = matches!(tree.get(child_layer.owner).kind, crate::box_tree::BoxKind::MultiColumnFlow(_));
        if child_owner_style.position != Position::Fixed && !is_column_flow {
            overflow = overflow.union(&child_layer.overflow);
        }
    }

    layers.get_mut(layer_id).overflow = overflow;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::{BlockBoxData, BoxKind, BoxTree};
    use crate::style::BoxStyleData;

    #[test]
    fn child_location_stacks_through_unlayered_parent() {
        let style = std::sync::Arc::new(BoxStyleData::default());
        let tree = BoxTree::new(style.clone());
        let parent = tree.alloc(None, style.clone(), BoxKind::Block(BlockBoxData::default()));
        tree.append_child(tree.root, parent);
        tree.get_mut(parent).header.frame.x = Au::from_px(10);
        tree.get_mut(parent).header.frame.y = Au::from_px(20);

        let child = tree.alloc(None, style, BoxKind::Block(BlockBoxData::default()));
        tree.append_child(parent, child);
        tree.get_mut(child).header.frame.x = Au::from_px(5);
        tree.get_mut(child).header.frame.y = Au::from_px(7);
        tree.get_mut(child).header.frame.width = Au::from_px(50);
        tree.get_mut(child).header.frame.height = Au::from_px(60);

        let layers = LayerTree::new(tree.root);
        let child_layer = layers.create(child, layers.root, 0);

        update_position(&tree, &layers, layers.root);

        let location = layers.get(child_layer).absolute_location;
        assert_eq!(location.x, Au::from_px(15));
        assert_eq!(location.y, Au::from_px(27));
    }
}
