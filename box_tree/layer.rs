/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! `BoxLayer` (§3, §4.11): a paint unit with its own z-order, clip,
//! transform and opacity. Only boxes that need one get one; see
//! `needs_layer` below for the exact predicate (§3 "Layer existence equals
//! one of...").

use app_units::Au;
use euclid::default::Transform2D;

use crate::arena::{Arena, Id};
use crate::box_tree::BoxId;
use crate::geom::PxRect;
use crate::style::BoxStyleData;

pub type LayerId = Id<BoxLayer>;

/// Whether `style`/`flags` require a `BoxLayer`, per §3:
/// "positioned, relative-positioned, overflow-hidden, transformed,
/// has-column-flow, non-unit opacity, non-normal blend-mode, or explicit
/// z-index."
pub fn needs_layer(style: &BoxStyleData, is_column_flow: bool) -> bool {
    use crate::style::Position;
    matches!(style.position, Position::Absolute | Position::Fixed | Position::Relative | Position::Sticky)
        || style.overflow_hidden
        || style.transform.is_some()
        || is_column_flow
        || style.opacity != 1.0
        || style.z_index.is_some()
}

pub struct BoxLayer {
    pub owner: BoxId,
    pub parent: Option<LayerId>,
    pub children: Vec<LayerId>,
    /// Absolute location of the owning box's border box, stacked through
    /// non-layered ancestors by `update_position`.
    pub absolute_location: euclid::default::Point2D<Au>,
    pub transform: Option<Transform2D<f32>>,
    pub z_index: i32,
    /// Union of this layer's own overflow plus the overflow of every
    /// non-fixed, non-column-flow child layer (§4.11 `updatePosition`).
    pub overflow: PxRect,
}

/// Owns every layer for one document, indexed by `LayerId`, plus the link
/// from a box to its nearest layered ancestor (needed by boxes that do not
/// themselves have a layer but must paint relative to one).
pub struct LayerTree {
    layers: Arena<BoxLayer>,
    pub root: LayerId,
}

impl LayerTree {
    pub fn new(root_owner: BoxId) -> Self {
        let layers = Arena::new();
        let root = layers.alloc(BoxLayer {
            owner: root_owner,
            parent: None,
            children: Vec::new(),
            absolute_location: euclid::default::Point2D::zero(),
            transform: None,
            z_index: 0,
            overflow: PxRect::zero(),
        });
        Self { layers, root }
    }

    pub fn get(&self, id: LayerId) -> &BoxLayer {
        self.layers.get(id)
    }

    pub fn get_mut(&self, id: LayerId) -> &mut BoxLayer {
        self.layers.get_mut(id)
    }

    /// Creates a new layer owned by `owner`, linked under `nearest_layered_ancestor`.
    pub fn create(&self, owner: BoxId, nearest_layered_ancestor: LayerId, z_index: i32) -> LayerId {
        let id = self.layers.alloc(BoxLayer {
            owner,
            parent: Some(nearest_layered_ancestor),
            children: Vec::new(),
            absolute_location: euclid::default::Point2D::zero(),
            transform: None,
            z_index,
            overflow: PxRect::zero(),
        });
        self.layers.get_mut(nearest_layered_ancestor).children.push(id);
        id
    }

    /// Stable-sorts `parent`'s children by z-index, per §4.11
    /// "`updatePosition` ... stable-sorts children by z-index".
    pub fn sort_children_by_z_index(&self, parent: LayerId) {
        let mut children = self.layers.get(parent).children.clone();
        children.sort_by_key(|&id| self.layers.get(id).z_index);
        self.layers.get_mut(parent).children = children;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BoxStyleData, Position};

    #[test]
    fn needs_layer_true_for_positioned() {
        let mut style = BoxStyleData::default();
        style.position = Position::Absolute;
        assert!(needs_layer(&style, false));
    }

    #[test]
    fn needs_layer_false_for_static_opaque_inline() {
        let style = BoxStyleData::default();
        assert!(!needs_layer(&style, false));
    }

    #[test]
    fn sort_children_by_z_index_orders_ascending() {
        let box_tree = crate::box_tree::BoxTree::new(std::sync::Arc::new(BoxStyleData::default()));
        let tree = LayerTree::new(box_tree.root);
        let a = tree.create(box_tree.root, tree.root, 5);
        let b = tree.create(box_tree.root, tree.root, -2);
        let c = tree.create(box_tree.root, tree.root, 1);
        tree.sort_children_by_z_index(tree.root);
        let order = tree.get(tree.root).children.clone();
        assert_eq!(order, vec![b, c, a]);
    }
}
