/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Paint (§4.11): turns a laid-out box tree and its layer tree into
//! drawing calls against an external `GraphicsContext`. Split the way the
//! teacher splits display-list building: layer position/overflow
//! (`layer`), the paint traversal itself (`paint`), and border stroking
//! (`border`).

pub mod border;
pub mod layer;
pub mod paint;

use crate::box_tree::layer::LayerTree;
use crate::box_tree::BoxTree;
use crate::external::GraphicsContext;

/// Recomputes every layer's position/overflow, then paints the whole
/// layer tree from the root (§4.11 full pipeline).
pub fn paint_document(ctx: &mut dyn GraphicsContext, tree: &BoxTree, layers: &LayerTree) {
    layer::update_position(tree, layers, layers.root);
    paint::paint_layer(ctx, tree, layers, layers.root);
}
