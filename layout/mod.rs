/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The multi-mode layout engine (§4.3-§4.8): block/inline flow with floats,
//! flex, tables, and multi-column flow. Each mode is a free function
//! dispatched on `BoxKind` (Design Notes "mode-specific layout implemented
//! as free functions dispatched on the tag"), operating on the shared
//! `BoxTree`/`LayerTree` arenas.

pub mod block;
pub mod flex;
pub mod float;
pub mod inline;
pub mod margin;
pub mod multicol;
pub mod table;

use crate::box_tree::{BoxId, BoxTree};
use crate::config::LayoutConfig;
use crate::layout::inline::breaker::Shaper;
use crate::style::StyleEngine;

/// Threaded through every layout call: the style engine (read-only, §4.1)
/// and the tunables (§10.3). Nothing else is shared mutable state across
/// boxes (§5 "no suspension points"); the text shaper is threaded as an
/// explicit `&mut dyn Shaper` parameter instead of living on the context,
/// since it is the one genuinely mutable collaborator (a shaping cache)
/// touched from deep inside block/flex/table recursion.
pub struct LayoutContext<'a> {
    pub style_engine: &'a dyn StyleEngine,
    pub config: &'a LayoutConfig,
}

/// Dispatches full layout of `box_id` against an available inline size,
/// matching the reference's "given a width from containing block, compute
/// height, place children" contract (§4.3), generalized across modes.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "layout::layout_box", skip_all, fields(servo_profiling = true), level = "trace")
)]
pub fn layout_box(ctx: &LayoutContext, tree: &BoxTree, box_id: BoxId, available_inline_size: app_units::Au, shaper: &mut dyn Shaper) {
    use crate::box_tree::BoxKind;
    match &tree.get(box_id).kind {
        BoxKind::Block(_) | BoxKind::View | BoxKind::Page(_) | BoxKind::PageMargin(_) | BoxKind::ListItem(_) => {
            block::layout_block(ctx, tree, box_id, available_inline_size, shaper);
        }
        BoxKind::Flex(_) => flex::layout_flex(ctx, tree, box_id, available_inline_size, shaper),
        BoxKind::Table(_) => table::layout_table(ctx, tree, box_id, available_inline_size, shaper),
        BoxKind::MultiColumnFlow(_) => multicol::layout_multicol(ctx, tree, box_id, available_inline_size, shaper),
        _ => {}
    }
}
