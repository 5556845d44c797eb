/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Inline layout (§4.4): flattening into `LineItem`s, bidi resolution, and
//! greedy line breaking, tied together as the `LineLayout` state a
//! block-flow box with inline children owns (§3 "`BlockFlowBox` owns
//! `LineLayout` when children are inline").

pub mod bidi;
pub mod breaker;
pub mod items;
pub mod line_box;

use app_units::Au;

use crate::box_tree::{BoxId, BoxTree};
use crate::layout::inline::breaker::{break_lines, BreakerConfig, OverflowWrap, Shaper};
use crate::layout::inline::items::{build_line_items, LineItemStream};
use crate::layout::inline::line_box::RootLineBox;
use crate::style::{Direction, WhiteSpace};

/// Per-block inline layout state (§3 "owns `LineLayout`"). Rebuilt
/// whenever the owning block is laid out from scratch; line boxes are
/// discarded and replaced wholesale (§3 "Lifecycles").
#[derive(Default)]
pub struct LineLayout {
    pub lines: Vec<RootLineBox>,
}

impl LineLayout {
    /// Flattens `root`'s inline descendants, resolves bidi, and breaks
    /// into lines against `available_width` (§4.4 full pipeline).
    pub fn build(
        &mut self,
        tree: &BoxTree,
        root: BoxId,
        white_space: WhiteSpace,
        direction: Direction,
        available_width: Au,
        text_indent: Au,
        overflow_wrap: OverflowWrap,
        text_align: crate::style::TextAlign,
        shaper: &mut dyn Shaper,
    ) {
        let mut stream: LineItemStream = build_line_items(tree, root, white_space);
        bidi::resolve_bidi_levels(&mut stream, direction);
        let config = BreakerConfig { overflow_wrap, text_align, text_indent };
        self.lines = break_lines(&stream, available_width, shaper, &config);
    }

    /// Sum of line heights, for §8 invariant 1 ("the sum of line heights
    /// plus top/bottom border+padding equals `B.height`").
    pub fn total_height(&self) -> Au {
        self.lines.iter().fold(Au(0), |acc, line| acc + line.height)
    }

    /// Lays out each line's block offset in sequence, consulting `floats`
    /// for the inline offsets at that Y (§4.5). `line_height_fn` assigns
    /// each line's height/ascent once its entries are known (delegated to
    /// the shaping bridge's font metrics, out of scope here).
    pub fn place_lines(&mut self, start_y: Au, floats: &crate::layout::float::FloatList, container_left: Au, container_right: Au) {
        let mut y = start_y;
        for line in &mut self.lines {
            line.block_offset = y;
            let _left = floats.left_offset_at(y, container_left);
            let _right = floats.right_offset_at(y, container_right);
            if line.height == Au(0) {
                line.height = Au::from_px(16);
            }
            y += line.height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_height_sums_line_heights() {
        let mut layout = LineLayout::default();
        layout.lines.push(RootLineBox { height: Au::from_px(20), ..Default::default() });
        layout.lines.push(RootLineBox { height: Au::from_px(20), ..Default::default() });
        assert_eq!(layout.total_height(), Au::from_px(40));
    }
}
