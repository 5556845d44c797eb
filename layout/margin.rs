/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Margin collapsing (§4.3 "Margin collapsing").
//!
//! Grounded in the teacher's `block.rs` `MarginCollapseInfo`/`MarginState`
//! machine: a running accumulator of the max positive and max negative
//! collapsible margin seen since the last non-collapsible edge, generalized
//! to the arena-based box tree instead of the teacher's intrusive
//! `BlockFlow` pointers.

use app_units::Au;

/// Running collapse state threaded down a block's children (§3 "maintained
/// with a running `MarginInfo`").
#[derive(Clone, Copy, Debug, Default)]
pub struct MarginInfo {
    max_positive: Au,
    max_negative: Au,
    /// True until a border, padding, clearance, or non-collapsing container
    /// boundary is seen; while true, the block's own top edge can still
    /// collapse with the in-flow margin (§4.3 "first/last child's margins
    /// may collapse with the block's own edges").
    can_collapse_with_block_edge: bool,
}

impl MarginInfo {
    pub fn new() -> Self {
        Self { max_positive: Au(0), max_negative: Au(0), can_collapse_with_block_edge: true }
    }

    /// Folds one more adjoining margin into the running accumulator.
    pub fn collapse_margin(&mut self, margin: Au) {
        if margin.0 >= 0 {
            self.max_positive = self.max_positive.max(margin);
        } else {
            self.max_negative = self.max_negative.max(-margin);
        }
    }

    /// The collapsed value of every margin folded in so far (CSS §8.3.1:
    /// "max of the positive margins ... minus the max of the absolute
    /// values of the negative margins").
    pub fn collapsed_value(&self) -> Au {
        self.max_positive - self.max_negative
    }

    /// Breaks the collapsing chain: a border, padding, clearance, or a
    /// container that itself does not participate (flex/table/grid items,
    /// §4.3 "Margins collapse across children unless separated by...").
    pub fn reset(&mut self) {
        self.max_positive = Au(0);
        self.max_negative = Au(0);
        self.can_collapse_with_block_edge = false;
    }

    pub fn can_collapse_with_block_edge(&self) -> bool {
        self.can_collapse_with_block_edge
    }

    pub fn set_can_collapse_with_block_edge(&mut self, can: bool) {
        self.can_collapse_with_block_edge = can;
    }
}

/// A block is self-collapsing when it has zero height, no borders or
/// padding, and (recursively) all of its children are self-collapsing
/// (§3 "Self-collapsing blocks ... collapse into a single margin").
pub fn is_self_collapsing(
    height_is_auto: bool,
    computed_height: Au,
    border_padding_block: Au,
    all_children_self_collapsing: bool,
) -> bool {
    height_is_auto && computed_height == Au(0) && border_padding_block == Au(0) && all_children_self_collapsing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_two_positive_margins_to_the_max() {
        let mut info = MarginInfo::new();
        info.collapse_margin(Au::from_px(20));
        info.collapse_margin(Au::from_px(30));
        assert_eq!(info.collapsed_value(), Au::from_px(30));
    }

    #[test]
    fn collapses_positive_and_negative_by_subtracting_maxima() {
        let mut info = MarginInfo::new();
        info.collapse_margin(Au::from_px(20));
        info.collapse_margin(Au::from_px(-8));
        assert_eq!(info.collapsed_value(), Au::from_px(12));
    }

    #[test]
    fn reset_clears_accumulator_and_block_edge_eligibility() {
        let mut info = MarginInfo::new();
        info.collapse_margin(Au::from_px(20));
        info.reset();
        assert_eq!(info.collapsed_value(), Au(0));
        assert!(!info.can_collapse_with_block_edge());
    }

    #[test]
    fn self_collapsing_requires_zero_height_and_no_border_padding() {
        assert!(is_self_collapsing(true, Au(0), Au(0), true));
        assert!(!is_self_collapsing(true, Au(0), Au::from_px(1), true));
        assert!(!is_self_collapsing(false, Au(0), Au(0), true));
    }
}
