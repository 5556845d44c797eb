/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The fragment-builder protocol (§4.9), implemented by both the
//! multi-column row host (`layout::multicol`) and the page driver
//! (`page`). Exposed as a trait object per Design Notes ("Fragment-builder
//! polymorphism... a small capability trait implemented by the
//! multi-column row host and the page driver; layout code takes a trait
//! object").

use crate::geom::FragmentOffset;
use crate::style::{BreakBetween, BreakInside};

/// Distinguishes column fragmentation from page fragmentation so that
/// `needs_break_between`/`needs_break_inside` can apply the right subset
/// of `break-*` keywords (SPEC_FULL §11, grounded in
/// `original_source/source/layout/fragmentbuilder.h`'s `FragmentType`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentKind {
    Column,
    Page,
}

/// Whether an offset exactly on a fragment boundary belongs to the
/// previous or next fragment (§4.9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentBoundaryRule {
    AssociateWithFormerFragment,
    AssociateWithLatterFragment,
}

/// Minimal shape of a block-level child that fragment-break application
/// needs to see: its own break hints and whether it floats/avoids floats,
/// without requiring the full `Box` type (keeps this module independent
/// of `box_tree`).
pub struct FragmentCandidate {
    pub break_before: BreakBetween,
    pub break_after: BreakBetween,
    pub break_inside: BreakInside,
    pub height: f32,
    pub is_floating: bool,
    pub margin_height: f32,
    pub is_replaced: bool,
}

/// The fragment-builder capability (§4.9). Default method bodies
/// implement `applyFragmentBreakBefore/After/Inside` and the
/// `enterFragment`/`leaveFragment` offset bookkeeping exactly as
/// `fragmentbuilder.cpp` does; only the four core queries are left for
/// implementors to fill in.
pub trait FragmentBuilder {
    fn fragment_kind(&self) -> FragmentKind;

    /// 0 if unpaginated (§4.9).
    fn fragment_height_for_offset(&self, offset: f32) -> f32;

    fn fragment_remaining_height_for_offset(&self, offset: f32, rule: FragmentBoundaryRule) -> f32;

    fn add_forced_fragment_break(&mut self, _offset: f32) {}
    fn set_fragment_break(&mut self, _offset: f32, _space_shortage: f32) {}
    fn update_minimum_fragment_height(&mut self, _offset: f32, _min_height: f32) {}

    fn fragment_cumulative_offset(&self) -> FragmentOffset;
    fn set_fragment_cumulative_offset(&mut self, offset: FragmentOffset);

    fn enter_fragment(&mut self, offset: f32) {
        let next = self.fragment_cumulative_offset().enter(offset);
        self.set_fragment_cumulative_offset(next);
    }

    fn leave_fragment(&mut self, offset: f32) {
        let next = self.fragment_cumulative_offset().leave(offset);
        self.set_fragment_cumulative_offset(next);
    }

    fn fragment_offset(&self) -> f32 {
        self.fragment_cumulative_offset().as_px()
    }

    /// A page fragmentainer honors any `between >= Page`; a column
    /// fragmentainer only honors the `column` keyword
    /// (`fragmentbuilder.cpp::needsBreakBetween`).
    fn needs_break_between(&self, between: BreakBetween) -> bool {
        match self.fragment_kind() {
            FragmentKind::Column => between == BreakBetween::Column,
            FragmentKind::Page => matches!(
                between,
                BreakBetween::Page
                    | BreakBetween::Always
                    | BreakBetween::Left
                    | BreakBetween::Right
                    | BreakBetween::Recto
                    | BreakBetween::Verso
            ),
        }
    }

    /// A page fragmentainer only reacts to `avoid`/`avoid-page`; a column
    /// fragmentainer only to `avoid`/`avoid-column`
    /// (`fragmentbuilder.cpp::needsBreakInside`).
    fn needs_break_inside(&self, inside: BreakInside) -> bool {
        match self.fragment_kind() {
            FragmentKind::Page => matches!(inside, BreakInside::Avoid | BreakInside::AvoidPage),
            FragmentKind::Column => matches!(inside, BreakInside::Avoid | BreakInside::AvoidColumn),
        }
    }

    fn apply_fragment_break_before(&mut self, child: &FragmentCandidate, offset: f32) -> f32 {
        if !self.needs_break_between(child.break_before) {
            return offset;
        }
        let fragment_height = self.fragment_height_for_offset(offset);
        self.add_forced_fragment_break(offset);
        let mut offset = offset;
        if fragment_height > 0.0 {
            offset += self.fragment_remaining_height_for_offset(offset, FragmentBoundaryRule::AssociateWithFormerFragment);
        }
        offset
    }

    fn apply_fragment_break_after(&mut self, child: &FragmentCandidate, offset: f32) -> f32 {
        if !self.needs_break_between(child.break_after) {
            return offset;
        }
        let fragment_height = self.fragment_height_for_offset(offset);
        self.add_forced_fragment_break(offset);
        let mut offset = offset;
        if fragment_height > 0.0 {
            offset += self.fragment_remaining_height_for_offset(offset, FragmentBoundaryRule::AssociateWithFormerFragment);
        }
        offset
    }

    fn apply_fragment_break_inside(&mut self, child: &FragmentCandidate, offset: f32) -> f32 {
        if !child.is_replaced && !self.needs_break_inside(child.break_inside) {
            return offset;
        }
        let mut child_height = child.height;
        if child.is_floating {
            child_height += child.margin_height;
        }
        let fragment_height = self.fragment_height_for_offset(offset);
        self.update_minimum_fragment_height(offset, child_height);
        if fragment_height == 0.0 {
            return offset;
        }
        let remaining_height = self.fragment_remaining_height_for_offset(offset, FragmentBoundaryRule::AssociateWithLatterFragment);
        if remaining_height < child_height && remaining_height < fragment_height {
            return offset + remaining_height;
        }
        offset
    }
}

/// One "content run" recording where a forced break fell within a column
/// row, so that balancing can distribute implicit breaks to the tallest
/// run (§3 "Column row", grounded in `multicolumnbox.cpp`'s
/// `MultiColumnContentRun`).
#[derive(Clone, Copy, Debug, Default)]
pub struct MultiColumnContentRun {
    pub break_offset: f32,
    pub assumed_implicit_breaks: u32,
}

impl MultiColumnContentRun {
    /// `(breakOffset - startOffset) / (assumedImplicitBreaks + 1)`
    /// (`multicolumnbox.cpp::MultiColumnContentRun::columnLogicalHeight`).
    pub fn column_logical_height(&self, start_offset: f32) -> f32 {
        (self.break_offset - start_offset) / (self.assumed_implicit_breaks as f32 + 1.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MultiColumnContentRuns {
    pub runs: Vec<MultiColumnContentRun>,
}

impl MultiColumnContentRuns {
    pub fn clear(&mut self) {
        self.runs.clear();
    }

    pub fn add_break(&mut self, break_offset: f32) {
        if let Some(last) = self.runs.last_mut() {
            last.break_offset = break_offset;
        } else {
            self.runs.push(MultiColumnContentRun { break_offset, assumed_implicit_breaks: 0 });
        }
    }

    /// Picks the run whose `column_logical_height` (assuming one more
    /// implicit break) is tallest, and records that it now absorbs an
    /// extra implicit break (§4.8 step 2 "iterate by adding minimum
    /// observed space shortage").
    pub fn distribute_implicit_break(&mut self, start_offset: f32) {
        if self.runs.is_empty() {
            return;
        }
        let mut best = 0;
        let mut best_height = f32::MIN;
        let mut previous_offset = start_offset;
        for (i, run) in self.runs.iter().enumerate() {
            let height = run.column_logical_height(previous_offset);
            if height > best_height {
                best_height = height;
                best = i;
            }
            previous_offset = run.break_offset;
        }
        self.runs[best].assumed_implicit_breaks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PageFragmentainer {
        height: f32,
        offset: FragmentOffset,
    }

    impl FragmentBuilder for PageFragmentainer {
        fn fragment_kind(&self) -> FragmentKind {
            FragmentKind::Page
        }

        fn fragment_height_for_offset(&self, _offset: f32) -> f32 {
            self.height
        }

        fn fragment_remaining_height_for_offset(&self, offset: f32, _rule: FragmentBoundaryRule) -> f32 {
            self.height - (offset % self.height)
        }

        fn fragment_cumulative_offset(&self) -> FragmentOffset {
            self.offset
        }

        fn set_fragment_cumulative_offset(&mut self, offset: FragmentOffset) {
            self.offset = offset;
        }
    }

    #[test]
    fn break_before_page_advances_to_next_fragment() {
        let mut f = PageFragmentainer { height: 500.0, offset: FragmentOffset::ZERO };
        let child = FragmentCandidate {
            break_before: BreakBetween::Page,
            break_after: BreakBetween::Auto,
            break_inside: BreakInside::Auto,
            height: 10.0,
            is_floating: false,
            margin_height: 0.0,
            is_replaced: false,
        };
        let next = f.apply_fragment_break_before(&child, 420.0);
        assert_eq!(next, 500.0);
    }

    #[test]
    fn break_before_column_ignored_in_page_fragmentainer() {
        let mut f = PageFragmentainer { height: 500.0, offset: FragmentOffset::ZERO };
        let child = FragmentCandidate {
            break_before: BreakBetween::Column,
            break_after: BreakBetween::Auto,
            break_inside: BreakInside::Auto,
            height: 10.0,
            is_floating: false,
            margin_height: 0.0,
            is_replaced: false,
        };
        let next = f.apply_fragment_break_before(&child, 420.0);
        assert_eq!(next, 420.0);
    }

    #[test]
    fn break_inside_avoid_pushes_child_to_next_fragment_when_it_fits_there() {
        let mut f = PageFragmentainer { height: 500.0, offset: FragmentOffset::ZERO };
        let child = FragmentCandidate {
            break_before: BreakBetween::Auto,
            break_after: BreakBetween::Auto,
            break_inside: BreakInside::Avoid,
            height: 120.0,
            is_floating: false,
            margin_height: 0.0,
            is_replaced: false,
        };
        // 450 into the page, only 50 left, but the child is 120 tall and
        // fits within a fresh 500-tall fragment, so it moves down.
        let next = f.apply_fragment_break_inside(&child, 450.0);
        assert_eq!(next, 450.0 + 50.0);
    }

    #[test]
    fn content_run_column_height_divides_by_implicit_breaks_plus_one() {
        let run = MultiColumnContentRun { break_offset: 300.0, assumed_implicit_breaks: 2 };
        assert!((run.column_logical_height(0.0) - 100.0).abs() < 0.001);
    }
}
