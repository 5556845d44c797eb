/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Geometry types shared across layout, fragmentation and paint.
//!
//! Physical geometry uses `euclid`, matching the teacher crate. The
//! fragment-offset accumulator (§4.9 `enterFragment`/`leaveFragment`,
//! Design Notes "signed fixed-point") is its own small fixed-point type
//! rather than a float, so that nested fragment contexts never drift.

use app_units::Au;
use euclid::default::{Point2D, Rect, Size2D};

pub type Px = Au;
pub type PxPoint = Point2D<f32>;
pub type PxSize = Size2D<f32>;
pub type PxRect = Rect<f32>;

/// Scale applied to a physical offset to produce the fixed-point
/// accumulator used by `FragmentOffset` (`original_source` /
/// `fragmentbuilder.cpp`: `kFragmentFixedScale = 1000.0`).
const FRAGMENT_FIXED_SCALE: f64 = 1000.0;

/// Signed fixed-point cumulative fragmentainer offset (§4.9, Design Notes).
/// Incremented by `enter`, decremented by `leave`; immune to the float
/// drift a running `f32`/`f64` accumulator would pick up across deeply
/// nested fragment contexts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct FragmentOffset(i64);

impl FragmentOffset {
    pub const ZERO: FragmentOffset = FragmentOffset(0);

    pub fn enter(self, offset: f32) -> Self {
        FragmentOffset(self.0 + (offset as f64 * FRAGMENT_FIXED_SCALE).round() as i64)
    }

    pub fn leave(self, offset: f32) -> Self {
        FragmentOffset(self.0 - (offset as f64 * FRAGMENT_FIXED_SCALE).round() as i64)
    }

    pub fn as_px(self) -> f32 {
        (self.0 as f64 / FRAGMENT_FIXED_SCALE) as f32
    }
}

/// A point in flow-relative coordinates: `block` runs in the direction
/// content flows (down, for horizontal writing modes) and `inline` runs
/// along a line. Kept distinct from `PxPoint` so that block-layout code
/// cannot accidentally swap the axes (Design Notes calls out the amount of
/// axis confusion in the deep virtual hierarchy this crate replaces).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlowVec2 {
    pub inline: f32,
    pub block: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlowRect {
    pub start: FlowVec2,
    pub size: FlowSize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlowSize {
    pub inline: f32,
    pub block: f32,
}

impl FlowRect {
    pub fn block_start(&self) -> f32 {
        self.start.block
    }

    pub fn block_end(&self) -> f32 {
        self.start.block + self.size.block
    }

    pub fn inline_start(&self) -> f32 {
        self.start.inline
    }

    pub fn inline_end(&self) -> f32 {
        self.start.inline + self.size.inline
    }
}

/// An edge insets record (margin/padding/border), one value per physical
/// side, matching `BoxStyleData`'s four-sided style fields.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sides<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy + std::ops::Add<Output = T>> Sides<T> {
    pub fn horizontal(&self) -> T
    where
        T: Default,
    {
        self.left + self.right
    }

    pub fn vertical(&self) -> T
    where
        T: Default,
    {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_offset_round_trips_enter_leave() {
        let base = FragmentOffset::ZERO;
        let entered = base.enter(123.456);
        let left = entered.leave(123.456);
        assert_eq!(left, base);
    }

    #[test]
    fn fragment_offset_accumulates_as_px() {
        let offset = FragmentOffset::ZERO.enter(100.0).enter(50.0);
        assert!((offset.as_px() - 150.0).abs() < 0.001);
    }
}
