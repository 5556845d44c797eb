/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Float placement (§4.3 "Floats", §4.5 "Float + line interaction").
//!
//! Grounded in the teacher's `layout_2020/tests/floats.rs` `FloatBand`/
//! `FloatContext` model: floats are kept in an ordered list and placement
//! walks downward from the candidate Y querying the rightmost left-float
//! edge and leftmost right-float edge ("bottom-probe"), rather than a band
//! interval tree, matching spec's simpler "iterate downward... querying
//! the rightmost left-float edge" wording.

use app_units::Au;
use smallvec::SmallVec;

use crate::box_tree::BoxId;
use crate::style::Float;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatSide {
    Left,
    Right,
}

impl From<Float> for FloatSide {
    fn from(value: Float) -> Self {
        match value {
            Float::Right => FloatSide::Right,
            _ => FloatSide::Left,
        }
    }
}

/// One placed float, in the coordinate space of the block that owns the
/// float list.
#[derive(Clone, Copy, Debug)]
pub struct FloatItem {
    pub box_id: BoxId,
    pub side: FloatSide,
    pub rect: euclid::default::Rect<Au>,
}

impl FloatItem {
    pub fn top(&self) -> Au {
        self.rect.origin.y
    }

    pub fn bottom(&self) -> Au {
        self.rect.origin.y + self.rect.size.height
    }

    pub fn left(&self) -> Au {
        self.rect.origin.x
    }

    pub fn right(&self) -> Au {
        self.rect.origin.x + self.rect.size.width
    }
}

/// Floats established within one block formatting context, insertion
/// ordered (§3 "Floats: held in an ordered list keyed by insertion").
#[derive(Clone, Debug, Default)]
pub struct FloatList {
    floats: SmallVec<[FloatItem; 4]>,
}

impl FloatList {
    pub fn new() -> Self {
        Self { floats: SmallVec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }

    pub fn push(&mut self, item: FloatItem) {
        self.floats.push(item);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FloatItem> {
        self.floats.iter()
    }

    /// The rightmost edge of any left float whose vertical interval covers
    /// `y` (§4.5 "bottom-probe"); `container_left` if none.
    pub fn left_offset_at(&self, y: Au, container_left: Au) -> Au {
        self.floats
            .iter()
            .filter(|f| f.side == FloatSide::Left && f.top() <= y && f.bottom() > y)
            .map(|f| f.right())
            .max()
            .unwrap_or(container_left)
    }

    /// The leftmost edge of any right float whose vertical interval covers
    /// `y`; `container_right` if none.
    pub fn right_offset_at(&self, y: Au, container_right: Au) -> Au {
        self.floats
            .iter()
            .filter(|f| f.side == FloatSide::Right && f.top() <= y && f.bottom() > y)
            .map(|f| f.left())
            .min()
            .unwrap_or(container_right)
    }

    /// The first Y at or after `start_y` where a float of `size` placed on
    /// `side` would fit within `[container_left, container_right]`,
    /// stepping by the bottom edge of whichever obstructing float is
    /// nearer (§4.3 "iterate downward... until the float fits or clears;
    /// ties... broken by min-step").
    pub fn first_fit(&self, side: FloatSide, size: euclid::default::Size2D<Au>, start_y: Au, container_left: Au, container_right: Au) -> Au {
        let mut y = start_y;
        loop {
            let left = self.left_offset_at(y, container_left);
            let right = self.right_offset_at(y, container_right);
            let available = right - left;
            if available >= size.width {
                return y;
            }
            let next_left_step = self
                .floats
                .iter()
                .filter(|f| f.side == FloatSide::Left && f.bottom() > y)
                .map(|f| f.bottom())
                .min();
            let next_right_step = self
                .floats
                .iter()
                .filter(|f| f.side == FloatSide::Right && f.bottom() > y)
                .map(|f| f.bottom())
                .min();
            let step = match (next_left_step, next_right_step) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => return y,
            };
            let _ = side;
            y = step;
        }
    }

    /// The bottom edge of the lowest float on `side`, if any.
    pub fn clearance(&self, side: crate::style::Clear) -> Option<Au> {
        let matches_side = |f_side: FloatSide| match side {
            crate::style::Clear::Left => f_side == FloatSide::Left,
            crate::style::Clear::Right => f_side == FloatSide::Right,
            crate::style::Clear::Both => true,
            crate::style::Clear::None => false,
        };
        self.floats.iter().filter(|f| matches_side(f.side)).map(|f| f.bottom()).max()
    }

    /// The lowest bottom edge among all floats, used to expand a block's
    /// height when it establishes a new block formatting context and
    /// avoids floats (§8 invariant 8: "A float taller than the block
    /// expands `B.height`... when `B` avoids floats").
    pub fn lowest_bottom(&self) -> Option<Au> {
        self.floats.iter().map(|f| f.bottom()).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::{BoxKind, BoxTree};

    fn dummy_box_id() -> BoxId {
        let style: crate::style::BoxStyle = std::sync::Arc::new(crate::style::BoxStyleData::default());
        let tree = BoxTree::new(style.clone());
        tree.alloc(None, style, BoxKind::View)
    }

    fn float(side: FloatSide, x: i32, y: i32, w: i32, h: i32) -> FloatItem {
        FloatItem {
            box_id: dummy_box_id(),
            side,
            rect: euclid::default::Rect::new(
                euclid::default::Point2D::new(Au::from_px(x), Au::from_px(y)),
                euclid::default::Size2D::new(Au::from_px(w), Au::from_px(h)),
            ),
        }
    }

    #[test]
    fn left_offset_tracks_rightmost_left_float_at_y() {
        let mut floats = FloatList::new();
        floats.push(float(FloatSide::Left, 0, 0, 100, 200));
        assert_eq!(floats.left_offset_at(Au::from_px(50), Au(0)), Au::from_px(100));
        assert_eq!(floats.left_offset_at(Au::from_px(250), Au(0)), Au(0));
    }

    #[test]
    fn first_fit_steps_past_an_obstruction() {
        let mut floats = FloatList::new();
        floats.push(float(FloatSide::Left, 0, 0, 350, 200));
        let size = euclid::default::Size2D::new(Au::from_px(100), Au::from_px(50));
        let y = floats.first_fit(FloatSide::Left, size, Au(0), Au(0), Au::from_px(400));
        assert_eq!(y, Au::from_px(200));
    }

    #[test]
    fn no_placed_floats_fits_immediately() {
        let floats = FloatList::new();
        let size = euclid::default::Size2D::new(Au::from_px(100), Au::from_px(50));
        let y = floats.first_fit(FloatSide::Left, size, Au(0), Au(0), Au::from_px(400));
        assert_eq!(y, Au(0));
    }

    // Property-based testing for `first_fit`, grounded in the teacher's
    // `layout_2020/tests/floats.rs` `FloatInput`/`Arbitrary` + rule-checking
    // pattern, scaled down to the rules this crate's bottom-probe model
    // (rather than a `FloatBand` AA tree) can state.
    #[derive(Clone, Debug)]
    struct ArbitraryFloat {
        side: FloatSide,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
    }

    impl quickcheck::Arbitrary for ArbitraryFloat {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            let is_left = bool::arbitrary(g);
            ArbitraryFloat {
                side: if is_left { FloatSide::Left } else { FloatSide::Right },
                x: u16::arbitrary(g) % 2000,
                y: u16::arbitrary(g) % 2000,
                w: u16::arbitrary(g) % 500 + 1,
                h: u16::arbitrary(g) % 500 + 1,
            }
        }
    }

    fn build_list(items: &[ArbitraryFloat]) -> FloatList {
        let mut list = FloatList::new();
        for f in items {
            list.push(float(f.side, f.x as i32, f.y as i32, f.w as i32, f.h as i32));
        }
        list
    }

    // `first_fit` only ever steps forward from `start_y` (§4.3 "iterate
    // downward").
    #[test]
    fn first_fit_never_returns_before_start_y() {
        let f: fn(Vec<ArbitraryFloat>, u16, u16) = check;
        quickcheck::quickcheck(f);
        fn check(items: Vec<ArbitraryFloat>, start: u16, width: u16) {
            let list = build_list(&items);
            let start_y = Au::from_px(start as i32);
            let size = euclid::default::Size2D::new(Au::from_px((width % 3000) as i32), Au::from_px(20));
            let y = list.first_fit(FloatSide::Left, size, start_y, Au(0), Au::from_px(4000));
            assert!(y >= start_y);
        }
    }

    // At the Y `first_fit` settles on, either the requested width already
    // fits between the left/right float edges, or every float has already
    // ended there (no further obstruction remains to step past).
    #[test]
    fn first_fit_settles_once_width_fits_or_floats_are_exhausted() {
        let f: fn(Vec<ArbitraryFloat>, u16) = check;
        quickcheck::quickcheck(f);
        fn check(items: Vec<ArbitraryFloat>, width: u16) {
            let list = build_list(&items);
            let container_left = Au(0);
            let container_right = Au::from_px(4000);
            let size = euclid::default::Size2D::new(Au::from_px((width % 3000) as i32), Au::from_px(20));
            let y = list.first_fit(FloatSide::Left, size, Au(0), container_left, container_right);
            let available = list.right_offset_at(y, container_right) - list.left_offset_at(y, container_left);
            assert!(available >= size.width || list.iter().all(|item| item.bottom() <= y));
        }
    }
}
