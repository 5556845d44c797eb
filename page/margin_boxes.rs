/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The 16 named page-margin-box positions (§4.10, §3 "Page"): corner
//! boxes get a fixed outer rectangle; edge slots use a three-variable
//! start/center/end resolver.

use app_units::Au;
use euclid::default::{Point2D, Rect, Size2D};

use crate::geom::PxRect;
use crate::style::PageMarginType;

/// One of the four margin-area edges a `PageMarginBox` sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Which of a margin area's three slots a box occupies along its edge
/// (§4.10 "places start/center/end along the edge").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeSlot {
    Start,
    Center,
    End,
}

pub fn edge_and_slot(margin_type: PageMarginType) -> Option<(Edge, EdgeSlot)> {
    use PageMarginType::*;
    Some(match margin_type {
        TopLeft => (Edge::Top, EdgeSlot::Start),
        TopCenter => (Edge::Top, EdgeSlot::Center),
        TopRight => (Edge::Top, EdgeSlot::End),
        RightTop => (Edge::Right, EdgeSlot::Start),
        RightMiddle => (Edge::Right, EdgeSlot::Center),
        RightBottom => (Edge::Right, EdgeSlot::End),
        BottomRight => (Edge::Bottom, EdgeSlot::Start),
        BottomCenter => (Edge::Bottom, EdgeSlot::Center),
        BottomLeft => (Edge::Bottom, EdgeSlot::End),
        LeftBottom => (Edge::Left, EdgeSlot::Start),
        LeftMiddle => (Edge::Left, EdgeSlot::Center),
        LeftTop => (Edge::Left, EdgeSlot::End),
        TopLeftCorner | TopRightCorner | BottomRightCorner | BottomLeftCorner => return None,
    })
}

/// A corner box's fixed outer rectangle, sized by the two margins it
/// straddles (§4.10 "each corner box receives a fixed outer rectangle").
pub fn corner_rect(margin_type: PageMarginType, page_size: (Au, Au), margins: (Au, Au, Au, Au)) -> Option<PxRect> {
    let (page_width, page_height) = page_size;
    let (top, right, bottom, left) = margins;
    use PageMarginType::*;
    let (x, y, w, h) = match margin_type {
        TopLeftCorner => (Au(0), Au(0), left, top),
        TopRightCorner => (page_width - right, Au(0), right, top),
        BottomRightCorner => (page_width - right, page_height - bottom, right, bottom),
        BottomLeftCorner => (Au(0), page_height - bottom, left, bottom),
        _ => return None,
    };
    Some(Rect::new(Point2D::new(x.to_f32_px(), y.to_f32_px()), Size2D::new(w.to_f32_px().max(0.0), h.to_f32_px().max(0.0))))
}

/// One box's natural size along the edge's main axis, clamped by its own
/// min/max (§4.10 "respects auto sizes and the preferred min/max of each
/// box").
#[derive(Clone, Copy, Debug)]
pub struct SlotBox {
    pub preferred: f32,
    pub min: f32,
    pub max: f32,
}

impl SlotBox {
    fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(if self.max > 0.0 { self.max } else { f32::MAX })
    }
}

/// Resolves start/center/end box widths (or heights, for the left/right
/// edges) against the available run of the edge, shrinking all three
/// proportionally if they overflow (§4.10 three-variable resolver).
pub fn resolve_edge_run(available: f32, start: SlotBox, center: SlotBox, end: SlotBox) -> (f32, f32, f32) {
    let total = start.preferred + center.preferred + end.preferred;
    if total <= available || total <= 0.0 {
        return (start.clamp(start.preferred), center.clamp(center.preferred), end.clamp(end.preferred));
    }
    let scale = available / total;
    (
        start.clamp(start.preferred * scale),
        center.clamp(center.preferred * scale),
        end.clamp(end.preferred * scale),
    )
}

/// Positions the three resolved sizes along `[run_start, run_start +
/// available]`: start flush to the beginning, end flush to the end,
/// center in the middle of the remaining run (§4.10 "text-align-like
/// distribution").
pub fn position_edge_run(run_start: f32, available: f32, sizes: (f32, f32, f32)) -> (f32, f32, f32) {
    let (start_size, center_size, end_size) = sizes;
    let start_pos = run_start;
    let end_pos = run_start + available - end_size;
    let center_pos = run_start + (available - center_size) / 2.0;
    (start_pos, center_pos, end_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_run_fits_without_scaling_when_under_budget() {
        let b = SlotBox { preferred: 50.0, min: 0.0, max: 0.0 };
        let (s, c, e) = resolve_edge_run(300.0, b, b, b);
        assert_eq!((s, c, e), (50.0, 50.0, 50.0));
    }

    #[test]
    fn edge_run_shrinks_proportionally_when_overflowing() {
        let b = SlotBox { preferred: 150.0, min: 0.0, max: 0.0 };
        let (s, c, e) = resolve_edge_run(300.0, b, b, b);
        assert!((s - 100.0).abs() < 0.01);
        assert!((c - 100.0).abs() < 0.01);
        assert!((e - 100.0).abs() < 0.01);
    }

    #[test]
    fn center_box_sits_in_the_middle_of_the_run() {
        let (_, center_pos, _) = position_edge_run(0.0, 300.0, (50.0, 50.0, 50.0));
        assert!((center_pos - 125.0).abs() < 0.01);
    }

    #[test]
    fn top_left_corner_sizes_to_left_and_top_margins() {
        let rect = corner_rect(PageMarginType::TopLeftCorner, (Au::from_px(800), Au::from_px(1000)), (Au::from_px(40), Au::from_px(30), Au::from_px(40), Au::from_px(50))).unwrap();
        assert_eq!(rect.size.width, 50.0);
        assert_eq!(rect.size.height, 40.0);
    }
}
