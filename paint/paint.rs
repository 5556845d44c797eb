/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The paint traversal (§4.11): walks the layer tree in z-order; each
//! layer paints its own box subtree, stopping at any descendant that owns
//! a nested layer (painted by the next step of the z-order walk instead).
//! Per box: Decorations (background, then border), Floats (floating
//! children painted before in-flow ones, as they are earlier in paint
//! order but later in tree order for position), Contents, Outlines.
//! This crate's `GraphicsContext` has no text/image primitive, so
//! Contents/Outlines reduce to recursing into descendants; the phase
//! structure is kept because collapsed table borders and stacking still
//! need the same ordering the teacher's display-list builder used.

use app_units::Au;
use euclid::default::{Point2D, Rect, Size2D};

use crate::box_tree::layer::{LayerId, LayerTree};
use crate::box_tree::{BoxId, BoxKind, BoxTree};
use crate::external::{BlendMode, GraphicsContext, Transform2D};
use crate::geom::PxRect;
use crate::paint::border::{self, Side};
use crate::style::Position;

/// Paints everything reachable from `layer_id` downward, in ascending
/// z-index order at each level (§4.11).
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "paint::paint_layer", skip_all, fields(servo_profiling = true), level = "trace")
)]
pub fn paint_layer(ctx: &mut dyn GraphicsContext, tree: &BoxTree, layers: &LayerTree, layer_id: LayerId) {
    let layer = layers.get(layer_id);
    let owner = layer.owner;
    let style = tree.get(owner).header.style.clone();
    let origin = Point2D::new(layer.absolute_location.x.to_f32_px(), layer.absolute_location.y.to_f32_px());

    ctx.save();
    if let Some(t) = layer.transform {
        ctx.push_transform(Transform2D { a: t.m11, b: t.m12, c: t.m21, d: t.m22, e: t.m31, f: t.m32 });
    }
    if style.opacity < 1.0 {
        ctx.push_group(style.opacity, BlendMode::Normal);
    }
    if style.overflow_hidden {
        let frame = &tree.get(owner).header.frame;
        ctx.push_clip(Rect::new(origin, Size2D::new(frame.width.to_f32_px().max(0.0), frame.height.to_f32_px().max(0.0))));
    }

    paint_box_subtree(ctx, tree, owner, origin);

    let mut children = layer.children.clone();
    children.sort_by_key(|&id| layers.get(id).z_index);
    for child in children {
        paint_layer(ctx, tree, layers, child);
    }

    if style.overflow_hidden {
        ctx.pop_clip();
    }
    if style.opacity < 1.0 {
        ctx.pop_group();
    }
    if layer.transform.is_some() {
        ctx.pop_transform();
    }
    ctx.restore();
}

/// Paints `box_id` at `origin` (its border box's absolute top-left), then
/// recurses into children that do not own a layer of their own.
fn paint_box_subtree(ctx: &mut dyn GraphicsContext, tree: &BoxTree, box_id: BoxId, origin: Point2D<f32>) {
    let b = tree.get(box_id);
    let frame = &b.header.frame;
    let border_box = Rect::new(origin, Size2D::new(frame.width.to_f32_px().max(0.0), frame.height.to_f32_px().max(0.0)));

    paint_decorations(ctx, tree, box_id, border_box);

    for child in tree.children(box_id) {
        if tree.get(child).header.layer.is_some() {
            continue;
        }
        let cframe = &tree.get(child).header.frame;
        let child_origin = Point2D::new(origin.x + cframe.x.to_f32_px(), origin.y + cframe.y.to_f32_px());
        paint_box_subtree(ctx, tree, child, child_origin);
    }
}

/// Decorations phase: background fill, then border sides — or, for a
/// collapsed-border table, the resolved collapsed grid instead of each
/// cell's own border (§4.7, §4.11).
fn paint_decorations(ctx: &mut dyn GraphicsContext, tree: &BoxTree, box_id: BoxId, border_box: PxRect) {
    let style = &tree.get(box_id).header.style;
    if style.background_color.is_visible() {
        ctx.set_fill_color(style.background_color);
        ctx.fill_rect(border_box);
    }

    if let BoxKind::Table(data) = &tree.get(box_id).kind {
        if let Some(grid) = &data.border_collapse_grid {
            let (column_x, row_y) = grid_geometry(tree, box_id, grid.columns, grid.rows);
            border::paint_collapsed_borders(ctx, grid, euclid::default::Point2D::new(border_box.origin.x, border_box.origin.y), &column_x, &row_y);
            return;
        }
    }

    border::paint_borders(
        ctx,
        border_box,
        [
            (Side::Top, style.border_top),
            (Side::Right, style.border_right),
            (Side::Bottom, style.border_bottom),
            (Side::Left, style.border_left),
        ],
    );
}

/// Reconstructs column/row boundary offsets (relative to the table's
/// border box) from its resolved column widths and cell positions, for
/// drawing the collapsed-border grid (§4.7).
fn grid_geometry(tree: &BoxTree, table: BoxId, columns: usize, rows: usize) -> (Vec<f32>, Vec<f32>) {
    let mut column_x = vec![0.0f32; columns + 1];
    if let BoxKind::Table(data) = &tree.get(table).kind {
        let mut x = Au(0);
        for (i, w) in data.column_widths.iter().enumerate().take(columns) {
            column_x[i] = x.to_f32_px();
            x += *w;
        }
        column_x[columns] = x.to_f32_px();
    }

    let mut row_y = vec![0.0f32; rows + 1];
    let mut row_bottom = vec![0.0f32; rows + 1];
    if let BoxKind::Table(data) = &tree.get(table).kind {
        for &section in &data.sections {
            let rows_in_section = match &tree.get(section).kind {
                BoxKind::TableSection(s) => s.rows.clone(),
                _ => Vec::new(),
            };
            for row in rows_in_section {
                let (row_index, cells) = match &tree.get(row).kind {
                    BoxKind::TableRow(r) => (r.row_index, r.cells.clone()),
                    _ => continue,
                };
                if row_index >= rows {
                    continue;
                }
                for cell in cells {
                    let frame = &tree.get(cell).header.frame;
                    let top = frame.y.to_f32_px();
                    let bottom = top + frame.height.to_f32_px();
                    if row_y[row_index] == 0.0 || top < row_y[row_index] {
                        row_y[row_index] = top;
                    }
                    row_bottom[row_index] = row_bottom[row_index].max(bottom);
                }
            }
        }
    }
    for r in 1..=rows {
        if row_y[r] == 0.0 {
            row_y[r] = row_bottom[r - 1];
        }
    }
    if rows > 0 {
        row_y[rows] = row_y[rows].max(row_bottom[rows - 1]);
    }
    (column_x, row_y)
}

/// Paints `box_id`'s own subtree at `origin` without going through a
/// `LayerTree` at all. Used for page and margin boxes (§4.10), which are
/// built as standalone roots never reachable from the document's own
/// layer tree.
pub fn paint_standalone(ctx: &mut dyn GraphicsContext, tree: &BoxTree, box_id: BoxId, origin: crate::geom::PxPoint) {
    paint_box_subtree(ctx, tree, box_id, Point2D::new(origin.x, origin.y));
}

/// Whether a box's own box subtree should be skipped by the parent layer's
/// traversal because it's about to be painted under its own layer
/// (§4.11 "a box that owns a layer is painted once, as part of that
/// layer's z-order slot").
pub fn owns_layer(tree: &BoxTree, box_id: BoxId) -> bool {
    tree.get(box_id).header.layer.is_some()
}

/// True for `position: fixed` boxes, which paint at a fixed location
/// within the viewport rather than scrolling with the page content.
pub fn is_fixed(tree: &BoxTree, box_id: BoxId) -> bool {
    tree.get(box_id).header.style.position == Position::Fixed
}
