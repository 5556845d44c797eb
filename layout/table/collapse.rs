/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Collapsed table borders (§4.7 "border-collapse: collapse"): adjacent
//! cell/row/table edges are resolved to a single winning edge per CSS
//! 2.1 §17.6.2.1's border-conflict-resolution rules.

use app_units::Au;

use crate::box_tree::{BoxId, BoxTree};
use crate::layout::table::model::CellSlot;
use crate::style::{BorderEdge, LineStyle};

/// Source of a candidate edge, ordered by conflict-resolution priority
/// (cell wins over row, row over row-group, and so on).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeSource {
    Table,
    Column,
    RowGroup,
    Row,
    Cell,
}

impl EdgeSource {
    fn rank(self) -> u8 {
        match self {
            EdgeSource::Table => 1,
            EdgeSource::Column => 2,
            EdgeSource::RowGroup => 3,
            EdgeSource::Row => 4,
            EdgeSource::Cell => 5,
        }
    }
}

fn style_rank(style: LineStyle) -> u8 {
    match style {
        LineStyle::None => 0,
        LineStyle::Hidden => 1,
        LineStyle::Dotted => 2,
        LineStyle::Dashed => 3,
        LineStyle::Solid => 4,
        LineStyle::Double => 5,
        LineStyle::Groove => 6,
        LineStyle::Ridge => 7,
        LineStyle::Inset => 8,
        LineStyle::Outset => 9,
    }
}

/// Picks the winning edge between two candidates (§4.7, CSS 2.1
/// §17.6.2.1): `hidden` always wins outright; otherwise the widest edge
/// wins; ties break on style rank, then on source priority.
fn resolve_conflict(a: (BorderEdge, EdgeSource), b: (BorderEdge, EdgeSource)) -> BorderEdge {
    let ((edge_a, src_a), (edge_b, src_b)) = (a, b);
    if edge_a.style == LineStyle::Hidden {
        return edge_a;
    }
    if edge_b.style == LineStyle::Hidden {
        return edge_b;
    }
    if edge_a.width != edge_b.width {
        return if edge_a.width > edge_b.width { edge_a } else { edge_b };
    }
    let rank_a = style_rank(edge_a.style);
    let rank_b = style_rank(edge_b.style);
    if rank_a != rank_b {
        return if rank_a > rank_b { edge_a } else { edge_b };
    }
    if src_a.rank() >= src_b.rank() {
        edge_a
    } else {
        edge_b
    }
}

/// The resolved per-edge border grid for one collapsed-border table:
/// one horizontal edge per `(col, row)` boundary above each cell row,
/// one vertical edge per `(col, row)` boundary to the left of each cell
/// column, sized `(columns + 1) x (rows + 1)`.
#[derive(Clone, Debug, Default)]
pub struct CollapsedBorderGrid {
    pub columns: usize,
    pub rows: usize,
    horizontal: Vec<BorderEdge>,
    vertical: Vec<BorderEdge>,
}

impl CollapsedBorderGrid {
    fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            horizontal: vec![BorderEdge::NONE; (columns + 1) * (rows + 1)],
            vertical: vec![BorderEdge::NONE; (columns + 1) * (rows + 1)],
        }
    }

    pub fn horizontal_at(&self, col: usize, row: usize) -> BorderEdge {
        self.horizontal.get(row * (self.columns + 1) + col).copied().unwrap_or(BorderEdge::NONE)
    }

    pub fn vertical_at(&self, col: usize, row: usize) -> BorderEdge {
        self.vertical.get(row * (self.columns + 1) + col).copied().unwrap_or(BorderEdge::NONE)
    }

    fn merge_horizontal(&mut self, col: usize, row: usize, edge: BorderEdge, source: EdgeSource) {
        let index = row * (self.columns + 1) + col;
        if let Some(slot) = self.horizontal.get_mut(index) {
            *slot = resolve_conflict((*slot, EdgeSource::Table), (edge, source));
        }
    }

    fn merge_vertical(&mut self, col: usize, row: usize, edge: BorderEdge, source: EdgeSource) {
        let index = row * (self.columns + 1) + col;
        if let Some(slot) = self.vertical.get_mut(index) {
            *slot = resolve_conflict((*slot, EdgeSource::Table), (edge, source));
        }
    }

    /// Outer half of the widest border touching a given side, used to
    /// inset the table's border box once borders collapse (§4.7 "the
    /// table's own border box is inset by half its outermost collapsed
    /// border").
    pub fn outer_inset_left(&self) -> Au {
        Au((0..=self.rows).map(|r| self.vertical_at(0, r).width.0).max().unwrap_or(0) / 2)
    }

    pub fn outer_inset_top(&self) -> Au {
        Au((0..=self.columns).map(|c| self.horizontal_at(c, 0).width.0).max().unwrap_or(0) / 2)
    }
}

/// Builds the collapsed-border grid for a table's resolved slot layout,
/// merging each cell's four edges against its neighbors' shared edges
/// (§4.7 "collapsed borders are resolved once per table, after slot
/// assignment").
pub fn resolve_collapsed_borders(tree: &BoxTree, table: BoxId, slots: &[CellSlot], columns: usize, rows: usize) -> CollapsedBorderGrid {
    let mut grid = CollapsedBorderGrid::new(columns, rows);
    let table_style = tree.get(table).header.style.clone();

    for c in 0..=columns {
        grid.merge_vertical(c, 0, table_style.border_left, EdgeSource::Table);
    }
    for r in 0..=rows {
        grid.merge_horizontal(0, r, table_style.border_top, EdgeSource::Table);
    }

    for slot in slots {
        let style = tree.get(slot.cell).header.style.clone();
        let col_end = slot.col + slot.col_span as usize;
        let row_end = slot.row + slot.row_span as usize;

        for r in slot.row..row_end {
            grid.merge_vertical(slot.col, r, style.border_left, EdgeSource::Cell);
            grid.merge_vertical(col_end, r, style.border_right, EdgeSource::Cell);
        }
        for c in slot.col..col_end {
            grid.merge_horizontal(c, slot.row, style.border_top, EdgeSource::Cell);
            grid.merge_horizontal(c, row_end, style.border_bottom, EdgeSource::Cell);
        }
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_edge_always_wins_regardless_of_width() {
        let hidden = BorderEdge { width: Au(0), style: LineStyle::Hidden, color: crate::style::Color::TRANSPARENT };
        let thick_solid = BorderEdge { width: Au::from_px(10), style: LineStyle::Solid, color: crate::style::Color { r: 0, g: 0, b: 0, a: 255 } };
        let winner = resolve_conflict((hidden, EdgeSource::Cell), (thick_solid, EdgeSource::Table));
        assert_eq!(winner.style, LineStyle::Hidden);
    }

    #[test]
    fn wider_edge_wins_over_narrower_same_style() {
        let thin = BorderEdge { width: Au::from_px(1), style: LineStyle::Solid, color: crate::style::Color::TRANSPARENT };
        let thick = BorderEdge { width: Au::from_px(3), style: LineStyle::Solid, color: crate::style::Color::TRANSPARENT };
        let winner = resolve_conflict((thin, EdgeSource::Table), (thick, EdgeSource::Cell));
        assert_eq!(winner.width, Au::from_px(3));
    }
}
