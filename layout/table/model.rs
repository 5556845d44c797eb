/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Shared table geometry model (§4.7): columns, sections, rows, cells, and
//! the slot grid that spanning cells are assigned into.

use app_units::Au;

use crate::box_tree::{BoxId, BoxKind, BoxTree};

/// One cell's position in the column/row grid, including spans (§3
/// "TableCellBox", §8 invariant 3).
#[derive(Clone, Copy, Debug)]
pub struct CellSlot {
    pub cell: BoxId,
    pub col: usize,
    pub row: usize,
    pub col_span: u32,
    pub row_span: u32,
}

/// Walks a table's sections/rows/cells and assigns each cell a
/// `(col, row)` slot, accounting for already-occupied slots from a
/// previous row's rowspan (§4.7 "Two algorithms share a table model of
/// columns, sections ... rows, and cells").
pub fn assign_slots(tree: &BoxTree, table: BoxId) -> (Vec<CellSlot>, usize, usize) {
    let mut slots = Vec::new();
    let mut occupied: Vec<Vec<bool>> = Vec::new();
    let mut row_index = 0usize;
    let mut max_cols = 0usize;

    let sections = match &tree.get(table).kind {
        BoxKind::Table(data) => data.sections.clone(),
        _ => return (slots, 0, 0),
    };
    for section in sections {
        for row in tree.children(section) {
            if !matches!(tree.get(row).kind, BoxKind::TableRow(_)) {
                continue;
            }
            if occupied.len() <= row_index {
                occupied.resize(row_index + 1, Vec::new());
            }
            let mut col = 0usize;
            for cell in tree.children(row) {
                let (col_span, row_span) = match &tree.get(cell).kind {
                    BoxKind::TableCell(d) => (d.col_span.max(1), d.row_span.max(1)),
                    _ => continue,
                };
                while is_occupied(&occupied, row_index, col) {
                    col += 1;
                }
                mark_occupied(&mut occupied, row_index, col, col_span, row_span);
                slots.push(CellSlot { cell, col, row: row_index, col_span, row_span });
                max_cols = max_cols.max(col + col_span as usize);
                col += col_span as usize;
            }
            row_index += 1;
        }
    }
    (slots, max_cols, row_index)
}

fn is_occupied(grid: &[Vec<bool>], row: usize, col: usize) -> bool {
    grid.get(row).and_then(|r| r.get(col)).copied().unwrap_or(false)
}

fn mark_occupied(grid: &mut Vec<Vec<bool>>, row: usize, col: usize, col_span: u32, row_span: u32) {
    for r in row..row + row_span as usize {
        if grid.len() <= r {
            grid.resize(r + 1, Vec::new());
        }
        let needed = col + col_span as usize;
        if grid[r].len() < needed {
            grid[r].resize(needed, false);
        }
        for c in col..needed {
            grid[r][c] = true;
        }
    }
}

/// Sorts spanning cells ascending by span width, for deferred distribution
/// after non-spanning cells have set each column's baseline bounds (§4.7
/// "Spanning cells are collected and sorted by ascending span").
pub fn spanning_cells_ascending(slots: &[CellSlot]) -> Vec<&CellSlot> {
    let mut spanning: Vec<&CellSlot> = slots.iter().filter(|s| s.col_span > 1).collect();
    spanning.sort_by_key(|s| s.col_span);
    spanning
}

/// Row height per cell (§4.7 "Row heights are the maximum cell
/// `heightForRowSizing`"): the larger of the cell's border-box height and
/// its CSS `height`, ignoring cells that span into this row from above.
pub fn height_for_row_sizing(tree: &BoxTree, cell: BoxId) -> Au {
    let b = tree.get(cell);
    let css_height = b.header.style.height.resolve(Au(0)).unwrap_or(Au(0));
    b.header.frame.height.max(css_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::{TableBoxData, TableCellData, TableRowData, TableSectionData};
    use crate::style::BoxStyleData;

    fn style() -> crate::style::BoxStyle {
        std::sync::Arc::new(BoxStyleData::default())
    }

    #[test]
    fn rowspan_cell_occupies_slots_in_the_next_row() {
        let tree = BoxTree::new(style());
        let table = tree.alloc(None, style(), BoxKind::Table(TableBoxData::default()));
        let section = tree.alloc(None, style(), BoxKind::TableSection(TableSectionData::default()));
        tree.append_child(table, section);
        if let BoxKind::Table(d) = &mut tree.get_mut(table).kind {
            d.sections.push(section);
        }

        let row0 = tree.alloc(None, style(), BoxKind::TableRow(TableRowData::default()));
        let row1 = tree.alloc(None, style(), BoxKind::TableRow(TableRowData::default()));
        tree.append_child(section, row0);
        tree.append_child(section, row1);

        let spanning = tree.alloc(None, style(), BoxKind::TableCell(TableCellData { col_span: 1, row_span: 2, col_index: 0, row_index: 0 }));
        let other_r0 = tree.alloc(None, style(), BoxKind::TableCell(TableCellData { col_span: 1, row_span: 1, col_index: 1, row_index: 0 }));
        let other_r1 = tree.alloc(None, style(), BoxKind::TableCell(TableCellData { col_span: 1, row_span: 1, col_index: 1, row_index: 1 }));
        tree.append_child(row0, spanning);
        tree.append_child(row0, other_r0);
        tree.append_child(row1, other_r1);

        let (slots, cols, rows) = assign_slots(&tree, table);
        assert_eq!(cols, 2);
        assert_eq!(rows, 2);
        let r1_other = slots.iter().find(|s| s.cell == other_r1).unwrap();
        assert_eq!(r1_other.col, 1);
    }
}
