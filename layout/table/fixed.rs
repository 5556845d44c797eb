/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Fixed table layout (§4.7 "table-layout: fixed"): column widths are
//! taken from the first row (or `<col>` elements) and never revisited
//! against cell content, matching CSS 2.1 §17.5.2.1.

use app_units::Au;

use crate::box_tree::{BoxKind, BoxTree};
use crate::layout::table::model::CellSlot;
use crate::style::Length;

/// Resolves each column's width from the first row's cells (falling back
/// to explicit `<col>` widths), distributing any remaining width equally
/// across columns left at `auto` (§4.7 "remaining width split evenly
/// among auto columns").
pub fn fixed_column_widths(tree: &BoxTree, slots: &[CellSlot], column_count: usize, available: Au) -> Vec<Au> {
    let mut widths: Vec<Option<Au>> = vec![None; column_count];

    for slot in slots.iter().filter(|s| s.row == 0) {
        let style = tree.get(slot.cell).header.style.clone();
        if let Some(w) = style.width.resolve(available) {
            let per_column = Au(w.0 / slot.col_span as i32);
            for c in slot.col..slot.col + slot.col_span as usize {
                if c < column_count {
                    widths[c] = Some(per_column);
                }
            }
        }
    }

    let fixed_total: Au = widths.iter().flatten().fold(Au(0), |a, &b| a + b);
    let auto_count = widths.iter().filter(|w| w.is_none()).count();
    let remaining = (available - fixed_total).max(Au(0));
    let share = if auto_count > 0 { Au(remaining.0 / auto_count as i32) } else { Au(0) };

    widths.into_iter().map(|w| w.unwrap_or(share)).collect()
}

/// True when `table-layout: fixed` applies and the table's own width is
/// not `auto` (§4.7 "fixed layout requires a definite table width").
pub fn applies(tree: &BoxTree, table: crate::box_tree::BoxId) -> bool {
    let b = tree.get(table);
    matches!(b.kind, BoxKind::Table(_)) && !matches!(b.header.style.width, Length::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::TableCellData;
    use crate::style::BoxStyleData;

    fn slot(cell: crate::box_tree::BoxId, col: usize, span: u32) -> CellSlot {
        CellSlot { cell, col, row: 0, col_span: span, row_span: 1 }
    }

    #[test]
    fn explicit_first_row_widths_drive_the_grid() {
        let style = std::sync::Arc::new(BoxStyleData { width: Length::Fixed(Au::from_px(100)), ..Default::default() });
        let tree = BoxTree::new(style.clone());
        let cell_a = tree.alloc(None, style.clone(), BoxKind::TableCell(TableCellData { col_span: 1, row_span: 1, col_index: 0, row_index: 0 }));
        let auto_style = std::sync::Arc::new(BoxStyleData::default());
        let cell_b = tree.alloc(None, auto_style, BoxKind::TableCell(TableCellData { col_span: 1, row_span: 1, col_index: 1, row_index: 0 }));
        let slots = vec![slot(cell_a, 0, 1), slot(cell_b, 1, 1)];
        let widths = fixed_column_widths(&tree, &slots, 2, Au::from_px(300));
        assert_eq!(widths[0], Au::from_px(100));
        assert_eq!(widths[1], Au::from_px(200));
    }
}
