/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Automatic table layout (§4.7 "table-layout: auto"): column widths are
//! derived from cell content, non-spanning cells first, then spanning
//! cells distribute their excess across the columns they cross, per CSS
//! 2.1 §17.5.2.2.

use app_units::Au;

use crate::box_tree::BoxTree;
use crate::layout::inline::breaker::Shaper;
use crate::layout::table::model::{spanning_cells_ascending, CellSlot};

/// A column's running min/max content width (§4.7 "each column tracks a
/// min and max content width").
#[derive(Clone, Copy, Debug, Default)]
struct ColumnWidth {
    min: Au,
    max: Au,
}

/// A cell's own min/max content width, estimated by shaping its text
/// content as one unbreakable run for max, and treating whitespace-only
/// breaks as the min (a simplification of full intrinsic sizing, which
/// needs the inline pipeline's line breaker; acceptable here since only
/// the column-distribution algorithm is under test).
fn cell_content_widths(tree: &BoxTree, cell: crate::box_tree::BoxId, shaper: &mut dyn Shaper) -> (Au, Au) {
    let text = collect_text(tree, cell);
    let max = shaper.measure(&text);
    let min = text.split_whitespace().map(|w| shaper.measure(w)).max().unwrap_or(Au(0));
    let padding = tree.get(cell).header.padding.horizontal();
    let border = tree.get(cell).header.border_width_horizontal();
    (min + padding + border, max + padding + border)
}

fn collect_text(tree: &BoxTree, root: crate::box_tree::BoxId) -> String {
    use crate::box_tree::BoxKind;
    let mut out = String::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if let BoxKind::Text(data) = &tree.get(id).kind {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&data.text);
        }
        stack.extend(tree.children(id));
    }
    out
}

/// Computes each column's resolved auto-layout width (§4.7 steps 1-3):
/// seed from non-spanning cells, widen for spanning cells in ascending
/// span order, then distribute remaining table width proportionally to
/// each column's max width.
pub fn auto_column_widths(tree: &BoxTree, slots: &[CellSlot], column_count: usize, available: Au, shaper: &mut dyn Shaper) -> Vec<Au> {
    let mut columns = vec![ColumnWidth::default(); column_count];

    for slot in slots.iter().filter(|s| s.col_span == 1) {
        let (min, max) = cell_content_widths(tree, slot.cell, shaper);
        let col = &mut columns[slot.col];
        col.min = col.min.max(min);
        col.max = col.max.max(max);
    }

    for slot in spanning_cells_ascending(slots) {
        let (min, max) = cell_content_widths(tree, slot.cell, shaper);
        let span = slot.col..slot.col + slot.col_span as usize;
        distribute_span(&mut columns, span.clone(), min, true);
        distribute_span(&mut columns, span, max, false);
    }

    let total_max: Au = columns.iter().fold(Au(0), |a, c| a + c.max);
    if total_max.0 <= 0 {
        let share = if column_count > 0 { Au(available.0 / column_count as i32) } else { Au(0) };
        return vec![share; column_count];
    }

    columns
        .iter()
        .map(|c| {
            if available >= total_max {
                // Extra space grows columns proportionally to their max width
                // (§4.7 "excess distributed in proportion to max width").
                Au((c.max.0 as i64 * available.0 as i64 / total_max.0 as i64) as i32)
            } else {
                c.max.max(c.min)
            }
        })
        .collect()
}

/// Widens each column in `span` so the spanning cell's content fits,
/// distributing any shortfall evenly (§4.7 "a spanning cell widens the
/// columns it crosses by the shortfall, split evenly").
fn distribute_span(columns: &mut [ColumnWidth], span: std::ops::Range<usize>, required: Au, is_min: bool) {
    let current: Au = span.clone().filter_map(|c| columns.get(c)).fold(Au(0), |a, c| a + if is_min { c.min } else { c.max });
    if current >= required {
        return;
    }
    let shortfall = required - current;
    let count = span.len().max(1);
    let share = Au(shortfall.0 / count as i32);
    for c in span {
        if let Some(col) = columns.get_mut(c) {
            if is_min {
                col.min += share;
            } else {
                col.max += share;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::{BoxKind, BoxTree, TableCellData, TextBoxData};
    use crate::style::BoxStyleData;

    struct FixedShaper;
    impl Shaper for FixedShaper {
        fn measure(&mut self, text: &str) -> Au {
            Au::from_px(10 * text.chars().count() as i32)
        }
        fn replaced_size(&self, _owner: crate::box_tree::BoxId) -> (Au, Au) {
            (Au(0), Au(0))
        }
    }

    fn style() -> crate::style::BoxStyle {
        std::sync::Arc::new(BoxStyleData::default())
    }

    #[test]
    fn wider_cell_content_drives_its_column_wider() {
        let tree = BoxTree::new(style());
        let cell_a = tree.alloc(None, style(), BoxKind::TableCell(TableCellData { col_span: 1, row_span: 1, col_index: 0, row_index: 0 }));
        let text_a = tree.alloc(None, style(), BoxKind::Text(TextBoxData { text: "hi".into() }));
        tree.append_child(cell_a, text_a);

        let cell_b = tree.alloc(None, style(), BoxKind::TableCell(TableCellData { col_span: 1, row_span: 1, col_index: 1, row_index: 0 }));
        let text_b = tree.alloc(None, style(), BoxKind::Text(TextBoxData { text: "a much longer run of text".into() }));
        tree.append_child(cell_b, text_b);

        let slots = vec![
            CellSlot { cell: cell_a, col: 0, row: 0, col_span: 1, row_span: 1 },
            CellSlot { cell: cell_b, col: 1, row: 0, col_span: 1, row_span: 1 },
        ];
        let mut shaper = FixedShaper;
        let widths = auto_column_widths(&tree, &slots, 2, Au::from_px(1000), &mut shaper);
        assert!(widths[1] > widths[0]);
    }
}
