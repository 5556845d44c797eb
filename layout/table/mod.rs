/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Table layout (§4.7): fixed/auto column sizing, row placement, and
//! optional collapsed borders, built on the shared slot-assignment model
//! in `model`.

pub mod auto;
pub mod collapse;
pub mod fixed;
pub mod model;

use app_units::Au;

use crate::box_tree::{BoxId, BoxKind, BoxTree};
use crate::layout::inline::breaker::Shaper;
use crate::layout::table::model::{assign_slots, height_for_row_sizing};
use crate::layout::{layout_box, LayoutContext};

/// Lays out a table box: assigns the cell grid, resolves column widths
/// (fixed or auto per `table-layout`), lays out each cell against its
/// column width, then sizes each row to its tallest cell (§4.7 full
/// pipeline; §8 invariant 3 "columns sum to the table's content width").
pub fn layout_table(ctx: &LayoutContext, tree: &BoxTree, box_id: BoxId, available_inline_size: Au, shaper: &mut dyn Shaper) {
    let style = tree.get(box_id).header.style.clone();
    tree.get_mut(box_id).header.frame.width = available_inline_size;
    let content_width = tree.get(box_id).header.content_box_width().max(Au(0));

    let (slots, columns, rows) = assign_slots(tree, box_id);

    let column_widths = if fixed::applies(tree, box_id) {
        fixed::fixed_column_widths(tree, &slots, columns, content_width)
    } else {
        auto::auto_column_widths(tree, &slots, columns, content_width, shaper)
    };

    if style.border_collapse {
        let grid = collapse::resolve_collapsed_borders(tree, box_id, &slots, columns, rows);
        if let BoxKind::Table(data) = &mut tree.get_mut(box_id).kind {
            data.border_collapse_grid = Some(grid);
        }
    }

    let mut column_x = vec![Au(0); columns + 1];
    for c in 0..columns {
        column_x[c + 1] = column_x[c] + column_widths.get(c).copied().unwrap_or(Au(0));
    }

    let mut row_heights = vec![Au(0); rows];
    for slot in &slots {
        let slot_width: Au = (slot.col..slot.col + slot.col_span as usize).filter_map(|c| column_widths.get(c)).fold(Au(0), |a, &b| a + b);
        layout_box(ctx, tree, slot.cell, slot_width, shaper);
        {
            let b = tree.get_mut(slot.cell);
            b.header.frame.override_width = Some(slot_width);
            b.header.frame.width = slot_width;
        }
        if slot.row_span == 1 {
            let height = height_for_row_sizing(tree, slot.cell);
            row_heights[slot.row] = row_heights[slot.row].max(height);
        }
    }

    // Spanning cells that need more height than their rows currently sum
    // to distribute the shortfall evenly (§9 Open Question: "excess
    // height from a rowspanning cell is distributed evenly across the
    // rows it spans, in proportion to row count rather than existing
    // height, for simplicity and determinism").
    for slot in slots.iter().filter(|s| s.row_span > 1) {
        let span_rows = slot.row..(slot.row + slot.row_span as usize).min(rows);
        let existing: Au = span_rows.clone().map(|r| row_heights[r]).fold(Au(0), |a, b| a + b);
        let needed = height_for_row_sizing(tree, slot.cell);
        if needed > existing {
            let shortfall = needed - existing;
            let share = Au(shortfall.0 / span_rows.len().max(1) as i32);
            for r in span_rows {
                row_heights[r] += share;
            }
        }
    }

    let mut row_y = vec![Au(0); rows + 1];
    for r in 0..rows {
        row_y[r + 1] = row_y[r] + row_heights[r];
    }

    for slot in &slots {
        let x = column_x.get(slot.col).copied().unwrap_or(Au(0));
        let y = row_y.get(slot.row).copied().unwrap_or(Au(0));
        let row_span_height: Au = (slot.row..slot.row + slot.row_span as usize).filter_map(|r| row_heights.get(r)).fold(Au(0), |a, &b| a + b);
        let b = tree.get_mut(slot.cell);
        b.header.frame.x = x;
        b.header.frame.y = y;
        b.header.frame.override_height = Some(row_span_height);
        b.header.frame.height = b.header.frame.height.max(row_span_height);
    }

    if let BoxKind::Table(data) = &mut tree.get_mut(box_id).kind {
        data.column_widths = column_widths;
    }

    let content_height = row_y.last().copied().unwrap_or(Au(0));
    tree.get_mut(box_id).header.frame.height = style
        .height
        .resolve(Au(0))
        .filter(|_| !style.height.is_auto())
        .unwrap_or(content_height)
        .max(content_height);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::{TableBoxData, TableCellData, TableRowData, TableSectionData, TextBoxData};
    use crate::config::LayoutConfig;
    use crate::style::BoxStyleData;

    struct NoopShaper;
    impl Shaper for NoopShaper {
        fn measure(&mut self, text: &str) -> Au {
            Au::from_px(10 * text.chars().count() as i32)
        }
        fn replaced_size(&self, _owner: BoxId) -> (Au, Au) {
            (Au(0), Au(0))
        }
    }

    struct NoopStyleEngine;
    impl crate::style::StyleEngine for NoopStyleEngine {
        fn style_for(&self, _node: crate::dom::NodeId, _parent_style: Option<&crate::style::BoxStyle>) -> Option<crate::style::BoxStyle> {
            None
        }
        fn pseudo_style_for(&self, _node: crate::dom::NodeId, _pseudo: &str, _parent_style: &crate::style::BoxStyle) -> Option<crate::style::BoxStyle> {
            None
        }
        fn style_for_page(&self, _page_name: crate::intern::InternedString, _page_index: u32, _pseudo: Option<crate::style::PagePseudo>) -> crate::style::BoxStyle {
            std::sync::Arc::new(BoxStyleData::default())
        }
        fn style_for_page_margin(
            &self,
            _page_name: crate::intern::InternedString,
            _page_index: u32,
            _margin_type: crate::style::PageMarginType,
            _page_style: &crate::style::BoxStyle,
        ) -> Option<crate::style::BoxStyle> {
            None
        }
        fn evaluate_media_feature(&self, _name: &str, _value: Option<&str>) -> bool {
            false
        }
        fn format_counter_text(&self, value: i64, _style_name: &str) -> String {
            value.to_string()
        }
    }

    fn style() -> crate::style::BoxStyle {
        std::sync::Arc::new(BoxStyleData::default())
    }

    #[test]
    fn two_column_table_sizes_rows_to_tallest_cell() {
        let tree = BoxTree::new(style());
        let table = tree.alloc(None, style(), BoxKind::Table(TableBoxData::default()));
        let section = tree.alloc(None, style(), BoxKind::TableSection(TableSectionData::default()));
        tree.append_child(table, section);
        if let BoxKind::Table(d) = &mut tree.get_mut(table).kind {
            d.sections.push(section);
        }
        let row = tree.alloc(None, style(), BoxKind::TableRow(TableRowData::default()));
        tree.append_child(section, row);

        let short_style = std::sync::Arc::new(BoxStyleData { height: crate::style::Length::Fixed(Au::from_px(20)), ..Default::default() });
        let tall_style = std::sync::Arc::new(BoxStyleData { height: crate::style::Length::Fixed(Au::from_px(50)), ..Default::default() });
        let cell_a = tree.alloc(None, short_style, BoxKind::TableCell(TableCellData { col_span: 1, row_span: 1, col_index: 0, row_index: 0 }));
        let cell_b = tree.alloc(None, tall_style, BoxKind::TableCell(TableCellData { col_span: 1, row_span: 1, col_index: 1, row_index: 0 }));
        let text = tree.alloc(None, style(), BoxKind::Text(TextBoxData { text: "x".into() }));
        tree.append_child(cell_a, text);
        tree.append_child(row, cell_a);
        tree.append_child(row, cell_b);

        let engine = NoopStyleEngine;
        let config = LayoutConfig::default();
        let ctx = LayoutContext { style_engine: &engine, config: &config };
        let mut shaper = NoopShaper;
        layout_table(&ctx, &tree, table, Au::from_px(400), &mut shaper);

        assert_eq!(tree.get(table).header.frame.height, Au::from_px(50));
        assert_eq!(tree.get(cell_b).header.frame.y, Au(0));
    }
}
