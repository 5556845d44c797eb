/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Multi-column flow (§4.8): balances the content of each column row
//! across N columns, splitting the flow into row/spanner siblings
//! wherever a `column-span: all` child interrupts it. Grounded in
//! `multicolumnbox.cpp`'s content-run balancing, exposed here through the
//! shared `FragmentBuilder` protocol (`fragment::MultiColumnContentRuns`).
//! The row/spanner boxes themselves are inserted by
//! `box_tree::construct::insert_multicol_flow_boxes`; this module only
//! lays them out once they exist.

use app_units::Au;

use crate::box_tree::{BoxId, BoxKind, BoxTree};
use crate::fragment::{FragmentBoundaryRule, FragmentBuilder, FragmentKind, MultiColumnContentRuns};
use crate::geom::FragmentOffset;
use crate::layout::inline::breaker::Shaper;
use crate::layout::{layout_box, LayoutContext};
use crate::style::ColumnFill;

/// A column fragmentainer whose height can be tuned by the balancing
/// loop (§4.8 step 2).
struct ColumnFragmentainer {
    column_height: f32,
    offset: FragmentOffset,
}

impl FragmentBuilder for ColumnFragmentainer {
    fn fragment_kind(&self) -> FragmentKind {
        FragmentKind::Column
    }

    fn fragment_height_for_offset(&self, _offset: f32) -> f32 {
        self.column_height
    }

    fn fragment_remaining_height_for_offset(&self, offset: f32, _rule: FragmentBoundaryRule) -> f32 {
        if self.column_height <= 0.0 {
            return 0.0;
        }
        let into_column = offset % self.column_height;
        self.column_height - into_column
    }

    fn fragment_cumulative_offset(&self) -> FragmentOffset {
        self.offset
    }

    fn set_fragment_cumulative_offset(&mut self, offset: FragmentOffset) {
        self.offset = offset;
    }
}

/// Resolves the column count and per-column width from `columns`/
/// `column-width`/`column-count` against the available inline size
/// (§4.8 "column-width and column-count interact per CSS Multi-column
/// §2").
fn resolve_columns(tree: &BoxTree, box_id: BoxId, available_inline_size: Au) -> (usize, Au, Au) {
    let style = tree.get(box_id).header.style.clone();
    let gap = style.column_gap.resolve(available_inline_size).unwrap_or_else(|| style.font_size);

    match (style.column_count, style.column_width.resolve(available_inline_size)) {
        (Some(count), Some(width)) => {
            let count = count.max(1) as usize;
            (count, width, gap)
        }
        (Some(count), None) => {
            let count = count.max(1) as usize;
            let total_gap = gap * (count as i32 - 1).max(0);
            let width = Au(((available_inline_size - total_gap).0 / count as i32).max(0));
            (count, width, gap)
        }
        (None, Some(width)) => {
            let width = width.max(Au::from_px(1));
            let count = (((available_inline_size + gap).0 / (width + gap).0).max(1)) as usize;
            (count, width, gap)
        }
        (None, None) => (1, available_inline_size, gap),
    }
}

/// Lays out a multi-column flow box: its children are `MultiColumnRow`
/// boxes (balanced content runs) interleaved with `MultiColumnSpan` boxes
/// (full-measure content that interrupts the rows), stacked top to bottom
/// (§4.8 "the first spanner splits the initial row into two, the spanner
/// becomes a sibling of both").
pub fn layout_multicol(ctx: &LayoutContext, tree: &BoxTree, box_id: BoxId, available_inline_size: Au, shaper: &mut dyn Shaper) {
    let rows_and_spans: Vec<BoxId> = tree.children(box_id).collect();
    let mut y = Au(0);
    for &child in &rows_and_spans {
        let kind_is_row = matches!(tree.get(child).kind, BoxKind::MultiColumnRow(_));
        let height = if kind_is_row {
            layout_multicol_row(ctx, tree, box_id, child, available_inline_size, shaper, y)
        } else {
            layout_multicol_span(ctx, tree, child, available_inline_size, shaper, y)
        };
        y += height;
    }

    tree.get_mut(box_id).header.frame.width = available_inline_size;
    tree.get_mut(box_id).header.frame.height = y;
}

/// Lays out one `MultiColumnRow`'s children stacked vertically at one
/// column's width to measure natural heights, then balances them across
/// the resolved column count using content-run tracking (§4.8 steps 1-2),
/// recording the result on the row's `MultiColumnRowData`.
fn layout_multicol_row(ctx: &LayoutContext, tree: &BoxTree, flow: BoxId, row: BoxId, available_inline_size: Au, shaper: &mut dyn Shaper, row_top: Au) -> Au {
    let style = tree.get(flow).header.style.clone();
    let (column_count, column_width, column_gap) = resolve_columns(tree, flow, available_inline_size);

    let children: Vec<BoxId> = tree.children(row).collect();
    let mut heights = Vec::with_capacity(children.len());
    let mut total_height: f32 = 0.0;
    for &child in &children {
        layout_box(ctx, tree, child, column_width, shaper);
        let h = tree.get(child).header.frame.height.to_f32_px();
        heights.push(h);
        total_height += h;
    }

    let (column_height, runs, min_space_shortage, min_column_height) = if column_count <= 1 || style.column_fill == ColumnFill::Auto {
        // `column-fill: auto` (and the degenerate single-column case)
        // fills one column to the row's natural height rather than
        // balancing (§4.8 "column-fill: auto does not balance").
        let height = total_height.max(1.0);
        (height, MultiColumnContentRuns::default(), 0.0, height)
    } else {
        balance_columns(ctx, &heights, column_count, total_height)
    };

    place_columns(tree, &children, &heights, column_height, column_count, column_width, column_gap);

    if let BoxKind::MultiColumnRow(data) = &mut tree.get_mut(row).kind {
        data.column_flow = Some(flow);
        data.row_top = row_top;
        data.row_bottom = row_top + Au::from_f32_px(column_height);
        data.column_height = Au::from_f32_px(column_height);
        data.min_space_shortage = Au::from_f32_px(min_space_shortage);
        data.min_column_height = Au::from_f32_px(min_column_height);
    }
    if let BoxKind::MultiColumnFlow(data) = &mut tree.get_mut(flow).kind {
        data.content_runs = runs;
    }

    let b = tree.get_mut(row);
    b.header.frame.x = Au(0);
    b.header.frame.y = row_top;
    b.header.frame.width = available_inline_size;
    b.header.frame.height = Au::from_f32_px(column_height);

    Au::from_f32_px(column_height)
}

/// Balances `heights` across `column_count` columns via the same
/// iterative content-run search `layout_multicol_row` used to run
/// directly (§4.8 step 2). Returns the converged column height, the
/// content runs that produced it, and the `min_space_shortage`/
/// `min_column_height` bookkeeping values surfaced on `MultiColumnRowData`
/// (the gap between the naive equal-split guess and what balancing
/// actually required, and that initial guess itself).
fn balance_columns(ctx: &LayoutContext, heights: &[f32], column_count: usize, total_height: f32) -> (f32, MultiColumnContentRuns, f32, f32) {
    let min_column_height = if column_count > 0 { (total_height / column_count as f32).ceil().max(1.0) } else { total_height.max(1.0) };
    let mut column_height = min_column_height;

    let mut runs = MultiColumnContentRuns::default();
    let mut converged = false;
    for _ in 0..ctx.config.max_column_balance_iterations {
        runs.clear();
        let mut offset = 0.0f32;
        let mut column_start = 0.0f32;
        let mut columns_used = 1usize;
        let mut fragmentainer = ColumnFragmentainer { column_height, offset: FragmentOffset::ZERO };
        for &h in heights {
            let remaining = fragmentainer.fragment_remaining_height_for_offset(offset - column_start, FragmentBoundaryRule::AssociateWithLatterFragment);
            if h > remaining && offset > column_start {
                runs.add_break(offset);
                column_start = offset;
                columns_used += 1;
            }
            offset += h;
        }
        runs.add_break(offset);

        if columns_used <= column_count {
            converged = true;
            break;
        }
        runs.distribute_implicit_break(0.0);
        let mut previous = 0.0f32;
        let mut tallest = column_height;
        for run in &runs.runs {
            tallest = tallest.max(run.column_logical_height(previous));
            previous = run.break_offset;
        }
        column_height = tallest;
    }
    if !converged {
        crate::diagnostics::report(&crate::diagnostics::Diagnostic::ColumnBalanceIterationCapReached);
    }

    let min_space_shortage = (column_height - min_column_height).max(0.0);
    (column_height, runs, min_space_shortage, min_column_height)
}

/// Lays out a `MultiColumnSpan`'s content (originally the `column-span:
/// all` box that split the row) at the flow's full measure, stacked like
/// an ordinary block (§4.8 "the spanner... occupies the full measure of
/// the multicol container").
fn layout_multicol_span(ctx: &LayoutContext, tree: &BoxTree, span: BoxId, available_inline_size: Au, shaper: &mut dyn Shaper, top: Au) -> Au {
    let children: Vec<BoxId> = tree.children(span).collect();
    let mut y = Au(0);
    for &child in &children {
        layout_box(ctx, tree, child, available_inline_size, shaper);
        let height = tree.get(child).header.frame.height;
        let b = tree.get_mut(child);
        b.header.frame.x = Au(0);
        b.header.frame.y = y;
        y += height;
    }

    let b = tree.get_mut(span);
    b.header.frame.x = Au(0);
    b.header.frame.y = top;
    b.header.frame.width = available_inline_size;
    b.header.frame.height = y;

    y
}

/// Places each child into its column given a final `column_height`,
/// breaking to the next column whenever a child would overflow the
/// current one (§4.8 step 3 "children are placed into columns left to
/// right, top to bottom within each").
fn place_columns(tree: &BoxTree, children: &[BoxId], heights: &[f32], column_height: f32, column_count: usize, column_width: Au, column_gap: Au) {
    let mut column_index = 0usize;
    let mut column_offset = 0.0f32;
    for (&child, &h) in children.iter().zip(heights) {
        if column_offset > 0.0 && column_offset + h > column_height && column_index + 1 < column_count.max(1) {
            column_index += 1;
            column_offset = 0.0;
        }
        let x = Au(column_width.0 + column_gap.0) * column_index as i32;
        let b = tree.get_mut(child);
        b.header.frame.x = x;
        b.header.frame.y = Au::from_f32_px(column_offset);
        column_offset += h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::{BlockBoxData, MultiColumnFlowData};
    use crate::config::LayoutConfig;
    use crate::style::{BoxStyleData, Length};

    struct NoopShaper;
    impl Shaper for NoopShaper {
        fn measure(&mut self, _text: &str) -> Au {
            Au(0)
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

    fn append_row(tree: &BoxTree, flow: BoxId, style: &crate::style::BoxStyle, child_count: usize) -> BoxId {
        let row = tree.alloc(None, style.clone(), BoxKind::MultiColumnRow(crate::box_tree::MultiColumnRowData { column_flow: Some(flow), ..Default::default() }));
        for _ in 0..child_count {
            let child_style = std::sync::Arc::new(BoxStyleData { height: Length::Fixed(Au::from_px(100)), ..Default::default() });
            let child = tree.alloc(None, child_style, BoxKind::Block(BlockBoxData::default()));
            tree.append_child(row, child);
        }
        tree.append_child(flow, row);
        row
    }

    #[test]
    fn three_equal_children_balance_into_three_columns() {
        let flow_style = std::sync::Arc::new(BoxStyleData { column_count: Some(3), ..Default::default() });
        let tree = BoxTree::new(style());
        let flow = tree.alloc(None, flow_style.clone(), BoxKind::MultiColumnFlow(MultiColumnFlowData::default()));
        let row = append_row(&tree, flow, &flow_style, 3);

        let engine = NoopStyleEngine;
        let config = LayoutConfig::default();
        let ctx = LayoutContext { style_engine: &engine, config: &config };
        let mut shaper = NoopShaper;
        layout_multicol(&ctx, &tree, flow, Au::from_px(300), &mut shaper);

        let children: Vec<_> = tree.children(row).collect();
        let xs: Vec<Au> = children.iter().map(|&c| tree.get(c).header.frame.x).collect();
        assert_ne!(xs[0], xs[1]);
        assert_ne!(xs[1], xs[2]);

        if let BoxKind::MultiColumnRow(data) = &tree.get(row).kind {
            assert_eq!(data.column_flow, Some(flow));
            assert!(data.column_height > Au(0));
            assert_eq!(data.row_top, Au(0));
        } else {
            panic!("expected a MultiColumnRow");
        }
    }

    #[test]
    fn a_spanner_between_two_rows_stacks_above_and_below_it() {
        let flow_style = std::sync::Arc::new(BoxStyleData { column_count: Some(2), ..Default::default() });
        let tree = BoxTree::new(style());
        let flow = tree.alloc(None, flow_style.clone(), BoxKind::MultiColumnFlow(MultiColumnFlowData::default()));
        let row_a = append_row(&tree, flow, &flow_style, 2);

        let span = tree.alloc(None, flow_style.clone(), BoxKind::MultiColumnSpan);
        let spanner_child_style = std::sync::Arc::new(BoxStyleData { height: Length::Fixed(Au::from_px(50)), ..Default::default() });
        let spanner_child = tree.alloc(None, spanner_child_style, BoxKind::Block(BlockBoxData::default()));
        tree.append_child(span, spanner_child);
        tree.append_child(flow, span);

        let row_b = append_row(&tree, flow, &flow_style, 2);

        let engine = NoopStyleEngine;
        let config = LayoutConfig::default();
        let ctx = LayoutContext { style_engine: &engine, config: &config };
        let mut shaper = NoopShaper;
        layout_multicol(&ctx, &tree, flow, Au::from_px(200), &mut shaper);

        let row_a_bottom = tree.get(row_a).header.frame.y + tree.get(row_a).header.frame.height;
        let span_top = tree.get(span).header.frame.y;
        let span_bottom = span_top + tree.get(span).header.frame.height;
        let row_b_top = tree.get(row_b).header.frame.y;

        assert_eq!(span_top, row_a_bottom);
        assert_eq!(row_b_top, span_bottom);
        assert_eq!(tree.get(span).header.frame.width, Au::from_px(200));
    }

    #[test]
    fn resolve_columns_splits_available_width_by_count() {
        let flow_style = std::sync::Arc::new(BoxStyleData { column_count: Some(2), ..Default::default() });
        let tree = BoxTree::new(flow_style.clone());
        let flow = tree.alloc(None, flow_style, BoxKind::MultiColumnFlow(MultiColumnFlowData::default()));
        let (count, width, _gap) = resolve_columns(&tree, flow, Au::from_px(200));
        assert_eq!(count, 2);
        assert!(width.to_f32_px() <= 100.0);
    }
}
