/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Box construction (§4.2).
//!
//! Building proceeds in passes over the box tree rather than as one
//! recursive descent, because two of the fixups (inline/block splitting,
//! anonymous-block wrapping) need to see a box's already-built children
//! before deciding whether that box itself needs to change shape:
//!
//! 1. `build_raw` walks the node tree once, resolving style and creating
//!    one box per surviving node (display:none nodes are skipped, §4.1).
//! 2. `split_inline_continuations` (post-order) splits an `Inline` box
//!    that ended up with block-level children into a pre/middle/post
//!    continuation chain (§4.2, Design Notes).
//! 3. `wrap_mixed_children` (post-order) wraps inline-level runs in an
//!    anonymous block wherever a block container ends up with both
//!    inline- and block-level direct children.
//! 4. `insert_multicol_flow_boxes` (post-order) inserts an anonymous
//!    `MultiColumnFlow` box under every `columns`-styled block, itself
//!    populated with `MultiColumnRow`/`MultiColumnSpan` children split
//!    around any `column-span: all` descendant (§4.8).
//! 5. `materialize_table_boxes` inserts anonymous row groups/rows/cells
//!    around table-display elements that skipped a generation (§4.2
//!    "Tables materialise missing ancestors").
//! 6. `assign_layers` walks the finished tree once to create `BoxLayer`s
//!    (§4.2 "After the whole tree is built, a pass sets the `BoxLayer`").

use smallvec::SmallVec;

use crate::box_tree::layer::{needs_layer, LayerTree};
use crate::box_tree::{
    BoxFlags, BoxId, BoxKind, BoxTree, InlineBoxData, ListItemData, ListMarkerData,
    MultiColumnFlowData, MultiColumnRowData, TableCellData, TableColumnData, TableRowData,
    TableSectionData, TextBoxData,
};
use crate::dom::{NodeId, NodeKind, NodeTree};
use crate::style::{BoxStyle, ColumnSpan, Display, Length, WhiteSpace};

/// Builds a complete box tree for `nodes` under `root_style`, running every
/// fixup pass described above.
pub fn build_box_tree(nodes: &NodeTree, style_engine: &dyn crate::style::StyleEngine, root_style: BoxStyle) -> (BoxTree, LayerTree) {
    let tree = BoxTree::new(root_style.clone());
    build_raw(nodes, style_engine, &tree, nodes.root(), tree.root, &root_style);
    split_inline_continuations(&tree, tree.root);
    wrap_mixed_children(&tree, tree.root);
    insert_multicol_flow_boxes(&tree, tree.root);
    materialize_table_boxes(&tree, tree.root);
    let layers = assign_layers(&tree);
    (tree, layers)
}

fn choose_box_kind(display: Display) -> BoxKind {
    match display {
        Display::Flex | Display::InlineFlex => BoxKind::Flex(Default::default()),
        Display::Table | Display::InlineTable => BoxKind::Table(Default::default()),
        Display::TableRowGroup | Display::TableHeaderGroup | Display::TableFooterGroup => {
            BoxKind::TableSection(TableSectionData::default())
        }
        Display::TableRow => BoxKind::TableRow(TableRowData::default()),
        Display::TableCell => BoxKind::TableCell(TableCellData { col_span: 1, row_span: 1, col_index: 0, row_index: 0 }),
        Display::TableColumn => BoxKind::TableColumn(TableColumnData { span: 1 }),
        Display::TableColumnGroup => BoxKind::TableColumn(TableColumnData { span: 1 }),
        Display::TableCaption => BoxKind::TableCaption,
        Display::ListItem => BoxKind::ListItem(ListItemData::default()),
        Display::Inline | Display::InlineBlock => BoxKind::Inline(InlineBoxData::default()),
        Display::Block | Display::None => BoxKind::Block(Default::default()),
    }
}

fn is_elidable_whitespace(text: &str, white_space: WhiteSpace) -> bool {
    matches!(white_space, WhiteSpace::Collapse) && text.chars().all(|c| c == ' ' || c == '\t' || c == '\n')
}

fn parent_collapses_boundary_whitespace(kind: &BoxKind) -> bool {
    matches!(
        kind,
        BoxKind::TableSection(_) | BoxKind::TableRow(_) | BoxKind::TableColumn(_) | BoxKind::Flex(_)
    )
}

/// Phase 1: one box per surviving node, DOM order preserved exactly
/// (inline boxes may still have block-level children at this point).
fn build_raw(
    nodes: &NodeTree,
    style_engine: &dyn crate::style::StyleEngine,
    tree: &BoxTree,
    node: NodeId,
    parent_box: BoxId,
    parent_style: &BoxStyle,
) {
    for child in nodes.children(node) {
        match &nodes.node(child).kind {
            NodeKind::Document => {}
            NodeKind::Text(text) => {
                let is_first = tree.get(parent_box).header.first_child.is_none()
                    || tree.get(parent_box).header.last_child.map(|last| tree.get(last).is_block_container()).unwrap_or(false);
                let elidable = is_elidable_whitespace(text, parent_style.white_space);
                if elidable && (is_first || parent_collapses_boundary_whitespace(&tree.get(parent_box).kind)) {
                    continue;
                }
                let text_style = parent_style.clone();
                let box_id = tree.alloc(Some(child), text_style, BoxKind::Text(TextBoxData { text: text.clone() }));
                tree.get_mut(box_id).header.flags.insert(BoxFlags::INLINE_LEVEL);
                tree.append_child(parent_box, box_id);
                nodes.node_mut(child).layout_box = Some(box_id);
            }
            NodeKind::Element(_) => {
                let Some(style) = style_engine.style_for(child, Some(parent_style)) else {
                    continue;
                };
                if style.display == Display::None {
                    continue;
                }
                let kind = choose_box_kind(style.display);
                let box_id = tree.alloc(Some(child), style.clone(), kind);
                let mut flags = tree.get(box_id).header.flags;
                if style.display.is_inline_level() {
                    flags.insert(BoxFlags::INLINE_LEVEL);
                }
                if style.float != crate::style::Float::None {
                    flags.insert(BoxFlags::FLOATING);
                }
                if matches!(
                    style.position,
                    crate::style::Position::Absolute | crate::style::Position::Fixed
                ) {
                    flags.insert(BoxFlags::POSITIONED);
                }
                tree.get_mut(box_id).header.flags = flags;
                tree.append_child(parent_box, box_id);
                nodes.node_mut(child).layout_box = Some(box_id);

                if style.display == Display::ListItem {
                    let marker_style = style_engine
                        .pseudo_style_for(child, "marker", &style)
                        .unwrap_or_else(|| style.clone());
                    let inside = true; // resolved by the style engine in a full cascade; default inside.
                    let marker = tree.alloc(
                        None,
                        marker_style,
                        BoxKind::ListMarker(ListMarkerData { inside, text: String::new() }),
                    );
                    tree.get_mut(marker).header.flags.insert(BoxFlags::ANONYMOUS | BoxFlags::INLINE_LEVEL);
                    tree.append_child(box_id, marker);
                    if let BoxKind::ListItem(data) = &mut tree.get_mut(box_id).kind {
                        data.marker = Some(marker);
                    }
                }

                build_raw(nodes, style_engine, tree, child, box_id, &style);
            }
        }
    }
}

/// Phase 2 (§4.2, Design Notes "Continuation chain for inline splits").
///
/// Post-order: children are normalized before their parent is inspected,
/// so a block nested several inline levels deep is promoted one level at
/// a time as the walk unwinds, converging on a single pass.
fn split_inline_continuations(tree: &BoxTree, box_id: BoxId) {
    let children: Vec<BoxId> = tree.children(box_id).collect();
    for &child in &children {
        split_inline_continuations(tree, child);
    }

    if !matches!(tree.get(box_id).kind, BoxKind::Inline(_)) {
        return;
    }
    let has_block_child = children.iter().any(|&c| {
        let b = tree.get(c);
        !b.is_inline_level() && !matches!(b.kind, BoxKind::Text(_) | BoxKind::LineBreak)
    });
    if !has_block_child || children.is_empty() {
        return;
    }

    let Some(parent) = tree.get(box_id).header.parent else { return };
    let style = tree.get(box_id).header.style.clone();
    let node = tree.get(box_id).header.node;

    // Split into runs separated by block-level children.
    let mut runs: Vec<SmallVec<[BoxId; 4]>> = vec![SmallVec::new()];
    let mut blocks_after_run: Vec<BoxId> = Vec::new();
    for &c in &children {
        let is_block = {
            let b = tree.get(c);
            !b.is_inline_level() && !matches!(b.kind, BoxKind::Text(_) | BoxKind::LineBreak)
        };
        if is_block {
            blocks_after_run.push(c);
            runs.push(SmallVec::new());
        } else {
            runs.last_mut().unwrap().push(c);
        }
    }

    // The original box becomes the "pre" continuation (run 0); later runs
    // get fresh anonymous clones chained via `continuations`.
    let mut previous_continuation = box_id;
    // Detach all current children; we re-attach run 0 onto `box_id` and
    // splice blocks + later runs as siblings of `box_id` under `parent`.
    tree.get_mut(box_id).header.first_child = None;
    tree.get_mut(box_id).header.last_child = None;
    for &c in &runs[0] {
        tree.get_mut(c).header.parent = None;
        tree.get_mut(c).header.prev_sibling = None;
        tree.get_mut(c).header.next_sibling = None;
        tree.append_child(box_id, c);
    }

    let mut insertion_anchor = box_id;
    for (i, block) in blocks_after_run.into_iter().enumerate() {
        // Move the block out to be a sibling of the (current) inline
        // continuation, directly under the shared block-container parent.
        tree.get_mut(block).header.parent = None;
        tree.get_mut(block).header.prev_sibling = None;
        tree.get_mut(block).header.next_sibling = None;
        insert_after(tree, parent, insertion_anchor, block);
        insertion_anchor = block;

        let run = &runs[i + 1];
        if run.is_empty() && i + 1 == runs.len() - 1 {
            // Nothing trails the last block; no "post" clone needed.
            continue;
        }
        let clone = tree.alloc(node, style.clone(), BoxKind::Inline(InlineBoxData::default()));
        tree.get_mut(clone).header.flags = tree.get(previous_continuation).header.flags;
        tree.get_mut(clone).header.flags.insert(BoxFlags::ANONYMOUS);
        for &c in run {
            tree.get_mut(c).header.parent = None;
            tree.get_mut(c).header.prev_sibling = None;
            tree.get_mut(c).header.next_sibling = None;
            tree.append_child(clone, c);
        }
        insert_after(tree, parent, insertion_anchor, clone);
        insertion_anchor = clone;

        if let BoxKind::Inline(data) = &mut tree.get_mut(previous_continuation).kind {
            data.continuation = Some(clone);
        }
        previous_continuation = clone;
    }
}

fn insert_after(tree: &BoxTree, parent: BoxId, after: BoxId, new_box: BoxId) {
    let next = tree.get(after).header.next_sibling;
    tree.get_mut(new_box).header.parent = Some(parent);
    tree.get_mut(new_box).header.prev_sibling = Some(after);
    tree.get_mut(new_box).header.next_sibling = next;
    tree.get_mut(after).header.next_sibling = Some(new_box);
    if let Some(next) = next {
        tree.get_mut(next).header.prev_sibling = Some(new_box);
    } else {
        tree.get_mut(parent).header.last_child = Some(new_box);
    }
}

/// Phase 3 (§4.2 "Inline children inside a block with any block-level
/// child are wrapped in anonymous block wrappers").
fn wrap_mixed_children(tree: &BoxTree, box_id: BoxId) {
    let children: Vec<BoxId> = tree.children(box_id).collect();
    for &child in &children {
        wrap_mixed_children(tree, child);
    }

    if !tree.get(box_id).is_block_container() {
        return;
    }
    let has_block = children.iter().any(|&c| {
        let b = tree.get(c);
        !b.is_inline_level() && !matches!(b.kind, BoxKind::Text(_) | BoxKind::LineBreak)
    });
    let has_inline = children.iter().any(|&c| {
        let b = tree.get(c);
        b.is_inline_level() || matches!(b.kind, BoxKind::Text(_) | BoxKind::LineBreak)
    });
    if !(has_block && has_inline) {
        if !has_block {
            tree.get_mut(box_id).header.flags.insert(BoxFlags::CHILDREN_INLINE);
        }
        return;
    }

    tree.get_mut(box_id).header.first_child = None;
    tree.get_mut(box_id).header.last_child = None;
    let style = tree.get(box_id).header.style.clone();
    let mut run: Vec<BoxId> = Vec::new();
    let flush = |tree: &BoxTree, box_id: BoxId, run: &mut Vec<BoxId>, style: &BoxStyle| {
        if run.is_empty() {
            return;
        }
        let wrapper = tree.alloc(None, style.clone(), BoxKind::Block(Default::default()));
        tree.get_mut(wrapper).header.flags.insert(BoxFlags::ANONYMOUS | BoxFlags::CHILDREN_INLINE);
        for &c in run.iter() {
            tree.get_mut(c).header.parent = None;
            tree.get_mut(c).header.prev_sibling = None;
            tree.get_mut(c).header.next_sibling = None;
            tree.append_child(wrapper, c);
        }
        tree.append_child(box_id, wrapper);
        run.clear();
    };
    for c in children {
        let is_inline = {
            let b = tree.get(c);
            b.is_inline_level() || matches!(b.kind, BoxKind::Text(_) | BoxKind::LineBreak)
        };
        if is_inline {
            run.push(c);
        } else {
            flush(tree, box_id, &mut run, &style);
            tree.get_mut(c).header.parent = None;
            tree.get_mut(c).header.prev_sibling = None;
            tree.get_mut(c).header.next_sibling = None;
            tree.append_child(box_id, c);
        }
    }
    flush(tree, box_id, &mut run, &style);
}

/// Phase 4 (§4.8 "a `columns`-styled block gets an anonymous
/// `MultiColumnFlow` child that owns the original children, itself split
/// into `MultiColumnRow`/`MultiColumnSpan` siblings around any
/// `column-span: all` descendant").
fn insert_multicol_flow_boxes(tree: &BoxTree, box_id: BoxId) {
    let children: Vec<BoxId> = tree.children(box_id).collect();
    for &child in &children {
        insert_multicol_flow_boxes(tree, child);
    }

    if !matches!(tree.get(box_id).kind, BoxKind::Block(_)) {
        return;
    }
    let is_multicol = {
        let style = &tree.get(box_id).header.style;
        style.column_count.is_some() || !matches!(style.column_width, Length::Auto)
    };
    if !is_multicol || children.is_empty() {
        return;
    }

    let style = tree.get(box_id).header.style.clone();
    tree.get_mut(box_id).header.first_child = None;
    tree.get_mut(box_id).header.last_child = None;

    let flow = tree.alloc(None, style.clone(), BoxKind::MultiColumnFlow(MultiColumnFlowData::default()));
    tree.get_mut(flow).header.flags.insert(BoxFlags::ANONYMOUS);

    // Split the children into runs separated by `column-span: all`
    // boxes; each run becomes a `MultiColumnRow`, each spanner becomes
    // the sole child of a `MultiColumnSpan` (§4.8 "the first spanner
    // splits the initial row into two, the spanner becomes a sibling of
    // both").
    let mut run: Vec<BoxId> = Vec::new();
    let flush_row = |tree: &BoxTree, flow: BoxId, style: &BoxStyle, run: &mut Vec<BoxId>| {
        if run.is_empty() {
            return;
        }
        let row = tree.alloc(
            None,
            style.clone(),
            BoxKind::MultiColumnRow(MultiColumnRowData { column_flow: Some(flow), ..Default::default() }),
        );
        tree.get_mut(row).header.flags.insert(BoxFlags::ANONYMOUS);
        for &c in run.iter() {
            detach_box(tree, c);
            tree.append_child(row, c);
        }
        tree.append_child(flow, row);
        run.clear();
    };
    for c in children {
        let is_spanner = tree.get(c).header.style.column_span == ColumnSpan::All;
        if is_spanner {
            flush_row(tree, flow, &style, &mut run);
            tree.get_mut(c).header.flags.insert(BoxFlags::COLUMN_SPANNER);
            let span = tree.alloc(None, style.clone(), BoxKind::MultiColumnSpan);
            tree.get_mut(span).header.flags.insert(BoxFlags::ANONYMOUS);
            detach_box(tree, c);
            tree.append_child(span, c);
            tree.append_child(flow, span);
        } else {
            run.push(c);
        }
    }
    flush_row(tree, flow, &style, &mut run);

    tree.append_child(box_id, flow);
    if let Some(data) = tree.get_mut(box_id).as_block_mut() {
        data.column_flow = Some(flow);
    }
}

/// Phase 5 (§4.2 "Tables materialise missing ancestors with anonymous
/// boxes (row group ⊇ row ⊇ cell, as needed)").
fn materialize_table_boxes(tree: &BoxTree, box_id: BoxId) {
    let children: Vec<BoxId> = tree.children(box_id).collect();
    for &child in &children {
        materialize_table_boxes(tree, child);
    }

    match &tree.get(box_id).kind {
        BoxKind::Table(_) => regroup(tree, box_id, &children, is_table_top_level, wrap_in_section),
        BoxKind::TableSection(_) => regroup(tree, box_id, &children, is_table_row, wrap_in_row),
        BoxKind::TableRow(_) => regroup(tree, box_id, &children, is_table_cell, wrap_in_cell),
        _ => {}
    }
}

fn is_table_top_level(tree: &BoxTree, id: BoxId) -> bool {
    matches!(tree.get(id).kind, BoxKind::TableSection(_) | BoxKind::TableCaption | BoxKind::TableColumn(_))
}

fn is_table_row(tree: &BoxTree, id: BoxId) -> bool {
    matches!(tree.get(id).kind, BoxKind::TableRow(_))
}

fn is_table_cell(tree: &BoxTree, id: BoxId) -> bool {
    matches!(tree.get(id).kind, BoxKind::TableCell(_))
}

fn wrap_in_section(tree: &BoxTree, style: &BoxStyle, run: Vec<BoxId>) -> BoxId {
    let wrapper = tree.alloc(None, style.clone(), BoxKind::TableSection(TableSectionData::default()));
    tree.get_mut(wrapper).header.flags.insert(BoxFlags::ANONYMOUS);
    for c in run {
        detach_box(tree, c);
        tree.append_child(wrapper, c);
    }
    wrapper
}

fn wrap_in_row(tree: &BoxTree, style: &BoxStyle, run: Vec<BoxId>) -> BoxId {
    let wrapper = tree.alloc(None, style.clone(), BoxKind::TableRow(TableRowData::default()));
    tree.get_mut(wrapper).header.flags.insert(BoxFlags::ANONYMOUS);
    for c in run {
        detach_box(tree, c);
        tree.append_child(wrapper, c);
    }
    wrapper
}

fn wrap_in_cell(tree: &BoxTree, style: &BoxStyle, run: Vec<BoxId>) -> BoxId {
    let wrapper = tree.alloc(
        None,
        style.clone(),
        BoxKind::TableCell(TableCellData { col_span: 1, row_span: 1, col_index: 0, row_index: 0 }),
    );
    tree.get_mut(wrapper).header.flags.insert(BoxFlags::ANONYMOUS);
    for c in run {
        detach_box(tree, c);
        tree.append_child(wrapper, c);
    }
    wrapper
}

fn detach_box(tree: &BoxTree, id: BoxId) {
    tree.get_mut(id).header.parent = None;
    tree.get_mut(id).header.prev_sibling = None;
    tree.get_mut(id).header.next_sibling = None;
}

fn regroup(
    tree: &BoxTree,
    box_id: BoxId,
    children: &[BoxId],
    legal: impl Fn(&BoxTree, BoxId) -> bool,
    wrap: impl Fn(&BoxTree, &BoxStyle, Vec<BoxId>) -> BoxId,
) {
    if children.iter().all(|&c| legal(tree, c)) {
        return;
    }
    tree.get_mut(box_id).header.first_child = None;
    tree.get_mut(box_id).header.last_child = None;
    let style = tree.get(box_id).header.style.clone();
    let mut run: Vec<BoxId> = Vec::new();
    for &c in children {
        if legal(tree, c) {
            if !run.is_empty() {
                let wrapper = wrap(tree, &style, std::mem::take(&mut run));
                tree.append_child(box_id, wrapper);
            }
            detach_box(tree, c);
            tree.append_child(box_id, c);
        } else {
            run.push(c);
        }
    }
    if !run.is_empty() {
        let wrapper = wrap(tree, &style, run);
        tree.append_child(box_id, wrapper);
    }
}

/// Phase 6 (§4.2, §4.11): create a `BoxLayer` for every box that needs
/// one, linked to the nearest ancestor that has a layer.
fn assign_layers(tree: &BoxTree) -> LayerTree {
    let layers = LayerTree::new(tree.root);
    tree.get_mut(tree.root).header.layer = Some(layers.root);
    tree.get_mut(tree.root).header.flags.insert(BoxFlags::HAS_LAYER);
    assign_layers_rec(tree, &layers, tree.root, layers.root);
    layers
}

fn assign_layers_rec(tree: &BoxTree, layers: &LayerTree, box_id: BoxId, nearest_layer: crate::box_tree::layer::LayerId) {
    for child in tree.children(box_id).collect::<Vec<_>>() {
        let is_column_flow = matches!(tree.get(child).kind, BoxKind::MultiColumnFlow(_));
        let style = tree.get(child).header.style.clone();
        let layer = if needs_layer(&style, is_column_flow) {
            let z_index = style.z_index.unwrap_or(0);
            let id = layers.create(child, nearest_layer, z_index);
            tree.get_mut(child).header.layer = Some(id);
            tree.get_mut(child).header.flags.insert(BoxFlags::HAS_LAYER);
            if style.transform.is_some() {
                tree.get_mut(child).header.flags.insert(BoxFlags::HAS_TRANSFORM);
            }
            id
        } else {
            nearest_layer
        };
        assign_layers_rec(tree, layers, child, layer);
    }
}
