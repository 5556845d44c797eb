/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Block flow layout (§4.3). Grounded in the teacher's `block.rs`
//! (`BlockFlow::assign_widths`/`assign_height`) for the width-resolution
//! and margin-collapsing shape, generalized onto the arena box tree.

use app_units::Au;

use crate::box_tree::{BoxFlags, BoxId, BoxKind, BoxTree};
use crate::layout::float::{FloatItem, FloatSide};
use crate::layout::inline::breaker::Shaper;
use crate::layout::margin::MarginInfo;
use crate::layout::{layout_box, LayoutContext};
use crate::style::{Clear, Float, Length, Position};

/// CSS §10.3: resolves `width` plus left/right margins against
/// `available_width`, applying the "auto absorbs remaining space" rule for
/// a normal in-flow block, and shrink-to-fit for the cases §4.3 lists
/// (floating, inline-block, flex items, indefinite-width positioned,
/// float-avoiding boxes).
pub fn resolve_width(tree: &BoxTree, box_id: BoxId, available_width: Au, shrink_to_fit: impl FnOnce() -> Au) -> (Au, Au, Au) {
    let style = tree.get(box_id).header.style.clone();
    let border_padding = tree.get(box_id).header.border_width_horizontal()
        + style.padding_left.resolve(available_width).unwrap_or(Au(0))
        + style.padding_right.resolve(available_width).unwrap_or(Au(0));

    let avoids_floats = style.float != Float::None
        || matches!(style.position, Position::Absolute | Position::Fixed)
        || style.display.is_inline_level()
        || style.overflow_hidden;

    let width = if style.width.is_auto() {
        if avoids_floats {
            shrink_to_fit()
        } else {
            available_width - border_padding - style.margin_left.resolve(available_width).unwrap_or(Au(0)) - style.margin_right.resolve(available_width).unwrap_or(Au(0))
        }
    } else {
        style.width.resolve(available_width).unwrap_or_else(shrink_to_fit)
    };
    let width = clamp(width, style.min_width.resolve(available_width), style.max_width.resolve(available_width));

    let margin_left_auto = style.margin_left.is_auto();
    let margin_right_auto = style.margin_right.is_auto();
    let (margin_left, margin_right) = if !avoids_floats && margin_left_auto && margin_right_auto {
        let remaining = available_width - width - border_padding;
        let half = Au(remaining.0 / 2);
        (half.max(Au(0)), (remaining - half).max(Au(0)))
    } else if !avoids_floats && margin_left_auto {
        (available_width - width - border_padding - style.margin_right.resolve(available_width).unwrap_or(Au(0)), style.margin_right.resolve(available_width).unwrap_or(Au(0)))
    } else if !avoids_floats && margin_right_auto {
        (style.margin_left.resolve(available_width).unwrap_or(Au(0)), available_width - width - border_padding - style.margin_left.resolve(available_width).unwrap_or(Au(0)))
    } else {
        (style.margin_left.resolve(available_width).unwrap_or(Au(0)), style.margin_right.resolve(available_width).unwrap_or(Au(0)))
    };

    (width, margin_left, margin_right)
}

fn clamp(value: Au, min: Option<Au>, max: Option<Au>) -> Au {
    let mut v = value;
    if let Some(max) = max {
        v = v.min(max);
    }
    if let Some(min) = min {
        v = v.max(min);
    }
    v
}

/// Full block-flow layout: width, margin-collapsing, float placement and
/// child placement, clearance, and height (§4.3). Writes geometry directly
/// into the box tree.
pub fn layout_block(ctx: &LayoutContext, tree: &BoxTree, box_id: BoxId, available_inline_size: Au, shaper: &mut dyn Shaper) {
    let style = tree.get(box_id).header.style.clone();
    let (width, margin_left, margin_right) = resolve_width(tree, box_id, available_inline_size, || available_inline_size);
    {
        let b = tree.get_mut(box_id);
        b.header.frame.width = width;
        b.header.margin.left = margin_left;
        b.header.margin.right = margin_right;
        b.header.padding.left = style.padding_left.resolve(available_inline_size).unwrap_or(Au(0));
        b.header.padding.right = style.padding_right.resolve(available_inline_size).unwrap_or(Au(0));
        b.header.padding.top = style.padding_top.resolve(available_inline_size).unwrap_or(Au(0));
        b.header.padding.bottom = style.padding_bottom.resolve(available_inline_size).unwrap_or(Au(0));
    }

    let content_width = width;
    let border_left = style.border_left.width;
    let border_top = style.border_top.width;
    let padding = tree.get(box_id).header.padding;

    let children_inline = tree.get(box_id).header.flags.contains(BoxFlags::CHILDREN_INLINE);
    let content_height = if children_inline {
        layout_inline_children(ctx, tree, box_id, content_width, shaper)
    } else {
        layout_block_children(ctx, tree, box_id, content_width, shaper)
    };

    let resolved_height = style.height.resolve(Au(0)).filter(|_| !style.height.is_auto());
    let mut height = resolved_height.unwrap_or(content_height);
    height = clamp(height, style.min_height.resolve(Au(0)), style.max_height.resolve(Au(0)));

    // §8 invariant 8: a float taller than the block expands height when the
    // block establishes a new block-formatting context (it "avoids floats").
    let establishes_bfc = style.float != Float::None || style.overflow_hidden || matches!(style.position, Position::Absolute | Position::Fixed);
    if establishes_bfc {
        if let Some(data) = tree.get(box_id).as_block() {
            if let Some(lowest) = data.floats.lowest_bottom() {
                height = height.max(lowest - border_top - padding.top);
            }
        }
    }

    let b = tree.get_mut(box_id);
    b.header.frame.height = height;
    b.header.frame.x = border_left + margin_left;
    b.header.frame.y = border_top;
}

fn layout_inline_children(ctx: &LayoutContext, tree: &BoxTree, box_id: BoxId, content_width: Au, shaper: &mut dyn Shaper) -> Au {
    let style = tree.get(box_id).header.style.clone();
    let overflow_wrap = match style.white_space {
        crate::style::WhiteSpace::BreakSpaces => crate::layout::inline::breaker::OverflowWrap::Anywhere,
        _ => crate::layout::inline::breaker::OverflowWrap::Normal,
    };
    let mut line_layout = crate::layout::inline::LineLayout::default();
    line_layout.build(
        tree,
        box_id,
        style.white_space,
        style.direction,
        content_width,
        style.text_indent.resolve(content_width).unwrap_or(Au(0)),
        overflow_wrap,
        style.text_align,
        shaper,
    );
    let floats = tree.get(box_id).as_block().map(|d| d.floats.clone()).unwrap_or_default();
    line_layout.place_lines(Au(0), &floats, Au(0), content_width);
    let height = line_layout.total_height();
    if let Some(data) = tree.get_mut(box_id).as_block_mut() {
        data.line_layout = Some(line_layout);
    }
    let _ = ctx;
    height
}

fn layout_block_children(ctx: &LayoutContext, tree: &BoxTree, box_id: BoxId, content_width: Au, shaper: &mut dyn Shaper) -> Au {
    let children: Vec<BoxId> = tree.children(box_id).collect();
    let mut margin_info = MarginInfo::new();
    let mut y = Au(0);
    let mut max_float_bottom = Au(0);

    for child in children {
        let child_style = tree.get(child).header.style.clone();

        if tree.get(child).is_floating() {
            y = place_float(ctx, tree, box_id, child, content_width, y, shaper);
            max_float_bottom = max_float_bottom.max(tree.get(child).header.frame.y + tree.get(child).header.frame.height);
            continue;
        }
        if tree.get(child).is_positioned() {
            // Out-of-flow; position resolution against the containing
            // block is handled by the external positioned-layout pass
            // that consumes this tree (§1 scope).
            continue;
        }

        // Clearance (§4.3 "Clearance").
        if child_style.clear != Clear::None {
            if let Some(data) = tree.get(box_id).as_block() {
                if let Some(clear_y) = data.floats.clearance(child_style.clear) {
                    if clear_y > y {
                        margin_info.reset();
                        y = clear_y;
                    }
                }
            }
        }

        let margin_top = child_style.margin_top.resolve(content_width).unwrap_or(Au(0));
        let margin_bottom = child_style.margin_bottom.resolve(content_width).unwrap_or(Au(0));
        margin_info.collapse_margin(margin_top);
        let collapsed_top = margin_info.collapsed_value();
        y += collapsed_top;
        margin_info.reset();
        margin_info.collapse_margin(margin_bottom);

        layout_box(ctx, tree, child, content_width, shaper);
        let child_height = tree.get(child).header.frame.height;
        {
            let b = tree.get_mut(child);
            b.header.frame.y = y;
            b.header.frame.x = b.header.margin.left;
        }
        y += child_height;
    }
    y += margin_info.collapsed_value();
    y.max(max_float_bottom)
}

/// Places one float (§4.3 "Floats"): resolves its width, finds the first
/// fitting Y via the owning block's `FloatList`, and records it.
fn place_float(ctx: &LayoutContext, tree: &BoxTree, parent: BoxId, child: BoxId, content_width: Au, start_y: Au, shaper: &mut dyn Shaper) -> Au {
    let style = tree.get(child).header.style.clone();
    let width = style.width.resolve(content_width).unwrap_or_else(|| {
        // Shrink-to-fit fallback for an auto-width float.
        let (w, _) = shaper.replaced_size(child);
        w.max(Au::from_px(1))
    });

    // Floats lay out against their own resolved width as available size.
    layout_box(ctx, tree, child, width, shaper);
    let height = tree.get(child).header.frame.height.max(Au::from_px(1));

    let side: FloatSide = style.float.into();
    let (container_left, container_right) = (Au(0), content_width);
    let size = euclid::default::Size2D::new(width, height);

    let fit_y = {
        let data = tree.get(parent).as_block().expect("float parent is a block");
        data.floats.first_fit(side, size, start_y, container_left, container_right)
    };
    let x = {
        let data = tree.get(parent).as_block().unwrap();
        match side {
            FloatSide::Left => data.floats.left_offset_at(fit_y, container_left),
            FloatSide::Right => data.floats.right_offset_at(fit_y, container_right) - width,
        }
    };

    {
        let b = tree.get_mut(child);
        b.header.frame.x = x;
        b.header.frame.y = fit_y;
    }
    if let Some(data) = tree.get_mut(parent).as_block_mut() {
        data.floats.push(FloatItem { box_id: child, side, rect: euclid::default::Rect::new(euclid::default::Point2D::new(x, fit_y), size) });
    }
    fit_y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::{BlockBoxData, BoxKind, BoxTree};
    use crate::style::BoxStyleData;

    fn style_with(f: impl FnOnce(&mut BoxStyleData)) -> crate::style::BoxStyle {
        let mut s = BoxStyleData::default();
        f(&mut s);
        std::sync::Arc::new(s)
    }

    #[test]
    fn auto_width_fills_available_space() {
        let tree = BoxTree::new(std::sync::Arc::new(BoxStyleData::default()));
        let block = tree.alloc(None, style_with(|_| {}), BoxKind::Block(BlockBoxData::default()));
        let (width, _, _) = resolve_width(&tree, block, Au::from_px(400), || Au::from_px(400));
        assert_eq!(width, Au::from_px(400));
    }

    #[test]
    fn auto_margins_center_a_fixed_width_block() {
        let tree = BoxTree::new(std::sync::Arc::new(BoxStyleData::default()));
        let style = style_with(|s| {
            s.width = Length::Fixed(Au::from_px(200));
            s.margin_left = Length::Auto;
            s.margin_right = Length::Auto;
        });
        let block = tree.alloc(None, style, BoxKind::Block(BlockBoxData::default()));
        let (width, ml, mr) = resolve_width(&tree, block, Au::from_px(400), || Au::from_px(400));
        assert_eq!(width, Au::from_px(200));
        assert_eq!(ml, Au::from_px(100));
        assert_eq!(mr, Au::from_px(100));
    }

    #[test]
    fn float_shrinks_to_fit_by_default() {
        let tree = BoxTree::new(std::sync::Arc::new(BoxStyleData::default()));
        let style = style_with(|s| {
            s.float = Float::Left;
        });
        let block = tree.alloc(None, style, BoxKind::Block(BlockBoxData::default()));
        let (width, _, _) = resolve_width(&tree, block, Au::from_px(400), || Au::from_px(123));
        assert_eq!(width, Au::from_px(123));
    }
}
