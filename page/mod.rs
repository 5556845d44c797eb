/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The page driver (§4.10, §6 Outputs): resolves page geometry from the
//! `@page` cascade, paginates the already-built document flow, and builds
//! each page's margin boxes.

pub mod margin_boxes;

use app_units::Au;
use euclid::default::{Point2D, Rect, Size2D};

use crate::box_tree::{BoxId, BoxKind, BoxTree, PageData, PageMarginData};
use crate::config::LayoutConfig;
use crate::geom::PxRect;
use crate::intern::InternedString;
use crate::layout::inline::breaker::Shaper;
use crate::layout::{layout_box, LayoutContext};
use crate::page::margin_boxes::{corner_rect, edge_and_slot, position_edge_run, resolve_edge_run, Edge, EdgeSlot, SlotBox};
use crate::style::{BoxStyle, PageMarginType, PagePseudo, ALL_PAGE_MARGIN_TYPES};

/// One constructed, laid-out margin box and which of the 16 named
/// positions it fills.
pub struct PageMarginBox {
    pub margin_type: PageMarginType,
    pub box_id: BoxId,
    pub rect: PxRect,
}

/// One page's resolved geometry: its own border box in page-local
/// coordinates, the content band the document flow is clipped/translated
/// into, and its margin boxes.
pub struct Page {
    pub page_box: BoxId,
    pub page_rect: PxRect,
    pub content_rect: PxRect,
    pub margin_boxes: Vec<PageMarginBox>,
}

/// The result of pagination: every page plus the scale applied when
/// rendering the document flow into each page's content band.
pub struct PageLayout {
    pub pages: Vec<Page>,
    pub scale: f32,
    pub document_width: Au,
    pub document_height: Au,
}

impl PageLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_size_at(&self, index: usize) -> Option<PxRect> {
        self.pages.get(index).map(|p| p.page_rect)
    }

    pub fn page_content_rect_at(&self, index: usize) -> Option<PxRect> {
        self.pages.get(index).map(|p| p.content_rect)
    }
}

fn resolve_page_box(style: &BoxStyle, config: &LayoutConfig) -> (Au, Au) {
    let width = style.width.resolve(config.default_page_width).unwrap_or(config.default_page_width);
    let height = style.height.resolve(config.default_page_height).unwrap_or(config.default_page_height);
    (width, height)
}

/// `(top, right, bottom, left)`, each falling back to the configured
/// default page margin when the cascade leaves it `auto` (§4.12 "missing
/// or malformed style falls back to initial values").
fn resolve_page_margins(style: &BoxStyle, page_width: Au, page_height: Au, config: &LayoutConfig) -> (Au, Au, Au, Au) {
    let top = style.margin_top.resolve(page_height).unwrap_or(config.default_page_margin);
    let bottom = style.margin_bottom.resolve(page_height).unwrap_or(config.default_page_margin);
    let right = style.margin_right.resolve(page_width).unwrap_or(config.default_page_margin);
    let left = style.margin_left.resolve(page_width).unwrap_or(config.default_page_margin);
    (top, right, bottom, left)
}

fn pseudo_for_page(index: u32) -> PagePseudo {
    if index == 0 {
        PagePseudo::First
    } else if index % 2 == 0 {
        PagePseudo::Right
    } else {
        PagePseudo::Left
    }
}

/// Lays out `document_root` as the page content flow, computes page
/// scale/count, and builds each page's `PageBox`/margin boxes (§4.10 full
/// pipeline).
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "page::paginate", skip_all, fields(servo_profiling = true), level = "trace")
)]
pub fn paginate(ctx: &LayoutContext, tree: &BoxTree, document_root: BoxId, shaper: &mut dyn Shaper) -> PageLayout {
    let page_name: InternedString = crate::intern::intern("");
    let first_style = ctx.style_engine.style_for_page(page_name, 0, Some(PagePseudo::First));
    let (page_width, page_height) = resolve_page_box(&first_style, ctx.config);
    let (margin_top, margin_right, margin_bottom, margin_left) = resolve_page_margins(&first_style, page_width, page_height, ctx.config);

    let container_width = (page_width - margin_left - margin_right).max(Au(1));
    let container_height = (page_height - margin_top - margin_bottom).max(Au(1));

    layout_box(ctx, tree, document_root, container_width, shaper);

    let document_frame = &tree.get(document_root).header.frame;
    let document_width = document_frame.overflow.size.width.max(document_frame.width.to_f32_px());
    let document_width = Au::from_f32_px(document_width);
    let document_height = document_frame.height;

    let scale = if ctx.config.allow_page_shrink_to_fit && document_width > container_width {
        (container_width.to_f32_px() / document_width.to_f32_px()).max(0.01)
    } else {
        1.0
    };

    let page_count = if ctx.config.fragmentation_enabled {
        let content_height_px = container_height.to_f32_px().max(1.0);
        ((document_height.to_f32_px() / content_height_px).ceil() as usize).max(1)
    } else {
        1
    };

    let mut pages = Vec::with_capacity(page_count);
    for index in 0..page_count {
        let pseudo = pseudo_for_page(index as u32);
        let page_style = ctx.style_engine.style_for_page(page_name, index as u32, Some(pseudo));
        let (this_page_width, this_page_height) = resolve_page_box(&page_style, ctx.config);
        let (top, right, bottom, left) = resolve_page_margins(&page_style, this_page_width, this_page_height, ctx.config);

        let page_box = tree.alloc(
            None,
            page_style.clone(),
            BoxKind::Page(PageData {
                page_name,
                page_index: index as u32,
                page_width: this_page_width,
                page_height: this_page_height,
                page_scale: scale,
            }),
        );

        let page_rect: PxRect = Rect::new(Point2D::zero(), Size2D::new(this_page_width.to_f32_px(), this_page_height.to_f32_px()));
        let content_width = (this_page_width - left - right).max(Au(0));
        let content_rect: PxRect = Rect::new(Point2D::new(left.to_f32_px(), top.to_f32_px()), Size2D::new(content_width.to_f32_px(), container_height.to_f32_px()));

        let margin_boxes = build_margin_boxes(ctx, tree, page_box, page_name, index as u32, &page_style, this_page_width, this_page_height, (top, right, bottom, left));

        pages.push(Page { page_box, page_rect, content_rect, margin_boxes });
    }

    PageLayout { pages, scale, document_width, document_height }
}

#[allow(clippy::too_many_arguments)]
fn build_margin_boxes(
    ctx: &LayoutContext,
    tree: &BoxTree,
    page_box: BoxId,
    page_name: InternedString,
    page_index: u32,
    page_style: &BoxStyle,
    page_width: Au,
    page_height: Au,
    margins: (Au, Au, Au, Au),
) -> Vec<PageMarginBox> {
    let (top, right, bottom, left) = margins;
    let mut styles: [Option<BoxStyle>; 16] = std::array::from_fn(|_| None);
    for (i, &margin_type) in ALL_PAGE_MARGIN_TYPES.iter().enumerate() {
        styles[i] = ctx.style_engine.style_for_page_margin(page_name, page_index, margin_type, page_style);
    }

    let mut boxes = Vec::new();

    for (i, &margin_type) in ALL_PAGE_MARGIN_TYPES.iter().enumerate() {
        let Some(style) = styles[i].clone() else { continue };
        if let Some(rect) = corner_rect(margin_type, (page_width, page_height), (top, right, bottom, left)) {
            let box_id = tree.alloc(None, style, BoxKind::PageMargin(PageMarginData { margin_type: Some(margin_type) }));
            tree.append_child(page_box, box_id);
            layout_box(ctx, tree, box_id, Au::from_f32_px(rect.size.width), &mut NullShaper);
            let b = tree.get_mut(box_id);
            b.header.frame.x = Au::from_f32_px(rect.origin.x);
            b.header.frame.y = Au::from_f32_px(rect.origin.y);
            b.header.frame.width = Au::from_f32_px(rect.size.width);
            b.header.frame.height = Au::from_f32_px(rect.size.height);
            boxes.push(PageMarginBox { margin_type, box_id, rect });
        }
    }

    for &edge in &[Edge::Top, Edge::Right, Edge::Bottom, Edge::Left] {
        boxes.extend(build_edge_run(ctx, tree, page_box, &ALL_PAGE_MARGIN_TYPES, &styles, edge, (page_width, page_height), (top, right, bottom, left)));
    }

    boxes
}

/// A no-op shaper used only to size margin boxes, which carry no
/// measurable text content in this engine (§4.11: margin-box `content`
/// strings/counters are a style-engine concern, not rendered glyphs here).
struct NullShaper;
impl Shaper for NullShaper {
    fn measure(&mut self, _text: &str) -> Au {
        Au(0)
    }
    fn replaced_size(&self, _owner: BoxId) -> (Au, Au) {
        (Au(0), Au(0))
    }
}

#[allow(clippy::too_many_arguments)]
fn build_edge_run(
    ctx: &LayoutContext,
    tree: &BoxTree,
    page_box: BoxId,
    all_types: &[PageMarginType; 16],
    styles: &[Option<BoxStyle>; 16],
    edge: Edge,
    page_size: (Au, Au),
    margins: (Au, Au, Au, Au),
) -> Vec<PageMarginBox> {
    let (page_width, page_height) = page_size;
    let (top, right, bottom, left) = margins;

    let (available, thickness, run_start, cross_origin, horizontal) = match edge {
        Edge::Top => ((page_width - left - right).to_f32_px(), top.to_f32_px(), left.to_f32_px(), 0.0f32, true),
        Edge::Bottom => ((page_width - left - right).to_f32_px(), bottom.to_f32_px(), left.to_f32_px(), (page_height - bottom).to_f32_px(), true),
        Edge::Left => ((page_height - top - bottom).to_f32_px(), left.to_f32_px(), top.to_f32_px(), 0.0f32, false),
        Edge::Right => ((page_height - top - bottom).to_f32_px(), right.to_f32_px(), top.to_f32_px(), (page_width - right).to_f32_px(), false),
    };

    let mut slots: [Option<(PageMarginType, BoxStyle)>; 3] = [None, None, None];
    for (i, &margin_type) in all_types.iter().enumerate() {
        if let Some((found_edge, slot)) = edge_and_slot(margin_type) {
            if found_edge == edge {
                if let Some(style) = &styles[i] {
                    let index = match slot {
                        EdgeSlot::Start => 0,
                        EdgeSlot::Center => 1,
                        EdgeSlot::End => 2,
                    };
                    slots[index] = Some((margin_type, style.clone()));
                }
            }
        }
    }

    let slot_box = |style: &BoxStyle, main_available: Au| -> SlotBox {
        let length = if horizontal { style.width } else { style.height };
        let min_length = if horizontal { style.min_width } else { style.min_height };
        let max_length = if horizontal { style.max_width } else { style.max_height };
        SlotBox {
            preferred: length.resolve(main_available).map(|a| a.to_f32_px()).unwrap_or(0.0),
            min: min_length.resolve(main_available).map(|a| a.to_f32_px()).unwrap_or(0.0),
            max: max_length.resolve(main_available).map(|a| a.to_f32_px()).unwrap_or(0.0),
        }
    };

    let main_available = Au::from_f32_px(available);
    let default_box = SlotBox { preferred: 0.0, min: 0.0, max: 0.0 };
    let start_box = slots[0].as_ref().map(|(_, s)| slot_box(s, main_available)).unwrap_or(default_box);
    let center_box = slots[1].as_ref().map(|(_, s)| slot_box(s, main_available)).unwrap_or(default_box);
    let end_box = slots[2].as_ref().map(|(_, s)| slot_box(s, main_available)).unwrap_or(default_box);

    let sizes = resolve_edge_run(available, start_box, center_box, end_box);
    let positions = position_edge_run(run_start, available, sizes);

    let mut boxes = Vec::new();
    let main = [(0usize, sizes.0, positions.0), (1, sizes.1, positions.1), (2, sizes.2, positions.2)];
    for (slot_index, size, position) in main {
        let Some((margin_type, style)) = slots[slot_index].clone() else { continue };
        if size <= 0.0 {
            continue;
        }
        let rect: PxRect = if horizontal {
            Rect::new(Point2D::new(position, cross_origin), Size2D::new(size, thickness))
        } else {
            Rect::new(Point2D::new(cross_origin, position), Size2D::new(thickness, size))
        };
        let box_id = tree.alloc(None, style, BoxKind::PageMargin(PageMarginData { margin_type: Some(margin_type) }));
        tree.append_child(page_box, box_id);
        let mut shaper = NullShaper;
        layout_box(ctx, tree, box_id, Au::from_f32_px(rect.size.width), &mut shaper);
        let b = tree.get_mut(box_id);
        b.header.frame.x = Au::from_f32_px(rect.origin.x);
        b.header.frame.y = Au::from_f32_px(rect.origin.y);
        b.header.frame.width = Au::from_f32_px(rect.size.width);
        b.header.frame.height = Au::from_f32_px(rect.size.height);
        boxes.push(PageMarginBox { margin_type, box_id, rect });
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::BlockBoxData;
    use crate::config::LayoutConfig;
    use crate::style::BoxStyleData;

    struct NoopStyleEngine {
        page_width: Au,
        page_height: Au,
    }

    impl crate::style::StyleEngine for NoopStyleEngine {
        fn style_for(&self, _node: crate::dom::NodeId, _parent_style: Option<&BoxStyle>) -> Option<BoxStyle> {
            None
        }
        fn pseudo_style_for(&self, _node: crate::dom::NodeId, _pseudo: &str, _parent_style: &BoxStyle) -> Option<BoxStyle> {
            None
        }
        fn style_for_page(&self, _page_name: InternedString, _page_index: u32, _pseudo: Option<PagePseudo>) -> BoxStyle {
            std::sync::Arc::new(BoxStyleData {
                width: crate::style::Length::Fixed(self.page_width),
                height: crate::style::Length::Fixed(self.page_height),
                ..Default::default()
            })
        }
        fn style_for_page_margin(&self, _page_name: InternedString, _page_index: u32, _margin_type: PageMarginType, _page_style: &BoxStyle) -> Option<BoxStyle> {
            None
        }
        fn evaluate_media_feature(&self, _name: &str, _value: Option<&str>) -> bool {
            false
        }
        fn format_counter_text(&self, value: i64, _style_name: &str) -> String {
            value.to_string()
        }
    }

    struct NoopShaper;
    impl Shaper for NoopShaper {
        fn measure(&mut self, _text: &str) -> Au {
            Au(0)
        }
        fn replaced_size(&self, _owner: BoxId) -> (Au, Au) {
            (Au(0), Au(0))
        }
    }

    #[test]
    fn tall_document_spans_multiple_pages() {
        let style = std::sync::Arc::new(BoxStyleData::default());
        let tree = BoxTree::new(style.clone());
        let document_root = tree.alloc(None, style.clone(), BoxKind::Block(BlockBoxData::default()));
        tree.get_mut(document_root).header.frame.height = Au::from_px(3000);

        let engine = NoopStyleEngine { page_width: Au::from_px(800), page_height: Au::from_px(1000) };
        let config = LayoutConfig::default();
        let ctx = LayoutContext { style_engine: &engine, config: &config };
        let mut shaper = NoopShaper;
        let layout = paginate(&ctx, &tree, document_root, &mut shaper);

        assert!(layout.page_count() >= 1);
        assert_eq!(layout.page_size_at(0).unwrap().size.width, 800.0);
    }
}
