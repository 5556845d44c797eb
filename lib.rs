/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A print-oriented HTML/CSS layout and pagination core (§1).
//!
//! This crate owns the box tree, the multi-mode layout engine, and the
//! fragmentation/pagination driver. The style cascade, parsers, font
//! shaping, resource fetching, and graphics back-end are all external
//! collaborators reached through the narrow contracts in `style` and
//! `external` (§1, §6); this crate never constructs a `BoxStyle` itself
//! and never touches pixels directly.

pub mod arena;
pub mod box_tree;
pub mod config;
pub mod diagnostics;
pub mod dom;
pub mod external;
pub mod fragment;
pub mod geom;
pub mod intern;
pub mod layout;
pub mod page;
pub mod paint;
pub mod style;

use app_units::Au;

use crate::box_tree::layer::LayerTree;
use crate::box_tree::BoxTree;
use crate::config::LayoutConfig;
use crate::dom::NodeTree;
use crate::external::GraphicsContext;
use crate::geom::PxRect;
use crate::layout::inline::breaker::Shaper;
use crate::layout::LayoutContext;
use crate::page::PageLayout;
use crate::style::{BoxStyle, StyleEngine};

/// One document's complete layout state: its node tree, box tree, layer
/// tree, and (once laid out) its page geometry. Owns every arena-backed
/// allocation for the document (§5 "all document-scoped allocations live
/// in the document's arena").
pub struct Document {
    pub nodes: NodeTree,
    pub tree: BoxTree,
    pub layers: LayerTree,
    pages: Option<PageLayout>,
}

impl Document {
    /// Builds the box tree (§4.2) for `nodes` under `root_style`, without
    /// running layout yet.
    pub fn build(nodes: NodeTree, style_engine: &dyn StyleEngine, root_style: BoxStyle) -> Self {
        let (tree, layers) = box_tree::construct::build_box_tree(&nodes, style_engine, root_style);
        Self { nodes, tree, layers, pages: None }
    }

    /// Runs layout on the root view box and paginates the result (§4.10).
    /// Idempotent: re-running replaces any previous page geometry with a
    /// fresh layout pass over the current box tree.
    pub fn layout(&mut self, style_engine: &dyn StyleEngine, config: &LayoutConfig, shaper: &mut dyn Shaper) {
        let ctx = LayoutContext { style_engine, config };
        let pages = page::paginate(&ctx, &self.tree, self.tree.root, shaper);
        self.pages = Some(pages);
    }

    fn pages(&self) -> &PageLayout {
        self.pages.as_ref().expect("Document::layout must run before reading page geometry or rendering")
    }

    /// `pageCount()` (§6).
    pub fn page_count(&self) -> usize {
        self.pages().page_count()
    }

    /// `pageSizeAt(i)` (§6): the i-th page's own border box, origin at
    /// page-local `(0, 0)`.
    pub fn page_size_at(&self, index: usize) -> Option<PxRect> {
        self.pages().page_size_at(index)
    }

    /// `pageContentRectAt(i)` (§6): the content band within page `i` that
    /// the document flow is clipped and translated into.
    pub fn page_content_rect_at(&self, index: usize) -> Option<PxRect> {
        self.pages().page_content_rect_at(index)
    }

    /// `width()`/`height()` (§6): the document flow's own size, before
    /// pagination splits it into pages.
    pub fn width(&self) -> f32 {
        self.tree.get(self.tree.root).header.frame.width.to_f32_px()
    }

    pub fn height(&self) -> f32 {
        self.tree.get(self.tree.root).header.frame.height.to_f32_px()
    }

    /// `render(ctx, rect)` (§6): paints the document flow into `ctx`,
    /// clipped to `rect` and translated so the flow's own `(0, 0)` aligns
    /// with `rect`'s origin, at 1:1 scale.
    pub fn render(&self, ctx: &mut dyn GraphicsContext, rect: PxRect) {
        ctx.save();
        ctx.push_clip(rect);
        ctx.push_transform(crate::external::Transform2D { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: rect.origin.x, f: rect.origin.y });
        paint::paint::paint_layer(ctx, &self.tree, &self.layers, self.layers.root);
        ctx.pop_transform();
        ctx.pop_clip();
        ctx.restore();
    }

    /// `renderPage(ctx, i)` (§6): paints page `i`'s background and margin
    /// boxes, then the document flow clipped to the page's content rect
    /// and translated/scaled so that the page's content band shows
    /// through (§4.10 final paragraph).
    pub fn render_page(&self, ctx: &mut dyn GraphicsContext, index: usize) {
        let pages = self.pages();
        let Some(page) = pages.pages.get(index) else { return };

        paint::paint::paint_standalone(ctx, &self.tree, page.page_box, page.page_rect.origin);
        for margin_box in &page.margin_boxes {
            paint::paint::paint_standalone(ctx, &self.tree, margin_box.box_id, margin_box.rect.origin);
        }

        let content_height_per_page = pages.pages.first().map(|p| p.content_rect.size.height).unwrap_or(1.0).max(1.0);
        let document_offset = index as f32 * content_height_per_page;

        ctx.save();
        ctx.push_clip(page.content_rect);
        ctx.push_transform(crate::external::Transform2D {
            a: pages.scale,
            b: 0.0,
            c: 0.0,
            d: pages.scale,
            e: page.content_rect.origin.x,
            f: page.content_rect.origin.y - pages.scale * document_offset,
        });
        paint::paint::paint_layer(ctx, &self.tree, &self.layers, self.layers.root);
        ctx.pop_transform();
        ctx.pop_clip();
        ctx.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::BoxKind;
    use crate::style::{BoxStyleData, Length, PageMarginType, PagePseudo};

    struct FixedStyleEngine;
    impl StyleEngine for FixedStyleEngine {
        fn style_for(&self, _node: crate::dom::NodeId, parent_style: Option<&BoxStyle>) -> Option<BoxStyle> {
            Some(parent_style.cloned().unwrap_or_else(|| std::sync::Arc::new(BoxStyleData::default())))
        }
        fn pseudo_style_for(&self, _node: crate::dom::NodeId, _pseudo: &str, _parent_style: &BoxStyle) -> Option<BoxStyle> {
            None
        }
        fn style_for_page(&self, _page_name: crate::intern::InternedString, _page_index: u32, _pseudo: Option<PagePseudo>) -> BoxStyle {
            std::sync::Arc::new(BoxStyleData {
                width: Length::Fixed(Au::from_px(600)),
                height: Length::Fixed(Au::from_px(800)),
                ..Default::default()
            })
        }
        fn style_for_page_margin(&self, _page_name: crate::intern::InternedString, _page_index: u32, _margin_type: PageMarginType, _page_style: &BoxStyle) -> Option<BoxStyle> {
            None
        }
        fn evaluate_media_feature(&self, _name: &str, _value: Option<&str>) -> bool {
            false
        }
        fn format_counter_text(&self, value: i64, _style_name: &str) -> String {
            value.to_string()
        }
    }

    struct FixedShaper;
    impl Shaper for FixedShaper {
        fn measure(&mut self, text: &str) -> Au {
            Au::from_px(8 * text.chars().count() as i32)
        }
        fn replaced_size(&self, _owner: crate::box_tree::BoxId) -> (Au, Au) {
            (Au(0), Au(0))
        }
    }

    #[test]
    fn document_builds_and_paginates_an_empty_tree() {
        let nodes = NodeTree::new();
        let engine = FixedStyleEngine;
        let root_style = std::sync::Arc::new(BoxStyleData::default());
        let mut document = Document::build(nodes, &engine, root_style);
        assert!(matches!(document.tree.get(document.tree.root).kind, BoxKind::View));

        let config = LayoutConfig::default();
        let mut shaper = FixedShaper;
        document.layout(&engine, &config, &mut shaper);

        assert!(document.page_count() >= 1);
        assert_eq!(document.page_size_at(0).unwrap().size.width, 600.0);
    }
}
