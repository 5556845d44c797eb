/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The box tree (§3 "Box hierarchy (tagged variants)").
//!
//! Per Design Notes, the deep virtual hierarchy of the reference engine
//! (`Box` → `BoxModel` → `BoxFrame` → `BlockFlowBox`/`TableBox`/...,
//! distinguished by `is*()` predicates) is recast here as a single tagged
//! `enum BoxKind` addressed through arena indices rather than intrusive
//! pointers. Fields common to every box (geometry, style, flags, tree
//! links) live in `BoxHeader`, embedded once per arena slot; mode-specific
//! layout (`crate::layout::*`) dispatches on `BoxKind`.

pub mod construct;
pub mod layer;

use app_units::Au;
use bitflags::bitflags;

use crate::arena::{Arena, Id};
use crate::dom::NodeId;
use crate::fragment::MultiColumnContentRuns;
use crate::geom::PxRect;
use crate::layout::inline::line_box::RootLineBoxId;
use crate::style::{BoxStyle, PageMarginType};

pub type BoxId = Id<Box>;

bitflags! {
    /// Per-box flags (§3 "flags: anonymous, inline, floating, positioned,
    /// replaced, overflow-hidden, column-spanner, border-collapsed,
    /// has-layer, has-transform, is-row-group header/footer,
    /// is-children-inline").
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct BoxFlags: u32 {
        const ANONYMOUS          = 1 << 0;
        const INLINE_LEVEL       = 1 << 1;
        const FLOATING           = 1 << 2;
        const POSITIONED         = 1 << 3;
        const REPLACED           = 1 << 4;
        const OVERFLOW_HIDDEN    = 1 << 5;
        const COLUMN_SPANNER     = 1 << 6;
        const BORDER_COLLAPSED   = 1 << 7;
        const HAS_LAYER          = 1 << 8;
        const HAS_TRANSFORM      = 1 << 9;
        const ROW_GROUP_HEADER   = 1 << 10;
        const ROW_GROUP_FOOTER   = 1 << 11;
        const CHILDREN_INLINE    = 1 << 12;
    }
}

/// `(x, y, width, height)` plus the override sizes and caches that
/// `BoxFrame` adds in the reference model (§3).
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub x: Au,
    pub y: Au,
    pub width: Au,
    pub height: Au,
    pub override_width: Option<Au>,
    pub override_height: Option<Au>,
    pub overflow: PxRect,
    /// Lazily computed, invalidated only at layout boundaries (Design
    /// Notes "Lazy mutable caches").
    pub preferred_widths: Option<(Au, Au)>,
    pub ascent: Au,
}

/// Fields shared by every box, regardless of `BoxKind` (§3 common fields
/// across `Box`/`BoxModel`/`BoxFrame`).
pub struct BoxHeader {
    pub node: Option<NodeId>,
    pub style: BoxStyle,
    pub flags: BoxFlags,
    pub frame: Frame,
    pub margin: crate::geom::Sides<Au>,
    pub padding: crate::geom::Sides<Au>,
    pub layer: Option<layer::LayerId>,

    pub parent: Option<BoxId>,
    pub first_child: Option<BoxId>,
    pub last_child: Option<BoxId>,
    pub prev_sibling: Option<BoxId>,
    pub next_sibling: Option<BoxId>,
}

impl BoxHeader {
    fn new(node: Option<NodeId>, style: BoxStyle) -> Self {
        Self {
            node,
            style,
            flags: BoxFlags::empty(),
            frame: Frame::default(),
            margin: crate::geom::Sides::default(),
            padding: crate::geom::Sides::default(),
            layer: None,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub fn content_box_width(&self) -> Au {
        self.frame.width - self.padding.horizontal() - self.border_width_horizontal()
    }

    /// Border widths are resolved from style directly (no separate lazy
    /// cache needed: `BorderEdge` is already a plain style field).
    pub fn border_width_horizontal(&self) -> Au {
        self.style.border_left.width + self.style.border_right.width
    }

    pub fn border_width_vertical(&self) -> Au {
        self.style.border_top.width + self.style.border_bottom.width
    }

    pub fn requires_layer(&self) -> bool {
        self.flags.contains(BoxFlags::HAS_LAYER)
    }
}

#[derive(Default)]
pub struct TextBoxData {
    pub text: String,
}

#[derive(Default)]
pub struct InlineBoxData {
    pub line_boxes: Vec<RootLineBoxId>,
    /// Side-table continuation pointer (Design Notes "Continuation chain
    /// for inline splits"): set when a block child forces this inline to
    /// split into pre/middle/post boxes, pointing at the clone that
    /// continues after the block.
    pub continuation: Option<BoxId>,
}

#[derive(Default)]
pub struct BlockBoxData {
    /// Present when this block has any inline-level children; owns line
    /// layout state (§3 "owns `LineLayout` when children are inline").
    pub line_layout: Option<crate::layout::inline::LineLayout>,
    pub floats: crate::layout::float::FloatList,
    /// Set when a `columns` style inserted an anonymous column-flow child
    /// (§4.8).
    pub column_flow: Option<BoxId>,
    pub margin_collapsed_through: bool,
}

#[derive(Default)]
pub struct FlexBoxData {
    pub items: Vec<BoxId>,
}

#[derive(Default)]
pub struct TableBoxData {
    pub columns: Vec<BoxId>,
    pub sections: Vec<BoxId>,
    pub caption: Option<BoxId>,
    pub column_widths: Vec<Au>,
    pub border_collapse_grid: Option<crate::layout::table::collapse::CollapsedBorderGrid>,
}

#[derive(Default)]
pub struct TableSectionData {
    pub rows: Vec<BoxId>,
}

#[derive(Default)]
pub struct TableRowData {
    pub cells: Vec<BoxId>,
    pub row_index: usize,
}

#[derive(Default)]
pub struct TableCellData {
    pub col_span: u32,
    pub row_span: u32,
    pub col_index: usize,
    pub row_index: usize,
}

#[derive(Default)]
pub struct TableColumnData {
    pub span: u32,
}

#[derive(Default)]
pub struct MultiColumnFlowData {
    pub content_runs: MultiColumnContentRuns,
}

#[derive(Default)]
pub struct MultiColumnRowData {
    pub column_flow: Option<BoxId>,
    pub row_top: Au,
    pub row_bottom: Au,
    pub column_height: Au,
    pub min_space_shortage: Au,
    pub min_column_height: Au,
}

#[derive(Default)]
pub struct ListItemData {
    pub marker: Option<BoxId>,
    pub index: i64,
}

#[derive(Default)]
pub struct ListMarkerData {
    pub inside: bool,
    pub text: String,
}

#[derive(Default)]
pub struct PageData {
    pub page_name: crate::intern::InternedString,
    pub page_index: u32,
    pub page_width: Au,
    pub page_height: Au,
    pub page_scale: f32,
}

#[derive(Default)]
pub struct PageMarginData {
    pub margin_type: Option<PageMarginType>,
}

#[derive(Default)]
pub struct ReplacedData {
    pub intrinsic_size: Option<(Au, Au)>,
}

/// The tagged variant replacing the reference engine's deep `is*()`
/// hierarchy (Design Notes).
pub enum BoxKind {
    Text(TextBoxData),
    LineBreak,
    WordBreak,
    Block(BlockBoxData),
    Inline(InlineBoxData),
    Flex(FlexBoxData),
    Table(TableBoxData),
    TableSection(TableSectionData),
    TableRow(TableRowData),
    TableCell(TableCellData),
    TableColumn(TableColumnData),
    TableCaption,
    MultiColumnFlow(MultiColumnFlowData),
    MultiColumnRow(MultiColumnRowData),
    MultiColumnSpan,
    ListItem(ListItemData),
    ListMarker(ListMarkerData),
    Page(PageData),
    PageMargin(PageMarginData),
    View,
    Replaced(ReplacedData),
}

pub struct Box {
    pub header: BoxHeader,
    pub kind: BoxKind,
}

impl Box {
    pub fn is_block_container(&self) -> bool {
        matches!(
            self.kind,
            BoxKind::Block(_) | BoxKind::Page(_) | BoxKind::PageMargin(_) | BoxKind::View
        )
    }

    pub fn is_inline_level(&self) -> bool {
        self.header.flags.contains(BoxFlags::INLINE_LEVEL)
    }

    pub fn is_floating(&self) -> bool {
        self.header.flags.contains(BoxFlags::FLOATING)
    }

    pub fn is_positioned(&self) -> bool {
        self.header.flags.contains(BoxFlags::POSITIONED)
    }

    pub fn is_anonymous(&self) -> bool {
        self.header.flags.contains(BoxFlags::ANONYMOUS)
    }

    pub fn as_block(&self) -> Option<&BlockBoxData> {
        match &self.kind {
            BoxKind::Block(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut BlockBoxData> {
        match &mut self.kind {
            BoxKind::Block(data) => Some(data),
            _ => None,
        }
    }
}

/// Arena owning every `Box` for one document, parented under a root
/// `BoxView` (§2 "the document tree is walked to produce a box tree
/// parented under a root view box").
pub struct BoxTree {
    boxes: Arena<Box>,
    pub root: BoxId,
}

impl BoxTree {
    pub fn new(root_style: BoxStyle) -> Self {
        let boxes = Arena::new();
        let root = boxes.alloc(Box {
            header: BoxHeader::new(None, root_style),
            kind: BoxKind::View,
        });
        Self { boxes, root }
    }

    pub fn get(&self, id: BoxId) -> atomic_refcell::AtomicRef<'_, Box> {
        self.boxes.get(id)
    }

    pub fn get_mut(&self, id: BoxId) -> atomic_refcell::AtomicRefMut<'_, Box> {
        self.boxes.get_mut(id)
    }

    pub fn alloc(&self, node: Option<NodeId>, style: BoxStyle, kind: BoxKind) -> BoxId {
        self.boxes.alloc(Box {
            header: BoxHeader::new(node, style),
            kind,
        })
    }

    pub fn children(&self, parent: BoxId) -> BoxChildren<'_> {
        BoxChildren {
            tree: self,
            next: self.boxes.get(parent).header.first_child,
        }
    }

    /// Appends `child` as the last child of `parent`. Unlike `dom::NodeTree`,
    /// a box is appended exactly once during construction and never moved
    /// again, so there is no general `detach`.
    pub fn append_child(&self, parent: BoxId, child: BoxId) {
        let last = self.boxes.get(parent).header.last_child;
        self.boxes.get_mut(child).header.parent = Some(parent);
        self.boxes.get_mut(child).header.prev_sibling = last;
        self.boxes.get_mut(child).header.next_sibling = None;
        if let Some(last) = last {
            self.boxes.get_mut(last).header.next_sibling = Some(child);
        } else {
            self.boxes.get_mut(parent).header.first_child = Some(child);
        }
        self.boxes.get_mut(parent).header.last_child = Some(child);
    }

    /// Inserts `child` immediately before `before` under `before`'s parent.
    pub fn insert_before(&self, before: BoxId, child: BoxId) {
        let parent = self.boxes.get(before).header.parent;
        let prev = self.boxes.get(before).header.prev_sibling;
        self.boxes.get_mut(child).header.parent = parent;
        self.boxes.get_mut(child).header.prev_sibling = prev;
        self.boxes.get_mut(child).header.next_sibling = Some(before);
        self.boxes.get_mut(before).header.prev_sibling = Some(child);
        if let Some(prev) = prev {
            self.boxes.get_mut(prev).header.next_sibling = Some(child);
        } else if let Some(parent) = parent {
            self.boxes.get_mut(parent).header.first_child = Some(child);
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

pub struct BoxChildren<'a> {
    tree: &'a BoxTree,
    next: Option<BoxId>,
}

impl<'a> Iterator for BoxChildren<'a> {
    type Item = BoxId;

    fn next(&mut self) -> Option<BoxId> {
        let current = self.next?;
        self.next = self.tree.get(current).header.next_sibling;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::BoxStyleData;

    fn style() -> BoxStyle {
        std::sync::Arc::new(BoxStyleData::default())
    }

    #[test]
    fn append_child_links_siblings() {
        let tree = BoxTree::new(style());
        let a = tree.alloc(None, style(), BoxKind::Block(Default::default()));
        let b = tree.alloc(None, style(), BoxKind::Block(Default::default()));
        tree.append_child(tree.root, a);
        tree.append_child(tree.root, b);
        let order: Vec<_> = tree.children(tree.root).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn insert_before_splices_in_the_middle() {
        let tree = BoxTree::new(style());
        let a = tree.alloc(None, style(), BoxKind::Block(Default::default()));
        let b = tree.alloc(None, style(), BoxKind::Block(Default::default()));
        let c = tree.alloc(None, style(), BoxKind::Block(Default::default()));
        tree.append_child(tree.root, a);
        tree.append_child(tree.root, c);
        tree.insert_before(c, b);
        let order: Vec<_> = tree.children(tree.root).collect();
        assert_eq!(order, vec![a, b, c]);
    }
}
