/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The style cascade contract (§4.1) and the resolved `BoxStyle` record
//! (§3). The actual CSS grammar, selector matching and cascade are out of
//! scope (§1) and live behind the `StyleEngine` trait; this crate only
//! consumes already-resolved `BoxStyle`s.

use std::sync::Arc;

use app_units::Au;

use crate::dom::NodeId;
use crate::intern::InternedString;

/// A CSS length in its unresolved, tagged-variant form (§3 "Lengths are a
/// tagged variant").
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Auto,
    Fixed(Au),
    Percent(f32),
    Intrinsic(IntrinsicLength),
    Calc(Au, f32),
    None,
    Zero,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IntrinsicLength {
    MinContent,
    MaxContent,
    FitContent,
}

impl Length {
    pub fn is_auto(&self) -> bool {
        matches!(self, Length::Auto)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Length::None)
    }

    /// Resolves against `available`, for variants that do not depend on
    /// intrinsic sizing (`Fixed`, `Percent`, `Calc`, `Zero`). Returns `None`
    /// for `Auto`/`None`/`Intrinsic`, which the caller must special-case.
    pub fn resolve(&self, available: Au) -> Option<Au> {
        match *self {
            Length::Fixed(au) => Some(au),
            Length::Percent(p) => Some(Au::new((available.0 as f32 * p) as i32)),
            Length::Calc(au, p) => Some(au + Au::new((available.0 as f32 * p) as i32)),
            Length::Zero => Some(Au(0)),
            Length::Auto | Length::None | Length::Intrinsic(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Display {
    None,
    Block,
    Inline,
    InlineBlock,
    Flex,
    InlineFlex,
    Table,
    InlineTable,
    TableRowGroup,
    TableHeaderGroup,
    TableFooterGroup,
    TableRow,
    TableCell,
    TableColumn,
    TableColumnGroup,
    TableCaption,
    ListItem,
}

impl Display {
    pub fn is_table_internal(&self) -> bool {
        matches!(
            self,
            Display::TableRowGroup
                | Display::TableHeaderGroup
                | Display::TableFooterGroup
                | Display::TableRow
                | Display::TableCell
                | Display::TableColumn
                | Display::TableColumnGroup
                | Display::TableCaption
        )
    }

    pub fn is_inline_level(&self) -> bool {
        matches!(self, Display::Inline | Display::InlineBlock | Display::InlineFlex | Display::InlineTable)
    }

    pub fn outer_is_block(&self) -> bool {
        !self.is_inline_level() && !matches!(self, Display::None)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Float {
    None,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Clear {
    None,
    Left,
    Right,
    Both,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WhiteSpace {
    Collapse,
    Preserve,
    PreserveNewlines,
    BreakSpaces,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    End,
    Left,
    Right,
    Center,
    Justify,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakBetween {
    Auto,
    Avoid,
    AvoidPage,
    AvoidColumn,
    Page,
    Left,
    Right,
    Recto,
    Verso,
    Column,
    Always,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakInside {
    Auto,
    Avoid,
    AvoidPage,
    AvoidColumn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnFill {
    Balance,
    Auto,
}

/// `column-span` (§4.8): whether a descendant of a multi-column flow
/// interrupts the column rows to span the full measure of the flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColumnSpan {
    #[default]
    None,
    All,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub fn is_visible(&self) -> bool {
        self.a != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    None,
    Hidden,
    Solid,
    Double,
    Dashed,
    Dotted,
    Groove,
    Ridge,
    Inset,
    Outset,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderEdge {
    pub width: Au,
    pub style: LineStyle,
    pub color: Color,
}

impl BorderEdge {
    pub const NONE: BorderEdge = BorderEdge { width: Au(0), style: LineStyle::None, color: Color::TRANSPARENT };

    pub fn is_visible(&self) -> bool {
        self.width.0 > 0 && !matches!(self.style, LineStyle::None | LineStyle::Hidden) && self.color.is_visible()
    }
}

/// A resolved style record (§3 "BoxStyle"). Refcounted and shareable:
/// the core treats it as immutable once produced by the style engine.
#[derive(Clone, Debug)]
pub struct BoxStyleData {
    pub display: Display,
    pub position: Position,
    pub float: Float,
    pub clear: Clear,
    pub direction: Direction,
    pub width: Length,
    pub height: Length,
    pub min_width: Length,
    pub max_width: Length,
    pub min_height: Length,
    pub max_height: Length,
    pub margin_top: Length,
    pub margin_right: Length,
    pub margin_bottom: Length,
    pub margin_left: Length,
    pub padding_top: Length,
    pub padding_right: Length,
    pub padding_bottom: Length,
    pub padding_left: Length,
    pub border_top: BorderEdge,
    pub border_right: BorderEdge,
    pub border_bottom: BorderEdge,
    pub border_left: BorderEdge,
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
    pub z_index: Option<i32>,
    pub opacity: f32,
    pub overflow_hidden: bool,
    pub transform: Option<[f32; 6]>,
    pub white_space: WhiteSpace,
    pub text_align: TextAlign,
    pub text_indent: Length,
    pub font_size: Au,
    pub line_height: Length,
    pub color: Color,
    pub background_color: Color,
    pub vertical_align: Length,
    pub column_count: Option<u32>,
    pub column_width: Length,
    pub column_gap: Length,
    pub column_fill: ColumnFill,
    pub column_rule: BorderEdge,
    pub column_span: ColumnSpan,
    pub border_collapse: bool,
    pub border_spacing: (Au, Au),
    pub break_before: BreakBetween,
    pub break_after: BreakBetween,
    pub break_inside: BreakInside,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Length,
    pub order: i32,
}

impl Default for BoxStyleData {
    fn default() -> Self {
        Self {
            display: Display::Inline,
            position: Position::Static,
            float: Float::None,
            clear: Clear::None,
            direction: Direction::Ltr,
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::Zero,
            max_width: Length::None,
            min_height: Length::Zero,
            max_height: Length::None,
            margin_top: Length::Zero,
            margin_right: Length::Zero,
            margin_bottom: Length::Zero,
            margin_left: Length::Zero,
            padding_top: Length::Zero,
            padding_right: Length::Zero,
            padding_bottom: Length::Zero,
            padding_left: Length::Zero,
            border_top: BorderEdge::NONE,
            border_right: BorderEdge::NONE,
            border_bottom: BorderEdge::NONE,
            border_left: BorderEdge::NONE,
            top: Length::Auto,
            right: Length::Auto,
            bottom: Length::Auto,
            left: Length::Auto,
            z_index: None,
            opacity: 1.0,
            overflow_hidden: false,
            transform: None,
            white_space: WhiteSpace::Collapse,
            text_align: TextAlign::Start,
            text_indent: Length::Zero,
            font_size: Au::from_px(16),
            line_height: Length::Auto,
            color: Color { r: 0, g: 0, b: 0, a: 255 },
            background_color: Color::TRANSPARENT,
            vertical_align: Length::Zero,
            column_count: None,
            column_width: Length::Auto,
            column_gap: Length::Auto,
            column_fill: ColumnFill::Balance,
            column_rule: BorderEdge::NONE,
            column_span: ColumnSpan::None,
            border_collapse: false,
            border_spacing: (Au(0), Au(0)),
            break_before: BreakBetween::Auto,
            break_after: BreakBetween::Auto,
            break_inside: BreakInside::Auto,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Length::Auto,
            order: 0,
        }
    }
}

/// Shareable handle to a resolved style; refcounted within a document
/// (§5 "Strings and style objects are shared via refcount within a
/// document").
pub type BoxStyle = Arc<BoxStyleData>;

/// Which of the 16 page-margin regions (§3 "Page") a margin box occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageMarginType {
    TopLeftCorner,
    TopLeft,
    TopCenter,
    TopRight,
    TopRightCorner,
    RightTop,
    RightMiddle,
    RightBottom,
    BottomRightCorner,
    BottomRight,
    BottomCenter,
    BottomLeft,
    BottomLeftCorner,
    LeftBottom,
    LeftMiddle,
    LeftTop,
}

pub const ALL_PAGE_MARGIN_TYPES: [PageMarginType; 16] = [
    PageMarginType::TopLeftCorner,
    PageMarginType::TopLeft,
    PageMarginType::TopCenter,
    PageMarginType::TopRight,
    PageMarginType::TopRightCorner,
    PageMarginType::RightTop,
    PageMarginType::RightMiddle,
    PageMarginType::RightBottom,
    PageMarginType::BottomRightCorner,
    PageMarginType::BottomRight,
    PageMarginType::BottomCenter,
    PageMarginType::BottomLeft,
    PageMarginType::BottomLeftCorner,
    PageMarginType::LeftBottom,
    PageMarginType::LeftMiddle,
    PageMarginType::LeftTop,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagePseudo {
    First,
    Left,
    Right,
    Blank,
}

/// The style cascade interface the core consumes (§4.1). Implemented by an
/// external style engine; the core never constructs a `BoxStyle` itself.
pub trait StyleEngine {
    /// `None` means `display: none`; the element and its subtree are
    /// skipped during box construction (§4.2).
    fn style_for(&self, node: NodeId, parent_style: Option<&BoxStyle>) -> Option<BoxStyle>;

    fn pseudo_style_for(&self, node: NodeId, pseudo: &str, parent_style: &BoxStyle) -> Option<BoxStyle>;

    fn style_for_page(&self, page_name: InternedString, page_index: u32, pseudo: Option<PagePseudo>) -> BoxStyle;

    fn style_for_page_margin(
        &self,
        page_name: InternedString,
        page_index: u32,
        margin_type: PageMarginType,
        page_style: &BoxStyle,
    ) -> Option<BoxStyle>;

    /// Evaluates a named media feature (`width`, `color`, ...); unknown
    /// features return `false` (§4.12).
    fn evaluate_media_feature(&self, name: &str, value: Option<&str>) -> bool;

    /// Formats a counter value under a `list-style-type`/`@counter-style`
    /// name, e.g. `decimal`, `lower-roman`.
    fn format_counter_text(&self, value: i64, style_name: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_length_resolves_against_available() {
        let half = Length::Percent(0.5);
        assert_eq!(half.resolve(Au::from_px(200)), Some(Au::from_px(100)));
    }

    #[test]
    fn auto_and_none_do_not_resolve() {
        assert_eq!(Length::Auto.resolve(Au::from_px(200)), None);
        assert_eq!(Length::None.resolve(Au::from_px(200)), None);
    }

    #[test]
    fn border_edge_none_is_not_visible() {
        assert!(!BorderEdge::NONE.is_visible());
        let visible = BorderEdge { width: Au::from_px(1), style: LineStyle::Solid, color: Color { r: 0, g: 0, b: 0, a: 255 } };
        assert!(visible.is_visible());
    }
}
