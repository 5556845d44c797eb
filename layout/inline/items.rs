/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The flat `LineItem` stream (§3 "LineItem", §4.4 "Construction converts
//! the sub-tree of inline descendants into a flat `LineItem` stream plus a
//! shared text buffer").

use smallvec::SmallVec;

use crate::box_tree::{BoxId, BoxKind, BoxTree};
use crate::style::WhiteSpace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineItemKind {
    NormalText,
    TabulationText,
    LeaderText,
    InlineStart,
    InlineEnd,
    Floating,
    Positioned,
    Replaced,
    BidiControl,
    SoftBreakOpportunity,
    HardBreakOpportunity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollapseType {
    NotCollapsible,
    Collapsible,
    Collapsed,
    OpaqueToCollapsing,
}

#[derive(Clone, Debug)]
pub struct LineItem {
    pub kind: LineItemKind,
    pub owner: BoxId,
    pub start: u32,
    pub end: u32,
    pub bidi_level: u8,
    pub collapse_type: CollapseType,
}

/// Shared output of flattening one block-flow box's inline subtree: the
/// item stream plus the concatenated text buffer every text item indexes
/// into (§4.4 "a flat `LineItem` stream plus a shared text buffer").
#[derive(Clone, Debug, Default)]
pub struct LineItemStream {
    pub items: Vec<LineItem>,
    pub text: String,
}

fn push_collapsed_run(stream: &mut LineItemStream, owner: BoxId, run: &str, had_trailing_space: bool) -> bool {
    let trimmed_start = run.trim_start_matches([' ', '\t', '\n']);
    let leading_collapsed = trimmed_start.len() != run.len();
    let trimmed = trimmed_start.trim_end_matches([' ', '\t', '\n']);
    let trailing_collapsed = trimmed_start.len() != trimmed.len();

    if trimmed.is_empty() {
        // An entirely-whitespace run collapses to at most one space,
        // absorbed into a single collapsible item unless a space already
        // precedes it at the stream boundary (§4.4).
        if !had_trailing_space && !run.is_empty() {
            let start = stream.text.len() as u32;
            stream.text.push(' ');
            stream.items.push(LineItem {
                kind: LineItemKind::NormalText,
                owner,
                start,
                end: start + 1,
                bidi_level: 0,
                collapse_type: CollapseType::Collapsible,
            });
            return true;
        }
        return had_trailing_space;
    }

    // Internal whitespace runs collapse to a single space each; split on
    // runs of the collapsible whitespace characters.
    let mut collapsed = String::with_capacity(trimmed.len());
    let mut last_was_space = false;
    for c in trimmed.chars() {
        if c == ' ' || c == '\t' || c == '\n' {
            if !last_was_space {
                collapsed.push(' ');
            }
            last_was_space = true;
        } else {
            collapsed.push(c);
            last_was_space = false;
        }
    }
    let start = stream.text.len() as u32;
    stream.text.push_str(&collapsed);
    let end = stream.text.len() as u32;
    stream.items.push(LineItem {
        kind: LineItemKind::NormalText,
        owner,
        start,
        end,
        bidi_level: 0,
        collapse_type: CollapseType::NotCollapsible,
    });
    if leading_collapsed && !had_trailing_space {
        // A leading collapsible space that survived trimming (there was
        // preceding non-collapsible content) is folded into the run above
        // via `collapsed`; nothing further to record here.
    }
    trailing_collapsed
}

/// Flattens the inline descendants of `root` (a block-flow box with
/// `CHILDREN_INLINE` set, or any inline-level subtree) into a `LineItem`
/// stream, honoring `white-space` collapsing, `<br>`/`<wbr>` and inline
/// box start/end markers (§4.2, §4.4).
pub fn build_line_items(tree: &BoxTree, root: BoxId, white_space: WhiteSpace) -> LineItemStream {
    let mut stream = LineItemStream::default();
    let mut had_trailing_space = true; // leading whitespace at the start of a block elides.
    build_line_items_rec(tree, root, white_space, &mut stream, &mut had_trailing_space);
    stream
}

fn build_line_items_rec(tree: &BoxTree, box_id: BoxId, white_space: WhiteSpace, stream: &mut LineItemStream, had_trailing_space: &mut bool) {
    for child in tree.children(box_id) {
        let b = tree.get(child);
        match &b.kind {
            BoxKind::Text(data) => {
                if matches!(white_space, WhiteSpace::Preserve | WhiteSpace::PreserveNewlines | WhiteSpace::BreakSpaces) {
                    let start = stream.text.len() as u32;
                    stream.text.push_str(&data.text);
                    let end = stream.text.len() as u32;
                    stream.items.push(LineItem {
                        kind: LineItemKind::NormalText,
                        owner: child,
                        start,
                        end,
                        bidi_level: 0,
                        collapse_type: CollapseType::NotCollapsible,
                    });
                    *had_trailing_space = data.text.ends_with(['\n']);
                } else {
                    *had_trailing_space = push_collapsed_run(stream, child, &data.text, *had_trailing_space);
                }
            }
            BoxKind::LineBreak => {
                stream.items.push(LineItem {
                    kind: LineItemKind::HardBreakOpportunity,
                    owner: child,
                    start: stream.text.len() as u32,
                    end: stream.text.len() as u32,
                    bidi_level: 0,
                    collapse_type: CollapseType::OpaqueToCollapsing,
                });
                *had_trailing_space = true;
            }
            BoxKind::WordBreak => {
                stream.items.push(LineItem {
                    kind: LineItemKind::SoftBreakOpportunity,
                    owner: child,
                    start: stream.text.len() as u32,
                    end: stream.text.len() as u32,
                    bidi_level: 0,
                    collapse_type: CollapseType::OpaqueToCollapsing,
                });
            }
            BoxKind::Inline(_) => {
                stream.items.push(item_at(child, LineItemKind::InlineStart, stream));
                build_line_items_rec(tree, child, white_space, stream, had_trailing_space);
                stream.items.push(item_at(child, LineItemKind::InlineEnd, stream));
            }
            _ if b.is_floating() => {
                stream.items.push(item_at(child, LineItemKind::Floating, stream));
            }
            _ if b.is_positioned() => {
                stream.items.push(item_at(child, LineItemKind::Positioned, stream));
            }
            _ => {
                stream.items.push(item_at(child, LineItemKind::Replaced, stream));
                *had_trailing_space = false;
            }
        }
    }
}

fn item_at(owner: BoxId, kind: LineItemKind, stream: &LineItemStream) -> LineItem {
    let at = stream.text.len() as u32;
    LineItem { kind, owner, start: at, end: at, bidi_level: 0, collapse_type: CollapseType::OpaqueToCollapsing }
}

/// Items between which a line break is legal without an explicit
/// opportunity marker: after any space-collapsed text item, per `<Item
/// run>` semantics §4.4.
pub fn can_break_after(stream: &LineItemStream, index: usize) -> bool {
    let Some(item) = stream.items.get(index) else { return false };
    match item.kind {
        LineItemKind::SoftBreakOpportunity | LineItemKind::HardBreakOpportunity => true,
        LineItemKind::NormalText => stream.text.get(item.start as usize..item.end as usize).map(|s| s.ends_with(' ')).unwrap_or(false),
        _ => false,
    }
}

#[derive(Default)]
pub struct ItemRun {
    pub indices: SmallVec<[usize; 8]>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::{BoxFlags, BoxKind, BoxTree, TextBoxData};
    use crate::style::BoxStyleData;

    fn style() -> crate::style::BoxStyle {
        std::sync::Arc::new(BoxStyleData::default())
    }

    #[test]
    fn collapses_runs_of_internal_whitespace_to_one_space() {
        let tree = BoxTree::new(style());
        let text = tree.alloc(None, style(), BoxKind::Text(TextBoxData { text: "a   b\tc".into() }));
        tree.get_mut(text).header.flags.insert(BoxFlags::INLINE_LEVEL);
        tree.append_child(tree.root, text);
        let stream = build_line_items(&tree, tree.root, WhiteSpace::Collapse);
        assert_eq!(stream.text, "a b c");
    }

    #[test]
    fn hard_break_produces_a_dedicated_item() {
        let tree = BoxTree::new(style());
        let br = tree.alloc(None, style(), BoxKind::LineBreak);
        tree.append_child(tree.root, br);
        let stream = build_line_items(&tree, tree.root, WhiteSpace::Collapse);
        assert_eq!(stream.items.len(), 1);
        assert_eq!(stream.items[0].kind, LineItemKind::HardBreakOpportunity);
    }

    #[test]
    fn leading_whitespace_at_block_start_is_elided() {
        let tree = BoxTree::new(style());
        let text = tree.alloc(None, style(), BoxKind::Text(TextBoxData { text: "   hi".into() }));
        tree.append_child(tree.root, text);
        let stream = build_line_items(&tree, tree.root, WhiteSpace::Collapse);
        assert_eq!(stream.text, "hi");
    }
}
