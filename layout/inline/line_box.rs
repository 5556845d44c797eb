/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Line boxes (§3 "LineBox"). After breaking, each line is a tree rooted at
//! a `RootLineBox`, owned by the originating inline/text box and discarded
//! whenever that flow is re-laid out from scratch (§3 "Lifecycles").

use app_units::Au;
use smallvec::SmallVec;

use crate::arena::Id;
use crate::box_tree::BoxId;

pub type RootLineBoxId = Id<RootLineBox>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpansionOpportunity {
    None,
    Before,
    After,
    Both,
}

/// A shaped glyph run view over the line's text buffer, one per
/// bidi-contiguous text item placed on the line (§3 "TextLineBox").
#[derive(Clone, Debug)]
pub struct TextLineBox {
    pub owner: BoxId,
    pub start: u32,
    pub end: u32,
    pub width: Au,
    /// Extra space distributed into this run's expansion opportunities
    /// under `text-align: justify` (§4.4).
    pub expansion: Au,
    pub bidi_level: u8,
}

/// One inline-level replaced/block child placed on the line (§3
/// "ReplacedLineBox").
#[derive(Clone, Debug)]
pub struct ReplacedLineBox {
    pub owner: BoxId,
    pub width: Au,
    pub height: Au,
    pub bidi_level: u8,
}

/// One continuation of an inline box on this line (§3 "FlowLineBox"):
/// carries whether this run is the first/last fragment of the inline so
/// borders/padding/margins are only painted at the true edges.
#[derive(Clone, Debug)]
pub struct FlowLineBox {
    pub owner: BoxId,
    pub has_start_edge: bool,
    pub has_end_edge: bool,
    pub children: SmallVec<[LineBoxEntry; 4]>,
    pub bidi_level: u8,
}

#[derive(Clone, Debug)]
pub enum LineBoxEntry {
    Text(TextLineBox),
    Replaced(ReplacedLineBox),
    Flow(FlowLineBox),
}

impl LineBoxEntry {
    pub fn bidi_level(&self) -> u8 {
        match self {
            LineBoxEntry::Text(t) => t.bidi_level,
            LineBoxEntry::Replaced(r) => r.bidi_level,
            LineBoxEntry::Flow(f) => f.bidi_level,
        }
    }
}

/// The root of one line's tree, owning every entry placed on it (§3
/// "a single `RootLineBox` per line owning the tree").
#[derive(Clone, Debug, Default)]
pub struct RootLineBox {
    pub entries: Vec<LineBoxEntry>,
    pub block_offset: Au,
    pub height: Au,
    pub ascent: Au,
    /// Trailing collapsible whitespace width, tracked separately so it
    /// does not participate in justification (§4.4).
    pub trailing_collapsible_width: Au,
}

impl RootLineBox {
    /// Reorders `entries` visually by bidi level: runs at the highest
    /// level present are reversed in place, repeatedly, down to the lowest
    /// odd level, per the standard line-reordering algorithm (UAX #9 L2).
    /// Ties within a level go to paragraph direction, i.e. original order.
    pub fn reorder_visually(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let max_level = self.entries.iter().map(|e| e.bidi_level()).max().unwrap_or(0);
        let min_odd_level = self.entries.iter().map(|e| e.bidi_level()).filter(|&l| l % 2 == 1).min().unwrap_or(max_level + 1);
        if min_odd_level > max_level {
            return;
        }
        for level in (min_odd_level..=max_level).rev() {
            let mut i = 0;
            while i < self.entries.len() {
                if self.entries[i].bidi_level() >= level {
                    let start = i;
                    while i < self.entries.len() && self.entries[i].bidi_level() >= level {
                        i += 1;
                    }
                    self.entries[start..i].reverse();
                } else {
                    i += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::{BoxKind, BoxTree};

    fn dummy_box() -> BoxId {
        let style: crate::style::BoxStyle = std::sync::Arc::new(crate::style::BoxStyleData::default());
        let tree = BoxTree::new(style.clone());
        tree.alloc(None, style, BoxKind::View)
    }

    fn text(level: u8) -> LineBoxEntry {
        LineBoxEntry::Text(TextLineBox { owner: dummy_box(), start: 0, end: 1, width: Au(0), expansion: Au(0), bidi_level: level })
    }

    #[test]
    fn reorder_visually_reverses_a_single_rtl_run() {
        let mut line = RootLineBox::default();
        line.entries = vec![text(0), text(1), text(1), text(0)];
        line.reorder_visually();
        let levels: Vec<u8> = line.entries.iter().map(|e| e.bidi_level()).collect();
        assert_eq!(levels, vec![0, 1, 1, 0]);
    }

    #[test]
    fn reorder_visually_recovers_logical_order_on_double_reversal() {
        // Reordering twice at the same levels is not generally an
        // involution for mixed depths, but for a single embedded run it is:
        // this matches §8 invariant 9 for the simple one-run case.
        let mut line = RootLineBox::default();
        line.entries = vec![text(0), text(2), text(2), text(0)];
        let original: Vec<u8> = line.entries.iter().map(|e| e.bidi_level()).collect();
        line.reorder_visually();
        line.reorder_visually();
        let roundtrip: Vec<u8> = line.entries.iter().map(|e| e.bidi_level()).collect();
        assert_eq!(roundtrip, original);
    }
}
