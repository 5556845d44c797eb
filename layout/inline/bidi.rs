/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Bidi run splitting (§4.4 "after the block closes, the whole text is run
//! through the bidi algorithm and each item is split at bidi-run
//! boundaries with the assigned level"). Uses `unicode-bidi`, matching the
//! teacher crate's `Cargo.toml` dependency carried forward for exactly this
//! purpose (SPEC_FULL §10.5).

use unicode_bidi::{BidiInfo, Level};

use crate::layout::inline::items::{LineItem, LineItemStream};
use crate::style::Direction;

/// Runs the UBA over `stream.text` and rewrites each text item's
/// `bidi_level`, splitting an item that straddles a run boundary into
/// multiple items at that boundary so shaping later operates on
/// bidi-homogeneous spans only (§4.4 "split at bidi-run boundaries").
pub fn resolve_bidi_levels(stream: &mut LineItemStream, paragraph_direction: Direction) {
    if stream.text.is_empty() {
        return;
    }
    let default_level = match paragraph_direction {
        Direction::Ltr => Level::ltr(),
        Direction::Rtl => Level::rtl(),
    };
    let bidi_info = BidiInfo::new(&stream.text, Some(default_level));
    let Some(paragraph) = bidi_info.paragraphs.first() else { return };
    let levels = &bidi_info.levels;

    let mut rewritten: Vec<LineItem> = Vec::with_capacity(stream.items.len());
    for item in stream.items.drain(..) {
        if item.start == item.end {
            rewritten.push(item);
            continue;
        }
        let start = item.start as usize;
        let end = (item.end as usize).min(levels.len());
        if start >= end {
            rewritten.push(item);
            continue;
        }
        let mut run_start = start;
        let mut run_level = levels[start].number();
        for i in (start + 1)..end {
            let level = levels[i].number();
            if level != run_level {
                rewritten.push(LineItem { start: run_start as u32, end: i as u32, bidi_level: run_level, ..item.clone() });
                run_start = i;
                run_level = level;
            }
        }
        rewritten.push(LineItem { start: run_start as u32, end: end as u32, bidi_level: run_level, ..item.clone() });
    }
    stream.items = rewritten;
    let _ = paragraph;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::{BoxId, BoxKind, BoxTree};
    use crate::layout::inline::items::{CollapseType, LineItemKind};

    fn dummy_owner() -> BoxId {
        let style: crate::style::BoxStyle = std::sync::Arc::new(crate::style::BoxStyleData::default());
        let tree = BoxTree::new(style.clone());
        tree.alloc(None, style, BoxKind::View)
    }

    #[test]
    fn ltr_only_text_stays_a_single_run() {
        let mut stream = LineItemStream { text: "hello world".into(), items: vec![] };
        stream.items.push(LineItem {
            kind: LineItemKind::NormalText,
            owner: dummy_owner(),
            start: 0,
            end: stream.text.len() as u32,
            bidi_level: 0,
            collapse_type: CollapseType::NotCollapsible,
        });
        resolve_bidi_levels(&mut stream, Direction::Ltr);
        assert_eq!(stream.items.len(), 1);
        assert_eq!(stream.items[0].bidi_level % 2, 0);
    }

    #[test]
    fn mixed_direction_text_splits_into_multiple_runs() {
        let mut stream = LineItemStream { text: "abc \u{05d0}\u{05d1}\u{05d2} def".into(), items: vec![] };
        stream.items.push(LineItem {
            kind: LineItemKind::NormalText,
            owner: dummy_owner(),
            start: 0,
            end: stream.text.len() as u32,
            bidi_level: 0,
            collapse_type: CollapseType::NotCollapsible,
        });
        resolve_bidi_levels(&mut stream, Direction::Ltr);
        assert!(stream.items.len() > 1);
    }
}
